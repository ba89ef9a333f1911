use std::collections::HashSet;

/// Human-readable failures collected over one update run
#[derive(Debug, Clone, Default)]
pub struct ErrorLog {
    entries: Vec<String>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.entries.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Distinct messages in the order they were first recorded
    pub fn unique(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(String::as_str)
            .filter(|e| seen.insert(*e))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_log_is_empty() {
        let log = ErrorLog::new();
        assert!(log.is_empty());
        assert_eq!(log.len(), 0);
        assert!(log.unique().is_empty());
    }

    #[test]
    fn test_push_keeps_every_entry() {
        let mut log = ErrorLog::new();
        log.push("timeout");
        log.push("timeout".to_string());

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries(), ["timeout", "timeout"]);
    }

    #[test]
    fn test_unique_collapses_duplicates_in_first_seen_order() {
        let mut log = ErrorLog::new();
        log.push("b");
        log.push("a");
        log.push("b");
        log.push("c");
        log.push("a");

        assert_eq!(log.unique(), vec!["b", "a", "c"]);
    }
}
