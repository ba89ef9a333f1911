use crate::config::Config;
use crate::error_log::ErrorLog;
use crate::fetcher::get_json;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

pub const DEFAULT_FACT_COUNT: u64 = 1000;
pub const FALLBACK_LANGUAGE: &str = "eng";

#[derive(Debug, Deserialize)]
struct OptionsResponse {
    #[serde(default)]
    lang: Vec<LanguageOption>,
}

// Loosely typed so one malformed entry is skipped instead of failing the decode
#[derive(Debug, Deserialize)]
struct LanguageOption {
    #[serde(default)]
    iso_code: Option<Value>,
    #[serde(default)]
    fact_count: Option<Value>,
}

/// Language identifiers and their target sample counts, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageCatalog {
    entries: Vec<(String, u64)>,
    fallback: bool,
}

impl LanguageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog used when discovery fails: a single English entry
    pub fn fallback() -> Self {
        let mut catalog = Self::new();
        catalog.add(FALLBACK_LANGUAGE, DEFAULT_FACT_COUNT);
        catalog.fallback = true;
        catalog
    }

    /// Whether this is the stand-in used after a failed discovery
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Add `count` to `language`, inserting it on first sight.
    /// Repeated identifiers accumulate rather than overwrite.
    pub fn add(&mut self, language: &str, count: u64) {
        match self.entries.iter_mut().find(|(lang, _)| lang == language) {
            Some((_, total)) => *total = total.saturating_add(count),
            None => self.entries.push((language.to_string(), count)),
        }
    }

    pub fn get(&self, language: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.entries.iter().map(|(lang, count)| (lang.as_str(), *count))
    }

    fn from_options(options: Vec<LanguageOption>) -> Self {
        let mut catalog = Self::new();
        for option in options {
            let iso = match option.iso_code {
                Some(Value::String(iso)) => iso,
                other => {
                    warn!("Skipping language option with iso_code {:?}", other);
                    continue;
                }
            };
            let count = match option.fact_count {
                None | Some(Value::Null) => DEFAULT_FACT_COUNT,
                Some(value) => match value.as_u64() {
                    Some(count) => count,
                    None => {
                        warn!("Skipping language option {} with fact_count {}", iso, value);
                        continue;
                    }
                },
            };
            catalog.add(&iso, count);
        }
        catalog
    }
}

/// Query the options endpoint and build the language catalog
///
/// Never fails: on any request or decode error the failure is recorded in
/// `errors` and the fallback catalog is returned.
pub async fn discover(client: &reqwest::Client, config: &Config, errors: &mut ErrorLog) -> LanguageCatalog {
    let url = config.options_url();

    match get_json::<OptionsResponse>(client.get(&url)).await {
        Ok(options) => {
            let catalog = LanguageCatalog::from_options(options.lang);
            info!(
                "Found {} unique ISO languages with cumulative counts",
                catalog.len()
            );
            catalog
        }
        Err(e) => {
            warn!("Language discovery failed, falling back to {}: {}", FALLBACK_LANGUAGE, e);
            errors.push(format!(
                "Critical Error: Could not discover languages via {}: {}",
                url, e
            ));
            LanguageCatalog::fallback()
        }
    }
}
