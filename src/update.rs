use crate::config::Config;
use crate::discovery::{self, LanguageCatalog};
use crate::error_log::ErrorLog;
use crate::fetcher::FactFetcher;
use crate::store::{Dataset, DatasetStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{info, warn};

/// Before/after fact counts for one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageReport {
    pub language: String,
    pub count_before: usize,
    pub count_after: usize,
}

impl LanguageReport {
    /// Signed change; negative when duplicates already on disk were collapsed
    pub fn added(&self) -> i64 {
        self.count_after as i64 - self.count_before as i64
    }
}

/// Everything one update run has to tell the operator
#[derive(Debug)]
pub struct UpdateReport {
    pub started_at: DateTime<Utc>,
    /// `None` when discovery failed and the fallback catalog was used
    pub languages_discovered: Option<usize>,
    pub languages: Vec<LanguageReport>,
    pub save_result: Result<(), String>,
    pub errors: ErrorLog,
}

impl UpdateReport {
    pub fn is_clean(&self) -> bool {
        self.save_result.is_ok() && self.errors.is_empty()
    }
}

impl fmt::Display for UpdateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "MeowFacts update - {}", self.started_at.format("%Y-%m-%d %H:%M UTC"))?;
        if let Some(count) = self.languages_discovered {
            writeln!(f, "Found {} unique ISO languages with cumulative counts.", count)?;
        }
        writeln!(f, "{:<10} | {:<15} | {:<15}", "Language", "Total Before", "New Unique Facts")?;
        writeln!(f, "{}", "-".repeat(47))?;
        for row in &self.languages {
            writeln!(f, "{:<10} | {:<15} | {:<15}", row.language, row.count_before, row.added())?;
        }

        match &self.save_result {
            Ok(()) => writeln!(f, "\nSUCCESS! Master dataset updated.")?,
            Err(e) => writeln!(f, "  -> File Error: {}", e)?,
        }

        if self.errors.is_empty() {
            write!(f, "\nAll discovered languages were processed successfully.")
        } else {
            write!(f, "\n--- Error Summary ---")?;
            for error in self.errors.unique() {
                write!(f, "\n{}", error)?;
            }
            Ok(())
        }
    }
}

/// Union of existing and fetched facts, deduplicated and sorted
pub fn merge_unique(existing: &[String], fetched: Vec<String>) -> Vec<String> {
    existing
        .iter()
        .cloned()
        .chain(fetched)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Runs discovery, fetch, merge and save as one sequential pass
pub struct Updater {
    config: Config,
    client: reqwest::Client,
    fetcher: FactFetcher,
    store: DatasetStore,
}

impl Updater {
    pub fn new(config: Config) -> Result<Self> {
        let client = config.http_client()?;
        let fetcher = FactFetcher::new(client.clone(), &config);
        let store = DatasetStore::new(&config.data_file);

        Ok(Self {
            config,
            client,
            fetcher,
            store,
        })
    }

    pub async fn run(&self) -> UpdateReport {
        let started_at = Utc::now();
        let mut errors = ErrorLog::new();

        info!("Discovering languages via {}", self.config.options_url());
        let catalog = discovery::discover(&self.client, &self.config, &mut errors).await;

        let mut dataset = self.store.load();
        info!(
            "Loaded {} languages from {}",
            dataset.len(),
            self.store.path().display()
        );

        let languages = self.update_languages(&catalog, &mut dataset, &mut errors).await;

        let save_result = self.store.save(&dataset).map_err(|e| {
            warn!("Dataset not saved: {}", e);
            e.to_string()
        });
        if save_result.is_ok() {
            info!("✓ Master dataset saved to {}", self.store.path().display());
        }

        UpdateReport {
            started_at,
            languages_discovered: (!catalog.is_fallback()).then(|| catalog.len()),
            languages,
            save_result,
            errors,
        }
    }

    async fn update_languages(
        &self,
        catalog: &LanguageCatalog,
        dataset: &mut Dataset,
        errors: &mut ErrorLog,
    ) -> Vec<LanguageReport> {
        let total = catalog.len();
        let mut reports = Vec::with_capacity(total);

        for (index, (language, target_count)) in catalog.iter().enumerate() {
            let existing = dataset.entry(language.to_string()).or_default();
            let count_before = existing.len();

            let fetched = self.fetcher.fetch(language, target_count, errors).await;
            let fetched_count = fetched.len();
            let merged = merge_unique(existing, fetched);
            let row = LanguageReport {
                language: language.to_string(),
                count_before,
                count_after: merged.len(),
            };
            *existing = merged;

            info!(
                "[{}/{}] {} - fetched {}, {} new (total {})",
                index + 1,
                total,
                language,
                fetched_count,
                row.added(),
                row.count_after
            );

            reports.push(row);
        }

        reports
    }
}
