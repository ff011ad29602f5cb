use std::path::PathBuf;

use chrono::NaiveDate;
use config::{Config, Environment};
use serde::Deserialize;

use crate::error::PipelineError;
use crate::model::{Chamber, DocumentMetadata};

const DEFAULT_INPUT: &str = "documents/Senate_2025_09_04.pdf";
const DEFAULT_OUTPUT: &str = "output/hansard_summary.json";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_MODEL: &str = "z-ai/glm-4.5-air:free";

/// Run settings: built-in defaults, overridden by `HANSARD_*` env vars,
/// then by CLI flags in `main`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Number of front pages handed to the ToC pass.
    pub toc_pages: u32,
    /// Added to every ToC page number to get the PDF page index.
    pub page_offset: i64,
    pub base_url: String,
    pub model: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub chamber: String,
    pub date: String,
    pub session: String,
}

impl Settings {
    pub fn load() -> Result<Self, PipelineError> {
        Self::load_from(Environment::with_prefix("HANSARD").try_parsing(true))
    }

    fn load_from(env: Environment) -> Result<Self, PipelineError> {
        let built = Config::builder()
            .set_default("input", DEFAULT_INPUT)
            .and_then(|b| b.set_default("output", DEFAULT_OUTPUT))
            .and_then(|b| b.set_default("toc_pages", 3))
            .and_then(|b| b.set_default("page_offset", 0))
            .and_then(|b| b.set_default("base_url", DEFAULT_BASE_URL))
            .and_then(|b| b.set_default("model", DEFAULT_MODEL))
            .and_then(|b| b.set_default("api_key_env", "OPENROUTER_API_KEY"))
            .and_then(|b| b.set_default("timeout_secs", 300))
            .and_then(|b| b.set_default("chamber", "SENATE"))
            .and_then(|b| b.set_default("date", "2025-09-04"))
            .and_then(|b| b.set_default("session", "FORTY-EIGHTH PARLIAMENT, FIRST SESSION"))
            .map_err(|e| PipelineError::Config(e.to_string()))?
            .add_source(env)
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let settings: Settings = built
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        if settings.toc_pages == 0 {
            return Err(PipelineError::Config("toc_pages must be at least 1".into()));
        }
        Ok(settings)
    }

    /// The metadata block written at the top of the output document.
    pub fn metadata(&self) -> Result<DocumentMetadata, PipelineError> {
        let chamber: Chamber = self.chamber.parse().map_err(PipelineError::Config)?;
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|e| PipelineError::Config(format!("date '{}': {}", self.date, e)))?;
        Ok(DocumentMetadata {
            chamber,
            date,
            parliament_session: self.session.clone(),
        })
    }
}

// ── Tests ──

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;

    pub(crate) fn defaults() -> Settings {
        load_with(&[]).unwrap()
    }

    fn load_with(vars: &[(&str, &str)]) -> Result<Settings, PipelineError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::load_from(
            Environment::with_prefix("HANSARD")
                .try_parsing(true)
                .source(Some(map)),
        )
    }

    #[test]
    fn defaults_match_the_senate_run() {
        let s = load_with(&[]).unwrap();
        assert_eq!(s.input, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(s.toc_pages, 3);
        assert_eq!(s.page_offset, 0);
        assert_eq!(s.model, DEFAULT_MODEL);

        let meta = s.metadata().unwrap();
        assert_eq!(meta.chamber, Chamber::Senate);
        assert_eq!(meta.date, NaiveDate::from_ymd_opt(2025, 9, 4).unwrap());
    }

    #[test]
    fn env_overrides_defaults() {
        let s = load_with(&[
            ("HANSARD_TOC_PAGES", "5"),
            ("HANSARD_PAGE_OFFSET", "-2"),
            ("HANSARD_MODEL", "openai/gpt-4o-mini"),
            ("HANSARD_CHAMBER", "HOUSE_OF_REPRESENTATIVES"),
        ])
        .unwrap();
        assert_eq!(s.toc_pages, 5);
        assert_eq!(s.page_offset, -2);
        assert_eq!(s.model, "openai/gpt-4o-mini");
        assert_eq!(s.metadata().unwrap().chamber, Chamber::HouseOfRepresentatives);
    }

    #[test]
    fn zero_toc_pages_rejected() {
        assert!(matches!(
            load_with(&[("HANSARD_TOC_PAGES", "0")]),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn bad_date_is_a_config_error() {
        let s = load_with(&[("HANSARD_DATE", "4 September 2025")]).unwrap();
        assert!(matches!(s.metadata(), Err(PipelineError::Config(_))));
    }
}
