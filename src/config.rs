//! Application configuration.

use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// The marks page of the production eMarks deployment.
const DEFAULT_MARKS_URL: &str = "https://emarks.utoronto.ca/emarks/pages/marks/marks.xhtml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// URL of the marks page; every token fetch and form submission
    /// targets this page, and redirect targets resolve against it.
    pub marks_url: String,
    /// Session cookie of an already-authenticated browser session,
    /// e.g. `"JSESSIONID=..."`. Login is out of scope; without this the
    /// site redirects every request.
    pub session_cookie: Option<String>,
    /// Path of the JSON file backing the record store.
    pub data_file: PathBuf,
    /// Base log level for this crate's targets.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            marks_url: DEFAULT_MARKS_URL.to_string(),
            session_cookie: None,
            data_file: PathBuf::from("emarks-data.json"),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from defaults, an optional `Emarks.toml`, and
    /// `EMARKS_`-prefixed environment variables, later sources winning.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file("Emarks.toml"))
            .merge(Env::prefixed("EMARKS_"))
            .extract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.marks_url, DEFAULT_MARKS_URL);
        assert_eq!(config.session_cookie, None);
        assert_eq!(config.data_file, PathBuf::from("emarks-data.json"));
        assert_eq!(config.log_level, "info");
    }
}
