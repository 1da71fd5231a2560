//! Site configuration for the announcements scraper.
//!
//! The upstream site, its endpoints, the browser-like request headers, and the
//! category taxonomy all live in one immutable [`SiteConfig`] value that is
//! passed into the fetcher at construction. The built-in defaults target
//! `www.dit.uoi.gr`; a YAML file given via `--config` can override any subset
//! of fields (unset fields keep their defaults).
//!
//! # Example config file
//!
//! ```yaml
//! articles_url: "https://www.dit.uoi.gr/getarticles.php"
//! categories:
//!   - label: "Μαθημα"
//!     value: "Μαθημα"
//! ```

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Error;

/// One entry of the site's category taxonomy.
///
/// `label` is the human-readable name attached to persisted articles;
/// `value` is what goes into the `category=` form field. For dit.uoi.gr
/// the two coincide.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Category {
    pub label: String,
    pub value: String,
}

impl Category {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

/// Immutable scraper configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL relative article links are resolved against.
    pub base_url: String,
    /// Endpoint answering the per-category POST.
    pub articles_url: String,
    /// Referer header value; the site expects the public articles page.
    pub referer: String,
    /// Browser User-Agent; the site may reject requests without one.
    pub user_agent: String,
    /// Categories fetched in order, one request each.
    pub categories: Vec<Category>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        let labels = [
            "Διαλεξη",
            "Εργαστηριο",
            "Μαθημα",
            "Γραμματειας / Τμημα",
            "Φορεις του ΤΕΙ",
            "Λοιπες Ανακοινωσεις",
            "Μεταπτυχιακο Προγραμμα Σπουδων",
            "Εκδηλωσεις",
            "Γραμματειας / Τμημα, Πρωτοετεις",
        ];
        Self {
            base_url: "https://www.dit.uoi.gr/".to_string(),
            articles_url: "https://www.dit.uoi.gr/getarticles.php".to_string(),
            referer: "https://www.dit.uoi.gr/articles.php".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36"
                .to_string(),
            categories: labels.iter().map(|l| Category::new(l, l)).collect(),
        }
    }
}

/// Load the site config, either the built-in defaults or a YAML override file.
pub async fn load(path: Option<&str>) -> Result<SiteConfig, Error> {
    let Some(path) = path else {
        return Ok(SiteConfig::default());
    };
    let raw = tokio::fs::read_to_string(path).await?;
    let config: SiteConfig = serde_yaml::from_str(&raw)?;
    if config.categories.is_empty() {
        return Err(Error::Config(format!(
            "{path}: categories must not be empty"
        )));
    }
    info!(
        path,
        categories = config.categories.len(),
        "Loaded site config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_targets_dit_uoi() {
        let config = SiteConfig::default();
        assert_eq!(config.articles_url, "https://www.dit.uoi.gr/getarticles.php");
        assert_eq!(config.categories.len(), 9);
        assert_eq!(config.categories[2].label, "Μαθημα");
        assert_eq!(config.categories[2].value, "Μαθημα");
    }

    #[test]
    fn yaml_override_keeps_unset_defaults() {
        let yaml = r#"
articles_url: "http://localhost:8080/getarticles.php"
categories:
  - label: "Lectures"
    value: "Lectures"
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.articles_url, "http://localhost:8080/getarticles.php");
        assert_eq!(config.categories.len(), 1);
        // untouched fields fall back to defaults
        assert_eq!(config.base_url, "https://www.dit.uoi.gr/");
        assert!(config.user_agent.contains("Mozilla/5.0"));
    }
}
