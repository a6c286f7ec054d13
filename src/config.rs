//! Header alias configuration.
//!
//! Search analytics exports name their columns differently depending on the
//! UI language and the tool that produced them. [`HeaderAliases`] folds those
//! variants to the canonical names the parser requires. Extra aliases are
//! read from a plain JSON object:
//!
//! ```json
//! {
//!   "Meistbesuchte Seiten": "Landing Page",
//!   "Klicks": "Clicks"
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::error::Result;

pub const LANDING_PAGE: &str = "Landing Page";
pub const CLICKS: &str = "Clicks";
pub const IMPRESSIONS: &str = "Impressions";

static DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("Top pages", LANDING_PAGE),
    ("Pages les plus populaires", LANDING_PAGE),
    ("Clics", CLICKS),
    ("Url Clicks", CLICKS),
];

/// Maps exported header names to canonical column names.
#[derive(Debug, Clone)]
pub struct HeaderAliases {
    entries: HashMap<String, String>,
}

impl Default for HeaderAliases {
    fn default() -> Self {
        Self {
            entries: DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| (from.to_string(), to.to_string()))
                .collect(),
        }
    }
}

impl HeaderAliases {
    /// Loads aliases from a JSON file at `path`, layered over the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let extra: HashMap<String, String> = serde_json::from_str(&content)?;
        debug!(path = %path.display(), count = extra.len(), "Loaded header aliases");

        let mut aliases = Self::default();
        aliases.entries.extend(extra);
        Ok(aliases)
    }

    /// Returns the canonical name for `header`, or `header` itself when no
    /// alias is configured.
    pub fn canonical<'a>(&'a self, header: &'a str) -> &'a str {
        self.entries.get(header).map_or(header, String::as_str)
    }

    /// Iterates over all `(variant, canonical)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
