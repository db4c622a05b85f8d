//! Class-fragment selector strategy
//!
//! Upstream class names carry generated suffixes that change between
//! deployments, so elements are located by a fragment of their class
//! attribute rather than an exact class. The fragment and the match mode are
//! configuration; this module turns them into compiled `scraper` selectors.

use crate::config::{MatchMode, SelectorConfig};
use crate::ConfigError;
use scraper::Selector;

/// A class fragment plus the way it is matched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMatcher {
    pub fragment: String,
    pub mode: MatchMode,
}

impl ClassMatcher {
    pub fn new(fragment: impl Into<String>, mode: MatchMode) -> Self {
        Self {
            fragment: fragment.into(),
            mode,
        }
    }

    /// Renders the matcher as a CSS selector string
    ///
    /// | Mode | Selector |
    /// |------|----------|
    /// | substring | `[class*="frag"]` |
    /// | prefix | `[class^="frag"], [class*=" frag"]` |
    /// | exact | `[class~="frag"]` |
    pub fn css(&self) -> String {
        let frag = &self.fragment;
        match self.mode {
            MatchMode::Substring => format!("[class*=\"{}\"]", frag),
            MatchMode::Prefix => format!("[class^=\"{}\"], [class*=\" {}\"]", frag, frag),
            MatchMode::Exact => format!("[class~=\"{}\"]", frag),
        }
    }

    /// Compiles the matcher into a selector
    ///
    /// # Returns
    ///
    /// * `Ok(Selector)` - Ready to use against a parsed document
    /// * `Err(String)` - The fragment is empty, contains whitespace or quotes,
    ///   or does not form a valid selector
    pub fn compile(&self) -> Result<Selector, String> {
        let frag = &self.fragment;
        if frag.is_empty() {
            return Err("class fragment cannot be empty".to_string());
        }

        if frag
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c == '\\')
        {
            return Err(format!(
                "class fragment '{}' must not contain whitespace, quotes or backslashes",
                frag
            ));
        }

        Selector::parse(&self.css()).map_err(|e| format!("'{}': {}", frag, e))
    }
}

/// Compiled selectors for one product card and its three fields
#[derive(Debug, Clone)]
pub struct CardSelectors {
    pub card: Selector,
    pub title: Selector,
    pub price: Selector,
    pub offers: Selector,
}

impl CardSelectors {
    /// Compiles all four selectors from the `[selectors]` config section
    pub fn from_config(config: &SelectorConfig) -> Result<Self, ConfigError> {
        let compile = |field: &str, fragment: &str| {
            ClassMatcher::new(fragment, config.match_mode)
                .compile()
                .map_err(|e| ConfigError::InvalidSelector(format!("{} selector: {}", field, e)))
        };

        Ok(Self {
            card: compile("card", config.card.as_str())?,
            title: compile("title", config.title.as_str())?,
            price: compile("price", config.price.as_str())?,
            offers: compile("offers", config.offers.as_str())?,
        })
    }
}
