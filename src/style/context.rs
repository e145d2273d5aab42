//! Layered style sheets.

use std::collections::BTreeMap;

use super::config::FontConfig;

/// System-wide and manual-wide style layers.
///
/// The page layer is supplied per render, since `#background` is only known
/// after a page has been converted.
#[derive(Debug, Clone, Default)]
pub struct StyleContext {
    system: FontConfig,
    manual: FontConfig,
}

impl StyleContext {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_system(mut self, config: FontConfig) -> Self {
        self.system = config;
        self
    }

    #[inline]
    pub fn with_manual(mut self, config: FontConfig) -> Self {
        self.manual = config;
        self
    }

    #[inline]
    pub fn system(&self) -> &FontConfig {
        &self.system
    }

    #[inline]
    pub fn manual(&self) -> &FontConfig {
        &self.manual
    }

    /// Merge system, manual and page rules; later layers replace whole
    /// rules with the same selector.
    pub fn rules(&self, page: &FontConfig) -> BTreeMap<String, String> {
        let mut rules = self.system.rules();
        rules.extend(self.manual.rules());
        rules.extend(page.rules());
        rules
    }

    /// Merged style sheet for one page.
    pub fn css(&self, page: &FontConfig) -> String {
        self.rules(page).into_values().collect()
    }
}
