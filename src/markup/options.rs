/// Options controlling how a page is converted to HTML.
///
/// # Examples
///
/// ```rust
/// use stronghelp::markup::RenderOptions;
///
/// let options = RenderOptions::new()
///     .with_debug_placeholders(false)
///     .with_include_limit(16);
/// assert!(options.footer);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit unknown commands visibly instead of dropping them
    pub debug_placeholders: bool,
    /// Append the `[Parent]` / `[Root]` navigation footer
    pub footer: bool,
    /// Maximum number of `#include` expansions per page
    pub include_limit: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            debug_placeholders: cfg!(debug_assertions),
            footer: true,
            include_limit: 256,
        }
    }
}

impl RenderOptions {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether unknown commands are rendered as visible placeholders.
    #[inline]
    pub fn with_debug_placeholders(mut self, enabled: bool) -> Self {
        self.debug_placeholders = enabled;
        self
    }

    /// Set whether the navigation footer is written.
    #[inline]
    pub fn with_footer(mut self, enabled: bool) -> Self {
        self.footer = enabled;
        self
    }

    /// Set the maximum number of `#include` expansions per page.
    ///
    /// Directives beyond the limit are removed without being expanded, which
    /// stops pages that include themselves.
    #[inline]
    pub fn with_include_limit(mut self, limit: usize) -> Self {
        self.include_limit = limit;
        self
    }
}
