use super::page::Page;

/// Source of other pages, used for `#include` and link resolution.
pub trait PageProvider {
    /// Text of a page before include expansion, or `None` if it does not exist.
    fn raw_page(&self, name: &str) -> Option<String>;

    /// A page ready for rendering, or `None` if it does not exist.
    fn page(&self, name: &str) -> Option<Page<'_>>;
}

/// Provider without any pages, for rendering stand-alone text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPages;

impl PageProvider for NoPages {
    fn raw_page(&self, _name: &str) -> Option<String> {
        None
    }

    fn page(&self, _name: &str) -> Option<Page<'_>> {
        None
    }
}
