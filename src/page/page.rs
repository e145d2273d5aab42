//! A single page of a manual.

use chrono::Local;
use log::warn;
use once_cell::unsync::OnceCell;

use super::assembler::PageAssembler;
use super::provider::PageProvider;
use crate::common::decode_text;
use crate::markup::{MarkupError, MarkupResult, RenderOptions, Rendition, entities, render};
use crate::style::{FontConfig, StyleContext};

const DOCTYPE: &str = "<!DOCTYPE HTML PUBLIC \"-//W3C//DTD HTML 3.2 Final//EN\">";

/// One page: its source text, and title, body and rendition computed on
/// first use.
///
/// # Examples
///
/// ```rust
/// use stronghelp::page::{NoPages, Page};
///
/// let page = Page::new("Greeting\nHello *there*", &NoPages);
/// assert_eq!(page.title(), "Greeting");
/// assert_eq!(page.rendered_output()?, "Hello <b>there</b><br>");
/// # Ok::<(), stronghelp::markup::MarkupError>(())
/// ```
pub struct Page<'a> {
    source: String,
    provider: &'a dyn PageProvider,
    options: RenderOptions,
    parts: OnceCell<(String, String)>,
    rendition: OnceCell<MarkupResult<Rendition>>,
}

impl<'a> Page<'a> {
    pub fn new(source: impl Into<String>, provider: &'a dyn PageProvider) -> Self {
        Self {
            source: source.into(),
            provider,
            options: RenderOptions::default(),
            parts: OnceCell::new(),
            rendition: OnceCell::new(),
        }
    }

    /// Page from the payload of an image file.
    pub fn from_bytes(bytes: &[u8], provider: &'a dyn PageProvider) -> Self {
        Self::new(decode_text(bytes), provider)
    }

    #[inline]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Text as stored, title line included.
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    fn parts(&self) -> &(String, String) {
        self.parts.get_or_init(|| {
            PageAssembler::new(self.provider)
                .with_include_limit(self.options.include_limit)
                .assemble(&self.source)
        })
    }

    /// First line of the page.
    pub fn title(&self) -> &str {
        &self.parts().0
    }

    /// Everything after the title, includes expanded.
    pub fn body(&self) -> &str {
        &self.parts().1
    }

    /// Converted body with anchors and page styles. Computed once.
    pub fn rendition(&self) -> Result<&Rendition, &MarkupError> {
        self.rendition
            .get_or_init(|| render(self.body(), &self.options))
            .as_ref()
    }

    /// HTML fragment of the body.
    pub fn rendered_output(&self) -> MarkupResult<&str> {
        self.rendition()
            .map(|rendition| rendition.html.as_str())
            .map_err(Clone::clone)
    }

    /// Complete HTML 3.2 document with the merged style sheet.
    ///
    /// A body that cannot be converted is replaced by an error notice.
    pub fn to_html_document(&self, styles: &StyleContext) -> String {
        let empty = FontConfig::new();
        let (page_styles, body) = match self.rendition() {
            Ok(rendition) => (&rendition.page_styles, rendition.html.clone()),
            Err(err) => {
                warn!("Page \"{}\" could not be converted: {}", self.title(), err);
                (&empty, format!("<p>{}</p>", entities::escape(&err.to_string())))
            },
        };
        let created = Local::now().format("%Y-%m-%d %H:%M:%S");
        format!(
            "{}\n<!-- Created {} by stronghelp {} -->\n<html>\n<head>\n<title>{}</title>\n\
             <style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>",
            DOCTYPE,
            created,
            env!("CARGO_PKG_VERSION"),
            entities::escape(self.title()),
            styles.css(page_styles),
            body
        )
    }
}

impl std::fmt::Debug for Page<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("source_len", &self.source.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
