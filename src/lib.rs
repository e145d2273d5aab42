//! StrongHelp - a reader and HTML renderer for RISC OS StrongHelp manuals
//!
//! A StrongHelp manual is a single `HELP` image file (filetype `3D6`) holding
//! a small tree of directories, pages, images and links. Pages are plain
//! Windows-1252 text in a line-oriented markup with `#` commands, `{...}`
//! inline commands and `<...>` hyperlinks.
//!
//! # Features
//!
//! - **Image parser**: Zero-copy reading of the `HELP`/`DIR$`/`DATA` block
//!   structure into an arena tree, with global case-insensitive lookup
//! - **Markup renderer**: Single-pass conversion of page markup to HTML 3.2,
//!   including tables, fonts and styles, alignment, indentation and links
//! - **Style sheets**: `!Configure` font and style definitions merged with a
//!   system layer and per-page `#fH`/`#background` overrides into CSS
//! - **Manual library**: Pages served by name with `#include` expansion and
//!   links followed across manuals
//! - **Export**: Whole manuals written out as static HTML sites or extracted
//!   byte-for-byte
//!
//! # Example - Rendering a page
//!
//! ```no_run
//! use stronghelp::{Manual, PageProvider};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manual = Manual::open("Manuals/BASIC,3d6")?;
//! if let Some(page) = manual.page("PRINT") {
//!     println!("{}", page.title());
//!     println!("{}", page.to_html_document(manual.styles()));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Converting markup directly
//!
//! ```
//! use stronghelp::{RenderOptions, render};
//!
//! let rendition = render("#tag top\nPress *Return*", &RenderOptions::default())?;
//! assert_eq!(rendition.anchors, vec!["top".to_string()]);
//! # Ok::<(), stronghelp::markup::MarkupError>(())
//! ```
//!
//! # Example - Exporting a manual
//!
//! ```no_run
//! use stronghelp::{ExportOptions, Manual, export_manual};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let manual = Manual::open("Manuals/BASIC,3d6")?;
//! let report = export_manual(&manual, "site/basic", &ExportOptions::new())?;
//! println!("{} pages written", report.files);
//! # Ok(())
//! # }
//! ```

/// Shared binary reader, text codec, container detection and error type
pub mod common;

/// Writing manuals out as HTML sites or raw files
pub mod export;

/// `HELP` image file parser
///
/// This module reads the block structure of an image into an [`ImageTree`]
/// and slices file payloads out of the shared buffer.
///
/// [`ImageTree`]: image::ImageTree
pub mod image;

/// Manuals and the cross-manual library
pub mod manual;

/// Page markup to HTML conversion
pub mod markup;

/// Pages: title, body, includes and rendering
pub mod page;

/// Fonts, styles and colours from `!Configure` and page commands
pub mod style;

// Re-export commonly used types for convenience
pub use common::{Error, Result};
pub use export::{ExportMode, ExportOptions, ExportReport, export_manual};
pub use image::{EntryId, HelpImage, ImageTree};
pub use manual::{Manual, ManualLibrary, ResolvedPage};
pub use markup::{MarkupError, RenderOptions, Rendition, render};
pub use page::{NoPages, Page, PageProvider};
pub use style::{FontConfig, StyleContext};
