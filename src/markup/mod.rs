//! StrongHelp page markup.
//!
//! Page bodies are plain 8-bit text with a small command language: `#`
//! commands at the start of a line, `{...}` inline commands, `<...>` links,
//! TAB-delimited tables and simple `/italic/`, `*bold*`, `_underline_` runs.
//! [`render`] converts one include-expanded body to an HTML fragment in a
//! single pass.
//!
//! # Examples
//!
//! ```rust
//! use stronghelp::markup::{RenderOptions, render};
//!
//! let rendition = render("See <Other page=>Other>", &RenderOptions::new())?;
//! assert_eq!(rendition.html, "See <a href=\"other.html\">Other page</a><br>");
//! # Ok::<(), stronghelp::markup::MarkupError>(())
//! ```

pub mod command;
mod cursor;
pub mod entities;
pub mod error;
pub mod link;
pub mod options;
mod spans;
mod table;
pub mod transducer;

pub use command::{
    Alignment, FontCommand, FontSpec, IndentChange, InlineCommand, LineCommand, TableLayout,
    WrapMode,
};
pub use error::{MarkupError, MarkupErrorKind, MarkupResult};
pub use link::{PageRef, resolve_href, to_file_link};
pub use options::RenderOptions;
pub use spans::is_valid_style_run;
pub use transducer::{MarkupTransducer, Rendition, render};
