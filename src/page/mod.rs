//! Pages: title and body extraction, `#include` expansion and rendering.
//!
//! A [`Page`] is built from the raw text of an image file. Its first line is
//! the title; the rest is the body, with `#include` directives replaced by
//! the text of the named pages as supplied by a [`PageProvider`]. The body is
//! converted to HTML on first request and the result kept.

pub mod assembler;
#[allow(clippy::module_inception)]
pub mod page;
pub mod provider;

pub use assembler::{NO_TITLE, PageAssembler};
pub use page::Page;
pub use provider::{NoPages, PageProvider};
