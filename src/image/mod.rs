//! StrongHelp image files.
//!
//! An image is a small read-only filesystem in one buffer: a `HELP` root header,
//! nested `DIR$` directory blocks and `DATA` payload blocks. Parsing produces a
//! [`HelpImage`], which owns the [`ImageTree`] and the buffer payloads are
//! sliced from.
//!
//! # Examples
//!
//! ```rust,no_run
//! use stronghelp::image::HelpImage;
//!
//! let image = HelpImage::open("Manual,3d6")?;
//! if let Some(root_page) = image.entry("!Root") {
//!     println!("{} bytes", image.data(root_page).len());
//! }
//! # Ok::<(), stronghelp::Error>(())
//! ```

pub mod container;
pub mod entry;
pub mod file;
pub mod load_exec;
pub mod parser;
pub mod tree;

pub use container::unwrap_container;
pub use entry::{Entry, EntryId, EntryKind};
pub use file::{HelpImage, ImageHeader};
pub use load_exec::LoadExec;
pub use parser::{ImageParser, ImageParserConfig};
pub use tree::ImageTree;
