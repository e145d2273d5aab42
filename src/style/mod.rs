//! Page styling.
//!
//! Styles come from up to three [`FontConfig`] layers: a system layer, the
//! manual's `!Configure` file and the page itself (`#background`). A
//! [`StyleContext`] merges them into the CSS of a rendered page.

pub mod colour;
pub mod config;
pub mod context;

pub use colour::{DEFAULT_BACKGROUND, Rgb, WIMP_PALETTE, wimp_colour};
pub use config::{FontConfig, FontShape, FontStyle, PhysicalFont, TextAlign};
pub use context::StyleContext;
