//! Colours used by style definitions and `#background`.

use std::fmt;

/// 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Colour used when a WIMP colour number is invalid.
pub const DEFAULT_BACKGROUND: Rgb = Rgb::from_u32(0xFFFFFF);

/// The 16 standard desktop (WIMP) colours.
///
/// Colour 1 is lightened from the desktop's `0xDDDDDD` so that pages using it
/// as background stay readable.
pub const WIMP_PALETTE: [Rgb; 16] = [
    Rgb::from_u32(0xFFFFFF),
    Rgb::from_u32(0xF1F1F1),
    Rgb::from_u32(0xBBBBBB),
    Rgb::from_u32(0x999999),
    Rgb::from_u32(0x777777),
    Rgb::from_u32(0x555555),
    Rgb::from_u32(0x333333),
    Rgb::from_u32(0x000000),
    Rgb::from_u32(0x004499),
    Rgb::from_u32(0xEEEE00),
    Rgb::from_u32(0x00CC00),
    Rgb::from_u32(0xDD0000),
    Rgb::from_u32(0xEEEEBB),
    Rgb::from_u32(0x558800),
    Rgb::from_u32(0xFFBB00),
    Rgb::from_u32(0x00BBFF),
];

impl Rgb {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from `0xRRGGBB`.
    #[inline]
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    /// Parse `r,g,b` (an optional fourth alpha component is ignored).
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split(',').map(str::trim);
        let r = parts.next()?.parse().ok()?;
        let g = parts.next()?.parse().ok()?;
        let b = parts.next()?.parse().ok()?;
        Some(Self { r, g, b })
    }

    /// CSS notation, `#rrggbb`.
    pub fn to_css(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Look up a WIMP colour by its number as written in a manual.
///
/// Anything that is not a number from 0 to 15 gives white.
pub fn wimp_colour(number: &str) -> Rgb {
    number
        .trim()
        .parse::<usize>()
        .ok()
        .and_then(|index| WIMP_PALETTE.get(index).copied())
        .unwrap_or(DEFAULT_BACKGROUND)
}
