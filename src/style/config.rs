//! Font and style definitions from a manual's `!Configure` file.
//!
//! The file is a line list terminated by `#End`:
//!
//! ```text
//! f1 = Homerton.Medium 12
//! f2 = Corpus.Bold 10
//! fStd = f1 rgb 0,0,64
//! fKey = f* align centre
//! background wimp 1
//! #End
//! ```
//!
//! `fNN` lines define physical fonts, other `fNAME` lines define named styles
//! which may refer to physical fonts defined anywhere in the file. Each
//! definition becomes one CSS rule.

use std::collections::BTreeMap;

use log::{debug, warn};
use phf::phf_map;

use super::colour::{Rgb, wimp_colour};
use crate::common::{decode_text, starts_with_ignore_case};

const FALLBACK_FAMILY: &str = "serif";

/// RISC OS font families and their closest CSS family lists.
static FONT_FAMILIES: phf::Map<&'static str, &'static str> = phf_map! {
    "Trinity" => "\"Times New Roman\", Times, Serif",
    "Homerton" => "Arial, Helvetica, Sans-serif",
    "Corpus" => "\"Courier New\", \"Lucida Console\", Courier, Monospace",
    "Selwyn" => "Webdings, Wingdings, ZapfDingbats",
    "Sidney" => "Symbol",
};

/// Style names that style an HTML element rather than a `style_` id.
static ELEMENT_SELECTORS: phf::Map<&'static str, &'static str> = phf_map! {
    "h1" => "h1",
    "h2" => "h2",
    "h3" => "h3",
    "h4" => "h4",
    "h5" => "h5",
    "h6" => "h6",
    "code" => "code",
    "link" => "a:link",
    "std" => "body",
    "table" => "table",
    "strong" => "b",
    "emphasis" => "i",
    "underline" => "u",
};

/// Slant and weight of a font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontShape {
    pub italic: bool,
    pub bold: bool,
}

impl FontShape {
    fn declarations(self) -> &'static str {
        match (self.italic, self.bold) {
            (false, false) => "  font-style: normal;\n  font-weight: normal;\n",
            (true, false) => "  font-style: italic;\n  font-weight: normal;\n",
            (false, true) => "  font-style: normal;\n  font-weight: bold;\n",
            (true, true) => "  font-style: italic;\n  font-weight: bold;\n",
        }
    }
}

/// Horizontal alignment of a style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Centre,
}

impl TextAlign {
    fn parse(text: &str) -> Option<Self> {
        if text.eq_ignore_ascii_case("left") {
            Some(TextAlign::Left)
        } else if text.eq_ignore_ascii_case("right") {
            Some(TextAlign::Right)
        } else if text.eq_ignore_ascii_case("centre") {
            Some(TextAlign::Centre)
        } else {
            None
        }
    }

    fn css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Right => "right",
            TextAlign::Centre => "center",
        }
    }
}

/// `fNN = Font.Name size`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalFont {
    pub number: u32,
    /// Font name as written, e.g. `Homerton.Bold.Oblique`
    pub riscos_name: String,
    pub family: &'static str,
    /// Size in points
    pub size: u32,
    pub shape: FontShape,
}

impl PhysicalFont {
    /// Parse the definition part. The size may be given as `x/y`; only the
    /// horizontal size is used.
    pub fn parse(number: u32, definition: &str) -> Option<Self> {
        let mut tokens = definition.split_whitespace();
        let riscos_name = tokens.next()?;
        let size = tokens.next()?.split('/').next()?.parse().ok()?;
        let mut parts = riscos_name.split('.');
        let family = parts
            .next()
            .and_then(|name| FONT_FAMILIES.get(name).copied())
            .unwrap_or(FALLBACK_FAMILY);
        let mut shape = FontShape::default();
        for part in parts {
            if part.eq_ignore_ascii_case("italic") || part.eq_ignore_ascii_case("oblique") {
                shape.italic = true;
            }
            if part.eq_ignore_ascii_case("bold") {
                shape.bold = true;
            }
        }
        Some(Self {
            number,
            riscos_name: riscos_name.to_string(),
            family,
            size,
            shape,
        })
    }

    pub fn selector(&self) -> String {
        format!("#fontid_{}", self.number)
    }

    /// Declarations of this font, optionally with another shape.
    fn declarations(&self, shape: Option<FontShape>) -> String {
        format!(
            "  font-family: {};\n  font-size: {}pt;\n{}",
            self.family,
            self.size,
            shape.unwrap_or(self.shape).declarations()
        )
    }

    fn rule(&self) -> String {
        format!("{} {{\n{}}}\n", self.selector(), self.declarations(None))
    }
}

/// `fNAME = [fNN | f[/*_]] [align left|right|centre] [rgb r,g,b]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub name: String,
    /// Physical font the style is based on
    pub font: Option<u32>,
    /// `None` leaves slant and weight to the surrounding text
    pub shape: Option<FontShape>,
    pub underline: bool,
    pub colour: Option<Rgb>,
    pub background: Option<Rgb>,
    pub align: Option<TextAlign>,
}

impl FontStyle {
    pub fn parse(name: &str, definition: &str) -> Self {
        let mut style = Self {
            name: name.to_string(),
            ..Self::default()
        };
        let mut tokens = definition.split_whitespace();
        if let Some(base) = tokens.next() {
            match physical_font_number(base) {
                Some(number) => style.font = Some(number),
                None => style.apply_shape(base),
            }
        }
        while let Some(token) = tokens.next() {
            if token.eq_ignore_ascii_case("align") {
                style.align = tokens.next().and_then(TextAlign::parse).or(style.align);
            } else if token.eq_ignore_ascii_case("rgb") {
                match tokens.next().and_then(Rgb::parse) {
                    Some(colour) => style.colour = Some(colour),
                    None => warn!("Ignoring invalid colour in style {}", name),
                }
            }
        }
        style
    }

    /// `f` followed by any of `/`, `*`, `_`.
    fn apply_shape(&mut self, token: &str) {
        if !starts_with_ignore_case(token, "f") {
            return;
        }
        let mut shape = Some(FontShape::default());
        for c in token.chars().skip(1) {
            match c {
                '/' => shape = shape.map(|s| FontShape { italic: true, ..s }),
                '*' => shape = shape.map(|s| FontShape { bold: true, ..s }),
                '_' => {
                    self.underline = true;
                    // A lone `f_` only underlines and keeps the inherited shape
                    if token.len() == 2 {
                        shape = None;
                    }
                },
                _ => {},
            }
        }
        self.shape = shape;
    }

    /// CSS selector: an element for well-known names, else `#style_<name>`.
    pub fn selector(&self) -> String {
        match ELEMENT_SELECTORS.get(self.name.to_ascii_lowercase().as_str()) {
            Some(selector) => selector.to_string(),
            None => format!("#style_{}", self.name),
        }
    }
}

fn physical_font_number(token: &str) -> Option<u32> {
    let digits = token.strip_prefix(['f', 'F'])?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// One style layer: physical fonts, named styles and a background colour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontConfig {
    fonts: Vec<PhysicalFont>,
    styles: Vec<FontStyle>,
    background: Option<Rgb>,
}

impl FontConfig {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `!Configure` text.
    ///
    /// Malformed lines are skipped with a warning. A `std` style is also
    /// applied to tables.
    pub fn parse(text: &str) -> Self {
        let mut config = Self::new();
        let mut style_lines = Vec::new();
        for line in text.lines() {
            if starts_with_ignore_case(line, "#End") {
                break;
            }
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.find('=') {
                Some(equals) if equals > 0 && starts_with_ignore_case(line, "f") => {
                    let name = line[1..equals].trim();
                    let definition = line[equals + 1..].trim();
                    if name.is_empty() {
                        warn!("Skipping style without name: {}", line);
                    } else if name.bytes().all(|b| b.is_ascii_digit()) {
                        match name.parse().ok().and_then(|n| PhysicalFont::parse(n, definition)) {
                            Some(font) => config.fonts.push(font),
                            None => warn!("Skipping malformed font definition: {}", line),
                        }
                    } else {
                        style_lines.push((name, definition));
                    }
                },
                _ if starts_with_ignore_case(line, "background") => {
                    config.set_background(line["background".len()..].trim());
                },
                _ => debug!("Ignoring configuration line: {}", line),
            }
        }

        // Styles come second so they may name fonts defined after them
        for (name, definition) in style_lines {
            config.styles.push(FontStyle::parse(name, definition));
        }
        let table = config
            .styles
            .iter()
            .find(|style| style.name.eq_ignore_ascii_case("std"))
            .map(|std| FontStyle {
                name: "table".to_string(),
                ..std.clone()
            });
        config.styles.extend(table);
        config
    }

    /// Parse `!Configure` file contents.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::parse(&decode_text(bytes))
    }

    /// Apply `wimp N` or `rgb r,g,b`.
    pub fn set_background(&mut self, colour: &str) {
        if let Some(number) = strip_keyword(colour, "wimp") {
            self.background = Some(wimp_colour(number));
        } else if let Some(components) = strip_keyword(colour, "rgb") {
            match Rgb::parse(components) {
                Some(rgb) => self.background = Some(rgb),
                None => warn!("Invalid background colour: {}", colour),
            }
        } else {
            warn!("Unsupported background parameter: {}", colour);
        }
    }

    #[inline]
    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    #[inline]
    pub fn fonts(&self) -> &[PhysicalFont] {
        &self.fonts
    }

    #[inline]
    pub fn styles(&self) -> &[FontStyle] {
        &self.styles
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty() && self.styles.is_empty() && self.background.is_none()
    }

    fn font(&self, number: u32) -> Option<&PhysicalFont> {
        self.fonts.iter().find(|font| font.number == number)
    }

    fn style_rule(&self, style: &FontStyle, selector: &str) -> String {
        let mut rule = format!(
            "{} {{\n  text-decoration: {};\n",
            selector,
            if style.underline { "underline" } else { "none" }
        );
        match style.font {
            // A missing font contributes nothing, not even the shape
            Some(number) => {
                if let Some(font) = self.font(number) {
                    rule.push_str(&font.declarations(style.shape));
                }
            },
            None => {
                if let Some(shape) = style.shape {
                    rule.push_str(shape.declarations());
                }
            },
        }
        if let Some(colour) = style.colour {
            rule.push_str(&format!("  color: {};\n", colour));
        }
        let background = match (selector, self.background) {
            ("body", Some(background)) => Some(background),
            _ => style.background,
        };
        if let Some(background) = background {
            rule.push_str(&format!("  background-color: {};\n", background));
        }
        if let Some(align) = style.align {
            rule.push_str(&format!("  text-align: {};\n", align.css()));
        }
        rule.push_str("}\n");
        rule
    }

    /// CSS rules keyed by selector. Later definitions of a selector win.
    pub fn rules(&self) -> BTreeMap<String, String> {
        let mut rules = BTreeMap::new();
        for font in &self.fonts {
            rules.insert(font.selector(), font.rule());
        }
        for style in &self.styles {
            let selector = style.selector();
            let rule = self.style_rule(style, &selector);
            rules.insert(selector, rule);
        }
        if !rules.contains_key("body") && self.background.is_some() {
            let body = FontStyle {
                name: "std".to_string(),
                ..FontStyle::default()
            };
            rules.insert("body".to_string(), self.style_rule(&body, "body"));
        }
        rules
    }

    /// All rules as one style sheet, in selector order.
    pub fn css(&self) -> String {
        self.rules().into_values().collect()
    }
}

fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    starts_with_ignore_case(text, keyword).then(|| text[keyword.len()..].trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIGURE: &str = "\
# Fonts
f1 = Homerton.Medium 12
f2 = Corpus.Bold.Oblique 10/12
fStd = f1 rgb 0,0,64
fKey = f* align centre
fCode = f2
#End
f3 = Trinity.Medium 14
";

    #[test]
    fn test_physical_fonts() {
        let config = FontConfig::parse(CONFIGURE);
        assert_eq!(config.fonts().len(), 2);
        let corpus = &config.fonts()[1];
        assert_eq!(corpus.size, 10);
        assert!(corpus.shape.bold && corpus.shape.italic);
        assert!(corpus.family.contains("Courier"));
        assert_eq!(
            config.rules()["#fontid_1"],
            "#fontid_1 {\n  font-family: Arial, Helvetica, Sans-serif;\n  font-size: 12pt;\n\
             \x20 font-style: normal;\n  font-weight: normal;\n}\n"
        );
    }

    #[test]
    fn test_unknown_family_falls_back() {
        let font = PhysicalFont::parse(4, "Chancery.Italic 9").unwrap();
        assert_eq!(font.family, "serif");
        assert!(font.shape.italic);
        assert!(PhysicalFont::parse(5, "Homerton").is_none());
    }

    #[test]
    fn test_named_styles() {
        let rules = FontConfig::parse(CONFIGURE).rules();
        assert_eq!(
            rules["#style_Key"],
            "#style_Key {\n  text-decoration: none;\n  font-style: normal;\n  font-weight: bold;\n\
             \x20 text-align: center;\n}\n"
        );
        assert!(rules["code"].contains("font-family: \"Courier New\""));
        assert!(rules["body"].contains("  color: #000040;\n"));
    }

    #[test]
    fn test_std_duplicated_as_table() {
        let config = FontConfig::parse("fStd = f* rgb 10,20,30\nbackground wimp 12\n");
        let rules = config.rules();
        assert!(rules["body"].contains("background-color: #eeeebb"));
        assert!(rules["table"].contains("color: #0a141e"));
        assert!(!rules["table"].contains("background-color"));
    }

    #[test]
    fn test_body_rule_for_background_only() {
        let mut config = FontConfig::new();
        config.set_background("rgb 255,0,0");
        assert_eq!(
            config.css(),
            "body {\n  text-decoration: none;\n  background-color: #ff0000;\n}\n"
        );
    }

    #[test]
    fn test_lone_underline_keeps_inherited_shape() {
        let rules = FontConfig::parse("fNote = f_\nfMark = f_*\n").rules();
        assert_eq!(rules["#style_Note"], "#style_Note {\n  text-decoration: underline;\n}\n");
        assert!(rules["#style_Mark"].contains("text-decoration: underline;\n  font-style: normal;\n  font-weight: bold;"));
    }

    #[test]
    fn test_missing_physical_font_contributes_nothing() {
        let rules = FontConfig::parse("fGone = f9 rgb 1,1,1\n").rules();
        assert_eq!(
            rules["#style_Gone"],
            "#style_Gone {\n  text-decoration: none;\n  color: #010101;\n}\n"
        );
    }

    #[test]
    fn test_background_forms() {
        let mut config = FontConfig::new();
        config.set_background("wimp 8");
        assert_eq!(config.background(), Some(Rgb::from_u32(0x004499)));
        config.set_background("wimp 99");
        assert_eq!(config.background(), Some(Rgb::from_u32(0xFFFFFF)));
        config.set_background("sprite tile");
        assert_eq!(config.background(), Some(Rgb::from_u32(0xFFFFFF)));
        config.set_background("rgb nonsense");
        assert_eq!(config.background(), Some(Rgb::from_u32(0xFFFFFF)));
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let config = FontConfig::parse("f1 = \nf = f*\nfOk = f/\nrandom text\n");
        assert!(config.fonts().is_empty());
        assert_eq!(config.styles().len(), 1);
        assert_eq!(config.styles()[0].shape, Some(FontShape { italic: true, bold: false }));
    }

    #[test]
    fn test_from_bytes_decodes_latin() {
        let config = FontConfig::from_bytes(b"fGr\xf6\xdfe = f*\n");
        assert_eq!(config.styles()[0].selector(), "#style_Größe");
    }
}
