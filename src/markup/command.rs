//! Sub-lexer for line commands (`#...`) and inline brace commands (`{...}`).
//!
//! A command line is split at `;` and each part is classified into a
//! tagged command value. Keywords are matched case-insensitively as
//! prefixes, in table order, so longer keywords sharing a prefix with a
//! shorter one (`spritefile`/`sprite`, `table`/`tab`) are listed first.

use log::warn;
use smallvec::SmallVec;

use super::error::MarkupErrorKind;
use crate::common::starts_with_ignore_case;

/// Split a command line at `;`, trimming each part and dropping empty ones.
pub fn split_commands(line: &str) -> SmallVec<[&str; 4]> {
    line.split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

/// Font or style selected by an `f` command or a `#tab` column format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSpec {
    /// `fstd`, the standard font
    Std,
    /// `fcode`, monospaced with preserved runs of spaces
    Code,
    /// `fh1` .. `fh6`
    Heading(u8),
    /// `f*`
    Bold,
    /// `f/`
    Italic,
    /// `f_`
    Underline,
    /// Any other name, rendered through the `style_<name>` rule
    Named(String),
}

impl FontSpec {
    /// Classify the name following the leading `f`.
    pub fn from_name(name: &str) -> Self {
        if name.is_empty() || name.eq_ignore_ascii_case("std") {
            return FontSpec::Std;
        }
        if name.eq_ignore_ascii_case("code") {
            return FontSpec::Code;
        }
        match name {
            "*" => return FontSpec::Bold,
            "/" => return FontSpec::Italic,
            "_" => return FontSpec::Underline,
            _ => {},
        }
        let bytes = name.as_bytes();
        if bytes.len() == 2 && bytes[0].eq_ignore_ascii_case(&b'h') && (b'1'..=b'6').contains(&bytes[1]) {
            return FontSpec::Heading(bytes[1] - b'0');
        }
        FontSpec::Named(name.to_string())
    }

    /// Classify a font name given in a line command.
    ///
    /// Only `code` and `h1`..`h6` have tags of their own here; every other
    /// name, `*`, `/`, `_` and `std` included, is a named style.
    pub fn from_line_name(name: &str) -> Self {
        match Self::from_name(name) {
            spec @ (FontSpec::Code | FontSpec::Heading(_)) => spec,
            _ => FontSpec::Named(name.to_string()),
        }
    }

    /// Parse a `#tab` column format such as `fcode` or `f*`.
    pub fn from_column_format(format: &str) -> Self {
        let mut chars = format.chars();
        chars.next();
        Self::from_name(chars.as_str())
    }

    /// Opening tag; empty for the standard font.
    pub fn open_tag(&self) -> String {
        match self {
            FontSpec::Std => String::new(),
            FontSpec::Code => "<code>".to_string(),
            FontSpec::Heading(level) => format!("<h{}>", level),
            FontSpec::Bold => "<b>".to_string(),
            FontSpec::Italic => "<i>".to_string(),
            FontSpec::Underline => "<u>".to_string(),
            FontSpec::Named(name) => format!("<span id=\"style_{}\">", name),
        }
    }

    /// Closing tag matching [`FontSpec::open_tag`].
    pub fn close_tag(&self) -> String {
        match self {
            FontSpec::Std => String::new(),
            FontSpec::Code => "</code>".to_string(),
            FontSpec::Heading(level) => format!("</h{}>", level),
            FontSpec::Bold => "</b>".to_string(),
            FontSpec::Italic => "</i>".to_string(),
            FontSpec::Underline => "</u>".to_string(),
            FontSpec::Named(_) => "</span>".to_string(),
        }
    }

    /// Style rule id referenced by the tag, if any.
    pub fn style_id(&self) -> Option<String> {
        match self {
            FontSpec::Named(name) => Some(format!("style_{}", name)),
            _ => None,
        }
    }

    #[inline]
    pub fn is_code(&self) -> bool {
        matches!(self, FontSpec::Code)
    }
}

/// An `f` command, shared by line and inline commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontCommand<'a> {
    /// `fNAME:text`, styles only the text after the colon
    WithText(FontSpec, &'a str),
    /// `fNAME`, styles everything up to the next bare `f`
    Open(FontSpec),
    /// bare `f`
    Close,
}

impl<'a> FontCommand<'a> {
    /// Parse a command starting with `f`, naming fonts with `classify`.
    fn parse(command: &'a str, classify: fn(&str) -> FontSpec) -> Self {
        // command[0] is the ASCII `f`
        if let Some(colon) = command.find(':') {
            return FontCommand::WithText(classify(&command[1..colon]), &command[colon + 1..]);
        }
        match &command[1..] {
            "" => FontCommand::Close,
            name => FontCommand::Open(classify(name)),
        }
    }
}

/// Text alignment set by `align`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Right,
    Centre,
}

impl Alignment {
    /// Parse an alignment parameter; empty means left.
    pub fn parse(parameter: &str) -> Option<Self> {
        if parameter.is_empty() || parameter.eq_ignore_ascii_case("left") {
            Some(Alignment::Left)
        } else if parameter.eq_ignore_ascii_case("right") {
            Some(Alignment::Right)
        } else if parameter.eq_ignore_ascii_case("centre") {
            Some(Alignment::Centre)
        } else {
            None
        }
    }

    /// HTML attribute value.
    pub fn html(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Right => "right",
            Alignment::Centre => "center",
        }
    }
}

/// Line wrapping mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Lines are joined unless separated by a blank line or a command line
    On,
    /// Every line feed breaks
    Off,
    /// Wrap, but never join
    #[default]
    NoJoin,
}

/// Deepest indent level, in non-breaking spaces.
pub const MAX_INDENT: usize = 256;

/// Change of the indent level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentChange {
    Absolute(i32),
    Relative(i32),
    Reset,
}

impl IndentChange {
    pub fn parse(parameter: &str) -> Self {
        if parameter.is_empty() {
            return IndentChange::Reset;
        }
        match parameter.parse::<i32>() {
            Ok(value) if parameter.starts_with('+') => IndentChange::Relative(value),
            Ok(value) => IndentChange::Absolute(value),
            Err(_) => IndentChange::Reset,
        }
    }

    /// New indent level, between zero and [`MAX_INDENT`].
    pub fn apply(self, current: usize) -> usize {
        let level = match self {
            IndentChange::Absolute(value) => i64::from(value),
            IndentChange::Relative(value) => current as i64 + i64::from(value),
            IndentChange::Reset => 0,
        };
        if level > MAX_INDENT as i64 {
            warn!("Indent {} clamped to {}", level, MAX_INDENT);
            return MAX_INDENT;
        }
        usize::try_from(level.max(0)).unwrap_or(0)
    }
}

/// Layout of a `#table` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLayout {
    Columns(usize),
    Lines(usize),
}

impl TableLayout {
    /// Parse `columns N`, `lines N` or a bare column count.
    pub fn parse(parameter: &str) -> Result<Self, MarkupErrorKind> {
        let invalid = || MarkupErrorKind::InvalidTableLayout(parameter.to_string());
        let (count, layout): (&str, fn(usize) -> TableLayout) =
            if starts_with_ignore_case(parameter, "columns") {
                (parameter[7..].trim(), TableLayout::Columns)
            } else if starts_with_ignore_case(parameter, "lines") {
                (parameter[5..].trim(), TableLayout::Lines)
            } else {
                (parameter.trim(), TableLayout::Columns)
            };
        match count.parse::<usize>() {
            Ok(0) | Err(_) => Err(invalid()),
            Ok(n) => Ok(layout(n)),
        }
    }

    /// `(rows, columns)` needed for `cells` cells.
    ///
    /// Cells fill the grid column by column. Trailing rows or columns that
    /// could only ever be empty are dropped.
    pub fn grid(self, cells: usize) -> (usize, usize) {
        let most = cells.max(1);
        match self {
            TableLayout::Columns(columns) => (cells.div_ceil(columns), columns.min(most)),
            TableLayout::Lines(rows) => (rows.min(most), cells.div_ceil(rows)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Line,
    Align,
    Subpage,
    Tag,
    Below,
    Bottom,
    Draw,
    Indent,
    SpriteFile,
    Sprite,
    Prefix,
    Postfix,
    Table,
    Tab,
    Wrap,
    Root,
    Parent,
    Background,
}

const KEYWORDS: &[(&str, Keyword)] = &[
    ("line", Keyword::Line),
    ("align", Keyword::Align),
    ("subpage", Keyword::Subpage),
    ("tag", Keyword::Tag),
    ("below", Keyword::Below),
    ("bottom", Keyword::Bottom),
    ("draw", Keyword::Draw),
    ("indent", Keyword::Indent),
    ("spritefile", Keyword::SpriteFile),
    ("sprite", Keyword::Sprite),
    ("prefix", Keyword::Prefix),
    ("postfix", Keyword::Postfix),
    ("table", Keyword::Table),
    ("tab", Keyword::Tab),
    ("wrap", Keyword::Wrap),
    ("root", Keyword::Root),
    ("parent", Keyword::Parent),
    ("background", Keyword::Background),
];

/// One `;`-separated part of a `#` command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineCommand<'a> {
    Font(FontCommand<'a>),
    /// `line [NN]`, optional width in percent
    Rule(Option<i32>),
    /// `align ...`; `None` for an unknown parameter
    Align(Option<Alignment>),
    /// `subpage NAME`; the title is the following source line
    Subpage(&'a str),
    Tag(&'a str),
    Indent(IndentChange),
    Prefix(&'a str),
    Postfix(&'a str),
    /// `table LAYOUT`, cells follow up to `#endtable`
    Table(&'a str),
    /// `tab [f1,f2,...]`
    Tab(&'a str),
    /// `wrap on|off|nojoin`; `None` restores the previous mode
    Wrap(Option<WrapMode>),
    Root(&'a str),
    Parent(&'a str),
    Background(&'a str),
    /// Recognised directive without HTML rendition
    Ignored(&'a str),
    Unknown(&'a str),
}

impl<'a> LineCommand<'a> {
    /// Classify one command; `text` is already trimmed.
    pub fn parse(text: &'a str) -> Self {
        if starts_with_ignore_case(text, "f") {
            return LineCommand::Font(FontCommand::parse(text, FontSpec::from_line_name));
        }
        let Some(&(word, keyword)) = KEYWORDS
            .iter()
            .find(|(word, _)| starts_with_ignore_case(text, word))
        else {
            return LineCommand::Unknown(text);
        };
        let parameter = text[word.len()..].trim();
        match keyword {
            Keyword::Line => LineCommand::Rule(parameter.parse().ok()),
            Keyword::Align => LineCommand::Align(Alignment::parse(parameter)),
            Keyword::Subpage => LineCommand::Subpage(parameter),
            Keyword::Tag => LineCommand::Tag(parameter),
            Keyword::Below | Keyword::Bottom | Keyword::Draw | Keyword::SpriteFile | Keyword::Sprite => {
                LineCommand::Ignored(text)
            },
            Keyword::Indent => LineCommand::Indent(IndentChange::parse(parameter)),
            Keyword::Prefix => LineCommand::Prefix(parameter),
            Keyword::Postfix => LineCommand::Postfix(parameter),
            Keyword::Table => LineCommand::Table(parameter),
            Keyword::Tab => LineCommand::Tab(parameter),
            Keyword::Wrap => {
                if parameter.is_empty() {
                    LineCommand::Wrap(None)
                } else if parameter.eq_ignore_ascii_case("on") {
                    LineCommand::Wrap(Some(WrapMode::On))
                } else if parameter.eq_ignore_ascii_case("off") {
                    LineCommand::Wrap(Some(WrapMode::Off))
                } else if parameter.eq_ignore_ascii_case("nojoin") {
                    LineCommand::Wrap(Some(WrapMode::NoJoin))
                } else {
                    LineCommand::Ignored(text)
                }
            },
            Keyword::Root => LineCommand::Root(parameter),
            Keyword::Parent => LineCommand::Parent(parameter),
            Keyword::Background => LineCommand::Background(parameter),
        }
    }
}

/// One `;`-separated part of a `{...}` inline command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineCommand<'a> {
    ToggleItalic,
    ToggleUnderline,
    ToggleBold,
    Font(FontCommand<'a>),
    Align(Option<Alignment>),
    Unknown(&'a str),
}

impl<'a> InlineCommand<'a> {
    pub fn parse(text: &'a str) -> Self {
        match text {
            "/" => InlineCommand::ToggleItalic,
            "_" => InlineCommand::ToggleUnderline,
            "*" => InlineCommand::ToggleBold,
            _ if starts_with_ignore_case(text, "f") => InlineCommand::Font(FontCommand::parse(text, FontSpec::from_name)),
            _ if starts_with_ignore_case(text, "align") => {
                InlineCommand::Align(Alignment::parse(text[5..].trim()))
            },
            _ => InlineCommand::Unknown(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_commands() {
        let parts = split_commands("fcode ; line; ;align centre");
        assert_eq!(parts.as_slice(), &["fcode", "line", "align centre"]);
    }

    #[test]
    fn test_font_forms() {
        assert_eq!(
            LineCommand::parse("fcode:x = 1"),
            LineCommand::Font(FontCommand::WithText(FontSpec::Code, "x = 1"))
        );
        assert_eq!(
            LineCommand::parse("fH2"),
            LineCommand::Font(FontCommand::Open(FontSpec::Heading(2)))
        );
        assert_eq!(LineCommand::parse("f"), LineCommand::Font(FontCommand::Close));
        assert_eq!(
            LineCommand::parse("fEmphasis"),
            LineCommand::Font(FontCommand::Open(FontSpec::Named("Emphasis".to_string())))
        );
        assert_eq!(
            InlineCommand::parse("f*:bold"),
            InlineCommand::Font(FontCommand::WithText(FontSpec::Bold, "bold"))
        );
    }

    #[test]
    fn test_line_fonts_use_named_styles() {
        let named = |name: &str| FontSpec::Named(name.to_string());
        assert_eq!(
            LineCommand::parse("f*:bold"),
            LineCommand::Font(FontCommand::WithText(named("*"), "bold"))
        );
        assert_eq!(
            LineCommand::parse("fstd:plain"),
            LineCommand::Font(FontCommand::WithText(named("std"), "plain"))
        );
        assert_eq!(LineCommand::parse("f_"), LineCommand::Font(FontCommand::Open(named("_"))));
        assert_eq!(LineCommand::parse("f/"), LineCommand::Font(FontCommand::Open(named("/"))));
        assert_eq!(
            LineCommand::parse("fh1:Title"),
            LineCommand::Font(FontCommand::WithText(FontSpec::Heading(1), "Title"))
        );
    }

    #[test]
    fn test_heading_needs_digit_in_range() {
        assert_eq!(FontSpec::from_name("h9"), FontSpec::Named("h9".to_string()));
        assert_eq!(FontSpec::from_name("h6"), FontSpec::Heading(6));
    }

    #[test]
    fn test_column_formats() {
        assert_eq!(FontSpec::from_column_format("fstd"), FontSpec::Std);
        assert_eq!(FontSpec::from_column_format("fcode"), FontSpec::Code);
        assert_eq!(FontSpec::from_column_format("f_"), FontSpec::Underline);
        assert_eq!(FontSpec::from_column_format(""), FontSpec::Std);
    }

    #[test]
    fn test_keyword_order() {
        assert_eq!(LineCommand::parse("spritefile x"), LineCommand::Ignored("spritefile x"));
        assert_eq!(LineCommand::parse("table columns 3"), LineCommand::Table("columns 3"));
        assert_eq!(LineCommand::parse("tab fcode,f*"), LineCommand::Tab("fcode,f*"));
        assert_eq!(LineCommand::parse("Tag Intro"), LineCommand::Tag("Intro"));
        assert_eq!(LineCommand::parse("frobnicate"), LineCommand::Font(FontCommand::Open(FontSpec::Named("robnicate".to_string()))));
        assert_eq!(LineCommand::parse("zap"), LineCommand::Unknown("zap"));
    }

    #[test]
    fn test_rule_width() {
        assert_eq!(LineCommand::parse("line"), LineCommand::Rule(None));
        assert_eq!(LineCommand::parse("line 50"), LineCommand::Rule(Some(50)));
        assert_eq!(LineCommand::parse("line wide"), LineCommand::Rule(None));
    }

    #[test]
    fn test_wrap_modes() {
        assert_eq!(LineCommand::parse("wrap"), LineCommand::Wrap(None));
        assert_eq!(LineCommand::parse("wrap On"), LineCommand::Wrap(Some(WrapMode::On)));
        assert_eq!(LineCommand::parse("wrap nojoin"), LineCommand::Wrap(Some(WrapMode::NoJoin)));
        assert_eq!(LineCommand::parse("wrap sometimes"), LineCommand::Ignored("wrap sometimes"));
    }

    #[test]
    fn test_alignment() {
        assert_eq!(Alignment::parse(""), Some(Alignment::Left));
        assert_eq!(Alignment::parse("Centre"), Some(Alignment::Centre));
        assert_eq!(Alignment::parse("center"), None);
        assert_eq!(Alignment::Centre.html(), "center");
    }

    #[test]
    fn test_indent() {
        assert_eq!(IndentChange::parse("4").apply(2), 4);
        assert_eq!(IndentChange::parse("+3").apply(2), 5);
        assert_eq!(IndentChange::parse("").apply(7), 0);
        assert_eq!(IndentChange::parse("lots").apply(7), 0);
        assert_eq!(IndentChange::parse("-5").apply(7), 0);
        assert_eq!(IndentChange::parse("10000000").apply(0), MAX_INDENT);
        assert_eq!(IndentChange::parse("+200").apply(200), MAX_INDENT);
    }

    #[test]
    fn test_table_layouts() {
        assert_eq!(TableLayout::parse("columns 3"), Ok(TableLayout::Columns(3)));
        assert_eq!(TableLayout::parse("Lines 2"), Ok(TableLayout::Lines(2)));
        assert_eq!(TableLayout::parse("4"), Ok(TableLayout::Columns(4)));
        assert!(TableLayout::parse("columns 0").is_err());
        assert!(TableLayout::parse("many").is_err());
        assert_eq!(TableLayout::Columns(3).grid(7), (3, 3));
        assert_eq!(TableLayout::Lines(2).grid(5), (2, 3));
        assert_eq!(TableLayout::Columns(2_000_000).grid(1), (1, 1));
        assert_eq!(TableLayout::Columns(4).grid(2), (1, 2));
        assert_eq!(TableLayout::Lines(2_000_000).grid(3), (3, 1));
        assert_eq!(TableLayout::Columns(3).grid(0), (0, 1));
    }
}
