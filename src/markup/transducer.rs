//! Single-pass conversion of StrongHelp markup to HTML.
//!
//! The transducer reads the include-expanded page body once, character by
//! character, and writes HTML as it goes. Lookahead is bounded to the rest
//! of the current line, except for the closing delimiters of links, inline
//! commands and `#table` blocks.
//!
//! | Input | Condition | Result |
//! |-------|-----------|--------|
//! | TAB or `\t` | tab table open | next cell |
//! | TAB | otherwise | `&nbsp;` |
//! | `#` | first on its line | line commands |
//! | `<` | after `\` or `<`, or before `=`, `-`, `<` | literal `<` |
//! | `<` | otherwise | link |
//! | LF | tab table open | next row |
//! | LF | `#wrap on`, next line neither blank nor a command | joined |
//! | LF | otherwise | `<br>`, then a table if the next line has a TAB |
//! | `/`, `*`, `_` | after space or LF | simple style run |
//! | `{` | | inline commands |
//! | `\` | | next character literally |

use std::collections::BTreeSet;
use std::mem;

use log::{debug, warn};
use smallvec::SmallVec;

use super::command::{
    Alignment, FontCommand, FontSpec, InlineCommand, LineCommand, TableLayout, WrapMode,
    split_commands,
};
use super::cursor::Cursor;
use super::entities::{self, NBSP};
use super::error::{MarkupError, MarkupErrorKind, MarkupResult};
use super::link::{complex_link_href, simple_link_href, to_file_link};
use super::options::RenderOptions;
use super::spans::{SpanKind, StyleStack, is_valid_style_run};
use super::table::TabTable;
use crate::common::LIST_BULLET;
use crate::style::FontConfig;

const TABLE_OPEN: &str = "<table border=0 cellpadding=0 cellspacing=0>\n";
const ROW_OPEN: &str = "<tr valign=\"top\">";
const CELL_END_PAD: &str = "&nbsp;&nbsp;&nbsp;";

type Step = Result<(), MarkupErrorKind>;

/// Converted page body plus what the scan collected on the way.
#[derive(Debug, Clone, Default)]
pub struct Rendition {
    pub html: String,
    /// `#tag` and `#subpage` anchor names, in source order
    pub anchors: Vec<String>,
    /// Target of `#parent`
    pub parent: Option<String>,
    /// Target of `#root`
    pub root: Option<String>,
    /// Page-local style layer, filled by `#background`
    pub page_styles: FontConfig,
    /// Rule ids (`style_<name>`) referenced by named fonts
    pub used_styles: BTreeSet<String>,
}

/// Convert one page body to HTML.
pub fn render(body: &str, options: &RenderOptions) -> MarkupResult<Rendition> {
    MarkupTransducer::new(body, *options).render()
}

/// State of one conversion. Instances are used once and never shared.
#[derive(Debug)]
pub struct MarkupTransducer {
    options: RenderOptions,
    cursor: Cursor,
    out: String,
    meta: Rendition,
    /// Set by the first plain text; the break it implies is written last
    text_seen: bool,
    alignment: Option<Alignment>,
    styles: StyleStack,
    table: Option<TabTable>,
    column_fonts: SmallVec<[FontSpec; 4]>,
    cell_close: String,
    cell_code: bool,
    text_code: bool,
    indent: usize,
    wrap: WrapMode,
    previous_wrap: WrapMode,
    prefix: String,
    postfix: String,
    fragment_depth: usize,
}

impl MarkupTransducer {
    pub fn new(body: &str, options: RenderOptions) -> Self {
        Self {
            options,
            cursor: Cursor::new(body),
            out: String::with_capacity(body.len() + body.len() / 2),
            meta: Rendition::default(),
            text_seen: false,
            alignment: None,
            styles: StyleStack::new(),
            table: None,
            column_fonts: SmallVec::new(),
            cell_close: String::new(),
            cell_code: false,
            text_code: false,
            indent: 0,
            wrap: WrapMode::default(),
            previous_wrap: WrapMode::default(),
            prefix: String::new(),
            postfix: String::new(),
            fragment_depth: 0,
        }
    }

    /// Run the conversion.
    ///
    /// A structural failure aborts the page; the error carries the offset
    /// reached and the output written so far.
    pub fn render(mut self) -> MarkupResult<Rendition> {
        if let Err(kind) = self.run() {
            debug!("Markup conversion failed at offset {}: {}", self.cursor.position(), kind);
            return Err(MarkupError {
                kind,
                offset: self.cursor.position(),
                partial_output: self.out,
            });
        }
        self.finish();
        let mut rendition = self.meta;
        rendition.html = self.out;
        Ok(rendition)
    }

    fn run(&mut self) -> Step {
        // Every body starts with an implicit #tab
        if self.cursor.next_line_has_tab() {
            self.begin_table();
        }
        while let Some(c) = self.cursor.advance() {
            match c {
                '\t' => self.tab(),
                '#' if self.cursor.at_line_start() => self.line_commands()?,
                '#' => self.out.push('#'),
                '<' => self.angle_bracket()?,
                '\n' => self.line_feed(),
                '/' | '*' | '_' if matches!(self.cursor.previous(), ' ' | '\n') => self.style_run(c),
                '{' => self.inline_commands()?,
                '\\' => self.escape(),
                _ => {
                    self.text_seen = true;
                    self.push_char(c);
                },
            }
        }
        Ok(())
    }

    fn finish(&mut self) {
        if !self.styles.is_empty() {
            debug!("Closing styles left open at the end of the page");
            self.styles.close_all(&mut self.out);
        }
        if self.alignment.take().is_some() {
            self.out.push_str("</div>\n");
        }
        self.end_table();
        if self.text_seen {
            self.out.push_str("<br>");
        }
        if self.options.footer {
            self.footer();
        }
    }

    // Text output

    #[inline]
    fn keep_spaces(&self) -> bool {
        self.text_code || self.cell_code || self.styles.in_code()
    }

    fn push_char(&mut self, c: char) {
        let previous = self.cursor.previous();
        self.push_char_after(c, previous);
    }

    fn push_char_after(&mut self, c: char, previous: char) {
        if c == ' ' && previous == ' ' && self.keep_spaces() {
            self.out.push_str(NBSP);
        } else {
            entities::push_escaped_char(&mut self.out, c);
        }
    }

    /// Append command text, honouring `\` escapes.
    fn push_text(&mut self, text: &str) {
        self.text_seen = true;
        let mut previous = '\0';
        let mut chars = text.chars();
        while let Some(c) = chars.next() {
            let c = match c {
                '\\' => match chars.next() {
                    Some(escaped) => escaped,
                    None => break,
                },
                _ => c,
            };
            self.push_char_after(c, previous);
            previous = c;
        }
    }

    fn push_indent(&mut self) {
        for _ in 0..self.indent {
            self.out.push_str(NBSP);
        }
    }

    fn escape(&mut self) {
        let Some(c) = self.cursor.advance() else {
            return;
        };
        self.text_seen = true;
        match c {
            't' => self.tab(),
            '<' => {
                self.push_char(c);
                // A following `<` must still open a link
                self.cursor.set_current('_');
            },
            _ => self.push_char(c),
        }
    }

    fn line_feed(&mut self) {
        if self.table.is_some() {
            if !self.cursor.at_end() {
                self.table_row_break();
            }
            return;
        }
        let next = self.cursor.peek();
        if self.wrap == WrapMode::On && !matches!(next, Some('\n' | '#')) {
            self.out.push('\n');
        } else {
            self.out.push_str("<br>\n");
            self.push_indent();
        }
        if self.cursor.next_line_has_tab() {
            self.begin_table();
        }
    }

    fn style_run(&mut self, marker: char) {
        let start = self.cursor.position();
        let Some(end) = self.cursor.find(marker) else {
            self.out.push(marker);
            return;
        };
        let run = self.cursor.text(start, end);
        if !is_valid_style_run(&run) {
            self.out.push(marker);
            return;
        }
        let (open, close) = match marker {
            '/' => ("<i>", "</i>"),
            '*' => ("<b>", "</b>"),
            _ => ("<u>", "</u>"),
        };
        self.out.push_str(open);
        self.push_text(&run);
        self.out.push_str(close);
        self.cursor.jump_to(end + 1);
    }

    // Links and fragments

    fn angle_bracket(&mut self) -> Step {
        let literal = matches!(self.cursor.previous(), '\\' | '<')
            || matches!(self.cursor.peek(), Some('=' | '-' | '<'));
        if literal {
            self.push_char('<');
            return Ok(());
        }
        self.link()
    }

    fn link(&mut self) -> Step {
        let start = self.cursor.position();
        let close = self.cursor.find('>').ok_or(MarkupErrorKind::UnterminatedLink)?;
        let (tag, end) = match self.cursor.find_pair('=', '>') {
            Some(arrow) if arrow + 1 == close => {
                let end = self
                    .cursor
                    .find_from(arrow + 2, '>')
                    .ok_or(MarkupErrorKind::UnterminatedLink)?;
                let target = self.cursor.text(arrow + 2, end);
                let display = self.cursor.slice(start, arrow).to_vec();
                let source: String = display.iter().collect();
                let text = self.fragment(display)?;
                (link_tag(&complex_link_href(&target, &source), &text), end)
            },
            _ => {
                let text = self.cursor.text(start, close);
                let href = simple_link_href(&text, &self.prefix, &self.postfix);
                (link_tag(&href, &entities::escape(&text)), close)
            },
        };
        self.out.push_str(&tag);
        self.cursor.jump_to(end + 1);
        Ok(())
    }

    /// Convert a piece of text with links and inline commands only.
    ///
    /// Styles opened inside the fragment are closed at its end. The main
    /// cursor and output are restored before any error is returned.
    fn fragment(&mut self, source: Vec<char>) -> Result<String, MarkupErrorKind> {
        let saved_cursor = mem::replace(&mut self.cursor, Cursor::from_chars(source));
        let saved_out = mem::take(&mut self.out);
        let saved_styles = mem::take(&mut self.styles);
        self.fragment_depth += 1;
        let result = self.run_fragment();
        self.styles.close_all(&mut self.out);
        self.fragment_depth -= 1;
        self.styles = saved_styles;
        self.cursor = saved_cursor;
        let html = mem::replace(&mut self.out, saved_out);
        result.map(|()| html)
    }

    fn run_fragment(&mut self) -> Step {
        while let Some(c) = self.cursor.advance() {
            match c {
                '<' => self.angle_bracket()?,
                '{' => self.inline_commands()?,
                '\\' => {
                    if let Some(escaped) = self.cursor.advance() {
                        self.push_char(escaped);
                    }
                },
                _ => self.push_char(c),
            }
        }
        Ok(())
    }

    // Commands

    fn inline_commands(&mut self) -> Step {
        let start = self.cursor.position();
        let end = self
            .cursor
            .find('}')
            .ok_or(MarkupErrorKind::UnterminatedInlineCommand)?;
        let body = self.cursor.text(start, end);
        self.cursor.jump_to(end + 1);
        for command in split_commands(&body) {
            match InlineCommand::parse(command) {
                InlineCommand::ToggleItalic => self.styles.toggle(SpanKind::Italic, &mut self.out),
                InlineCommand::ToggleBold => self.styles.toggle(SpanKind::Bold, &mut self.out),
                InlineCommand::ToggleUnderline => {
                    self.styles.toggle(SpanKind::Underline, &mut self.out)
                },
                InlineCommand::Font(font) => self.font(font),
                InlineCommand::Align(alignment) => self.align(alignment),
                InlineCommand::Unknown(text) => {
                    warn!("Unidentified inline command: {}", text);
                    if self.options.debug_placeholders {
                        self.out.push('{');
                        entities::push_escaped(&mut self.out, text);
                        self.out.push('}');
                    }
                },
            }
        }
        Ok(())
    }

    fn line_commands(&mut self) -> Step {
        let line = self.cursor.take_line();
        if line.starts_with(' ') {
            self.out.push_str(&format!("<!--{} -->\n", line));
            return Ok(());
        }
        let mut tab_command = false;
        for text in split_commands(&line) {
            match LineCommand::parse(text) {
                LineCommand::Font(font) => self.font(font),
                LineCommand::Rule(width) => self.rule(width),
                LineCommand::Align(alignment) => self.align(alignment),
                LineCommand::Subpage(name) => self.subpage(name),
                LineCommand::Tag(name) => {
                    self.out.push_str(&format!(
                        "<a name=\"{}\"></a>",
                        entities::escape_attribute(name)
                    ));
                    self.meta.anchors.push(name.to_string());
                },
                LineCommand::Indent(change) => self.indent = change.apply(self.indent),
                LineCommand::Prefix(prefix) => self.prefix = prefix.to_string(),
                LineCommand::Postfix(postfix) => self.postfix = postfix.to_string(),
                LineCommand::Table(layout) => {
                    self.end_table();
                    self.grid_table(layout)?;
                },
                LineCommand::Tab(formats) => {
                    tab_command = true;
                    self.end_table();
                    self.column_fonts = formats
                        .split(',')
                        .map(str::trim)
                        .filter(|format| !format.is_empty())
                        .map(FontSpec::from_column_format)
                        .collect();
                    if self.cursor.next_line_has_tab() {
                        self.begin_table();
                    }
                },
                LineCommand::Wrap(Some(mode)) => {
                    self.previous_wrap = self.wrap;
                    self.wrap = mode;
                },
                LineCommand::Wrap(None) => self.wrap = self.previous_wrap,
                LineCommand::Root(name) => self.meta.root = non_empty(name),
                LineCommand::Parent(name) => self.meta.parent = non_empty(name),
                LineCommand::Background(colour) => self.meta.page_styles.set_background(colour),
                LineCommand::Ignored(text) => debug!("Command ignored: #{}", text),
                LineCommand::Unknown(text) => {
                    warn!("Unknown command encountered: #{}", text);
                    if self.options.debug_placeholders {
                        self.out.push('#');
                        self.push_text(text);
                        self.out.push_str("<br>\n");
                    }
                },
            }
        }
        // The line feed is consumed, so look at the next line directly
        if !tab_command && self.table.is_none() && self.cursor.next_line_has_tab() {
            self.begin_table();
        } else if self.table.is_none() && self.cursor.peek() != Some('#') {
            self.push_indent();
        }
        Ok(())
    }

    fn font(&mut self, command: FontCommand<'_>) {
        match command {
            FontCommand::WithText(font, text) => self.font_with_text(font, text),
            FontCommand::Open(FontSpec::Std) | FontCommand::Close => {
                self.styles.close_font(&mut self.out);
            },
            FontCommand::Open(font) => {
                self.note_style(&font);
                self.styles.open_font(font, &mut self.out);
            },
        }
    }

    fn font_with_text(&mut self, font: FontSpec, text: &str) {
        self.note_style(&font);
        self.out.push_str(&font.open_tag());
        self.text_code = font.is_code();
        self.push_text(text);
        self.text_code = false;
        self.out.push_str(&font.close_tag());
        if matches!(font, FontSpec::Heading(_)) {
            self.out.push('\n');
        }
    }

    fn note_style(&mut self, font: &FontSpec) {
        if let Some(id) = font.style_id() {
            self.meta.used_styles.insert(id);
        }
    }

    /// Switch alignment; only one alignment wrapper is open at a time.
    fn align(&mut self, alignment: Option<Alignment>) {
        let Some(alignment) = alignment else {
            warn!("Illegal alignment, continuing with the current one");
            return;
        };
        let wanted = (alignment != Alignment::Left).then_some(alignment);
        if wanted == self.alignment {
            return;
        }
        if self.alignment.is_some() {
            self.out.push_str("</div>\n");
            if self.table.is_some() && self.fragment_depth == 0 {
                self.table_row_break();
            }
        }
        if let Some(alignment) = wanted {
            self.out.push_str(&format!("<div align=\"{}\">", alignment.html()));
        }
        self.alignment = wanted;
    }

    fn rule(&mut self, width: Option<i32>) {
        let tag = match (width, self.alignment) {
            (None, _) => "<hr>".to_string(),
            (Some(width), Some(alignment)) => {
                format!("<hr align=\"{}\" width=\"{}%\">", alignment.html(), width)
            },
            (Some(width), None) => format!("<hr width=\"{}%\">", width),
        };
        self.out.push_str(&tag);
        if self.table.is_some() {
            self.table_row_break();
        } else {
            self.out.push('\n');
        }
    }

    fn subpage(&mut self, name: &str) {
        self.end_table();
        self.out.push_str("<hr>\n<hr>\n<h2>");
        let title = self.cursor.take_line();
        entities::push_escaped(&mut self.out, &title);
        self.out.push_str("</h2>\n");
        let anchor = name.to_lowercase();
        self.out.push_str(&format!(
            "<a name=\"{}\"></a>\n",
            entities::escape_attribute(&anchor)
        ));
        self.meta.anchors.push(anchor);
    }

    fn footer(&mut self) {
        if self.meta.parent.is_none() && self.meta.root.is_none() {
            return;
        }
        self.out.push_str("\n<br>\n<hr>\n<div align=\"left\">\n");
        if let Some(parent) = &self.meta.parent {
            self.out.push_str(&link_tag(&to_file_link(parent), "[Parent]"));
        }
        if let Some(root) = &self.meta.root {
            self.out.push_str(&link_tag(&to_file_link(root), "[Root]"));
        }
        self.out.push_str("\n</div>");
    }

    // Tables

    fn begin_table(&mut self) {
        self.out.push_str(TABLE_OPEN);
        self.out.push_str(ROW_OPEN);
        self.out.push_str("\n<td");
        self.table = Some(TabTable::new());
        self.first_cell();
    }

    fn first_cell(&mut self) {
        let offset = self.out.len();
        if let Some(table) = self.table.as_mut() {
            table.start_row(offset);
        }
        self.out.push('>');
        self.open_cell_font(0);
        self.push_indent();
    }

    fn tab(&mut self) {
        if self.table.is_none() {
            self.out.push_str(NBSP);
            return;
        }
        // Bullets only get a narrow gap to their text
        let pad = if self.cursor.previous() == LIST_BULLET { NBSP } else { CELL_END_PAD };
        self.out.push_str(pad);
        self.close_cell_font();
        self.out.push_str("</td><td>");
        let offset = self.out.len() - 1;
        let Some(column) = self.table.as_mut().map(|table| table.next_cell(offset)) else {
            return;
        };
        self.open_cell_font(column);
        // Repeated TABs do not create empty columns
        while self.cursor.peek() == Some('\t')
            || (self.cursor.peek() == Some('\\') && self.cursor.peek_second() == Some('t'))
        {
            if self.cursor.advance() == Some('\\') {
                self.cursor.advance();
            }
        }
    }

    fn table_row_break(&mut self) {
        self.close_cell_font();
        self.out.push_str(NBSP);
        self.out.push_str("</td></tr>\n");
        self.out.push_str(ROW_OPEN);
        self.out.push_str("<td");
        self.first_cell();
    }

    fn end_table(&mut self) {
        let Some(table) = self.table.take() else {
            return;
        };
        self.close_cell_font();
        self.out.push_str("</td></tr>\n</table>\n");
        table.finish(&mut self.out);
        self.column_fonts.clear();
    }

    fn open_cell_font(&mut self, column: usize) {
        let Some(font) = self.column_fonts.get(column).cloned() else {
            return;
        };
        if font == FontSpec::Std {
            return;
        }
        self.note_style(&font);
        self.out.push_str(&font.open_tag());
        self.cell_close = font.close_tag();
        self.cell_code = font.is_code();
    }

    fn close_cell_font(&mut self) {
        let close = mem::take(&mut self.cell_close);
        self.out.push_str(&close);
        self.cell_code = false;
    }

    /// `#table` grid, filled column by column from the lines up to `#endtable`.
    fn grid_table(&mut self, parameter: &str) -> Step {
        let mut cells = Vec::new();
        loop {
            if self.cursor.at_end() {
                return Err(MarkupErrorKind::UnterminatedTable);
            }
            let line = self.cursor.take_line();
            if line.trim().eq_ignore_ascii_case("#endtable") {
                break;
            }
            cells.push(line);
        }
        let (rows, columns) = TableLayout::parse(parameter)?.grid(cells.len());
        self.out.push_str(TABLE_OPEN);
        for row in 0..rows {
            self.out.push_str(ROW_OPEN);
            for column in 0..columns {
                self.out.push_str("<td>");
                match cells.get(rows * column + row) {
                    Some(cell) => {
                        let html = self.fragment(cell.chars().collect())?;
                        self.out.push_str(&html);
                        self.out.push_str(CELL_END_PAD);
                    },
                    None => self.out.push_str(NBSP),
                }
                self.out.push_str("</td>");
            }
            self.out.push_str("</tr>");
        }
        self.out.push_str("</table>\n");
        Ok(())
    }
}

fn link_tag(href: &str, text: &str) -> String {
    format!("<a href=\"{}\">{}</a>", entities::escape_attribute(href), text)
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
