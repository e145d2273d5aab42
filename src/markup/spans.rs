//! Open inline style spans.
//!
//! The brace toggles `{/}`, `{*}` and `{_}` and the open-ended font form
//! (`{fcode}` ... `{f}`) may interleave freely in the source. HTML needs
//! properly nested tags, so the open spans are kept on a stack: closing a
//! span that is not on top closes the spans above it first and reopens
//! them afterwards.

use smallvec::SmallVec;

use super::command::FontSpec;

/// Kind of an open span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SpanKind {
    Italic,
    Bold,
    Underline,
    /// The single open-ended font; at most one is open at a time
    Font(FontSpec),
}

impl SpanKind {
    fn open_tag(&self) -> String {
        match self {
            SpanKind::Italic => "<i>".to_string(),
            SpanKind::Bold => "<b>".to_string(),
            SpanKind::Underline => "<u>".to_string(),
            SpanKind::Font(font) => font.open_tag(),
        }
    }

    fn close_tag(&self) -> String {
        match self {
            SpanKind::Italic => "</i>".to_string(),
            SpanKind::Bold => "</b>".to_string(),
            SpanKind::Underline => "</u>".to_string(),
            SpanKind::Font(font) => font.close_tag(),
        }
    }

    #[inline]
    fn is_font(&self) -> bool {
        matches!(self, SpanKind::Font(_))
    }
}

/// Stack of open inline spans, innermost last.
#[derive(Debug, Default)]
pub(crate) struct StyleStack {
    open: SmallVec<[SpanKind; 4]>,
}

impl StyleStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Whether runs of spaces must be kept (inside an open `fcode`).
    pub fn in_code(&self) -> bool {
        self.open.iter().any(|span| matches!(span, SpanKind::Font(font) if font.is_code()))
    }

    /// Toggle italic, bold or underline.
    pub fn toggle(&mut self, kind: SpanKind, out: &mut String) {
        match self.open.iter().rposition(|span| *span == kind) {
            Some(index) => self.close_at(index, out),
            None => self.push(kind, out),
        }
    }

    /// Open `font` until the next bare `f`, replacing any open font.
    pub fn open_font(&mut self, font: FontSpec, out: &mut String) {
        self.close_font(out);
        self.push(SpanKind::Font(font), out);
    }

    /// Close the open font, if any. Returns whether one was open.
    pub fn close_font(&mut self, out: &mut String) -> bool {
        match self.open.iter().rposition(SpanKind::is_font) {
            Some(index) => {
                self.close_at(index, out);
                true
            },
            None => false,
        }
    }

    /// Close everything, innermost first.
    pub fn close_all(&mut self, out: &mut String) {
        while let Some(span) = self.open.pop() {
            out.push_str(&span.close_tag());
        }
    }

    fn push(&mut self, kind: SpanKind, out: &mut String) {
        out.push_str(&kind.open_tag());
        self.open.push(kind);
    }

    fn close_at(&mut self, index: usize, out: &mut String) {
        let above: SmallVec<[SpanKind; 4]> = self.open.drain(index + 1..).collect();
        for span in above.iter().rev() {
            out.push_str(&span.close_tag());
        }
        if let Some(span) = self.open.pop() {
            out.push_str(&span.close_tag());
        }
        for span in above {
            self.push(span, out);
        }
    }
}

/// Whether the text between two simple style markers may be styled.
///
/// The run must be non-empty, contain only letters and spaces, and start and
/// end with a letter.
pub fn is_valid_style_run(text: &str) -> bool {
    let starts = text.chars().next().is_some_and(char::is_alphabetic);
    let ends = text.chars().next_back().is_some_and(char::is_alphabetic);
    starts && ends && text.chars().all(|c| c.is_alphabetic() || c == ' ')
}
