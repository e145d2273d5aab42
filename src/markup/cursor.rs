//! Character cursor over page source.

/// Forward cursor with one character of history and bounded lookahead.
///
/// `'\0'` stands for "no character", both before the first character and
/// past the end.
#[derive(Debug, Clone)]
pub(crate) struct Cursor {
    chars: Vec<char>,
    pos: usize,
    current: char,
    previous: char,
}

impl Cursor {
    pub fn new(text: &str) -> Self {
        Self::from_chars(text.chars().collect())
    }

    pub fn from_chars(chars: Vec<char>) -> Self {
        Self {
            chars,
            pos: 0,
            current: '\0',
            previous: '\0',
        }
    }

    /// Index of the next character to be read.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> char {
        self.previous
    }

    /// Whether the current character is the first of its line.
    #[inline]
    pub fn at_line_start(&self) -> bool {
        matches!(self.previous, '\0' | '\n')
    }

    /// Read the next character.
    pub fn advance(&mut self) -> Option<char> {
        let c = *self.chars.get(self.pos)?;
        self.pos += 1;
        self.previous = self.current;
        self.current = c;
        Some(c)
    }

    /// Replace the current character, so the next one sees it as previous.
    #[inline]
    pub fn set_current(&mut self, c: char) {
        self.current = c;
    }

    #[inline]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    #[inline]
    pub fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    /// Absolute index of the next `c` at or after the read position.
    pub fn find(&self, c: char) -> Option<usize> {
        self.find_from(self.pos, c)
    }

    pub fn find_from(&self, from: usize, c: char) -> Option<usize> {
        self.chars
            .get(from..)?
            .iter()
            .position(|&x| x == c)
            .map(|offset| from + offset)
    }

    /// Absolute index of the next `first` immediately followed by `second`.
    pub fn find_pair(&self, first: char, second: char) -> Option<usize> {
        self.chars
            .get(self.pos..)?
            .windows(2)
            .position(|pair| pair[0] == first && pair[1] == second)
            .map(|offset| self.pos + offset)
    }

    pub fn slice(&self, from: usize, to: usize) -> &[char] {
        let end = to.min(self.chars.len());
        self.chars.get(from.min(end)..end).unwrap_or(&[])
    }

    pub fn text(&self, from: usize, to: usize) -> String {
        self.slice(from, to).iter().collect()
    }

    /// Continue reading at `pos`, as if everything before it had been read.
    pub fn jump_to(&mut self, pos: usize) {
        self.pos = pos.min(self.chars.len());
        self.current = self.pos.checked_sub(1).and_then(|i| self.chars.get(i)).copied().unwrap_or('\0');
        self.previous = self.pos.checked_sub(2).and_then(|i| self.chars.get(i)).copied().unwrap_or('\0');
    }

    /// Read the rest of the line, consuming its line feed.
    pub fn take_line(&mut self) -> String {
        let mut line = String::new();
        while let Some(c) = self.peek() {
            self.advance();
            if c == '\n' {
                break;
            }
            line.push(c);
        }
        line
    }

    /// Whether the line starting at the read position contains a TAB.
    pub fn next_line_has_tab(&self) -> bool {
        self.chars
            .get(self.pos..)
            .unwrap_or(&[])
            .iter()
            .take_while(|&&c| c != '\n')
            .any(|&c| c == '\t')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_tracks_previous() {
        let mut cursor = Cursor::new("ab");
        assert!(cursor.at_line_start());
        assert_eq!(cursor.advance(), Some('a'));
        assert!(cursor.at_line_start());
        assert_eq!(cursor.advance(), Some('b'));
        assert_eq!(cursor.previous(), 'a');
        assert_eq!(cursor.advance(), None);
        assert!(cursor.at_end());
    }

    #[test]
    fn test_take_line_consumes_line_feed() {
        let mut cursor = Cursor::new("one\ntwo");
        assert_eq!(cursor.take_line(), "one");
        assert_eq!(cursor.current(), '\n');
        assert_eq!(cursor.take_line(), "two");
        assert!(cursor.at_end());
        assert_eq!(cursor.take_line(), "");
    }

    #[test]
    fn test_next_line_has_tab() {
        let mut cursor = Cursor::new("a\tb\nc\nd\te");
        assert!(cursor.next_line_has_tab());
        cursor.take_line();
        assert!(!cursor.next_line_has_tab());
        cursor.take_line();
        assert!(cursor.next_line_has_tab());
    }

    #[test]
    fn test_find_pair_and_jump() {
        let mut cursor = Cursor::new("See=>Other>");
        assert_eq!(cursor.find_pair('=', '>'), Some(3));
        assert_eq!(cursor.find('>'), Some(4));
        assert_eq!(cursor.find_from(5, '>'), Some(10));
        assert_eq!(cursor.text(5, 10), "Other");
        cursor.jump_to(11);
        assert!(cursor.at_end());
        assert_eq!(cursor.current(), '>');
    }
}
