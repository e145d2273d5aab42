//! Error types for markup conversion.

use std::fmt;

use thiserror::Error;

/// Structural failure that aborts the conversion of a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupErrorKind {
    /// `{` without a closing `}`
    UnterminatedInlineCommand,
    /// `<` without a closing `>`
    UnterminatedLink,
    /// `#table` without `#endtable`
    UnterminatedTable,
    /// `#table` layout that is zero or not a number
    InvalidTableLayout(String),
}

impl fmt::Display for MarkupErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkupErrorKind::UnterminatedInlineCommand => write!(f, "No inline command end found"),
            MarkupErrorKind::UnterminatedLink => write!(f, "No link end found"),
            MarkupErrorKind::UnterminatedTable => write!(f, "No #endtable found"),
            MarkupErrorKind::InvalidTableLayout(layout) => {
                write!(f, "Failed to parse #table structure '{}'", layout)
            },
        }
    }
}

/// A page that could not be converted.
///
/// Carries the character offset the scanner had reached and the output
/// produced up to that point, for diagnostics only.
#[derive(Debug, Clone, Error)]
#[error("Parse error at offset {offset}: {kind}")]
pub struct MarkupError {
    pub kind: MarkupErrorKind,
    pub offset: usize,
    pub partial_output: String,
}

/// Result type for markup conversion.
pub type MarkupResult<T> = Result<T, MarkupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_carries_offset() {
        let err = MarkupError {
            kind: MarkupErrorKind::UnterminatedInlineCommand,
            offset: 17,
            partial_output: "Hello".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Parse error at offset 17: No inline command end found"
        );
    }

    #[test]
    fn test_layout_kind_names_layout() {
        let kind = MarkupErrorKind::InvalidTableLayout("columns x".to_string());
        assert!(kind.to_string().contains("columns x"));
    }
}
