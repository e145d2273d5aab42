//! Title/body split and `#include` expansion.

use log::{debug, warn};
use memchr::memchr;

use super::provider::PageProvider;
use crate::common::starts_with_ignore_case;
use crate::markup::RenderOptions;

/// Title of a page whose text has no line feed.
pub const NO_TITLE: &str = "No title found.";

const INCLUDE: &str = "include";

/// Turns raw page text into a title and an include-expanded body.
pub struct PageAssembler<'a> {
    provider: &'a dyn PageProvider,
    include_limit: usize,
}

impl<'a> PageAssembler<'a> {
    pub fn new(provider: &'a dyn PageProvider) -> Self {
        Self {
            provider,
            include_limit: RenderOptions::default().include_limit,
        }
    }

    #[inline]
    pub fn with_include_limit(mut self, limit: usize) -> Self {
        self.include_limit = limit;
        self
    }

    /// Split at the first line feed.
    ///
    /// Without a line feed the title is [`NO_TITLE`] and the whole text is
    /// the body.
    pub fn split_title_body(text: &str) -> (&str, &str) {
        match memchr(b'\n', text.as_bytes()) {
            Some(lf) => (&text[..lf], &text[lf + 1..]),
            None => (NO_TITLE, text),
        }
    }

    /// Title and expanded body of a page.
    pub fn assemble(&self, text: &str) -> (String, String) {
        let (title, body) = Self::split_title_body(text);
        (title.to_string(), self.preprocess(body))
    }

    /// Replace every line-leading `#include <page>` with that page's raw text.
    ///
    /// Included text is scanned again, so nested includes expand too. A page
    /// that cannot be found, or any directive past the include limit, is
    /// removed. The line feed ending the directive is kept.
    pub fn preprocess(&self, text: &str) -> String {
        let mut result = text.to_string();
        let mut expansions = 0;
        let mut from = 0;
        while let Some(found) = memchr(b'#', &result.as_bytes()[from..]) {
            let hash = from + found;
            from = hash + 1;
            if hash > 0 && result.as_bytes()[hash - 1] != b'\n' {
                continue;
            }
            if !is_include(&result[hash + 1..]) {
                continue;
            }
            let line_end = memchr(b'\n', &result.as_bytes()[hash..]).map_or(result.len(), |lf| hash + lf);
            let target = result[hash + 1 + INCLUDE.len()..line_end].trim().to_string();
            let replacement = if expansions < self.include_limit {
                expansions += 1;
                self.provider.raw_page(&target).unwrap_or_else(|| {
                    debug!("Included page {} not found, directive removed", target);
                    String::new()
                })
            } else {
                warn!("Include limit of {} reached, #include {} removed", self.include_limit, target);
                String::new()
            };
            result.replace_range(hash..line_end, &replacement);
            from = hash;
        }
        result
    }
}

/// `include` followed by whitespace or the end of the text.
fn is_include(command: &str) -> bool {
    starts_with_ignore_case(command, INCLUDE)
        && command[INCLUDE.len()..]
            .chars()
            .next()
            .is_none_or(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::page::Page;

    struct Pages(HashMap<&'static str, &'static str>);

    impl PageProvider for Pages {
        fn raw_page(&self, name: &str) -> Option<String> {
            self.0.get(name).map(|text| text.to_string())
        }

        fn page(&self, name: &str) -> Option<Page<'_>> {
            self.raw_page(name).map(|text| Page::new(text, self))
        }
    }

    fn pages(entries: &[(&'static str, &'static str)]) -> Pages {
        Pages(entries.iter().copied().collect())
    }

    #[test]
    fn test_split_title_body() {
        assert_eq!(PageAssembler::split_title_body("Title\nBody\n"), ("Title", "Body\n"));
        assert_eq!(PageAssembler::split_title_body("Only"), (NO_TITLE, "Only"));
        assert_eq!(PageAssembler::split_title_body("\n"), ("", ""));
    }

    #[test]
    fn test_missing_include_is_removed() {
        let provider = pages(&[]);
        let assembler = PageAssembler::new(&provider);
        assert_eq!(assembler.preprocess("a\n#include Missing\nb"), "a\n\nb");
        assert_eq!(assembler.preprocess("#Include Missing"), "");
    }

    #[test]
    fn test_include_spliced() {
        let provider = pages(&[("Common", "Shared\ntext")]);
        let assembler = PageAssembler::new(&provider);
        assert_eq!(assembler.preprocess("a\n#include Common\nb"), "a\nShared\ntext\nb");
    }

    #[test]
    fn test_nested_includes() {
        let provider = pages(&[("Outer", "#include Inner\nouter"), ("Inner", "inner")]);
        let assembler = PageAssembler::new(&provider);
        assert_eq!(assembler.preprocess("#include Outer\n"), "inner\nouter\n");
    }

    #[test]
    fn test_only_line_leading_directives() {
        let provider = pages(&[("X", "replaced")]);
        let assembler = PageAssembler::new(&provider);
        assert_eq!(assembler.preprocess("see #include X"), "see #include X");
        assert_eq!(assembler.preprocess("#includes X\n#line"), "#includes X\n#line");
    }

    #[test]
    fn test_self_include_stops_at_limit() {
        let provider = pages(&[("Loop", "x\n#include Loop")]);
        let assembler = PageAssembler::new(&provider).with_include_limit(3);
        assert_eq!(assembler.preprocess("#include Loop"), "x\nx\nx\n");
    }

    #[test]
    fn test_assemble() {
        let provider = pages(&[("Part", "two")]);
        let assembler = PageAssembler::new(&provider);
        let (title, body) = assembler.assemble("Heading\none\n#include Part\n");
        assert_eq!(title, "Heading");
        assert_eq!(body, "one\ntwo\n");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        fn line() -> impl Strategy<Value = String> {
            prop_oneof![
                "[a-z #]{0,12}",
                Just("#include A".to_string()),
                Just("#include B".to_string()),
                Just("#include Missing".to_string()),
                Just("#line".to_string()),
            ]
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            #[test]
            fn prop_expansion_is_idempotent(lines in prop::collection::vec(line(), 0..8)) {
                let provider = pages(&[("A", "alpha\n#include B"), ("B", "beta\n#include A")]);
                let assembler = PageAssembler::new(&provider).with_include_limit(16);
                let once = assembler.preprocess(&lines.join("\n"));
                let twice = assembler.preprocess(&once);
                prop_assert_eq!(once, twice);
            }
        }
    }
}
