//! Page-name to link-path transform and its inverse.
//!
//! Pages are addressed by names such as `Sub.Page`, `.anchor` or
//! `Manual:Page`. Generated HTML links use relative paths that mirror the
//! exported directory layout, so a link can be followed both in a browser
//! and by resolving it back to a page name.

use crate::common::starts_with_ignore_case;

/// Transform a page name into a link path.
///
/// - `.anchor` becomes `#anchor` (same page).
/// - `Foo.Bar` becomes `foo/bar.html`.
/// - `Manual:Page` becomes `../manual/page.html` (sibling manual).
pub fn to_file_link(target: &str) -> String {
    if let Some(anchor) = target.strip_prefix('.') {
        return format!("#{}", anchor.to_lowercase());
    }
    let cross_manual = target.find(':').is_some_and(|index| index > 0);
    let mut link = target.replace('.', "/").to_lowercase();
    link.push_str(".html");
    if cross_manual {
        format!("../{}", link.replace(':', "/"))
    } else {
        link
    }
}

/// Target of the complex link form `<Text=>Target>`.
///
/// `#url <address>` links to the address verbatim; a bare `#url` uses the
/// display text as address.
pub(crate) fn complex_link_href(target: &str, display_source: &str) -> String {
    if starts_with_ignore_case(target, "#url ") {
        target[5..].to_string()
    } else if target.eq_ignore_ascii_case("#url") {
        display_source.to_string()
    } else {
        to_file_link(target)
    }
}

/// Target of the simple link form `<Target>`.
///
/// Only the text up to the first space is the page name; the active
/// `#prefix` and `#postfix` are wrapped around it.
pub(crate) fn simple_link_href(text: &str, prefix: &str, postfix: &str) -> String {
    let name = match text.find(' ') {
        Some(index) if index > 0 => &text[..index],
        _ => text,
    };
    to_file_link(&format!("{}{}{}", prefix, name, postfix))
}

/// Where a generated link points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRef {
    /// Anchor on the current page, without the `#`
    Anchor(String),
    /// Address outside any manual
    External(String),
    /// Page of the current manual, as a lookup name
    Local(String),
    /// Page of another manual
    Foreign { manual: String, page: String },
}

/// Resolve a link produced by [`to_file_link`] back to a page reference.
///
/// Directory separators are dropped, which turns `sub/page` into the lookup
/// name `subpage`.
pub fn resolve_href(href: &str) -> PageRef {
    if let Some(anchor) = href.strip_prefix('#') {
        return PageRef::Anchor(anchor.to_string());
    }
    if href.contains("://") || starts_with_ignore_case(href, "mailto:") {
        return PageRef::External(href.to_string());
    }
    let path = match href.find(".html") {
        Some(index) => &href[..index],
        None => href,
    };
    if let Some(rest) = path.strip_prefix("../") {
        match rest.split_once('/') {
            Some((manual, page)) if !manual.is_empty() => {
                return PageRef::Foreign {
                    manual: manual.to_string(),
                    page: page.replace('/', ""),
                };
            },
            _ => return PageRef::Local(rest.replace('/', "")),
        }
    }
    PageRef::Local(path.replace('/', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_link_forms() {
        assert_eq!(to_file_link("Foo.Bar"), "foo/bar.html");
        assert_eq!(to_file_link(".anchor"), "#anchor");
        assert_eq!(to_file_link(".Sub.Section"), "#sub.section");
        assert_eq!(to_file_link("Manual:Page"), "../manual/page.html");
        assert_eq!(to_file_link("BASIC:Key.Words"), "../basic/key/words.html");
        assert_eq!(to_file_link("Other"), "other.html");
    }

    #[test]
    fn test_leading_colon_is_not_cross_manual() {
        assert_eq!(to_file_link(":odd"), ":odd.html");
    }

    #[test]
    fn test_complex_link_targets() {
        assert_eq!(complex_link_href("#url http://x.org/", "site"), "http://x.org/");
        assert_eq!(complex_link_href("#URL", "http://y.org/"), "http://y.org/");
        assert_eq!(complex_link_href("Other", "See"), "other.html");
    }

    #[test]
    fn test_simple_link_cut_at_space() {
        assert_eq!(simple_link_href("Page two", "", ""), "page.html");
        assert_eq!(simple_link_href("Key", "Cmd_", ""), "cmd_key.html");
        assert_eq!(simple_link_href("Key", "", ".Info"), "key/info.html");
        assert_eq!(simple_link_href(" lead", "", ""), " lead.html");
    }

    #[test]
    fn test_resolve_href() {
        assert_eq!(resolve_href("#intro"), PageRef::Anchor("intro".to_string()));
        assert_eq!(resolve_href("sub/page.html"), PageRef::Local("subpage".to_string()));
        assert_eq!(
            resolve_href("../basic/key/words.html"),
            PageRef::Foreign {
                manual: "basic".to_string(),
                page: "keywords".to_string()
            }
        );
        assert_eq!(
            resolve_href("http://x.org/a.html"),
            PageRef::External("http://x.org/a.html".to_string())
        );
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(256))]

            #[test]
            fn prop_plain_names_map_to_lowercase_paths(parts in prop::collection::vec("[A-Za-z0-9_]{1,8}", 1..4)) {
                let name = parts.join(".");
                let link = to_file_link(&name);
                prop_assert_eq!(link.clone(), format!("{}.html", parts.join("/").to_lowercase()));
                prop_assert_eq!(resolve_href(&link), PageRef::Local(parts.concat().to_lowercase()));
            }

            #[test]
            fn prop_anchor_names_stay_on_page(name in "[A-Za-z0-9_.]{0,16}") {
                let link = to_file_link(&format!(".{}", name));
                prop_assert_eq!(resolve_href(&link), PageRef::Anchor(name.to_lowercase()));
            }
        }
    }
}
