//! Regex-based Markdown stripping.
//!
//! This is not a Markdown parser. It removes the syntax that commonly shows up
//! in blog posts so that the speech engine reads prose instead of punctuation.

use super::cleaner::clean_text;
use log::debug;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(```|~~~).*$").unwrap());
// A text line underlined with `=` or `-`
static SETEXT_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*([^\s>#\-*+][^\n]*?)[ \t]*\n[ \t]*(=+|-+)[ \t]*$").unwrap()
});
static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([-*_][ \t]*){3,}$").unwrap());
static HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#+[ \t]*(.*?)[ \t]*#*[ \t]*$").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(>[ \t]?)+").unwrap());
static LIST_BULLET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*([-*+][ \t]+)+").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").unwrap());
static BOLD_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static ITALIC_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*]+)\*").unwrap());
static BOLD_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"__([^_]+)__").unwrap());
static ITALIC_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_([^_]+)_").unwrap());

/// Convert Markdown to plain prose suitable for narration.
///
/// Block markers (headers, list bullets, blockquotes, rules, code fences) are
/// only recognised at the start of a line. Headings, including `===`/`---`
/// underlined ones, get a trailing period unless they already end in
/// punctuation so the narrator pauses after them. CRLF line endings are
/// accepted.
pub fn markdown_to_plain_text(markdown: &str) -> String {
    debug!("Converting markdown to plain text ({} bytes)", markdown.len());

    let markdown = markdown.replace("\r\n", "\n");
    let text = CODE_FENCE.replace_all(&markdown, "");
    let text = SETEXT_HEADER.replace_all(&text, |caps: &Captures| terminate_heading(&caps[1]));
    let text = HORIZONTAL_RULE.replace_all(&text, "");
    let text = HEADER.replace_all(&text, |caps: &Captures| terminate_heading(&caps[1]));
    let text = BLOCKQUOTE.replace_all(&text, "");
    let text = LIST_BULLET.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = BOLD_STAR.replace_all(&text, "$1");
    let text = ITALIC_STAR.replace_all(&text, "$1");
    let text = BOLD_UNDERSCORE.replace_all(&text, "$1");
    let text = ITALIC_UNDERSCORE.replace_all(&text, "$1");

    clean_text(&text)
}

fn terminate_heading(heading: &str) -> String {
    let heading = heading.trim();
    if heading.is_empty() || heading.ends_with(['.', '!', '?', ':']) {
        heading.to_string()
    } else {
        format!("{}.", heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_links_keep_label() {
        let text = "Read [the docs](https://example.com/docs) first.";
        assert_eq!(markdown_to_plain_text(text), "Read the docs first.");
    }

    #[test]
    fn test_images_keep_alt_text() {
        let text = "![A red fox](fox.png) jumped.";
        assert_eq!(markdown_to_plain_text(text), "A red fox jumped.");
    }

    #[test]
    fn test_emphasis_removed() {
        let text = "This is **bold**, *italic*, __strong__ and _soft_.";
        assert_eq!(
            markdown_to_plain_text(text),
            "This is bold, italic, strong and soft."
        );
    }

    #[test]
    fn test_inline_code_removed() {
        let text = "Run `cargo build` now.";
        assert_eq!(markdown_to_plain_text(text), "Run cargo build now.");
    }

    #[test]
    fn test_headers_become_sentences() {
        let text = "# Introduction\n\nSome text.\n\n## Why? ##\nMore.";
        assert_eq!(
            markdown_to_plain_text(text),
            "Introduction.\n\nSome text.\n\nWhy?\nMore."
        );
    }

    #[test]
    fn test_list_bullets_removed() {
        let text = "- first item\n* second item\n+ third item";
        assert_eq!(
            markdown_to_plain_text(text),
            "first item\nsecond item\nthird item"
        );
    }

    #[test]
    fn test_star_bullets_do_not_become_emphasis() {
        let text = "* one *two*\n* three";
        assert_eq!(markdown_to_plain_text(text), "one two\nthree");
    }

    #[test]
    fn test_blockquotes_removed() {
        let text = "> Quoted line\n> > nested";
        assert_eq!(markdown_to_plain_text(text), "Quoted line\nnested");
    }

    #[test]
    fn test_inline_hyphens_survive() {
        let text = "A well-known fact - really.";
        assert_eq!(markdown_to_plain_text(text), "A well-known fact - really.");
    }

    #[test]
    fn test_rules_and_fences_removed() {
        let text = "Before.\n\n---\n\n```rust\nlet x = 1;\n```\n\nAfter.";
        assert_eq!(
            markdown_to_plain_text(text),
            "Before.\n\nlet x = 1;\n\nAfter."
        );
    }

    #[test]
    fn test_crlf_input() {
        let text = "# Title\r\n\r\n- item one\r\n> quote\r\n\r\n***\r\n\r\n___\r\n\r\nEnd.\r\n";
        assert_eq!(
            markdown_to_plain_text(text),
            "Title.\n\nitem one\nquote\n\nEnd."
        );
    }

    #[test]
    fn test_underlined_headings() {
        let text = "Title\n=====\n\nBody text.\n\nSection two\n---\nMore.";
        assert_eq!(
            markdown_to_plain_text(text),
            "Title.\n\nBody text.\n\nSection two.\nMore."
        );
    }

    #[test]
    fn test_rule_after_blank_line_is_not_a_heading() {
        let text = "Before.\n\n---\n\nAfter.";
        assert_eq!(markdown_to_plain_text(text), "Before.\n\nAfter.");
    }

    #[test]
    fn test_plain_text_unchanged() {
        let text = "Nothing to strip here. Just prose, with commas!";
        assert_eq!(markdown_to_plain_text(text), text);
    }

    proptest! {
        #[test]
        fn idempotent_on_plain_text(text in "[A-Za-z0-9 ,.;:!?'\n]{0,300}") {
            let once = markdown_to_plain_text(&text);
            let twice = markdown_to_plain_text(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn stripped_output_is_stable(text in r"[A-Za-z #*_>\-\[\]().\n]{0,200}") {
            // Output never panics and a second pass never grows the text
            let once = markdown_to_plain_text(&text);
            let twice = markdown_to_plain_text(&once);
            prop_assert!(twice.len() <= once.len());
        }
    }
}
