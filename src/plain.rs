//! Strips Markdown syntax to recover approximate prose. The result is only
//! used to measure and excerpt a post, never to render it.

use regex::Regex;
use std::sync::LazyLock;

/// The glyph that leads a post's closing line.
pub const CONCLUSION_MARKER: &str = "👉";

static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#{1,6}\s+").unwrap());

pub(crate) static IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[(.*?)\]\((.*?)\)").unwrap());

static LINK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(.*?)\]\((.*?)\)").unwrap());

static STRAY_PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[`*_>#]").unwrap());

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Projects `markdown` onto plain text: heading markers go away, images and
/// links are replaced by their alt/link text, emphasis and quote punctuation
/// is blanked out and whitespace is collapsed. Unbalanced syntax is left as
/// text.
pub fn to_plain(markdown: &str) -> String {
    let text = HEADING_MARKER.replace_all(markdown, "");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = text.replace(CONCLUSION_MARKER, " ");
    let text = STRAY_PUNCTUATION.replace_all(&text, " ");
    WHITESPACE.replace_all(&text, " ").trim().to_owned()
}

/// Counts the whitespace-separated words of the projected `markdown`.
pub fn word_count(markdown: &str) -> usize {
    to_plain(markdown).split_whitespace().count()
}
