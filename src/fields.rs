//! The derived-field engine. Every [`Post`] field prefers an explicit header
//! value and otherwise falls back to something computed from the body. Only
//! the fields that can make a build inconsistent (title, date, popular rank)
//! are validated; everything else is total and ends in a fixed default.

use crate::frontmatter::{self, Header};
use crate::plain::{self, CONCLUSION_MARKER, IMAGE};
use crate::post::Post;
use crate::slug::slugify;
use chrono::NaiveDate;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::warn;

pub const EXCERPT_MAX_LEN: usize = 160;
pub const QUICK_TITLE_MAX_LEN: usize = 48;
pub const QUICK_SUMMARY_MAX_LEN: usize = 120;
pub const CONCLUSION_MAX_LEN: usize = 180;

/// Appended to text cut by [`truncate`].
pub const ELLIPSIS: char = '…';

pub const DEFAULT_CONCLUSION: &str = "Evaluar el riesgo aporta claridad para decidir.";

pub const MIN_READ_TIME: u32 = 3;
pub const WORDS_PER_MINUTE: usize = 220;

const QUICK_TITLE_DELIMITERS: &[char] = &[':', '(', '–', '—', '-'];

static ISO_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static TITLE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*#\s+(.+?)\s*$").unwrap());

/// Answers whether a project-relative path points at an existing file. Image
/// normalization goes through this so the engine never touches the disk
/// itself.
pub trait AssetLookup {
    fn exists(&self, relative: &Path) -> bool;
}

impl<F: Fn(&Path) -> bool> AssetLookup for F {
    fn exists(&self, relative: &Path) -> bool {
        self(relative)
    }
}

/// Looks assets up under a project root directory.
pub struct ProjectAssets {
    pub root: PathBuf,
}

impl AssetLookup for ProjectAssets {
    fn exists(&self, relative: &Path) -> bool {
        self.root.join(relative).exists()
    }
}

/// Build-wide inputs to field derivation.
pub struct Context<'a> {
    /// The date assigned to posts without a `date` header.
    pub today: NaiveDate,

    /// The tag assigned to posts without a `tag` header.
    pub default_tag: &'a str,

    /// The hero image for posts that neither declare nor embed one.
    pub default_image: &'a str,

    /// The project-relative directory bare image file names are looked up in.
    pub asset_directory: &'a str,

    pub assets: &'a dyn AssetLookup,
}

/// Removes the first `# Heading` line from `body` and returns its text along
/// with the remaining body. Returns the body unchanged if there is no such
/// heading.
pub fn extract_title(body: &str) -> (Option<String>, String) {
    let lines: Vec<&str> = body.lines().collect();
    for (idx, line) in lines.iter().enumerate() {
        if let Some(captures) = TITLE_HEADING.captures(line) {
            let title = captures[1].trim().to_owned();
            let rest = lines[..idx]
                .iter()
                .chain(&lines[idx + 1..])
                .copied()
                .collect::<Vec<&str>>()
                .join("\n");
            return (Some(title), rest.trim_start_matches('\n').to_owned());
        }
    }
    (None, body.to_owned())
}

/// Builds a [`Post`] from a parsed header and a body whose title heading has
/// already been extracted. `title_from_body` is that heading's text and `stem`
/// is the source file name without extension.
pub fn derive(
    header: &Header,
    body: String,
    title_from_body: Option<&str>,
    stem: Option<&str>,
    context: &Context,
) -> Result<Post> {
    let title = header
        .get("title")
        .or(title_from_body.map(str::trim).filter(|t| !t.is_empty()))
        .ok_or(Error::MissingTitle)?
        .to_owned();

    let slug = slugify(
        header
            .get("slug")
            .or(stem.map(str::trim).filter(|s| !s.is_empty()))
            .unwrap_or(&title),
    );

    let date = match header.get("date") {
        Some(value) => parse_date(value)?,
        None => context.today,
    };

    let popular_rank = match header.get("popular_rank") {
        Some(value) => Some(popular_rank(value)?),
        None => None,
    };

    let (image, image_alt) = hero_image(header, &body, &title, context);

    let excerpt = header
        .get("excerpt")
        .map(str::to_owned)
        .unwrap_or_else(|| excerpt(&body));
    let quick_title = header
        .get("quick_title")
        .map(str::to_owned)
        .unwrap_or_else(|| quick_title(&title));
    let quick_summary = header
        .get("quick_summary")
        .map(str::to_owned)
        .unwrap_or_else(|| truncate(&excerpt, QUICK_SUMMARY_MAX_LEN));
    let conclusion = header
        .get("conclusion")
        .map(str::to_owned)
        .unwrap_or_else(|| conclusion(&body));
    let read_time = match header.get("read_time") {
        Some(value) => match value.parse::<u32>() {
            Ok(minutes) if minutes > 0 => minutes,
            _ => {
                warn!(value, "ignoring invalid `read_time`; estimating instead");
                read_time(&body)
            }
        },
        None => read_time(&body),
    };

    Ok(Post {
        title,
        slug,
        date,
        tag: header.get("tag").unwrap_or(context.default_tag).to_owned(),
        read_time,
        popular_rank,
        image,
        image_alt,
        excerpt,
        quick_title,
        quick_summary,
        conclusion,
        body,
    })
}

// Only the strict `YYYY-MM-DD` form is a date; chrono alone would accept
// `2024-3-1` or `24-03-01`.
fn parse_date(value: &str) -> Result<NaiveDate> {
    let invalid = |err| Error::InvalidDate {
        value: value.to_owned(),
        err,
    };
    if !ISO_DATE.is_match(value) {
        return Err(invalid(None));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|err| invalid(Some(err)))
}

fn popular_rank(value: &str) -> Result<u32> {
    let rank: i64 = value.parse().map_err(|_| Error::InvalidPopularRank {
        value: value.to_owned(),
    })?;
    match rank {
        1..=0xFFFF_FFFF => Ok(rank as u32),
        _ => Err(Error::PopularRankOutOfRange { rank }),
    }
}

fn hero_image(header: &Header, body: &str, title: &str, context: &Context) -> (String, String) {
    let mut image = normalize_image_path(header.get("image").unwrap_or_default(), context);
    let mut image_alt = header.get("image_alt").unwrap_or_default().to_owned();

    if image.is_empty() {
        if let Some((path, alt)) = first_image(body) {
            image = normalize_image_path(&path, context);
            if image_alt.is_empty() {
                image_alt = alt;
            }
        }
    }

    if image.is_empty() {
        image = context.default_image.to_owned();
    }
    if image_alt.is_empty() {
        image_alt = title.to_owned();
    }
    (image, image_alt)
}

/// Returns the path and alt text of the first `![alt](path)` in `body`.
pub fn first_image(body: &str) -> Option<(String, String)> {
    let captures = IMAGE.captures(body)?;
    let alt = captures[1].trim().to_owned();
    let path = captures[2].trim();
    let path = path.strip_prefix("./").unwrap_or(path).to_owned();
    Some((path, alt))
}

/// Makes an image reference project-relative. Absolute `http(s)` URLs are
/// returned untouched. A path that exists under the project root is kept; a
/// bare file name that exists in the asset directory gets that directory as a
/// prefix; anything else is returned as-is.
pub fn normalize_image_path(image: &str, context: &Context) -> String {
    let image = image.trim();
    if image.is_empty() || is_absolute_url(image) {
        return image.to_owned();
    }

    let image = image.trim_start_matches(|c| c == '.' || c == '/');
    if image.is_empty() || context.assets.exists(Path::new(image)) {
        return image.to_owned();
    }

    if !image.contains('/')
        && context
            .assets
            .exists(&Path::new(context.asset_directory).join(image))
    {
        return format!("{}/{}", context.asset_directory, image);
    }

    image.to_owned()
}

pub(crate) fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Derives a teaser from the first paragraph-like block of `body`. Headings,
/// list items and image lines are skipped, and collection stops at the first
/// blank line after some text was found.
pub fn excerpt(body: &str) -> String {
    let mut buffer: Vec<&str> = Vec::new();
    for line in body.lines().map(str::trim) {
        if line.is_empty() {
            if !buffer.is_empty() {
                break;
            }
            continue;
        }
        if line.starts_with('#') || line.starts_with("- ") || line.starts_with("![") {
            continue;
        }
        buffer.push(line);
    }

    let mut text = plain::to_plain(&buffer.join(" "));
    if text.is_empty() {
        text = plain::to_plain(body);
    }
    truncate(&text, EXCERPT_MAX_LEN)
}

/// The part of `title` before its first delimiter (`:`, `(` or a dash). A
/// title that starts with a delimiter has an empty quick title.
pub fn quick_title(title: &str) -> String {
    let head = match title.find(QUICK_TITLE_DELIMITERS) {
        Some(i) => &title[..i],
        None => title,
    };
    truncate(head.trim(), QUICK_TITLE_MAX_LEN)
}

/// The text of the last line led by the conclusion marker, or
/// [`DEFAULT_CONCLUSION`].
pub fn conclusion(body: &str) -> String {
    body.lines()
        .rev()
        .map(str::trim)
        .find(|line| line.starts_with(CONCLUSION_MARKER))
        .map(|line| {
            plain::to_plain(line.trim_start_matches(CONCLUSION_MARKER))
                .chars()
                .take(CONCLUSION_MAX_LEN)
                .collect::<String>()
        })
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| DEFAULT_CONCLUSION.to_owned())
}

/// Estimated reading time in minutes, never less than [`MIN_READ_TIME`].
pub fn read_time(body: &str) -> u32 {
    let words = plain::word_count(body);
    let minutes = (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE;
    (minutes as u32).max(MIN_READ_TIME)
}

/// Cuts `text` to at most `max` characters (plus the [`ELLIPSIS`] when
/// something was cut). Surrounding whitespace is trimmed.
pub fn truncate(text: &str, max: usize) -> String {
    let head: String = text.chars().take(max + 1).collect();
    let head = head.trim();
    if head.chars().count() <= max {
        return head.to_owned();
    }
    let mut cut: String = head.chars().take(max).collect();
    cut.truncate(cut.trim_end().len());
    cut.push(ELLIPSIS);
    cut
}

/// The result of deriving a [`Post`].
pub type Result<T> = std::result::Result<T, Error>;

/// A fatal, per-document problem. Drafts are not errors; see
/// [`crate::post::Outcome`].
#[derive(Debug)]
pub enum Error {
    /// Returned when the header block is malformed.
    Frontmatter(frontmatter::Error),

    /// Returned when neither the header nor a `# Heading` provides a title.
    MissingTitle,

    /// Returned when the `date` header isn't a `YYYY-MM-DD` date.
    InvalidDate {
        value: String,
        err: Option<chrono::ParseError>,
    },

    /// Returned when the `popular_rank` header isn't an integer.
    InvalidPopularRank { value: String },

    /// Returned when the `popular_rank` header is an integer below 1.
    PopularRankOutOfRange { rank: i64 },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Frontmatter(err) => err.fmt(f),
            Error::MissingTitle => write!(
                f,
                "missing title: set `title` in the header or start the body with `# Title`"
            ),
            Error::InvalidDate { value, err: Some(err) } => {
                write!(f, "invalid date {:?} (expected YYYY-MM-DD): {}", value, err)
            }
            Error::InvalidDate { value, err: None } => {
                write!(f, "invalid date {:?} (expected YYYY-MM-DD)", value)
            }
            Error::InvalidPopularRank { value } => {
                write!(f, "popular_rank must be an integer (1, 2, 3...), got {:?}", value)
            }
            Error::PopularRankOutOfRange { rank } => {
                write!(f, "popular_rank must be >= 1, got {}", rank)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frontmatter(err) => Some(err),
            Error::InvalidDate { err: Some(err), .. } => Some(err),
            Error::InvalidDate { err: None, .. }
            | Error::MissingTitle
            | Error::InvalidPopularRank { .. }
            | Error::PopularRankOutOfRange { .. } => None,
        }
    }
}

impl From<frontmatter::Error> for Error {
    /// Converts a [`frontmatter::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator when parsing the header.
    fn from(err: frontmatter::Error) -> Error {
        Error::Frontmatter(err)
    }
}
