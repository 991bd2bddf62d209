//! Splits a raw document into its metadata [`Header`] and Markdown body.
//!
//! A header is optional. When present it must open on the very first line
//! with a `---` fence and is closed by the next `---` line:
//!
//! ```md
//! ---
//! title: Cámaras en el porche
//! date: 2024-03-01
//! ---
//! Primer párrafo.
//! ```
//!
//! Every non-blank line between the fences is a `key: value` pair.

use std::collections::HashMap;
use std::fmt;

const FENCE: &str = "---";
const SEPARATOR: char = ':';

/// The key/value metadata block at the top of a document. Lookups treat a
/// missing key and a blank value the same way: both are unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header(HashMap<String, String>);

impl Header {
    /// Returns the trimmed value for `key`, or `None` if the key is missing or
    /// its value is blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>, V: Into<String>> std::iter::FromIterator<(K, V)> for Header {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Header(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Parses `raw` into a [`Header`] and a body. Documents that don't start with
/// `---` have an empty header and are all body. Leading blank lines are
/// removed from the body.
pub fn parse(raw: &str) -> Result<(Header, String)> {
    if !raw.starts_with(FENCE) {
        return Ok((Header::default(), raw.trim_start_matches('\n').to_owned()));
    }

    let lines: Vec<&str> = raw.split('\n').collect();
    if lines.len() < 3 {
        return Err(Error::Incomplete);
    }
    if lines[0].trim() != FENCE {
        return Err(Error::InvalidOpeningFence);
    }

    let mut fields = HashMap::new();
    let mut i = 1;
    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if line.trim() == FENCE {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match line.split_once(SEPARATOR) {
            Some((key, value)) => {
                fields.insert(key.trim().to_owned(), value.trim().to_owned());
            }
            None => {
                return Err(Error::MissingSeparator {
                    line_number: i,
                    line: line.to_owned(),
                })
            }
        }
    }

    let body = match i < lines.len() {
        true => lines[i..].join("\n").trim_start_matches('\n').to_owned(),
        false => String::new(),
    };
    Ok((Header(fields), body))
}

/// The result of parsing a header.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a malformed header. Each variant aborts the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Returned when the document starts with `---` but has fewer than three
    /// lines in total.
    Incomplete,

    /// Returned when the first line starts with `---` but isn't exactly the
    /// fence (e.g., `----` or `--- title`).
    InvalidOpeningFence,

    /// Returned for a header line without a `:` separator. `line_number` is
    /// 1-based.
    MissingSeparator { line_number: usize, line: String },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Incomplete => write!(f, "incomplete header: expected a closing `---`"),
            Error::InvalidOpeningFence => {
                write!(f, "invalid header: the first line must be exactly `---`")
            }
            Error::MissingSeparator { line_number, line } => write!(
                f,
                "invalid header line {}: {:?} is not a `key: value` pair",
                line_number, line
            ),
        }
    }
}

impl std::error::Error for Error {}
