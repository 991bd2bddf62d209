//! Discovers post source files and runs each through the [`Pipeline`]. See
//! [`Parser::parse_posts`].

use crate::fields;
use crate::post::{Document, Outcome, Pipeline, Post};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    pipeline: &'a Pipeline<'a>,
}

/// The documents found in a content directory.
#[derive(Debug, Default)]
pub struct Corpus {
    /// Published posts, newest first (ties broken by slug, descending).
    pub posts: Vec<Post>,

    /// Source files that were skipped because they are drafts.
    pub drafts: Vec<PathBuf>,
}

impl<'a> Parser<'a> {
    pub fn new(pipeline: &'a Pipeline<'a>) -> Parser<'a> {
        Parser { pipeline }
    }

    /// Parses every `.md` file directly inside `source_directory`, in file
    /// name order. Each file is structured as follows:
    ///
    /// 1. An optional header: a `---` fence, `key: value` lines and a closing
    ///    `---` fence
    /// 2. The Markdown body
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// title: Cámaras en el porche
    /// date: 2024-03-01
    /// tag: Hogar
    /// ---
    /// Primer párrafo.
    /// ```
    ///
    /// Drafts are collected separately. The first malformed document aborts
    /// the parse with an error naming the file.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Corpus> {
        let mut corpus = Corpus::default();
        for result in WalkDir::new(source_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = result?;
            if !entry.file_type().is_file() || !is_markdown(entry.path()) {
                continue;
            }
            match self.parse_post(entry.path())? {
                Outcome::Published(post) => {
                    debug!(path = %entry.path().display(), slug = %post.slug, "parsed post");
                    corpus.posts.push(post);
                }
                Outcome::Draft => {
                    info!(path = %entry.path().display(), "skipping draft");
                    corpus.drafts.push(entry.into_path());
                }
            }
        }

        corpus
            .posts
            .sort_by(|a, b| (b.date, &b.slug).cmp(&(a.date, &a.slug)));
        Ok(corpus)
    }

    /// Reads and processes a single source file.
    pub fn parse_post(&self, path: &Path) -> Result<Outcome> {
        let raw = fs::read_to_string(path).map_err(|err| Error::Read {
            path: path.to_owned(),
            err,
        })?;
        self.pipeline
            .process(&Document { path, raw: &raw })
            .map_err(|err| Error::Document {
                path: path.to_owned(),
                err,
            })
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == MARKDOWN_EXTENSION)
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing the posts directory.
#[derive(Debug)]
pub enum Error {
    /// Returned when a source file can't be read (including files that aren't
    /// valid UTF-8).
    Read { path: PathBuf, err: std::io::Error },

    /// Returned when the posts directory can't be walked.
    WalkDir(walkdir::Error),

    /// Returned when a document is malformed.
    Document { path: PathBuf, err: fields::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => write!(f, "reading `{}`: {}", path.display(), err),
            Error::WalkDir(err) => err.fmt(f),
            Error::Document { path, err } => write!(f, "parsing post `{}`: {}", path.display(), err),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { err, .. } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Document { err, .. } => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
