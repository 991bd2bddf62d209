//! Defines the [`Post`] record and the per-document [`Pipeline`] that builds
//! it. A document goes through a fixed sequence of stages, each one consuming
//! the previous stage's output type so they can't be reordered:
//!
//! 1. split the header from the body ([`crate::frontmatter`]),
//! 2. stop here if the header marks the document as a draft,
//! 3. append missing boilerplate sections ([`crate::augment`]), if enabled,
//! 4. extract the `# Title` heading from the body,
//! 5. derive every remaining field ([`crate::fields`]).
//!
//! Augmentation happens before any derivation so excerpt, read time and
//! conclusion all see the final body.

use crate::augment;
use crate::fields::{self, Context};
use crate::frontmatter::{self, Header};
use chrono::{Datelike, NaiveDate};
use std::path::Path;

/// Header values that mark a document as a draft (compared lowercased).
pub const DRAFT_VALUES: &[&str] = &["1", "true", "yes", "y"];

const MONTHS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sep", "oct", "nov", "dic",
];

/// A published article. Built once from a document and never mutated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Post {
    pub title: String,

    /// URL-safe identifier; also the output file name.
    pub slug: String,

    pub date: NaiveDate,

    /// Free-text category label.
    pub tag: String,

    /// Reading time in minutes.
    pub read_time: u32,

    /// Manual popularity rank (1 is the most read); `None` means unranked.
    pub popular_rank: Option<u32>,

    /// Hero image, either project-relative or an absolute URL.
    pub image: String,
    pub image_alt: String,

    pub excerpt: String,
    pub quick_title: String,
    pub quick_summary: String,
    pub conclusion: String,

    /// The final Markdown body, after augmentation and title extraction.
    pub body: String,
}

impl Post {
    /// The post page's location relative to the site root, given the base
    /// URL for post pages.
    pub fn href(&self, posts_url: &str) -> String {
        format!("{}/{}.html", posts_url.trim_end_matches('/'), self.slug)
    }

    /// The date as `YYYY-MM-DD`.
    pub fn date_iso(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The date in the site's locale, e.g. `1 mar 2024`.
    pub fn date_human(&self) -> String {
        format!(
            "{} {} {}",
            self.date.day(),
            MONTHS[self.date.month0() as usize],
            self.date.year()
        )
    }
}

/// A source file's contents and location.
pub struct Document<'a> {
    pub path: &'a Path,
    pub raw: &'a str,
}

impl Document<'_> {
    fn stem(&self) -> Option<&str> {
        self.path.file_stem().and_then(|s| s.to_str())
    }
}

/// What became of a document.
#[derive(Debug)]
pub enum Outcome {
    Published(Post),

    /// The header sets `draft`; the document is deliberately left out.
    Draft,
}

/// Turns documents into [`Outcome`]s.
pub struct Pipeline<'a> {
    pub context: Context<'a>,

    /// Whether to run the augmentation stage.
    pub augment: bool,
}

impl Pipeline<'_> {
    pub fn process(&self, document: &Document) -> fields::Result<Outcome> {
        let parsed = Parsed::new(document.raw)?;
        if parsed.is_draft() {
            return Ok(Outcome::Draft);
        }
        let post = parsed
            .augment(self.augment)
            .extract_title()
            .derive(document.stem(), &self.context)?;
        Ok(Outcome::Published(post))
    }
}

struct Parsed {
    header: Header,
    body: String,
}

struct Augmented {
    header: Header,
    body: String,
}

struct Titled {
    header: Header,
    title: Option<String>,
    body: String,
}

impl Parsed {
    fn new(raw: &str) -> frontmatter::Result<Parsed> {
        let (header, body) = frontmatter::parse(raw)?;
        Ok(Parsed { header, body })
    }

    fn is_draft(&self) -> bool {
        self.header
            .get("draft")
            .map(|v| DRAFT_VALUES.contains(&v.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn augment(self, enabled: bool) -> Augmented {
        let body = match enabled {
            true => augment::augment(&self.body),
            false => self.body,
        };
        Augmented {
            header: self.header,
            body,
        }
    }
}

impl Augmented {
    fn extract_title(self) -> Titled {
        let (title, body) = fields::extract_title(&self.body);
        Titled {
            header: self.header,
            title,
            body,
        }
    }
}

impl Titled {
    fn derive(self, stem: Option<&str>, context: &Context) -> fields::Result<Post> {
        fields::derive(&self.header, self.body, self.title.as_deref(), stem, context)
    }
}
