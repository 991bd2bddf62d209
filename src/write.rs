//! Renders [`Post`]s into HTML pages with a `gtmpl` (Go template) post
//! template and writes them to disk.

use crate::fields::is_absolute_url;
use crate::markdown;
use crate::post::Post;
use gtmpl::{Context, Template, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Responsible for templating and writing post pages.
pub struct Writer<'a> {
    /// The template for post pages.
    pub template: &'a Template,

    /// The directory in which post pages are written, one `{slug}.html` per
    /// post.
    pub posts_directory: &'a Path,

    /// The site-root-relative URL of `posts_directory` (e.g. `blog/posts`).
    /// Used to make project-relative image paths relative to the post page.
    pub posts_url: &'a str,

    /// Prefixed onto every page title (`{site_name} | {title}`).
    pub site_name: &'a str,
}

impl Writer<'_> {
    /// Writes a page for every post, creating the posts directory if needed.
    /// Returns the paths written.
    pub fn write_posts(&self, posts: &[Post]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(self.posts_directory)?;
        posts.iter().map(|post| self.write_post(post)).collect()
    }

    /// Templates a single post and writes it to `{posts_directory}/{slug}.html`.
    pub fn write_post(&self, post: &Post) -> Result<PathBuf> {
        let file_path = self.posts_directory.join(format!("{}.html", post.slug));
        let context = Context::from(self.to_value(post)).map_err(Error::Template)?;
        self.template
            .execute(&mut File::create(&file_path)?, &context)
            .map_err(Error::Template)?;
        debug!(path = %file_path.display(), "wrote post page");
        Ok(file_path)
    }

    /// Converts a [`Post`] into the [`Value`] handed to the post template.
    /// Text fields are HTML-escaped; `content` and `hero_image` are markup.
    pub fn to_value(&self, post: &Post) -> Value {
        let mut m: HashMap<String, Value> = HashMap::new();
        let mut text = |key: &str, value: &str| {
            m.insert(key.to_owned(), Value::String(escape(value)));
        };
        text("page_title", &format!("{} | {}", self.site_name, post.title));
        text("meta_description", &post.excerpt);
        text("breadcrumb", &post.quick_title);
        text("title", &post.title);
        text("tag", &post.tag);
        text("date_iso", &post.date_iso());
        text("date_human", &post.date_human());
        text("read_time", &post.read_time.to_string());
        text("conclusion", &post.conclusion);
        m.insert("hero_image".to_owned(), Value::String(self.hero_image(post)));
        m.insert(
            "content".to_owned(),
            Value::String(markdown::render(&post.body)),
        );
        Value::Object(m)
    }

    fn hero_image(&self, post: &Post) -> String {
        if post.image.trim().is_empty() {
            return String::new();
        }
        format!(
            "<figure class=\"hero-image\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\" /></figure>",
            escape(&self.relative_to_page(&post.image)),
            escape(&post.image_alt),
        )
    }

    // Post pages live `posts_url` deep, so a project-relative path needs one
    // `../` per component to reach the site root.
    fn relative_to_page(&self, image: &str) -> String {
        if is_absolute_url(image) {
            return image.to_owned();
        }
        let depth = self
            .posts_url
            .split('/')
            .filter(|c| !c.is_empty() && *c != ".")
            .count();
        format!("{}{}", "../".repeat(depth), image.trim_start_matches('/'))
    }
}

/// Escapes text for use in HTML content and quoted attributes.
pub fn escape(text: &str) -> String {
    html_escape::encode_quoted_attribute(text).into_owned()
}

/// Reads and parses the post template file.
pub fn load_template(path: &Path) -> Result<Template> {
    let contents = fs::read_to_string(path).map_err(|err| Error::OpenTemplate {
        path: path.to_owned(),
        err,
    })?;
    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when the template file can't be read.
    OpenTemplate { path: PathBuf, err: io::Error },

    /// Returned when the template file isn't a valid template.
    ParseTemplate(String),

    /// An error during templating.
    Template(String),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplate { path, err } => {
                write!(f, "opening template file `{}`: {}", path.display(), err)
            }
            Error::ParseTemplate(err) => write!(f, "parsing template: {}", err),
            Error::Template(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplate { err, .. } => Some(err),
            Error::ParseTemplate(_) | Error::Template(_) => None,
            Error::Io(err) => Some(err),
        }
    }
}
