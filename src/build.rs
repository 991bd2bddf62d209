//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the blog: parsing the posts ([`crate::parser`]), writing
//! the post pages ([`crate::write`]) and refreshing the generated regions of
//! the blog index page ([`crate::index`]).

use crate::config::Config;
use crate::fields::{Context, ProjectAssets};
use crate::index::{Error as IndexError, Index};
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::post::Pipeline;
use crate::write::{load_template, Error as WriteError, Writer};
use chrono::NaiveDate;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use tracing::info;

/// What a build produced.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    /// The post pages written.
    pub published: Vec<PathBuf>,

    /// The source files skipped as drafts.
    pub drafts: Vec<PathBuf>,
}

/// Builds the blog from a [`Config`] object. `today` is the date given to
/// posts without a `date` header.
pub fn build_site(config: &Config, today: NaiveDate) -> Result<BuildSummary> {
    if !config.content_directory.is_dir() {
        return Err(Error::MissingContentDirectory(
            config.content_directory.clone(),
        ));
    }

    let assets = ProjectAssets {
        root: config.root_directory.clone(),
    };
    let pipeline = Pipeline {
        context: Context {
            today,
            default_tag: &config.default_tag,
            default_image: &config.default_image,
            asset_directory: &config.asset_directory,
            assets: &assets,
        },
        augment: config.augment,
    };

    // collect all posts
    let corpus = PostParser::new(&pipeline).parse_posts(&config.content_directory)?;

    // write the post pages
    let template = load_template(&config.post_template)?;
    let writer = Writer {
        template: &template,
        posts_directory: &config.posts_directory,
        posts_url: &config.posts_url,
        site_name: &config.site_name,
    };
    let published = writer.write_posts(&corpus.posts)?;

    // refresh the index page
    let index = Index {
        posts: &corpus.posts,
        posts_url: &config.posts_url,
        quickreads: config.quickreads,
        cta_href: &config.cta_href,
    };
    let page = fs::read_to_string(&config.index_page).map_err(|err| Error::IndexPage {
        path: config.index_page.clone(),
        err,
    })?;
    fs::write(&config.index_page, index.update(&page)?).map_err(|err| Error::IndexPage {
        path: config.index_page.clone(),
        err,
    })?;

    info!(
        published = published.len(),
        drafts = corpus.drafts.len(),
        index = %config.index_page.display(),
        "built blog"
    );
    Ok(BuildSummary {
        published,
        drafts: corpus.drafts,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// updating the index page, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned when the content directory doesn't exist.
    MissingContentDirectory(PathBuf),

    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing [`crate::post::Post`]s to disk as HTML files.
    Write(WriteError),

    /// Returned when the index page lacks markers.
    Index(IndexError),

    /// Returned for I/O problems reading or writing the index page.
    IndexPage { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingContentDirectory(path) => {
                write!(f, "content directory '{}' does not exist", path.display())
            }
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Index(err) => err.fmt(f),
            Error::IndexPage { path, err } => {
                write!(f, "updating index page '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingContentDirectory(_) => None,
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Index(err) => Some(err),
            Error::IndexPage { path: _, err } => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<IndexError> for Error {
    /// Converts [`IndexError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: IndexError) -> Error {
        Error::Index(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::index::Region;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    const TEMPLATE: &str = "<h1>{{.title}}</h1>\n{{.hero_image}}\n{{.content}}\n<p>{{.conclusion}}</p>\n";

    fn project() -> (tempfile::TempDir, Config) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_defaults(dir.path());
        fs::create_dir_all(&config.content_directory).unwrap();
        fs::create_dir_all(config.post_template.parent().unwrap()).unwrap();
        fs::write(&config.post_template, TEMPLATE).unwrap();
        let page: String = Region::ALL
            .iter()
            .map(|r| format!("{}{}\n", r.start_marker(), r.end_marker()))
            .collect();
        fs::write(&config.index_page, format!("<html>\n{}</html>\n", page)).unwrap();
        fs::write(dir.path().join("blog").join("puerta.png"), b"png").unwrap();
        (dir, config)
    }

    fn post(config: &Config, name: &str, contents: &str) {
        fs::write(config.content_directory.join(name), contents).unwrap();
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_build_site() -> Result<()> {
        let (_dir, config) = project();
        post(
            &config,
            "01-puertas.md",
            "---\ntitle: Puertas: guía rápida\ndate: 2024-03-01\ntag: Hogar\n---\n\
             Una puerta **robusta** retrasa al intruso.\n\n![Puerta](puerta.png)\n\n\
             ## Qué revisar\n- bisagras\n- cerradura\n\n👉 Revisa tus accesos.\n",
        );
        post(&config, "02-borrador.md", "---\ntitle: Borrador\ndraft: true\n---\nTexto");

        let summary = build_site(&config, today())?;
        let page_path = config.posts_directory.join("01-puertas.html");
        assert_eq!(
            summary,
            BuildSummary {
                published: vec![page_path.clone()],
                drafts: vec![config.content_directory.join("02-borrador.md")],
            }
        );

        let page = fs::read_to_string(&page_path).unwrap();
        assert_eq!(
            page,
            "<h1>Puertas: guía rápida</h1>\n\
             <figure class=\"hero-image\"><img src=\"../../blog/puerta.png\" alt=\"Puerta\" loading=\"lazy\" /></figure>\n\
             <p>Una puerta <b>robusta</b> retrasa al intruso.</p>\n\
             <p>![Puerta](puerta.png)</p>\n\
             <h2>Qué revisar</h2>\n<ul>\n<li>bisagras</li>\n<li>cerradura</li>\n</ul>\n\
             <p>👉 Revisa tus accesos.</p>\n\
             <p>Revisa tus accesos.</p>\n"
        );

        let index = fs::read_to_string(&config.index_page).unwrap();
        assert!(index.contains("href=\"blog/posts/01-puertas.html\""));
        assert!(index.contains("Nuevo: puertas</a>"));
        assert!(index.contains("<time datetime=\"2024-03-01\">1 mar 2024</time>"));
        assert!(!index.contains("Borrador"));
        Ok(())
    }

    #[test]
    fn test_build_stops_at_malformed_document() {
        let (_dir, config) = project();
        post(&config, "01-malo.md", "---\ntitle: T\ndate: mañana\n---\n");
        let err = build_site(&config, today()).unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert!(err.to_string().contains("01-malo.md"));
        assert!(!config.posts_directory.exists());
    }

    #[test]
    fn test_build_requires_content_directory() {
        let config = Config::with_defaults(Path::new("/nonexistent/project"));
        assert!(matches!(
            build_site(&config, today()),
            Err(Error::MissingContentDirectory(_))
        ));
    }
}
