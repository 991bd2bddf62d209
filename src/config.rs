//! Loads the project configuration from a `bitacora.yaml` file. Every key is
//! optional; relative paths are resolved against the directory holding the
//! file.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const PROJECT_FILE: &str = "bitacora.yaml";

#[derive(Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Project {
    site_name: String,
    content_directory: PathBuf,
    posts_directory: PathBuf,
    posts_url: String,
    post_template: PathBuf,
    index_page: PathBuf,
    asset_directory: String,
    default_image: String,
    default_tag: String,
    augment: bool,
    quickreads: usize,
    cta_href: String,
}

impl Default for Project {
    fn default() -> Self {
        Project {
            site_name: String::from("Punto Seguro"),
            content_directory: PathBuf::from("blog/content/posts"),
            posts_directory: PathBuf::from("blog/posts"),
            posts_url: String::from("blog/posts"),
            post_template: PathBuf::from("blog/templates/post.html"),
            index_page: PathBuf::from("blog.html"),
            asset_directory: String::from("blog"),
            default_image: String::from("portada_facebook.png"),
            default_tag: String::from("Blog"),
            augment: false,
            quickreads: 3,
            cta_href: String::from("index_compliance.html#formulario"),
        }
    }
}

/// The resolved project configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The directory holding `bitacora.yaml`. Image paths are checked
    /// against it.
    pub root_directory: PathBuf,
    pub site_name: String,
    pub content_directory: PathBuf,
    pub posts_directory: PathBuf,
    pub posts_url: String,
    pub post_template: PathBuf,
    pub index_page: PathBuf,
    pub asset_directory: String,
    pub default_image: String,
    pub default_tag: String,
    pub augment: bool,
    pub quickreads: usize,
    pub cta_href: String,
}

impl Config {
    /// Looks for `bitacora.yaml` in `dir` and then in each of its parents.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            match Config::from_project_file(&path) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(dir) => Config::from_directory(dir),
                None => Err(anyhow!(
                    "Could not find `{}` in any parent directory",
                    PROJECT_FILE
                )),
            }
        }
    }

    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path)
            .with_context(|| format!("Opening project file `{}`", path.display()))?;
        let project: Project = serde_yaml::from_reader(file)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config::from_project(project_root, project)),
        }
    }

    fn from_project(root: &Path, project: Project) -> Config {
        Config {
            root_directory: root.to_owned(),
            site_name: project.site_name,
            content_directory: root.join(project.content_directory),
            posts_directory: root.join(project.posts_directory),
            posts_url: project.posts_url,
            post_template: root.join(project.post_template),
            index_page: root.join(project.index_page),
            asset_directory: project.asset_directory,
            default_image: project.default_image,
            default_tag: project.default_tag,
            augment: project.augment,
            quickreads: project.quickreads,
            cta_href: project.cta_href,
        }
    }

    /// The configuration used when a project file sets nothing, rooted at
    /// `root`.
    pub fn with_defaults(root: &Path) -> Config {
        Config::from_project(root, Project::default())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    #[test]
    fn test_from_directory_searches_parents() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(
            dir.path().join(PROJECT_FILE),
            "site_name: Mi Blog\naugment: true\ncontent_directory: posts\n",
        )?;
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested)?;

        let config = Config::from_directory(&nested)?;
        assert_eq!(config.root_directory, dir.path());
        assert_eq!(config.site_name, "Mi Blog");
        assert!(config.augment);
        assert_eq!(config.content_directory, dir.path().join("posts"));
        assert_eq!(config.posts_directory, dir.path().join("blog/posts"));
        assert_eq!(config.quickreads, 3);
        Ok(())
    }

    #[test]
    fn test_empty_project_file_uses_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(PROJECT_FILE);
        fs::write(&path, "{}\n")?;
        assert_eq!(
            Config::from_project_file(&path)?,
            Config::with_defaults(dir.path())
        );
        Ok(())
    }

    #[test]
    fn test_unknown_keys_are_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join(PROJECT_FILE), "sitename: typo\n")?;
        assert!(Config::from_directory(dir.path()).is_err());
        Ok(())
    }
}
