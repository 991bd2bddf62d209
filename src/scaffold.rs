//! Creates new post source files with a filled-in header and a starter body.

use crate::config::Config;
use crate::slug::slugify;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

const STARTER_BODY: &[&str] = &[
    "Pega aquí tu texto siguiendo la estructura Punto Seguro:",
    "",
    "# Introducción con impacto",
    "Explica percepción vs realidad del riesgo.",
    "",
    "## Cómo evalúa el intruso",
    "- accesos",
    "- rutinas",
    "- tiempos",
    "- reacción",
    "",
    "## Dónde aparece el riesgo real",
    "Contraste entre viviendas y negocios.",
    "",
    "## Checklist accionable",
    "- puntos a revisar",
    "",
    "## Conclusión",
    "👉 Una evaluación profesional no añade sistemas. Revela exposición real.",
    "",
];

/// Writes a new post for `title` into the content directory and returns its
/// path. `image` defaults to the configured default image. Existing files are
/// never overwritten.
pub fn new_post(
    config: &Config,
    title: &str,
    image: Option<&str>,
    today: NaiveDate,
) -> Result<PathBuf> {
    let title = title.trim();
    let image = image
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .unwrap_or(&config.default_image);
    let directory = &config.content_directory;
    fs::create_dir_all(directory)
        .with_context(|| format!("Creating content directory `{}`", directory.display()))?;

    let path = directory.join(file_name(directory, &slugify(title))?);
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .with_context(|| format!("Creating post `{}`", path.display()))?;
    file.write_all(contents(title, image, &config.default_tag, today).as_bytes())
        .with_context(|| format!("Writing post `{}`", path.display()))?;

    info!(path = %path.display(), "created post");
    Ok(path)
}

// `{NN}-{slug}.md` where NN counts the posts already there, or
// `{NN}-{slug}-v2.md` when some post already ends in `{slug}.md`.
fn file_name(directory: &Path, slug: &str) -> Result<String> {
    let mut count = 0;
    let mut taken = false;
    let suffix = format!("{}.md", slug);
    for entry in fs::read_dir(directory)
        .with_context(|| format!("Listing `{}`", directory.display()))?
    {
        let name = entry?.file_name();
        let name = name.to_string_lossy();
        if name.ends_with(".md") {
            count += 1;
            taken |= name.ends_with(&suffix);
        }
    }

    let prefix = format!("{:02}", count + 1);
    Ok(match taken {
        true => format!("{}-{}-v2.md", prefix, slug),
        false => format!("{}-{}.md", prefix, slug),
    })
}

fn contents(title: &str, image: &str, tag: &str, today: NaiveDate) -> String {
    let header = [
        "---".to_owned(),
        format!("title: {}", title),
        format!("date: {}", today.format("%Y-%m-%d")),
        format!("tag: {}", tag),
        format!("image: {}", image),
        format!("image_alt: {}", title),
        "popular_rank: ".to_owned(),
        "---".to_owned(),
        String::new(),
    ];
    header
        .iter()
        .map(String::as_str)
        .chain(STARTER_BODY.iter().copied())
        .collect::<Vec<&str>>()
        .join("\n")
}
