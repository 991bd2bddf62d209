//! Refreshes the generated regions of the blog index page. The page marks each
//! region with a pair of HTML comments (e.g. `<!-- BLOG:POSTS_START -->` and
//! `<!-- BLOG:POSTS_END -->`); everything between a pair is replaced and the
//! rest of the page is left alone.

use crate::post::Post;
use crate::write::escape;
use std::collections::HashMap;
use std::fmt;

/// One generated region of the index page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Region {
    Posts,
    QuickReads,
    NewLink,
    Sidebar,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Posts,
        Region::QuickReads,
        Region::NewLink,
        Region::Sidebar,
    ];

    fn name(self) -> &'static str {
        match self {
            Region::Posts => "POSTS",
            Region::QuickReads => "QUICKREADS",
            Region::NewLink => "NEWLINK",
            Region::Sidebar => "SIDEBAR",
        }
    }

    pub fn start_marker(self) -> String {
        format!("<!-- BLOG:{}_START -->", self.name())
    }

    pub fn end_marker(self) -> String {
        format!("<!-- BLOG:{}_END -->", self.name())
    }
}

const FEATURED_COUNT: usize = 3;
const TAG_FILTER_COUNT: usize = 8;

/// Renders the index regions for a list of posts.
pub struct Index<'a> {
    /// Posts ordered newest first.
    pub posts: &'a [Post],

    /// Base URL for post pages (see [`Post::href`]).
    pub posts_url: &'a str,

    /// Number of posts in the quick-reads region.
    pub quickreads: usize,

    /// Target of the "request an evaluation" link in quick reads.
    pub cta_href: &'a str,
}

impl Index<'_> {
    /// Replaces every region of `page`. Fails if any marker pair is missing.
    pub fn update(&self, page: &str) -> Result<String> {
        let mut page = page.to_owned();
        for region in Region::ALL.iter().copied() {
            page = replace_between(&page, region, &self.render(region))?;
        }
        Ok(page)
    }

    pub fn render(&self, region: Region) -> String {
        match region {
            Region::Posts => self.cards(),
            Region::QuickReads => self.quickreads(),
            Region::NewLink => self.new_link(),
            Region::Sidebar => self.sidebar(),
        }
    }

    fn cards(&self) -> String {
        self.posts
            .iter()
            .map(|post| {
                format!(
                    r#"          <article class="blog-card" data-title="{title}" data-excerpt="{excerpt}" data-tag="{tag}">
            <a href="{href}" aria-label="Leer: {title}">
              <figure class="blog-card-media">
                <img src="{image}" alt="{image_alt}" loading="lazy" />
                <span class="blog-card-tag">{tag}</span>
              </figure>
              <div class="blog-card-body">
                <h3 class="blog-card-title">{title}</h3>
                <p class="blog-card-summary">{excerpt}</p>
                <div class="blog-card-meta">
                  <time datetime="{date_iso}">{date_human}</time>
                  <span>{read_time} min lectura</span>
                </div>
              </div>
            </a>
          </article>"#,
                    title = escape(&post.title),
                    excerpt = escape(&post.excerpt),
                    tag = escape(&post.tag),
                    href = post.href(self.posts_url),
                    image = escape(&post.image),
                    image_alt = escape(&post.image_alt),
                    date_iso = post.date_iso(),
                    date_human = escape(&post.date_human()),
                    read_time = post.read_time,
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn quickreads(&self) -> String {
        self.posts
            .iter()
            .take(self.quickreads)
            .map(|post| {
                format!(
                    r#"          <details>
            <summary>{quick_title}</summary>
            <p>{quick_summary}</p>
            <p><a href="{href}">Leer artículo completo</a> · <a href="{cta_href}">Solicitar evaluación</a></p>
          </details>"#,
                    quick_title = escape(&post.quick_title),
                    quick_summary = escape(&post.quick_summary),
                    href = post.href(self.posts_url),
                    cta_href = escape(self.cta_href),
                )
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn new_link(&self) -> String {
        match self.posts.first() {
            Some(post) => format!(
                r#"<a class="btn btn-ghost" href="{}" aria-label="Leer el artículo: {}">Nuevo: {}</a>"#,
                post.href(self.posts_url),
                escape(&post.title),
                escape(&post.quick_title.to_lowercase()),
            ),
            None => String::new(),
        }
    }

    /// Ranked posts first (by rank, then date, then slug); without any
    /// ranking, the newest posts.
    fn featured(&self) -> (Vec<&Post>, &'static str, &'static str) {
        let mut ranked: Vec<&Post> = self
            .posts
            .iter()
            .filter(|p| p.popular_rank.is_some())
            .collect();
        if ranked.is_empty() {
            let newest = self.posts.iter().take(FEATURED_COUNT).collect();
            return (newest, "Destacados", "Sin métricas públicas.");
        }
        ranked.sort_by(|a, b| (a.popular_rank, a.date, &a.slug).cmp(&(b.popular_rank, b.date, &b.slug)));
        ranked.truncate(FEATURED_COUNT);
        (ranked, "Más leídos", "Orden manual.")
    }

    /// Tags by descending post count, then alphabetically (case-insensitive).
    fn tags(&self) -> Vec<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for post in self.posts {
            *counts.entry(post.tag.as_str()).or_insert(0) += 1;
        }
        let mut tags: Vec<(&str, usize)> = counts.into_iter().collect();
        tags.sort_by(|(a, a_count), (b, b_count)| {
            b_count
                .cmp(a_count)
                .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
                .then_with(|| a.cmp(b))
        });
        tags.into_iter()
            .take(TAG_FILTER_COUNT)
            .map(|(tag, _)| tag)
            .collect()
    }

    fn sidebar(&self) -> String {
        let (featured, featured_title, featured_note) = self.featured();

        let featured_items = featured
            .iter()
            .map(|post| {
                format!(
                    r#"                  <li>
                    <a href="{}">
                      <span class="hero-strip-link-title">{}</span>
                      <span class="hero-strip-link-meta">{} · {} min</span>
                    </a>
                  </li>"#,
                    post.href(self.posts_url),
                    escape(&post.quick_title),
                    escape(&post.tag),
                    post.read_time,
                )
            })
            .collect::<Vec<String>>()
            .join("\n");

        let tag_items = self
            .tags()
            .iter()
            .map(|tag| {
                format!(
                    r#"                <button type="button" class="hero-strip-tag" data-tag="{0}" aria-pressed="false">{0}</button>"#,
                    escape(tag)
                )
            })
            .collect::<Vec<String>>()
            .join("\n");

        format!(
            r#"            <div class="hero-strip-inner">
              <div>
                <div class="hero-strip-head">
                  <span class="hero-strip-title">{title}</span>
                  <button type="button" class="hero-strip-clear" data-clear-filters>Ver todo</button>
                </div>
                <ul class="hero-strip-links" aria-label="{title}">
{featured_items}
                </ul>
                <div class="hero-strip-note">{note}</div>
              </div>
              <div>
                <div class="hero-strip-head">
                  <span class="hero-strip-title">Temas</span>
                </div>
                <div class="hero-strip-tags" aria-label="Filtrar por tema">
{tag_items}
                </div>
              </div>
            </div>"#,
            title = featured_title,
            note = featured_note,
            featured_items = featured_items,
            tag_items = tag_items,
        )
    }
}

/// Replaces whatever sits between `region`'s markers in `page` with
/// `replacement` (on its own lines). Only the first marker pair is used.
pub fn replace_between(page: &str, region: Region, replacement: &str) -> Result<String> {
    let (start, end) = (region.start_marker(), region.end_marker());
    let missing = || Error::MissingMarkers {
        start: start.clone(),
        end: end.clone(),
    };
    let start_at = page.find(&start).ok_or_else(missing)?;
    let content_at = start_at + start.len();
    let end_at = content_at + page[content_at..].find(&end).ok_or_else(missing)?;

    Ok(format!(
        "{}\n{}\n{}",
        &page[..content_at],
        replacement,
        &page[end_at..]
    ))
}

/// The result of updating the index page.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error updating the index page.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Returned when the page lacks a region's start or end marker (or the
    /// end marker doesn't follow the start marker).
    MissingMarkers { start: String, end: String },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingMarkers { start, end } => {
                write!(f, "missing markers {} / {} in the index page", start, end)
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn post(slug: &str, date: (i32, u32, u32), tag: &str, rank: Option<u32>) -> Post {
        Post {
            title: format!("Título {}", slug),
            slug: slug.to_owned(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            tag: tag.to_owned(),
            read_time: 3,
            popular_rank: rank,
            image: "portada_facebook.png".to_owned(),
            image_alt: "alt".to_owned(),
            excerpt: "Excerpt".to_owned(),
            quick_title: format!("Rápido {}", slug.to_uppercase()),
            quick_summary: "Resumen".to_owned(),
            conclusion: "Fin".to_owned(),
            body: String::new(),
        }
    }

    fn index(posts: &[Post]) -> Index<'_> {
        Index {
            posts,
            posts_url: "blog/posts",
            quickreads: 2,
            cta_href: "index_compliance.html#formulario",
        }
    }

    fn page() -> String {
        Region::ALL
            .iter()
            .map(|r| format!("<div>\n{}\nviejo\n{}\n</div>", r.start_marker(), r.end_marker()))
            .collect::<Vec<String>>()
            .join("\n")
    }

    #[test]
    fn test_replace_between() -> Result<()> {
        let page = "a <!-- BLOG:NEWLINK_START -->old<!-- BLOG:NEWLINK_END --> b";
        assert_eq!(
            replace_between(page, Region::NewLink, "new")?,
            "a <!-- BLOG:NEWLINK_START -->\nnew\n<!-- BLOG:NEWLINK_END --> b"
        );
        Ok(())
    }

    #[test]
    fn test_missing_markers() {
        let page = "<!-- BLOG:POSTS_END --> <!-- BLOG:POSTS_START -->";
        assert_eq!(
            replace_between(page, Region::Posts, "x"),
            Err(Error::MissingMarkers {
                start: Region::Posts.start_marker(),
                end: Region::Posts.end_marker(),
            })
        );
        assert!(index(&[]).update("<html></html>").is_err());
    }

    #[test]
    fn test_update_replaces_every_region() -> Result<()> {
        let posts = vec![
            post("c", (2024, 3, 1), "Hogar", None),
            post("b", (2024, 2, 1), "Negocio", None),
            post("a", (2024, 1, 1), "Hogar", None),
        ];
        let updated = index(&posts).update(&page())?;
        assert!(!updated.contains("viejo"));
        assert_eq!(updated.matches("<article class=\"blog-card\"").count(), 3);
        assert_eq!(updated.matches("<details>").count(), 2);
        assert!(updated.contains(
            "<a class=\"btn btn-ghost\" href=\"blog/posts/c.html\" \
             aria-label=\"Leer el artículo: Título c\">Nuevo: rápido c</a>"
        ));
        assert!(updated.contains("Destacados"));
        Ok(())
    }

    #[test]
    fn test_new_link_is_empty_without_posts() {
        assert_eq!(index(&[]).render(Region::NewLink), "");
    }

    #[test]
    fn test_featured_prefers_ranked_posts() {
        let posts = vec![
            post("d", (2024, 4, 1), "Hogar", None),
            post("c", (2024, 3, 1), "Hogar", Some(2)),
            post("b", (2024, 2, 1), "Hogar", Some(1)),
            post("a", (2024, 1, 1), "Hogar", Some(2)),
        ];
        let index = index(&posts);
        let (featured, title, _) = index.featured();
        let slugs: Vec<&str> = featured.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "a", "c"]);
        assert_eq!(title, "Más leídos");
    }

    #[test]
    fn test_featured_falls_back_to_newest() {
        let posts: Vec<Post> = (1..=5)
            .rev()
            .map(|d| post(&format!("p{}", d), (2024, 1, d), "Blog", None))
            .collect();
        let index = index(&posts);
        let (featured, title, _) = index.featured();
        let slugs: Vec<&str> = featured.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["p5", "p4", "p3"]);
        assert_eq!(title, "Destacados");
    }

    #[test]
    fn test_tags_order() {
        let posts = vec![
            post("a", (2024, 1, 1), "negocio", None),
            post("b", (2024, 1, 2), "Hogar", None),
            post("c", (2024, 1, 3), "Alarmas", None),
            post("d", (2024, 1, 4), "Hogar", None),
        ];
        assert_eq!(index(&posts).tags(), vec!["Hogar", "Alarmas", "negocio"]);
    }
}
