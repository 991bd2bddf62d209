//! A line-oriented Markdown-to-HTML renderer. It understands exactly the
//! blocks posts use: `##`/`###` headings, `- ` list items, `>` quotes and
//! paragraphs, plus `**bold**` and `_italic_` spans inside them. Everything
//! else renders as paragraph text.

use regex::Regex;
use std::sync::LazyLock;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_(.+?)_").unwrap());

/// Renders `markdown` into an HTML fragment, one output line per block
/// element. Never fails.
pub fn render(markdown: &str) -> String {
    let mut renderer = Renderer::default();
    for line in markdown.lines() {
        renderer.feed(Block::classify(line));
    }
    renderer.finish()
}

/// Escapes `text` for HTML and then substitutes emphasis spans. Escaping goes
/// first so markup produced here is never escaped and escaped entities are
/// never read as emphasis.
pub fn inline(text: &str) -> String {
    let escaped = html_escape::encode_text(text);
    let bold = BOLD.replace_all(&escaped, "<b>$1</b>");
    ITALIC.replace_all(&bold, "<i>$1</i>").into_owned()
}

/// One physical line, classified by the first rule that matches.
#[derive(Debug, PartialEq, Eq)]
enum Block<'a> {
    Blank,
    Quote(&'a str),
    Subheading(&'a str),
    Heading(&'a str),
    ListItem(&'a str),
    Paragraph(&'a str),
}

impl<'a> Block<'a> {
    fn classify(line: &'a str) -> Block<'a> {
        let line = line.trim_end();
        if line.trim().is_empty() {
            Block::Blank
        } else if let Some(rest) = line.strip_prefix('>') {
            Block::Quote(rest.trim())
        } else if let Some(rest) = line.strip_prefix("### ") {
            Block::Subheading(rest.trim())
        } else if let Some(rest) = line.strip_prefix("## ") {
            Block::Heading(rest.trim())
        } else if let Some(rest) = line.strip_prefix("- ") {
            Block::ListItem(rest.trim())
        } else {
            Block::Paragraph(line.trim())
        }
    }
}

/// Whether an `<ul>` is currently open.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Idle,
    InList,
}

impl State {
    /// List items keep (or open) a list; every other block closes it.
    fn next(self, block: &Block) -> State {
        match block {
            Block::ListItem(_) => State::InList,
            _ => State::Idle,
        }
    }
}

#[derive(Default)]
struct Renderer {
    state: State,
    out: Vec<String>,
}

impl Renderer {
    fn feed(&mut self, block: Block) {
        self.transition(self.state.next(&block));
        match block {
            Block::Blank => {}
            Block::Quote(text) => self
                .out
                .push(format!("<blockquote><p>{}</p></blockquote>", inline(text))),
            Block::Subheading(text) => self.out.push(format!("<h3>{}</h3>", inline(text))),
            Block::Heading(text) => self.out.push(format!("<h2>{}</h2>", inline(text))),
            Block::ListItem(text) => self.out.push(format!("<li>{}</li>", inline(text))),
            Block::Paragraph(text) => self.out.push(format!("<p>{}</p>", inline(text))),
        }
    }

    fn transition(&mut self, next: State) {
        match (self.state, next) {
            (State::Idle, State::InList) => self.out.push("<ul>".to_owned()),
            (State::InList, State::Idle) => self.out.push("</ul>".to_owned()),
            (State::Idle, State::Idle) | (State::InList, State::InList) => {}
        }
        self.state = next;
    }

    fn finish(mut self) -> String {
        self.transition(State::Idle);
        self.out.join("\n")
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_list_closes_before_paragraph() {
        assert_eq!(
            render("- uno\n- dos\n\nTexto"),
            "<ul>\n<li>uno</li>\n<li>dos</li>\n</ul>\n<p>Texto</p>"
        );
    }

    #[test]
    fn test_list_closes_without_blank_line() {
        assert_eq!(
            render("- uno\nTexto\n- dos"),
            "<ul>\n<li>uno</li>\n</ul>\n<p>Texto</p>\n<ul>\n<li>dos</li>\n</ul>"
        );
    }

    #[test]
    fn test_blocks() {
        let md = "## Cómo evalúa el intruso\n### Accesos\n> Una cita\nPárrafo   \n\n\n#sin espacio";
        assert_eq!(
            render(md),
            "<h2>Cómo evalúa el intruso</h2>\n\
             <h3>Accesos</h3>\n\
             <blockquote><p>Una cita</p></blockquote>\n\
             <p>Párrafo</p>\n\
             <p>#sin espacio</p>"
        );
    }

    #[test]
    fn test_inline_emphasis() {
        assert_eq!(render("**hola** _mundo_"), "<p><b>hola</b> <i>mundo</i></p>");
    }

    #[test]
    fn test_inline_escapes_before_emphasis() {
        assert_eq!(
            inline("**a < b** & _c > d_"),
            "<b>a &lt; b</b> &amp; <i>c &gt; d</i>"
        );
        assert_eq!(inline("<script>**x**</script>"), "&lt;script&gt;<b>x</b>&lt;/script&gt;");
    }

    #[test]
    fn test_unbalanced_emphasis_is_literal() {
        assert_eq!(inline("**abierto y _solo"), "**abierto y _solo");
    }

    #[test]
    fn test_renderer_starts_idle() {
        assert_eq!(State::default(), State::Idle);
        assert_eq!(State::Idle.next(&Block::classify("- uno")), State::InList);
        assert_eq!(State::InList.next(&Block::classify("")), State::Idle);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(render(""), "");
        assert_eq!(render("\n\n"), "");
    }
}
