//! Markdown rendering for panel content.
//!
//! Converts Markdown to styled ratatui lines. Wiki links (`[[Note]]`,
//! `[[Note|label]]`) are shown as links; embeds (`![[Note]]`) are replaced by
//! the embedded note when a vault root is configured.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use tracing::trace;

use crate::error::RenderError;
use crate::host::MarkupRenderer;

const EMBED_OPEN: &str = "![[";
const LINK_OPEN: &str = "[[";
const LINK_CLOSE: &str = "]]";
const NOTE_EXTENSION: &str = "md";

/// Colors used for rendered Markdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkdownTheme {
    /// Body text.
    pub text: Color,
    /// Headings, links and list bullets.
    pub accent: Color,
    /// Code fences, rules and quotes.
    pub muted: Color,
    /// Background of inline code and code blocks.
    pub code_background: Color,
}

impl Default for MarkdownTheme {
    fn default() -> Self {
        Self {
            text: Color::Reset,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            code_background: Color::Indexed(236),
        }
    }
}

/// [`MarkupRenderer`] producing terminal lines.
#[derive(Clone, Debug, Default)]
pub struct TerminalMarkdown {
    vault_root: Option<PathBuf>,
    theme: MarkdownTheme,
}

impl TerminalMarkdown {
    /// Renderer without a vault; embeds are shown as links.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve embeds against notes under `root`.
    #[must_use]
    pub fn with_vault_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.vault_root = Some(root.into());
        self
    }

    /// Use a custom theme.
    #[must_use]
    pub fn with_theme(mut self, theme: MarkdownTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Vault root, if configured.
    #[must_use]
    pub fn vault_root(&self) -> Option<&Path> {
        self.vault_root.as_deref()
    }

    /// Render Markdown without resolving embeds.
    ///
    /// Supports headings, emphasis, strong text, inline code, code blocks,
    /// nested and ordered lists, links, wiki links, block quotes and rules.
    #[must_use]
    pub fn render_lines(&self, markdown: &str) -> Vec<Line<'static>> {
        let mut writer = LineWriter::new(self.theme);
        for event in Parser::new(markdown) {
            writer.event(event);
        }
        writer.finish()
    }

    /// Replace every embed in `markup` with the embedded note.
    async fn expand_embeds(&self, markup: &str, source_path: &str) -> Result<String, RenderError> {
        let mut expanded = String::with_capacity(markup.len());
        let mut rest = markup;

        while let Some(start) = rest.find(EMBED_OPEN) {
            let after = &rest[start + EMBED_OPEN.len()..];
            let Some(end) = after.find(LINK_CLOSE) else {
                break;
            };
            expanded.push_str(&rest[..start]);
            expanded.push_str(&self.embed(&after[..end], source_path).await?);
            rest = &after[end + LINK_CLOSE.len()..];
        }

        expanded.push_str(rest);
        Ok(expanded)
    }

    async fn embed(&self, inner: &str, source_path: &str) -> Result<String, RenderError> {
        let target = link_target(inner);
        if target.is_empty() {
            return Err(RenderError::Malformed(format!("empty embed `![[{inner}]]`")));
        }
        let Some(root) = &self.vault_root else {
            return Ok(format!("{LINK_OPEN}{inner}{LINK_CLOSE}"));
        };

        let note = read_note(root, target, source_path).await?;
        // One level deep: nested embeds become links.
        Ok(format!("\n\n{}\n\n", note.replace(EMBED_OPEN, LINK_OPEN)))
    }
}

#[async_trait]
impl MarkupRenderer for TerminalMarkdown {
    async fn render(
        &self,
        markup: &str,
        source_path: &str,
        target: &mut Text<'static>,
    ) -> Result<(), RenderError> {
        let expanded = self.expand_embeds(markup, source_path).await?;
        target.lines.extend(self.render_lines(&expanded));
        Ok(())
    }
}

/// Note name of a wiki link body: alias and heading stripped.
fn link_target(inner: &str) -> &str {
    inner.split(|c| c == '|' || c == '#').next().unwrap_or(inner).trim()
}

/// Text shown for a wiki link body: the alias if present.
fn link_label(inner: &str) -> &str {
    inner
        .split_once('|')
        .map_or_else(|| link_target(inner), |(_, alias)| alias.trim())
}

fn is_relative_inside(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

/// Find and read an embedded note, next to the source document first and
/// then at the vault root.
async fn read_note(root: &Path, target: &str, source_path: &str) -> Result<String, RenderError> {
    let relative = Path::new(target);
    if !is_relative_inside(relative) {
        return Err(RenderError::Resource(format!("{target}: outside the vault")));
    }

    let mut dirs = Vec::with_capacity(2);
    if let Some(parent) = Path::new(source_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty() && is_relative_inside(p))
    {
        dirs.push(root.join(parent));
    }
    dirs.push(root.to_path_buf());

    for dir in dirs {
        for candidate in note_candidates(dir.join(relative)) {
            match tokio::fs::read_to_string(&candidate).await {
                Ok(note) => return Ok(note),
                Err(e) => trace!(path = %candidate.display(), error = %e, "embed candidate unavailable"),
            }
        }
    }

    Err(RenderError::Resource(format!("note not found: {target}")))
}

/// Paths to try for a note: `<path>.md` first, unless the name already
/// carries the extension, then the path as written.
fn note_candidates(exact: PathBuf) -> Vec<PathBuf> {
    if exact
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(NOTE_EXTENSION))
    {
        return vec![exact];
    }
    let mut with_extension = exact.clone().into_os_string();
    with_extension.push(".");
    with_extension.push(NOTE_EXTENSION);
    vec![PathBuf::from(with_extension), exact]
}

/// Accumulates lines from parser events.
struct LineWriter {
    theme: MarkdownTheme,
    lines: Vec<Line<'static>>,
    spans: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// Adjacent text events, joined so wiki links split by the parser are
    /// seen whole.
    pending: String,
    /// Next number for ordered lists, `None` for bullet lists.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
}

impl LineWriter {
    fn new(theme: MarkdownTheme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            spans: Vec::new(),
            styles: vec![Style::default().fg(theme.text)],
            pending: String::new(),
            lists: Vec::new(),
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let style = f(self.style());
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn link_style(&self) -> Style {
        self.style()
            .fg(self.theme.accent)
            .add_modifier(Modifier::UNDERLINED)
    }

    fn flush_text(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.pending);
        let style = self.style();
        let link = self.link_style();

        let mut rest = text.as_str();
        while let Some(start) = rest.find(LINK_OPEN) {
            let after = &rest[start + LINK_OPEN.len()..];
            let Some(end) = after.find(LINK_CLOSE) else {
                break;
            };
            if start > 0 {
                self.spans.push(Span::styled(rest[..start].to_string(), style));
            }
            self.spans
                .push(Span::styled(link_label(&after[..end]).to_string(), link));
            rest = &after[end + LINK_CLOSE.len()..];
        }
        if !rest.is_empty() {
            self.spans.push(Span::styled(rest.to_string(), style));
        }
    }

    fn finish_line(&mut self) {
        self.flush_text();
        if !self.spans.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.spans)));
        }
    }

    fn blank_line(&mut self) {
        self.finish_line();
        self.lines.push(Line::from(""));
    }

    fn event(&mut self, event: Event<'_>) {
        if let Event::Text(text) = &event {
            if !self.in_code_block {
                self.pending.push_str(text);
                return;
            }
        }
        self.flush_text();

        match event {
            Event::Text(text) => {
                let style = Style::default()
                    .fg(self.theme.text)
                    .bg(self.theme.code_background);
                for line in text.lines() {
                    self.lines.push(Line::from(vec![
                        Span::raw("  "),
                        Span::styled(line.to_string(), style),
                    ]));
                }
            }
            Event::Code(code) => {
                self.spans.push(Span::styled(
                    code.to_string(),
                    Style::default()
                        .fg(self.theme.accent)
                        .bg(self.theme.code_background),
                ));
            }
            Event::Start(Tag::Strong) => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Event::Start(Tag::Emphasis) => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Event::Start(Tag::Strikethrough) => {
                self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT));
            }
            Event::Start(Tag::Link { .. } | Tag::Image { .. }) => {
                let link = self.link_style();
                self.styles.push(link);
            }
            Event::Start(Tag::Heading { level, .. }) => {
                self.finish_line();
                let accent = self.theme.accent;
                self.push_style(|s| {
                    let s = s.fg(accent).add_modifier(Modifier::BOLD);
                    if level == HeadingLevel::H1 {
                        s.add_modifier(Modifier::UNDERLINED)
                    } else {
                        s
                    }
                });
            }
            Event::Start(Tag::BlockQuote { .. }) => {
                let muted = self.theme.muted;
                self.push_style(|s| s.fg(muted).add_modifier(Modifier::ITALIC));
            }
            Event::End(
                TagEnd::Strong
                | TagEnd::Emphasis
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image,
            ) => self.pop_style(),
            Event::End(TagEnd::Heading { .. }) => {
                self.pop_style();
                self.blank_line();
            }
            Event::End(TagEnd::BlockQuote { .. }) => {
                self.pop_style();
                self.finish_line();
            }
            Event::End(TagEnd::Paragraph) => self.blank_line(),
            Event::Start(Tag::CodeBlock(kind)) => {
                self.finish_line();
                self.in_code_block = true;
                let fence = match kind {
                    CodeBlockKind::Fenced(lang) => format!("```{lang}"),
                    CodeBlockKind::Indented => "```".to_string(),
                };
                self.lines.push(Line::from(Span::styled(
                    fence,
                    Style::default().fg(self.theme.muted),
                )));
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                self.lines.push(Line::from(Span::styled(
                    "```",
                    Style::default().fg(self.theme.muted),
                )));
            }
            Event::Start(Tag::List(start)) => {
                self.finish_line();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.finish_line();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.lines.push(Line::from(""));
                }
            }
            Event::Start(Tag::Item) => {
                self.finish_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{indent}{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => format!("{indent}• "),
                };
                self.spans
                    .push(Span::styled(marker, Style::default().fg(self.theme.accent)));
            }
            Event::End(TagEnd::Item) => self.finish_line(),
            Event::SoftBreak => self.pending.push(' '),
            Event::HardBreak => self.finish_line(),
            Event::Rule => {
                self.finish_line();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(self.theme.muted),
                )));
            }
            Event::InlineHtml(html) => {
                let style = self.style();
                self.spans.push(Span::styled(html.to_string(), style));
            }
            Event::Html(html) => {
                let style = self.style();
                for line in html.lines() {
                    self.lines
                        .push(Line::from(Span::styled(line.to_string(), style)));
                }
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.finish_line();
        while self.lines.last().is_some_and(|l| l.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| line.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    fn find_span<'a>(lines: &'a [Line<'static>], content: &str) -> &'a Span<'static> {
        lines
            .iter()
            .flat_map(|line| line.spans.iter())
            .find(|span| span.content == content)
            .unwrap_or_else(|| panic!("no span {content:?} in {:?}", plain(lines)))
    }

    #[test]
    fn test_heading_and_paragraph() {
        let lines = TerminalMarkdown::new().render_lines("# Goals\n\nShip **it** soon");
        assert_eq!(plain(&lines), vec!["Goals", "", "Ship it soon"]);

        let heading = find_span(&lines, "Goals");
        assert!(heading.style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(heading.style.fg, Some(Color::Cyan));

        let strong = find_span(&lines, "it");
        assert!(strong.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_wiki_links() {
        let lines =
            TerminalMarkdown::new().render_lines("See [[Projects/Plan|the plan]] and [[Inbox]].");
        assert_eq!(plain(&lines), vec!["See the plan and Inbox."]);

        let alias = find_span(&lines, "the plan");
        assert!(alias.style.add_modifier.contains(Modifier::UNDERLINED));
        let bare = find_span(&lines, "Inbox");
        assert!(bare.style.add_modifier.contains(Modifier::UNDERLINED));
    }

    #[test]
    fn test_unclosed_wiki_link_is_text() {
        let lines = TerminalMarkdown::new().render_lines("Broken [[link here");
        assert_eq!(plain(&lines), vec!["Broken [[link here"]);
    }

    #[test]
    fn test_lists() {
        let lines = TerminalMarkdown::new().render_lines("1. one\n2. two\n\n- a\n  - b\n");
        assert_eq!(
            plain(&lines),
            vec!["1. one", "2. two", "", "• a", "  • b"]
        );
    }

    #[test]
    fn test_code_block() {
        let lines = TerminalMarkdown::new().render_lines("```rust\nlet x = 1;\n```");
        assert_eq!(plain(&lines), vec!["```rust", "  let x = 1;", "```"]);
    }

    #[test]
    fn test_link_target_and_label() {
        assert_eq!(link_target("Note#Heading|Alias"), "Note");
        assert_eq!(link_label("Note#Heading|Alias"), "Alias");
        assert_eq!(link_label(" Note "), "Note");
    }

    #[tokio::test]
    async fn test_render_appends_to_target() {
        let mut target = Text::from("existing");
        TerminalMarkdown::new()
            .render("*hi*", "Goals/x.md", &mut target)
            .await
            .unwrap();
        assert_eq!(target.lines.len(), 2);
    }

    #[tokio::test]
    async fn test_embed_without_vault_is_link() {
        let mut target = Text::default();
        TerminalMarkdown::new()
            .render("Before ![[Snippet]]", "x.md", &mut target)
            .await
            .unwrap();
        assert_eq!(plain(&target.lines), vec!["Before Snippet"]);
    }

    #[tokio::test]
    async fn test_embed_resolves_one_level() {
        let vault = tempfile::tempdir().unwrap();
        std::fs::write(vault.path().join("Snippet.md"), "**bold** and ![[Deeper]]").unwrap();
        std::fs::write(vault.path().join("Deeper.md"), "never shown").unwrap();

        let renderer = TerminalMarkdown::new().with_vault_root(vault.path());
        let mut target = Text::default();
        renderer
            .render("Intro\n\n![[Snippet]]", "Goals/x.md", &mut target)
            .await
            .unwrap();

        let text = plain(&target.lines).join("\n");
        assert!(text.contains("Intro"));
        assert!(text.contains("bold and Deeper"));
        assert!(!text.contains("never shown"));
    }

    #[tokio::test]
    async fn test_embed_prefers_source_directory() {
        let vault = tempfile::tempdir().unwrap();
        std::fs::create_dir(vault.path().join("Goals")).unwrap();
        std::fs::write(vault.path().join("Goals").join("Local.md"), "near").unwrap();
        std::fs::write(vault.path().join("Local.md"), "far").unwrap();

        let renderer = TerminalMarkdown::new().with_vault_root(vault.path());
        let mut target = Text::default();
        renderer
            .render("![[Local|alias]]", "Goals/x.md", &mut target)
            .await
            .unwrap();
        assert_eq!(plain(&target.lines), vec!["near"]);
    }

    #[tokio::test]
    async fn test_embed_of_dotted_note_name() {
        let vault = tempfile::tempdir().unwrap();
        std::fs::write(vault.path().join("Meeting 2024.01.05.md"), "minutes").unwrap();
        std::fs::write(vault.path().join("Plain.md"), "plain").unwrap();

        let renderer = TerminalMarkdown::new().with_vault_root(vault.path());
        let mut target = Text::default();
        renderer
            .render("![[Meeting 2024.01.05]]\n\n![[Plain.md]]", "x.md", &mut target)
            .await
            .unwrap();

        let text = plain(&target.lines).join("\n");
        assert!(text.contains("minutes"));
        assert!(text.contains("plain"));
    }

    #[test]
    fn test_note_candidates() {
        assert_eq!(
            note_candidates(PathBuf::from("v/a.b")),
            vec![PathBuf::from("v/a.b.md"), PathBuf::from("v/a.b")]
        );
        assert_eq!(note_candidates(PathBuf::from("v/a.md")), vec![PathBuf::from("v/a.md")]);
    }

    #[tokio::test]
    async fn test_missing_embed_is_resource_error() {
        let vault = tempfile::tempdir().unwrap();
        let renderer = TerminalMarkdown::new().with_vault_root(vault.path());

        let mut target = Text::default();
        let err = renderer
            .render("![[Missing]]", "x.md", &mut target)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Resource(_)));

        let err = renderer
            .render("![[../secret]]", "x.md", &mut target)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Resource(_)));
    }

    #[tokio::test]
    async fn test_empty_embed_is_malformed() {
        let mut target = Text::default();
        let err = TerminalMarkdown::new()
            .render("![[ ]]", "x.md", &mut target)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::Malformed(_)));
    }
}
