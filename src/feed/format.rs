use crate::config::DEFAULT_MAX_LINES;
use crate::directory::Directory;
use crate::feed::types::{Attachment, InboundMessage};

/// Characters a user id can start with (regular and enterprise users)
const USER_ID_PREFIXES: [char; 2] = ['U', 'W'];

/// Marker line appended when a message was cut short
const ELLIPSIS: &str = "...";

/// Turns raw Slack message text into display text
#[derive(Debug, Clone, Copy)]
pub struct TextFormatter {
    pub hyperlinks: bool,
    pub max_lines: usize,
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self {
            hyperlinks: true,
            max_lines: DEFAULT_MAX_LINES,
        }
    }
}

impl TextFormatter {
    pub fn new(hyperlinks: bool, max_lines: usize) -> Self {
        Self {
            hyperlinks,
            max_lines,
        }
    }

    /// Full text pipeline for one message.
    ///
    /// Returns `None` when nothing visible is left to show.
    pub fn display_text(&self, message: &InboundMessage, directory: &Directory) -> Option<String> {
        let text = if message.attachments.is_empty() {
            message.text.clone()
        } else {
            flatten_attachments(&message.attachments)
        };

        let text = substitute_mentions(&text, directory);
        let text = format_links(&text, self.hyperlinks);

        if text.trim().is_empty() {
            return None;
        }

        Some(truncate(&text, self.max_lines))
    }
}

/// Scan `text` for tokens that start with `open` and run to the first `>` on
/// the same line, handing each whole token to `rewrite`.
///
/// Tokens for which `rewrite` returns `None` are copied through unchanged.
fn rewrite_tokens<F>(text: &str, open: &str, mut rewrite: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let mut pos = 0;

    while let Some(found) = text[pos..].find(open) {
        let start = pos + found;
        let body = start + open.len();
        let rest = &text[body..];

        let close = rest
            .find(|c: char| c == '>' || c == '\n')
            .filter(|&i| rest[i..].starts_with('>'));

        match close {
            Some(i) => {
                let end = body + i + 1;
                let token = &text[start..end];
                out.push_str(&text[pos..start]);
                match rewrite(token) {
                    Some(replacement) => out.push_str(&replacement),
                    None => out.push_str(token),
                }
                pos = end;
            }
            None => {
                out.push_str(&text[pos..body]);
                pos = body;
            }
        }
    }

    out.push_str(&text[pos..]);
    out
}

/// Replace `<@U123>` mentions with `@Display Name`.
///
/// Every `<@` starts a candidate, even one inside a longer unresolved token,
/// and each resolvable token is then replaced everywhere it occurs. Mentions
/// of users missing from the directory are left as they are.
pub fn substitute_mentions(text: &str, directory: &Directory) -> String {
    let mut replacements: Vec<(&str, String)> = Vec::new();

    for (start, _) in text.match_indices("<@") {
        let body = &text[start + 2..];
        if !body.starts_with(&USER_ID_PREFIXES[..]) {
            continue;
        }
        let Some(close) = body.find(|c: char| c == '>' || c == '\n') else {
            continue;
        };
        if !body[close..].starts_with('>') {
            continue;
        }

        let token = &text[start..start + 2 + close + 1];
        if replacements.iter().any(|(seen, _)| *seen == token) {
            continue;
        }
        if let Some(name) = directory.user_name(&body[..close]) {
            replacements.push((token, format!("@{name}")));
        }
    }

    replacements
        .iter()
        .fold(text.to_string(), |out, (token, name)| out.replace(token, name))
}

/// OSC 8 terminal hyperlink around `title` pointing at `url`
pub fn hyperlink(url: &str, title: &str) -> String {
    format!("\x1b]8;;{url}\x07{title}\x1b]8;;\x07")
}

/// Render `<http...|title>` links as terminal hyperlinks.
///
/// Bare `<http...>` links have no label and are left alone.
pub fn format_links(text: &str, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }

    rewrite_tokens(
        text,
        "<http",
        |token| {
            let inner = &token[1..token.len() - 1];
            let mut parts = inner.split('|');
            let url = parts.next()?;
            let title = parts.last()?;
            Some(hyperlink(url, title))
        },
    )
}

/// Join attachment texts, one per line, prefixed with `title: ` when titled
pub fn flatten_attachments(attachments: &[Attachment]) -> String {
    attachments
        .iter()
        .map(|a| match a.title.as_deref() {
            Some(title) if !title.is_empty() => format!("{}: {}", title, a.text),
            _ => a.text.clone(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Keep at most `max_lines` lines, adding a `...` line when some were dropped
pub fn truncate(text: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    if lines.len() <= max_lines {
        return text.to_string();
    }

    let mut kept = lines[..max_lines].to_vec();
    kept.push(ELLIPSIS);
    kept.join("\n")
}
