//! Splitting of Claude Code user-text markup
//!
//! Slash commands and `!` shell escapes are logged as pseudo-XML inside the
//! user message text, e.g. `<command-name>/review</command-name>` or
//! `<bash-stdout>...</bash-stdout>`.

use crate::providers::canonical::{CommandKind, ContentBlock, StreamKind};

enum TagBlock {
    Command(CommandKind),
    Stream(StreamKind),
}

static TAGS: &[(&str, TagBlock)] = &[
    ("command-name", TagBlock::Command(CommandKind::Name)),
    ("command-message", TagBlock::Command(CommandKind::Message)),
    ("command-args", TagBlock::Command(CommandKind::Args)),
    ("bash-input", TagBlock::Stream(StreamKind::Input)),
    ("bash-stdout", TagBlock::Stream(StreamKind::Stdout)),
    ("bash-stderr", TagBlock::Stream(StreamKind::Stderr)),
    ("local-command-stdout", TagBlock::Stream(StreamKind::Stdout)),
];

fn match_tag(rest: &str) -> Option<(&'static str, &'static TagBlock)> {
    TAGS.iter().find_map(|(name, block)| {
        let open = rest.strip_prefix('<')?.strip_prefix(*name)?;
        open.starts_with('>').then_some((*name, block))
    })
}

fn push_text(blocks: &mut Vec<ContentBlock>, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        blocks.push(ContentBlock::text(text));
    }
}

/// Split user text into command, shell and text blocks
///
/// Returns `None` when the text carries no recognized markup, so callers can
/// keep it as plain string content. Unclosed tags are left as text.
pub fn split_user_markup(text: &str) -> Option<Vec<ContentBlock>> {
    let mut blocks = Vec::new();
    let mut found = false;
    let mut plain_start = 0;
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find('<') {
        let at = cursor + offset;
        let Some((name, block)) = match_tag(&text[at..]) else {
            cursor = at + 1;
            continue;
        };

        let inner_start = at + name.len() + 2;
        let close = format!("</{}>", name);
        let Some(inner_len) = text[inner_start..].find(&close) else {
            cursor = at + 1;
            continue;
        };

        push_text(&mut blocks, &text[plain_start..at]);

        let inner = text[inner_start..inner_start + inner_len].trim();
        if !inner.is_empty() {
            let inner = inner.to_string();
            blocks.push(match block {
                TagBlock::Command(kind) => ContentBlock::Command {
                    kind: *kind,
                    text: inner,
                },
                TagBlock::Stream(kind) => ContentBlock::ShellStream {
                    kind: *kind,
                    text: inner,
                },
            });
        }

        found = true;
        cursor = inner_start + inner_len + close.len();
        plain_start = cursor;
    }

    if !found {
        return None;
    }

    push_text(&mut blocks, &text[plain_start..]);
    Some(blocks)
}
