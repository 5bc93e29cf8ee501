//! Code blocks as they appear in a rendered message.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// A code block from a message, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCodeBlock {
    /// First word of the fence info string; empty for indented blocks.
    pub lang: String,
    pub code: String,
}

pub(crate) fn language_hint_from_codeblock_kind(kind: &CodeBlockKind<'_>) -> String {
    match kind {
        CodeBlockKind::Indented => String::new(),
        CodeBlockKind::Fenced(info) => info.split_ascii_whitespace().next().unwrap_or("").into(),
    }
}

pub fn code_blocks(text: &str) -> Vec<MessageCodeBlock> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = Vec::new();
    let mut current: Option<MessageCodeBlock> = None;
    for event in Parser::new_ext(text, options) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                current = Some(MessageCodeBlock {
                    lang: language_hint_from_codeblock_kind(&kind),
                    code: String::new(),
                });
            }
            Event::Text(chunk) => {
                if let Some(block) = current.as_mut() {
                    block.code.push_str(&chunk);
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some(block) = current.take() {
                    out.push(block);
                }
            }
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_fenced_and_indented_blocks() {
        let text = "Intro\n\n```rust\nfn main() {}\n```\n\nThen:\n\n    indented line\n\n```mermaid extra\ngraph TD\n```\n";
        let blocks = code_blocks(text);
        assert_eq!(
            blocks,
            vec![
                MessageCodeBlock {
                    lang: "rust".into(),
                    code: "fn main() {}\n".into()
                },
                MessageCodeBlock {
                    lang: String::new(),
                    code: "indented line\n".into()
                },
                MessageCodeBlock {
                    lang: "mermaid".into(),
                    code: "graph TD\n".into()
                },
            ]
        );
    }

    #[test]
    fn annotated_fence_keeps_full_tag() {
        let blocks = code_blocks("```js=index.js\nconsole.log(1)\n```");
        assert_eq!(blocks[0].lang, "js=index.js");
        assert_eq!(blocks[0].code, "console.log(1)\n");
    }

    #[test]
    fn plain_text_has_no_blocks() {
        assert!(code_blocks("nothing to see here").is_empty());
    }
}
