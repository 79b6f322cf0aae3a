//! Markdown output for a [`MarkupTree`].
use std::fmt::Write;

use luma_utils::{code_fence, inline_code};

use crate::{
  ConvertOptions,
  tree::{MarkupNode, MarkupTree, NodeId},
};

/// Render the whole document.
#[must_use]
pub fn render_markdown(tree: &MarkupTree, options: &ConvertOptions) -> String {
  MarkdownWriter { tree, options }.blocks(tree.children(tree.root()))
}

struct MarkdownWriter<'t> {
  tree:    &'t MarkupTree,
  options: &'t ConvertOptions,
}

impl MarkdownWriter<'_> {
  /// Block siblings are separated by exactly one blank line.
  fn blocks(&self, ids: &[NodeId]) -> String {
    ids
      .iter()
      .map(|&id| self.block(id))
      .filter(|block| !block.is_empty())
      .collect::<Vec<_>>()
      .join("\n\n")
  }

  fn block(&self, id: NodeId) -> String {
    let children = self.tree.children(id);
    match self.tree.node(id) {
      MarkupNode::Document | MarkupNode::ListItem => self.blocks(children),
      MarkupNode::Paragraph => self.inlines(children),
      MarkupNode::LiteralBlock { text, language } => {
        code_fence(text, language.as_deref().unwrap_or_default())
      },
      MarkupNode::DoctestBlock(session) => {
        code_fence(&session.join("\n"), &self.options.doctest_language)
      },
      MarkupNode::BulletList { ordered } => {
        let marker = if *ordered { "1. " } else { "- " };
        children
          .iter()
          .map(|&item| {
            let body = self.block(item);
            format!("{marker}{}", indent_continuation(&body, marker.len()))
          })
          .collect::<Vec<_>>()
          .join("\n")
      },
      MarkupNode::BlockQuote => {
        self
          .blocks(children)
          .lines()
          .map(|line| {
            if line.is_empty() {
              ">".to_string()
            } else {
              format!("> {line}")
            }
          })
          .collect::<Vec<_>>()
          .join("\n")
      },
      MarkupNode::Admonition { kind, title } => {
        let mut open = format!("{{% {kind}");
        if let Some(title) = title {
          let _ = write!(open, " title=\"{}\"", title.replace('"', "\\\""));
        }
        open.push_str(" %}");

        let body = self.blocks(children);
        if body.is_empty() {
          format!("{open}\n\n{{% /{kind} %}}")
        } else {
          format!("{open}\n\n{body}\n\n{{% /{kind} %}}")
        }
      },
      // Inline nodes only appear below paragraphs, but render them anyway.
      inline => inline_markdown(inline),
    }
  }

  fn inlines(&self, ids: &[NodeId]) -> String {
    ids
      .iter()
      .map(|&id| inline_markdown(self.tree.node(id)))
      .collect()
  }
}

fn inline_markdown(node: &MarkupNode) -> String {
  match node {
    MarkupNode::Text(text) => text.clone(),
    MarkupNode::Bold(text) => format!("**{text}**"),
    MarkupNode::Italic(text) => format!("*{text}*"),
    MarkupNode::InlineCode(text) | MarkupNode::TitleRef(text) => {
      inline_code(text)
    },
    MarkupNode::Hyperlink { text, url } => format!("[{text}]({url})"),
    _ => String::new(),
  }
}

/// Indent every line after the first, leaving blank lines empty.
fn indent_continuation(body: &str, width: usize) -> String {
  let pad = " ".repeat(width);
  let mut out = String::with_capacity(body.len());
  for (idx, line) in body.split('\n').enumerate() {
    if idx > 0 {
      out.push('\n');
      if !line.is_empty() {
        out.push_str(&pad);
      }
    }
    out.push_str(line);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_indent_continuation() {
    assert_eq!(indent_continuation("a\n\nb\n  c", 2), "a\n\n  b\n    c");
    assert_eq!(indent_continuation("single", 3), "single");
  }

  #[test]
  fn test_admonition_with_title() {
    let mut tree = MarkupTree::new();
    let root = tree.root();
    let admonition = tree.push(root, MarkupNode::Admonition {
      kind:  "admonition".into(),
      title: Some("Say \"hi\"".into()),
    });
    let paragraph = tree.push(admonition, MarkupNode::Paragraph);
    tree.push(paragraph, MarkupNode::Text("Body.".into()));

    assert_eq!(
      render_markdown(&tree, &ConvertOptions::default()),
      "{% admonition title=\"Say \\\"hi\\\"\" %}\n\nBody.\n\n{% /admonition \
       %}"
    );
  }

  #[test]
  fn test_block_quote_prefixes_every_line() {
    let mut tree = MarkupTree::new();
    let root = tree.root();
    let quote = tree.push(root, MarkupNode::BlockQuote);
    for text in ["One.", "Two."] {
      let paragraph = tree.push(quote, MarkupNode::Paragraph);
      tree.push(paragraph, MarkupNode::Text(text.into()));
    }

    assert_eq!(
      render_markdown(&tree, &ConvertOptions::default()),
      "> One.\n>\n> Two."
    );
  }
}
