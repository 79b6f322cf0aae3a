//! Block structure: turns lines into a [`MarkupTree`].
//!
//! Indentation decides nesting. Every construct that owns a body (list
//! items, directives, block quotes) hands its dedented lines back to
//! [`BlockParser::blocks`], so nesting depth is bounded by
//! [`ConvertOptions::max_depth`].
use std::sync::LazyLock;

use log::{debug, error};
use luma_utils::expand_tabs;
use regex::Regex;

use crate::{
  ConvertOptions,
  error::MarkupError,
  inline::{InlineParser, Targets, never_matching_regex, normalize_name},
  tree::{MarkupNode, MarkupTree, NodeId},
};

/// Directives rendered as `{% kind %}` callouts.
const ADMONITIONS: &[&str] = &[
  "attention",
  "caution",
  "danger",
  "error",
  "hint",
  "important",
  "note",
  "tip",
  "warning",
  "seealso",
];

/// Directives whose body is source code.
const CODE_DIRECTIVES: &[&str] = &["code-block", "code", "sourcecode"];

/// Marker that opens a doctest block.
const DOCTEST_PROMPT: &str = ">>>";

/// `.. name:: argument`
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\.\.\s+([A-Za-z0-9][A-Za-z0-9_+.-]*)::(?:\s+(.*?))?\s*$")
    .unwrap_or_else(|e| {
      error!("Failed to compile DIRECTIVE regex: {e}");
      never_matching_regex()
    })
});

/// `.. _name: url`, `` .. _`name`: url `` or `.. __: url`
static TARGET: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\.\.\s+_(?:`([^`]+)`|([^:]*)):(?:\s+(.*?))?\s*$")
    .unwrap_or_else(|e| {
      error!("Failed to compile TARGET regex: {e}");
      never_matching_regex()
    })
});

/// `:name: value` in a directive's option block.
static OPTION: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^:[^:\s][^:]*:(?:\s.*)?$").unwrap_or_else(|e| {
    error!("Failed to compile OPTION regex: {e}");
    never_matching_regex()
  })
});

static BULLET: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([-*+])(?:\s+|$)").unwrap_or_else(|e| {
    error!("Failed to compile BULLET regex: {e}");
    never_matching_regex()
  })
});

/// `1.`, `1)`, `(1)`, with `#` or a single letter in place of the number.
static ENUMERATOR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"^(?:\((?:[0-9]+|#|[A-Za-z])\)|(?:[0-9]+|#|[A-Za-z])([.)]))(?:\s+|$)",
  )
  .unwrap_or_else(|e| {
    error!("Failed to compile ENUMERATOR regex: {e}");
    never_matching_regex()
  })
});

/// One source line, remembering where it came from.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
  number: usize,
  text:   &'a str,
}

impl Line<'_> {
  fn is_blank(self) -> bool {
    self.text.trim().is_empty()
  }

  fn indent(self) -> usize {
    self.text.len() - self.text.trim_start_matches(' ').len()
  }

  /// Drop `columns` leading spaces. Blank lines become empty.
  fn dedented(self, columns: usize) -> Self {
    let text = if self.is_blank() {
      ""
    } else {
      self.text.get(columns.min(self.indent())..).unwrap_or(self.text)
    };
    Self { text, ..self }
  }
}

/// Which list a marker belongs to. Items only continue a list of the same
/// style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListStyle {
  Bullet(char),
  Parenthesized,
  Period,
  Paren,
}

impl ListStyle {
  const fn is_ordered(self) -> bool {
    !matches!(self, Self::Bullet(_))
  }
}

/// Detect a list marker, returning its style and the column its text starts
/// at.
fn list_marker(text: &str) -> Option<(ListStyle, usize)> {
  if let Some(caps) = BULLET.captures(text) {
    let bullet = caps[1].chars().next()?;
    return Some((ListStyle::Bullet(bullet), marker_width(&caps[0])));
  }

  let caps = ENUMERATOR.captures(text)?;
  let style = match caps.get(1).map(|m| m.as_str()) {
    Some(".") => ListStyle::Period,
    Some(_) => ListStyle::Paren,
    None => ListStyle::Parenthesized,
  };
  Some((style, marker_width(&caps[0])))
}

/// A marker alone on its line still reserves a column for the text.
fn marker_width(marker: &str) -> usize {
  if marker.ends_with(char::is_whitespace) {
    marker.len()
  } else {
    marker.len() + 1
  }
}

/// Section adornment: a run of at least four identical punctuation marks.
fn is_adornment(text: &str) -> bool {
  let text = text.trim_end();
  let mut chars = text.chars();
  chars.next().is_some_and(|first| {
    first.is_ascii_punctuation()
      && text.len() >= 4
      && chars.all(|c| c == first)
  })
}

/// Index past the indented block starting at `start`: the run of blank or
/// indented lines, without trailing blank lines.
fn indented_block_end(lines: &[Line<'_>], start: usize) -> usize {
  let mut end = start;
  while lines
    .get(end)
    .is_some_and(|line| line.is_blank() || line.indent() > 0)
  {
    end += 1;
  }
  while end > start && lines.get(end - 1).is_some_and(|line| line.is_blank()) {
    end -= 1;
  }
  end
}

/// Remove the common indentation of `lines`.
fn dedent<'a>(lines: &[Line<'a>]) -> Vec<Line<'a>> {
  let margin = lines
    .iter()
    .filter(|line| !line.is_blank())
    .map(|line| line.indent())
    .min()
    .unwrap_or(0);
  lines.iter().map(|line| line.dedented(margin)).collect()
}

/// Collect hyperlink targets so references can resolve ahead of their
/// definition.
fn collect_targets(lines: &[Line<'_>]) -> Targets {
  let mut targets = Targets::default();
  for line in lines {
    let Some(caps) = TARGET.captures(line.text.trim_start()) else {
      continue;
    };
    let url = caps.get(3).map_or("", |m| m.as_str()).to_string();
    match caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str()) {
      Some("_") => targets.anonymous.push_back(url),
      Some(name) if !name.trim().is_empty() => {
        targets.named.insert(normalize_name(name), url);
      },
      _ => debug!("luma-rst: ignoring unnamed target on line {}", line.number),
    }
  }
  targets
}

/// Parse `text` into a document tree.
///
/// # Errors
///
/// Returns a [`MarkupError`] for constructs that have no Markdown
/// counterpart (section titles, transitions), for unknown or malformed
/// directives, and for bodies nested deeper than
/// [`ConvertOptions::max_depth`].
pub fn parse_markup(
  text: &str,
  options: &ConvertOptions,
) -> Result<MarkupTree, MarkupError> {
  let expanded: Vec<String> = text.lines().map(expand_tabs).collect();
  let lines: Vec<Line<'_>> = expanded
    .iter()
    .enumerate()
    .map(|(idx, text)| {
      Line {
        number: idx + 1,
        text:   text.trim_end(),
      }
    })
    .collect();

  let mut parser = BlockParser {
    tree:      MarkupTree::new(),
    inline:    InlineParser::new(collect_targets(&lines)),
    max_depth: options.max_depth,
  };
  let root = parser.tree.root();
  parser.blocks(&dedent(&lines), root, 0)?;
  Ok(parser.tree)
}

struct BlockParser {
  tree:      MarkupTree,
  inline:    InlineParser,
  max_depth: usize,
}

impl BlockParser {
  /// Parse a run of block-level constructs into children of `parent`.
  fn blocks(
    &mut self,
    lines: &[Line<'_>],
    parent: NodeId,
    depth: usize,
  ) -> Result<(), MarkupError> {
    if depth > self.max_depth {
      return Err(MarkupError::TooDeep {
        max_depth: self.max_depth,
        line:      lines.first().map_or(0, |line| line.number),
      });
    }

    let mut idx = 0;
    while let Some(&line) = lines.get(idx) {
      if line.is_blank() {
        idx += 1;
        continue;
      }

      idx = if line.indent() > 0 {
        self.block_quote(lines, idx, parent, depth)?
      } else if line.text == ".." || line.text.starts_with(".. ") {
        self.explicit_markup(lines, idx, parent, depth)?
      } else if line.text == DOCTEST_PROMPT
        || line.text.starts_with(">>> ")
      {
        self.doctest(lines, idx, parent)
      } else if list_marker(line.text).is_some() {
        self.list(lines, idx, parent, depth)?
      } else {
        self.paragraph(lines, idx, parent)?
      };
    }
    Ok(())
  }

  fn block_quote(
    &mut self,
    lines: &[Line<'_>],
    start: usize,
    parent: NodeId,
    depth: usize,
  ) -> Result<usize, MarkupError> {
    let end = indented_block_end(lines, start);
    let quote = self.tree.push(parent, MarkupNode::BlockQuote);
    self.blocks(&dedent(&lines[start..end]), quote, depth + 1)?;
    Ok(end)
  }

  fn doctest(
    &mut self,
    lines: &[Line<'_>],
    start: usize,
    parent: NodeId,
  ) -> usize {
    let end = lines[start..]
      .iter()
      .position(|line| line.is_blank())
      .map_or(lines.len(), |offset| start + offset);
    let session = lines[start..end]
      .iter()
      .map(|line| line.text.to_string())
      .collect();
    self.tree.push(parent, MarkupNode::DoctestBlock(session));
    end
  }

  fn paragraph(
    &mut self,
    lines: &[Line<'_>],
    start: usize,
    parent: NodeId,
  ) -> Result<usize, MarkupError> {
    let end = lines[start..]
      .iter()
      .position(|line| line.is_blank() || line.indent() > 0)
      .map_or(lines.len(), |offset| start + offset);
    let body = &lines[start..end];
    check_adornments(body)?;

    let mut text = body
      .iter()
      .map(|line| line.text)
      .collect::<Vec<_>>()
      .join("\n");

    // `::` at the end of a paragraph announces a literal block.
    let Some(before) = text.strip_suffix("::") else {
      self.push_paragraph(parent, &text);
      return Ok(end);
    };
    if before.trim().is_empty() {
      debug!("luma-rst: dropping lone `::` on line {}", body[0].number);
    } else if before.ends_with(char::is_whitespace) {
      text = before.trim_end().to_string();
      self.push_paragraph(parent, &text);
    } else {
      text = format!("{before}:");
      self.push_paragraph(parent, &text);
    }

    let next = lines[end..]
      .iter()
      .position(|line| !line.is_blank())
      .map_or(lines.len(), |offset| end + offset);
    if lines.get(next).is_none_or(|line| line.indent() == 0) {
      debug!(
        "luma-rst: literal block expected after line {}, none found",
        body[0].number
      );
      return Ok(end);
    }

    let block_end = indented_block_end(lines, next);
    let literal = dedent(&lines[next..block_end])
      .iter()
      .map(|line| line.text)
      .collect::<Vec<_>>()
      .join("\n");
    self.tree.push(parent, MarkupNode::LiteralBlock {
      text:     literal,
      language: None,
    });
    Ok(block_end)
  }

  fn push_paragraph(&mut self, parent: NodeId, text: &str) {
    let paragraph = self.tree.push(parent, MarkupNode::Paragraph);
    for node in self.inline.parse(text) {
      self.tree.push(paragraph, node);
    }
  }

  fn list(
    &mut self,
    lines: &[Line<'_>],
    start: usize,
    parent: NodeId,
    depth: usize,
  ) -> Result<usize, MarkupError> {
    let Some((style, _)) = list_marker(lines[start].text) else {
      return Ok(start + 1);
    };
    let list = self.tree.push(parent, MarkupNode::BulletList {
      ordered: style.is_ordered(),
    });

    let mut idx = start;
    loop {
      let Some((_, width)) = lines
        .get(idx)
        .and_then(|line| list_marker(line.text))
        .filter(|(item_style, _)| *item_style == style)
      else {
        return Ok(idx);
      };

      let line = lines[idx];
      let end = indented_block_end(lines, idx + 1);
      let first = Line {
        text: line.text.get(width..).unwrap_or_default(),
        ..line
      };
      let rest = &lines[idx + 1..end];
      let mut body = Vec::with_capacity(end - idx);
      // Text on the marker line puts the body at the marker's width; a bare
      // marker takes the indentation of its first body line.
      if first.is_blank() {
        body.extend(dedent(rest));
      } else {
        body.push(first);
        body.extend(rest.iter().map(|line| line.dedented(width)));
      }

      let item = self.tree.push(list, MarkupNode::ListItem);
      self.blocks(&body, item, depth + 1)?;

      // Blank lines may separate items of the same list.
      idx = lines[end..]
        .iter()
        .position(|line| !line.is_blank())
        .map_or(lines.len(), |offset| end + offset);
    }
  }

  /// Lines starting with `..`: directives, hyperlink targets and comments.
  fn explicit_markup(
    &mut self,
    lines: &[Line<'_>],
    start: usize,
    parent: NodeId,
    depth: usize,
  ) -> Result<usize, MarkupError> {
    let line = lines[start];
    let end = indented_block_end(lines, start + 1);

    if TARGET.is_match(line.text) {
      return Ok(end);
    }
    let Some(caps) = DIRECTIVE.captures(line.text) else {
      debug!("luma-rst: skipping comment on line {}", line.number);
      return Ok(end);
    };

    let name = caps[1].to_lowercase();
    let argument = caps.get(2).map(|m| m.as_str()).filter(|a| !a.is_empty());
    let body = dedent(&lines[start + 1..end]);
    let content = skip_options(&body)?;

    if ADMONITIONS.contains(&name.as_str()) {
      let admonition = self.tree.push(parent, MarkupNode::Admonition {
        kind:  name,
        title: None,
      });
      // Text on the directive line opens the body.
      let mut children = Vec::with_capacity(content.len() + 1);
      if let Some(argument) = argument {
        children.push(Line {
          text: argument,
          ..line
        });
      }
      children.extend_from_slice(content);
      self.blocks(&children, admonition, depth + 1)?;
    } else if name == "admonition" {
      let Some(title) = argument else {
        return Err(MarkupError::MissingTitle { line: line.number });
      };
      let admonition = self.tree.push(parent, MarkupNode::Admonition {
        kind:  name,
        title: Some(title.to_string()),
      });
      self.blocks(content, admonition, depth + 1)?;
    } else if CODE_DIRECTIVES.contains(&name.as_str()) {
      let code = dedent(content)
        .iter()
        .map(|line| line.text)
        .collect::<Vec<_>>()
        .join("\n");
      self.tree.push(parent, MarkupNode::LiteralBlock {
        text:     code.trim_matches('\n').to_string(),
        language: argument.map(str::to_string),
      });
    } else {
      return Err(MarkupError::UnknownDirective {
        name,
        line: line.number,
      });
    }

    Ok(end)
  }
}

/// Skip a directive's leading `:option:` lines, returning the content after
/// them.
fn skip_options<'b, 'a>(
  body: &'b [Line<'a>],
) -> Result<&'b [Line<'a>], MarkupError> {
  let mut idx = 0;
  while let Some(line) = body.get(idx) {
    if !line.text.starts_with(':') {
      break;
    }
    if !OPTION.is_match(line.text) {
      return Err(MarkupError::MalformedOption {
        option: line.text.to_string(),
        line:   line.number,
      });
    }
    idx += 1;
  }
  Ok(&body[idx..])
}

/// Reject section titles and transitions: a paragraph may not be or contain
/// an adornment line.
fn check_adornments(body: &[Line<'_>]) -> Result<(), MarkupError> {
  let Some(first) = body.first() else {
    return Ok(());
  };

  if is_adornment(first.text) {
    return Err(match body.get(1) {
      Some(title) => {
        MarkupError::SectionTitle {
          title: title.text.trim().to_string(),
          line:  title.number,
        }
      },
      None => MarkupError::Transition { line: first.number },
    });
  }

  if let Some(underline) = body.get(1)
    && is_adornment(underline.text)
  {
    return Err(MarkupError::SectionTitle {
      title: first.text.trim().to_string(),
      line:  first.number,
    });
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(text: &str) -> Vec<MarkupNode> {
    let tree = parse_markup(text, &ConvertOptions::default())
      .unwrap_or_else(|_| MarkupTree::new());
    tree
      .children(tree.root())
      .iter()
      .map(|&id| tree.node(id).clone())
      .collect()
  }

  #[test]
  fn test_list_markers() {
    assert_eq!(list_marker("- a"), Some((ListStyle::Bullet('-'), 2)));
    assert_eq!(list_marker("*   a"), Some((ListStyle::Bullet('*'), 4)));
    assert_eq!(list_marker("-"), Some((ListStyle::Bullet('-'), 2)));
    assert_eq!(list_marker("12. a"), Some((ListStyle::Period, 4)));
    assert_eq!(list_marker("#) a"), Some((ListStyle::Paren, 3)));
    assert_eq!(list_marker("(b) a"), Some((ListStyle::Parenthesized, 4)));
    assert_eq!(list_marker("-1 is negative"), None);
    assert_eq!(list_marker("e.g. this"), None);
    assert_eq!(list_marker("**bold**"), None);
  }

  #[test]
  fn test_adornments() {
    assert!(is_adornment("===="));
    assert!(is_adornment("~~~~~~  "));
    assert!(!is_adornment("==="));
    assert!(!is_adornment("=-=-"));
    assert!(!is_adornment("aaaa"));
  }

  #[test]
  fn test_top_level_blocks() {
    let nodes = kinds("Para.\n\n>>> 1\n1\n\n   quoted\n\n1. a\n2. b");
    assert_eq!(nodes.len(), 4);
    assert!(matches!(nodes[0], MarkupNode::Paragraph));
    assert_eq!(
      nodes[1],
      MarkupNode::DoctestBlock(vec![">>> 1".into(), "1".into()])
    );
    assert_eq!(nodes[2], MarkupNode::BlockQuote);
    assert_eq!(nodes[3], MarkupNode::BulletList { ordered: true });
  }

  #[test]
  fn test_different_bullets_start_new_lists() {
    let nodes = kinds("- a\n* b");
    assert_eq!(nodes.len(), 2);
  }

  #[test]
  fn test_code_block_directive() {
    let nodes = kinds(".. code-block:: rust\n   :linenos:\n\n   fn main() {}");
    assert_eq!(nodes, [MarkupNode::LiteralBlock {
      text:     "fn main() {}".into(),
      language: Some("rust".into()),
    }]);
  }

  #[test]
  fn test_comments_and_targets_are_dropped() {
    let nodes =
      kinds(".. a comment\n   spanning lines\n\n.. _site: https://x.y\n\nText.");
    assert_eq!(nodes.len(), 1);
  }

  #[test]
  fn test_structural_errors() {
    let options = ConvertOptions::default();
    assert_eq!(
      parse_markup("Title\n=====\n\nText.", &options).err(),
      Some(MarkupError::SectionTitle {
        title: "Title".into(),
        line:  1,
      })
    );
    assert_eq!(
      parse_markup("A.\n\n----------\n\nB.", &options).err(),
      Some(MarkupError::Transition { line: 3 })
    );
    assert_eq!(
      parse_markup(".. image:: a.png", &options).err(),
      Some(MarkupError::UnknownDirective {
        name: "image".into(),
        line: 1,
      })
    );
    assert_eq!(
      parse_markup(".. admonition::\n\n   Body.", &options).err(),
      Some(MarkupError::MissingTitle { line: 1 })
    );
    assert_eq!(
      parse_markup(".. note::\n   :class broken\n\n   Body.", &options).err(),
      Some(MarkupError::MalformedOption {
        option: ":class broken".into(),
        line:   2,
      })
    );
  }

  #[test]
  fn test_depth_limit() {
    let options = ConvertOptions {
      max_depth: 2,
      ..ConvertOptions::default()
    };
    assert!(parse_markup("- a\n\n  - b", &options).is_ok());
    assert_eq!(
      parse_markup("- a\n\n  - b\n\n    - c", &options).err(),
      Some(MarkupError::TooDeep {
        max_depth: 2,
        line:      5,
      })
    );
  }
}
