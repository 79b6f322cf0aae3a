//! Inline markup: emphasis, literals, interpreted text, references and roles.
//!
//! Recognition follows the reStructuredText inline markup rules: a start
//! string must begin the text or follow whitespace or an opening punctuation
//! character and be followed by non-whitespace; an end string must follow
//! non-whitespace and be followed by the end of the text, whitespace or a
//! closing punctuation character. Anything that does not close is plain text.
use std::{
  collections::{HashMap, VecDeque},
  sync::LazyLock,
};

use log::{debug, error};
use regex::Regex;

use crate::tree::MarkupNode;

/// Characters allowed right before an inline start string.
const OPENERS: &str = "-:/'\"<([{";

/// Characters allowed right after an inline end string.
const CLOSERS: &str = "-.,:;!?\\/'\")]}>";

/// `:role:` prefix of interpreted text, e.g. `:func:` or `:py:class:`.
static ROLE_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^:([A-Za-z0-9_.+-]+(?::[A-Za-z0-9_.+-]+)*):`").unwrap_or_else(
    |e| {
      error!("Failed to compile ROLE_PREFIX regex: {e}");
      never_matching_regex()
    },
  )
});

/// Simple reference name followed by `_` or `__`, e.g. `Python_`.
static SIMPLE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^([A-Za-z0-9]+(?:[-_.:+][A-Za-z0-9]+)*)(__?)").unwrap_or_else(
    |e| {
      error!("Failed to compile SIMPLE_REFERENCE regex: {e}");
      never_matching_regex()
    },
  )
});

/// `text <target>` inside a reference or role.
static EMBEDDED_TARGET: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)^(.*?)\s*<([^<>]+)>$").unwrap_or_else(|e| {
    error!("Failed to compile EMBEDDED_TARGET regex: {e}");
    never_matching_regex()
  })
});

/// Create a regex that never matches anything.
#[allow(
  clippy::expect_used,
  reason = "The pattern is a constant known to compile"
)]
pub(crate) fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("Failed to compile never-matching regex")
}

/// Hyperlink targets declared anywhere in the document.
#[derive(Debug, Default)]
pub(crate) struct Targets {
  /// Named targets keyed by [`normalize_name`].
  pub named:     HashMap<String, String>,
  /// `__` targets, consumed in document order.
  pub anonymous: VecDeque<String>,
}

/// Reference names match case-insensitively with whitespace collapsed.
pub(crate) fn normalize_name(name: &str) -> String {
  name
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
    .to_lowercase()
}

/// Turns paragraph text into inline nodes.
#[derive(Debug, Default)]
pub(crate) struct InlineParser {
  targets: Targets,
}

impl InlineParser {
  pub(crate) const fn new(targets: Targets) -> Self {
    Self { targets }
  }

  /// Split `text` into inline nodes. Adjacent plain text is merged into a
  /// single [`MarkupNode::Text`].
  pub(crate) fn parse(&mut self, text: &str) -> Vec<MarkupNode> {
    let mut nodes = Vec::new();
    let mut plain = String::new();
    let mut pos = 0;

    while let Some(c) = text[pos..].chars().next() {
      if c == '\\' {
        // Escapes pass through; Markdown reads them the same way.
        plain.push('\\');
        pos += 1;
        if let Some(escaped) = text[pos..].chars().next() {
          plain.push(escaped);
          pos += escaped.len_utf8();
        }
        continue;
      }

      if may_start_markup(text, pos)
        && let Some((node, end)) = self.markup(text, pos)
      {
        if let MarkupNode::Text(unresolved) = node {
          plain.push_str(&unresolved);
        } else {
          if !plain.is_empty() {
            nodes.push(MarkupNode::Text(std::mem::take(&mut plain)));
          }
          nodes.push(node);
        }
        pos = end;
        continue;
      }

      plain.push(c);
      pos += c.len_utf8();
    }

    if !plain.is_empty() {
      nodes.push(MarkupNode::Text(plain));
    }
    nodes
  }

  /// Try every construct whose start string sits at `pos`. Returns the node
  /// and the byte offset just past its end string.
  fn markup(&mut self, text: &str, pos: usize) -> Option<(MarkupNode, usize)> {
    let rest = &text[pos..];

    if rest.starts_with("``") {
      let (content, end) = find_end(text, pos + 2, "``")?;
      return Some((MarkupNode::InlineCode(content.to_string()), end));
    }
    if rest.starts_with("**") {
      let (content, end) = find_end(text, pos + 2, "**")?;
      return Some((MarkupNode::Bold(content.to_string()), end));
    }
    if rest.starts_with('*') {
      let (content, end) = find_end(text, pos + 1, "*")?;
      return Some((MarkupNode::Italic(content.to_string()), end));
    }
    if rest.starts_with('`') {
      return self.interpreted(text, pos + 1);
    }
    if let Some(prefix) = ROLE_PREFIX.find(rest) {
      let (content, end, _) = find_backtick_end(text, pos + prefix.end())?;
      return Some((MarkupNode::InlineCode(role_display(content)), end));
    }
    if let Some(caps) = SIMPLE_REFERENCE.captures(rest) {
      let end = pos + caps[0].len();
      if !may_end_markup(text, end) {
        return None;
      }
      let suffix = if caps[2].len() == 2 {
        Suffix::Anonymous
      } else {
        Suffix::Named
      };
      return Some((self.resolve(&caps[1], suffix), end));
    }
    None
  }

  /// `` `text` ``, `` `text`_ `` or `` `text`__ `` starting at `start`.
  fn interpreted(
    &mut self,
    text: &str,
    start: usize,
  ) -> Option<(MarkupNode, usize)> {
    let (content, end, suffix) = find_backtick_end(text, start)?;

    let node = match suffix {
      Suffix::None => MarkupNode::TitleRef(content.to_string()),
      Suffix::Named | Suffix::Anonymous => {
        if let Some(caps) = EMBEDDED_TARGET.captures(content) {
          let url: String = caps[2].split_whitespace().collect();
          let label = caps[1].trim();
          if suffix == Suffix::Named && !label.is_empty() {
            self
              .targets
              .named
              .insert(normalize_name(label), url.clone());
          }
          let text = if label.is_empty() {
            url.clone()
          } else {
            label.to_string()
          };
          MarkupNode::Hyperlink { text, url }
        } else {
          self.resolve(content, suffix)
        }
      },
    };

    Some((node, end))
  }

  /// Look up the target of a reference without an embedded URL.
  fn resolve(&mut self, name: &str, suffix: Suffix) -> MarkupNode {
    let url = if suffix == Suffix::Anonymous {
      self.targets.anonymous.pop_front()
    } else {
      self.targets.named.get(&normalize_name(name)).cloned()
    };

    match url {
      Some(url) => {
        MarkupNode::Hyperlink {
          text: name.to_string(),
          url,
        }
      },
      None => {
        debug!("luma-rst: no target for reference `{name}`, keeping its text");
        MarkupNode::Text(name.to_string())
      },
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Suffix {
  None,
  Named,
  Anonymous,
}

fn prev_char(text: &str, pos: usize) -> Option<char> {
  text[..pos].chars().next_back()
}

fn may_start_markup(text: &str, pos: usize) -> bool {
  let starts_construct = text[pos..]
    .chars()
    .next()
    .is_some_and(|c| {
      matches!(c, '*' | '`' | ':') || c.is_ascii_alphanumeric()
    });
  starts_construct
    && prev_char(text, pos)
      .is_none_or(|prev| prev.is_whitespace() || OPENERS.contains(prev))
}

fn may_end_markup(text: &str, pos: usize) -> bool {
  text[pos..]
    .chars()
    .next()
    .is_none_or(|next| next.is_whitespace() || CLOSERS.contains(next))
}

/// Content must start right after the start string with non-whitespace.
fn opens_content(text: &str, start: usize) -> bool {
  text[start..]
    .chars()
    .next()
    .is_some_and(|first| !first.is_whitespace())
}

/// Find the first valid `delim` end string after `start`.
fn find_end<'t>(
  text: &'t str,
  start: usize,
  delim: &str,
) -> Option<(&'t str, usize)> {
  if !opens_content(text, start) {
    return None;
  }

  let literal = delim == "``";
  let mut search = start;
  while let Some(offset) = text[search..].find(delim) {
    let at = search + offset;
    let end = at + delim.len();
    let closes = at > start
      && prev_char(text, at).is_some_and(|prev| {
        !prev.is_whitespace() && (literal || prev != '\\')
      })
      && may_end_markup(text, end);
    if closes {
      return Some((&text[start..at], end));
    }
    search = at + 1;
  }
  None
}

/// Find the backtick closing interpreted text, along with any reference
/// suffix (`_` or `__`) directly after it.
fn find_backtick_end(
  text: &str,
  start: usize,
) -> Option<(&str, usize, Suffix)> {
  if !opens_content(text, start) {
    return None;
  }

  let mut search = start;
  while let Some(offset) = text[search..].find('`') {
    let at = search + offset;
    let after = &text[at + 1..];
    let (suffix, width) = if after.starts_with("__") {
      (Suffix::Anonymous, 2)
    } else if after.starts_with('_') {
      (Suffix::Named, 1)
    } else {
      (Suffix::None, 0)
    };
    let end = at + 1 + width;

    let closes = at > start
      && prev_char(text, at)
        .is_some_and(|prev| !prev.is_whitespace() && prev != '\\')
      && may_end_markup(text, end);
    if closes {
      return Some((&text[start..at], end, suffix));
    }
    search = at + 1;
  }
  None
}

/// Text shown for a role: the explicit title of `title <target>`, the last
/// dotted component of `~pkg.name`, or the target itself.
fn role_display(content: &str) -> String {
  let content = content.trim().trim_start_matches('!');

  if let Some(caps) = EMBEDDED_TARGET.captures(content) {
    let title = caps[1].trim();
    if !title.is_empty() {
      return title.to_string();
    }
  }

  match content.strip_prefix('~') {
    Some(target) => target.rsplit('.').next().unwrap_or(target).to_string(),
    None => content.to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse(text: &str) -> Vec<MarkupNode> {
    InlineParser::default().parse(text)
  }

  fn text(s: &str) -> MarkupNode {
    MarkupNode::Text(s.to_string())
  }

  #[test]
  fn test_plain_text_is_one_node() {
    assert_eq!(parse("Use & and < and > symbols."), [text(
      "Use & and < and > symbols."
    )]);
  }

  #[test]
  fn test_emphasis_and_literals() {
    assert_eq!(parse("Use **bold** and *it* or ``x()``."), [
      text("Use "),
      MarkupNode::Bold("bold".into()),
      text(" and "),
      MarkupNode::Italic("it".into()),
      text(" or "),
      MarkupNode::InlineCode("x()".into()),
      text("."),
    ]);
  }

  #[test]
  fn test_start_string_rules() {
    // Inside a word or followed by whitespace nothing is recognised.
    assert_eq!(parse("2*3*4"), [text("2*3*4")]);
    assert_eq!(parse("a * b * c"), [text("a * b * c")]);
    assert_eq!(parse("*unclosed"), [text("*unclosed")]);
    assert_eq!(parse("(*x*)"), [
      text("("),
      MarkupNode::Italic("x".into()),
      text(")"),
    ]);
  }

  #[test]
  fn test_literal_keeps_inner_markup() {
    assert_eq!(parse("``**not bold**``"), [MarkupNode::InlineCode(
      "**not bold**".into()
    )]);
  }

  #[test]
  fn test_escapes_pass_through() {
    assert_eq!(parse(r"\*not italic\*"), [text(r"\*not italic\*")]);
  }

  #[test]
  fn test_title_reference() {
    assert_eq!(parse("See `foo` here"), [
      text("See "),
      MarkupNode::TitleRef("foo".into()),
      text(" here"),
    ]);
  }

  #[test]
  fn test_embedded_and_named_references() {
    let mut parser = InlineParser::default();
    assert_eq!(parser.parse("`Python <https://python.org>`_"), [
      MarkupNode::Hyperlink {
        text: "Python".into(),
        url:  "https://python.org".into(),
      }
    ]);
    // The embedded URI also defines a named target.
    assert_eq!(parser.parse("again `python`_"), [
      text("again "),
      MarkupNode::Hyperlink {
        text: "python".into(),
        url:  "https://python.org".into(),
      },
    ]);
    assert_eq!(parser.parse("`missing`_"), [text("missing")]);
  }

  #[test]
  fn test_simple_references() {
    let mut parser = InlineParser::new(Targets {
      named:     HashMap::from([(
        "python".to_string(),
        "https://python.org".to_string(),
      )]),
      anonymous: VecDeque::from(["https://a.example".to_string()]),
    });
    assert_eq!(parser.parse("See Python_, or docs__."), [
      text("See "),
      MarkupNode::Hyperlink {
        text: "Python".into(),
        url:  "https://python.org".into(),
      },
      text(", or "),
      MarkupNode::Hyperlink {
        text: "docs".into(),
        url:  "https://a.example".into(),
      },
      text("."),
    ]);
    assert_eq!(parser.parse("snake_case and a_b_c stay"), [text(
      "snake_case and a_b_c stay"
    )]);
    assert_eq!(parser.parse("unknown_ name"), [text("unknown name")]);
  }

  #[test]
  fn test_anonymous_references_consume_targets_in_order() {
    let mut parser = InlineParser::new(Targets {
      named:     HashMap::new(),
      anonymous: VecDeque::from(["https://a.example".to_string()]),
    });
    assert_eq!(parser.parse("`first`__ and `<https://b.example>`__"), [
      MarkupNode::Hyperlink {
        text: "first".into(),
        url:  "https://a.example".into(),
      },
      text(" and "),
      MarkupNode::Hyperlink {
        text: "https://b.example".into(),
        url:  "https://b.example".into(),
      },
    ]);
  }

  #[test]
  fn test_roles_render_as_code() {
    assert_eq!(parse(":func:`pkg.run`"), [MarkupNode::InlineCode(
      "pkg.run".into()
    )]);
    assert_eq!(parse(":py:class:`~pkg.mod.Thing`"), [
      MarkupNode::InlineCode("Thing".into())
    ]);
    assert_eq!(parse(":ref:`Install <install-guide>`"), [
      MarkupNode::InlineCode("Install".into())
    ]);
  }

  #[test]
  fn test_role_display() {
    assert_eq!(role_display("!pkg.f"), "pkg.f");
    assert_eq!(role_display("~a.b.c"), "c");
    assert_eq!(role_display("<target>"), "<target>");
  }
}
