//! Google-style docstring parsing.
//!
//! A docstring is read line by line through a small state machine:
//!
//! ```text
//!   Summary ──blank──▶ Description
//!      │                   │
//!      └──── `Args:` / `Returns:` / `Examples:` header ────▶ section state
//! ```
//!
//! Header lines switch the state from anywhere; unindented text after a
//! section body drops back into the description. Nothing here fails: a
//! section that does not have the expected shape simply contributes nothing.
use std::sync::LazyLock;

use log::{debug, error};
use luma_utils::expand_tabs;
use regex::Regex;

use crate::{
  annotation::format_annotation,
  model::{Example, ParameterDoc},
  types::ParameterDecl,
};

/// Doctest prompt that starts an example's code.
const DOCTEST_PROMPT: &str = ">>>";

/// `name: text`, `*args: text` or `name (type): text`.
static ARG_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\*{0,2}([A-Za-z_][A-Za-z0-9_]*)\s*(?:\([^)]*\))?\s*:(.*)$")
    .unwrap_or_else(|e| {
      error!("Failed to compile ARG_ENTRY regex: {e}");
      never_matching_regex()
    })
});

/// Create a regex that never matches anything.
#[allow(
  clippy::expect_used,
  reason = "The pattern is a constant known to compile"
)]
fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("Failed to compile never-matching regex")
}

/// Sections of a docstring, as parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDocstring {
  /// First paragraph, line breaks collapsed to spaces.
  pub summary:     Option<String>,
  /// Remaining leading paragraphs, separated by blank lines.
  pub description: Option<String>,
  /// Parameters the `Args:` section documents: declared ones in declaration
  /// order, then names that match no declaration.
  pub parameters:  Vec<ParameterDoc>,
  pub returns:     Option<String>,
  pub examples:    Vec<Example>,
}

/// Where the parser currently is in the docstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionState {
  Summary,
  Description,
  InArgs,
  InReturns,
  InExamples,
}

impl SectionState {
  fn from_header(line: &str) -> Option<Self> {
    match line.trim_end() {
      "Args:" => Some(Self::InArgs),
      "Returns:" => Some(Self::InReturns),
      "Examples:" => Some(Self::InExamples),
      _ => None,
    }
  }

  const fn is_section(self) -> bool {
    matches!(self, Self::InArgs | Self::InReturns | Self::InExamples)
  }
}

/// Line buckets filled while walking the docstring.
#[derive(Default)]
struct Sections<'a> {
  summary:    Vec<&'a str>,
  paragraphs: Vec<Vec<&'a str>>,
  current:    Vec<&'a str>,
  args:       Vec<&'a str>,
  returns:    Vec<&'a str>,
  examples:   Vec<&'a str>,
}

impl<'a> Sections<'a> {
  fn flush_paragraph(&mut self) {
    if !self.current.is_empty() {
      self.paragraphs.push(std::mem::take(&mut self.current));
    }
  }

  fn section_lines(
    &mut self,
    state: SectionState,
  ) -> Option<&mut Vec<&'a str>> {
    match state {
      SectionState::InArgs => Some(&mut self.args),
      SectionState::InReturns => Some(&mut self.returns),
      SectionState::InExamples => Some(&mut self.examples),
      SectionState::Summary | SectionState::Description => None,
    }
  }
}

/// Parse a raw docstring.
///
/// `declared` are the callable's introspected parameters; they decide the
/// order of [`ParsedDocstring::parameters`] and supply each documented
/// parameter's type. Parameters the docstring does not mention are left out.
/// Types written in the docstring prose are never used.
#[must_use]
pub fn parse_docstring(
  text: &str,
  declared: &[ParameterDecl],
) -> ParsedDocstring {
  let cleaned = clean_docstring(text);
  let mut sections = Sections::default();
  let mut state = SectionState::Summary;

  for line in cleaned.lines() {
    if let Some(next) = SectionState::from_header(line) {
      if state == SectionState::Summary && sections.summary.is_empty() {
        debug!("luma-pydoc: docstring has no summary before `{line}`");
      }
      sections.flush_paragraph();
      state = next;
      continue;
    }

    let blank = line.trim().is_empty();
    let indented = line.starts_with([' ', '\t']);

    if state.is_section() {
      if blank || indented {
        if let Some(lines) = sections.section_lines(state) {
          lines.push(line);
        }
        continue;
      }
      // Unindented text ends the section body.
      state = SectionState::Description;
    }

    match state {
      SectionState::Summary if blank => {
        if !sections.summary.is_empty() {
          state = SectionState::Description;
        }
      },
      SectionState::Summary => sections.summary.push(line.trim()),
      _ if blank => sections.flush_paragraph(),
      _ => sections.current.push(line.trim_end()),
    }
  }
  sections.flush_paragraph();

  let summary =
    (!sections.summary.is_empty()).then(|| sections.summary.join(" "));
  let description = (!sections.paragraphs.is_empty()).then(|| {
    sections
      .paragraphs
      .iter()
      .map(|paragraph| paragraph.join("\n"))
      .collect::<Vec<_>>()
      .join("\n\n")
  });

  ParsedDocstring {
    summary,
    description,
    parameters: merge_parameters(declared, parse_args(&sections.args)),
    returns: parse_returns(&sections.returns),
    examples: parse_examples(&sections.examples),
  }
}

/// Normalize docstring indentation the way Python's `inspect.cleandoc` does.
///
/// The first line loses its leading whitespace, the common indentation of
/// the remaining lines is removed, tabs are expanded and leading/trailing
/// blank lines are dropped.
#[must_use]
pub fn clean_docstring(text: &str) -> String {
  let lines: Vec<String> = text.lines().map(expand_tabs).collect();

  let margin = lines
    .iter()
    .skip(1)
    .filter(|line| !line.trim().is_empty())
    .map(|line| indentation(line))
    .min()
    .unwrap_or(0);

  let cleaned: Vec<&str> = lines
    .iter()
    .enumerate()
    .map(|(idx, line)| {
      if line.trim().is_empty() {
        ""
      } else if idx == 0 {
        line.trim_start()
      } else {
        &line[margin..]
      }
    })
    .collect();

  let start = cleaned.iter().position(|line| !line.is_empty());
  let end = cleaned.iter().rposition(|line| !line.is_empty());
  match (start, end) {
    (Some(start), Some(end)) => cleaned[start..=end].join("\n"),
    _ => String::new(),
  }
}

fn indentation(line: &str) -> usize {
  line.len() - line.trim_start_matches(' ').len()
}

/// Remove the common indentation of a section body and trim blank edges.
fn dedent<'a>(lines: &[&'a str]) -> Vec<&'a str> {
  let margin = lines
    .iter()
    .filter(|line| !line.trim().is_empty())
    .map(|line| indentation(line))
    .min()
    .unwrap_or(0);

  let body: Vec<&str> = lines
    .iter()
    .map(|&line| {
      if line.trim().is_empty() {
        ""
      } else {
        &line[margin..]
      }
    })
    .collect();

  let start = body.iter().position(|line| !line.is_empty()).unwrap_or(0);
  let end = body.iter().rposition(|line| !line.is_empty()).map_or(0, |e| e + 1);
  body.get(start..end).map(<[&str]>::to_vec).unwrap_or_default()
}

/// Collect `(name, description)` pairs from an `Args:` body.
fn parse_args(lines: &[&str]) -> Vec<(String, Option<String>)> {
  let mut entries: Vec<(String, Vec<String>)> = Vec::new();

  for line in dedent(lines) {
    if line.is_empty() {
      continue;
    }

    if !line.starts_with(' ') {
      if let Some(caps) = ARG_ENTRY.captures(line) {
        let text = caps[2].trim();
        let first = if text.is_empty() {
          Vec::new()
        } else {
          vec![text.to_string()]
        };
        entries.push((caps[1].to_string(), first));
        continue;
      }
    }

    match entries.last_mut() {
      Some((_, description)) if line.starts_with(' ') => {
        description.push(line.trim().to_string());
      },
      _ => debug!("luma-pydoc: ignoring malformed `Args:` line `{line}`"),
    }
  }

  entries
    .into_iter()
    .map(|(name, description)| {
      let description =
        (!description.is_empty()).then(|| description.join(" "));
      (name, description)
    })
    .collect()
}

/// Turn documented `Args:` entries into parameter docs typed from their
/// declarations.
fn merge_parameters(
  declared: &[ParameterDecl],
  documented: Vec<(String, Option<String>)>,
) -> Vec<ParameterDoc> {
  let mut parameters: Vec<ParameterDoc> = Vec::with_capacity(documented.len());

  for (name, description) in documented {
    if parameters.iter().any(|param| param.name == name) {
      debug!("luma-pydoc: `{name}` is documented twice, keeping the first");
      continue;
    }

    let decl = declared.iter().find(|param| param.name == name);
    if decl.is_none() {
      debug!("luma-pydoc: `{name}` is documented but not declared");
    }
    parameters.push(ParameterDoc {
      type_name: decl
        .and_then(|param| param.annotation.as_ref())
        .map(format_annotation),
      name,
      description,
    });
  }

  sort_by_declaration(&mut parameters, declared);
  parameters
}

/// Order parameters as declared; names that match no declaration keep their
/// relative order at the end.
pub(crate) fn sort_by_declaration(
  parameters: &mut [ParameterDoc],
  declared: &[ParameterDecl],
) {
  parameters.sort_by_key(|param| {
    declared
      .iter()
      .position(|decl| decl.name == param.name)
      .unwrap_or(declared.len())
  });
}

fn parse_returns(lines: &[&str]) -> Option<String> {
  let returns = dedent(lines).join("\n");
  let returns = returns.trim();
  (!returns.is_empty()).then(|| returns.to_string())
}

/// Split an `Examples:` body into examples.
///
/// Every blank-line separated group holding a `>>>` prompt is one example;
/// prose above the prompt, or a prose-only group right before it, becomes
/// that example's description.
fn parse_examples(lines: &[&str]) -> Vec<Example> {
  let body = dedent(lines);
  let mut examples = Vec::new();
  let mut pending: Option<String> = None;

  for group in body.split(|line| line.trim().is_empty()) {
    if group.is_empty() {
      continue;
    }

    let Some(prompt) = group
      .iter()
      .position(|line| line.trim_start().starts_with(DOCTEST_PROMPT))
    else {
      let prose = group.join("\n");
      pending = Some(match pending.take() {
        Some(previous) => format!("{previous}\n\n{prose}"),
        None => prose,
      });
      continue;
    };

    let inline_prose = (prompt > 0).then(|| group[..prompt].join("\n"));
    let description = match (pending.take(), inline_prose) {
      (Some(previous), Some(prose)) => Some(format!("{previous}\n\n{prose}")),
      (previous, prose) => previous.or(prose),
    };

    examples.push(Example {
      description,
      code: group[prompt..].join("\n"),
    });
  }

  if let Some(prose) = pending {
    debug!("luma-pydoc: dropping example prose without code: `{prose}`");
  }

  examples
}
