//! Reference entries and their Markdown rendering.
use std::fmt::Write;

use luma_utils::code_fence;
use serde::{Deserialize, Serialize};

/// One documented parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDoc {
  pub name:        String,
  /// Formatted annotation taken from the declaration, never from prose.
  #[serde(rename = "type")]
  pub type_name:   Option<String>,
  pub description: Option<String>,
}

/// A doctest-style example and the prose that introduces it.
///
/// Only the code is rendered; the description is kept for consumers such as
/// search indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
  pub description: Option<String>,
  pub code:        String,
}

/// Reference entry for a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallableDoc {
  /// Display name; chosen by the caller and may differ from the declared
  /// name.
  pub name:        String,
  pub signature:   String,
  pub summary:     Option<String>,
  pub description: Option<String>,
  pub parameters:  Vec<ParameterDoc>,
  pub returns:     Option<String>,
  pub examples:    Vec<Example>,
}

/// Reference entry for a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDoc {
  pub name:        String,
  /// Constructor signature under the class's display name.
  pub signature:   String,
  pub summary:     Option<String>,
  pub description: Option<String>,
  /// Constructor parameters.
  pub parameters:  Vec<ParameterDoc>,
  pub examples:    Vec<Example>,
  /// Public methods, in declaration order.
  pub methods:     Vec<CallableDoc>,
}

/// A rendered-to-be reference entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DocObject {
  Callable(CallableDoc),
  Type(TypeDoc),
}

/// Options for Markdown rendering of reference entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
  /// Level of the heading carrying the entry's name (1-6).
  pub heading_level: u8,

  /// Language tag of the signature and example code fences.
  pub language: String,
}

impl Default for RenderOptions {
  fn default() -> Self {
    Self {
      heading_level: 2,
      language:      "python".to_string(),
    }
  }
}

impl DocObject {
  /// The entry's display name.
  #[must_use]
  pub fn name(&self) -> &str {
    match self {
      Self::Callable(callable) => &callable.name,
      Self::Type(ty) => &ty.name,
    }
  }

  /// Render the entry as a Markdown block.
  ///
  /// Only the entry itself is rendered. The methods of a [`TypeDoc`] are left
  /// to the caller, who decides how they nest under the class.
  #[must_use]
  pub fn to_markdown(&self, options: &RenderOptions) -> String {
    match self {
      Self::Callable(callable) => callable.to_markdown(options),
      Self::Type(ty) => ty.to_markdown(options),
    }
  }
}

impl CallableDoc {
  #[must_use]
  pub fn to_markdown(&self, options: &RenderOptions) -> String {
    EntryBlocks {
      name:        &self.name,
      signature:   &self.signature,
      summary:     self.summary.as_deref(),
      description: self.description.as_deref(),
      parameters:  &self.parameters,
      returns:     self.returns.as_deref(),
      examples:    &self.examples,
    }
    .render(options)
  }
}

impl TypeDoc {
  #[must_use]
  pub fn to_markdown(&self, options: &RenderOptions) -> String {
    EntryBlocks {
      name:        &self.name,
      signature:   &self.signature,
      summary:     self.summary.as_deref(),
      description: self.description.as_deref(),
      parameters:  &self.parameters,
      returns:     None,
      examples:    &self.examples,
    }
    .render(options)
  }
}

/// The fields both entry kinds render, borrowed.
struct EntryBlocks<'a> {
  name:        &'a str,
  signature:   &'a str,
  summary:     Option<&'a str>,
  description: Option<&'a str>,
  parameters:  &'a [ParameterDoc],
  returns:     Option<&'a str>,
  examples:    &'a [Example],
}

impl EntryBlocks<'_> {
  /// Build the block list and join it with single blank lines.
  fn render(&self, options: &RenderOptions) -> String {
    let level = usize::from(options.heading_level.clamp(1, 6));
    let language = options.language.as_str();
    let mut blocks = vec![
      format!("{} {}", "#".repeat(level), self.name),
      code_fence(self.signature, language),
    ];

    blocks.extend(self.summary.map(str::to_string));
    blocks.extend(self.description.map(str::to_string));

    if self.parameters.iter().any(|p| p.description.is_some()) {
      blocks.push("**Arguments**".to_string());
      let mut list = String::new();
      for param in self.parameters {
        if !list.is_empty() {
          list.push('\n');
        }
        let _ = write!(list, "- **{}**", param.name);
        if let Some(description) = &param.description {
          let _ = write!(list, ": {description}");
        }
      }
      blocks.push(list);
    }

    if let Some(returns) = self.returns {
      blocks.push("**Returns**".to_string());
      blocks.push(returns.to_string());
    }

    if !self.examples.is_empty() {
      blocks.push("**Examples**".to_string());
      for example in self.examples {
        blocks.push(code_fence(&example.code, language));
      }
    }

    blocks.join("\n\n")
  }
}
