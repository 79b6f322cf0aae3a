//! # luma-rst
//!
//! Converts reStructuredText, as found in docstrings, to Markdown that a
//! Markdoc renderer understands. Admonition directives become `{% kind %}`
//! tags; everything else maps onto plain CommonMark.
//!
//! ```rust
//! use luma_rst::convert_rst_to_markdown;
//!
//! let markdown = convert_rst_to_markdown(".. warning::\n\n   Be careful!");
//! assert_eq!(
//!   markdown.as_deref(),
//!   Some("{% warning %}\n\nBe careful!\n\n{% /warning %}")
//! );
//! ```
//!
//! Conversion is lossless on failure: input the parser rejects, such as a
//! section title or an unknown directive, is handed back unchanged and the
//! reason is logged through [`log`]. Use [`try_convert`] to see the error.

mod block;
mod error;
mod inline;
pub mod tree;
mod writer;

use std::panic::{AssertUnwindSafe, catch_unwind};

use log::{error, warn};
use serde::{Deserialize, Serialize};

pub use crate::{
  block::parse_markup,
  error::MarkupError,
  tree::{MarkupNode, MarkupTree, NodeId},
  writer::render_markdown,
};

/// Options for markup conversion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertOptions {
  /// Language tag of fenced `>>>` sessions.
  pub doctest_language: String,

  /// Deepest nesting of lists, quotes and directives accepted.
  pub max_depth: usize,
}

impl Default for ConvertOptions {
  fn default() -> Self {
    Self {
      doctest_language: "python".to_string(),
      max_depth:        32,
    }
  }
}

/// Convert markup to Markdown with default options.
///
/// Returns `Some("")` for empty input and `None` for input made only of
/// whitespace.
#[must_use]
pub fn convert_rst_to_markdown(text: &str) -> Option<String> {
  convert_with_options(text, &ConvertOptions::default())
}

/// Convert markup to Markdown.
///
/// Never fails: when the input cannot be converted the original text is
/// returned.
#[must_use]
pub fn convert_with_options(
  text: &str,
  options: &ConvertOptions,
) -> Option<String> {
  if text.is_empty() {
    return Some(String::new());
  }
  if text.trim().is_empty() {
    return None;
  }

  let result = catch_unwind(AssertUnwindSafe(|| try_convert(text, options)));

  match result {
    Ok(Ok(markdown)) => Some(markdown),
    Ok(Err(e)) => {
      warn!("luma-rst: {e}; keeping the original text");
      Some(text.to_string())
    },
    Err(e) => {
      if let Some(error_msg) = e.downcast_ref::<String>() {
        error!("Error converting markup: {error_msg}");
      } else if let Some(error_msg) = e.downcast_ref::<&str>() {
        error!("Error converting markup: {error_msg}");
      } else {
        error!("Unknown error occurred while converting markup");
      }
      Some(text.to_string())
    },
  }
}

/// Convert markup to Markdown, reporting why conversion failed.
///
/// # Errors
///
/// Returns the [`MarkupError`] from [`parse_markup`].
pub fn try_convert(
  text: &str,
  options: &ConvertOptions,
) -> Result<String, MarkupError> {
  let tree = parse_markup(text, options)?;
  Ok(render_markdown(&tree, options))
}
