use thiserror::Error;

/// Structural failure while parsing markup.
///
/// Conversion never surfaces these to the reader of the output: the
/// converter logs them and hands back the input unchanged. They are public so
/// callers using [`crate::try_convert`] can tell what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
  #[error("line {line}: section title `{title}` is not allowed in docstrings")]
  SectionTitle { title: String, line: usize },

  #[error("line {line}: transitions are not allowed in docstrings")]
  Transition { line: usize },

  #[error("line {line}: unknown directive type `{name}`")]
  UnknownDirective { name: String, line: usize },

  #[error("line {line}: the `admonition` directive requires a title")]
  MissingTitle { line: usize },

  #[error("line {line}: malformed directive option `{option}`")]
  MalformedOption { option: String, line: usize },

  #[error("line {line}: markup nested deeper than {max_depth} levels")]
  TooDeep { max_depth: usize, line: usize },
}

impl MarkupError {
  /// One-based line of the input the failure was detected on.
  #[must_use]
  pub const fn line(&self) -> usize {
    match self {
      Self::SectionTitle { line, .. }
      | Self::Transition { line }
      | Self::UnknownDirective { line, .. }
      | Self::MissingTitle { line }
      | Self::MalformedOption { line, .. }
      | Self::TooDeep { line, .. } => *line,
    }
  }
}
