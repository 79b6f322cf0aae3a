//! Markdown code spans and fences that survive backticks in their content.

/// Length of the longest run of backticks in `text`.
#[must_use]
pub fn longest_backtick_run(text: &str) -> usize {
  text.split(|c| c != '`').map(str::len).max().unwrap_or(0)
}

/// Fence `code`, using a fence longer than any backtick run inside it.
#[must_use]
pub fn code_fence(code: &str, language: &str) -> String {
  let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
  format!("{fence}{language}\n{code}\n{fence}")
}

/// Wrap `text` in enough backticks that none inside close it early.
#[must_use]
pub fn inline_code(text: &str) -> String {
  let ticks = "`".repeat(longest_backtick_run(text) + 1);
  if text.starts_with('`') || text.ends_with('`') {
    format!("{ticks} {text} {ticks}")
  } else {
    format!("{ticks}{text}{ticks}")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_code_fence_outgrows_backticks() {
    assert_eq!(code_fence("x", ""), "```\nx\n```");
    assert_eq!(code_fence("a ```` b", "md"), "`````md\na ```` b\n`````");
  }

  #[test]
  fn test_inline_code_outgrows_backticks() {
    assert_eq!(inline_code("x"), "`x`");
    assert_eq!(inline_code("a`b"), "``a`b``");
    assert_eq!(inline_code("`x`"), "`` `x` ``");
  }

  #[test]
  fn test_longest_backtick_run() {
    assert_eq!(longest_backtick_run("plain"), 0);
    assert_eq!(longest_backtick_run("a ` b `` c"), 2);
  }
}
