/// Width of a tab stop, as in Python's `str.expandtabs`.
const TAB_WIDTH: usize = 8;

/// Replace tabs with spaces up to the next tab stop.
#[must_use]
pub fn expand_tabs(line: &str) -> String {
  if !line.contains('\t') {
    return line.to_string();
  }

  let mut out = String::with_capacity(line.len());
  let mut column = 0;
  for c in line.chars() {
    if c == '\t' {
      let pad = TAB_WIDTH - column % TAB_WIDTH;
      out.extend(std::iter::repeat_n(' ', pad));
      column += pad;
    } else {
      out.push(c);
      column += 1;
    }
  }
  out
}
