#![allow(
  clippy::expect_used,
  clippy::unwrap_used,
  clippy::panic,
  reason = "Fine in tests"
)]
use luma_rst::{
  ConvertOptions,
  MarkupError,
  convert_rst_to_markdown,
  convert_with_options,
  try_convert,
};

fn convert(rst: &str) -> String {
  convert_rst_to_markdown(rst).expect("non-blank input converts")
}

#[test]
fn test_empty_and_blank_input() {
  assert_eq!(convert_rst_to_markdown(""), Some(String::new()));
  assert_eq!(convert_rst_to_markdown("   "), None);
  assert_eq!(convert_rst_to_markdown("   \n  \n  "), None);
}

#[test]
fn test_plain_text() {
  assert_eq!(convert("This is plain text."), "This is plain text.");
  assert_eq!(
    convert("First paragraph.\n\nSecond paragraph."),
    "First paragraph.\n\nSecond paragraph."
  );
  assert_eq!(
    convert("Use & and < and > symbols."),
    "Use & and < and > symbols."
  );
}

#[test]
fn test_plain_text_round_trips() {
  let text = "Plain words here.\nA second line.\n\nAnother paragraph.";
  assert_eq!(convert(&convert(text)), text);
}

#[test]
fn test_inline_formatting() {
  assert_eq!(
    convert("Use **bold** for emphasis"),
    "Use **bold** for emphasis"
  );
  assert_eq!(convert("Use *italic* for terms"), "Use *italic* for terms");
  assert_eq!(
    convert("Use ``print()`` to output."),
    "Use `print()` to output."
  );
  assert_eq!(convert("See `foo` for details."), "See `foo` for details.");
  assert_eq!(
    convert(
      "Use **bold** for emphasis, ``code`` for values, and *italic* for terms."
    ),
    "Use **bold** for emphasis, `code` for values, and *italic* for terms."
  );
}

#[test]
fn test_roles_become_inline_code() {
  assert_eq!(
    convert("Calls :func:`~pkg.io.read` and :class:`pkg.Store`."),
    "Calls `read` and `pkg.Store`."
  );
}

#[test]
fn test_literal_blocks() {
  let rst = "Example::\n\n    def hello():\n        print(\"world\")";
  assert_eq!(
    convert(rst),
    "Example:\n\n```\ndef hello():\n    print(\"world\")\n```"
  );

  assert_eq!(convert("Example ::\n\n    x = 1"), "Example\n\n```\nx = 1\n```");
  assert_eq!(convert("::\n\n    x = 1"), "```\nx = 1\n```");
}

#[test]
fn test_code_block_directive_keeps_language() {
  let rst = ".. code-block:: python\n\n   x = 1\n   if x:\n       pass";
  assert_eq!(convert(rst), "```python\nx = 1\nif x:\n    pass\n```");
}

#[test]
fn test_doctest_block() {
  assert_eq!(
    convert(">>> print(\"hello\")\nhello"),
    "```python\n>>> print(\"hello\")\nhello\n```"
  );

  let options = ConvertOptions {
    doctest_language: "pycon".into(),
    ..ConvertOptions::default()
  };
  assert_eq!(
    convert_with_options(">>> 1\n1", &options).as_deref(),
    Some("```pycon\n>>> 1\n1\n```")
  );
}

#[test]
fn test_lists() {
  assert_eq!(
    convert("- First item\n- Second item\n- Third item"),
    "- First item\n- Second item\n- Third item"
  );
  assert_eq!(
    convert("1. First\n2. Second\n3. Third"),
    "1. First\n1. Second\n1. Third"
  );
  assert_eq!(convert("(a) one\n(b) two"), "1. one\n1. two");
  assert_eq!(
    convert("- Item 1\n\n  - Nested item\n\n- Item 2"),
    "- Item 1\n\n  - Nested item\n- Item 2"
  );
}

#[test]
fn test_list_item_continuation_lines() {
  assert_eq!(
    convert("- A long item\n  that wraps.\n- Short."),
    "- A long item\n  that wraps.\n- Short."
  );
}

#[test]
fn test_literal_block_inside_list_items() {
  assert_eq!(
    convert("- Example::\n\n      code here\n\n- next"),
    "- Example:\n\n  ```\n  code here\n  ```\n- next"
  );
  assert_eq!(
    convert("1. Run::\n\n       make all"),
    "1. Run:\n\n   ```\n   make all\n   ```"
  );
}

#[test]
fn test_block_quote_inside_list_item() {
  assert_eq!(convert("- Item\n\n    quoted"), "- Item\n\n  > quoted");
}

#[test]
fn test_admonitions() {
  assert_eq!(
    convert(".. warning::\n\n   Be careful!"),
    "{% warning %}\n\nBe careful!\n\n{% /warning %}"
  );
  assert_eq!(
    convert(".. note::\n\n   This is important."),
    "{% note %}\n\nThis is important.\n\n{% /note %}"
  );
  assert_eq!(
    convert(".. tip::\n\n   Pro tip here."),
    "{% tip %}\n\nPro tip here.\n\n{% /tip %}"
  );
  assert_eq!(
    convert(".. warning::\n\n   First paragraph.\n\n   Second paragraph."),
    "{% warning %}\n\nFirst paragraph.\n\nSecond paragraph.\n\n{% /warning %}"
  );
  assert_eq!(
    convert(".. note::\n\n   This has **bold** and ``code``."),
    "{% note %}\n\nThis has **bold** and `code`.\n\n{% /note %}"
  );
}

#[test]
fn test_admonition_argument_and_title() {
  assert_eq!(
    convert(".. seealso:: Other docs."),
    "{% seealso %}\n\nOther docs.\n\n{% /seealso %}"
  );
  assert_eq!(
    convert(".. admonition:: Heads up\n\n   Body."),
    "{% admonition title=\"Heads up\" %}\n\nBody.\n\n{% /admonition %}"
  );
}

#[test]
fn test_nested_admonition_in_list() {
  assert_eq!(
    convert("- Item\n\n  .. note::\n\n     Inside."),
    "- Item\n\n  {% note %}\n\n  Inside.\n\n  {% /note %}"
  );
}

#[test]
fn test_block_quote() {
  assert_eq!(convert("Intro.\n\n   Quoted text."), "Intro.\n\n> Quoted text.");
}

#[test]
fn test_links() {
  assert_eq!(
    convert("`Python <https://python.org>`_"),
    "[Python](https://python.org)"
  );
  assert_eq!(
    convert("See `the docs`_.\n\n.. _the docs: https://docs.example"),
    "See [the docs](https://docs.example)."
  );
  assert_eq!(
    convert("Plain https://example.com stays."),
    "Plain https://example.com stays."
  );
}

#[test]
fn test_simple_reference_names() {
  assert_eq!(
    convert("See Python_ for more.\n\n.. _Python: https://python.org"),
    "See [Python](https://python.org) for more."
  );
  assert_eq!(
    convert("Read this__.\n\n.. __: https://a.example"),
    "Read [this](https://a.example)."
  );
  assert_eq!(convert("Keep snake_case words."), "Keep snake_case words.");
}

#[test]
fn test_comments_are_dropped() {
  assert_eq!(
    convert("Before.\n\n.. this is a comment\n   over two lines\n\nAfter."),
    "Before.\n\nAfter."
  );
}

#[test]
fn test_function_docstring() {
  let rst = "Execute a command.

This function runs the given command and returns the output.

.. warning::

   Commands are executed without sanitization!

Example usage::

    result = execute(\"ls -la\")";
  let expected = "Execute a command.

This function runs the given command and returns the output.

{% warning %}

Commands are executed without sanitization!

{% /warning %}

Example usage:

```
result = execute(\"ls -la\")
```";
  assert_eq!(convert(rst), expected);
}

#[test]
fn test_failures_return_the_original() {
  for rst in [
    "Title\n=====\n\nBody.",
    "Above.\n\n------\n\nBelow.",
    ".. image:: logo.png",
    ".. admonition::\n\n   No title.",
  ] {
    assert_eq!(convert(rst), rst);
  }
}

#[test]
fn test_try_convert_reports_the_failure() {
  let err = try_convert(".. figure:: a.png", &ConvertOptions::default())
    .expect_err("figures are not supported");
  assert_eq!(err, MarkupError::UnknownDirective {
    name: "figure".into(),
    line: 1,
  });
  assert_eq!(err.line(), 1);
  assert_eq!(err.to_string(), "line 1: unknown directive type `figure`");
}

#[test]
fn test_nesting_limit_falls_back() {
  let options = ConvertOptions {
    max_depth: 1,
    ..ConvertOptions::default()
  };
  let rst = "- a\n\n  - b";
  assert_eq!(convert_with_options(rst, &options).as_deref(), Some(rst));
  assert_eq!(
    convert_with_options(rst, &ConvertOptions::default()).as_deref(),
    Some("- a\n\n  - b")
  );
}

#[test]
fn test_options_deserialize_with_defaults() {
  let options: ConvertOptions =
    serde_json::from_str(r#"{ "max_depth": 4 }"#).unwrap();
  assert_eq!(options.max_depth, 4);
  assert_eq!(options.doctest_language, "python");
}
