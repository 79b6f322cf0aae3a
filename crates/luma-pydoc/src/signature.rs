//! Callable signatures as they appear at the top of a reference entry.
use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{
  annotation::format_annotation,
  types::{ParameterDecl, ParameterKind, TypeExpr},
};

/// Layout knobs for [`format_signature`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureOptions {
  /// One-line signatures this long or longer are wrapped, one parameter per
  /// line.
  pub max_width: usize,

  /// Spaces before each parameter of a wrapped signature.
  pub indent: usize,
}

impl Default for SignatureOptions {
  fn default() -> Self {
    Self {
      max_width: 88,
      indent:    4,
    }
  }
}

/// Render a signature such as `f(x: int, y: int = 0) -> int`.
///
/// When the one-line form reaches [`SignatureOptions::max_width`] it is
/// re-rendered with every parameter on its own line, each followed by a
/// trailing comma, and the return annotation attached to the closing paren.
///
/// # Example
///
/// ```
/// use luma_pydoc::{
///   ParameterDecl,
///   SignatureOptions,
///   TypeExpr,
///   format_signature,
/// };
///
/// let params = [ParameterDecl::new("x").with_annotation(TypeExpr::name("int"))];
/// let signature = format_signature(
///   "f",
///   &params,
///   Some(&TypeExpr::None),
///   &SignatureOptions::default(),
/// );
/// assert_eq!(signature, "f(x: int) -> None");
/// ```
#[must_use]
pub fn format_signature(
  name: &str,
  parameters: &[ParameterDecl],
  returns: Option<&TypeExpr>,
  options: &SignatureOptions,
) -> String {
  let rendered = render_parameters(parameters);
  let return_suffix = returns
    .map(|ret| format!(" -> {}", format_annotation(ret)))
    .unwrap_or_default();

  let line = format!("{name}({}){return_suffix}", rendered.join(", "));
  if rendered.is_empty() || line.chars().count() < options.max_width {
    return line;
  }

  let indent = " ".repeat(options.indent);
  let mut wrapped = format!("{name}(\n");
  for param in &rendered {
    let _ = writeln!(wrapped, "{indent}{param},");
  }
  let _ = write!(wrapped, "){return_suffix}");
  wrapped
}

/// Render every parameter, inserting the `/` and `*` markers Python prints
/// around positional-only and keyword-only parameters.
fn render_parameters(parameters: &[ParameterDecl]) -> Vec<String> {
  let mut rendered = Vec::with_capacity(parameters.len());
  let mut keyword_only_marked = false;

  for (idx, param) in parameters.iter().enumerate() {
    match param.kind {
      ParameterKind::VarPositional => keyword_only_marked = true,
      ParameterKind::KeywordOnly if !keyword_only_marked => {
        rendered.push("*".to_string());
        keyword_only_marked = true;
      },
      _ => {},
    }

    rendered.push(render_parameter(param));

    let ends_positional_only = param.kind == ParameterKind::PositionalOnly
      && parameters
        .get(idx + 1)
        .is_none_or(|next| next.kind != ParameterKind::PositionalOnly);
    if ends_positional_only {
      rendered.push("/".to_string());
    }
  }

  rendered
}

fn render_parameter(param: &ParameterDecl) -> String {
  let stars = match param.kind {
    ParameterKind::VarPositional => "*",
    ParameterKind::VarKeyword => "**",
    _ => "",
  };

  let mut out = format!("{stars}{}", param.name);
  if let Some(annotation) = &param.annotation {
    let _ = write!(out, ": {}", format_annotation(annotation));
  }
  if let Some(default) = &param.default {
    // Python only spaces the `=` when the parameter is annotated.
    if param.annotation.is_some() {
      let _ = write!(out, " = {default}");
    } else {
      let _ = write!(out, "={default}");
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn int() -> TypeExpr {
    TypeExpr::name("int")
  }

  fn sig(params: &[ParameterDecl], returns: Option<&TypeExpr>) -> String {
    format_signature("f", params, returns, &SignatureOptions::default())
  }

  #[test]
  fn test_short_signature_is_not_wrapped() {
    let params = [
      ParameterDecl::new("x").with_annotation(int()),
      ParameterDecl::new("y").with_annotation(int()),
    ];
    assert_eq!(sig(&params, Some(&int())), "f(x: int, y: int) -> int");
  }

  #[test]
  fn test_no_parameters() {
    assert_eq!(sig(&[], None), "f()");
  }

  #[test]
  fn test_defaults() {
    let params = [
      ParameterDecl::new("x").with_annotation(int()).with_default("0"),
      ParameterDecl::new("y").with_default("'a'"),
    ];
    assert_eq!(sig(&params, None), "f(x: int = 0, y='a')");
  }

  #[test]
  fn test_typing_list_is_normalized() {
    let params = [ParameterDecl::new("x")
      .with_annotation(TypeExpr::generic("List", vec![int()]))];
    assert_eq!(sig(&params, None), "f(x: list[int])");
  }

  #[test]
  fn test_variadic_and_marker_parameters() {
    let params = [
      ParameterDecl::new("a").with_kind(ParameterKind::PositionalOnly),
      ParameterDecl::new("b"),
      ParameterDecl::new("c").with_kind(ParameterKind::KeywordOnly),
      ParameterDecl::new("kwargs").with_kind(ParameterKind::VarKeyword),
    ];
    assert_eq!(sig(&params, None), "f(a, /, b, *, c, **kwargs)");

    let params = [
      ParameterDecl::new("args").with_kind(ParameterKind::VarPositional),
      ParameterDecl::new("key").with_kind(ParameterKind::KeywordOnly),
    ];
    assert_eq!(sig(&params, None), "f(*args, key)");
  }

  #[test]
  fn test_long_signature_wraps_at_commas() {
    let params = [
      ParameterDecl::new("very_long_parameter_name").with_annotation(int()),
      ParameterDecl::new("another_long_parameter_name")
        .with_annotation(TypeExpr::name("str")),
      ParameterDecl::new("yet_another_parameter")
        .with_annotation(TypeExpr::name("float")),
    ];
    let expected = "f(\n    very_long_parameter_name: int,\n    \
                    another_long_parameter_name: str,\n    \
                    yet_another_parameter: float,\n) -> int";
    assert_eq!(sig(&params, Some(&int())), expected);
  }

  #[test]
  fn test_wrapping_threshold_is_inclusive() {
    let params = [ParameterDecl::new("x")];
    // "f(x)" is four characters long.
    let at = SignatureOptions {
      max_width: 4,
      indent:    2,
    };
    assert_eq!(format_signature("f", &params, None, &at), "f(\n  x,\n)");

    let above = SignatureOptions {
      max_width: 5,
      indent:    2,
    };
    assert_eq!(format_signature("f", &params, None, &above), "f(x)");
  }
}
