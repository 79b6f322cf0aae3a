//! Declaration records handed to the extractor.
//!
//! These mirror what an introspection pass over a Python module yields: a
//! callable's parameters with their annotations and defaults, its return
//! annotation and its raw docstring. Collaborators usually produce them as
//! JSON; annotations may be given either as source text (`"list[int]"`) or as
//! an already structured [`TypeExpr`].
use serde::{Deserialize, Deserializer, Serialize};

/// A single type annotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypeExpr {
  /// The `None` singleton.
  None,

  /// A bare (possibly dotted) name such as `int` or `typing.List`.
  Name(String),

  /// A quoted annotation, deferred for later resolution.
  ForwardRef(String),

  /// A parametrized generic such as `list[int]` or `Dict[str, int]`.
  Generic { name: String, args: Vec<TypeExpr> },

  /// `Union[A, B]` or `A | B`, alternatives in source order.
  Union(Vec<TypeExpr>),

  /// `Optional[X]`, sugar for `X | None`.
  Optional(Box<TypeExpr>),

  /// Anything the formatter does not understand; printed verbatim.
  Other(String),
}

impl TypeExpr {
  /// Shorthand for [`TypeExpr::Name`].
  #[must_use]
  pub fn name(name: impl Into<String>) -> Self {
    Self::Name(name.into())
  }

  /// Shorthand for [`TypeExpr::Generic`].
  #[must_use]
  pub fn generic(name: impl Into<String>, args: Vec<Self>) -> Self {
    Self::Generic {
      name: name.into(),
      args,
    }
  }
}

/// How a parameter binds its argument.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
  PositionalOnly,
  #[default]
  PositionalOrKeyword,
  VarPositional,
  KeywordOnly,
  VarKeyword,
}

/// One declared parameter of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDecl {
  pub name: String,

  #[serde(default)]
  pub kind: ParameterKind,

  #[serde(default, deserialize_with = "deserialize_annotation")]
  pub annotation: Option<TypeExpr>,

  /// Literal source text of the default value, e.g. `0` or `'utf-8'`.
  #[serde(default)]
  pub default: Option<String>,
}

impl ParameterDecl {
  /// An unannotated positional-or-keyword parameter.
  #[must_use]
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name:       name.into(),
      kind:       ParameterKind::default(),
      annotation: None,
      default:    None,
    }
  }

  #[must_use]
  pub fn with_annotation(mut self, annotation: TypeExpr) -> Self {
    self.annotation = Some(annotation);
    self
  }

  #[must_use]
  pub fn with_default(mut self, default: impl Into<String>) -> Self {
    self.default = Some(default.into());
    self
  }

  #[must_use]
  pub const fn with_kind(mut self, kind: ParameterKind) -> Self {
    self.kind = kind;
    self
  }

  /// Whether this is the implicit receiver of a method (`self`/`cls`).
  pub(crate) fn is_receiver(&self) -> bool {
    matches!(
      self.kind,
      ParameterKind::PositionalOnly | ParameterKind::PositionalOrKeyword
    ) && matches!(self.name.as_str(), "self" | "cls")
  }
}

/// A function or method as seen by introspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
  pub name: String,

  #[serde(default)]
  pub parameters: Vec<ParameterDecl>,

  #[serde(default, deserialize_with = "deserialize_annotation")]
  pub returns: Option<TypeExpr>,

  #[serde(default)]
  pub docstring: Option<String>,
}

/// A class as seen by introspection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassDecl {
  pub name: String,

  #[serde(default)]
  pub docstring: Option<String>,

  /// The class's own `__init__`, if it declares one.
  #[serde(default)]
  pub constructor: Option<FunctionDecl>,

  #[serde(default)]
  pub methods: Vec<FunctionDecl>,
}

/// Anything the extractor can document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
  Function(FunctionDecl),
  Class(ClassDecl),
}

/// Annotations arrive either as source text or as a structured expression.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnnotationRepr {
  Source(String),
  Expr(TypeExpr),
}

fn deserialize_annotation<'de, D>(
  deserializer: D,
) -> Result<Option<TypeExpr>, D::Error>
where
  D: Deserializer<'de>,
{
  let repr = Option::<AnnotationRepr>::deserialize(deserializer)?;
  Ok(repr.map(|repr| {
    match repr {
      AnnotationRepr::Source(text) => TypeExpr::parse(&text),
      AnnotationRepr::Expr(expr) => expr,
    }
  }))
}
