//! Assembly of reference entries from declaration records.
//!
//! Each declaration goes through the same two passes: its parameters and
//! return annotation become the signature, its docstring becomes the prose
//! sections. The results are stitched into a [`CallableDoc`] or [`TypeDoc`].
use log::debug;

use crate::{
  docstring::{ParsedDocstring, parse_docstring, sort_by_declaration},
  model::{CallableDoc, DocObject, ParameterDoc, TypeDoc},
  signature::{SignatureOptions, format_signature},
  types::{ClassDecl, Declaration, FunctionDecl, ParameterDecl},
};

/// Document a free function under the display name `name`.
///
/// # Example
///
/// ```
/// use luma_pydoc::{
///   FunctionDecl,
///   ParameterDecl,
///   SignatureOptions,
///   TypeExpr,
///   parse_function,
/// };
///
/// let decl = FunctionDecl {
///   name:       "add".into(),
///   parameters: vec![
///     ParameterDecl::new("x").with_annotation(TypeExpr::name("int")),
///   ],
///   returns:    Some(TypeExpr::name("int")),
///   docstring:  Some("Add one.".into()),
/// };
/// let doc = parse_function(&decl, "ops.add", &SignatureOptions::default());
/// assert_eq!(doc.signature, "ops.add(x: int) -> int");
/// assert_eq!(doc.summary.as_deref(), Some("Add one."));
/// ```
#[must_use]
pub fn parse_function(
  decl: &FunctionDecl,
  name: &str,
  options: &SignatureOptions,
) -> CallableDoc {
  document_callable(decl, name, &decl.parameters, options)
}

/// Document a class under the display name `name`.
///
/// The class docstring supplies the prose and examples; the constructor
/// supplies the signature and the parameter list. Constructor parameters the
/// constructor's own docstring leaves undescribed fall back to the class
/// docstring's `Args:` section. Methods whose names start with `_` are
/// private and skipped.
#[must_use]
pub fn parse_class(
  decl: &ClassDecl,
  name: &str,
  options: &SignatureOptions,
) -> TypeDoc {
  let declared = decl
    .constructor
    .as_ref()
    .map(|ctor| without_receiver(&ctor.parameters))
    .unwrap_or_default();

  let class_doc = parse_optional(decl.docstring.as_deref(), declared);
  let ctor_doc = decl
    .constructor
    .as_ref()
    .map(|ctor| parse_optional(ctor.docstring.as_deref(), declared));

  let parameters = match ctor_doc {
    Some(ctor_doc) => {
      merge_descriptions(ctor_doc.parameters, class_doc.parameters, declared)
    },
    None => class_doc.parameters,
  };

  let methods = decl
    .methods
    .iter()
    .filter(|method| {
      let public = !method.name.starts_with('_');
      if !public {
        debug!("luma-pydoc: skipping private method `{}`", method.name);
      }
      public
    })
    .map(|method| {
      document_callable(
        method,
        &method.name,
        without_receiver(&method.parameters),
        options,
      )
    })
    .collect();

  TypeDoc {
    name: name.to_string(),
    signature: format_signature(name, declared, None, options),
    summary: class_doc.summary,
    description: class_doc.description,
    parameters,
    examples: class_doc.examples,
    methods,
  }
}

/// Document any declaration under the display name `name`.
#[must_use]
pub fn parse_object(
  decl: &Declaration,
  name: &str,
  options: &SignatureOptions,
) -> DocObject {
  match decl {
    Declaration::Function(function) => {
      DocObject::Callable(parse_function(function, name, options))
    },
    Declaration::Class(class) => {
      DocObject::Type(parse_class(class, name, options))
    },
  }
}

fn document_callable(
  decl: &FunctionDecl,
  name: &str,
  parameters: &[ParameterDecl],
  options: &SignatureOptions,
) -> CallableDoc {
  let parsed = parse_optional(decl.docstring.as_deref(), parameters);

  CallableDoc {
    name:        name.to_string(),
    signature:   format_signature(
      name,
      parameters,
      decl.returns.as_ref(),
      options,
    ),
    summary:     parsed.summary,
    description: parsed.description,
    parameters:  parsed.parameters,
    returns:     parsed.returns,
    examples:    parsed.examples,
  }
}

/// A missing docstring documents nothing.
fn parse_optional(
  docstring: Option<&str>,
  declared: &[ParameterDecl],
) -> ParsedDocstring {
  parse_docstring(docstring.unwrap_or_default(), declared)
}

/// Drop the bound `self`/`cls` of a method or constructor.
fn without_receiver(parameters: &[ParameterDecl]) -> &[ParameterDecl] {
  match parameters.split_first() {
    Some((first, rest)) if first.is_receiver() => rest,
    _ => parameters,
  }
}

/// Fill undescribed parameters from `fallback` and add the names only
/// `fallback` documents, keeping declaration order.
fn merge_descriptions(
  mut primary: Vec<ParameterDoc>,
  fallback: Vec<ParameterDoc>,
  declared: &[ParameterDecl],
) -> Vec<ParameterDoc> {
  for extra in fallback {
    match primary.iter_mut().find(|param| param.name == extra.name) {
      Some(param) if param.description.is_none() => {
        param.description = extra.description;
      },
      Some(_) => {},
      None => primary.push(extra),
    }
  }
  sort_by_declaration(&mut primary, declared);
  primary
}
