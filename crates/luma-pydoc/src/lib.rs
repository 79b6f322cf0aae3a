//! `luma-pydoc`.
//!
//! Turns introspected Python declarations into API reference entries. A
//! declaration record carries what introspection sees (parameters with their
//! annotations and defaults, the return annotation, the raw docstring); this
//! crate renders the signature, splits the Google-style docstring into its
//! sections and assembles a [`DocObject`] that renders itself to Markdown.
//!
//! Nothing in here fails. Docstring sections that do not have the expected
//! shape are left out, and annotations the formatter does not understand are
//! printed as written.
//!
//! # Example
//!
//! ```
//! use luma_pydoc::{
//!   Declaration,
//!   RenderOptions,
//!   SignatureOptions,
//!   parse_object,
//! };
//!
//! let decl: Declaration = serde_json::from_str(
//!   r#"{
//!     "kind": "function",
//!     "name": "add",
//!     "parameters": [
//!       { "name": "x", "annotation": "int" },
//!       { "name": "y", "annotation": "int", "default": "0" }
//!     ],
//!     "returns": "int",
//!     "docstring": "Add two numbers."
//!   }"#,
//! )
//! .unwrap();
//!
//! let doc = parse_object(&decl, "add", &SignatureOptions::default());
//! assert_eq!(
//!   doc.to_markdown(&RenderOptions::default()),
//!   "## add\n\n```python\nadd(x: int, y: int = 0) -> int\n```\n\nAdd two \
//!    numbers."
//! );
//! ```

mod annotation;
mod docstring;
mod extractor;
pub mod model;
mod signature;
pub mod types;

pub use annotation::format_annotation;
pub use docstring::{ParsedDocstring, clean_docstring, parse_docstring};
pub use extractor::{parse_class, parse_function, parse_object};
pub use model::{
  CallableDoc,
  DocObject,
  Example,
  ParameterDoc,
  RenderOptions,
  TypeDoc,
};
pub use signature::{SignatureOptions, format_signature};
pub use types::{
  ClassDecl,
  Declaration,
  FunctionDecl,
  ParameterDecl,
  ParameterKind,
  TypeExpr,
};
