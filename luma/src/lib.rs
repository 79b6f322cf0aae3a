//! # luma
//!
//! API reference extraction for Python declarations, with optional
//! reStructuredText docstrings.
//!
//! [`Documenter`] ties the pieces together: [`luma_pydoc`] splits docstrings
//! and formats signatures, [`luma_rst`] converts markup prose to Markdown and
//! [`luma_config`] carries the knobs of both.
//!
//! ```rust
//! use luma::{Config, Declaration, DocstringMarkup, Documenter};
//!
//! let decl: Declaration = serde_json::from_str(
//!   r#"{
//!     "kind": "function",
//!     "name": "greet",
//!     "parameters": [{ "name": "who", "annotation": "str" }],
//!     "docstring": "Say hello to ``who``."
//!   }"#,
//! )
//! .unwrap();
//!
//! let documenter = Documenter::new(Config {
//!   docstring_markup: DocstringMarkup::Rst,
//!   ..Config::default()
//! });
//! assert_eq!(
//!   documenter.render(&decl, "greet"),
//!   "## greet\n\n```python\ngreet(who: str)\n```\n\nSay hello to `who`."
//! );
//! ```

mod documenter;

pub use documenter::Documenter;
pub use luma_config::{Config, ConfigError, DocstringMarkup};
pub use luma_pydoc::{
  CallableDoc,
  ClassDecl,
  Declaration,
  DocObject,
  Example,
  FunctionDecl,
  ParameterDecl,
  ParameterDoc,
  RenderOptions,
  SignatureOptions,
  TypeDoc,
  TypeExpr,
};
pub use luma_rst::{ConvertOptions, MarkupError};
