use luma_config::{Config, DocstringMarkup};
use luma_pydoc::{
  CallableDoc,
  Declaration,
  DocObject,
  Example,
  ParameterDoc,
  TypeDoc,
  parse_object,
};
use luma_rst::convert_with_options;

/// Builds reference entries from declarations under one [`Config`].
#[derive(Debug, Clone, Default)]
pub struct Documenter {
  config: Config,
}

impl Documenter {
  #[must_use]
  pub const fn new(config: Config) -> Self {
    Self { config }
  }

  #[must_use]
  pub const fn config(&self) -> &Config {
    &self.config
  }

  /// Extract the reference entry for `decl`, displayed as `name`.
  ///
  /// With [`DocstringMarkup::Rst`] the docstring prose (summary, description,
  /// parameter and return text, example introductions) is converted to
  /// Markdown. Example code is left alone.
  #[must_use]
  pub fn document(&self, decl: &Declaration, name: &str) -> DocObject {
    let mut doc = parse_object(decl, name, &self.config.signature);

    if self.config.docstring_markup == DocstringMarkup::Rst {
      log::debug!("luma: converting docstring markup of {name}");
      match &mut doc {
        DocObject::Callable(callable) => self.convert_callable(callable),
        DocObject::Type(ty) => self.convert_type(ty),
      }
    }

    doc
  }

  /// Extract and render the reference entry for `decl` as Markdown.
  #[must_use]
  pub fn render(&self, decl: &Declaration, name: &str) -> String {
    self.document(decl, name).to_markdown(&self.config.render)
  }

  /// Convert a markup document with the configured options.
  ///
  /// See [`luma_rst::convert_with_options`].
  #[must_use]
  pub fn convert_markup(&self, text: &str) -> Option<String> {
    convert_with_options(text, &self.config.markup)
  }

  fn convert_callable(&self, doc: &mut CallableDoc) {
    self.convert_field(&mut doc.summary);
    self.convert_field(&mut doc.description);
    self.convert_parameters(&mut doc.parameters);
    self.convert_field(&mut doc.returns);
    self.convert_examples(&mut doc.examples);
  }

  fn convert_type(&self, doc: &mut TypeDoc) {
    self.convert_field(&mut doc.summary);
    self.convert_field(&mut doc.description);
    self.convert_parameters(&mut doc.parameters);
    self.convert_examples(&mut doc.examples);
    for method in &mut doc.methods {
      self.convert_callable(method);
    }
  }

  fn convert_parameters(&self, parameters: &mut [ParameterDoc]) {
    for param in parameters {
      self.convert_field(&mut param.description);
    }
  }

  fn convert_examples(&self, examples: &mut [Example]) {
    for example in examples {
      self.convert_field(&mut example.description);
    }
  }

  /// Blank text has nothing to convert and is kept as is.
  fn convert_field(&self, field: &mut Option<String>) {
    if let Some(text) = field
      && let Some(markdown) = self.convert_markup(text)
    {
      *text = markdown;
    }
  }
}
