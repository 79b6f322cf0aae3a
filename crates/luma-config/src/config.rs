use std::{fs, path::Path, str::FromStr};

use luma_pydoc::{RenderOptions, SignatureOptions};
use luma_rst::ConvertOptions;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How docstring prose is written.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DocstringMarkup {
  /// Prose is already Markdown and is used as written.
  #[default]
  Plain,

  /// Prose is reStructuredText and is converted before rendering.
  Rst,
}

impl FromStr for DocstringMarkup {
  type Err = ConfigError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "plain" | "markdown" => Ok(Self::Plain),
      "rst" | "restructuredtext" => Ok(Self::Rst),
      _ => {
        Err(ConfigError::Config(format!(
          "Invalid docstring markup: '{s}'. Expected 'plain' or 'rst'"
        )))
      },
    }
  }
}

/// Configuration of the documentation pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Signature layout.
  pub signature: SignatureOptions,

  /// Markdown rendering of reference entries.
  pub render: RenderOptions,

  /// reStructuredText conversion.
  pub markup: ConvertOptions,

  /// Markup language of docstring prose.
  pub docstring_markup: DocstringMarkup,
}

impl Config {
  /// Parse a configuration from TOML text.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Toml`] if the text is not valid TOML for this
  /// schema.
  pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
    Ok(toml::from_str(content)?)
  }

  /// Parse a configuration from JSON text.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Json`] if the text is not valid JSON for this
  /// schema.
  pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }

  /// Load configuration from a file, picking the format by extension
  /// (`.toml` or `.json`).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read, has an unsupported
  /// extension or cannot be parsed.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;

    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => {
        match ext.to_lowercase().as_str() {
          "json" => {
            Self::from_json_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse JSON config from {}: {e}",
                path.display()
              ))
            })
          },
          "toml" => {
            Self::from_toml_str(&content).map_err(|e| {
              ConfigError::Config(format!(
                "Failed to parse TOML config from {}: {e}",
                path.display()
              ))
            })
          },
          _ => {
            Err(ConfigError::Config(format!(
              "Unsupported config file format: {}",
              path.display()
            )))
          },
        }
      },
      None => {
        Err(ConfigError::Config(format!(
          "Config file has no extension: {}",
          path.display()
        )))
      },
    }
  }

  /// Load and merge config files in order, apply `KEY=VALUE` overrides and
  /// validate the result.
  ///
  /// With no files the defaults are the starting point.
  ///
  /// # Errors
  ///
  /// Returns an error if a file fails to load, an override is malformed or
  /// the merged configuration is invalid.
  pub fn load<P: AsRef<Path>>(
    config_files: &[P],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = Self::default();

    for config_path in config_files {
      let config_path = config_path.as_ref();
      let additional = Self::from_file(config_path).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {e}",
          config_path.display()
        ))
      })?;
      config.merge(additional);
    }

    if config_files.len() > 1 {
      log::info!("Loaded and merged {} config files", config_files.len());
    }

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    config.validate()?;
    Ok(config)
  }

  /// Merge another config into this one, with the other config's values
  /// taking precedence.
  ///
  /// Fields `other` leaves at their default value keep this config's value,
  /// so a file that only sets one key does not reset the rest.
  pub fn merge(&mut self, other: Self) {
    let defaults = Self::default();

    merge_field(
      &mut self.signature.max_width,
      other.signature.max_width,
      &defaults.signature.max_width,
    );
    merge_field(
      &mut self.signature.indent,
      other.signature.indent,
      &defaults.signature.indent,
    );
    merge_field(
      &mut self.render.heading_level,
      other.render.heading_level,
      &defaults.render.heading_level,
    );
    merge_field(
      &mut self.render.language,
      other.render.language,
      &defaults.render.language,
    );
    merge_field(
      &mut self.markup.doctest_language,
      other.markup.doctest_language,
      &defaults.markup.doctest_language,
    );
    merge_field(
      &mut self.markup.max_depth,
      other.markup.max_depth,
      &defaults.markup.max_depth,
    );
    merge_field(
      &mut self.docstring_markup,
      other.docstring_markup,
      &defaults.docstring_markup,
    );
  }

  /// Apply configuration overrides from `KEY=VALUE` strings, where `KEY` is
  /// a dotted field path such as `signature.max_width`.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust
  /// use luma_config::Config;
  ///
  /// let mut config = Config::default();
  /// config
  ///   .apply_overrides(&[
  ///     "signature.max_width=100".to_string(),
  ///     "docstring_markup=rst".to_string(),
  ///   ])
  ///   .unwrap();
  /// assert_eq!(config.signature.max_width, 100);
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    match key {
      "signature.max_width" => {
        self.signature.max_width = parse_value(key, value)?;
      },
      "signature.indent" => self.signature.indent = parse_value(key, value)?,
      "render.heading_level" => {
        self.render.heading_level = parse_value(key, value)?;
      },
      "render.language" => self.render.language = value.to_string(),
      "markup.doctest_language" => {
        self.markup.doctest_language = value.to_string();
      },
      "markup.max_depth" => self.markup.max_depth = parse_value(key, value)?,
      "docstring_markup" => self.docstring_markup = value.parse()?,
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }

    log::debug!("luma-config: override {key}={value}");
    Ok(())
  }

  /// Check that every knob holds a usable value.
  ///
  /// # Errors
  ///
  /// Returns [`ConfigError::Invalid`] naming the first offending field.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.signature.max_width == 0 {
      return Err(ConfigError::Invalid(
        "signature.max_width must be greater than 0".to_string(),
      ));
    }
    if !(1..=6).contains(&self.render.heading_level) {
      return Err(ConfigError::Invalid(format!(
        "render.heading_level must be between 1 and 6, got {}",
        self.render.heading_level
      )));
    }
    if !is_language_tag(&self.render.language) {
      return Err(ConfigError::Invalid(format!(
        "render.language must be a single non-empty word, got '{}'",
        self.render.language
      )));
    }
    if !is_language_tag(&self.markup.doctest_language) {
      return Err(ConfigError::Invalid(format!(
        "markup.doctest_language must be a single non-empty word, got '{}'",
        self.markup.doctest_language
      )));
    }
    if self.markup.max_depth == 0 {
      return Err(ConfigError::Invalid(
        "markup.max_depth must be greater than 0".to_string(),
      ));
    }
    Ok(())
  }
}

fn merge_field<T: PartialEq>(target: &mut T, value: T, default: &T) {
  if value != *default {
    *target = value;
  }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  value.parse().map_err(|e| {
    ConfigError::Config(format!("Invalid value for '{key}': '{value}' ({e})"))
  })
}

/// Code fence info strings must not contain whitespace.
fn is_language_tag(tag: &str) -> bool {
  !tag.is_empty() && !tag.contains(char::is_whitespace)
}
