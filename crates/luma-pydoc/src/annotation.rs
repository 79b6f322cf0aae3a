//! Canonical rendering of type annotations.
//!
//! Python lets the same type be spelled several ways: `List[int]`,
//! `list[int]`, `list["int"]`, `typing.List[int]`; `Optional[int]`,
//! `Union[int, None]`, `int | None`. References render every one of those the
//! way modern Python source spells it: lowercase built-in generics, quotes
//! removed from forward references and `|` unions.
use crate::types::TypeExpr;

/// `typing` aliases and the built-in they stand for.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
  ("List", "list"),
  ("Dict", "dict"),
  ("Set", "set"),
  ("FrozenSet", "frozenset"),
  ("Tuple", "tuple"),
  ("Type", "type"),
];

/// Format a type annotation to its canonical text.
///
/// Never fails: expressions the formatter does not recognise are printed
/// verbatim.
///
/// # Example
///
/// ```
/// use luma_pydoc::{TypeExpr, format_annotation};
///
/// let optional = TypeExpr::Optional(Box::new(TypeExpr::generic(
///   "List",
///   vec![TypeExpr::ForwardRef("int".into())],
/// )));
/// assert_eq!(format_annotation(&optional), "list[int] | None");
/// ```
#[must_use]
pub fn format_annotation(expr: &TypeExpr) -> String {
  match expr {
    TypeExpr::None => "None".to_string(),
    TypeExpr::Name(name) => builtin_spelling(name).to_string(),
    TypeExpr::ForwardRef(text) => format_annotation(&TypeExpr::parse(text)),
    TypeExpr::Generic { name, args } => {
      let name = builtin_spelling(name);
      if args.is_empty() {
        name.to_string()
      } else {
        format!("{name}[{}]", join_formatted(args, ", "))
      }
    },
    TypeExpr::Union(alternatives) => join_formatted(alternatives, " | "),
    TypeExpr::Optional(inner) => format!("{} | None", format_annotation(inner)),
    TypeExpr::Other(text) => text.clone(),
  }
}

fn join_formatted(exprs: &[TypeExpr], separator: &str) -> String {
  exprs
    .iter()
    .map(format_annotation)
    .collect::<Vec<_>>()
    .join(separator)
}

/// Drop the `typing.` prefix and map aliases to their built-in spelling.
fn builtin_spelling(name: &str) -> &str {
  let bare = name.strip_prefix("typing.").unwrap_or(name);
  BUILTIN_ALIASES
    .iter()
    .find(|(alias, _)| *alias == bare)
    .map_or(bare, |(_, builtin)| builtin)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
  Name(&'a str),
  Str(&'a str),
  Open,
  Close,
  Comma,
  Pipe,
  Ellipsis,
}

/// Split annotation source into tokens; `None` on anything unexpected.
fn tokenize(src: &str) -> Option<Vec<Token<'_>>> {
  let mut tokens = Vec::new();
  let bytes = src.as_bytes();
  let mut pos = 0;

  while pos < bytes.len() {
    let c = bytes[pos];
    match c {
      b' ' | b'\t' | b'\n' | b'\r' => pos += 1,
      b'[' => {
        tokens.push(Token::Open);
        pos += 1;
      },
      b']' => {
        tokens.push(Token::Close);
        pos += 1;
      },
      b',' => {
        tokens.push(Token::Comma);
        pos += 1;
      },
      b'|' => {
        tokens.push(Token::Pipe);
        pos += 1;
      },
      b'\'' | b'"' => {
        // Keep the quotes; `Literal[...]` needs them back verbatim.
        let end = src[pos + 1..].find(c as char)? + pos + 1;
        tokens.push(Token::Str(&src[pos..=end]));
        pos = end + 1;
      },
      b'.' if src[pos..].starts_with("...") => {
        tokens.push(Token::Ellipsis);
        pos += 3;
      },
      _ if c == b'_' || c.is_ascii_alphanumeric() => {
        let start = pos;
        while pos < bytes.len()
          && (bytes[pos] == b'_'
            || bytes[pos] == b'.'
            || bytes[pos].is_ascii_alphanumeric())
        {
          pos += 1;
        }
        tokens.push(Token::Name(&src[start..pos]));
      },
      _ => return None,
    }
  }

  Some(tokens)
}

/// Recursive descent over the token stream.
struct Parser<'a> {
  tokens: Vec<Token<'a>>,
  pos:    usize,
}

impl<'a> Parser<'a> {
  fn peek(&self) -> Option<&Token<'a>> {
    self.tokens.get(self.pos)
  }

  fn next(&mut self) -> Option<Token<'a>> {
    let token = self.tokens.get(self.pos).cloned();
    self.pos += 1;
    token
  }

  /// `primary ('|' primary)*`
  fn union(&mut self) -> Option<TypeExpr> {
    let mut alternatives = vec![self.primary()?];
    while self.peek() == Some(&Token::Pipe) {
      self.pos += 1;
      alternatives.push(self.primary()?);
    }

    if alternatives.len() == 1 {
      alternatives.pop()
    } else {
      Some(TypeExpr::Union(alternatives))
    }
  }

  fn primary(&mut self) -> Option<TypeExpr> {
    match self.next()? {
      Token::Str(quoted) => {
        Some(TypeExpr::ForwardRef(quoted[1..quoted.len() - 1].to_string()))
      },
      Token::Ellipsis => Some(TypeExpr::Other("...".to_string())),
      Token::Open => {
        // Bracketed argument list, as in `Callable[[int, str], bool]`.
        let args = self.arguments()?;
        Some(TypeExpr::Other(format!("[{}]", join_formatted(&args, ", "))))
      },
      Token::Name("None") => Some(TypeExpr::None),
      Token::Name(name) => {
        if self.peek() != Some(&Token::Open) {
          return Some(TypeExpr::Name(name.to_string()));
        }
        self.pos += 1;

        let bare = name.strip_prefix("typing.").unwrap_or(name);
        if bare == "Literal" {
          return self.literal_arguments(name);
        }

        let mut args = self.arguments()?;
        match bare {
          "Union" if !args.is_empty() => Some(TypeExpr::Union(args)),
          "Optional" if args.len() == 1 => {
            args.pop().map(|inner| TypeExpr::Optional(Box::new(inner)))
          },
          _ => {
            Some(TypeExpr::Generic {
              name: name.to_string(),
              args,
            })
          },
        }
      },
      Token::Close | Token::Comma | Token::Pipe => None,
    }
  }

  /// Comma-separated expressions up to and including the closing bracket.
  fn arguments(&mut self) -> Option<Vec<TypeExpr>> {
    let mut args = Vec::new();
    if self.peek() == Some(&Token::Close) {
      self.pos += 1;
      return Some(args);
    }

    loop {
      args.push(self.union()?);
      match self.next()? {
        Token::Comma => {},
        Token::Close => return Some(args),
        _ => return None,
      }
    }
  }

  /// `Literal[...]` arguments are values, not types: keep them verbatim.
  fn literal_arguments(&mut self, name: &str) -> Option<TypeExpr> {
    let mut args = Vec::new();
    loop {
      let text = match self.next()? {
        Token::Str(value) | Token::Name(value) => value.to_string(),
        Token::Close if args.is_empty() => break,
        _ => return None,
      };
      args.push(TypeExpr::Other(text));

      match self.next()? {
        Token::Comma => {},
        Token::Close => break,
        _ => return None,
      }
    }

    Some(TypeExpr::Generic {
      name: name.to_string(),
      args,
    })
  }
}

impl TypeExpr {
  /// Parse annotation source text such as `Optional["Node"]` or
  /// `dict[str, int] | None`.
  ///
  /// Text that cannot be parsed becomes [`TypeExpr::Other`] holding the
  /// trimmed source, so formatting still reproduces it.
  #[must_use]
  pub fn parse(src: &str) -> Self {
    let trimmed = src.trim();
    let parsed = tokenize(trimmed).and_then(|tokens| {
      let mut parser = Parser { tokens, pos: 0 };
      let expr = parser.union()?;
      (parser.pos == parser.tokens.len()).then_some(expr)
    });

    parsed.unwrap_or_else(|| {
      log::debug!("luma-pydoc: keeping unparsed annotation `{trimmed}`");
      Self::Other(trimmed.to_string())
    })
  }
}
