#![forbid(unsafe_code)]

//! Binding annotation grammar.
//!
//! An annotation is either a single entry or a bracketed, comma-separated
//! list of entries:
//!
//! ```text
//! annotation := entry | "[" entry ("," entry)* "]"
//! entry      := model ">" path [">" attribute]
//! ```
//!
//! Whitespace and quote characters are ignored anywhere in the text. Paths
//! use `/` between segments and are relative to the enclosing list item, or
//! absolute when the element is outside any list region of the same model.
//!
//! # Invariants
//!
//! 1. `parse(None)` and `parse(Some(""))` yield no bindings.
//! 2. Every returned binding has a non-empty model and path; the attribute,
//!    when present, is non-empty.
//! 3. `parse(Some(&format(&b)))` returns `b` for any `b` produced by `parse`.
//!
//! # Failure Modes
//!
//! | Input | Error |
//! |-------|-------|
//! | `>name` | [`AnnotationError::EmptyModel`] |
//! | `model` | [`AnnotationError::MissingPath`] |
//! | `model>path>` | [`AnnotationError::EmptyAttribute`] |
//! | `a>b>c>d` | [`AnnotationError::TooManyParts`] |
//! | `[a>b` / `a>b]` / `[[a>b]]` | [`AnnotationError::Unbalanced`] |
//! | `[]` / `[a>b,]` | [`AnnotationError::EmptyEntry`] |
//! | `a>b,c>d` / `[a>b]x>y` | [`AnnotationError::TrailingInput`] |

use core::fmt;

/// One `model>path>attribute` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub model: String,
    /// Slash-separated path, possibly relative to the enclosing list item.
    pub path: String,
    /// Element property to write. `None` writes the element's text.
    pub attribute: Option<String>,
}

impl Binding {
    #[must_use]
    pub fn new(model: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            path: path.into(),
            attribute: None,
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.model, self.path)?;
        if let Some(attribute) = &self.attribute {
            write!(f, ">{attribute}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    EmptyModel { entry: String },
    MissingPath { entry: String },
    EmptyAttribute { entry: String },
    TooManyParts { entry: String },
    Unbalanced { annotation: String },
    EmptyEntry { annotation: String },
    TrailingInput { annotation: String },
}

impl fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyModel { entry } => write!(f, "entry '{entry}' has an empty model name"),
            Self::MissingPath { entry } => write!(f, "entry '{entry}' has no path"),
            Self::EmptyAttribute { entry } => {
                write!(f, "entry '{entry}' has an empty attribute name")
            }
            Self::TooManyParts { entry } => {
                write!(f, "entry '{entry}' has more than three '>'-separated parts")
            }
            Self::Unbalanced { annotation } => {
                write!(f, "unbalanced brackets in '{annotation}'")
            }
            Self::EmptyEntry { annotation } => write!(f, "empty entry in '{annotation}'"),
            Self::TrailingInput { annotation } => {
                write!(f, "unexpected input after the last entry in '{annotation}'")
            }
        }
    }
}

impl std::error::Error for AnnotationError {}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Comma,
    Arrow,
    Text(String),
}

fn tokenize(cleaned: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text = String::new();
    for c in cleaned.chars() {
        let token = match c {
            '[' => Token::Open,
            ']' => Token::Close,
            ',' => Token::Comma,
            '>' => Token::Arrow,
            _ => {
                text.push(c);
                continue;
            }
        };
        if !text.is_empty() {
            tokens.push(Token::Text(core::mem::take(&mut text)));
        }
        tokens.push(token);
    }
    if !text.is_empty() {
        tokens.push(Token::Text(text));
    }
    tokens
}

fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '"' && *c != '\'')
        .collect()
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

struct Parser<'a> {
    annotation: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn unbalanced(&self) -> AnnotationError {
        AnnotationError::Unbalanced {
            annotation: self.annotation.to_owned(),
        }
    }

    fn document(&mut self) -> Result<Vec<Binding>, AnnotationError> {
        if self.peek() != Some(&Token::Open) {
            let binding = self.entry()?;
            return match self.peek() {
                None => Ok(vec![binding]),
                Some(Token::Close) => Err(self.unbalanced()),
                Some(_) => Err(AnnotationError::TrailingInput {
                    annotation: self.annotation.to_owned(),
                }),
            };
        }

        self.bump();
        let mut bindings = Vec::new();
        loop {
            bindings.push(self.entry()?);
            match self.bump() {
                Some(Token::Comma) => {}
                Some(Token::Close) => break,
                Some(Token::Open) | None => return Err(self.unbalanced()),
                Some(_) => {
                    return Err(AnnotationError::TrailingInput {
                        annotation: self.annotation.to_owned(),
                    });
                }
            }
        }
        match self.peek() {
            None => Ok(bindings),
            Some(Token::Close) => Err(self.unbalanced()),
            Some(_) => Err(AnnotationError::TrailingInput {
                annotation: self.annotation.to_owned(),
            }),
        }
    }

    /// Reads `text (">" text?)*` and validates the part count.
    fn entry(&mut self) -> Result<Binding, AnnotationError> {
        let mut parts: Vec<String> = Vec::new();
        let mut expect_text = true;
        loop {
            match self.peek() {
                Some(Token::Text(text)) if expect_text => {
                    parts.push(text.clone());
                    expect_text = false;
                }
                Some(Token::Arrow) => {
                    if expect_text {
                        parts.push(String::new());
                    }
                    expect_text = true;
                }
                Some(Token::Open) => return Err(self.unbalanced()),
                _ => break,
            }
            self.pos += 1;
        }
        if expect_text && !parts.is_empty() {
            parts.push(String::new());
        }

        let entry = parts.join(">");
        match parts.as_slice() {
            [] => Err(AnnotationError::EmptyEntry {
                annotation: self.annotation.to_owned(),
            }),
            [model, ..] if model.is_empty() => Err(AnnotationError::EmptyModel { entry }),
            [_] => Err(AnnotationError::MissingPath { entry }),
            [_, path, ..] if path.is_empty() => Err(AnnotationError::MissingPath { entry }),
            [model, path] => Ok(Binding::new(model.as_str(), path.as_str())),
            [_, _, attribute] if attribute.is_empty() => {
                Err(AnnotationError::EmptyAttribute { entry })
            }
            [model, path, attribute] => {
                Ok(Binding::new(model.as_str(), path.as_str()).with_attribute(attribute.as_str()))
            }
            _ => Err(AnnotationError::TooManyParts { entry }),
        }
    }
}

/// Parse an annotation into its bindings, in annotation order.
pub fn parse(raw: Option<&str>) -> Result<Vec<Binding>, AnnotationError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }
    let tokens = tokenize(&cleaned);
    Parser {
        annotation: raw,
        tokens,
        pos: 0,
    }
    .document()
}

/// Format bindings back into annotation text.
///
/// One binding is written bare; several are written as a bracketed list.
#[must_use]
pub fn format(bindings: &[Binding]) -> String {
    match bindings {
        [] => String::new(),
        [single] => single.to_string(),
        many => {
            let entries: Vec<String> = many.iter().map(Binding::to_string).collect();
            format!("[{}]", entries.join(", "))
        }
    }
}

/// Indices of the bindings that target `model`.
pub(crate) fn indices_for<'a>(
    bindings: &'a [Binding],
    model: &'a str,
) -> impl Iterator<Item = usize> + 'a {
    bindings
        .iter()
        .enumerate()
        .filter(move |(_, b)| b.model == model)
        .map(|(i, _)| i)
}
