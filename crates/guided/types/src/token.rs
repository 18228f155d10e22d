//! Tokens: the opaque values a learner places into slots
//!
//! The engine never interprets a token. `"M"`, `"500"` and `"C + 500"`
//! are all just values compared by equality. Display labels belong to
//! the rendering surface and ride along only so a palette can be handed
//! over in one piece.

use serde::{Deserialize, Serialize};

/// An opaque placeable value
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(pub String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Token {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One entry of a token palette: a value plus the label the surface shows
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOption {
    pub value: Token,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_label: String,
}

impl TokenOption {
    pub fn new(value: impl Into<Token>) -> Self {
        Self {
            value: value.into(),
            display_label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.display_label = label.into();
        self
    }
}

/// Build a token tuple from string literals, mostly for tests and fixtures
pub fn tokens<I, S>(values: I) -> Vec<Token>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(|v| Token(v.into())).collect()
}
