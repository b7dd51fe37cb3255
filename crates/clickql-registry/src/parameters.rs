//! Placeholder tokens and the ordered parameter list shipped with a statement

use std::fmt;

use clickql_ir::Value;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Placeholder key standing in for a bound value (`a`, `b`, ..., `z`, `aa`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// The `n`th token (zero-based), named like spreadsheet columns.
    pub fn nth(mut n: usize) -> Self {
        let mut letters = Vec::new();
        loop {
            letters.push(char::from(b'a' + (n % 26) as u8));
            if n < 26 {
                break;
            }
            n = n / 26 - 1;
        }
        letters.reverse();
        Token(letters.into_iter().collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Placeholder form used in statement text: `{a}`.
    pub fn placeholder(&self) -> String {
        format!("{{{}}}", self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Token → value pairs in token-assignment order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(Token, Value)>,
}

impl Parameters {
    pub(crate) fn from_entries(entries: Vec<(Token, Value)>) -> Self {
        Self { entries }
    }

    pub fn get(&self, token: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(t, _)| t == token)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.get(token).is_some()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.entries.iter().map(|(token, _)| token)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, &Value)> {
        self.entries.iter().map(|(token, value)| (token, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// JSON object keyed by token, in assignment order.
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .entries
            .iter()
            .map(|(token, value)| (token.to_string(), value.to_json()))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Serialize for Parameters {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (token, value) in &self.entries {
            map.serialize_entry(token, value)?;
        }
        map.end()
    }
}

impl IntoIterator for Parameters {
    type Item = (Token, Value);
    type IntoIter = std::vec::IntoIter<(Token, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
