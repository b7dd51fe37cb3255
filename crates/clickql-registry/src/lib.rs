//! Binding registry: placeholder tokens for literal values
//!
//! One registry serves exactly one statement compilation. Values are
//! deduplicated by fingerprint, so a value repeated anywhere in the statement
//! reuses its token.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use clickql_ir::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod parameters;
pub use parameters::{Parameters, Token};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid binding type: {0}.")]
    InvalidBindingGroup(String),
}

/// Statement component a binding belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BindingGroup {
    Select,
    From,
    Join,
    Where,
    GroupBy,
    Having,
    Order,
    Union,
    UnionOrder,
}

impl BindingGroup {
    pub const ALL: [BindingGroup; 9] = [
        BindingGroup::Select,
        BindingGroup::From,
        BindingGroup::Join,
        BindingGroup::Where,
        BindingGroup::GroupBy,
        BindingGroup::Having,
        BindingGroup::Order,
        BindingGroup::Union,
        BindingGroup::UnionOrder,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BindingGroup::Select => "select",
            BindingGroup::From => "from",
            BindingGroup::Join => "join",
            BindingGroup::Where => "where",
            BindingGroup::GroupBy => "groupBy",
            BindingGroup::Having => "having",
            BindingGroup::Order => "order",
            BindingGroup::Union => "union",
            BindingGroup::UnionOrder => "unionOrder",
        }
    }

    /// Groups left out when building update parameters.
    pub fn excluded_from_update(&self) -> bool {
        matches!(self, BindingGroup::Select | BindingGroup::Join)
    }
}

impl fmt::Display for BindingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BindingGroup {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BindingGroup::ALL
            .into_iter()
            .find(|group| group.as_str() == s)
            .ok_or_else(|| RegistryError::InvalidBindingGroup(s.to_string()))
    }
}

#[derive(Debug, Default)]
pub struct BindingRegistry {
    /// fingerprint -> token
    tokens: HashMap<String, Token>,
    /// assignment order
    values: Vec<(Token, Value)>,
    groups: HashMap<BindingGroup, Vec<Token>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `value`, reusing the earlier token when the same value was
    /// seen before.
    pub fn next_token(&mut self, value: &Value) -> Token {
        let fingerprint = value.fingerprint();
        if let Some(token) = self.tokens.get(&fingerprint) {
            return token.clone();
        }

        let token = Token::nth(self.values.len());
        tracing::trace!(token = %token, kind = value.type_name(), "assigned binding token");
        self.tokens.insert(fingerprint, token.clone());
        self.values.push((token.clone(), value.clone()));
        token
    }

    /// Token for `value`, also recorded under `group`.
    pub fn bind(&mut self, group: BindingGroup, value: &Value) -> Token {
        let token = self.next_token(value);
        let tokens = self.groups.entry(group).or_default();
        if !tokens.contains(&token) {
            tokens.push(token.clone());
        }
        token
    }

    /// Direct binding addition by group name. Unknown names are rejected
    /// rather than creating a new group.
    pub fn add_binding(
        &mut self,
        value: impl Into<Value>,
        group: &str,
    ) -> Result<Token, RegistryError> {
        let group: BindingGroup = group.parse()?;
        Ok(self.bind(group, &value.into()))
    }

    pub fn add_bindings<I, V>(&mut self, values: I, group: &str) -> Result<Vec<Token>, RegistryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let group: BindingGroup = group.parse()?;
        Ok(values
            .into_iter()
            .map(|value| self.bind(group, &value.into()))
            .collect())
    }

    pub fn group(&self, group: BindingGroup) -> &[Token] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All assigned tokens with their original values.
    pub fn parameters(&self) -> Parameters {
        Parameters::from_entries(self.values.clone())
    }

    /// Parameters for an `alter table ... update`: every group except
    /// `select` and `join`, plus the assignment tokens.
    pub fn parameters_for_update(&self, assignments: &[Token]) -> Parameters {
        let mut included: HashSet<&Token> = assignments.iter().collect();
        for (group, tokens) in &self.groups {
            if !group.excluded_from_update() {
                included.extend(tokens.iter());
            }
        }

        Parameters::from_entries(
            self.values
                .iter()
                .filter(|(token, _)| included.contains(token))
                .cloned()
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn reset(&mut self) {
        self.tokens.clear();
        self.values.clear();
        self.groups.clear();
    }
}
