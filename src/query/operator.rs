//! Predicate operators and their wire suffixes

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    #[default]
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
    Neq,
    Like,
    Ilike,
}

impl Operator {
    pub const ALL: [Operator; 8] = [
        Operator::Eq,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
        Operator::Neq,
        Operator::Like,
        Operator::Ilike,
    ];

    /// Suffix appended to the column name in the query string
    pub fn suffix(&self) -> &'static str {
        match self {
            Operator::Eq => "",
            Operator::Gt => "__gt",
            Operator::Lt => "__lt",
            Operator::Gte => "__gte",
            Operator::Lte => "__lte",
            Operator::Neq => "__ne",
            Operator::Like => "__contains",
            Operator::Ilike => "__icontains",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Neq => "neq",
            Operator::Like => "like",
            Operator::Ilike => "ilike",
        }
    }

    /// Parse an operator name, case-insensitively
    ///
    /// Anything unrecognized is treated as `Eq`.
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_ascii_lowercase();
        Operator::ALL
            .into_iter()
            .find(|op| op.name() == lowered)
            .unwrap_or(Operator::Eq)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Operator::parse(s))
    }
}

impl From<&str> for Operator {
    fn from(s: &str) -> Self {
        Operator::parse(s)
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        Operator::parse(&s)
    }
}
