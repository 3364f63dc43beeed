//! Search predicates
//!
//! A predicate is a storage-neutral boolean condition over one record.
//! Keyword predicates combine per-field substring tests: every word must
//! appear in a field (AND) and any searchable field may match (OR).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::query::ObjectRecord;
use super::value::{SortKey, fold_text, folded_document, lookup, match_text};
use crate::domain::metadata::ObjectTypeMetadata;
use crate::domain::specification::Specification;

/// Comparison operator of a field filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    /// SQL operator
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }

    fn holds(&self, left: &SortKey, right: &SortKey) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Neq => left != right,
            Self::Gt => left > right,
            Self::Gte => left >= right,
            Self::Lt => left < right,
            Self::Lte => left <= right,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Boolean condition over a record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Matches every record
    Always,
    /// Matches no record
    Never,
    /// Folded field text contains an already folded needle
    Contains { field: String, needle: String },
    /// Field value compared with a literal; missing or null fields never match
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Case and diacritic insensitive substring test
    pub fn contains(field: impl Into<String>, text: &str) -> Self {
        Self::Contains {
            field: field.into(),
            needle: fold_text(text),
        }
    }

    /// Comparison with a literal value
    pub fn compare(field: impl Into<String>, op: CompareOp, value: Value) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value,
        }
    }

    /// Evaluate against a plain document
    pub fn matches(&self, document: &Value) -> bool {
        self.evaluate(document, &folded_document(document))
    }

    fn evaluate(&self, document: &Value, folded: &Value) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Contains { field, needle } => lookup(folded, field)
                .and_then(match_text)
                .is_some_and(|text| text.contains(needle.as_str())),
            Self::Compare { field, op, value } => {
                let left = SortKey::of(lookup(document, field));
                let right = SortKey::of(Some(value));
                !left.is_null() && !right.is_null() && op.holds(&left, &right)
            }
            Self::And(items) => items.iter().all(|p| p.evaluate(document, folded)),
            Self::Or(items) => items.iter().any(|p| p.evaluate(document, folded)),
        }
    }
}

impl Specification<ObjectRecord> for Predicate {
    fn is_satisfied_by(&self, record: &ObjectRecord) -> bool {
        self.matches(&record.data)
    }
}

/// Split a raw query into search words
///
/// Splits on single spaces and trims every token. Empty tokens are dropped,
/// so a blank query yields no words at all.
pub fn tokenize(query: &str) -> Vec<String> {
    query
        .split(' ')
        .map(str::trim)
        .filter(|word| !word.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the keyword predicate of one object type
///
/// Only public and searchable fields take part. When `query_fields` is not
/// empty, fields whose path is not listed are skipped as well. A type
/// without any usable field gets a predicate no record satisfies.
pub fn build_predicate(
    metadata: &ObjectTypeMetadata,
    words: &[String],
    query_fields: &[String],
) -> Predicate {
    let clauses: Vec<Predicate> = metadata
        .search_fields()
        .filter(|f| query_fields.is_empty() || query_fields.iter().any(|q| *q == f.field))
        .map(|f| {
            Predicate::And(
                words
                    .iter()
                    .map(|word| Predicate::contains(f.field.clone(), word))
                    .collect(),
            )
        })
        .collect();

    if clauses.is_empty() {
        Predicate::Never
    } else {
        Predicate::Or(clauses)
    }
}
