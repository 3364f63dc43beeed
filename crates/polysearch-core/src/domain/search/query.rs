//! Storage-neutral query description
//!
//! `ObjectQuery` plays the role of a query builder scoped to one backing
//! class. The search pipeline attaches predicates, pagination, ordering and
//! translation to it; an `ObjectStore` then executes it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::predicate::Predicate;
use super::value::{is_field_path, overlay};
use crate::error::{Error, Result};

/// One stored record of an object type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectRecord {
    pub id: String,
    pub data: Value,
    /// Partial documents per locale, overlaid on `data` when translating
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub translations: BTreeMap<String, Value>,
}

impl ObjectRecord {
    /// Create a record without translations
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
            translations: BTreeMap::new(),
        }
    }

    /// Add the partial document of a locale
    pub fn with_translation(mut self, locale: impl Into<String>, data: Value) -> Self {
        self.translations.insert(locale.into(), data);
        self
    }

    /// The record as seen in a locale, without translation payloads
    pub fn view(&self, locale: Option<&str>) -> ObjectRecord {
        let mut data = self.data.clone();
        if let Some(patch) = locale.and_then(|l| self.translations.get(l)) {
            overlay(&mut data, patch);
        }
        ObjectRecord::new(self.id.clone(), data)
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Ordering on one field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    /// Parse `field`, `field:asc` or `field:desc`
    fn from_str(s: &str) -> Result<Self> {
        let (field, direction) = match s.rsplit_once(':') {
            Some((field, dir)) => {
                let direction = match dir.trim().to_lowercase().as_str() {
                    "asc" => SortDirection::Asc,
                    "desc" => SortDirection::Desc,
                    other => {
                        return Err(Error::InvalidFilter(format!(
                            "Unknown sort direction '{}' in '{}'",
                            other, s
                        )));
                    }
                };
                (field.trim(), direction)
            }
            None => (s.trim(), SortDirection::Asc),
        };

        if field.is_empty() {
            return Err(Error::InvalidFilter(format!("Missing sort field in '{}'", s)));
        }
        if !is_field_path(field) {
            return Err(Error::InvalidFilter(format!("Invalid sort field in '{}'", s)));
        }

        Ok(Self {
            field: field.to_string(),
            direction,
        })
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            SortDirection::Asc => write!(f, "{}:asc", self.field),
            SortDirection::Desc => write!(f, "{}:desc", self.field),
        }
    }
}

/// Query over the records of one backing class
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectQuery {
    class: String,
    alias: String,
    predicates: Vec<Predicate>,
    order_by: Vec<SortOrder>,
    max_results: Option<u32>,
    first_result: u64,
    page_hint: Option<u32>,
    locale: Option<String>,
}

impl ObjectQuery {
    /// Create an unfiltered query
    pub fn new(class: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            alias: alias.into(),
            predicates: Vec::new(),
            order_by: Vec::new(),
            max_results: None,
            first_result: 0,
            page_hint: None,
            locale: None,
        }
    }

    /// Derive a query alias from an object name
    ///
    /// The alias is a lowercase identifier made of ASCII letters, digits
    /// and underscores, always starting with a letter.
    pub fn alias_for(object: &str) -> String {
        let mut alias: String = object
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();

        if !alias.starts_with(|c: char| c.is_ascii_alphabetic()) {
            alias.insert(0, 'o');
        }
        alias
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// AND a predicate onto the query
    pub fn and_where(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// All predicates combined
    pub fn predicate(&self) -> Predicate {
        match self.predicates.as_slice() {
            [] => Predicate::Always,
            [single] => single.clone(),
            many => Predicate::And(many.to_vec()),
        }
    }

    pub fn add_order_by(&mut self, order: SortOrder) -> &mut Self {
        self.order_by.push(order);
        self
    }

    pub fn order_by(&self) -> &[SortOrder] {
        &self.order_by
    }

    /// Page size; `None` means unbounded
    pub fn set_max_results(&mut self, max_results: Option<u32>) -> &mut Self {
        self.max_results = max_results;
        self
    }

    pub fn max_results(&self) -> Option<u32> {
        self.max_results
    }

    /// Number of matching records to skip
    pub fn set_first_result(&mut self, first_result: u64) -> &mut Self {
        self.first_result = first_result;
        self
    }

    pub fn first_result(&self) -> u64 {
        self.first_result
    }

    /// Page number resolved by pagination
    pub fn set_page_hint(&mut self, page: u32) -> &mut Self {
        self.page_hint = Some(page);
        self
    }

    pub fn page_hint(&self) -> Option<u32> {
        self.page_hint
    }

    /// Read field values in the given locale
    pub fn translate(&mut self, locale: impl Into<String>) -> &mut Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }
}
