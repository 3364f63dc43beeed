//! Request-driven query refinement
//!
//! A `SearchRequest` carries what a caller asked for (page, page size,
//! ordering, ad-hoc filters, locale). The helper traits apply it to an
//! `ObjectQuery`; the defaults can be swapped on the service.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::predicate::{CompareOp, Predicate};
use super::query::{ObjectQuery, SortOrder};
use super::value::is_field_path;
use crate::config::SearchConfig;
use crate::error::{Error, Result};

/// Parameters of one search call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub sort: Vec<SortOrder>,
    #[serde(default)]
    pub filters: Vec<FieldFilter>,
    pub locale: Option<String>,
    /// Restricts keyword matching to these field paths when not empty
    #[serde(default)]
    pub query_fields: Vec<String>,
}

impl SearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_sort(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    pub fn with_filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    pub fn with_query_field(mut self, field: impl Into<String>) -> Self {
        self.query_fields.push(field.into());
        self
    }
}

/// Operator of an ad-hoc field filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Neq,
    Contains,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOperator {
    /// Symbol used in compact filter expressions
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Neq => "!=",
            Self::Contains => "~",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        }
    }
}

/// Ad-hoc condition on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFilter {
    pub field: String,
    pub operator: FilterOperator,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: Value) -> Self {
        Self {
            field: field.into(),
            operator,
            value,
        }
    }

    /// Predicate form of the filter
    pub fn to_predicate(&self) -> Predicate {
        let op = match self.operator {
            FilterOperator::Contains => {
                let text = match &self.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                return Predicate::contains(self.field.clone(), &text);
            }
            FilterOperator::Eq => CompareOp::Eq,
            FilterOperator::Neq => CompareOp::Neq,
            FilterOperator::Gt => CompareOp::Gt,
            FilterOperator::Gte => CompareOp::Gte,
            FilterOperator::Lt => CompareOp::Lt,
            FilterOperator::Lte => CompareOp::Lte,
        };
        Predicate::compare(self.field.clone(), op, self.value.clone())
    }
}

fn parse_operator(expression: &str) -> Option<(usize, FilterOperator, usize)> {
    let index = expression.find(['=', '!', '~', '<', '>'])?;
    let rest = &expression[index..];
    let (operator, len) = if rest.starts_with(">=") {
        (FilterOperator::Gte, 2)
    } else if rest.starts_with("<=") {
        (FilterOperator::Lte, 2)
    } else if rest.starts_with("!=") {
        (FilterOperator::Neq, 2)
    } else if rest.starts_with('>') {
        (FilterOperator::Gt, 1)
    } else if rest.starts_with('<') {
        (FilterOperator::Lt, 1)
    } else if rest.starts_with('=') {
        (FilterOperator::Eq, 1)
    } else if rest.starts_with('~') {
        (FilterOperator::Contains, 1)
    } else {
        return None;
    };
    Some((index, operator, len))
}

fn parse_value(raw: &str) -> Value {
    if let Some(quoted) = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        return Value::String(quoted.to_string());
    }
    if let Ok(integer) = raw.parse::<i64>() {
        return Value::from(integer);
    }
    match raw.parse::<f64>() {
        Ok(float) if float.is_finite() => return Value::from(float),
        _ => {}
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

impl FromStr for FieldFilter {
    type Err = Error;

    /// Parse `field<op>value`, e.g. `status=paid`, `amount>=10`, `name~acme`
    ///
    /// Numeric and boolean literals become typed values; wrap a value in
    /// double quotes to keep it a string.
    fn from_str(s: &str) -> Result<Self> {
        let (index, operator, len) = parse_operator(s)
            .ok_or_else(|| Error::InvalidFilter(format!("No operator in '{}'", s)))?;

        let field = s[..index].trim();
        if field.is_empty() {
            return Err(Error::InvalidFilter(format!("Missing field in '{}'", s)));
        }
        if !is_field_path(field) {
            return Err(Error::InvalidFilter(format!("Invalid field path in '{}'", s)));
        }

        let raw = s[index + len..].trim();
        if raw.is_empty() {
            return Err(Error::InvalidFilter(format!("Missing value in '{}'", s)));
        }

        Ok(Self::new(field, operator, parse_value(raw)))
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::String(s) => write!(f, "{}{}{}", self.field, self.operator.symbol(), s),
            other => write!(f, "{}{}{}", self.field, self.operator.symbol(), other),
        }
    }
}

/// Applies page and page size to a query
pub trait RequestPagination: Send + Sync {
    /// `lock_page` forces the first page whatever the request asks for
    fn paginate(&self, query: &mut ObjectQuery, request: &SearchRequest, lock_page: bool)
    -> Result<()>;
}

/// Applies ordering to a query
pub trait RequestSorting: Send + Sync {
    fn sort(&self, query: &mut ObjectQuery, request: &SearchRequest) -> Result<()>;
}

/// Applies ad-hoc filters to a query
pub trait RequestFiltering: Send + Sync {
    fn filter(&self, query: &mut ObjectQuery, request: &SearchRequest) -> Result<()>;
}

/// Pagination from `SearchRequest::page` and `SearchRequest::limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageFromRequest {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl PageFromRequest {
    pub fn new(default_limit: u32, max_limit: u32) -> Self {
        Self {
            default_limit,
            max_limit,
        }
    }

    /// Effective page size of a request
    pub fn limit_for(&self, request: &SearchRequest) -> u32 {
        request
            .limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1))
    }
}

impl Default for PageFromRequest {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for PageFromRequest {
    fn from(config: &SearchConfig) -> Self {
        Self::new(config.default_limit, config.max_limit)
    }
}

impl RequestPagination for PageFromRequest {
    fn paginate(
        &self,
        query: &mut ObjectQuery,
        request: &SearchRequest,
        lock_page: bool,
    ) -> Result<()> {
        let limit = self.limit_for(request);
        let page = if lock_page {
            1
        } else {
            request.page.unwrap_or(1).max(1)
        };

        query
            .set_max_results(Some(limit))
            .set_first_result(u64::from(page - 1) * u64::from(limit))
            .set_page_hint(page);
        Ok(())
    }
}

/// Ordering from `SearchRequest::sort`
#[derive(Debug, Clone, Copy, Default)]
pub struct SortFromRequest;

impl RequestSorting for SortFromRequest {
    fn sort(&self, query: &mut ObjectQuery, request: &SearchRequest) -> Result<()> {
        for order in &request.sort {
            if !is_field_path(&order.field) {
                return Err(Error::InvalidFilter(format!(
                    "Invalid sort field '{}'",
                    order.field
                )));
            }
            query.add_order_by(order.clone());
        }
        Ok(())
    }
}

/// Filters from `SearchRequest::filters`
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterFromRequest;

impl RequestFiltering for FilterFromRequest {
    fn filter(&self, query: &mut ObjectQuery, request: &SearchRequest) -> Result<()> {
        for filter in &request.filters {
            if !is_field_path(&filter.field) {
                return Err(Error::InvalidFilter(format!(
                    "Invalid filter field '{}'",
                    filter.field
                )));
            }
            query.and_where(filter.to_predicate());
        }
        Ok(())
    }
}
