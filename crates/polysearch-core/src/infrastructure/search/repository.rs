//! SQLite implementation of the ObjectStore
//!
//! Documents live in `search_objects` as JSON. Keyword matching runs with
//! `LIKE` against the folded copy of each document; comparisons and
//! ordering use the original document. A translation row stores the
//! record already merged with its locale's partial document.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::domain::search::value::{folded_document, json_path};
use crate::domain::search::{ObjectQuery, ObjectRecord, ObjectStore, Predicate};
use crate::error::Result;

/// SQLite-backed object store
#[derive(Debug, Clone)]
pub struct SqliteObjectStore {
    pool: SqlitePool,
}

impl SqliteObjectStore {
    /// Create a new SQLite object store
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a record and its translations, replacing any previous version
    pub async fn insert(&self, class: &str, record: &ObjectRecord) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO search_objects (class, id, body, folded)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(class, id) DO UPDATE SET
                body = excluded.body,
                folded = excluded.folded
            "#,
        )
        .bind(class)
        .bind(&record.id)
        .bind(serde_json::to_string(&record.data)?)
        .bind(serde_json::to_string(&folded_document(&record.data))?)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM search_object_translations WHERE class = ? AND id = ?")
            .bind(class)
            .bind(&record.id)
            .execute(&mut *tx)
            .await?;

        // Translation rows hold the whole document as seen in their locale
        for locale in record.translations.keys() {
            let merged = record.view(Some(locale)).data;
            sqlx::query(
                r#"
                INSERT INTO search_object_translations (class, id, locale, body, folded)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(class)
            .bind(&record.id)
            .bind(locale)
            .bind(serde_json::to_string(&merged)?)
            .bind(serde_json::to_string(&folded_document(&merged))?)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(class = %class, record_id = %record.id, "Object stored");
        Ok(())
    }

    /// Store several records, returning how many were written
    pub async fn insert_many(&self, class: &str, records: &[ObjectRecord]) -> Result<usize> {
        for record in records {
            self.insert(class, record).await?;
        }
        Ok(records.len())
    }

    /// Remove a record and its translations
    pub async fn remove(&self, class: &str, id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM search_objects WHERE class = ? AND id = ?")
            .bind(class)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Number of records stored for a class
    pub async fn len(&self, class: &str) -> Result<u64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM search_objects WHERE class = ?")
                .bind(class)
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}

/// `%needle%` with LIKE wildcards escaped by a backslash
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Translation table alias of a query alias
fn translation_alias(alias: &str) -> String {
    format!("{}_t", alias)
}

/// Value of a field path; translated queries read the locale's document when it exists
fn push_extract(qb: &mut QueryBuilder<'_, Sqlite>, query: &ObjectQuery, column: &str, field: &str) {
    qb.push("json_extract(");
    push_document(qb, query, column);
    qb.push(", ").push_bind(json_path(field)).push(")");
}

/// Document column of a query, merged per locale when translating
fn push_document(qb: &mut QueryBuilder<'_, Sqlite>, query: &ObjectQuery, column: &str) {
    let alias = query.alias();

    if query.locale().is_some() {
        qb.push("COALESCE(\"")
            .push(translation_alias(alias))
            .push("\".")
            .push(column)
            .push(", \"")
            .push(alias)
            .push("\".")
            .push(column)
            .push(")");
    } else {
        qb.push("\"").push(alias).push("\".").push(column);
    }
}

/// Bind a literal the way `json_extract` would return it
fn push_value(qb: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Null => {
            qb.push("NULL");
        }
        Value::Bool(b) => {
            qb.push_bind(i64::from(*b));
        }
        Value::Number(n) => match n.as_i64() {
            Some(i) => {
                qb.push_bind(i);
            }
            None => {
                qb.push_bind(n.as_f64().unwrap_or(0.0));
            }
        },
        Value::String(s) => {
            qb.push_bind(s.clone());
        }
        other => {
            qb.push_bind(other.to_string());
        }
    }
}

fn push_predicate(qb: &mut QueryBuilder<'_, Sqlite>, query: &ObjectQuery, predicate: &Predicate) {
    match predicate {
        Predicate::Always => {
            qb.push("1 = 1");
        }
        Predicate::Never => {
            qb.push("1 = 0");
        }
        Predicate::Contains { field, needle } => {
            push_extract(qb, query, "folded", field);
            qb.push(" LIKE ")
                .push_bind(like_pattern(needle))
                .push(" ESCAPE '\\'");
        }
        Predicate::Compare { field, op, value } => {
            push_extract(qb, query, "body", field);
            qb.push(" ").push(op.as_sql()).push(" ");
            push_value(qb, value);
        }
        Predicate::And(items) | Predicate::Or(items) => {
            let (joiner, empty) = match predicate {
                Predicate::And(_) => (" AND ", "1 = 1"),
                _ => (" OR ", "1 = 0"),
            };
            if items.is_empty() {
                qb.push(empty);
                return;
            }
            qb.push("(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    qb.push(joiner);
                }
                push_predicate(qb, query, item);
            }
            qb.push(")");
        }
    }
}

/// FROM, JOIN and WHERE clauses shared by counting and fetching
fn push_filtered_source(qb: &mut QueryBuilder<'_, Sqlite>, query: &ObjectQuery) {
    let alias = query.alias();

    qb.push(" FROM search_objects AS \"").push(alias).push("\"");

    if let Some(locale) = query.locale() {
        let t = translation_alias(alias);
        qb.push(" LEFT JOIN search_object_translations AS \"")
            .push(&t)
            .push("\" ON \"")
            .push(&t)
            .push("\".class = \"")
            .push(alias)
            .push("\".class AND \"")
            .push(&t)
            .push("\".id = \"")
            .push(alias)
            .push("\".id AND \"")
            .push(&t)
            .push("\".locale = ")
            .push_bind(locale.to_string());
    }

    qb.push(" WHERE \"")
        .push(alias)
        .push("\".class = ")
        .push_bind(query.class().to_string())
        .push(" AND ");
    push_predicate(qb, query, &query.predicate());
}

#[async_trait]
impl ObjectStore for SqliteObjectStore {
    async fn count(&self, query: &ObjectQuery) -> Result<u64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*)");
        push_filtered_source(&mut qb, query);

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(count as u64)
    }

    async fn fetch(&self, query: &ObjectQuery) -> Result<Vec<ObjectRecord>> {
        let alias = query.alias();
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT \"");
        qb.push(alias).push("\".id, ");
        push_document(&mut qb, query, "body");
        push_filtered_source(&mut qb, query);

        qb.push(" ORDER BY ");
        for order in query.order_by() {
            push_extract(&mut qb, query, "body", &order.field);
            qb.push(" ").push(order.direction.as_sql()).push(", ");
        }
        qb.push("\"").push(alias).push("\".rowid");

        let limit = query.max_results().map_or(-1, i64::from);
        let offset = i64::try_from(query.first_result()).unwrap_or(i64::MAX);
        qb.push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows: Vec<(String, String)> = qb.build_query_as().fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|(id, body)| -> Result<ObjectRecord> {
                Ok(ObjectRecord::new(id, serde_json::from_str::<Value>(&body)?))
            })
            .collect()
    }
}
