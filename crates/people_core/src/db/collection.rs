//! JSON document collection on top of one SQLite table.
//!
//! # Responsibility
//! - Store schemaless JSON objects keyed by a store-assigned UUID.
//! - Provide the small query surface the repositories need: insert, find
//!   with substring filter and pagination, field-level `$set`, delete, and
//!   expression indexes.
//!
//! # Invariants
//! - `doc` always holds a JSON object (`CHECK (json_valid(doc))` plus an
//!   object check on insert).
//! - Collection and field names are validated before they reach SQL text.
//! - Store-default order is insertion order (`rowid`).

use super::{DbError, DbResult};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

/// Store-native document key.
pub type DocumentId = Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

static FIELD_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,63}$").expect("valid field name regex"));

/// One stored document together with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub body: Map<String, Value>,
}

impl Document {
    /// Decodes the document body into a typed value.
    pub fn decode<T: DeserializeOwned>(&self) -> DbResult<T> {
        Ok(serde_json::from_value(Value::Object(self.body.clone()))?)
    }
}

/// Predicate applied by `Collection::find`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DocumentFilter {
    #[default]
    All,
    /// Matches when any listed text field contains `needle`, ignoring case.
    AnyFieldContains { fields: Vec<String>, needle: String },
}

impl DocumentFilter {
    pub fn any_field_contains(fields: &[&str], needle: impl Into<String>) -> Self {
        Self::AnyFieldContains {
            fields: fields.iter().map(|field| (*field).to_string()).collect(),
            needle: needle.into(),
        }
    }
}

/// View over one collection table on a borrowed connection.
pub struct Collection<'conn> {
    conn: &'conn Connection,
    name: &'conn str,
}

impl<'conn> Collection<'conn> {
    /// `name` must already be validated as a collection identifier.
    pub(crate) fn new(conn: &'conn Connection, name: &'conn str) -> Self {
        Self { conn, name }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// Creates an ascending, non-unique index on `field` if it is missing.
    ///
    /// Returns the index name (`<collection>_<field>_1`).
    pub fn create_index(&self, field: &str) -> DbResult<String> {
        validate_field(field)?;
        let index_name = format!("{}_{field}_1", self.name);
        self.conn.execute_batch(&format!(
            "CREATE INDEX IF NOT EXISTS \"{index_name}\"
             ON \"{}\" (json_extract(doc, '$.{field}') ASC);",
            self.name
        ))?;
        Ok(index_name)
    }

    /// Lists secondary index names of this collection, sorted by name.
    pub fn index_names(&self) -> DbResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'index'
               AND tbl_name = ?1
               AND sql IS NOT NULL
             ORDER BY name;",
        )?;
        let names = stmt
            .query_map([self.name], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Inserts one document and returns the key assigned to it.
    pub fn insert_one<T: Serialize>(&self, document: &T) -> DbResult<DocumentId> {
        let body = serde_json::to_value(document)?;
        if !body.is_object() {
            return Err(DbError::InvalidDocument(
                "top-level document must be a JSON object".to_string(),
            ));
        }

        let id = Uuid::new_v4();
        self.conn.execute(
            &format!("INSERT INTO \"{}\" (id, doc) VALUES (?1, ?2);", self.name),
            params![id.to_string(), body.to_string()],
        )?;
        Ok(id)
    }

    /// Returns up to `limit` matching documents after skipping `skip`.
    ///
    /// `limit == 0` means no limit.
    pub fn find(&self, filter: &DocumentFilter, skip: u64, limit: u64) -> DbResult<Vec<Document>> {
        let mut sql = format!("SELECT id, doc FROM \"{}\"", self.name);
        let mut bind_values: Vec<SqlValue> = Vec::new();

        if let DocumentFilter::AnyFieldContains { fields, needle } = filter {
            if !fields.is_empty() {
                bind_values.push(SqlValue::Text(format!("(?i){}", regex::escape(needle))));
                let mut clauses = Vec::with_capacity(fields.len());
                for field in fields {
                    validate_field(field)?;
                    bind_values.push(SqlValue::Text(json_path(field)));
                    clauses.push(format!("regexp(?1, json_extract(doc, ?{}))", bind_values.len()));
                }
                sql.push_str(" WHERE ");
                sql.push_str(&clauses.join(" OR "));
            }
        }

        sql.push_str(" ORDER BY rowid");
        sql.push_str(&format!(" LIMIT ?{}", bind_values.len() + 1));
        bind_values.push(SqlValue::Integer(if limit == 0 {
            -1
        } else {
            to_sql_integer(limit)
        }));
        sql.push_str(&format!(" OFFSET ?{};", bind_values.len() + 1));
        bind_values.push(SqlValue::Integer(to_sql_integer(skip)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_document_row(row)?);
        }
        Ok(documents)
    }

    pub fn find_one(&self, id: DocumentId) -> DbResult<Option<Document>> {
        let raw = self
            .conn
            .query_row(
                &format!("SELECT id, doc FROM \"{}\" WHERE id = ?1;", self.name),
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;

        raw.map(|(id_text, doc_text)| decode_document(&id_text, &doc_text))
            .transpose()
    }

    /// Sets each `(field, value)` pair on the document, leaving other fields
    /// untouched. Returns the number of matched documents (0 or 1), whether
    /// or not any value changed.
    pub fn update_one(&self, id: DocumentId, set: &[(&str, Value)]) -> DbResult<usize> {
        let mut bind_values: Vec<SqlValue> = vec![SqlValue::Text(id.to_string())];
        let mut assignments = String::from("doc");

        if !set.is_empty() {
            let mut pairs = Vec::with_capacity(set.len());
            for (field, value) in set {
                validate_field(field)?;
                bind_values.push(SqlValue::Text(json_path(field)));
                let path_index = bind_values.len();
                bind_values.push(SqlValue::Text(value.to_string()));
                pairs.push(format!("?{path_index}, json(?{})", bind_values.len()));
            }
            assignments = format!("json_set(doc, {})", pairs.join(", "));
        }

        let matched = self.conn.execute(
            &format!(
                "UPDATE \"{}\" SET doc = {assignments} WHERE id = ?1;",
                self.name
            ),
            params_from_iter(bind_values),
        )?;
        Ok(matched)
    }

    /// Returns the number of removed documents (0 or 1).
    pub fn delete_one(&self, id: DocumentId) -> DbResult<usize> {
        let removed = self.conn.execute(
            &format!("DELETE FROM \"{}\" WHERE id = ?1;", self.name),
            [id.to_string()],
        )?;
        Ok(removed)
    }

    pub fn count_documents(&self) -> DbResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM \"{}\";", self.name),
            [],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

/// Creates the backing table for a collection if it does not exist yet.
pub(crate) fn create_collection(conn: &Connection, name: &str) -> DbResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS \"{name}\" (
            id TEXT PRIMARY KEY NOT NULL,
            doc TEXT NOT NULL CHECK (json_valid(doc))
        );"
    ))?;
    Ok(())
}

/// Registers `regexp(pattern, text)`; non-text values never match.
pub(crate) fn register_functions(conn: &Connection) -> DbResult<()> {
    conn.create_scalar_function(
        "regexp",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let pattern: Arc<Regex> =
                ctx.get_or_create_aux(0, |value| -> Result<Regex, BoxError> {
                    Ok(Regex::new(value.as_str()?)?)
                })?;
            let is_match = match ctx.get_raw(1).as_str() {
                Ok(text) => pattern.is_match(text),
                Err(_) => false,
            };
            Ok(is_match)
        },
    )?;
    Ok(())
}

fn validate_field(field: &str) -> DbResult<()> {
    if FIELD_NAME_RE.is_match(field) {
        Ok(())
    } else {
        Err(DbError::InvalidDocument(format!(
            "unsupported field name `{field}`"
        )))
    }
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

fn to_sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn parse_document_row(row: &Row<'_>) -> DbResult<Document> {
    let id_text: String = row.get(0)?;
    let doc_text: String = row.get(1)?;
    decode_document(&id_text, &doc_text)
}

fn decode_document(id_text: &str, doc_text: &str) -> DbResult<Document> {
    let id = Uuid::parse_str(id_text)
        .map_err(|_| DbError::InvalidDocument(format!("invalid document key `{id_text}`")))?;
    match serde_json::from_str::<Value>(doc_text)? {
        Value::Object(body) => Ok(Document { id, body }),
        _ => Err(DbError::InvalidDocument(format!(
            "document `{id_text}` is not a JSON object"
        ))),
    }
}
