//! Person repository contracts and document-store implementation.
//!
//! # Responsibility
//! - Provide typed CRUD APIs over the configured person collection.
//! - Keep document/query details inside the persistence boundary.
//!
//! # Invariants
//! - Identifiers that do not parse as store keys behave exactly like keys
//!   with no record: `None` / `false`, never an error.
//! - Updates only touch supplied fields.
//! - Read paths reject undecodable persisted documents instead of masking
//!   them.
//! - Store errors are logged here and returned to the caller unchanged.

use crate::db::{DbError, Document, DocumentFilter, StoreClient};
use crate::model::person::{parse_person_id, NewPerson, Person, PersonBody, PersonId, PersonPatch};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Default page size for `list`.
pub const DEFAULT_LIST_LIMIT: u32 = 10;

/// Fields covered by secondary indexes and by the list search term.
const INDEXED_FIELDS: [&str; 2] = ["name", "email"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for person persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl RepoError {
    /// Returns whether the store could not be reached at all.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Db(err) if err.is_connection())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted person data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Query options for listing people.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonListQuery {
    /// Case-insensitive substring matched against name OR email.
    /// `None` or an empty string means no filter.
    pub search: Option<String>,
    /// Maximum rows to return; `0` means unlimited.
    pub limit: u32,
    /// Number of matching rows to skip.
    pub skip: u32,
}

impl Default for PersonListQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: DEFAULT_LIST_LIMIT,
            skip: 0,
        }
    }
}

impl PersonListQuery {
    fn filter(&self) -> DocumentFilter {
        match self.search.as_deref() {
            Some(term) if !term.is_empty() => DocumentFilter::any_field_contains(&INDEXED_FIELDS, term),
            _ => DocumentFilter::All,
        }
    }
}

/// Repository interface for person CRUD operations.
pub trait PersonRepository {
    /// Creates the `name` and `email` indexes when missing.
    fn ensure_indexes(&self) -> RepoResult<()>;
    fn create(&self, person: &NewPerson) -> RepoResult<PersonId>;
    fn list(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>>;
    fn get(&self, id: &str) -> RepoResult<Option<Person>>;
    /// Returns `true` iff a record matched, whether or not a value changed.
    fn update(&self, id: &str, patch: &PersonPatch) -> RepoResult<bool>;
    /// Returns `true` iff exactly one record was removed.
    fn delete(&self, id: &str) -> RepoResult<bool>;
}

/// Document-store backed person repository.
pub struct StorePersonRepository<'client> {
    client: &'client StoreClient,
}

impl<'client> StorePersonRepository<'client> {
    pub fn new(client: &'client StoreClient) -> Self {
        Self { client }
    }
}

impl PersonRepository for StorePersonRepository<'_> {
    fn ensure_indexes(&self) -> RepoResult<()> {
        let collection = self.client.collection()?;
        for field in INDEXED_FIELDS {
            collection.create_index(field)?;
        }
        info!(
            "event=person_ensure_indexes module=repo status=ok collection={}",
            collection.name()
        );
        Ok(())
    }

    fn create(&self, person: &NewPerson) -> RepoResult<PersonId> {
        let started_at = Instant::now();
        let result = self
            .client
            .collection()
            .and_then(|collection| collection.insert_one(person));

        match result {
            Ok(id) => {
                info!(
                    "event=person_create module=repo status=ok id={id} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(id)
            }
            Err(err) => Err(log_store_error("person_create", started_at, err)),
        }
    }

    fn list(&self, query: &PersonListQuery) -> RepoResult<Vec<Person>> {
        let collection = self.client.collection()?;
        let documents = collection.find(
            &query.filter(),
            u64::from(query.skip),
            u64::from(query.limit),
        )?;
        documents.iter().map(decode_person).collect()
    }

    fn get(&self, id: &str) -> RepoResult<Option<Person>> {
        let Some(id) = parse_person_id(id) else {
            return Ok(None);
        };
        let collection = self.client.collection()?;
        collection
            .find_one(id)?
            .as_ref()
            .map(decode_person)
            .transpose()
    }

    fn update(&self, id: &str, patch: &PersonPatch) -> RepoResult<bool> {
        let Some(id) = parse_person_id(id) else {
            return Ok(false);
        };
        let started_at = Instant::now();
        let assignments = patch.assignments();
        let result = self
            .client
            .collection()
            .and_then(|collection| collection.update_one(id, &assignments));

        match result {
            Ok(matched) => {
                info!(
                    "event=person_update module=repo status=ok id={id} fields={} matched={matched} duration_ms={}",
                    assignments.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(matched > 0)
            }
            Err(err) => Err(log_store_error("person_update", started_at, err)),
        }
    }

    fn delete(&self, id: &str) -> RepoResult<bool> {
        let Some(id) = parse_person_id(id) else {
            return Ok(false);
        };
        let started_at = Instant::now();
        let result = self
            .client
            .collection()
            .and_then(|collection| collection.delete_one(id));

        match result {
            Ok(removed) => {
                info!(
                    "event=person_delete module=repo status=ok id={id} removed={removed} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(removed == 1)
            }
            Err(err) => Err(log_store_error("person_delete", started_at, err)),
        }
    }
}

fn decode_person(document: &Document) -> RepoResult<Person> {
    let body: PersonBody = document.decode().map_err(|err| {
        warn!(
            "event=person_decode module=repo status=error id={} error={}",
            document.id, err
        );
        RepoError::InvalidData(format!("document `{}`: {err}", document.id))
    })?;
    Ok(Person::from_body(document.id, body))
}

fn log_store_error(event: &str, started_at: Instant, err: DbError) -> RepoError {
    error!(
        "event={event} module=repo status=error duration_ms={} error={}",
        started_at.elapsed().as_millis(),
        err
    );
    RepoError::Db(err)
}

#[cfg(test)]
mod tests {
    use super::{PersonListQuery, DEFAULT_LIST_LIMIT};
    use crate::db::DocumentFilter;

    #[test]
    fn default_query_uses_default_limit_and_no_filter() {
        let query = PersonListQuery::default();
        assert_eq!(query.limit, DEFAULT_LIST_LIMIT);
        assert_eq!(query.skip, 0);
        assert_eq!(query.filter(), DocumentFilter::All);
    }

    #[test]
    fn empty_search_term_means_no_filter() {
        let query = PersonListQuery {
            search: Some(String::new()),
            ..PersonListQuery::default()
        };
        assert_eq!(query.filter(), DocumentFilter::All);

        let query = PersonListQuery {
            search: Some("ann".to_string()),
            ..PersonListQuery::default()
        };
        assert_eq!(
            query.filter(),
            DocumentFilter::any_field_contains(&["name", "email"], "ann")
        );
    }
}
