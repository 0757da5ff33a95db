//! Core domain logic for the `people` record manager.
//! This crate owns the store connection lifecycle and the person repository.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use config::StoreConfig;
pub use db::{ConnectionError, DbError, StoreClient};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::person::{
    is_valid_email, parse_person_id, NewPerson, Person, PersonId, PersonPatch,
};
pub use repo::person_repo::{
    PersonListQuery, PersonRepository, RepoError, RepoResult, StorePersonRepository,
    DEFAULT_LIST_LIMIT,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
