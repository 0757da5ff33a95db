use people_core::config::{ENV_COLLECTION_NAME, ENV_STORE_URI};
use people_core::{
    ConnectionError, DbError, NewPerson, PersonRepository, RepoError, StoreClient, StoreConfig,
    StorePersonRepository,
};

fn file_config(dir: &std::path::Path) -> StoreConfig {
    StoreConfig {
        uri: Some(format!("file://{}", dir.display())),
        database: Some("crm".to_string()),
        collection: Some("people".to_string()),
    }
}

#[test]
fn client_does_not_connect_until_first_use() {
    let client = StoreClient::new(StoreConfig::in_memory("crm", "people"));
    assert!(!client.is_connected());

    client.handle().unwrap();
    assert!(client.is_connected());
}

#[test]
fn handle_is_memoized() {
    let client = StoreClient::new(StoreConfig::in_memory("crm", "people"));
    let first = client.handle().unwrap() as *const _;
    let second = client.handle().unwrap() as *const _;
    assert!(std::ptr::eq(first, second));
}

#[test]
fn missing_settings_fail_at_connection_time() {
    let client = StoreClient::new(StoreConfig::default());
    let err = client.handle().unwrap_err();
    assert!(matches!(
        err,
        DbError::Connection(ConnectionError::MissingSetting(ENV_STORE_URI))
    ));

    let partial = StoreConfig {
        collection: None,
        ..StoreConfig::in_memory("crm", "people")
    };
    let err = StoreClient::new(partial).collection().err().unwrap();
    assert!(matches!(
        err,
        DbError::Connection(ConnectionError::MissingSetting(ENV_COLLECTION_NAME))
    ));
}

#[test]
fn missing_store_directory_is_unreachable() {
    let dir = tempfile::tempdir().unwrap();
    let client = StoreClient::new(file_config(&dir.path().join("does-not-exist")));

    let err = client.handle().unwrap_err();
    assert!(matches!(
        err,
        DbError::Connection(ConnectionError::Unreachable { .. })
    ));
    assert!(!client.is_connected());
}

#[test]
fn foreign_file_fails_liveness_check() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("crm.sqlite3"), vec![b'x'; 4096]).unwrap();

    let client = StoreClient::new(file_config(dir.path()));
    let err = client.handle().unwrap_err();
    assert!(err.is_connection());
}

#[test]
fn repository_surfaces_connection_errors() {
    let client = StoreClient::new(StoreConfig::default());
    let repo = StorePersonRepository::new(&client);

    let err = repo.create(&NewPerson::new("Ann", "ann@x.com")).unwrap_err();
    assert!(err.is_connection());
    assert!(matches!(err, RepoError::Db(DbError::Connection(_))));

    // Unparseable ids never reach the store.
    assert!(repo.get("not-an-id").unwrap().is_none());
}

#[test]
fn file_store_persists_across_clients() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let client = StoreClient::new(file_config(dir.path()));
        let repo = StorePersonRepository::new(&client);
        repo.ensure_indexes().unwrap();
        repo.create(&NewPerson::new("Ann", "ann@x.com")).unwrap()
    };

    assert!(dir.path().join("crm.sqlite3").is_file());

    let client = StoreClient::new(file_config(dir.path()));
    let repo = StorePersonRepository::new(&client);
    let loaded = repo.get(&id.to_string()).unwrap().unwrap();
    assert_eq!(loaded.name, "Ann");
}
