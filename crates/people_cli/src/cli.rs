//! CLI argument parsing.

use clap::{Args, Parser, Subcommand};
use people_core::{StoreConfig, DEFAULT_LIST_LIMIT};

/// Manage person records in a document store
#[derive(Parser, Debug)]
#[command(name = "people")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Store endpoint (`memory://`, `file:///dir`, or a directory path)
    #[arg(long, global = true, env = "STORE_URI", value_name = "URI")]
    pub store_uri: Option<String>,

    /// Database name inside the store endpoint
    #[arg(long, global = true, env = "DB_NAME", value_name = "NAME")]
    pub db_name: Option<String>,

    /// Collection holding the person records
    #[arg(long, global = true, env = "COLLECTION_NAME", value_name = "NAME")]
    pub collection: Option<String>,

    /// Set log level (error, warn, info, debug, trace, off)
    #[arg(long, global = true, env = "PEOPLE_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write logs to rolling files in this absolute directory instead of stderr
    #[arg(long, global = true, env = "PEOPLE_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<String>,
}

impl Cli {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            uri: self.store_uri.clone(),
            database: self.db_name.clone(),
            collection: self.collection.clone(),
        }
    }

    /// Requested log level; a blank value counts as unset.
    pub fn log_level(&self) -> Option<&str> {
        self.log_level
            .as_deref()
            .map(str::trim)
            .filter(|level| !level.is_empty())
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a person
    Create(CreateArgs),
    /// List people, optionally filtered by a search term
    List(ListArgs),
    /// Show one person
    Get(GetArgs),
    /// Change selected fields of a person
    Update(UpdateArgs),
    /// Delete a person after confirmation
    Delete(DeleteArgs),
}

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Name of the person
    #[arg(long)]
    pub name: String,

    /// Email address
    #[arg(long)]
    pub email: String,

    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,

    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Search in name or email (case-insensitive substring)
    #[arg(short = 's', long)]
    pub search: Option<String>,

    /// Number of records to list (0 lists all)
    #[arg(short = 'l', long, default_value_t = DEFAULT_LIST_LIMIT)]
    pub limit: u32,

    /// Number of records to skip
    #[arg(short = 'k', long, default_value_t = 0)]
    pub skip: u32,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// ID of the person
    #[arg(value_name = "ID")]
    pub id: String,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// ID of the person
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long, allow_negative_numbers = true)]
    pub age: Option<i64>,

    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// ID of the person
    #[arg(value_name = "ID")]
    pub id: String,
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_defaults_and_short_flags() {
        let cli = Cli::try_parse_from(["people", "list"]).unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.limit, 10);
        assert_eq!(args.skip, 0);
        assert!(args.search.is_none());

        let cli = Cli::try_parse_from(["people", "list", "-s", "ann", "-l", "5", "-k", "2"]).unwrap();
        let Commands::List(args) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(args.search.as_deref(), Some("ann"));
        assert_eq!(args.limit, 5);
        assert_eq!(args.skip, 2);
    }

    #[test]
    fn create_requires_name_and_email() {
        assert!(Cli::try_parse_from(["people", "create", "--name", "Ann"]).is_err());
        assert!(Cli::try_parse_from(["people", "create", "--name", "Ann", "--email", "a@b.c"]).is_ok());
    }

    #[test]
    fn age_accepts_negative_numbers() {
        let cli = Cli::try_parse_from([
            "people", "create", "--name", "Neg", "--email", "n@x.com", "--age", "-3",
        ])
        .unwrap();
        let Commands::Create(args) = cli.command else {
            panic!("expected create");
        };
        assert_eq!(args.age, Some(-3));

        let cli = Cli::try_parse_from(["people", "update", "abc", "--age", "-1"]).unwrap();
        let Commands::Update(args) = cli.command else {
            panic!("expected update");
        };
        assert_eq!(args.age, Some(-1));
    }

    #[test]
    fn blank_log_level_counts_as_unset() {
        let cli = Cli::try_parse_from(["people", "list", "--log-level", " "]).unwrap();
        assert_eq!(cli.log_level(), None);

        let cli = Cli::try_parse_from(["people", "list", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level(), Some("debug"));
    }

    #[test]
    fn global_store_flags_build_config() {
        let cli = Cli::try_parse_from([
            "people",
            "get",
            "abc",
            "--store-uri",
            "memory://",
            "--db-name",
            "crm",
            "--collection",
            "people",
        ])
        .unwrap();
        let config = cli.store_config();
        assert_eq!(config.uri.as_deref(), Some("memory://"));
        assert_eq!(config.database.as_deref(), Some("crm"));
        assert_eq!(config.collection.as_deref(), Some("people"));
    }
}
