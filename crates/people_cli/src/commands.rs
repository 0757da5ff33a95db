//! Command handlers: one sub-command maps to one repository call.
//!
//! # Responsibility
//! - Turn parsed arguments into typed repository inputs.
//! - Present results and choose the process exit status.
//!
//! # Invariants
//! - Connection failures are returned as errors (fatal); every other store
//!   failure is reported on `out` and mapped to `Exit::Failure`.
//! - `update` with no fields and declined `delete` never call the store.

use crate::cli::{Commands, CreateArgs, DeleteArgs, GetArgs, ListArgs, UpdateArgs};
use crate::output;
use anyhow::{Context, Result};
use console::Term;
use dialoguer::theme::ColorfulTheme;
use people_core::{
    is_valid_email, NewPerson, PersonListQuery, PersonPatch, PersonRepository, RepoError,
};
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

/// Process outcome of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Failure,
}

impl From<Exit> for ExitCode {
    fn from(value: Exit) -> Self {
        match value {
            Exit::Success => ExitCode::SUCCESS,
            Exit::Failure => ExitCode::FAILURE,
        }
    }
}

/// Yes/no prompt used before destructive operations.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// Terminal prompt; falls back to reading one line from stdin when stderr
/// is not a terminal.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> Result<bool> {
        if !Term::stderr().is_term() {
            return read_answer(&mut io::stdin().lock(), &mut io::stderr(), prompt);
        }

        let answer = dialoguer::Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}

/// Reads a y/n answer line; anything other than yes declines.
fn read_answer(input: &mut dyn BufRead, prompt_out: &mut dyn Write, prompt: &str) -> Result<bool> {
    write!(prompt_out, "{prompt} [y/N]: ")?;
    prompt_out.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read confirmation")?;
    Ok(matches!(
        line.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}

/// Ensures indexes, then executes `command`.
pub fn run<R>(
    command: Commands,
    repo: &R,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<Exit>
where
    R: PersonRepository + ?Sized,
{
    repo.ensure_indexes()
        .context("failed to prepare the person collection")?;
    output::success(out, "Indexes ensured.")?;

    match command {
        Commands::Create(args) => create(args, repo, out),
        Commands::List(args) => list(args, repo, out),
        Commands::Get(args) => get(args, repo, out),
        Commands::Update(args) => update(args, repo, out),
        Commands::Delete(args) => delete(args, repo, confirm, out),
    }
}

fn create<R>(args: CreateArgs, repo: &R, out: &mut dyn Write) -> Result<Exit>
where
    R: PersonRepository + ?Sized,
{
    if !is_valid_email(&args.email) {
        output::warning(out, "Warning: the email looks invalid")?;
    }

    let person = NewPerson {
        name: args.name,
        email: args.email,
        age: args.age,
        address: args.address.filter(|address| !address.is_empty()),
    };

    match repo.create(&person) {
        Ok(id) => {
            output::success(out, format!("Created person with id: {id}"))?;
            Ok(Exit::Success)
        }
        Err(err) => {
            let err = recoverable(err)?;
            output::failure(out, format!("Failed to create person: {err}"))?;
            Ok(Exit::Failure)
        }
    }
}

fn list<R>(args: ListArgs, repo: &R, out: &mut dyn Write) -> Result<Exit>
where
    R: PersonRepository + ?Sized,
{
    let query = PersonListQuery {
        search: args.search,
        limit: args.limit,
        skip: args.skip,
    };
    let people = repo.list(&query).context("failed to list people")?;

    if people.is_empty() {
        output::warning(out, "No records found.")?;
        return Ok(Exit::Success);
    }

    writeln!(out, "{}", output::people_table(&people))?;
    Ok(Exit::Success)
}

fn get<R>(args: GetArgs, repo: &R, out: &mut dyn Write) -> Result<Exit>
where
    R: PersonRepository + ?Sized,
{
    match repo.get(&args.id).context("failed to fetch person")? {
        Some(person) => {
            writeln!(out, "{}", output::person_details(&person)?)?;
            Ok(Exit::Success)
        }
        None => {
            output::failure(out, "Not found")?;
            Ok(Exit::Failure)
        }
    }
}

fn update<R>(args: UpdateArgs, repo: &R, out: &mut dyn Write) -> Result<Exit>
where
    R: PersonRepository + ?Sized,
{
    let patch = PersonPatch {
        name: args.name.filter(|name| !name.is_empty()),
        email: args.email.filter(|email| !email.is_empty()),
        age: args.age,
        address: args.address,
    };

    if patch.is_empty() {
        output::failure(out, "No updates specified")?;
        return Ok(Exit::Failure);
    }

    if let Some(email) = &patch.email {
        if !is_valid_email(email) {
            output::warning(out, "Warning: email looks invalid")?;
        }
    }

    match repo.update(&args.id, &patch) {
        Ok(true) => {
            output::success(out, "Update succeeded")?;
            Ok(Exit::Success)
        }
        Ok(false) => {
            output::failure(out, "Update failed: not found")?;
            Ok(Exit::Failure)
        }
        Err(err) => {
            let err = recoverable(err)?;
            output::failure(out, format!("Update failed: {err}"))?;
            Ok(Exit::Failure)
        }
    }
}

fn delete<R>(
    args: DeleteArgs,
    repo: &R,
    confirm: &mut dyn Confirm,
    out: &mut dyn Write,
) -> Result<Exit>
where
    R: PersonRepository + ?Sized,
{
    let confirmed = confirm.confirm(&format!(
        "Are you sure you want to delete {}?",
        args.id
    ))?;
    if !confirmed {
        output::warning(out, "Delete cancelled")?;
        return Ok(Exit::Success);
    }

    match repo.delete(&args.id) {
        Ok(true) => {
            output::success(out, "Deleted")?;
            Ok(Exit::Success)
        }
        Ok(false) => {
            output::failure(out, "Delete failed or not found")?;
            Ok(Exit::Failure)
        }
        Err(err) => {
            let err = recoverable(err)?;
            output::failure(out, format!("Delete failed: {err}"))?;
            Ok(Exit::Failure)
        }
    }
}

/// Passes store-operation errors through for reporting; connection errors
/// abort the command.
fn recoverable(err: RepoError) -> Result<RepoError> {
    if err.is_connection() {
        return Err(anyhow::Error::new(err).context("store connection failed"));
    }
    Ok(err)
}
