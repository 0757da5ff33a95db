//! Terminal rendering for person records and status lines.

use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use console::style;
use people_core::Person;
use std::io::{self, Write};

pub fn success(out: &mut dyn Write, message: impl AsRef<str>) -> io::Result<()> {
    writeln!(out, "{}", style(message.as_ref()).green())
}

pub fn warning(out: &mut dyn Write, message: impl AsRef<str>) -> io::Result<()> {
    writeln!(out, "{}", style(message.as_ref()).yellow())
}

pub fn failure(out: &mut dyn Write, message: impl AsRef<str>) -> io::Result<()> {
    writeln!(out, "{}", style(message.as_ref()).red())
}

pub fn people_table(people: &[Person]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").fg(Color::White),
            Cell::new("Name").fg(Color::White),
            Cell::new("Email").fg(Color::White),
            Cell::new("Age").fg(Color::White),
            Cell::new("Address").fg(Color::White),
        ]);

    for person in people {
        table.add_row(vec![
            Cell::new(person.id).fg(Color::Yellow),
            Cell::new(&person.name),
            Cell::new(&person.email).fg(Color::Cyan),
            Cell::new(person.age.map(|age| age.to_string()).unwrap_or_default()),
            Cell::new(person.address.as_deref().unwrap_or("")),
        ]);
    }

    table
}

/// Pretty JSON view of one record.
pub fn person_details(person: &Person) -> serde_json::Result<String> {
    serde_json::to_string_pretty(person)
}
