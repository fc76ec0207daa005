use anyhow::Result;

use super::args::HistoryCliArgs;
use super::resolve_scrum;
use crate::config::Config;
use crate::db::{self, ScrumRepository};
use crate::history::{self, HistoryEntry};

pub fn handle_history_command(args: HistoryCliArgs) -> Result<()> {
    let config = Config::load()?;
    let conn = db::init_db()?;
    let scrums = ScrumRepository::load_all(&conn)?;
    let scrum = resolve_scrum(&scrums, &args.scrum)?;

    if let Some(key) = args.show.as_deref() {
        let entry = history::find(&conn, scrum, key)?;
        print_entry(&entry);
        return Ok(());
    }

    let limit = args.limit.unwrap_or(config.behavior.history_limit);
    let entries = history::recent(&conn, scrum, limit)?;

    if entries.is_empty() {
        println!("No meetings recorded for '{}' yet.", scrum.title);
        return Ok(());
    }

    println!("{} meeting(s) of '{}':\n", entries.len(), scrum.title);

    for entry in &entries {
        let id = entry.id.to_string();
        println!("ID: {}", &id[..8]);
        println!("{}", entry.summary());
        if let Some(preview) = entry.transcript_preview() {
            println!("Transcript: {}", preview);
        }
        println!("---");
    }

    println!(
        "\nTo read a full transcript, use: scrumdinger history \"{}\" --show <ID>",
        scrum.title
    );

    Ok(())
}

fn print_entry(entry: &HistoryEntry) {
    println!("Meeting {} of '{}'", entry.id, entry.scrum_title);
    println!("Date: {}", entry.date);
    println!("Length: {} min", entry.length_in_minutes);
    println!("Attendees: {}", entry.attendees);

    match entry.transcript.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => println!("\n--- Transcript ---\n{}", text),
        _ => println!("\nNo transcript."),
    }
}
