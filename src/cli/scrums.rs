//! CLI handlers for managing daily scrums.

use anyhow::{bail, Result};
use rusqlite::Connection;
use tracing::info;

use super::args::{AddCliArgs, EditCliArgs, RemoveCliArgs};
use super::resolve_scrum;
use crate::db::{self, HistoryRepository, ScrumRepository};
use crate::scrum::{samples, Attendee, DailyScrum, ScrumDraft};

pub fn handle_list_command() -> Result<()> {
    let conn = db::init_db()?;
    let scrums = ScrumRepository::load_all(&conn)?;

    if scrums.is_empty() {
        println!("No scrums yet. Create one with `scrumdinger add` or `scrumdinger seed`.");
        return Ok(());
    }

    for scrum in &scrums {
        let id = scrum.id.to_string();
        println!("{} [{}]", scrum.title, &id[..8]);
        println!("  {}", describe_scrum(&conn, scrum)?);
        let names: Vec<_> = scrum.attendees.iter().map(|a| a.name.as_str()).collect();
        println!("  {}", names.join(", "));
    }

    Ok(())
}

/// One-line summary for `list`. Loaded scrums only carry their most recent
/// meetings, so the meeting count comes from the store.
fn describe_scrum(conn: &Connection, scrum: &DailyScrum) -> Result<String> {
    let meetings = HistoryRepository::count_for_scrum(conn, scrum.id)?;
    Ok(format!(
        "{} attendees, {} min, {} theme ({} text), {} meeting(s)",
        scrum.attendees.len(),
        scrum.length_in_minutes,
        scrum.theme.name(),
        scrum.theme.accent_color(),
        meetings
    ))
}

pub fn handle_add_command(args: AddCliArgs) -> Result<()> {
    let conn = db::init_db()?;
    let scrum = add_scrum(&conn, args)?;
    println!(
        "Created '{}' with {} attendees ({} min)",
        scrum.title,
        scrum.attendees.len(),
        scrum.length_in_minutes
    );
    Ok(())
}

pub fn handle_edit_command(args: EditCliArgs) -> Result<()> {
    let conn = db::init_db()?;
    let scrum = edit_scrum(&conn, args)?;
    println!(
        "Updated '{}': {} attendees, {} min, {} theme",
        scrum.title,
        scrum.attendees.len(),
        scrum.length_in_minutes,
        scrum.theme.name()
    );
    Ok(())
}

pub fn handle_remove_command(args: RemoveCliArgs) -> Result<()> {
    let conn = db::init_db()?;
    let removed = remove_scrum(&conn, &args.scrum)?;
    println!("Removed '{}' and its history", removed.title);
    Ok(())
}

pub fn handle_seed_command() -> Result<()> {
    let conn = db::init_db()?;
    match seed(&conn)? {
        0 => println!("Scrums already exist, nothing to seed."),
        count => println!("Added {} sample scrums", count),
    }
    Ok(())
}

pub fn add_scrum(conn: &Connection, args: AddCliArgs) -> Result<DailyScrum> {
    let draft = ScrumDraft {
        title: args.title.trim().to_string(),
        attendees: attendees_from_names(&args.attendees),
        length_in_minutes: args.minutes,
        theme: args.theme,
    };
    validate_draft(&draft)?;

    let scrum = DailyScrum::from_draft(draft);
    ScrumRepository::save(conn, &scrum)?;
    info!("Created scrum {} ({})", scrum.title, scrum.id);
    Ok(scrum)
}

pub fn edit_scrum(conn: &Connection, args: EditCliArgs) -> Result<DailyScrum> {
    let scrums = ScrumRepository::load_all(conn)?;
    let mut scrum = resolve_scrum(&scrums, &args.scrum)?.clone();

    let mut draft = scrum.draft();
    if let Some(title) = args.title {
        draft.title = title.trim().to_string();
    }
    if let Some(minutes) = args.minutes {
        draft.length_in_minutes = minutes;
    }
    if let Some(theme) = args.theme {
        draft.theme = theme;
    }
    for name in &args.remove_attendees {
        let Some(index) = draft
            .attendees
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name.trim()))
        else {
            bail!("'{}' is not an attendee of '{}'", name, scrum.title);
        };
        draft.attendees.remove(index);
    }
    draft.attendees.extend(attendees_from_names(&args.add_attendees));
    validate_draft(&draft)?;

    scrum.update(draft);
    ScrumRepository::save(conn, &scrum)?;
    info!("Updated scrum {} ({})", scrum.title, scrum.id);
    Ok(scrum)
}

pub fn remove_scrum(conn: &Connection, key: &str) -> Result<DailyScrum> {
    let scrums = ScrumRepository::load_all(conn)?;
    let scrum = resolve_scrum(&scrums, key)?.clone();
    ScrumRepository::delete(conn, scrum.id)?;
    info!("Removed scrum {} ({})", scrum.title, scrum.id);
    Ok(scrum)
}

/// Insert the sample scrums into an empty store. Returns how many were added.
pub fn seed(conn: &Connection) -> Result<usize> {
    if ScrumRepository::count(conn)? > 0 {
        return Ok(0);
    }
    let scrums = samples();
    ScrumRepository::save_all(conn, &scrums)?;
    Ok(scrums.len())
}

fn attendees_from_names(names: &[String]) -> Vec<Attendee> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(Attendee::new)
        .collect()
}

fn validate_draft(draft: &ScrumDraft) -> Result<()> {
    if draft.title.is_empty() {
        bail!("Title cannot be empty");
    }
    if draft.attendees.is_empty() {
        bail!("A scrum needs at least one attendee");
    }
    if draft.length_in_minutes == 0 {
        bail!("Meeting length must be at least one minute");
    }
    Ok(())
}
