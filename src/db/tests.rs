use super::*;
use crate::scrum::{samples, Attendee, DailyScrum, History, Theme};
use anyhow::Result;
use chrono::Utc;
use rusqlite::Connection;

fn setup_test_db() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    migrate(&conn)?;
    Ok(conn)
}

fn table_exists(conn: &Connection, name: &str) -> bool {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [name],
            |row| row.get(0),
        )
        .unwrap();
    count == 1
}

#[test]
fn test_migrate_creates_tables() {
    let conn = setup_test_db().unwrap();
    assert!(table_exists(&conn, "scrums"));
    assert!(table_exists(&conn, "history"));
}

#[test]
fn test_migrate_is_idempotent() {
    let conn = setup_test_db().unwrap();
    ScrumRepository::save(&conn, &samples()[0]).unwrap();
    migrate(&conn).unwrap();
    assert_eq!(ScrumRepository::count(&conn).unwrap(), 1);
}

#[test]
fn test_save_and_get_scrum() {
    let conn = setup_test_db().unwrap();
    let scrum = DailyScrum::new("Standup", ["Kim", "James"], 10, Theme::Oxblood);
    ScrumRepository::save(&conn, &scrum).unwrap();

    let loaded = ScrumRepository::get(&conn, scrum.id).unwrap().unwrap();
    assert_eq!(loaded, scrum);
}

#[test]
fn test_save_updates_existing_scrum() {
    let conn = setup_test_db().unwrap();
    let mut scrum = DailyScrum::new("Standup", ["Kim"], 10, Theme::Oxblood);
    ScrumRepository::save(&conn, &scrum).unwrap();

    scrum.title = "Planning".to_string();
    scrum.add_attendee(Attendee::new("Naomi"));
    ScrumRepository::save(&conn, &scrum).unwrap();

    assert_eq!(ScrumRepository::count(&conn).unwrap(), 1);
    let loaded = ScrumRepository::get(&conn, scrum.id).unwrap().unwrap();
    assert_eq!(loaded.title, "Planning");
    assert_eq!(loaded.attendees.len(), 2);
}

#[test]
fn test_load_all_keeps_insertion_order() {
    let conn = setup_test_db().unwrap();
    let scrums = samples();
    for scrum in &scrums {
        ScrumRepository::save(&conn, scrum).unwrap();
    }

    let titles: Vec<_> = ScrumRepository::load_all(&conn)
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    assert_eq!(titles, ["Design", "App Dev", "Web Dev"]);
}

#[test]
fn test_save_all_reorders_and_removes() {
    let conn = setup_test_db().unwrap();
    let mut scrums = samples();
    ScrumRepository::save_all(&conn, &scrums).unwrap();

    let removed = scrums.remove(1);
    HistoryRepository::insert(
        &conn,
        removed.id,
        &History::new(Utc::now(), removed.attendees.clone(), 5, None),
    )
    .unwrap();
    scrums.reverse();
    ScrumRepository::save_all(&conn, &scrums).unwrap();

    let loaded = ScrumRepository::load_all(&conn).unwrap();
    let titles: Vec<_> = loaded.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, ["Web Dev", "Design"]);
    assert!(ScrumRepository::get(&conn, removed.id).unwrap().is_none());
    assert_eq!(HistoryRepository::count_for_scrum(&conn, removed.id).unwrap(), 0);
}

#[test]
fn test_save_all_persists_new_history_once() {
    let conn = setup_test_db().unwrap();
    let mut scrums = samples();
    let entry = History::new(Utc::now(), scrums[0].attendees.clone(), 1, Some("hi".into()));
    scrums[0].record(entry.clone());

    ScrumRepository::save_all(&conn, &scrums).unwrap();
    ScrumRepository::save_all(&conn, &scrums).unwrap();

    let loaded = ScrumRepository::get(&conn, scrums[0].id).unwrap().unwrap();
    assert_eq!(loaded.history, vec![entry]);
}

#[test]
fn test_delete_scrum_cascades_history() {
    let conn = setup_test_db().unwrap();
    let scrum = DailyScrum::new("Design", ["Cathy"], 1, Theme::Yellow);
    ScrumRepository::save(&conn, &scrum).unwrap();
    HistoryRepository::insert(
        &conn,
        scrum.id,
        &History::new(Utc::now(), scrum.attendees.clone(), 1, None),
    )
    .unwrap();

    assert!(ScrumRepository::delete(&conn, scrum.id).unwrap());
    assert!(!ScrumRepository::delete(&conn, scrum.id).unwrap());
    assert_eq!(HistoryRepository::count_for_scrum(&conn, scrum.id).unwrap(), 0);
}

#[test]
fn test_loaded_scrum_history_is_newest_first() {
    let conn = setup_test_db().unwrap();
    let scrum = DailyScrum::new("Design", ["Cathy"], 1, Theme::Yellow);
    ScrumRepository::save(&conn, &scrum).unwrap();

    let older = History::new(
        Utc::now() - chrono::Duration::days(1),
        scrum.attendees.clone(),
        1,
        None,
    );
    let newer = History::new(Utc::now(), scrum.attendees.clone(), 1, None);
    HistoryRepository::insert(&conn, scrum.id, &newer).unwrap();
    HistoryRepository::insert(&conn, scrum.id, &older).unwrap();

    let loaded = ScrumRepository::get(&conn, scrum.id).unwrap().unwrap();
    assert_eq!(loaded.history[0].id, newer.id);
    assert_eq!(loaded.history[1].id, older.id);
}

#[test]
fn test_open_db_creates_parent_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("scrumdinger.db");
    let conn = open_db(&path).unwrap();
    assert!(path.exists());
    assert!(table_exists(&conn, "scrums"));
}
