use crate::scrum::{self, DailyScrum};
use anyhow::{anyhow, Result};

pub mod args;
pub mod history;
pub mod meeting;
pub mod scrums;

pub use args::{
    AddCliArgs, Cli, CliCommand, EditCliArgs, HistoryCliArgs, RemoveCliArgs, RunCliArgs,
};
pub use history::handle_history_command;
pub use meeting::handle_run_command;
pub use scrums::{
    handle_add_command, handle_edit_command, handle_list_command, handle_remove_command,
    handle_seed_command,
};

/// Resolve a scrum by id, id prefix or title.
pub fn resolve_scrum<'a>(scrums: &'a [DailyScrum], key: &str) -> Result<&'a DailyScrum> {
    scrum::find(scrums, key).ok_or_else(|| {
        if scrums.is_empty() {
            anyhow!("No scrums yet. Create one with `scrumdinger add` or `scrumdinger seed`")
        } else {
            anyhow!("No scrum matches '{}'", key)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrum::samples;

    #[test]
    fn test_resolve_scrum() {
        let scrums = samples();
        assert_eq!(resolve_scrum(&scrums, "web dev").unwrap().title, "Web Dev");

        let err = resolve_scrum(&scrums, "retro").unwrap_err();
        assert!(err.to_string().contains("No scrum matches 'retro'"));

        let err = resolve_scrum(&[], "retro").unwrap_err();
        assert!(err.to_string().contains("No scrums yet"));
    }
}
