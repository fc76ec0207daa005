use clap::{Args as ClapArgs, Parser, Subcommand};

use crate::scrum::Theme;

#[derive(Parser, Debug)]
#[command(name = "scrumdinger")]
#[command(about = "Daily scrum timer with speaker rotation", long_about = None)]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// List daily scrums
    List,
    /// Create a daily scrum
    Add(AddCliArgs),
    /// Edit a daily scrum
    Edit(EditCliArgs),
    /// Delete a daily scrum and its history
    Remove(RemoveCliArgs),
    /// Run a meeting
    Run(RunCliArgs),
    /// Browse meeting history of a scrum
    History(HistoryCliArgs),
    /// Add the sample scrums when none exist
    Seed,
    /// Print version information
    Version,
}

#[derive(ClapArgs, Debug)]
pub struct AddCliArgs {
    /// Title of the scrum
    #[arg(short, long)]
    pub title: String,
    /// Attendee name, in speaking order (repeatable)
    #[arg(short, long = "attendee", required = true)]
    pub attendees: Vec<String>,
    /// Meeting length in minutes
    #[arg(short, long, default_value = "5")]
    pub minutes: u32,
    /// Color theme
    #[arg(long, default_value = "seafoam")]
    pub theme: Theme,
}

#[derive(ClapArgs, Debug)]
pub struct EditCliArgs {
    /// Scrum id, id prefix or title
    pub scrum: String,
    /// New title
    #[arg(short, long)]
    pub title: Option<String>,
    /// New meeting length in minutes
    #[arg(short, long)]
    pub minutes: Option<u32>,
    /// New color theme
    #[arg(long)]
    pub theme: Option<Theme>,
    /// Append an attendee (repeatable)
    #[arg(long = "add-attendee")]
    pub add_attendees: Vec<String>,
    /// Remove an attendee by name (repeatable)
    #[arg(long = "remove-attendee")]
    pub remove_attendees: Vec<String>,
}

#[derive(ClapArgs, Debug)]
pub struct RemoveCliArgs {
    /// Scrum id, id prefix or title
    pub scrum: String,
}

#[derive(ClapArgs, Debug)]
pub struct RunCliArgs {
    /// Scrum id, id prefix or title; choose interactively when omitted
    pub scrum: Option<String>,
    /// Do not transcribe this meeting
    #[arg(long)]
    pub no_record: bool,
}

#[derive(ClapArgs, Debug)]
pub struct HistoryCliArgs {
    /// Scrum id, id prefix or title
    pub scrum: String,
    /// Maximum number of meetings to show (default from config)
    #[arg(short, long)]
    pub limit: Option<usize>,
    /// Show one meeting, including its transcript
    #[arg(short, long)]
    pub show: Option<String>,
}
