pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod global;
pub mod history;
pub mod meeting;
pub mod scrum;
