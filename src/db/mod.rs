mod history;
mod init;
mod scrums;

pub use history::{HistoryRepository, SqliteHistorySink};
pub use init::{init_db, migrate, open_db};
pub use scrums::ScrumRepository;

#[cfg(test)]
mod tests;
