pub mod load;
pub mod save;
pub mod types;

pub use types::{
    Config, ExportWatcherSettings, ImportSettings, Language, LoggingSettings, MAX_RECENT_PATHS,
    ProjectSettings, UserSettings,
};
