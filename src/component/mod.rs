//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod export_watcher;
pub mod folder_structure;
pub mod prompt;
pub mod sd_importer;

pub use export_watcher::ExportWatcher;
pub use folder_structure::FolderStructureCreator;
pub use sd_importer::SdImporter;
