//! 記憶卡素材匯入元件
//!
//! 從 SD 卡複製影片素材到 `<素材根目錄>/<日期>/footage`，可選擇以雜湊驗證複本

mod importer;
mod main;

pub use importer::{FootageImporter, ImportResult, import_destination};
pub use main::SdImporter;
