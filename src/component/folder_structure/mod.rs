//! 專案資料夾結構元件
//!
//! 在素材根目錄下建立 `<日期>/<專案名稱>/{footage,proxies,exports,logs}`

mod main;
mod structure_builder;

pub use main::FolderStructureCreator;
pub use structure_builder::{
    ProjectLayout, ProjectRequest, create_project_structure, sanitize_project_name,
};
