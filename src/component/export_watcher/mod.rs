//! 匯出資料夾監看元件
//!
//! 定期輪詢匯出資料夾，將新出現的檔案（可選擇加上時間戳記、放入日期資料夾）
//! 搬移到成品資料夾。事件經由 channel 送出，核心不依賴任何介面。

mod error;
mod event;
mod main;
mod relocator;
mod session;
mod snapshot;

pub use error::WatchError;
pub use event::{RelocationRecord, WatchEvent};
pub use main::ExportWatcher;
pub use relocator::{RelocationOptions, RelocationPlan, plan_relocation, relocate};
pub use session::{WatchOptions, WatchSession, WatchState};
pub use snapshot::FileSnapshot;
