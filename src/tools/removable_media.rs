//! 外接媒體偵測
//!
//! 透過 sysinfo 列出卸除式磁碟（SD 卡、USB 隨身碟、外接 SSD），
//! 並以前後兩次快照的差集判斷新插入的媒體。

use log::{debug, info};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use sysinfo::Disks;

const WAIT_SLICE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovableMedia {
    pub name: String,
    pub mount_point: PathBuf,
    pub file_system: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl RemovableMedia {
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            self.mount_point.display().to_string()
        } else {
            format!("{} ({})", self.name, self.mount_point.display())
        }
    }
}

fn to_media(disk: &sysinfo::Disk) -> RemovableMedia {
    RemovableMedia {
        name: disk.name().to_string_lossy().into_owned(),
        mount_point: disk.mount_point().to_path_buf(),
        file_system: disk.file_system().to_string_lossy().into_owned(),
        total_bytes: disk.total_space(),
        available_bytes: disk.available_space(),
    }
}

/// 列出目前掛載的卸除式媒體
#[must_use]
pub fn list_removable_media() -> Vec<RemovableMedia> {
    let disks = Disks::new_with_refreshed_list();
    let mut media: Vec<RemovableMedia> = disks
        .list()
        .iter()
        .filter(|disk| disk.is_removable())
        .map(to_media)
        .collect();
    media.sort_by(|a, b| a.mount_point.cmp(&b.mount_point));
    media
}

/// 檢查指定名稱的磁碟是否已掛載（比對磁碟名稱與掛載點，不分大小寫）
#[must_use]
pub fn is_drive_mounted(drive_name: &str) -> bool {
    let needle = drive_name.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }

    let disks = Disks::new_with_refreshed_list();
    let found = disks.list().iter().any(|disk| {
        disk.name().to_string_lossy().to_lowercase().contains(&needle)
            || disk
                .mount_point()
                .to_string_lossy()
                .to_lowercase()
                .contains(&needle)
    });

    if found {
        info!("找到磁碟 '{drive_name}'");
    } else {
        debug!("找不到磁碟 '{drive_name}'");
    }
    found
}

/// 取出 `current` 中掛載點不在 `known` 內的媒體
#[must_use]
pub fn diff_new_media(known: &HashSet<PathBuf>, current: &[RemovableMedia]) -> Vec<RemovableMedia> {
    current
        .iter()
        .filter(|media| !known.contains(&media.mount_point))
        .cloned()
        .collect()
}

/// 輪詢新插入的卸除式媒體
pub struct MediaMonitor {
    known: HashSet<PathBuf>,
}

impl MediaMonitor {
    /// 以目前已掛載的媒體作為初始快照
    #[must_use]
    pub fn new() -> Self {
        Self::with_known(list_removable_media())
    }

    #[must_use]
    pub fn with_known(media: Vec<RemovableMedia>) -> Self {
        Self {
            known: media.into_iter().map(|m| m.mount_point).collect(),
        }
    }

    /// 與上次快照比較，回傳新出現的媒體並更新快照
    pub fn poll(&mut self) -> Vec<RemovableMedia> {
        let current = list_removable_media();
        self.update(&current)
    }

    fn update(&mut self, current: &[RemovableMedia]) -> Vec<RemovableMedia> {
        let new_media = diff_new_media(&self.known, current);
        self.known = current.iter().map(|m| m.mount_point.clone()).collect();
        new_media
    }

    /// 阻塞直到出現新媒體，收到中斷信號時回傳 `None`
    pub fn wait_for_new_media(
        &mut self,
        interval: Duration,
        shutdown_signal: &Arc<AtomicBool>,
    ) -> Option<Vec<RemovableMedia>> {
        info!("等待新的卸除式媒體...");
        loop {
            let new_media = self.poll();
            if !new_media.is_empty() {
                for media in &new_media {
                    info!("偵測到新的卸除式媒體: {}", media.display_name());
                }
                return Some(new_media);
            }

            let mut waited = Duration::ZERO;
            while waited < interval {
                if shutdown_signal.load(Ordering::SeqCst) {
                    return None;
                }
                thread::sleep(WAIT_SLICE);
                waited += WAIT_SLICE;
            }
        }
    }
}

impl Default for MediaMonitor {
    fn default() -> Self {
        Self::new()
    }
}
