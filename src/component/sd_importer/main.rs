use super::importer::{FootageImporter, ImportResult, import_destination};
use crate::component::prompt::prompt_directory;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::tools::{
    FileInfo, MediaMonitor, RemovableMedia, is_drive_mounted, list_removable_media,
    scan_files_with_extensions, validate_directory_exists,
};
use anyhow::Result;
use chrono::Local;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Select};
use indicatif::HumanBytes;
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

const MEDIA_POLL_INTERVAL: Duration = Duration::from_secs(2);
const PREVIEW_COUNT: usize = 10;

/// 記憶卡素材匯入元件
pub struct SdImporter {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl SdImporter {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style(t!("importer.title")).cyan().bold());

        let Some(source) = self.select_source()? else {
            return Ok(());
        };
        validate_directory_exists(&source)?;

        println!("{}", style(t!("importer.scanning")).dim());
        let files = scan_files_with_extensions(&source, &self.config.settings.video_extensions)?;
        if files.is_empty() {
            println!("{}", style(t!("importer.no_files")).yellow());
            return Ok(());
        }
        Self::print_file_summary(&files);

        let Some(raw_path) = prompt_directory(
            &t!("importer.prompt_raw"),
            &self.config.settings.raw_path,
            &self.config.settings.recent_paths,
        )?
        else {
            return Ok(());
        };
        validate_directory_exists(Path::new(&raw_path))?;

        let destination = import_destination(Path::new(&raw_path), Local::now().date_naive());
        println!(
            "{}",
            style(t!("importer.destination", path = destination.display())).dim()
        );

        if !Confirm::new()
            .with_prompt(t!("importer.confirm"))
            .default(true)
            .interact()?
        {
            println!("{}", style(t!("common.cancelled")).yellow());
            return Ok(());
        }

        self.remember_raw_path(&raw_path);

        let importer = FootageImporter::new(
            Arc::clone(&self.shutdown_signal),
            self.config.settings.import.verify_hash,
        );
        let result = importer.import(&files, &destination)?;
        if result.cancelled {
            self.shutdown_signal.store(false, Ordering::SeqCst);
        }

        Self::print_result(&result);
        Ok(())
    }

    /// 列出已掛載的卸除式媒體與設定中 SSD 的狀態
    pub fn list_media(&self) {
        println!("{}", style(t!("media.title")).cyan().bold());

        let media = list_removable_media();
        if media.is_empty() {
            println!("{}", style(t!("media.none")).yellow());
        }
        for item in &media {
            println!(
                "  {} {} [{}] {} / {}",
                style("•").dim(),
                style(item.display_name()).cyan(),
                item.file_system,
                HumanBytes(item.available_bytes),
                HumanBytes(item.total_bytes)
            );
        }

        let ssd_name = &self.config.settings.ssd_name;
        if !ssd_name.is_empty() {
            println!();
            if is_drive_mounted(ssd_name) {
                println!("{}", style(t!("media.ssd_mounted", name = ssd_name)).green());
            } else {
                println!("{}", style(t!("media.ssd_missing", name = ssd_name)).yellow());
            }
        }
    }

    /// 選擇記憶卡：已掛載的媒體、等待插入，或手動輸入路徑
    fn select_source(&self) -> Result<Option<PathBuf>> {
        let media = list_removable_media();

        let mut options: Vec<String> = media.iter().map(RemovableMedia::display_name).collect();
        options.push(t!("importer.opt_wait").to_string());
        options.push(t!("common.enter_new_path").to_string());

        println!("{}", style(t!("common.esc_hint")).dim());
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("importer.prompt_card"))
            .items(&options)
            .default(0)
            .interact_opt()?;

        match selection {
            None => Ok(None),
            Some(idx) if idx < media.len() => Ok(Some(media[idx].mount_point.clone())),
            Some(idx) if idx == media.len() => Ok(self.wait_for_card()),
            Some(_) => Ok(prompt_directory(
                &t!("importer.prompt_source"),
                "",
                &self.config.settings.recent_paths,
            )?
            .map(PathBuf::from)),
        }
    }

    fn wait_for_card(&self) -> Option<PathBuf> {
        println!("{}", style(t!("importer.waiting")).dim());

        let mut monitor = MediaMonitor::new();
        match monitor.wait_for_new_media(MEDIA_POLL_INTERVAL, &self.shutdown_signal) {
            Some(new_media) => new_media.into_iter().next().map(|m| {
                println!(
                    "{}",
                    style(t!("importer.card_found", name = m.display_name())).green()
                );
                m.mount_point
            }),
            None => {
                self.shutdown_signal.store(false, Ordering::SeqCst);
                None
            }
        }
    }

    fn remember_raw_path(&mut self, raw_path: &str) {
        let settings = &mut self.config.settings;
        if settings.raw_path.is_empty() {
            settings.raw_path = raw_path.to_string();
        }
        add_recent_path(settings, raw_path);
        if let Err(e) = save_settings(settings) {
            warn!("無法儲存路徑歷史: {e}");
        }
    }

    fn print_file_summary(files: &[FileInfo]) {
        let total: u64 = files.iter().map(|f| f.size).sum();
        println!();
        println!(
            "{}",
            style(t!(
                "importer.found",
                count = files.len(),
                size = HumanBytes(total)
            ))
            .green()
        );

        for file in files.iter().take(PREVIEW_COUNT) {
            println!(
                "  {} {} ({})",
                style("→").dim(),
                file.path.display(),
                HumanBytes(file.size)
            );
        }
        if files.len() > PREVIEW_COUNT {
            println!(
                "  {} {}",
                style("⋯").dim(),
                t!("common.and_more", count = files.len() - PREVIEW_COUNT)
            );
        }
        println!();
    }

    fn print_result(result: &ImportResult) {
        println!();
        println!("{}", style(t!("importer.result_title")).cyan().bold());
        println!(
            "  {}",
            style(t!(
                "importer.result_copied",
                count = result.copied,
                size = HumanBytes(result.bytes_copied)
            ))
            .green()
        );
        if result.verified > 0 {
            println!("  {}", t!("importer.result_verified", count = result.verified));
        }
        if result.skipped > 0 {
            println!(
                "  {}",
                style(t!("importer.result_skipped", count = result.skipped)).dim()
            );
        }
        if result.errors > 0 {
            println!(
                "  {}",
                style(t!("importer.result_errors", count = result.errors)).red()
            );
        }
        if result.cancelled {
            println!("  {}", style(t!("common.interrupted")).yellow());
        }

        info!(
            "素材匯入結束 - 複製: {}, 跳過: {}, 失敗: {}",
            result.copied, result.skipped, result.errors
        );
    }
}
