use super::event::WatchEvent;
use super::relocator::RelocationOptions;
use super::session::{WatchOptions, WatchSession};
use crate::component::prompt::prompt_directory;
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use anyhow::Result;
use console::style;
use dialoguer::Confirm;
use log::{info, warn};
use rust_i18n::t;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

const EVENT_WAIT: Duration = Duration::from_millis(200);

/// 監看期間的統計
#[derive(Debug, Default)]
struct WatchSummary {
    detected: usize,
    relocated: usize,
    errors: usize,
}

/// 匯出資料夾監看元件
pub struct ExportWatcher {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl ExportWatcher {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!("{}", style(t!("watcher.title")).cyan().bold());

        let settings = &self.config.settings;
        let Some(watch_dir) = prompt_directory(
            &t!("watcher.prompt_watch_dir"),
            &settings.export_watcher.watch_dir,
            &settings.recent_paths,
        )?
        else {
            return Ok(());
        };
        let Some(dest_dir) = prompt_directory(
            &t!("watcher.prompt_dest_dir"),
            &settings.master_path,
            &settings.recent_paths,
        )?
        else {
            return Ok(());
        };

        let relocation = RelocationOptions {
            rename_with_timestamp: Confirm::new()
                .with_prompt(t!("watcher.prompt_rename"))
                .default(settings.export_watcher.rename_with_timestamp)
                .interact()?,
            use_dated_subfolder: Confirm::new()
                .with_prompt(t!("watcher.prompt_dated"))
                .default(settings.export_watcher.use_dated_subfolder)
                .interact()?,
        };
        let options = WatchOptions {
            relocation,
            poll_interval: settings.export_watcher.poll_interval(),
            error_backoff: settings.export_watcher.error_backoff(),
        };

        let (mut session, events) =
            WatchSession::start(Path::new(&watch_dir), Path::new(&dest_dir), options)?;

        self.remember_choices(&watch_dir, &dest_dir, relocation);

        println!(
            "{}",
            style(t!(
                "watcher.started",
                source = session.source().display(),
                destination = session.destination().display()
            ))
            .green()
        );
        println!("{}", style(t!("watcher.stop_hint")).dim());

        let summary = self.pump_events(&session, &events);
        session.wait();

        // 中斷信號只用來結束這次監看，返回選單後繼續使用
        self.shutdown_signal.store(false, Ordering::SeqCst);

        Self::print_summary(&summary);
        Ok(())
    }

    /// 顯示事件直到監看結束；收到中斷信號時要求停止
    fn pump_events(&self, session: &WatchSession, events: &Receiver<WatchEvent>) -> WatchSummary {
        let mut summary = WatchSummary::default();

        loop {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                session.stop();
            }

            match events.recv_timeout(EVENT_WAIT) {
                Ok(WatchEvent::Stopped) | Err(RecvTimeoutError::Disconnected) => break,
                Ok(event) => Self::print_event(&event, &mut summary),
                Err(RecvTimeoutError::Timeout) => {}
            }
        }

        summary
    }

    fn print_event(event: &WatchEvent, summary: &mut WatchSummary) {
        let now = chrono::Local::now().format("%H:%M:%S");
        match event {
            WatchEvent::Started { existing_files, .. } => {
                println!(
                    "[{now}] {}",
                    t!("watcher.existing_files", count = existing_files)
                );
            }
            WatchEvent::FileDetected(path) => {
                summary.detected += 1;
                println!(
                    "[{now}] {} {}",
                    style("+").cyan(),
                    t!("watcher.detected", name = file_name(path))
                );
            }
            WatchEvent::FileRelocated(record) => {
                summary.relocated += 1;
                println!(
                    "[{now}] {} {}",
                    style("→").green(),
                    t!(
                        "watcher.relocated",
                        name = file_name(&record.source),
                        destination = record.destination.display()
                    )
                );
            }
            WatchEvent::Error(e) => {
                summary.errors += 1;
                println!("[{now}] {} {e}", style("✗").red());
            }
            WatchEvent::Stopped => {}
        }
    }

    fn remember_choices(&mut self, watch_dir: &str, dest_dir: &str, relocation: RelocationOptions) {
        let settings = &mut self.config.settings;
        settings.export_watcher.watch_dir = watch_dir.to_string();
        settings.export_watcher.rename_with_timestamp = relocation.rename_with_timestamp;
        settings.export_watcher.use_dated_subfolder = relocation.use_dated_subfolder;
        add_recent_path(settings, dest_dir);
        add_recent_path(settings, watch_dir);

        if let Err(e) = save_settings(settings) {
            warn!("無法儲存監看設定: {e}");
        }
    }

    fn print_summary(summary: &WatchSummary) {
        println!();
        println!("{}", style(t!("watcher.summary_title")).cyan().bold());
        println!("  {}", t!("watcher.summary_detected", count = summary.detected));
        println!(
            "  {}",
            style(t!("watcher.summary_relocated", count = summary.relocated)).green()
        );
        if summary.errors > 0 {
            println!(
                "  {}",
                style(t!("watcher.summary_errors", count = summary.errors)).red()
            );
        }

        info!(
            "監看結束 - 偵測: {}, 搬移: {}, 錯誤: {}",
            summary.detected, summary.relocated, summary.errors
        );
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
