use crate::component::{ExportWatcher, FolderStructureCreator, SdImporter};
use crate::config::Config;
use crate::pause;
use anyhow::Result;
use console::{Term, style};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

// 元件會自行儲存設定，結束後重新載入讓選單看到最新值

pub fn run_export_watcher(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut watcher = ExportWatcher::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = watcher.run() {
        eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
    }

    *config = Config::new()?;
    pause(term)?;
    Ok(())
}

pub fn run_sd_importer(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut importer = SdImporter::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = importer.run() {
        eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
    }

    *config = Config::new()?;
    pause(term)?;
    Ok(())
}

pub fn run_folder_structure(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<()> {
    let mut creator = FolderStructureCreator::new(config.clone(), Arc::clone(shutdown_signal));

    if let Err(e) = creator.run() {
        eprintln!("{} {:#}", style(t!("common.error_prefix")).red().bold(), e);
    }

    *config = Config::new()?;
    pause(term)?;
    Ok(())
}

pub fn run_media_list(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    SdImporter::new(config.clone(), Arc::clone(shutdown_signal)).list_media();

    pause(term)?;
    Ok(())
}
