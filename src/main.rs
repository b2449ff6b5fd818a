use anyhow::Result;
use console::{Term, style};
use log::{info, warn};
use rust_i18n::t;
use video_workflow::config::types::Config;
use video_workflow::init;
use video_workflow::menu::show_main_menu;
use video_workflow::signal::setup_shutdown_signal;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

fn main() -> Result<()> {
    // Load config first: logging level and target come from settings
    let mut config = Config::new()?;
    init::init(&config.settings.logging)?;

    let language = config.settings.language.as_str();
    rust_i18n::set_locale(language);
    info!("程式啟動，語言: {language}");

    let term = Term::stdout();
    let shutdown_signal = setup_shutdown_signal()?;

    loop {
        match show_main_menu(&term, &shutdown_signal, &mut config) {
            Ok(true) => {}
            Ok(false) => {
                term.clear_screen()?;
                println!("\n{}", style(t!("main_menu.goodbye")).green().bold());
                info!("Program exited normally");
                break;
            }
            Err(e) => {
                warn!("Program error: {e}");
                eprintln!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
                break;
            }
        }
    }

    Ok(())
}
