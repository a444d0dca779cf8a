mod app;
mod config;
mod fish;
mod food;
mod input;
mod math;
mod render;
mod scene;
mod tank;

use anyhow::{Context, Result};
use std::path::Path;

fn main() -> Result<()> {
    let opts = config::options_from_env();
    if opts.help {
        print!("{}", config::USAGE);
        return Ok(());
    }

    let paths = config::project_paths()?;
    let settings = config::load_settings(&paths.settings_path);
    let log_path = settings
        .log_file
        .clone()
        .unwrap_or_else(|| paths.log_path.clone());
    init_logging(&log_path, settings.level_filter())
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    app::run(opts, settings, paths)
}

// The terminal belongs to the renderer, so logs only ever go to a file.
fn init_logging(path: &Path, level: log::LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {} {} {}",
                chrono::Local::now().format("%H:%M:%S%.6f"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(level)
        .chain(fern::log_file(path)?)
        .apply()?;
    Ok(())
}
