use std::fs;

use anyhow::{Context as _, Result};
use clap::Parser;
use next_static_context::config::Config;
use next_static_context::logger::init_logger;
use next_static_context::transform_code;
use tracing::{debug, info};

mod cli;

fn main() -> Result<()> {
    init_logger();

    let cli = cli::Cli::parse();
    debug!("cli: {:?}", cli);
    let root = if cli.root.is_absolute() {
        cli.root.clone()
    } else {
        std::env::current_dir()?.join(&cli.root)
    };

    let mut config = Config::new(&root, cli.config.as_deref())?;
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Some(export_name) = cli.export_name {
        config.export_name = export_name;
    }
    if cli.max_passes.is_some() {
        config.max_passes = cli.max_passes;
    }
    config.minify |= cli.minify;
    debug!("config: {:?}", config);

    let path = cli.file.to_string_lossy().to_string();
    let code = fs::read_to_string(&cli.file).with_context(|| format!("failed to read {}", path))?;
    let mode = config.mode;
    let output = transform_code(&path, code, config)?;

    match cli.output {
        Some(out) => {
            fs::write(&out, output)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!("{} ({}) -> {}", path, mode, out.display());
        }
        None => print!("{}", output),
    }
    Ok(())
}
