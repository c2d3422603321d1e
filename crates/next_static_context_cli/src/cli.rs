use std::path::PathBuf;

use clap::Parser;
use next_static_context::config::Mode;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Page module to transform.
    pub file: PathBuf,
    /// Directory holding `static-context.config.json`.
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,
    /// Inline JSON config, layered over the config file.
    #[arg(short, long)]
    pub config: Option<String>,
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,
    #[arg(long)]
    pub export_name: Option<String>,
    #[arg(long)]
    pub max_passes: Option<usize>,
    #[arg(long)]
    pub minify: bool,
    /// Write the result here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
