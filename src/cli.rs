use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "twig",
    about = "A keyboard-driven outliner for plain-text nested lists",
    version
)]
pub struct Cli {
    /// Outline file to open (defaults to ~/.twig/outline)
    pub save_file: Option<PathBuf>,

    /// Read settings from a different config file
    #[arg(long = "config-file")]
    pub config_file: Option<PathBuf>,
}
