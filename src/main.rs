use clap::Parser;
use twig::cli::Cli;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = twig::tui::run(cli.save_file, cli.config_file) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
