use clap::Parser;
use manifest_expr::app::{handle_fatal_error, init_logging, AppConfig};
use manifest_expr::cli::{execute_command, Cli};

fn main() {
    let cli = Cli::parse();

    let config = AppConfig::new(cli.verbose);
    init_logging(&config);

    if let Err(e) = execute_command(cli.command) {
        handle_fatal_error(e, config.verbose);
    }
}
