use clap::Parser;
use colored::{control::set_override, Colorize};
use is_terminal::IsTerminal;

use drone_slack::cli::Cli;
use drone_slack::error::NotifyError;
use drone_slack::logging;

fn main() {
    // Respect NO_COLOR environment variable (https://no-color.org/)
    // Also disable colors when stderr is not a terminal
    if std::env::var("NO_COLOR").is_ok() || !std::io::stderr().is_terminal() {
        set_override(false);
    }

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), NotifyError> {
    let plugin = cli.to_plugin()?;

    if cli.dry_run {
        let payload = plugin.payload()?;
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    plugin.exec()
}
