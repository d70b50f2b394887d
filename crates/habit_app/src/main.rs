use clap::Parser;
use habit_app::app::{run, AppConfig};
use habit_app::cli::{Cli, Command};

fn main() {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(mut config) => match config.apply_cli(&cli) {
            Ok(()) => config,
            Err(err) => {
                eprintln!("{err:#}");
                std::process::exit(2);
            }
        },
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(2);
        }
    };

    let command = cli.command.unwrap_or(Command::List);
    let mut stdout = std::io::stdout().lock();
    if let Err(err) = run(config, command, &mut stdout) {
        eprintln!("habits: {err:#}");
        std::process::exit(1);
    }
}
