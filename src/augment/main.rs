use augment::api::Augment;
use augment::cancel::CancellationToken;
use augment::dispatch::{CommandTable, Console};
use augment::error::{AugmentError, Result};
use augment::layout::PathLayout;
use augment::logging;
use clap::error::{ContextKind, ErrorKind};
use clap::Parser;
use colored::*;
use serde::Serialize;
use std::io;

mod args;
use args::{Cli, Commands, USAGE};

const DEFAULT_FLARE: &str = "Test flare";

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = parse_cli();
    let layout = PathLayout::new(&cli.root);
    let log = logging::dispatch(&layout, cli.verbose)?;
    let augment = Augment::open(layout, log)?;
    let cancel = CancellationToken::new();
    install_interrupt(&cancel)?;

    match cli.command {
        Some(Commands::Health) => print_json(&augment.health()),
        Some(Commands::Monitor) => {
            augment.monitor(&cancel);
            Ok(())
        }
        Some(Commands::Listen) => augment.listen(&cancel),
        Some(Commands::Flare { message, severity }) => {
            let message = if message.is_empty() {
                DEFAULT_FLARE.to_string()
            } else {
                message.join(" ")
            };
            let flare = augment.flare(message, severity)?;
            println!(
                "{}",
                format!("Flare deployed [{}]: {}", flare.severity, flare.message).green()
            );
            Ok(())
        }
        Some(Commands::Probe { target, kind }) => print_json(&augment.probe(&target, &kind)?),
        Some(Commands::Status) => {
            print!("{}", augment.status());
            Ok(())
        }
        None => handle_interactive(&augment, &cancel),
    }
}

/// Parse arguments. An unknown subcommand prints the usage line and exits 1.
fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.kind() == ErrorKind::InvalidSubcommand => {
            let name = e
                .get(ContextKind::InvalidSubcommand)
                .map(|v| v.to_string())
                .unwrap_or_default();
            println!("{}", format!("Unknown command: {}", name).red());
            println!("{}", USAGE);
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    }
}

fn handle_interactive(augment: &Augment, cancel: &CancellationToken) -> Result<()> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let mut console = Console::new(&mut input, &mut output, cancel.clone());
    CommandTable::standard().run(augment, &mut console)
}

/// First Ctrl-C cancels the running loop, a second one exits immediately.
fn install_interrupt(cancel: &CancellationToken) -> Result<()> {
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        if token.is_cancelled() {
            std::process::exit(130);
        }
        eprintln!("{}", "\nInterrupt received, stopping (Ctrl-C again to force)".yellow());
        token.cancel();
    })
    .map_err(|e| AugmentError::Interrupt(e.to_string()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
