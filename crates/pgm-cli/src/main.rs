use clap::Parser;
use pgm_cli::cli::{Cli, Commands};
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod commands;

use commands::{completions, inspect, parse, schema};

fn main() {
    let cli = Cli::parse();

    // stdout carries command output; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let result = match &cli.command {
        Commands::Inspect { file, format } => inspect::handle(file, *format),
        Commands::Parse {
            file,
            components,
            format,
            out,
        } => parse::handle(file, components, *format, out.as_deref()),
        Commands::Schema {
            dataset,
            component,
            format,
        } => schema::handle(dataset.as_deref(), component.as_deref(), *format),
        Commands::Completions { shell, out } => completions::handle(*shell, out.as_deref()),
    };

    if let Err(e) = result {
        error!("{e:?}");
        std::process::exit(1);
    }
}
