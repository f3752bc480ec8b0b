use clap::Parser;
use tracing_subscriber::EnvFilter;

use contam_screen::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("contam_screen=debug,info")
    } else {
        EnvFilter::new("contam_screen=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Screen(args) => {
            cli::screen::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Similarity(args) => {
            cli::similarity::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
