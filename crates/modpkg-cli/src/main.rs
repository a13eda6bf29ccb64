use clap::Parser;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(
    name = "modpkg",
    about = "Build distributable .mods content packages from a declarative build config",
    version,
    long_about = "Reads a build config describing source packages, rebuilds the ones whose \
                  content changed since the last run, and assembles each into a .mods container \
                  (header, optional obfuscated key, compressed archive payload). Optionally \
                  emits an index.json with checksums for distribution."
)]
struct Cli {
    /// Path to the build config
    #[arg(short = 'i', long = "input")]
    input: PathBuf,

    /// Output directory for the packages
    #[arg(short = 'o', long = "out")]
    out: PathBuf,

    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .init();

    let summary = modpkg_build::run(&cli.input, &cli.out)?;

    println!(
        "{} package(s) processed: {} built, {} up to date",
        summary.definitions, summary.built, summary.skipped
    );

    Ok(())
}
