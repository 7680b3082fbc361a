//! mctop - top-style monitor for a cluster of cache servers.
//!
//! Usage:
//!   mctop                           # one snapshot of localhost:11211
//!   mctop -H cache-01,cache-02 -s 2 # interactive, refresh every 2 seconds
//!   mctop -H web:8000-8004 -s 1 -r  # plain text output every second
//!   mctop cluster.yml -e staging -v host -s 5

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use mctop::collector::TcpStatsSource;
use mctop::config::{self, ConfigError, Options};
use mctop::tui::{App, DEFAULT_COLS, DEFAULT_ROWS};
use mctop::view::Mode;

/// Environment variable holding a log filter directive.
const LOG_ENV: &str = "MCTOP_LOG";

/// Top-style monitor for a cluster of cache servers.
#[derive(Parser)]
#[command(name = "mctop", about = "Cache cluster monitor", version)]
struct Args {
    /// YAML cluster config. Replaces --host when given.
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Comma-separated host:port list; ports may be ranges (host:8000-8004).
    #[arg(short = 'H', long = "host", value_name = "LIST", default_value_t = config::default_host())]
    host: String,

    /// Environment to read from the config file.
    #[arg(short, long, default_value = "production")]
    env: String,

    /// Shortcut for --env development.
    #[arg(short = 'D', long)]
    dev: bool,

    /// Poll interval in seconds; 0 prints once and exits.
    #[arg(short, long, value_name = "SECONDS", default_value = "0")]
    sleep: u64,

    /// Plain output: no colors, no cursor control, no raw mode.
    #[arg(short, long)]
    raw: bool,

    /// Initial view.
    #[arg(short, long, value_enum, default_value_t = Mode::Slab)]
    view: Mode,

    /// Per-host connect and read timeout in milliseconds.
    #[arg(short, long, value_name = "MS", default_value = "1000")]
    timeout: u64,

    /// Write logs to this file.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// More log output (repeat for debug).
    #[arg(long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn log_level(&self) -> Level {
        match (self.quiet, self.verbose) {
            (true, _) => Level::ERROR,
            (false, 0) => Level::WARN,
            (false, 1) => Level::INFO,
            _ => Level::DEBUG,
        }
    }

    fn resolve(&self) -> Result<Options, ConfigError> {
        let env = if self.dev { "development" } else { &self.env };
        let endpoints = match &self.config {
            Some(path) => config::load_cluster_config(path, env)?,
            None => config::parse_host_list(&self.host)?,
        };
        let options = Options {
            endpoints,
            interval: Duration::from_secs(self.sleep),
            plain: self.raw,
            mode: self.view,
            timeout: Duration::from_millis(self.timeout),
        };
        options.validate()?;
        Ok(options)
    }
}

/// Installs the subscriber. The interactive screen owns the terminal, so
/// without a log file nothing is installed there.
fn init_logging(args: &Args, interactive: bool) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("mctop={}", args.log_level())));

    match &args.log_file {
        Some(path) => {
            let file = File::options().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None if !interactive => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        None => {}
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let options = match args.resolve() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let single_shot = options.single_shot();
    let plain = options.plain;
    let interactive = !single_shot && !plain;
    if let Err(e) = init_logging(&args, interactive) {
        eprintln!("Error: cannot open log file: {}", e);
        std::process::exit(1);
    }

    // SIGINT/SIGTERM end the looping modes at the next poll slice, so the
    // interactive session guard gets to restore the terminal.
    let stop = Arc::new(AtomicBool::new(false));
    if !single_shot {
        let handler_stop = Arc::clone(&stop);
        if let Err(e) = ctrlc::set_handler(move || handler_stop.store(true, Ordering::Relaxed)) {
            eprintln!("Error: cannot install signal handler: {}", e);
            std::process::exit(1);
        }
    }

    let source = TcpStatsSource::new(options.timeout);
    let mut app = App::new(source, options.endpoints, options.mode, options.interval);

    if interactive {
        if let Err(e) = app.run(&stop) {
            eprintln!("Error running TUI: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let (cols, rows) = crossterm::terminal::size().unwrap_or((DEFAULT_COLS, DEFAULT_ROWS));
    app.resize(cols, rows);
    let mut stdout = std::io::stdout().lock();

    let result = if single_shot {
        app.run_once(&mut stdout, !plain)
    } else {
        app.run_plain(&mut stdout, &stop)
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_host_list_and_modes() {
        let args = Args::try_parse_from(["mctop", "-H", "a:8000-8001", "-s", "2", "-r", "-v", "host"])
            .unwrap();
        let options = args.resolve().unwrap();
        assert_eq!(options.endpoints.len(), 2);
        assert_eq!(options.interval, Duration::from_secs(2));
        assert!(options.plain);
        assert!(!options.single_shot());
        assert_eq!(options.mode, Mode::Host);
        assert_eq!(args.log_level(), Level::WARN);
    }

    #[test]
    fn defaults_to_single_shot_on_localhost() {
        let args = Args::try_parse_from(["mctop", "--verbose", "--verbose"]).unwrap();
        let options = args.resolve().unwrap();
        assert!(options.single_shot());
        assert_eq!(options.endpoints[0].to_string(), "localhost:11211");
        assert_eq!(options.timeout, Duration::from_millis(1000));
        assert_eq!(args.log_level(), Level::DEBUG);
    }

    #[test]
    fn empty_host_list_is_fatal() {
        let args = Args::try_parse_from(["mctop", "-H", ","]).unwrap();
        assert!(matches!(args.resolve(), Err(ConfigError::NoHosts)));
    }
}
