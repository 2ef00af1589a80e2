use anyhow::Context;
use clap::Parser;
use log::{debug, error, info, warn};
use nova::config::{default_config_path, ConfigManager};
use nova::launcher::Launcher;
use nova::plugins::load_plugins;
use nova::sidebar::Sidebar;
use nova::windows::builtin_candidates;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// How often open windows are polled while no input arrives
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Command-line arguments for the Nova launcher
#[derive(Parser)]
#[command(
    name = "nova",
    about = "Nova - a sidebar launcher for chat and utility plugins",
    long_about = "A sidebar launcher that opens plugin windows: a chat assistant backed by a \
                  configurable language model provider, a settings window, and placeholder \
                  tools. Windows are driven from the terminal."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (JSON, default: config/config.json)"
    )]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(
        short,
        long,
        help = "Enable verbose logging output (sets RUST_LOG=debug)"
    )]
    verbose: bool,
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// A missing configuration file is fine (defaults are used and the file
    /// is created on the first save). An existing path must be a file.
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            if config_path.exists() {
                if !config_path.is_file() {
                    return Err(format!(
                        "Configuration path is not a file: {}",
                        config_path.display()
                    ));
                }

                if config_path.extension().map_or(true, |ext| ext != "json") {
                    warn!(
                        "Configuration file does not have .json extension: {}",
                        config_path.display()
                    );
                }
            }
        }

        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_config_path)
    }
}

/// Messages delivered to the UI loop
#[derive(Debug)]
enum UiMessage {
    Line(String),
    InputClosed,
    Interrupt,
}

fn spawn_stdin_reader(sender: Sender<UiMessage>) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.send(UiMessage::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        error!("Failed to read input: {}", e);
                        break;
                    }
                }
            }
            let _ = sender.send(UiMessage::InputClosed);
        })
}

fn print_all(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "debug");
    }
    env_logger::init();

    info!("Starting Nova");

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    let config = ConfigManager::new(cli.config_path()).into_shared();
    let plugins = load_plugins(&builtin_candidates());
    let mut launcher = Launcher::new(Sidebar::new(plugins, config));

    let (sender, receiver) = mpsc::channel();

    let interrupt = sender.clone();
    ctrlc::set_handler(move || {
        info!("Received interrupt signal (SIGINT), shutting down...");
        if let Err(e) = interrupt.send(UiMessage::Interrupt) {
            error!("Failed to send shutdown signal: {}", e);
        }
    })
    .context("Error setting SIGINT handler")?;

    spawn_stdin_reader(sender).context("Failed to start input thread")?;

    println!("{}", launcher.banner());

    while launcher.is_running() {
        match receiver.recv_timeout(TICK_INTERVAL) {
            Ok(UiMessage::Line(line)) => print_all(&launcher.handle_line(&line)),
            Ok(UiMessage::InputClosed) | Ok(UiMessage::Interrupt) => {
                debug!("Input finished, quitting");
                print_all(&launcher.handle_line("quit"));
                break;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if let Some(rendered) = launcher.tick(Instant::now()) {
            println!("{}", rendered);
        }
    }

    info!("Nova shutdown complete");
    Ok(())
}
