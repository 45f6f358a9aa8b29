// src/main.rs

//! The main entry point for the botlink remote-control client.

use anyhow::Result;
use botlink::config::Config;
use botlink::connection::{Session, SessionOptions};
use botlink::console;
use std::env;
use tokio::sync::mpsc;
use tracing::error;
use tracing_subscriber::{filter::EnvFilter, prelude::*};

const USAGE: &str = "\
Usage: botlink [--config <file>] [--host <host>] [--port <port>]
       botlink --version";

#[tokio::main]
async fn main() -> Result<()> {
    const VERSION: &str = env!("BOTLINK_BUILD_VERSION");

    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "--version") {
        println!("botlink version {VERSION}");
        return Ok(());
    }
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        println!("{USAGE}");
        return Ok(());
    }

    let config_path = flag_value(&args, "--config");
    let mut config = match Config::load(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {e:#}");
            std::process::exit(1);
        }
    };

    // Command-line flags win over the configuration file.
    if let Some(host) = flag_value(&args, "--host") {
        config.host = host.to_string();
    }
    if let Some(port_str) = flag_value(&args, "--port") {
        match port_str.parse::<u16>() {
            Ok(port) if port != 0 => config.port = port,
            _ => {
                eprintln!("Invalid port number: {port_str}");
                std::process::exit(1);
            }
        }
    }

    // Logs go to stderr; stdout belongs to the robot's messages.
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| config.log_level.clone());
    tracing_subscriber::registry()
        .with(EnvFilter::new(log_level))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_ansi(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(console::print_messages(rx));
    let session = Session::with_options(tx, SessionOptions::from(&config));

    println!("Starting robot controller...");
    match session.connect(&config.host, config.port).await {
        Ok(peer) => println!("Connected to {} ({peer})", config.host),
        Err(e) => {
            eprintln!("Connection failed: {e}");
            eprintln!("Make sure the simulator is running.");
            std::process::exit(1);
        }
    }

    let result = console::run(&session, &config).await;
    session.disconnect().await;
    println!("Disconnected.");

    // Dropping the session drops the last sender, which ends the printer.
    drop(session);
    let _ = printer.await;

    if let Err(e) = &result {
        error!("Console error: {:#}", e);
    }
    result
}

/// Returns the value following `flag`, if both are present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
