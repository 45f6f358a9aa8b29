// src/console.rs

//! The interactive prompt driven by the `botlink` binary.
//!
//! Input interpretation is kept separate from I/O so it can be tested on
//! its own; [`run`] wires it to stdin, stdout and a [`Session`].

use crate::config::Config;
use crate::connection::Session;
use crate::core::grammar::{self, Command, GrammarError, SpecialCommand};
use crate::core::protocol::{MessageKind, ServerMessage};
use crate::core::SessionError;
use anyhow::Result;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

pub const BANNER: &str = "\
============================================================
 ROBOT REMOTE CONTROL
============================================================
Enter commands as XF;YB;ZL;WR

  F = forward    B = backward    L = left    R = right
  X, Y, Z, W = distances (decimals allowed, e.g. 2.5F)

Examples:
  10F          move forward 10 units
  10F;5R       forward 10, then right 5
  23B;7L;8R    back 23, left 7, right 8

Special commands:
  stop     stop the robot and clear its queue
  status   show the current position
  help     show this help
  quit     leave
============================================================";

pub const HELP: &str = "\
Format: XF;YB;ZL;WR
Examples:
  5F       forward 5 units
  3B       back 3 units
  2L       left 2 units
  4R       right 4 units
  10F;5R   forward 10 + right 5
  8B;3L    back 8 + left 3";

pub const FORMAT_HINT: &str = "Use: XF;YB;ZL;WR (e.g. 10F;5R). Type 'help' for more examples.";

/// What the prompt should do with one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    /// Blank input.
    Skip,
    ShowHelp,
    /// Send `quit` to the server and leave.
    Quit,
    Send(Command),
    Invalid(GrammarError),
}

/// Interprets one line typed at the prompt.
pub fn interpret(line: &str) -> InputAction {
    let line = line.trim();
    if line.is_empty() {
        return InputAction::Skip;
    }
    if ["exit", "q"].iter().any(|word| line.eq_ignore_ascii_case(word)) {
        return InputAction::Quit;
    }
    match grammar::parse(line) {
        Ok(command) if command.is_special(SpecialCommand::Help) => InputAction::ShowHelp,
        Ok(command) if command.is_special(SpecialCommand::Quit) => InputAction::Quit,
        Ok(command) => InputAction::Send(command),
        Err(e) => InputAction::Invalid(e),
    }
}

/// Formats a server line for the terminal.
pub fn render(message: &ServerMessage) -> String {
    let marker = match message.kind() {
        MessageKind::Error => "!!",
        MessageKind::Status => "@@",
        _ => "<<",
    };
    format!("{marker} {message}")
}

/// Prints every server line until the session (and with it the last sender)
/// goes away.
pub async fn print_messages(mut rx: mpsc::UnboundedReceiver<ServerMessage>) {
    while let Some(message) = rx.recv().await {
        println!("{}", render(&message));
    }
}

/// Runs the prompt over a connected session until the user quits, stdin
/// ends, Ctrl-C is pressed, or the server goes away.
pub async fn run(session: &Session, config: &Config) -> Result<()> {
    tokio::time::sleep(config.welcome_delay).await;
    println!("{BANNER}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if !session.is_connected() {
            println!("Connection closed by the server.");
            break;
        }
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!("\nLeaving...");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            println!("\nLeaving...");
            break;
        };

        match interpret(&line) {
            InputAction::Skip => {}
            InputAction::ShowHelp => println!("{HELP}"),
            InputAction::Quit => {
                if let Err(e) = session
                    .send_command(&Command::Special(SpecialCommand::Quit))
                    .await
                {
                    debug!("quit was not delivered: {}", e);
                }
                break;
            }
            InputAction::Send(command) => match session.send_command(&command).await {
                Ok(()) => tokio::time::sleep(config.command_pause).await,
                Err(e @ (SessionError::NotConnected | SessionError::SendFailed(_))) => {
                    eprintln!("Error: {e}");
                    break;
                }
                Err(e) => eprintln!("Error: {e}"),
            },
            InputAction::Invalid(e) => {
                eprintln!("Invalid format: {e}");
                eprintln!("{FORMAT_HINT}");
            }
        }
    }
    Ok(())
}
