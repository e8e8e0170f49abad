//! The dashboard console: a line-oriented control surface that toggles the
//! assistant, edits the wake word, and renders status messages.

use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use neon_core::status::StatusMessage;
use neon_listener::SessionState;
use neon_storage::{Account, AccountRepository};

use crate::AppResult;

const HELP: &str = "\
Commands:
  on              start listening for the wake word
  off             stop listening
  status          show the current status
  profile         show your profile
  clear           reset the status line
  wake <phrase>   change the wake word
  help            show this list
  quit            exit Neon";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    On,
    Off,
    Status,
    Profile,
    Clear,
    Wake(String),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match head.to_lowercase().as_str() {
            "" => ConsoleCommand::Empty,
            "on" | "start" => ConsoleCommand::On,
            "off" | "stop" => ConsoleCommand::Off,
            "status" => ConsoleCommand::Status,
            "profile" => ConsoleCommand::Profile,
            "clear" => ConsoleCommand::Clear,
            "wake" if !rest.is_empty() => ConsoleCommand::Wake(rest.to_string()),
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            _ => ConsoleCommand::Unknown(line.to_string()),
        }
    }
}

/// Render a status message; active ones are highlighted.
pub fn render_status(message: &StatusMessage) -> String {
    if message.active {
        format!("\x1b[1;36m● {}\x1b[0m", message.text)
    } else {
        format!("\x1b[2m○ {}\x1b[0m", message.text)
    }
}

fn render_profile(account: &Account, wake_word: &str) -> String {
    let age = account
        .age
        .map(|a| a.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "Name:        {}\nEmail:       {}\nAge:         {}\nOccupation:  {}\n{:<13}{}\nWake word:   {}",
        account.full_name(),
        account.email,
        age,
        account.occupation,
        format!("{}:", account.occupation.organization_label()),
        account.organization,
        wake_word
    )
}

/// Read stdin lines on a plain thread. Tokio's own stdin blocks runtime
/// shutdown until the next newline, so the reader is detached instead and
/// dies with the process.
pub fn spawn_stdin_reader() -> AppResult<mpsc::UnboundedReceiver<String>> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::Builder::new()
        .name("neon-stdin".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}

/// Print every status change until the board is dropped.
pub async fn print_status(mut rx: watch::Receiver<StatusMessage>) {
    while rx.changed().await.is_ok() {
        let message = rx.borrow_and_update().clone();
        println!("{}", render_status(&message));
    }
}

/// State the console operates on.
pub struct Console {
    pub session: Arc<SessionState>,
    pub repo: AccountRepository,
    pub account: Account,
    pub latest: watch::Receiver<StatusMessage>,
}

impl Console {
    /// Apply one command. Returns `false` when the console should exit.
    pub fn apply(&mut self, command: ConsoleCommand) -> AppResult<bool> {
        match command {
            ConsoleCommand::On => self.session.set_enabled(true),
            ConsoleCommand::Off => self.session.set_enabled(false),
            ConsoleCommand::Status => {
                let state = if self.session.is_enabled() { "on" } else { "off" };
                println!(
                    "Assistant {state} ({}), wake word '{}'",
                    self.session.phase(),
                    self.session.wake_word()
                );
                println!("{}", render_status(&self.latest.borrow()));
            }
            ConsoleCommand::Profile => {
                println!("{}", render_profile(&self.account, &self.session.wake_word()));
            }
            ConsoleCommand::Clear => self.session.clear_status(),
            ConsoleCommand::Wake(phrase) => match self.repo.update_wake_word(self.account.id, &phrase) {
                Ok(stored) => {
                    self.session.set_wake_word(&stored)?;
                    self.account.wake_word = stored.clone();
                    println!("Wake word set to '{stored}'.");
                }
                Err(e) => println!("Could not update wake word: {e}"),
            },
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Ok(false),
            ConsoleCommand::Empty => {}
            ConsoleCommand::Unknown(line) => {
                println!("Unknown command '{line}'. Type 'help' for a list.");
            }
        }
        Ok(true)
    }

    /// Apply input lines until `quit`, end of input, or Ctrl-C.
    pub async fn run(&mut self, mut lines: mpsc::UnboundedReceiver<String>) -> AppResult<()> {
        println!("{HELP}\n");
        loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else { break };
                    if !self.apply(ConsoleCommand::parse(&line))? {
                        break;
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted");
                    break;
                }
            }
        }
        Ok(())
    }
}
