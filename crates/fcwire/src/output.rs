use std::io::IsTerminal;

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Text
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct ReplyOutput<'a> {
    command: &'a str,
    payload: Option<&'a str>,
    notifications: &'a [String],
}

/// Print one command's outcome: its reply payload and any notifications
/// that arrived while it ran.
pub fn print_reply(command: &str, payload: Option<&str>, notifications: &[String], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                command,
                payload,
                notifications,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Text => {
            match payload {
                Some(payload) => println!("{payload}"),
                None => println!("(no payload)"),
            }
            for name in notifications {
                println!("notification: {name}");
            }
        }
    }
}
