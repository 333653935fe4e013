//! Interactive command handling

use crate::parser::parse_add_command;
use std::sync::Arc;
use tracing::{debug, error};
use transferq_engine::TransferManager;

/// Lines printed before every prompt
pub const MENU: [&str; 3] = [
    "add sourcedirectory destinationdirectory",
    "status",
    "exit",
];

/// Executes one line of user input against a [`TransferManager`]
#[derive(Debug, Clone)]
pub struct CommandsProcessor {
    manager: Arc<TransferManager>,
}

impl CommandsProcessor {
    /// Create a processor driving `manager`
    pub fn new(manager: Arc<TransferManager>) -> Self {
        Self { manager }
    }

    /// Run `line`, returning whether the session is over and the text to show
    pub async fn execute(&self, line: &str) -> (bool, String) {
        let line = line.trim();
        if line.is_empty() {
            return (false, "No Command".to_string());
        }

        let (keyword, arguments) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(keyword, rest)| (keyword, rest.trim()));
        debug!("Command '{}' with arguments '{}'", keyword, arguments);

        if keyword.eq_ignore_ascii_case("add") {
            return match parse_add_command(arguments) {
                Ok((source, destination)) => {
                    let message = format!("Copying data from '{source}' to '{destination}'");
                    self.manager.submit(source, destination);
                    (false, message)
                }
                Err(e) => {
                    debug!("Rejected add arguments: {}", e);
                    unknown()
                }
            };
        }

        if !arguments.is_empty() {
            return unknown();
        }

        if keyword.eq_ignore_ascii_case("status") {
            (false, self.status().await)
        } else if keyword.eq_ignore_ascii_case("exit") {
            if let Err(e) = self.manager.stop().await {
                error!("Failed to stop cleanly: {}", e);
            }
            (true, "Exited".to_string())
        } else {
            unknown()
        }
    }

    async fn status(&self) -> String {
        let records = self.manager.list_all().await;
        let lines: Vec<String> = records.iter().map(ToString::to_string).collect();
        format!("Copy Status:\n{}", lines.join("\n"))
    }
}

fn unknown() -> (bool, String) {
    (false, "Unknown Command".to_string())
}
