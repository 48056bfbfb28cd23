use anyhow::{Context, Result};
use std::io::{self, Write};
use tracing::error;

use crate::render::render;
use crate::session::{ChatBackend, ChatSession};

const EXIT_KEYWORD: &str = "quit";

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineAction {
    Quit,
    Skip,
    Send(String),
}

/// Classifies one raw console line. Only the line terminator is stripped;
/// the exit keyword match is case-insensitive and an exact empty line is
/// skipped without an exchange.
fn classify_line(raw: &str) -> LineAction {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.eq_ignore_ascii_case(EXIT_KEYWORD) {
        LineAction::Quit
    } else if line.is_empty() {
        LineAction::Skip
    } else {
        LineAction::Send(line.to_string())
    }
}

pub async fn run_repl<B: ChatBackend>(session: &mut ChatSession<'_, B>) -> Result<()> {
    println!("Your conversational AI is ready. Type 'quit' to exit.");

    loop {
        print!("You: ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = match io::stdin().read_line(&mut input) {
            Ok(read) => read,
            Err(err) => {
                error!(error = %err, "error reading input");
                break;
            }
        };
        if read == 0 {
            break;
        }

        match classify_line(&input) {
            LineAction::Quit => {
                println!("Goodbye!");
                break;
            }
            LineAction::Skip => continue,
            LineAction::Send(line) => {
                // Instant feedback while the request is in flight; the
                // carriage return rewinds over it before the final line.
                print!("Gemini: ...");
                io::stdout().flush().context("Failed to flush stdout")?;

                match session.send_message(&line).await {
                    Ok(response) => {
                        print!("\r");
                        println!("Gemini: {}", render(&response));
                    }
                    Err(err) => {
                        print!("\r");
                        io::stdout().flush().context("Failed to flush stdout")?;
                        error!(error = %format!("{err:#}"), "error sending message");
                    }
                }
            }
        }
    }

    Ok(())
}
