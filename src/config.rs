use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;
use tracing::{info, warn};

const KEY_FILE: &str = "key.txt";
const PERSONALITY_FILE: &str = "personality.jb";

/// Runtime configuration, loaded once at startup and immutable afterwards.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub preamble: String,
}

impl Config {
    /// Loads the API key and the optional personality preamble from the
    /// current working directory. A missing or empty key file is fatal;
    /// a missing preamble file is not.
    pub fn load() -> Result<Self> {
        Self::load_with(|path| fs::read_to_string(path))
    }

    fn load_with(mut read_file: impl FnMut(&Path) -> io::Result<String>) -> Result<Self> {
        let raw_key = read_file(Path::new(KEY_FILE)).with_context(|| {
            format!("Failed to read API key from '{KEY_FILE}'. Please ensure the file exists")
        })?;
        let api_key = raw_key.trim().to_string();
        if api_key.is_empty() {
            bail!("API key file '{KEY_FILE}' is empty");
        }

        // The preamble is optional, so a missing file degrades to an empty
        // preamble instead of failing startup.
        let preamble = match read_file(Path::new(PERSONALITY_FILE)) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    file = PERSONALITY_FILE,
                    "no personality file found, starting a standard chat session"
                );
                String::new()
            }
            Err(err) => {
                warn!(
                    file = PERSONALITY_FILE,
                    error = %err,
                    "could not read personality file, continuing without a preamble"
                );
                String::new()
            }
        };

        Ok(Self { api_key, preamble })
    }
}
