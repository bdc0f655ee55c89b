//! Raw message input.
//!
//! The scraping collaborator delivers an ordered batch of raw message
//! strings, newest-first, already deduplicated at the text level. This
//! module reads such a batch from a file or piped stdin: one JSON-encoded
//! string per line (messages contain newlines, so they are JSONL-framed).
//!
//! A malformed line is skipped with a warning, not fatal - partial batches
//! still reconcile.

use crate::model::InputError;
use std::fs::File;
use std::io::{BufRead, BufReader, IsTerminal};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Where the message batch comes from.
#[derive(Debug)]
pub enum InputSource {
    /// JSONL file of message strings.
    File(PathBuf),
    /// Piped stdin.
    Stdin,
}

/// Pick the input source: explicit file if given, else piped stdin.
///
/// # Errors
///
/// Returns `InputError::FileNotFound` for a missing file and
/// `InputError::NoInput` when no file is given and stdin is a terminal.
pub fn detect_input_source(file: Option<PathBuf>) -> Result<InputSource, InputError> {
    match file {
        Some(path) => {
            if !path.exists() {
                return Err(InputError::FileNotFound { path });
            }
            Ok(InputSource::File(path))
        }
        None => {
            if std::io::stdin().is_terminal() {
                return Err(InputError::NoInput);
            }
            Ok(InputSource::Stdin)
        }
    }
}

impl InputSource {
    /// Read the whole batch, preserving line order (newest-first as
    /// written by the collaborator).
    pub fn read_messages(&self) -> Result<Vec<String>, InputError> {
        match self {
            InputSource::File(path) => read_from_path(path),
            InputSource::Stdin => Ok(decode_lines(std::io::stdin().lock())),
        }
    }
}

fn read_from_path(path: &Path) -> Result<Vec<String>, InputError> {
    let file = File::open(path)?;
    Ok(decode_lines(BufReader::new(file)))
}

/// Decode JSONL-framed message strings, skipping blank and malformed
/// lines.
fn decode_lines(reader: impl BufRead) -> Vec<String> {
    let mut messages = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(line_number = index + 1, %err, "unreadable input line, stopping");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<String>(&line) {
            Ok(message) => messages.push(message),
            Err(err) => {
                warn!(line_number = index + 1, %err, "skipping malformed message line");
            }
        }
    }
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn decodes_json_string_lines_in_order() {
        let input = "\"ID : 1\\nKirby\\n5$\"\n\"ID : 2\\nMetroid\\n7$\"\n";
        let messages = decode_lines(input.as_bytes());
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "ID : 1\nKirby\n5$");
        assert_eq!(messages[1], "ID : 2\nMetroid\n7$");
    }

    #[test]
    fn blank_lines_are_skipped() {
        let input = "\"one\"\n\n   \n\"two\"\n";
        assert_eq!(decode_lines(input.as_bytes()), vec!["one", "two"]);
    }

    #[test]
    fn malformed_lines_are_skipped_not_fatal() {
        let input = "\"one\"\n{not json}\n\"two\"\n";
        assert_eq!(decode_lines(input.as_bytes()), vec!["one", "two"]);
    }

    #[test]
    fn missing_file_is_reported() {
        let result = detect_input_source(Some(PathBuf::from("/nonexistent/messages.jsonl")));
        assert!(matches!(result, Err(InputError::FileNotFound { .. })));
    }

    #[test]
    fn file_source_reads_batch() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "\"ID : 1\\nKirby\\n5$\"").expect("write");
        let source = detect_input_source(Some(file.path().to_path_buf())).expect("source");
        let messages = source.read_messages().expect("read");
        assert_eq!(messages, vec!["ID : 1\nKirby\n5$"]);
    }
}
