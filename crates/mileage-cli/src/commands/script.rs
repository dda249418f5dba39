//! Scripted sessions: one command per line on stdin.
//!
//! ```text
//! calc from="Home" to="Field 3"
//! trip date=2024-05-01 purpose=business notes="U12 final"
//! receipt ./parking.jpg
//! expense date=2024-05-01 description=Parking amount=8.00
//! list
//! export ./out
//! ```

use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tokio::runtime::Runtime;

use mileage_core::{EntryStore, LedgerSession, Purpose, ReceiptImage};

use crate::capture::read_image;
use crate::errors::CliError;
use crate::output::{entries_json, render_log};
use crate::ui::{print, print_error, UiContext};

use super::{print_export, print_notice, save_export};

/// A parsed script line.
#[derive(Debug, PartialEq)]
pub enum ScriptCommand {
    Trip(Vec<(String, String)>),
    Expense(Vec<(String, String)>),
    Calc(Vec<(String, String)>),
    Receipt(PathBuf),
    ReceiptClear,
    List { json: bool },
    Export(Option<PathBuf>),
    Clear,
    Quit,
}

/// Everything a script needs besides the session.
pub struct ScriptEnv<'a> {
    pub ui: &'a UiContext,
    pub runtime: &'a Runtime,
    pub export_dir: PathBuf,
    pub today: NaiveDate,
}

/// Split a line into words; double quotes group words.
pub fn tokenize(line: &str) -> Result<Vec<String>, CliError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    tokens.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(CliError::invalid_input(format!(
            "Unterminated quote in: {}",
            line
        )));
    }
    if has_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn key_values(words: &[String]) -> Result<Vec<(String, String)>, CliError> {
    words
        .iter()
        .map(|word| {
            word.split_once('=')
                .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.to_string()))
                .ok_or_else(|| {
                    CliError::invalid_input(format!("Expected key=value, got '{}'", word))
                })
        })
        .collect()
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, CliError> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let tokens = tokenize(trimmed)?;
    let Some((command, rest)) = tokens.split_first() else {
        return Ok(None);
    };

    let parsed = match command.to_ascii_lowercase().as_str() {
        "trip" => ScriptCommand::Trip(key_values(rest)?),
        "expense" => ScriptCommand::Expense(key_values(rest)?),
        "calc" => ScriptCommand::Calc(key_values(rest)?),
        "receipt" => match rest {
            [path] => ScriptCommand::Receipt(PathBuf::from(path)),
            _ => return Err(CliError::invalid_input("Usage: receipt <path>")),
        },
        "receipt-clear" => ScriptCommand::ReceiptClear,
        "list" => match rest.first().map(String::as_str) {
            None => ScriptCommand::List { json: false },
            Some("json") => ScriptCommand::List { json: true },
            Some(other) => {
                return Err(CliError::invalid_input(format!(
                    "Unknown list format '{}' (use json)",
                    other
                )))
            }
        },
        "export" => ScriptCommand::Export(rest.first().map(PathBuf::from)),
        "clear" => ScriptCommand::Clear,
        "quit" | "exit" => ScriptCommand::Quit,
        other => {
            return Err(CliError::invalid_input(format!(
                "Unknown command '{}'",
                other
            )))
        }
    };
    Ok(Some(parsed))
}

fn parse_purpose(value: &str) -> Result<Purpose, CliError> {
    value.parse::<Purpose>().map_err(CliError::from)
}

fn unknown_key(command: &str, key: &str) -> CliError {
    CliError::invalid_input(format!("Unknown {} field '{}'", command, key))
}

/// Run a script to completion.
///
/// Every line runs even after a failure; the first failure is returned so
/// the process can exit non-zero.
pub fn run_script<R: BufRead, S: EntryStore>(
    reader: R,
    session: &mut LedgerSession<S>,
    env: &ScriptEnv<'_>,
) -> anyhow::Result<Option<CliError>> {
    let mut first_failure = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;

        let outcome = match parse_line(&line) {
            Ok(Some(ScriptCommand::Quit)) => break,
            Ok(Some(command)) => execute(command, session, env),
            Ok(None) => Ok(()),
            Err(e) => {
                print_error(env.ui, &format!("line {}: {}", number, e), None);
                Err(e)
            }
        };

        if let Err(e) = outcome {
            log::debug!("Script line {} failed: {}", number, e);
            if first_failure.is_none() {
                first_failure = Some(e.at_line(number));
            }
        }
    }

    Ok(first_failure)
}

fn execute<S: EntryStore>(
    command: ScriptCommand,
    session: &mut LedgerSession<S>,
    env: &ScriptEnv<'_>,
) -> Result<(), CliError> {
    let result = match command {
        ScriptCommand::Trip(fields) => {
            let mut form = session.trip_form().clone();
            for (key, value) in fields {
                match key.as_str() {
                    "date" => form.date = value,
                    "miles" | "distance" => form.distance = value,
                    "from" | "start" => form.start_location = value,
                    "to" | "end" => form.end_location = value,
                    "notes" => form.notes = value,
                    "purpose" => form.purpose = parse_purpose(&value)?,
                    other => return Err(unknown_key("trip", other)),
                }
            }
            *session.trip_form_mut() = form;
            session.add_trip().map(|_| ())
        }
        ScriptCommand::Expense(fields) => {
            let mut form = session.expense_form().clone();
            for (key, value) in fields {
                match key.as_str() {
                    "date" => form.date = value,
                    "description" | "desc" => form.description = value,
                    "amount" => form.amount = value,
                    "purpose" => form.purpose = parse_purpose(&value)?,
                    other => return Err(unknown_key("expense", other)),
                }
            }
            *session.expense_form_mut() = form;
            session.add_expense().map(|_| ())
        }
        ScriptCommand::Calc(fields) => {
            let mut form = session.trip_form().clone();
            for (key, value) in fields {
                match key.as_str() {
                    "from" | "start" => form.start_location = value,
                    "to" | "end" => form.end_location = value,
                    other => return Err(unknown_key("calc", other)),
                }
            }
            *session.trip_form_mut() = form;
            env.runtime
                .block_on(session.calculate_mileage())
                .map(|_| ())
        }
        ScriptCommand::Receipt(path) => {
            let image = read_image(&path).and_then(|bytes| ReceiptImage::from_bytes(&bytes));
            match image {
                Ok(image) => {
                    session.attach_receipt(image);
                    Ok(())
                }
                Err(e) => {
                    let err = CliError::from(e);
                    print_error(env.ui, &err.to_string(), None);
                    return Err(err);
                }
            }
        }
        ScriptCommand::ReceiptClear => {
            session.clear_receipt();
            Ok(())
        }
        ScriptCommand::List { json } => {
            if json {
                println!(
                    "{}",
                    entries_json(session.entries())
                        .map_err(|e| CliError::invalid_input(e.to_string()))?
                );
            } else {
                print(env.ui, &render_log(env.ui, session.entries()));
            }
            return Ok(());
        }
        ScriptCommand::Export(dir) => {
            let dir = dir.unwrap_or_else(|| env.export_dir.clone());
            export_to(session, env, &dir)
        }
        ScriptCommand::Clear => {
            session.request_clear();
            Ok(())
        }
        ScriptCommand::Quit => Ok(()),
    };

    print_notice(env.ui, session);
    result.map_err(CliError::from)
}

fn export_to<S: EntryStore>(
    session: &mut LedgerSession<S>,
    env: &ScriptEnv<'_>,
    dir: &Path,
) -> mileage_core::Result<()> {
    let (file, path) = session.export_with(env.today, |file| save_export(file, dir))?;
    print_export(env.ui, &file, &path);
    Ok(())
}
