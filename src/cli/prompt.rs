//! Terminal prompts: confirmations, hidden values and unseal key shares

use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::cluster::KeyShareSource;
use crate::errors::{Result, SafeError};

/// One `set` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Assignment {
    /// `key=value`
    Literal(String, String),
    /// `key@file`
    File(String, PathBuf),
    /// bare `key`, value read from the terminal
    Prompt(String),
}

impl Assignment {
    /// Parse an argument; whichever of `=` or `@` comes first splits key from value
    pub fn parse(arg: &str) -> Result<Self> {
        let split = arg.find(|c| c == '=' || c == '@');
        let assignment = match split {
            None => Assignment::Prompt(arg.to_string()),
            Some(at) => {
                let (key, rest) = arg.split_at(at);
                let value = &rest[1..];
                if rest.starts_with('=') {
                    Assignment::Literal(key.to_string(), value.to_string())
                } else if value.is_empty() {
                    return Err(SafeError::usage(format!("no file given for key '{}'", key)));
                } else {
                    Assignment::File(key.to_string(), PathBuf::from(value))
                }
            }
        };

        if assignment.key().is_empty() {
            return Err(SafeError::usage(format!("missing key in '{}'", arg)));
        }
        Ok(assignment)
    }

    pub fn key(&self) -> &str {
        match self {
            Assignment::Literal(key, _) | Assignment::File(key, _) | Assignment::Prompt(key) => key,
        }
    }

    /// Produce the `(key, value)` pair, reading files or prompting on the terminal.
    ///
    /// With `confirm`, a prompted value must be entered twice.
    pub fn resolve(self, confirm: bool) -> Result<(String, String)> {
        self.resolve_with(confirm, read_hidden)
    }

    /// Like [`Assignment::resolve`], reading prompted values through `read`
    pub fn resolve_with<F>(self, confirm: bool, mut read: F) -> Result<(String, String)>
    where
        F: FnMut(&str) -> Result<String>,
    {
        match self {
            Assignment::Literal(key, value) => Ok((key, value)),
            Assignment::File(key, path) => {
                let value = std::fs::read_to_string(&path)?;
                Ok((key, value))
            }
            Assignment::Prompt(key) if confirm => {
                let value = prompt_confirmed(&key, &mut read)?;
                Ok((key, value))
            }
            Assignment::Prompt(key) => {
                let value = read(&format!("{} [hidden]: ", key))?;
                Ok((key, value))
            }
        }
    }
}

fn read_hidden(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(label)?)
}

/// Ask for a hidden value twice until both entries match
fn prompt_confirmed<F>(key: &str, read: &mut F) -> Result<String>
where
    F: FnMut(&str) -> Result<String>,
{
    loop {
        let first = read(&format!("{} [hidden]: ", key))?;
        let second = read(&format!("{} [confirm]: ", key))?;
        if first == second {
            return Ok(first);
        }
        eprintln!("values did not match, try again");
    }
}

/// Ask a yes/no question on stdout and read the answer from stdin
pub fn confirm(question: &str) -> Result<bool> {
    print!("{} (y/n) ", question);
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim(), "y" | "yes")
}

/// Reads unseal key shares from the terminal without echo
#[derive(Debug, Default)]
pub struct TerminalKeyShares;

impl KeyShareSource for TerminalKeyShares {
    fn collect(&mut self, threshold: u32) -> Result<Vec<String>> {
        (1..=threshold)
            .map(|i| {
                let share = rpassword::prompt_password(format!("Seal Key #{}: ", i))?;
                let share = share.trim().to_string();
                if share.is_empty() {
                    return Err(SafeError::usage(format!("seal key #{} is empty", i)));
                }
                Ok(share)
            })
            .collect()
    }
}
