//! Common utilities for CLI commands: interactive prompts and step output

use anyhow::Result;
use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::utils::ProgressBar;

/// One choice offered by [`prompt_select`].
#[derive(Debug, Clone, Copy)]
pub struct SelectOption {
    /// Text shown in the list.
    pub title: &'static str,
    /// Value the choice stands for.
    pub value: &'static str,
}

/// Whether stdin is attached to an interactive terminal.
#[must_use]
pub fn stdin_is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Prompts for a line of text with a default value.
///
/// Returns `None` when stdin is not a terminal or the prompt is dismissed
/// with EOF; callers decide whether that cancels the operation or falls back
/// to the default.
///
/// # Errors
///
/// Returns an error if stdin or stdout I/O fails.
pub async fn prompt_text(question: &str, default: &str) -> Result<Option<String>> {
    if !stdin_is_interactive() {
        return Ok(None);
    }

    print!("{} {} ", question.green(), format!("({default})").dimmed());
    io::stdout().flush()?;

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut response = String::new();
    if reader.read_line(&mut response).await? == 0 {
        println!();
        return Ok(None);
    }

    let response = response.trim();
    if response.is_empty() {
        Ok(Some(default.to_string()))
    } else {
        Ok(Some(response.to_string()))
    }
}

/// Asks a yes/no question.
///
/// Returns `None` when stdin is not a terminal or on EOF. An empty answer
/// takes the default; anything other than `y`/`yes` is a no.
///
/// # Errors
///
/// Returns an error if stdin or stdout I/O fails.
pub async fn confirm(question: &str, default_yes: bool) -> Result<Option<bool>> {
    if !stdin_is_interactive() {
        return Ok(None);
    }

    let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    print!("{} ", format!("{question} {hint}:").green());
    io::stdout().flush()?;

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut response = String::new();
    if reader.read_line(&mut response).await? == 0 {
        println!();
        return Ok(None);
    }

    let response = response.trim().to_lowercase();
    let answer = if response.is_empty() {
        default_yes
    } else {
        response == "y" || response == "yes"
    };
    Ok(Some(answer))
}

/// Presents a numbered list of choices and reads the selection.
///
/// Returns the chosen index, or `None` when stdin is not a terminal, the
/// prompt is dismissed, or the answer is not a listed number.
///
/// # Errors
///
/// Returns an error if stdin or stdout I/O fails.
pub async fn prompt_select(question: &str, options: &[SelectOption]) -> Result<Option<usize>> {
    if !stdin_is_interactive() {
        return Ok(None);
    }

    println!("{}", question.green());
    for (index, option) in options.iter().enumerate() {
        println!("  {}) {}", index + 1, option.title.cyan());
    }
    print!("{} ", format!("Select [1-{}]:", options.len()).green());
    io::stdout().flush()?;

    let mut reader = BufReader::new(tokio::io::stdin());
    let mut response = String::new();
    if reader.read_line(&mut response).await? == 0 {
        println!();
        return Ok(None);
    }

    match response.trim().parse::<usize>() {
        Ok(choice) if (1..=options.len()).contains(&choice) => Ok(Some(choice - 1)),
        _ => Ok(None),
    }
}

/// Prints the standard cancellation notice for a dismissed prompt.
pub fn print_cancelled() {
    println!("{}", "Operation cancelled.".red());
}

/// Starts a step spinner with the given running message.
pub fn step_start(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(message);
    spinner
}

/// Finishes a step spinner with a green check line.
pub fn step_succeed(spinner: &ProgressBar, message: impl AsRef<str>) {
    spinner.finish_and_clear();
    println!("{} {}", "✔".green(), message.as_ref());
}

/// Finishes a step spinner with a red cross line on stderr.
pub fn step_fail(spinner: &ProgressBar, message: impl AsRef<str>) {
    spinner.finish_and_clear();
    eprintln!("{} {}", "✖".red(), message.as_ref());
}
