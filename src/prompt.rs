//! Interactive prompts for mode and duration
//!
//! Parsing is split from I/O so the input contract stays unit-testable:
//! the mode prompt accepts "1" | "2" | "3", the duration prompt accepts an
//! empty line (continuous) or a positive number of seconds; anything else
//! falls back to continuous.

use crate::i18n::Messages;
use crate::session::{CaptureDuration, Mode};
use std::io::{self, BufRead, Write};

/// Map a mode choice line to a capture mode. `None` for anything but 1-3.
pub fn parse_mode_choice(input: &str) -> Option<Mode> {
    match input.trim() {
        "1" => Some(Mode::Internal),
        "2" => Some(Mode::Microphone),
        "3" => Some(Mode::Both),
        _ => None,
    }
}

/// Map a duration line to a capture duration. Empty input means continuous;
/// `None` marks invalid input, which callers treat as continuous after
/// telling the user.
pub fn parse_duration_input(input: &str) -> Option<CaptureDuration> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Some(CaptureDuration::Continuous);
    }
    match trimmed.parse::<u32>() {
        Ok(secs) if secs > 0 => Some(CaptureDuration::Seconds(secs)),
        _ => None,
    }
}

/// Ask for the capture mode. Returns `None` on EOF or an unrecognized choice.
pub fn prompt_mode(messages: &Messages) -> io::Result<Option<Mode>> {
    print!("{}", messages.get("choose_mode"));
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(parse_mode_choice(&line))
}

/// Ask for the duration. Invalid input is acknowledged and treated as
/// continuous; EOF also means continuous.
pub fn prompt_duration(messages: &Messages) -> io::Result<CaptureDuration> {
    print!("{}", messages.get("enter_duration_prompt"));
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(CaptureDuration::Continuous);
    }

    match parse_duration_input(&line) {
        Some(duration) => Ok(duration),
        None => {
            println!("{}", messages.get("invalid_duration"));
            Ok(CaptureDuration::Continuous)
        }
    }
}
