//! Interactive terminal prompts.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result, bail};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Whether stdin is attached to a terminal.
pub fn is_interactive() -> bool {
    io::stdin().is_terminal()
}

/// Ask for one line of visible input. `default` is used for an empty answer.
pub fn prompt_line(label: &str, default: Option<&str>) -> Result<Option<String>> {
    let mut stderr = io::stderr();
    match default {
        Some(d) => write!(stderr, "{label} [{d}]: ")?,
        None => write!(stderr, "{label}: ")?,
    }
    stderr.flush()?;

    let mut input = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;
    if read == 0 {
        return Ok(default.map(str::to_string));
    }

    let answer = input.trim();
    if answer.is_empty() {
        Ok(default.map(str::to_string))
    } else {
        Ok(Some(answer.to_string()))
    }
}

/// Ask for a secret without echoing it.
pub fn prompt_secret(label: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;

    enable_raw_mode().context("Failed to switch the terminal to raw mode")?;
    let result = read_secret_raw();
    let _ = disable_raw_mode();
    writeln!(stderr)?;

    result
}

fn read_secret_raw() -> Result<String> {
    let mut secret = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind == KeyEventKind::Release {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(secret),
            KeyCode::Backspace => {
                secret.pop();
            }
            KeyCode::Char('c') | KeyCode::Char('d')
                if modifiers.contains(KeyModifiers::CONTROL) =>
            {
                bail!("Input cancelled")
            }
            KeyCode::Esc => bail!("Input cancelled"),
            KeyCode::Char(c) => secret.push(c),
            _ => {}
        }
    }
}

/// Ask a yes/no question; anything but `y`/`yes` is no.
pub fn confirm(question: &str) -> bool {
    eprint!("{question} [y/N]: ");
    let _ = io::stderr().flush();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return false;
    }
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
