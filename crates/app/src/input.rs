//! Console input helpers.
//!
//! Everything is line-oriented except passwords, which are read in raw mode
//! and echoed as `*`.

use std::io::{self, Write};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::Money;

pub fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Reads until the input parses as a non-negative whole number.
pub fn prompt_u32(label: &str) -> io::Result<u32> {
    loop {
        match prompt(label)?.parse() {
            Ok(value) => return Ok(value),
            Err(_) => println!("Enter a whole number."),
        }
    }
}

/// Reads until the input parses as a non-negative quantity.
pub fn prompt_quantity(label: &str) -> io::Result<f64> {
    loop {
        match prompt(label)?.parse::<f64>() {
            Ok(value) if value >= 0.0 => return Ok(value),
            Ok(_) => println!("Quantity can NOT be negative."),
            Err(_) => println!("Enter a number."),
        }
    }
}

/// Reads until the input parses as a non-negative amount of money.
pub fn prompt_price(label: &str) -> io::Result<Money> {
    loop {
        match prompt(label)?.parse::<Money>() {
            Ok(value) if !value.is_negative() => return Ok(value),
            Ok(_) => println!("Price can NOT be negative."),
            Err(err) => println!("Error: {err}"),
        }
    }
}

pub fn confirm(label: &str) -> io::Result<bool> {
    let answer = prompt(label)?;
    Ok(answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes"))
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Reads a password without echoing it; `*` per keystroke.
pub fn prompt_password(label: &str) -> io::Result<String> {
    let _raw = RawModeGuard::enter()?;

    let mut out = io::stdout();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(label)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "interrupted"));
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

/// Asks for a password and its confirmation, up to three attempts.
///
/// Returns `None` when the attempts are used up.
pub fn prompt_password_twice() -> io::Result<Option<String>> {
    for _ in 0..3 {
        let first = prompt_password("Password: ")?;
        if first.is_empty() {
            println!("Password must not be empty.");
            continue;
        }

        let second = prompt_password("Confirm password: ")?;
        if first == second {
            return Ok(Some(first));
        }

        println!("Passwords do not match. Try again.");
    }

    Ok(None)
}
