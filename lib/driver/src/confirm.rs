use std::io::{self, BufRead, Write};
use tracing::warn;

/// Gate consulted before a destructive command runs. Returning `false` cancels
/// the command without touching the catalog.
pub trait Confirm {
    fn confirm(&mut self, action: &str) -> bool;
}

/// Approves everything (`--yes`, or `confirm_destructive = false`).
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&mut self, _action: &str) -> bool {
        true
    }
}

/// Declines everything; non-interactive runs without `--yes` use it.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&mut self, _action: &str) -> bool {
        false
    }
}

/// Asks on stdout and reads the answer from stdin. Only `y` (any case) approves.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, action: &str) -> bool {
        let mut stdout = io::stdout();
        if write!(stdout, "Are you sure you want to {}? [y/n]: ", action)
            .and_then(|_| stdout.flush())
            .is_err()
        {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                warn!(error = %e, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, action: &str) -> bool {
        self(action)
    }
}
