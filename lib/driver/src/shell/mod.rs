use self::{highlighter::CommandHighlighter, prompt::CommandPrompt};
use crate::{Driver, ExecError, Outcome, Response};
use anyhow::{anyhow, Context, Result};
use common::{config::ShellConfig, util::time::format_duration};
use compile::report_error;
use nu_ansi_term::{Color, Style};
use owo_colors::OwoColorize;
use prettytable::{row, Table};
use reedline::{DefaultHinter, FileBackedHistory, Reedline, Signal};
use std::io;
use tracing::{debug, error};
use typed_builder::TypedBuilder;

mod highlighter;
mod prompt;

/// What the loop should do after handling one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit(i32),
}

#[derive(TypedBuilder)]
pub struct Shell {
    driver: Driver,
    prompt: CommandPrompt,
    line_editor: Reedline,
    bail_on_error: bool,
    timer: bool,
}

impl Shell {
    pub fn new(driver: Driver, config: &ShellConfig) -> Result<Self> {
        let history =
            FileBackedHistory::with_file(*config.history_size(), config.history_file().clone())
                .with_context(|| {
                    format!(
                        "unable to open history file {}",
                        config.history_file().display()
                    )
                })?;
        let hinter =
            DefaultHinter::default().with_style(Style::new().italic().fg(Color::LightGray));

        let line_editor = Reedline::create()
            .with_highlighter(Box::new(CommandHighlighter::new()))
            .with_history(Box::new(history))
            .with_hinter(Box::new(hinter));

        Ok(Shell::builder()
            .driver(driver)
            .prompt(CommandPrompt::default())
            .line_editor(line_editor)
            .bail_on_error(false)
            .timer(*config.timer())
            .build())
    }

    pub fn into_driver(self) -> Driver {
        self.driver
    }

    /// Reads commands until `exit`, `.exit`, `.quit` or Ctrl+D and returns the
    /// process exit code. With bail mode on, the first failing command ends
    /// the session with an error.
    pub fn run(&mut self) -> Result<i32> {
        println!("{}", "***primdb***".bold());
        println!("{}", Outcome::Help);

        loop {
            let input = self.line_editor.read_line(&self.prompt)?;
            match input {
                Signal::Success(buffer) => {
                    self.prompt.increment_line_count();

                    let line = buffer.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if let Flow::Exit(code) = self.process_line(line)? {
                        println!("Goodbye!");
                        return Ok(code);
                    }
                }
                Signal::CtrlC => continue,
                Signal::CtrlD => {
                    println!("Goodbye!");
                    return Ok(0);
                }
            }
        }
    }

    fn process_line(&mut self, line: &str) -> Result<Flow> {
        if line.starts_with('.') {
            return Ok(self.handle_dot_command(line));
        }

        match self.driver.execute(line) {
            Ok(response) => Ok(self.show_response(&response)),
            Err(e) => {
                self.show_error(line, &e);
                if self.bail_on_error {
                    error!(kind = e.kind(), error = %e, "stopping on error");
                    return Err(anyhow!(e).context(format!("command failed: {}", line)));
                }
                debug!(kind = e.kind(), error = %e, "command failed");
                Ok(Flow::Continue)
            }
        }
    }

    fn show_response(&self, response: &Response) -> Flow {
        match response.outcome() {
            Outcome::Exit => return Flow::Exit(0),
            Outcome::Cancelled { .. } => println!("{}", response.outcome().yellow()),
            outcome => println!("{}", outcome),
        }

        let timed = !matches!(response.outcome(), Outcome::Cancelled { .. } | Outcome::Help);
        if self.timer && timed {
            println!(
                "{}",
                format!(
                    "{} took {}",
                    response.command(),
                    format_duration(response.elapsed())
                )
                .dimmed()
            );
        }
        Flow::Continue
    }

    fn show_error(&self, line: &str, e: &ExecError) {
        match e {
            ExecError::Parse(parse) => {
                if report_error(&mut io::stderr(), line, parse).is_err() {
                    eprintln!("{}: {}", e.kind().red(), e);
                }
            }
            ExecError::Db(_) => eprintln!("{}{} {}", e.kind().red(), ":".black(), e),
        }
    }

    fn handle_dot_command(&mut self, command: &str) -> Flow {
        match command.split_whitespace().collect::<Vec<&str>>().as_slice() {
            [".bail"] => {
                let mode = format!("Error stop mode is {}", on_off(self.bail_on_error));
                println!("{}", mode.purple());
            }
            [".bail", "on"] => self.bail_on_error = true,
            [".bail", "off"] => self.bail_on_error = false,
            [".timer"] => {
                let mode = format!("Timer is {}", on_off(self.timer));
                println!("{}", mode.purple());
            }
            [".timer", "on"] => self.timer = true,
            [".timer", "off"] => self.timer = false,
            [".exit"] | [".quit"] => return Flow::Exit(0),
            [".exit", code] => match code.parse::<i32>() {
                Ok(code) => return Flow::Exit(code),
                Err(_) => eprintln!("{} `{}`", "Invalid exit code".red(), code.yellow()),
            },
            [".help"] => self.show_help(),
            [".tables"] => {
                let tables = self
                    .driver
                    .catalog()
                    .list_tables()
                    .map(String::from)
                    .collect::<Vec<_>>();
                println!("{}", Outcome::Tables(tables));
            }
            _ => {
                println!(
                    "{}{}{}{}{}",
                    "Unrecognized dot command".purple(),
                    ":".black(),
                    " `".red(),
                    command.yellow(),
                    "`".red(),
                );
            }
        }
        Flow::Continue
    }

    fn show_help(&self) {
        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row!["General Help", ""]);
        table.add_row(row![
            "Press Ctrl+D or type exit to exit",
            "Exit this program",
        ]);
        table.add_row(row![
            "Press Ctrl+C to cancel the current line",
            "Cancel the current line"
        ]);
        table.add_row(row![
            "Press Ctrl+R to search through command history",
            "Search through command history"
        ]);
        table.add_row(row![
            "Press Up/Down arrows or Ctrl+n/p to browse history",
            "Browse history"
        ]);
        table.printstd();

        println!();
        println!("Available dot commands:");

        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table.set_titles(row!["Command", "Description"]);
        table.add_row(row![".bail [on|off]", "Stop at the first failing command"]);
        table.add_row(row![".timer [on|off]", "Report how long each command took"]);
        table.add_row(row![
            ".exit [CODE]",
            "Exit this program with return-code [CODE]"
        ]);
        table.add_row(row![".help", "Show this help information"]);
        table.add_row(row![".quit", "Exit this program (with return-code 0)"]);
        table.add_row(row![".tables", "List names of tables"]);
        table.printstd();

        println!();
        println!("{}", Outcome::Help);
    }
}

fn on_off(flag: bool) -> String {
    if flag {
        "on".green().to_string()
    } else {
        "off".red().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NeverConfirm;
    use catalog::Catalog;

    fn shell() -> Shell {
        Shell::builder()
            .driver(
                Driver::builder()
                    .catalog(Catalog::in_memory())
                    .confirm(Box::new(NeverConfirm))
                    .build(),
            )
            .prompt(CommandPrompt::default())
            .line_editor(Reedline::create())
            .bail_on_error(false)
            .timer(true)
            .build()
    }

    #[test]
    fn test_dot_commands() {
        let mut shell = shell();

        assert_eq!(shell.handle_dot_command(".bail on"), Flow::Continue);
        assert!(shell.bail_on_error);
        assert_eq!(shell.handle_dot_command(".timer off"), Flow::Continue);
        assert!(!shell.timer);
        assert_eq!(shell.handle_dot_command(".frobnicate"), Flow::Continue);

        assert_eq!(shell.handle_dot_command(".exit 3"), Flow::Exit(3));
        assert_eq!(shell.handle_dot_command(".exit nope"), Flow::Continue);
        assert_eq!(shell.handle_dot_command(".quit"), Flow::Exit(0));
    }

    #[test]
    fn test_errors_do_not_end_the_session() {
        let mut shell = shell();

        assert_eq!(shell.process_line("info ghost").unwrap(), Flow::Continue);
        assert_eq!(shell.process_line("select from").unwrap(), Flow::Continue);
        assert_eq!(shell.process_line("exit").unwrap(), Flow::Exit(0));
    }

    #[test]
    fn test_bail_mode_stops_on_error() {
        let mut shell = shell();
        shell.handle_dot_command(".bail on");

        assert!(shell.process_line("info ghost").is_err());
    }
}
