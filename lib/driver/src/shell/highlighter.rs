use compile::lexer::{lex, Token};
use nu_ansi_term::{Color, Style};
use reedline::{Highlighter, StyledText};

/// Colors a command line using the command lexer, so highlighting always
/// agrees with what the parser will see. Dot commands are colored as a whole.
pub(crate) struct CommandHighlighter;

impl CommandHighlighter {
    pub(crate) fn new() -> Self {
        CommandHighlighter
    }
}

impl Highlighter for CommandHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled_text = StyledText::new();

        if line.trim_start().starts_with('.') {
            styled_text.push((Style::new().fg(Color::Magenta), line.to_string()));
            return styled_text;
        }

        let mut last = 0;
        for (token, span) in lex(line) {
            if span.start > last {
                styled_text.push((Style::new(), line[last..span.start].to_string()));
            }
            styled_text.push((style(&token), line[span.clone()].to_string()));
            last = span.end;
        }
        if last < line.len() {
            styled_text.push((Style::new(), line[last..].to_string()));
        }

        styled_text
    }
}

fn style<E>(token: &Result<Token, E>) -> Style {
    match token {
        Ok(token) if token.is_keyword() => Style::new().fg(Color::Green),
        Ok(Token::Integer(_)) | Ok(Token::Boolean(_)) => Style::new().fg(Color::Yellow),
        Ok(Token::Str(_)) => Style::new().fg(Color::LightRed),
        Ok(Token::Ident(_)) => Style::new().fg(Color::LightBlue),
        Ok(Token::Eq) => Style::new().fg(Color::Magenta),
        Ok(_) => Style::new().fg(Color::DarkGray),
        Err(_) => Style::new().fg(Color::Red).underline(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments(line: &str) -> Vec<String> {
        CommandHighlighter::new()
            .highlight(line, 0)
            .buffer
            .into_iter()
            .map(|(_, text)| text)
            .collect()
    }

    #[test]
    fn test_segments_cover_the_line() {
        let line = r#"insert into users values ("Sergei", 28, true)"#;
        assert_eq!(segments(line).concat(), line);
    }

    #[test]
    fn test_unterminated_string_is_kept() {
        let line = r#"select from users where name = "Ser"#;
        assert_eq!(segments(line).concat(), line);
    }

    #[test]
    fn test_keyword_style() {
        let styled = CommandHighlighter::new().highlight("select from users", 0);
        assert_eq!(styled.buffer[0].0, Style::new().fg(Color::Green));
        assert_eq!(styled.buffer[0].1, "select");
    }
}
