use std::borrow::Cow;

use owo_colors::OwoColorize;
use reedline::{
    Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, PromptViMode,
};
use typed_builder::TypedBuilder;

/// `[3] primdb> ` style prompt; the counter is the number of the next line.
#[derive(TypedBuilder)]
pub struct CommandPrompt {
    prefix: String,
    line_count: usize,
}

impl Default for CommandPrompt {
    fn default() -> Self {
        CommandPrompt::builder()
            .prefix(format!("{}{} ", "primdb".green().italic(), ">".black()))
            .line_count(1)
            .build()
    }
}

impl CommandPrompt {
    pub fn increment_line_count(&mut self) {
        self.line_count += 1;
    }
}

impl Prompt for CommandPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        format!(
            "{}{}{} {}",
            "[".black(),
            self.line_count.cyan(),
            "]".black(),
            self.prefix
        )
        .into()
    }

    fn render_prompt_right(&self) -> Cow<str> {
        "".into()
    }

    fn render_prompt_indicator(&self, prompt_mode: PromptEditMode) -> Cow<str> {
        match prompt_mode {
            PromptEditMode::Default | PromptEditMode::Emacs => "".into(),
            PromptEditMode::Vi(vi_mode) => match vi_mode {
                PromptViMode::Normal => format!("{}", "NORMAL".red()).into(),
                PromptViMode::Insert => format!("{}", "INSERT".green()).into(),
            },
            PromptEditMode::Custom(str) => format!("({str})").into(),
        }
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        "... ".black().to_string().into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}
