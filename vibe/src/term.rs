use std::borrow::Cow;

use crate::{config::Settings, style::Styles, error::AppError};
use rustyline::{config::BellStyle, highlight::{CmdKind, Highlighter}, history::MemHistory, Completer, CompletionType, EditMode, Editor, Helper, Hinter, Validator};

const LOGO: &str = r"
   _   __ ____ ___   ____
  | | / //  _// _ ) / __/
  | |/ /_/ / / _  |/ _/  
  |___//___//____//___/  ";

const INSTRUCTIONS: &str = "For help use ?, to exit type 'exit' or use Ctrl+C";

/// Output side of a template turn.
pub trait Console {
    /// Print a model reply.
    fn assistant(&mut self, text: &str);

    /// Print tool output.
    fn tool(&mut self, name: &str, text: &str);

    /// Print an informational line.
    fn info(&mut self, text: &str);

    /// Print the template help.
    fn help(&mut self, text: &str) {
        self.info(text);
    }
}

/// Terminal stuff.
pub struct Term {
    user_prompt: String, 
    assistant_prompt: String, 
    styles: Styles,
    dumb: bool,
    editor: Editor<RlineHelper, MemHistory>,
}

impl Term {
    /// New instance.
    pub fn new(settings: &Settings) -> Result<Self, AppError> {
        let styles = Styles::new(settings);

        let rline_config = rustyline::Config::builder()
            .history_ignore_space(true)
            .auto_add_history(true)
            .bell_style(BellStyle::None)
            .check_cursor_position(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .build();

        let dumb = Ok("dumb") == std::env::var("TERM").as_deref();
        let (user_prompt, assistant_prompt) = if dumb {
            ("You> ".to_owned(), "AI> ".to_owned())
        } else {
            (styles.user.label("You"), styles.assistant.label("AI"))
        };

        let mut editor: Editor<RlineHelper, MemHistory> = Editor::with_config(rline_config)?;
        editor.set_helper(Some(RlineHelper {
            colored_prompt: String::new()
        }));

        Ok(Term {
            user_prompt,
            assistant_prompt, 
            styles,
            dumb,
            editor,
        })
    }

    /// Get input from user.
    pub fn user_input(&mut self) -> Result<String, AppError> {
        if self.dumb {
            return self.editor.readline(&self.user_prompt).map_err(|e| e.into());
        }

        let colored = format!("{}{}", &self.user_prompt, self.styles.user.text);
        if let Some(helper) = self.editor.helper_mut() {
            helper.colored_prompt = colored;
        }
        let ret = self.editor.readline(" You > ");
        print!("{:#}", self.styles.user.text);
        ret.map_err(|e| e.into())
    }

    /// Print logo, template title and instructions.
    pub fn print_intro(&self, title: &str, lines: &[String]) {
        let mut intro = format!("{}\n (ver. {})\n\n{}\n", LOGO, env!("CARGO_PKG_VERSION"), title);
        for line in lines {
            intro.push_str(line);
            intro.push('\n');
        }
        intro.push_str(INSTRUCTIONS);

        if self.dumb {
            println!("{intro}");
        } else {
            println!("{}{}{:#}", self.styles.assistant.text, intro, self.styles.assistant.text);
        }
    }

}

impl Console for Term {
    fn assistant(&mut self, text: &str) {
        if self.dumb {
            println!("{}{}", self.assistant_prompt, text);
        } else {
            println!("{}{}{}{:#}", self.assistant_prompt, self.styles.assistant.text, text, self.styles.assistant.text);
        }
    }

    fn tool(&mut self, name: &str, text: &str) {
        if self.dumb {
            println!("{}> {}", name, text);
        } else {
            println!("{}{}{}{:#}", self.styles.tool.label(name), self.styles.tool.text, text, self.styles.tool.text);
        }
    }

    fn info(&mut self, text: &str) {
        println!("{text}");
    }

    fn help(&mut self, text: &str) {
        if self.dumb {
            println!("{text}");
        } else {
            println!("{}{}{:#}", self.styles.assistant.text, text, self.styles.assistant.text);
        }
    }
}

/// Console recording everything printed, for template tests.
#[cfg(test)]
#[derive(Default)]
pub struct Transcript {
    pub lines: Vec<String>,
}

#[cfg(test)]
impl Transcript {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
impl Console for Transcript {
    fn assistant(&mut self, text: &str) {
        self.lines.push(format!("AI: {text}"));
    }

    fn tool(&mut self, name: &str, text: &str) {
        self.lines.push(format!("{name}> {text}"));
    }

    fn info(&mut self, text: &str) {
        self.lines.push(text.to_owned());
    }
}


#[derive(Helper, Validator, Hinter, Completer)]
struct RlineHelper {
    colored_prompt: String,
}

impl Highlighter for RlineHelper {
    fn highlight<'l>(&self, line: &'l str, pos: usize) -> Cow<'l, str> {
        let _ = pos;
        Cow::Borrowed(line)
    }

    fn highlight_prompt<'b, 's: 'b, 'p: 'b>(
        &'s self,
        prompt: &'p str,
        default: bool,
    ) -> Cow<'b, str> {
        if default {
            Cow::Borrowed(&self.colored_prompt)
        } else {
            Cow::Borrowed(prompt)
        }
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Cow::Borrowed(hint)
    }

    fn highlight_candidate<'c>(
        &self,
        candidate: &'c str,
        completion: rustyline::CompletionType,
    ) -> Cow<'c, str> {
        let _ = completion;
        Cow::Borrowed(candidate)
    }

    fn highlight_char(&self, line: &str, pos: usize, kind: CmdKind) -> bool {
        let _ = (line, pos, kind);
        false
    }
}
