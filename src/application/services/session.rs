//! Interactive guessing session
//!
//! A menu loop over a `Console`: the user picks commands, plays rounds of
//! the guessing game and teaches the knowledge base new subjects.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::knowledge::{ExportFormat, KnowledgeService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{KnowledgeBase, TreeDisplay};
use crate::infrastructure::traits::Console;

const HELP: &str = "\
commands:
  play              guess the subject you are thinking of
  print             print the knowledge base in text form
  show              print the knowledge base as a tree
  save [PATH]       save as text or graph
  load [PATH]       replace the knowledge base from a file
  define [SUBJECT]  list what is known about a subject
  subjects          list all known subjects
  help              this message
  quit              leave the session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Play,
    Print,
    Show,
    Save,
    Load,
    Define,
    Subjects,
    Help,
    Quit,
}

impl FromStr for SessionCommand {
    type Err = ApplicationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "play" | "start" | "p" => Ok(SessionCommand::Play),
            "print" => Ok(SessionCommand::Print),
            "show" | "tree" => Ok(SessionCommand::Show),
            "save" => Ok(SessionCommand::Save),
            "load" => Ok(SessionCommand::Load),
            "define" | "def" => Ok(SessionCommand::Define),
            "subjects" | "list" => Ok(SessionCommand::Subjects),
            "help" | "?" => Ok(SessionCommand::Help),
            "quit" | "exit" | "q" => Ok(SessionCommand::Quit),
            other => Err(ApplicationError::OperationFailed {
                context: format!("unknown command '{other}'"),
                source: "type 'help' for the list of commands".into(),
            }),
        }
    }
}

/// Any answer not starting with 'n' counts as yes.
pub fn is_yes(answer: &str) -> bool {
    !matches!(answer.trim_start().chars().next(), Some('n' | 'N'))
}

fn ask(console: &dyn Console, prompt: &str) -> ApplicationResult<Option<String>> {
    console
        .read_line(prompt)
        .map_err(|e| ApplicationError::OperationFailed {
            context: "read from console".to_string(),
            source: Box::new(e),
        })
}

/// Outcome of one command.
enum Flow {
    Continue,
    Quit,
}

pub struct SessionService {
    knowledge: KnowledgeService,
    console: Arc<dyn Console>,
    kb: KnowledgeBase,
    file: Option<PathBuf>,
}

impl SessionService {
    pub fn new(
        knowledge: KnowledgeService,
        console: Arc<dyn Console>,
        kb: KnowledgeBase,
        file: Option<PathBuf>,
    ) -> Self {
        Self {
            knowledge,
            console,
            kb,
            file,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    /// Run the menu loop until `quit` or end of input.
    ///
    /// Command failures are reported on the console and the loop goes on;
    /// only console read errors end the session with an error.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self) -> ApplicationResult<()> {
        self.console.say("Think of something and I will guess it. Type 'help' for commands.");
        loop {
            let Some(line) = ask(&*self.console, "command>")? else {
                debug!("session: end of input");
                return Ok(());
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (word, arg) = match line.split_once(char::is_whitespace) {
                Some((word, rest)) => (word, Some(rest.trim()).filter(|r| !r.is_empty())),
                None => (line, None),
            };

            let outcome = word
                .parse::<SessionCommand>()
                .and_then(|command| self.dispatch(command, arg));
            match outcome {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(e) => self.console.warn(&e.to_string()),
            }
        }
    }

    fn dispatch(&mut self, command: SessionCommand, arg: Option<&str>) -> ApplicationResult<Flow> {
        debug!(?command, "session command");
        match command {
            SessionCommand::Play => self.play()?,
            SessionCommand::Print => {
                let text = self.knowledge.render(&self.kb, ExportFormat::Text);
                self.console.say(text.trim_end());
            }
            SessionCommand::Show => {
                let tree = self.kb.to_tree().to_string();
                self.console.say(tree.trim_end());
            }
            SessionCommand::Save => self.save(arg)?,
            SessionCommand::Load => self.load(arg)?,
            SessionCommand::Define => self.define(arg)?,
            SessionCommand::Subjects => {
                for subject in self.kb.subjects() {
                    self.console.say(subject);
                }
            }
            SessionCommand::Help => self.console.say(HELP),
            SessionCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Use `arg` or ask for a value; None when the user gives nothing.
    fn argument(&self, arg: Option<&str>, prompt: &str) -> ApplicationResult<Option<String>> {
        if let Some(arg) = arg {
            return Ok(Some(arg.to_string()));
        }
        Ok(ask(&*self.console, prompt)?
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    /// One round of the guessing game.
    fn play(&mut self) -> ApplicationResult<()> {
        let console = Arc::clone(&self.console);
        let mut cursor = self.kb.cursor();

        while !cursor.is_leaf() {
            let prompt = format!("{}? [y/n]", cursor.current_text());
            let Some(answer) = ask(&*console, &prompt)? else {
                return Ok(());
            };
            cursor.advance(is_yes(&answer));
        }

        let guess = cursor.current_text().to_string();
        let Some(answer) = ask(&*console, &format!("Is it {guess}? [y/n]"))? else {
            return Ok(());
        };
        if is_yes(&answer) {
            console.say("Got it!");
            return Ok(());
        }

        let Some(name) = ask(&*console, "What was it?")? else {
            return Ok(());
        };
        let name = name.trim();
        if name.is_empty() {
            console.warn("no answer given, nothing learned");
            return Ok(());
        }
        let prompt = format!("What is true of {name} but not of {guess}?");
        let Some(question) = ask(&*console, &prompt)? else {
            return Ok(());
        };
        let question = question.trim().trim_end_matches('?');
        if question.is_empty() {
            console.warn("no question given, nothing learned");
            return Ok(());
        }

        cursor.learn(question, name)?;
        console.say(&format!("Learned {name}."));
        Ok(())
    }

    fn save(&mut self, arg: Option<&str>) -> ApplicationResult<()> {
        let format = match ask(&*self.console, "format [text/graph]:")? {
            Some(f) if !f.trim().is_empty() => f.parse::<ExportFormat>()?,
            _ => ExportFormat::Text,
        };
        let path = match self.argument(arg, "path:")? {
            Some(path) => PathBuf::from(path),
            None => match &self.file {
                Some(file) => file.clone(),
                None => {
                    self.console.warn("no path given, nothing saved");
                    return Ok(());
                }
            },
        };
        self.knowledge.save(&self.kb, &path, format)?;
        if format == ExportFormat::Text {
            self.file = Some(path.clone());
        }
        self.console.say(&format!("Saved to {}.", path.display()));
        Ok(())
    }

    fn load(&mut self, arg: Option<&str>) -> ApplicationResult<()> {
        let Some(path) = self.argument(arg, "path:")? else {
            self.console.warn("no path given, nothing loaded");
            return Ok(());
        };
        let path = PathBuf::from(path);
        self.kb = self.knowledge.load(&path)?;
        self.console.say(&format!(
            "Loaded {} subjects from {}.",
            self.kb.leaf_count(),
            path.display()
        ));
        self.file = Some(path);
        Ok(())
    }

    fn define(&mut self, arg: Option<&str>) -> ApplicationResult<()> {
        let Some(subject) = self.argument(arg, "subject:")? else {
            return Ok(());
        };
        let definition = self.knowledge.describe(&self.kb, &subject)?;
        self.console.say(&definition.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("y", true)]
    #[case("yes", true)]
    #[case("", true)]
    #[case("whatever", true)]
    #[case("n", false)]
    #[case("No", false)]
    #[case("  nope", false)]
    fn given_answer_when_checking_then_only_n_means_no(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }

    #[rstest]
    #[case("play", SessionCommand::Play)]
    #[case("START", SessionCommand::Play)]
    #[case("exit", SessionCommand::Quit)]
    #[case("subjects", SessionCommand::Subjects)]
    fn given_command_word_when_parsing_then_matches(#[case] word: &str, #[case] expected: SessionCommand) {
        assert_eq!(word.parse::<SessionCommand>().unwrap(), expected);
    }

    #[test]
    fn given_unknown_command_when_parsing_then_errors() {
        assert!("dance".parse::<SessionCommand>().is_err());
    }
}
