//! Interactive line shell over a [`Session`].
//!
//! DESIGN
//! ======
//! Parsing is a pure function from one input line to a [`ShellCommand`] or a
//! [`UsageError`]. Execution maps each command onto exactly one flow
//! operation and renders the affected view. Flow errors are shown inline and
//! never end the loop; only terminal I/O failures do.
//!
//! The shell stands in for the tabbed app shell: `open`/`drop` are the file
//! picker and drop zone, the upload commands drive the upload card, and the
//! theme command is the header toggle.

#[cfg(test)]
#[path = "shell_test.rs"]
mod shell_test;

use std::path::PathBuf;

use client::state::error::FlowError;
use client::state::session::Session;
use client::state::upload::SelectionSource;
use client::util::theme::{Theme, ThemeStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::CliError;
use crate::files::read_selected_file;
use crate::render::{
    Palette, error_line, history_view, questions_view, results_view, status_view, suggestions_view, turn_view,
    upload_view,
};

pub const PROMPT: &str = "docassist> ";

pub const HELP: &str = "\
Document
  open <path>          select a PDF or TXT file
  drop <path>          same as open, as if dropped onto the window
  upload               upload the selected file and show its summary
  reset                forget the selected file and summary
Ask Anything
  ask <question>       ask about the document (no text sends the draft)
  suggest [n]          list suggested questions, or draft suggestion n
  history              show the conversation
  clear                clear the conversation
Challenge
  challenge            generate a fresh set of questions
  answer <n> <text>    answer question n
  submit               grade the answers
  results              show the last grading result
Other
  theme [show|toggle|dark|light]
  status               summarize session state
  help                 show this text
  quit                 leave the shell";

// =============================================================================
// PARSING
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
    Dark,
    Light,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Open(PathBuf),
    Drop(PathBuf),
    Upload,
    Reset,
    /// `None` submits the current draft.
    Ask(Option<String>),
    Clear,
    Suggest(Option<usize>),
    History,
    Challenge,
    /// `number` is 1-based, as displayed.
    Answer { number: usize, text: String },
    Submit,
    Results,
    Theme(ThemeAction),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct UsageError(String);

fn usage(text: impl Into<String>) -> UsageError {
    UsageError(text.into())
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns a [`UsageError`] for unknown commands or malformed arguments.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, UsageError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let verb = verb.to_ascii_lowercase();

    let bare = |command: ShellCommand| {
        if rest.is_empty() { Ok(command) } else { Err(usage(format!("`{verb}` takes no arguments"))) }
    };

    let command = match verb.as_str() {
        "open" | "drop" => {
            if rest.is_empty() {
                return Err(usage(format!("usage: {verb} <path>")));
            }
            let path = PathBuf::from(rest);
            if verb == "open" { ShellCommand::Open(path) } else { ShellCommand::Drop(path) }
        }
        "upload" => bare(ShellCommand::Upload)?,
        "reset" => bare(ShellCommand::Reset)?,
        "ask" => ShellCommand::Ask((!rest.is_empty()).then(|| rest.to_owned())),
        "clear" => bare(ShellCommand::Clear)?,
        "suggest" => {
            if rest.is_empty() {
                ShellCommand::Suggest(None)
            } else {
                ShellCommand::Suggest(Some(parse_number(rest, "usage: suggest [n]")?))
            }
        }
        "history" => bare(ShellCommand::History)?,
        "challenge" => bare(ShellCommand::Challenge)?,
        "answer" => {
            let (number, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            let number = parse_number(number, "usage: answer <n> <text>")?;
            ShellCommand::Answer { number, text: text.trim().to_owned() }
        }
        "submit" => bare(ShellCommand::Submit)?,
        "results" => bare(ShellCommand::Results)?,
        "theme" => ShellCommand::Theme(match rest.to_ascii_lowercase().as_str() {
            "" | "toggle" => ThemeAction::Toggle,
            "show" => ThemeAction::Show,
            "dark" => ThemeAction::Dark,
            "light" => ThemeAction::Light,
            _ => return Err(usage("usage: theme [show|toggle|dark|light]")),
        }),
        "status" => bare(ShellCommand::Status)?,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        _ => return Err(usage(format!("unknown command `{verb}`; type `help` for a list"))),
    };
    Ok(Some(command))
}

/// Positive 1-based index.
fn parse_number(raw: &str, message: &str) -> Result<usize, UsageError> {
    match raw.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(usage(message)),
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

/// Output of one command.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub quit: bool,
}

impl Reply {
    fn show(text: String) -> Self {
        Self { text, quit: false }
    }
}

/// The flow's stored message when it has one, else the error itself.
fn failure_line(p: &Palette, stored: Option<&str>, err: &FlowError) -> String {
    match stored {
        Some(message) => error_line(p, message),
        None => error_line(p, &err.to_string()),
    }
}

/// Append the error unless the flow already stored and rendered it.
fn with_error(p: &Palette, view: String, stored: Option<&str>, result: Result<(), FlowError>) -> String {
    match result {
        Err(err) if stored != Some(err.to_string().as_str()) => {
            format!("{view}\n{}", error_line(p, &err.to_string()))
        }
        _ => view,
    }
}

pub struct Shell {
    session: Session,
    theme: ThemeStore,
    colored: bool,
}

impl Shell {
    pub fn new(session: Session, theme: ThemeStore, colored: bool) -> Self {
        Self { session, theme, colored }
    }

    #[cfg(test)]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[cfg(test)]
    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    #[must_use]
    pub fn palette(&self) -> Palette {
        if self.colored { Palette::for_theme(self.theme.current()) } else { Palette::PLAIN }
    }

    pub async fn execute(&mut self, command: ShellCommand) -> Reply {
        let p = self.palette();
        let text = match command {
            ShellCommand::Open(path) => self.select(path, SelectionSource::Picker).await,
            ShellCommand::Drop(path) => self.select(path, SelectionSource::DragDrop).await,
            ShellCommand::Upload => {
                let result = self.session.upload.upload().await;
                let upload = &self.session.upload;
                with_error(&p, upload_view(upload, &p), upload.error(), result)
            }
            ShellCommand::Reset => {
                self.session.upload.reset_upload();
                upload_view(&self.session.upload, &p)
            }
            ShellCommand::Ask(question) => {
                let result = match question {
                    Some(question) => self.session.ask.submit_question(&question).await,
                    None => self.session.ask.submit_input().await,
                };
                let ask = &self.session.ask;
                match (result, ask.history().last()) {
                    (Ok(()), Some(turn)) => turn_view(ask.history().len(), turn, &p),
                    (Ok(()), None) => String::new(),
                    (Err(err), _) => failure_line(&p, ask.error(), &err),
                }
            }
            ShellCommand::Clear => {
                self.session.ask.clear_history();
                format!("Conversation cleared.\n{}", suggestions_view(&self.session.ask, &p))
            }
            ShellCommand::Suggest(None) => suggestions_view(&self.session.ask, &p),
            ShellCommand::Suggest(Some(n)) => match self.session.ask.suggestions().get(n - 1) {
                Some(suggestion) => {
                    self.session.ask.set_input(*suggestion);
                    format!("Draft: {suggestion}\n{}", p.muted("Run `ask` to send it."))
                }
                None => suggestions_view(&self.session.ask, &p),
            },
            ShellCommand::History => history_view(&self.session.ask, &p),
            ShellCommand::Challenge => {
                let result = self.session.challenge.load_questions().await;
                let challenge = &self.session.challenge;
                with_error(&p, questions_view(challenge, &p), challenge.error(), result)
            }
            ShellCommand::Answer { number, text } => self.answer(number, text),
            ShellCommand::Submit => {
                let result = self.session.challenge.submit_answers().await;
                let challenge = &self.session.challenge;
                match result {
                    Ok(()) => results_view(challenge, &p),
                    Err(err) => failure_line(&p, challenge.error(), &err),
                }
            }
            ShellCommand::Results => results_view(&self.session.challenge, &p),
            ShellCommand::Theme(action) => self.apply_theme(action),
            ShellCommand::Status => status_view(&self.session, self.theme.current(), &p),
            ShellCommand::Help => HELP.to_owned(),
            ShellCommand::Quit => return Reply { text: String::new(), quit: true },
        };
        Reply::show(text)
    }

    fn answer(&mut self, number: usize, text: String) -> String {
        let p = self.palette();
        let challenge = &mut self.session.challenge;
        let Some(id) = challenge.questions().get(number - 1).map(|q| q.id.clone()) else {
            return error_line(&p, &format!("There is no question {number}."));
        };
        match challenge.set_answer(&id, text) {
            Ok(()) if challenge.can_submit() => {
                format!("Saved answer {number}. All questions answered; run `submit`.")
            }
            Ok(()) => format!("Saved answer {number}."),
            Err(err) => error_line(&p, &err.to_string()),
        }
    }

    async fn select(&mut self, path: PathBuf, source: SelectionSource) -> String {
        let p = self.palette();
        // A rejected file is reported through the flow's stored error.
        match read_selected_file(&path).await {
            Ok(file) => {
                let _ = self.session.upload.select_file(file, source);
            }
            Err(CliError::Flow(err)) => {
                tracing::debug!(path = %path.display(), ?source, error = %err, "file rejected before reading");
                let _ = self.session.upload.reject_selection(err);
            }
            Err(err) => return error_line(&p, &err.to_string()),
        }
        upload_view(&self.session.upload, &p)
    }

    fn apply_theme(&mut self, action: ThemeAction) -> String {
        let result = match action {
            ThemeAction::Show => Ok(()),
            ThemeAction::Toggle => self.theme.toggle().map(|_| ()),
            ThemeAction::Dark => self.theme.set(Theme::Dark),
            ThemeAction::Light => self.theme.set(Theme::Light),
        };
        let p = self.palette();
        let line = format!("Theme: {}", p.accent(self.theme.current().as_str()));
        match result {
            Ok(()) => line,
            Err(err) => {
                tracing::warn!(error = %err, "theme preference not saved");
                format!("{line}\n{}", error_line(&p, &format!("preference not saved: {err}")))
            }
        }
    }

    /// Read commands from `input` until EOF or `quit`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Io`] if reading input or writing output fails.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> Result<(), CliError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = input.lines();
        let banner = format!("{}\nType `help` for commands.\n", self.palette().accent("Document Assistant"));
        output.write_all(banner.as_bytes()).await?;
        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;
            let Some(line) = lines.next_line().await? else {
                break;
            };
            let reply = match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(command)) => {
                    tracing::debug!(?command, "shell command");
                    self.execute(command).await
                }
                Err(err) => Reply::show(error_line(&self.palette(), &err.to_string())),
            };
            if !reply.text.is_empty() {
                output.write_all(reply.text.as_bytes()).await?;
                output.write_all(b"\n").await?;
            }
            if reply.quit {
                break;
            }
        }
        output.flush().await?;
        Ok(())
    }
}
