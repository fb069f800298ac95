//! Plain-text views of session state.
//!
//! DESIGN
//! ======
//! Every view is a pure function from flow state to a `String`, so the
//! shell and the one-shot subcommands share them and tests can assert on
//! the output directly. Colour comes from a [`Palette`] chosen per theme;
//! [`Palette::PLAIN`] disables escapes entirely.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use std::fmt::Write as _;

use client::state::ask::{AskFlow, ConversationTurn};
use client::state::challenge::{ChallengeFlow, ScoreBand};
use client::state::session::Session;
use client::state::upload::{UploadFlow, UploadPhase, format_size_mb};
use client::util::theme::Theme;

// =============================================================================
// PALETTE
// =============================================================================

/// ANSI escapes for the few roles the views use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    accent: &'static str,
    good: &'static str,
    bad: &'static str,
    muted: &'static str,
    reset: &'static str,
}

impl Palette {
    pub const PLAIN: Self = Self { accent: "", good: "", bad: "", muted: "", reset: "" };

    /// Bright colours on dark backgrounds, darker ones on light backgrounds.
    #[must_use]
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                accent: "\x1b[96m",
                good: "\x1b[92m",
                bad: "\x1b[91m",
                muted: "\x1b[90m",
                reset: "\x1b[0m",
            },
            Theme::Light => Self {
                accent: "\x1b[34m",
                good: "\x1b[32m",
                bad: "\x1b[31m",
                muted: "\x1b[2m",
                reset: "\x1b[0m",
            },
        }
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if code.is_empty() { text.to_owned() } else { format!("{code}{text}{}", self.reset) }
    }

    #[must_use]
    pub fn accent(&self, text: &str) -> String {
        self.paint(self.accent, text)
    }

    #[must_use]
    pub fn good(&self, text: &str) -> String {
        self.paint(self.good, text)
    }

    #[must_use]
    pub fn bad(&self, text: &str) -> String {
        self.paint(self.bad, text)
    }

    #[must_use]
    pub fn muted(&self, text: &str) -> String {
        self.paint(self.muted, text)
    }
}

// =============================================================================
// VIEWS
// =============================================================================

#[must_use]
pub fn error_line(p: &Palette, message: &str) -> String {
    p.bad(&format!("Error: {message}"))
}

fn push_error(out: &mut String, p: &Palette, error: Option<&str>) {
    if let Some(message) = error {
        let _ = write!(out, "\n{}", error_line(p, message));
    }
}

#[must_use]
pub fn upload_view(flow: &UploadFlow, p: &Palette) -> String {
    let mut out = match (flow.phase(), flow.file()) {
        (UploadPhase::Idle, _) | (_, None) => {
            p.muted("No file selected. Supports PDF and TXT files up to 10MB.")
        }
        (UploadPhase::FileSelected, Some(file)) => format!(
            "{} {} ({})\n{}",
            p.accent("Selected:"),
            file.name,
            format_size_mb(file.size()),
            p.muted("Run `upload` to generate a summary.")
        ),
        (UploadPhase::Uploading, Some(file)) => format!("Uploading {}...", file.name),
        (UploadPhase::Summarized, Some(file)) => format!(
            "{} {} ({})\n\n{}\n{}",
            p.accent("Document:"),
            file.name,
            format_size_mb(file.size()),
            p.accent("Summary"),
            flow.summary().unwrap_or_default()
        ),
    };
    push_error(&mut out, p, flow.error());
    out
}

#[must_use]
pub fn suggestions_view(flow: &AskFlow, p: &Palette) -> String {
    let suggestions = flow.suggestions();
    if suggestions.is_empty() {
        return p.muted("Suggestions are only offered before the first question.");
    }
    let mut out = p.accent("Try asking:");
    for (i, question) in suggestions.iter().enumerate() {
        let _ = write!(out, "\n  {}. {question}", i + 1);
    }
    out
}

/// One question/answer pair, numbered from 1.
#[must_use]
pub fn turn_view(number: usize, turn: &ConversationTurn, p: &Palette) -> String {
    format!(
        "{} {}\n{}\n{} {}",
        p.accent(&format!("Q{number}:")),
        turn.question,
        turn.answer,
        p.muted("Justification:"),
        turn.justification
    )
}

#[must_use]
pub fn history_view(flow: &AskFlow, p: &Palette) -> String {
    let mut out = if flow.history().is_empty() {
        suggestions_view(flow, p)
    } else {
        let turns: Vec<String> = flow
            .history()
            .iter()
            .enumerate()
            .map(|(i, turn)| turn_view(i + 1, turn, p))
            .collect();
        turns.join("\n\n")
    };
    if flow.is_busy() {
        out.push_str("\nThinking...");
    }
    push_error(&mut out, p, flow.error());
    out
}

#[must_use]
pub fn questions_view(flow: &ChallengeFlow, p: &Palette) -> String {
    if flow.questions().is_empty() {
        let mut out = p.muted("No challenge questions loaded. Run `challenge` to generate some.");
        push_error(&mut out, p, flow.error());
        return out;
    }
    let total = flow.questions().len();
    let mut blocks = Vec::with_capacity(total);
    for (i, question) in flow.questions().iter().enumerate() {
        let answer = flow
            .answer(&question.id)
            .map_or_else(|| p.muted("(unanswered)"), str::to_owned);
        blocks.push(format!(
            "{} {}\n{}\nYour answer: {answer}",
            p.accent(&format!("Question {} of {total}", i + 1)),
            p.muted(&format!("[{}]", question.id)),
            question.text
        ));
    }
    let mut out = blocks.join("\n\n");
    if flow.can_submit() {
        let _ = write!(out, "\n\n{}", p.muted("All questions answered. Run `submit` to grade."));
    }
    push_error(&mut out, p, flow.error());
    out
}

#[must_use]
pub fn results_view(flow: &ChallengeFlow, p: &Palette) -> String {
    let Some(result) = flow.result() else {
        let mut out = p.muted("No results yet. Answer every question and run `submit`.");
        push_error(&mut out, p, flow.error());
        return out;
    };
    let mut out = format!(
        "{}\n{}\n{}",
        p.accent("Challenge Complete!"),
        p.accent(&format!("{}%", result.score)),
        ScoreBand::from_score(result.score).message()
    );
    for (i, question) in flow.questions().iter().enumerate() {
        let _ = write!(out, "\n\n{} {}", p.accent(&format!("Q{}:", i + 1)), question.text);
        let _ = write!(out, "\nYour answer: {}", flow.answer(&question.id).unwrap_or_default());
        let Some(feedback) = result.feedback_for(&question.id) else {
            continue;
        };
        let verdict = if feedback.correct { p.good("Correct") } else { p.bad("Incorrect") };
        let _ = write!(out, "\n{verdict}");
        if let Some(explanation) = feedback.explanation.as_deref() {
            let _ = write!(out, "\n{explanation}");
        }
        if !feedback.correct {
            if let Some(correct) = feedback.correct_answer.as_deref() {
                let _ = write!(out, "\n{} {correct}", p.muted("Correct answer:"));
            }
        }
    }
    push_error(&mut out, p, flow.error());
    out
}

#[must_use]
pub fn status_view(session: &Session, theme: Theme, p: &Palette) -> String {
    let upload = match session.upload.phase() {
        UploadPhase::Idle => "idle",
        UploadPhase::FileSelected => "file selected",
        UploadPhase::Uploading => "uploading",
        UploadPhase::Summarized => "summarized",
    };
    let document = session.document();
    let document = if document.is_empty() {
        "none".to_owned()
    } else {
        format!("{} chars", document.text().chars().count())
    };
    let challenge = if session.challenge.result().is_some() {
        "reviewing results".to_owned()
    } else {
        let total = session.challenge.questions().len();
        let answered = total - session.challenge.missing_answers().len();
        format!("{answered}/{total} answered")
    };
    [
        format!("{} {upload}", p.accent("Upload:")),
        format!("{} {document}", p.accent("Document:")),
        format!("{} {} turns", p.accent("Ask:"), session.ask.history().len()),
        format!("{} {challenge}", p.accent("Challenge:")),
        format!("{} {theme}", p.accent("Theme:")),
    ]
    .join("\n")
}
