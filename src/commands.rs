//! One-shot subcommands. Each builds on the same session and views as the
//! shell but fails fast: the first flow error ends the command.

#[cfg(test)]
#[path = "commands_test.rs"]
mod commands_test;

use std::path::Path;

use client::state::session::Session;
use client::state::upload::SelectionSource;
use client::util::theme::{Theme, ThemeStore};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::CliError;
use crate::files::read_selected_file;
use crate::render::{Palette, history_view, questions_view, results_view, upload_view};
use crate::shell::ThemeAction;

async fn write_block<W: AsyncWrite + Unpin>(out: &mut W, text: &str) -> Result<(), CliError> {
    out.write_all(text.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

/// Select and upload `path`, leaving its text in the session's document
/// context.
pub async fn load_document(session: &mut Session, path: &Path) -> Result<(), CliError> {
    let file = read_selected_file(path).await?;
    session.upload.select_file(file, SelectionSource::Picker)?;
    session.upload.upload().await?;
    Ok(())
}

pub async fn ping<W: AsyncWrite + Unpin>(session: &Session, out: &mut W) -> Result<(), CliError> {
    let health = session.backend().health().await?;
    write_block(out, &health.status).await
}

pub async fn summarize<W: AsyncWrite + Unpin>(
    session: &mut Session,
    path: &Path,
    p: &Palette,
    out: &mut W,
) -> Result<(), CliError> {
    load_document(session, path).await?;
    write_block(out, &upload_view(&session.upload, p)).await
}

/// Ask each question in order; later questions carry the earlier turns as
/// memory.
pub async fn ask<W: AsyncWrite + Unpin>(
    session: &mut Session,
    path: &Path,
    questions: &[String],
    p: &Palette,
    out: &mut W,
) -> Result<(), CliError> {
    load_document(session, path).await?;
    for question in questions {
        session.ask.submit_question(question).await?;
    }
    write_block(out, &history_view(&session.ask, p)).await
}

/// Generate questions, read one answer line per question from `input`, and
/// print the graded result.
pub async fn challenge<R, W>(
    session: &mut Session,
    path: &Path,
    p: &Palette,
    input: R,
    out: &mut W,
) -> Result<(), CliError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    load_document(session, path).await?;
    session.challenge.load_questions().await?;
    write_block(out, &questions_view(&session.challenge, p)).await?;

    let questions = session.challenge.questions().to_vec();
    let mut lines = input.lines();
    for (i, question) in questions.iter().enumerate() {
        out.write_all(format!("Answer {}: ", i + 1).as_bytes()).await?;
        out.flush().await?;
        let Some(line) = lines.next_line().await? else {
            return Err(CliError::MissingAnswers { expected: questions.len(), got: i });
        };
        session.challenge.set_answer(&question.id, line.trim())?;
    }
    out.write_all(b"\n").await?;

    session.challenge.submit_answers().await?;
    write_block(out, &results_view(&session.challenge, p)).await
}

pub async fn theme<W: AsyncWrite + Unpin>(
    store: &mut ThemeStore,
    action: ThemeAction,
    out: &mut W,
) -> Result<(), CliError> {
    match action {
        ThemeAction::Show => {}
        ThemeAction::Toggle => {
            store.toggle()?;
        }
        ThemeAction::Dark => store.set(Theme::Dark)?,
        ThemeAction::Light => store.set(Theme::Light)?,
    }
    write_block(out, store.current().as_str()).await
}
