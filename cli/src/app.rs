use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use noor_core::guidance::{GuidanceClient, HadithInsightsInput, NoorAi, PersonalAdviceInput};
use noor_core::session::GuidanceSession;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::{debug, info};

use crate::output::{
    print_hadith_insights, print_personal_advice, write_assistant, write_error, write_history,
};

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// What the user typed at the prompt
#[derive(Debug, PartialEq, Eq)]
enum ChatCommand<'a> {
    Exit,
    History,
    Clear,
    /// Empty line: resend the last failed message, if there is one.
    Retry,
    Message(&'a str),
}

fn parse_command(line: &str) -> ChatCommand<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ChatCommand::Retry;
    }
    if trimmed.eq_ignore_ascii_case("exit") || trimmed.eq_ignore_ascii_case("quit") {
        return ChatCommand::Exit;
    }
    match trimmed {
        "/history" => ChatCommand::History,
        "/clear" => ChatCommand::Clear,
        _ => ChatCommand::Message(trimmed),
    }
}

/// Runs the multi-turn guidance loop until `exit` or end of input.
///
/// A message whose request fails is kept; pressing Enter on an empty line sends it again.
pub async fn run_chat<C, R, W>(session: &mut GuidanceSession<C>, input: R, out: &mut W) -> Result<()>
where
    C: GuidanceClient,
    R: BufRead,
    W: Write,
{
    writeln!(out, "{}", "Chat with NoorAI for guidance rooted in the Qur'an and Sunnah.".cyan())?;
    writeln!(out, "Type '/history' to review, '/clear' to start over, 'exit' to leave.")?;
    writeln!(out)?;

    let mut pending: Option<String> = None;
    let mut lines = input.lines();

    loop {
        write!(out, "{}: ", "You".green().bold())?;
        out.flush().context("Failed to flush output")?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let line = line.context("Failed to read input")?;

        let message = match parse_command(&line) {
            ChatCommand::Exit => {
                writeln!(out, "Exiting chat session.")?;
                break;
            }
            ChatCommand::History => {
                write_history(out, session.conversation().snapshot())?;
                continue;
            }
            ChatCommand::Clear => {
                session.reset();
                pending = None;
                writeln!(out, "{}", "Started a new conversation.".dimmed())?;
                continue;
            }
            ChatCommand::Retry => match pending.take() {
                Some(message) => message,
                None => continue,
            },
            ChatCommand::Message(text) => {
                pending = None;
                text.to_string()
            }
        };

        debug!(input_len = message.len(), "Submitting message");
        let progress = spinner("Seeking guidance...");
        let result = session.submit(&message).await;
        progress.finish_and_clear();

        match result {
            Ok(response) => write_assistant(out, &response.advice)?,
            Err(e) => {
                write_error(out, &e.user_message())?;
                writeln!(out, "{}", "Press Enter to resend your message.".dimmed())?;
                pending = Some(message);
            }
        }
        writeln!(out)?;
    }

    info!(turns = session.conversation().len(), "Chat session ended");
    Ok(())
}

pub async fn run_hadith(noor: &NoorAi, text: String) -> Result<()> {
    let progress = spinner("Studying the Hadith...");
    let result = noor
        .extract_hadith_insights(&HadithInsightsInput { hadith_text: text })
        .await;
    progress.finish_and_clear();

    let output = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    print_hadith_insights(&output);
    Ok(())
}

pub async fn run_advice(noor: &NoorAi, input: PersonalAdviceInput) -> Result<()> {
    let progress = spinner("Preparing your advice...");
    let result = noor.personalize_advice(&input).await;
    progress.finish_and_clear();

    let output = result.map_err(|e| anyhow::anyhow!(e.user_message()))?;
    print_personal_advice(&output);
    Ok(())
}
