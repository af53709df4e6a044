use anyhow::{Context, Result};
use clap::Parser;
use noor_core::config::load_config;
use noor_core::guidance::{NoorAi, PersonalAdviceInput};
use noor_core::request::{HistoryWindow, RequestAssembler};
use noor_core::session::GuidanceSession;
use std::io;
use tracing::error;

mod app;
mod cli;
mod logging;
mod output;

use crate::cli::{Args, Command};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(model) = args.model {
        config.model_name = Some(model);
    }
    if let Some(max_turns) = args.max_history_turns {
        config.max_history_turns = Some(max_turns);
    }

    let noor = match NoorAi::from_config(&config) {
        Ok(noor) => noor,
        Err(e) => {
            error!(error = %e, "Failed to initialize NoorAI");
            return Err(anyhow::Error::new(e).context("Failed to initialize NoorAI"));
        }
    };

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let assembler = RequestAssembler::new(HistoryWindow::from(config.max_history_turns));
            let mut session = GuidanceSession::new(noor, assembler);
            let stdin = io::stdin();
            let mut stdout = io::stdout();
            app::run_chat(&mut session, stdin.lock(), &mut stdout).await
        }
        Command::Hadith { text } => app::run_hadith(&noor, text).await,
        Command::Advice {
            situation,
            personal_values,
            cultural_context,
            age,
            gender,
        } => {
            let input = PersonalAdviceInput {
                situation,
                personal_values,
                cultural_context,
                age,
                gender,
            };
            app::run_advice(&noor, input).await
        }
    }
}
