use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Terminal client for NoorAI
#[derive(Parser, Debug)]
#[command(name = "noor", author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to config file (defaults to ~/.config/noor/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Gemini model to use
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Only send the most recent N turns of history to the model
    #[arg(long, global = true)]
    pub max_history_turns: Option<usize>,

    /// Enable verbose output
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Multi-turn guidance from the Qur'an and Sunnah
    Chat,

    /// Explain a Hadith
    Hadith {
        /// The Hadith text
        text: String,
    },

    /// Personalized advice for a situation
    Advice {
        /// Your situation or challenge
        #[arg(long)]
        situation: String,

        /// Your personal values and beliefs
        #[arg(long = "values", default_value = "")]
        personal_values: String,

        /// Your cultural and social background
        #[arg(long = "culture", default_value = "")]
        cultural_context: String,

        #[arg(long)]
        age: u32,

        #[arg(long, default_value = "")]
        gender: String,
    },
}
