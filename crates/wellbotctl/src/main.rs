//! WellBot Control - symptom intake client.
//!
//! Select body parts, request a diagnosis, read it back and leave feedback.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use wellbotctl::config::ClientConfig;

#[derive(Parser)]
#[command(name = "wellbotctl")]
#[command(about = "WellBot - symptom intake and diagnosis client", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List selectable body parts and their highlight state
    Parts {
        /// Toggle a part (repeatable)
        #[arg(long = "part")]
        parts: Vec<String>,
    },

    /// Request a diagnosis for the selected body parts
    Diagnose(DiagnoseArgs),

    /// Show the last stored diagnosis
    Show {
        /// Presentation language (en, hi)
        #[arg(long, default_value = "en")]
        lang: String,

        /// Read the result aloud
        #[arg(long)]
        speak: bool,
    },

    /// Submit or list feedback
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },
}

#[derive(Args)]
pub struct DiagnoseArgs {
    /// Toggle a body part (repeatable)
    #[arg(long = "part")]
    pub parts: Vec<String>,

    #[arg(long)]
    pub pain_type: Option<String>,

    #[arg(long)]
    pub duration: Option<String>,

    /// 1-10
    #[arg(long, default_value_t = 1)]
    pub severity: u8,

    #[arg(long)]
    pub additional: Option<String>,

    #[arg(long)]
    pub extra_details: Option<String>,

    #[arg(long)]
    pub medical_history: Option<String>,

    #[arg(long)]
    pub age: Option<String>,

    #[arg(long)]
    pub gender: Option<String>,

    #[arg(long)]
    pub follow_up_answer: Option<String>,

    /// Presentation language (en, hi)
    #[arg(long, default_value = "en")]
    pub lang: String,

    /// Read the result aloud
    #[arg(long)]
    pub speak: bool,
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Rate the last diagnosis
    Submit {
        #[arg(long, default_value_t = 3)]
        usefulness: i64,

        #[arg(long, default_value_t = 3)]
        accuracy: i64,

        #[arg(long, default_value = "")]
        comments: String,
    },

    /// List stored feedback, newest first
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::load();

    match cli.command {
        Commands::Parts { parts } => commands::parts(&parts),
        Commands::Diagnose(args) => commands::diagnose(&config, args).await,
        Commands::Show { lang, speak } => commands::show(&config, &lang, speak).await,
        Commands::Feedback { action } => commands::feedback(&config, action).await,
    }
}
