//! simulado CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use simulado_core::model::{Proficiency, Subject, SubjectMap};

mod commands;

#[derive(Parser)]
#[command(
    name = "simulado",
    version,
    about = "ENEM practice exams generated by an LLM"
)]
struct Cli {
    /// Directory holding the profile and the last session
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter config file
    Init,

    /// Set up the learner profile
    Onboard {
        /// Full name
        #[arg(long)]
        name: String,

        /// Target course (e.g. "Medicina")
        #[arg(long)]
        course: String,

        /// Target university
        #[arg(long)]
        university: Option<String>,

        /// Proficiency in Mathematics: low, medium, high
        #[arg(long)]
        math: Option<Proficiency>,

        /// Proficiency in Human Sciences
        #[arg(long)]
        humanities: Option<Proficiency>,

        /// Proficiency in Natural Sciences
        #[arg(long)]
        nature: Option<Proficiency>,

        /// Proficiency in Languages
        #[arg(long)]
        languages: Option<Proficiency>,
    },

    /// Show or reset the learner profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },

    /// Take a practice exam
    Run {
        /// Subject: math, humanities, nature, languages
        #[arg(long)]
        subject: Option<String>,

        /// Number of questions: 3, 5 or 10 (default: 5)
        #[arg(long)]
        count: Option<String>,

        /// standard or practice (detailed explanations)
        #[arg(long)]
        mode: Option<String>,

        /// Provider name from the config (default: default_provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model override
        #[arg(long)]
        model: Option<String>,
    },

    /// Show the results of the last finished exam
    Results {
        /// Also write an HTML results page
        #[arg(long)]
        html: Option<PathBuf>,

        /// Also write the full report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum ProfileAction {
    /// Print the profile (default)
    Show,
    /// Restore defaults and delete the stored profile
    Reset,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("simulado=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let paths = commands::Paths {
        config: cli.config,
        data_dir: cli.data_dir,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Onboard {
            name,
            course,
            university,
            math,
            humanities,
            nature,
            languages,
        } => commands::onboard::execute(
            &paths,
            commands::onboard::OnboardArgs {
                name,
                course,
                university,
                levels: SubjectMap::from_fn(|subject| match subject {
                    Subject::Math => math,
                    Subject::Humanities => humanities,
                    Subject::Nature => nature,
                    Subject::Languages => languages,
                }),
            },
        ),
        Commands::Profile { action } => match action.unwrap_or(ProfileAction::Show) {
            ProfileAction::Show => commands::profile::show(&paths),
            ProfileAction::Reset => commands::profile::reset(&paths),
        },
        Commands::Run {
            subject,
            count,
            mode,
            provider,
            model,
        } => {
            commands::run::execute(
                &paths,
                commands::run::RunArgs {
                    subject,
                    count,
                    mode,
                    provider,
                    model,
                },
            )
            .await
        }
        Commands::Results { html, json } => commands::results::execute(&paths, html, json),
        Commands::ListModels { provider } => commands::list_models::execute(&paths, provider),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
