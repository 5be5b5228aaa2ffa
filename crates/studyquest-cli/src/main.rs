use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use studyquest_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::Context;

#[derive(Parser)]
#[command(name = "studyquest", version, about = "StudyQuest CLI")]
struct Cli {
    /// User ID to act as (defaults to the configured default_user)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Progress record and summary
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Chapter completion
    Chapter {
        #[command(subcommand)]
        action: commands::chapter::ChapterAction,
    },
    /// Sub-topic completion
    Subtopic {
        #[command(subcommand)]
        action: commands::subtopic::SubTopicAction,
    },
    /// Chapter plans and tasks
    Plan {
        #[command(subcommand)]
        action: commands::plan::PlanAction,
    },
    /// Student settings
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Plan deadlines, soonest first
    Deadlines(commands::deadlines::DeadlinesArgs),
    /// Parent account management
    Parent {
        #[command(subcommand)]
        action: commands::parent::ParentAction,
    },
    /// Syllabus inspection
    Syllabus {
        #[command(subcommand)]
        action: commands::syllabus::SyllabusAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Print a shell completion script
    Completions {
        /// Target shell
        shell: Shell,
    },
}

/// Logs go to stderr so stdout stays machine-readable.
/// `STUDYQUEST_LOG` overrides the configured filter.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("STUDYQUEST_LOG")
            .unwrap_or_else(|_| EnvFilter::new(Config::load_or_default().logging.filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let user = cli.user;
    let ctx = || Context::open(user.clone());

    match cli.command {
        Commands::Progress { action } => commands::progress::run(&ctx()?, action),
        Commands::Chapter { action } => commands::chapter::run(&ctx()?, action),
        Commands::Subtopic { action } => commands::subtopic::run(&ctx()?, action),
        Commands::Plan { action } => commands::plan::run(&ctx()?, action),
        Commands::Settings { action } => commands::settings::run(&ctx()?, action),
        Commands::Deadlines(args) => commands::deadlines::run(&ctx()?, args),
        Commands::Parent { action } => commands::parent::run(&ctx()?, action),
        Commands::Syllabus { action } => commands::syllabus::run(&ctx()?, action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "studyquest", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
