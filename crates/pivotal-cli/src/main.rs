mod cmd;
mod output;

use clap::{Parser, Subcommand};
use cmd::story::StoryKind;
use pivotal_core::{Client, Config, Transition};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "pivotal",
    about = "Pivotal Tracker from the terminal: reports, planning poker and story actions",
    version,
    propagate_version = true
)]
struct Cli {
    /// 1-based project position (as listed by `pivotal projects`); skips the prompt
    #[arg(
        long,
        global = true,
        env = "PIVOTAL_PROJECT_INDEX",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    project_index: Option<u64>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the projects visible to your token
    Projects,

    /// Delivered and finished work, grouped for release notes
    Changelog,

    /// Show the top open stories of a project
    Stories {
        /// Owner name or initials
        #[arg(long = "for")]
        owner: Option<String>,

        /// How many stories to show
        #[arg(long, short = 'n')]
        number: Option<usize>,
    },

    /// Show the details of one story
    Story { story_id: String },

    /// Open a story in the browser
    Open { story_id: String },

    /// In-progress work grouped by owner, plus open bugs
    Scrum,

    /// Estimate unestimated stories one by one
    #[command(alias = "planning")]
    Poker,

    /// Create a story
    Create {
        #[arg(value_enum)]
        kind: StoryKind,
        title: String,
        description: Option<String>,
    },

    /// Mark a story started
    Start { story_id: String },
    /// Mark a story finished
    Finish { story_id: String },
    /// Mark a story delivered
    Deliver { story_id: String },
    /// Accept a delivered story
    Accept { story_id: String },
    /// Reject a delivered story
    Reject { story_id: String },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` when set and valid, `warn` otherwise.
fn log_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Resolved before any request so a missing token is reported first.
    let config = Config::from_env()?;
    let client = Client::from_config(&config)?;
    let index = cli.project_index.map(|i| (i - 1) as usize);
    let json = cli.json;

    match cli.command {
        Commands::Projects => cmd::project::list(&client, json),
        Commands::Changelog => cmd::report::changelog(&client, index, json),
        Commands::Stories { owner, number } => {
            cmd::story::list(&client, index, owner.as_deref(), number, json)
        }
        Commands::Story { story_id } => cmd::story::show(&client, &story_id, index, json),
        Commands::Open { story_id } => cmd::story::open(&client, &story_id, index),
        Commands::Scrum => cmd::report::scrum(&client, index, json),
        Commands::Poker => cmd::poker::run(&client, index),
        Commands::Create {
            kind,
            title,
            description,
        } => cmd::story::create(&client, index, kind, &title, description, json),
        Commands::Start { story_id } => {
            cmd::story::transition(&client, &story_id, index, Transition::Start, json)
        }
        Commands::Finish { story_id } => {
            cmd::story::transition(&client, &story_id, index, Transition::Finish, json)
        }
        Commands::Deliver { story_id } => {
            cmd::story::transition(&client, &story_id, index, Transition::Deliver, json)
        }
        Commands::Accept { story_id } => {
            cmd::story::transition(&client, &story_id, index, Transition::Accept, json)
        }
        Commands::Reject { story_id } => {
            cmd::story::transition(&client, &story_id, index, Transition::Reject, json)
        }
    }
}
