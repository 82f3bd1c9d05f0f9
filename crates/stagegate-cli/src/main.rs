mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, cost::CostSubcommand, decision::DecisionSubcommand,
};
use stagegate_core::config::StoreBackend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stagegate",
    about = "Stage-gate completion tracker: record requirement status per stage and derive which gates are passed",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .stagegate/ or .git/)
    #[arg(long, global = true, env = "STAGEGATE_ROOT")]
    root: Option<PathBuf>,

    /// Division whose requirement lists apply (overrides config.yaml)
    #[arg(long, global = true, env = "STAGEGATE_DIVISION")]
    division: Option<String>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize .stagegate/ in the current directory
    Init {
        /// Status store backend
        #[arg(long, default_value = "file")]
        backend: StoreBackend,
    },

    /// List tracked projects with their current gate
    Projects,

    /// Show the stage-gate board for a project
    Board {
        /// Project id
        project: String,
    },

    /// Click one requirement cell: empty → complete → reviewed → empty
    Cell {
        /// Project id
        project: String,
        /// Stage name (e.g. Ideation)
        stage: String,
        /// Requirement name; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        requirement: Vec<String>,
    },

    /// Click a stage header (1 = toggle, 2 = reset this and later stages, 3 = complete stage)
    Header {
        /// Project id
        project: String,
        /// Stage name
        stage: String,
        /// Resolved click count
        #[arg(long, default_value_t = 1)]
        clicks: u32,
    },

    /// Show completed gate flags and the current gate
    Gates {
        /// Project id
        project: String,
    },

    /// List stage-gate document links
    Documents,

    /// Show requirement lists for the active division
    Catalog {
        /// Only this stage
        #[arg(long)]
        stage: Option<String>,
    },

    /// Inspect and validate configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Opportunity decision quadrants
    Decision {
        #[command(subcommand)]
        subcommand: DecisionSubcommand,
    },

    /// Aggregate and summarize cost tracker exports
    Cost {
        #[command(subcommand)]
        subcommand: CostSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let division = cli.division.as_deref();

    let result = match cli.command {
        Commands::Init { backend } => cmd::init::run(&root, division, backend),
        Commands::Projects => cmd::projects::run(&root, division, cli.json),
        Commands::Board { project } => cmd::board::run(&root, division, &project, cli.json),
        Commands::Cell {
            project,
            stage,
            requirement,
        } => cmd::cell::run(
            &root,
            division,
            &project,
            &stage,
            &requirement.join(" "),
            cli.json,
        ),
        Commands::Header {
            project,
            stage,
            clicks,
        } => cmd::header::run(&root, division, &project, &stage, clicks, cli.json),
        Commands::Gates { project } => cmd::gates::run(&root, division, &project, cli.json),
        Commands::Documents => cmd::documents::run(&root, division, cli.json),
        Commands::Catalog { stage } => {
            cmd::catalog::run(&root, division, stage.as_deref(), cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, division, subcommand, cli.json),
        Commands::Decision { subcommand } => cmd::decision::run(subcommand, cli.json),
        Commands::Cost { subcommand } => cmd::cost::run(subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
