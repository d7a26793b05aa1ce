//! Grove — workspace manager for a bare git repository and its worktrees.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use grove::commands;
use grove::git::{GitBackend, SystemGit};

#[derive(Parser)]
#[command(
    name = "grove",
    about = "Manage a bare git repository and its sibling worktrees",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a workspace (bare clone plus a default-branch worktree).
    Init {
        /// Repository URL to clone; omit for an empty workspace.
        url: Option<String>,
        /// Directory to create the workspace in.
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Create a branch and a worktree for it.
    Add {
        /// Branch to check out (created if it does not exist).
        branch: String,
        /// Ref a fresh branch starts from (defaults to HEAD).
        #[arg(long)]
        base: Option<String>,
    },
    /// List worktrees and their sync status.
    List {
        /// Skip sync-status computation.
        #[arg(long)]
        fast: bool,
        /// Emit machine-readable JSON.
        #[arg(long)]
        json: bool,
    },
    /// Remove one or more worktrees.
    #[command(alias = "rm")]
    Remove {
        /// Worktrees, by directory name or branch.
        #[arg(required = true)]
        targets: Vec<String>,
        /// Remove even when dirty or locked.
        #[arg(short, long)]
        force: bool,
    },
    /// Rename a branch together with its worktree directory.
    #[command(alias = "mv")]
    Rename {
        /// Current worktree name or branch.
        old: String,
        /// New branch name.
        new: String,
    },
    /// Lock one or more worktrees against mutation.
    Lock {
        /// Worktrees, by directory name or branch.
        #[arg(required = true)]
        targets: Vec<String>,
        /// Reason to record with the lock.
        #[arg(long)]
        reason: Option<String>,
    },
    /// Unlock one or more worktrees.
    Unlock {
        /// Worktrees, by directory name or branch.
        #[arg(required = true)]
        targets: Vec<String>,
    },
    /// Run a command in each target worktree.
    Exec {
        /// Run in every worktree.
        #[arg(long)]
        all: bool,
        /// Worktrees, by directory name or branch.
        targets: Vec<String>,
        /// Command to run (after `--`).
        #[arg(last = true, required = true)]
        command: Vec<String>,
    },
    /// Fetch remotes and report ref changes.
    Fetch {
        /// Remotes to fetch; omit for all configured remotes.
        remotes: Vec<String>,
    },
    /// Diagnose workspace consistency and remote reachability.
    Doctor,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let git: Arc<dyn GitBackend> = Arc::new(SystemGit::new());

    let result = match cli.command {
        Commands::Init { url, dir } => commands::init::run(git, url, dir).await,
        Commands::Add { branch, base } => commands::add::run(git, &branch, base.as_deref()).await,
        Commands::List { fast, json } => commands::list::run(git, fast, json).await,
        Commands::Remove { targets, force } => commands::remove::run(git, &targets, force).await,
        Commands::Rename { old, new } => commands::rename::run(git, &old, &new).await,
        Commands::Lock { targets, reason } => {
            commands::lock::lock(git, &targets, reason.as_deref()).await
        }
        Commands::Unlock { targets } => commands::lock::unlock(git, &targets).await,
        Commands::Exec {
            all,
            targets,
            command,
        } => commands::exec::run(git, &targets, all, &command).await,
        Commands::Fetch { remotes } => commands::fetch::run(git, &remotes).await,
        Commands::Doctor => commands::doctor::run(git).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
