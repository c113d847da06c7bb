use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use muxpick::app::{App, PickerSettings, Sources};
use muxpick::candidate::Mode;
use muxpick::config::Config;
use muxpick::event_loop;
use muxpick::logging;
use muxpick::source::tmux::attach_session;
use muxpick::source::{
    CandidateSource, CommandRunner, GitWorktreeSource, SystemRunner, TmuxClient, TmuxSessionSource,
};

#[derive(Parser)]
#[command(name = "muxpick")]
#[command(about = "Fuzzy picker for tmux sessions and git worktrees")]
#[command(version)]
struct Cli {
    /// Directory used to find the git repository (defaults to the current directory)
    #[arg(short = 'C', long = "dir", global = true)]
    dir: Option<PathBuf>,

    /// Path to the config file (defaults to <config dir>/muxpick/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Pick a tmux session
    Sessions,

    /// Pick a git worktree of the current repository
    Worktrees,

    /// Write the default configuration file
    InitConfig {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mode = match cli.command {
        Some(Commands::InitConfig { force }) => {
            return init_config(cli.config.as_deref(), force);
        }
        Some(Commands::Sessions) => Some(Mode::Session),
        Some(Commands::Worktrees) => Some(Mode::Worktree),
        None => None,
    };

    let config = Config::load(cli.config.as_deref())?;

    // Logging is best effort; the picker still works without a log file
    match logging::init(&config.log, cli.verbose) {
        Ok(path) => tracing::debug!(path = %path.display(), "logging initialized"),
        Err(e) => eprintln!("muxpick: logging disabled: {:#}", e),
    }

    if !std::io::stdin().is_terminal() {
        anyhow::bail!("muxpick must be run in an interactive terminal");
    }

    let start_dir = match cli.dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };
    let mode = mode.unwrap_or(config.default_mode);
    let sources = build_sources(&config, &start_dir);

    let app = App::open(mode, sources)
        .with_context(|| format!("Failed to open the {} picker", mode.display_name()))?
        .with_settings(PickerSettings {
            remove_after_merge: config.worktree.remove_after_merge,
        });
    let outcome = event_loop::run(app)?;

    if let Some(session) = outcome.attach_on_exit() {
        tracing::info!(session, "attaching after exit");
        let status = attach_session(session)
            .with_context(|| format!("Failed to run tmux attach-session for '{}'", session))?;
        if !status.success() {
            anyhow::bail!("tmux attach-session exited with {}", status);
        }
    }

    Ok(())
}

fn build_sources(config: &Config, start_dir: &Path) -> Sources {
    let runner: Rc<dyn CommandRunner> = Rc::new(SystemRunner::new(config.command_timeout()));
    let tmux = TmuxClient::from_env(Rc::clone(&runner));

    let sessions = TmuxSessionSource::new(tmux.clone(), config.session.default_dir.clone());
    let worktrees =
        GitWorktreeSource::discover(runner, tmux, start_dir, config.worktree.clone())
            .map(|source| Box::new(source) as Box<dyn CandidateSource>)
            .map_err(|e| {
                tracing::info!(error = %e, "worktree mode unavailable");
                e.to_string()
            });

    Sources::new(Box::new(sessions), worktrees)
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Config::config_path()?,
    };

    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
