//! pr-agent - CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{info, warn};

use pr_agent::process::check_git_installed;
use pr_agent::templates::DEFAULT_TEMPLATES_DIR;
use pr_agent::tools::StaticWorkingDir;
use pr_agent::{ChangeAnalyzer, DirectoryTemplateSource, PrAgentTools, SystemRunner, logging, server};

/// Serve PR-preparation tools over stdio.
#[derive(Parser, Debug)]
#[command(name = "pr-agent")]
#[command(about = "Serve git change analysis and PR template tools over stdio")]
#[command(version)]
struct Cli {
    /// Repository to run git in (defaults to the current directory)
    #[arg(long)]
    repo: Option<PathBuf>,

    /// Directory containing `*.md` PR templates
    #[arg(long, env = "PR_AGENT_TEMPLATES_DIR", default_value = DEFAULT_TEMPLATES_DIR)]
    templates_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init();

    // Each tool call reports a missing git on its own; this is only a heads-up.
    match check_git_installed() {
        Ok(path) => info!(git = %path.display(), "found git"),
        Err(e) => warn!("{}", e.user_message()),
    }

    let runner = SystemRunner::default();
    let analyzer = ChangeAnalyzer::new(Arc::new(runner.clone())).with_time_limit(runner.timeout());
    let tools = Arc::new(PrAgentTools::new(
        analyzer,
        DirectoryTemplateSource::new(&cli.templates_dir),
        StaticWorkingDir(cli.repo),
    ));

    info!(templates_dir = %cli.templates_dir.display(), "serving on stdio");

    server::serve(tools, BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("stdio transport failed")?;

    Ok(())
}
