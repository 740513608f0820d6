use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use client_core::{DashboardClient, RefreshController, RefreshOutcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod terminal;

use terminal::TerminalView;

#[derive(Parser, Debug)]
#[command(about = "Terminal dashboard for live traffic congestion predictions")]
struct Args {
    #[arg(long, env = "DASHBOARD_SERVER_URL", default_value = "http://127.0.0.1:5000")]
    server_url: String,
    /// Per-request timeout; requests wait indefinitely when unset.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Run a single refresh cycle and exit.
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let client = DashboardClient::with_timeout(
        &args.server_url,
        args.timeout_secs.map(Duration::from_secs),
    )
    .with_context(|| format!("cannot use server url '{}'", args.server_url))?;
    info!(server_url = %client.server_url(), "dashboard starting");

    let controller = RefreshController::new(client);
    let mut view = TerminalView::default();

    let outcome = refresh_and_draw(&controller, &mut view).await;
    if args.once {
        return match outcome {
            RefreshOutcome::Rendered { .. } => Ok(()),
            other => anyhow::bail!("refresh did not render: {other:?}"),
        };
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "q" | "quit" => break,
            _ => {
                refresh_and_draw(&controller, &mut view).await;
            }
        }
    }
    Ok(())
}

async fn refresh_and_draw(
    controller: &RefreshController<DashboardClient>,
    view: &mut TerminalView,
) -> RefreshOutcome {
    let outcome = controller.refresh(view).await;
    debug!(?outcome, "refresh cycle finished");
    let refreshed_at = Local::now().format("%H:%M:%S").to_string();
    print!("{}", view.render(&refreshed_at));
    outcome
}
