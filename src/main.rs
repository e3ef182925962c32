// Operator CLI: one provisioning stage per invocation.
use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use std::io::stderr;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

use bramble_sequencer::{console, FileCursorStore, RunOutcome, Sequencer, StageCatalog};
use bramble_stages::StageContext;

/// Timezone handed to containers when no override is set
const DEFAULT_TIMEZONE: &str = "Etc/UTC";

#[derive(Parser, Debug)]
#[command(author, version, about = "Staged provisioning for Raspberry Pi homelab nodes", long_about = None)]
struct Cli {
    /// Verbose output - shows more detailed logs
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

/// State directory holding the next-stage file and the log file.
fn state_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BRAMBLE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().ok_or_else(|| eyre!("could not determine home directory"))?;
    Ok(home.join(".local/state/bramble"))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let state_dir = state_dir()?;
    std::fs::create_dir_all(&state_dir)?;

    // Every line goes to the terminal and to the append-only log file
    let file_appender = tracing_appender::rolling::never(&state_dir, "bramble.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if cli.verbose { "debug" } else { "info" };
    let default_directives = format!(
        "bramble={level},bramble_stages={level},bramble_sequencer={level},reqwest=warn,hyper=warn",
        level = default_level
    );
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    registry()
        .with(filter)
        .with(fmt::layer().with_writer(stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    let username = std::env::var("USER").unwrap_or_else(|_| "pi".to_string());
    let home = dirs::home_dir().ok_or_else(|| eyre!("could not determine home directory"))?;
    let timezone =
        std::env::var("BRAMBLE_TIMEZONE").unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string());

    let store = FileCursorStore::new(state_dir.join("next-stage"));
    let sequencer = Sequencer::new(StageCatalog::standard(), Box::new(store));

    let cursor = match sequencer.cursor() {
        Ok(cursor) => cursor,
        Err(e) => {
            error!("cannot read saved position: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", console::render(sequencer.catalog(), cursor));

    let selection = match console::prompt_selection(cursor) {
        Ok(selection) => selection,
        Err(e) => {
            error!("invalid selection: {}", e);
            eprintln!("Error: {}", e);
            if let Some(fix) = e.remediation() {
                eprintln!("Next step: {}", fix);
            }
            std::process::exit(1);
        }
    };

    let ctx = StageContext::new(username, home).with_timezone(timezone);

    match sequencer.run_stage(selection, &ctx).await {
        Ok(RunOutcome::Complete) => {
            info!("pipeline complete, saved state cleared");
            println!("All stages are done. Run `bramble` again any time to start over.");
        }
        Ok(RunOutcome::RebootRequired { next }) => {
            info!(next, "stage needs a reboot to take effect");
            println!("This stage needs a reboot. Run `bramble` again after the machine is back.");
            reboot().await?;
        }
        Ok(RunOutcome::ReloginRequired { next }) => {
            info!(next, "stage needs a new login session");
            println!("Log out and back in (new SSH session), then run `bramble` to continue.");
        }
        Ok(RunOutcome::Paused { next }) => {
            println!("Stage complete. Run `bramble` again to continue with stage {}.", next);
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            if let Some(fix) = e.remediation() {
                eprintln!("Next step: {}", fix);
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Reboot the machine after a short cancel window.
async fn reboot() -> Result<()> {
    println!("Rebooting in 5 seconds (Ctrl+C to cancel)...");
    tokio::time::sleep(std::time::Duration::from_secs(5)).await;

    let status = tokio::process::Command::new("sudo")
        .arg("reboot")
        .status()
        .await?;
    if !status.success() {
        return Err(eyre!("reboot command failed with {}", status));
    }
    Ok(())
}
