//! Modkit CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

use modkit::{
    CancelToken, InstallReport, InstallWorkflow, InstallerConfig, InstallerError, InstallerResult,
    ProgressEvent, ProgressReporter,
};

/// Automated Fabric mod installer for Minecraft.
#[derive(Debug, Parser)]
#[command(name = "modkit", version, about)]
struct Cli {
    /// Minecraft version to install for (overrides the config file)
    #[arg(short, long)]
    minecraft_version: Option<String>,

    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Suppress the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("modkit=info")),
        )
        .init();
}

/// Render workflow events on a progress bar until the sender hangs up.
async fn render_progress(mut events: UnboundedReceiver<ProgressEvent>) {
    let bar = ProgressBar::new(100);
    if let Ok(style) =
        ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}")
    {
        bar.set_style(style);
    }

    while let Some(event) = events.recv().await {
        match event {
            ProgressEvent::LoaderInstallStarted => bar.set_message("Installing Fabric loader..."),
            ProgressEvent::LoaderInstalled => bar.set_message("Fabric loader installed"),
            ProgressEvent::ModStarted { slug, .. } => {
                bar.set_message(format!("Downloading {slug}..."));
            }
            ProgressEvent::ModDownloaded { slug, fraction } => {
                bar.set_position((fraction * 100.0) as u64);
                bar.set_message(format!("Downloaded {slug}"));
            }
            ProgressEvent::ModUnavailable { slug, fraction } => {
                bar.set_position((fraction * 100.0) as u64);
                bar.set_message(format!("{slug} unavailable"));
            }
            ProgressEvent::Download(_) => {}
            ProgressEvent::RollbackStarted => bar.set_message("Rolling back downloads..."),
            ProgressEvent::ProfileWritten => {
                bar.set_position(100);
                bar.set_message("Launcher profile written");
            }
        }
    }
    bar.finish_and_clear();
}

fn report_outcome(result: InstallerResult<InstallReport>) -> ExitCode {
    match result {
        Ok(report) => {
            println!(
                "Installed {} mod(s); profile written to {}",
                report.mod_paths.len(),
                report.profile_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(InstallerError::ModsUnavailable { mods }) => {
            eprintln!("Some mods could not be downloaded and the run was rolled back:");
            for slug in mods {
                eprintln!("  - {slug}");
            }
            eprintln!("They may not be compatible with this Minecraft version yet.");
            ExitCode::from(1)
        }
        Err(err) => {
            eprintln!("Installation failed: {err}");
            ExitCode::from(1)
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let mut config = match InstallerConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Could not load configuration: {err}");
            return ExitCode::from(1);
        }
    };
    if let Some(version) = cli.minecraft_version {
        config.minecraft_version = version;
    }

    let cancel = CancelToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Cancellation requested, finishing the current step...");
            ctrl_c_cancel.cancel();
        }
    });

    let (reporter, ui) = if cli.quiet {
        (ProgressReporter::disabled(), None)
    } else {
        let (reporter, events) = ProgressReporter::channel();
        (reporter, Some(tokio::spawn(render_progress(events))))
    };

    let workflow = match InstallWorkflow::new(config, reporter, cancel) {
        Ok(workflow) => workflow,
        Err(err) => {
            eprintln!("Could not initialize the installer: {err}");
            return ExitCode::from(1);
        }
    };

    let result = workflow.run().await;

    // Dropping the workflow hangs up the progress channel so the renderer
    // can drain and exit.
    drop(workflow);
    if let Some(ui) = ui {
        let _ = ui.await;
    }

    report_outcome(result)
}
