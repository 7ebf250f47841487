//! unitwatch-deploy - apply a unit document or run a user-data script
//!
//! Started by unitwatch as a transient unit with `--from-file`. A document
//! has its units placed, enabled where requested, picked up with a
//! daemon-reload and restarted. A script (`#!` first line) is staged under
//! the workspace and run in its own transient unit.

use clap::Parser;
use log::info;
use std::path::PathBuf;

use unitwatch::manager::{deploy, execute_script, stage_script};
use unitwatch::{SystemdClient, UserData};

#[derive(Parser)]
#[command(name = "unitwatch-deploy")]
#[command(about = "Deploy a unit document through systemd")]
struct Args {
    /// Document or script to apply
    #[arg(long)]
    from_file: PathBuf,

    /// Prefix for etc/systemd and run/systemd
    #[arg(long, default_value = "/")]
    root: PathBuf,

    /// Where user-data scripts are staged
    #[arg(long, default_value = "/var/lib/unitwatch")]
    workspace: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let text = tokio::fs::read_to_string(&args.from_file)
        .await
        .map_err(|e| format!("Failed to read {}: {}", args.from_file.display(), e))?;

    let control = SystemdClient::new();
    match UserData::parse(&text)? {
        UserData::Config(document) => {
            info!(
                "Deploying {} unit(s) from {}",
                document.len(),
                args.from_file.display()
            );
            deploy(&control, &document, &args.root).await?;
        }
        UserData::Script(script) => {
            let path = stage_script(&args.workspace, &script)?;
            let unit = execute_script(&control, &path).await?;
            info!("Script {} running as {}", path.display(), unit);
        }
    }

    Ok(())
}
