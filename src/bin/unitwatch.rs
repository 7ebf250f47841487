//! unitwatch - watch configuration files and deploy them as systemd units
//!
//! On startup every registered file that already exists is handled once.
//! After that, each time a registered file is created (or renamed into
//! place) its handler synthesizes a unit document and a transient
//! `unitwatch-deploy` unit is started to apply it.
//!
//! Runs until the watch mechanism reports an error.

use clap::Parser;
use log::info;
use std::path::PathBuf;

use unitwatch::materialize::DEFAULT_DEPLOY_BIN;
use unitwatch::watch::spawn_watcher;
use unitwatch::{Dispatcher, Materializer, Synthesizer, SystemdClient, Translator, WatchRegistry};

#[derive(Parser)]
#[command(name = "unitwatch")]
#[command(about = "Watch configuration files and deploy them as systemd units")]
struct Args {
    /// Root of the tree to watch; registered paths are resolved under it
    #[arg(long, default_value = ".")]
    watch_dir: PathBuf,

    /// Command translating (interface, source file) into unit text
    #[arg(long, default_value = "./scripts/gentoo-to-networkd")]
    translator: String,

    /// Deployment tool started with --from-file for each document
    #[arg(long, default_value = DEFAULT_DEPLOY_BIN)]
    deploy_bin: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let translator = Translator::from_command_line(&args.translator)?;
    let registry = WatchRegistry::builtin();
    let dispatcher = Dispatcher::new(
        args.watch_dir,
        registry,
        Synthesizer::new(translator),
        Materializer::new(SystemdClient::new(), args.deploy_bin),
    );

    // Watches go in before the initial run so no creation is missed
    let events = spawn_watcher(&dispatcher.watch_dirs())?;

    for (key, handler) in dispatcher.registry().iter() {
        info!("Registered {} for {}", handler.name(), key.display());
    }

    let handled = dispatcher.bootstrap().await;
    info!(
        "Watching {} path(s) under {} ({} handled at startup)",
        dispatcher.registry().len(),
        dispatcher.root().display(),
        handled
    );

    let err = dispatcher.run(events).await;
    log::error!("Stopping: {}", err);
    Err(err.into())
}
