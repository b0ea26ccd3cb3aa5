//! gpu_usage — per-second V3D hardware queue utilization.
//!
//! Reads `/sys/kernel/debug/dri/0/gpu_usage` once a second and prints one
//! summary line per interval until interrupted.

mod watch;

use clap::Parser;
use gpu_usage_core::{DebugfsSource, GpuUsageError};

#[derive(Parser)]
#[command(name = "gpu_usage")]
#[command(about = "Print GPU hardware queue utilization once a second (needs debugfs access)")]
#[command(version = gpu_usage_core::VERSION)]
struct Cli {}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let _cli = Cli::parse();

    if let Err(e) = ctrlc::set_handler(|| {
        std::process::exit(0);
    }) {
        log::warn!("could not install Ctrl+C handler: {e}");
    }

    let source = DebugfsSource::new();
    let err = match watch::run(&source, watch::SAMPLE_INTERVAL) {
        Ok(never) => match never {},
        Err(e) => e,
    };

    match &err {
        GpuUsageError::SourceUnavailable { source: cause, .. } => {
            eprintln!("gpu_usage is not supported on this device ({cause})");
        }
        other => eprintln!("error: {other}"),
    }
    std::process::exit(err.exit_code());
}
