//! The read → diff → print → sleep loop.

use std::convert::Infallible;
use std::time::Duration;

use gpu_usage_core::{CounterSource, Monitor, Result};

/// Pause between two reads of the counter file.
pub const SAMPLE_INTERVAL: Duration = Duration::from_secs(1);

/// Take one sample and render the summary line, if there is one yet.
pub fn step(monitor: &mut Monitor, source: &dyn CounterSource) -> Result<Option<String>> {
    Ok(monitor.tick(source)?.map(|report| report.to_string()))
}

/// Sample forever. Only returns on a fatal error.
pub fn run(source: &dyn CounterSource, interval: Duration) -> Result<Infallible> {
    log::debug!("sampling {} every {:?}", source.name().display(), interval);
    let mut monitor = Monitor::new();
    loop {
        if let Some(line) = step(&mut monitor, source)? {
            println!("{line}");
        }
        std::thread::sleep(interval);
    }
}
