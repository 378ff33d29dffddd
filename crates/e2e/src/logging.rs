//! Log setup: stderr plus a plain-text log file

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::error::{TripError, TripResult};

/// Install the global subscriber. `RUST_LOG` overrides the default `info`
/// level. The log file is truncated on every run.
pub fn init(log_file: &Path) -> TripResult<()> {
    if let Some(parent) = log_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()
        .map_err(|e| TripError::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string())))
}
