use std::panic;

use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

/// Logs go to stderr; stdout carries protocol messages only.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Routes panics through the logger before the default hook runs.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|location| format!("{}:{}", location.file(), location.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(panic = %info, location = %location, "unhandled fault");
        default_hook(info);
    }));
}
