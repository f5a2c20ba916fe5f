//! Stderr logging setup.

use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Initialize `timestamp - LEVEL - message` logging on stderr.
///
/// Defaults to `info` (`debug` when `verbose`) unless overridden by `RUST_LOG`.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    let _ = Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init(false);
        init(true);
    }
}
