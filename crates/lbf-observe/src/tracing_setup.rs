//! Structured logging init, grounded in the teacher's `tracing-setup` /
//! `observe` crates: an `EnvFilter` driven by `RUST_LOG` (default `info`),
//! human-readable output on a TTY, single-line otherwise.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init(env_filter_default: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(env_filter_default));

    let is_tty = atty_stdout();
    let subscriber = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(is_tty);

    if is_tty {
        subscriber.init();
    } else {
        subscriber.json().init();
    }
}

fn atty_stdout() -> bool {
    use std::io::IsTerminal;
    std::io::stdout().is_terminal()
}
