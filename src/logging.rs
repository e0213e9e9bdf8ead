//! Logging initialization utilities.

use env_logger::Env;

/// Initialize logging with a default filter level.
///
/// `RUST_LOG` overrides the default. Calling this twice is harmless.
pub fn init() {
    let env = Env::default().default_filter_or("info");
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Initialize logging with `debug` as the default level, used by `--debug`.
pub fn init_verbose() {
    let env = Env::default().default_filter_or("debug");
    let _ = env_logger::Builder::from_env(env).try_init();
}
