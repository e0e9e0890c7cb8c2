//! Logger bootstrap.

/// Install `env_logger` as the `log` backend.
///
/// Safe to call more than once: a second call leaves the existing logger in
/// place and only prints a warning. Filtering follows `RUST_LOG`.
pub fn init() {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }
}

/// Like [`init`] but defaults to `info` when `RUST_LOG` is unset.
pub fn init_with_default(level: log::LevelFilter) {
    let result = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str()),
    )
    .try_init();
    if let Err(e) = result {
        println!("Warning: Could not initialize logger: {}", e);
    }
}
