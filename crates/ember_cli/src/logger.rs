use log::LevelFilter;

/// Install the stderr logger at `level`, letting `RUST_LOG` refine it.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
