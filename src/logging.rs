use crate::config::LoggingConfig;

/// Installs the platform logger. Safe to call more than once.
#[cfg(target_os = "android")]
pub fn init_logging(config: &LoggingConfig) {
    let level = config
        .level
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Info);
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(level)
            .with_tag("photo-gallery"),
    );
}

/// Installs the platform logger. Safe to call more than once.
#[cfg(not(target_os = "android"))]
pub fn init_logging(config: &LoggingConfig) {
    let env = env_logger::Env::default().default_filter_or(config.level.as_str());
    if let Err(e) = env_logger::Builder::from_env(env).try_init() {
        log::debug!("Logger already initialized: {}", e);
    }
}
