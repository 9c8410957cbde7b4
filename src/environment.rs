use photo_gallery::{Environment, EnvironmentDetector};

/// Detects the runtime from the build target, unless the config forces one
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformDetector {
    forced: Option<Environment>,
}

impl PlatformDetector {
    pub fn new(forced: Option<Environment>) -> Self {
        Self { forced }
    }

    /// Native shells are mobile builds on Android or iOS; everything else,
    /// and any build with the `web` feature, is treated as a browser.
    pub fn detect() -> Environment {
        if cfg!(feature = "web") {
            Environment::Web
        } else if cfg!(all(
            feature = "mobile",
            any(target_os = "android", target_os = "ios")
        )) {
            Environment::Hybrid
        } else {
            Environment::Web
        }
    }
}

impl EnvironmentDetector for PlatformDetector {
    fn environment(&self) -> Environment {
        self.forced.unwrap_or_else(Self::detect)
    }
}
