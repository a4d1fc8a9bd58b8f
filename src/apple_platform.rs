use std::fmt::Display;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default)]
pub enum ApplePlatform {
    MacOS,
    #[allow(clippy::upper_case_acronyms)]
    #[default]
    IOS,
    TvOS,
    WatchOS,
}

impl ApplePlatform {
    pub fn all() -> Vec<Self> {
        vec![Self::MacOS, Self::IOS, Self::TvOS, Self::WatchOS]
    }

    /// Value of the `SDKROOT` build setting.
    pub fn sdk_root(&self) -> &'static str {
        match self {
            Self::MacOS => "macosx",
            Self::IOS => "iphoneos",
            Self::TvOS => "appletvos",
            Self::WatchOS => "watchos",
        }
    }

    /// Name of the build setting that holds the minimum OS version.
    pub fn deployment_target_setting(&self) -> &'static str {
        match self {
            Self::MacOS => "MACOSX_DEPLOYMENT_TARGET",
            Self::IOS => "IPHONEOS_DEPLOYMENT_TARGET",
            Self::TvOS => "TVOS_DEPLOYMENT_TARGET",
            Self::WatchOS => "WATCHOS_DEPLOYMENT_TARGET",
        }
    }

    pub fn default_deployment_target(&self) -> &'static str {
        match self {
            Self::MacOS => "11.0",
            Self::IOS => "13.0",
            Self::TvOS => "13.0",
            Self::WatchOS => "8.0",
        }
    }

    /// `TARGETED_DEVICE_FAMILY`, absent on macOS.
    pub fn device_family(&self) -> Option<&'static str> {
        match self {
            Self::MacOS => None,
            Self::IOS => Some("1,2"),
            Self::TvOS => Some("3"),
            Self::WatchOS => Some("4"),
        }
    }

    /// The system framework a freshly created target links by default.
    pub fn system_framework(&self) -> &'static str {
        match self {
            Self::MacOS => "Cocoa",
            _ => "Foundation",
        }
    }
}

impl TryFrom<&str> for ApplePlatform {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> std::result::Result<Self, anyhow::Error> {
        match s {
            "macos" | "osx" => Ok(ApplePlatform::MacOS),
            "ios" => Ok(ApplePlatform::IOS),
            "tvos" => Ok(ApplePlatform::TvOS),
            "watchos" => Ok(ApplePlatform::WatchOS),
            _ => anyhow::bail!("Unknown Apple platform: {}", s),
        }
    }
}

impl Display for ApplePlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ApplePlatform::MacOS => "macos",
            ApplePlatform::IOS => "ios",
            ApplePlatform::TvOS => "tvos",
            ApplePlatform::WatchOS => "watchos",
        };
        write!(f, "{}", name)
    }
}
