//! Host platform naming used for asset resolution

use std::fmt;

/// Operating systems that appear in published asset names
pub const SUPPORTED_OS: [&str; 3] = ["linux", "windows", "macos"];

/// Architectures that appear in published asset names
pub const SUPPORTED_ARCH: [&str; 4] = ["amd64", "386", "arm", "arm64"];

/// An (os, arch) pair in asset naming convention
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Platform {
    pub os: String,
    pub arch: String,
}

impl Platform {
    /// Create a platform, normalizing common aliases
    pub fn new(os: &str, arch: &str) -> Self {
        Self {
            os: normalize_os(os),
            arch: normalize_arch(arch),
        }
    }

    /// The platform this binary was compiled for
    pub fn current() -> Self {
        Self::new(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// True if both parts are in the published asset matrix
    pub fn is_supported(&self) -> bool {
        SUPPORTED_OS.contains(&self.os.as_str()) && SUPPORTED_ARCH.contains(&self.arch.as_str())
    }

    pub fn is_windows(&self) -> bool {
        self.os == "windows"
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// Normalize an OS name to asset convention
pub fn normalize_os(os: &str) -> String {
    let os_lower = os.to_lowercase();
    match os_lower.as_str() {
        "darwin" | "osx" | "macos" => "macos".to_string(),
        "win" | "win32" | "win64" => "windows".to_string(),
        other => other.to_string(),
    }
}

/// Normalize an architecture name to asset convention
pub fn normalize_arch(arch: &str) -> String {
    let arch_lower = arch.to_lowercase();
    match arch_lower.as_str() {
        "x86_64" | "x64" | "amd64" => "amd64".to_string(),
        "aarch64" | "arm64" => "arm64".to_string(),
        "x86" | "i386" | "i686" | "386" => "386".to_string(),
        "armv7" | "armv7l" | "arm" => "arm".to_string(),
        other => other.to_string(),
    }
}
