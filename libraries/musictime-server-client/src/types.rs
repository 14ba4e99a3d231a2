//! Types for the Music Time service API.

/// Shown in place of the dashboard when the service has nothing to report
pub const NO_DATA: &str = "MUSIC TIME\n\nNo data available\n";

/// Plugin identifier sent with dashboard requests
pub const DASHBOARD_PLUGIN: &str = "music-time";

/// Configuration for connecting to the Music Time service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Base URL of the service API (e.g., "https://api.software.com")
    pub url: String,
    /// Session token issued by the service
    pub jwt: Option<String>,
}

impl ServerConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            jwt: None,
        }
    }

    /// Create a config with an existing session token.
    pub fn with_jwt(url: impl Into<String>, jwt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            jwt: Some(jwt.into()),
        }
    }
}

/// Dashboard rendering requested from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardFormat {
    /// Render for a Linux host
    pub linux: bool,
    /// HTML instead of plain text
    pub html: bool,
}

impl DashboardFormat {
    /// Plain text for the current host
    pub fn text() -> Self {
        Self {
            linux: cfg!(target_os = "linux"),
            html: false,
        }
    }
}

impl Default for DashboardFormat {
    fn default() -> Self {
        Self::text()
    }
}
