//! Music Time Service Client
//!
//! HTTP client for the Music Time backend service.
//!
//! # Features
//!
//! - **Availability**: Cheap ping before user-initiated calls
//! - **Dashboard**: Daily listening dashboard, cached to a file
//! - **Spotify integration**: Connect URL and disconnect
//!
//! # Example
//!
//! ```ignore
//! use musictime_server_client::{DashboardCache, ServerConfig, SoftwareClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::with_jwt("https://api.software.com", "JWT ...");
//!     let client = SoftwareClient::new(config)?;
//!
//!     let cache = DashboardCache::new(client, "MusicTime.txt");
//!     cache.refresh().await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod dashboard;
mod error;
mod types;

pub use client::SoftwareClient;
pub use dashboard::DashboardCache;
pub use error::{Result, ServerClientError};
pub use types::{DashboardFormat, ServerConfig, DASHBOARD_PLUGIN, NO_DATA};
