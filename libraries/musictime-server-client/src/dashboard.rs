//! Daily dashboard file
//!
//! The service renders the listening dashboard once a day; the file on disk
//! is refreshed on the first request of each calendar day, or whenever it
//! has gone missing.

use crate::client::SoftwareClient;
use crate::error::Result;
use crate::types::{DashboardFormat, DASHBOARD_PLUGIN, NO_DATA};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Dashboard file kept up to date from the service
#[derive(Debug)]
pub struct DashboardCache {
    client: SoftwareClient,
    path: PathBuf,
    format: DashboardFormat,
    last_refreshed: Mutex<Option<NaiveDate>>,
}

impl DashboardCache {
    pub fn new(client: SoftwareClient, path: impl Into<PathBuf>) -> Self {
        Self {
            client,
            path: path.into(),
            format: DashboardFormat::default(),
            last_refreshed: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_format(mut self, format: DashboardFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Refresh the file if today's dashboard has not been written yet.
    ///
    /// Returns whether the file was rewritten.
    pub async fn refresh(&self) -> Result<bool> {
        self.refresh_on(Local::now().date_naive()).await
    }

    /// `refresh` for an explicit calendar day
    pub async fn refresh_on(&self, today: NaiveDate) -> Result<bool> {
        let mut last = self.last_refreshed.lock().await;
        let exists = tokio::fs::try_exists(&self.path).await.unwrap_or(false);
        if *last == Some(today) && exists {
            debug!(path = %self.path.display(), "Dashboard already current");
            return Ok(false);
        }

        // A failed fetch still leaves a readable file behind
        let content = match self.client.fetch_dashboard(DASHBOARD_PLUGIN, self.format).await {
            Ok(content) => content,
            Err(e) => {
                warn!(error = %e, "Failed to fetch dashboard");
                NO_DATA.to_string()
            }
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(&self.path, content).await?;
        *last = Some(today);

        info!(path = %self.path.display(), "Dashboard written");
        Ok(true)
    }
}
