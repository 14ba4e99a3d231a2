//! Music Time service client.

use crate::error::{Result, ServerClientError};
use crate::types::{DashboardFormat, ServerConfig, NO_DATA};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

/// Client for the Music Time backend service.
///
/// Used for the listening dashboard and for managing the Spotify
/// integration. None of these calls are on the playback path.
///
/// # Example
///
/// ```ignore
/// use musictime_server_client::{ServerConfig, SoftwareClient};
///
/// let client = SoftwareClient::new(ServerConfig::with_jwt("https://api.software.com", jwt))?;
/// if client.is_server_available().await {
///     let dashboard = client.fetch_dashboard("music-time", Default::default()).await?;
///     println!("{}", dashboard);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct SoftwareClient {
    http: Client,
    config: Arc<RwLock<ServerConfig>>,
}

impl SoftwareClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(ServerClientError::InvalidUrl("URL cannot be empty".into()));
        }

        let url = config.url.trim_end_matches('/').to_string();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ServerClientError::InvalidUrl(
                "URL must start with http:// or https://".into(),
            ));
        }
        Url::parse(&url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("MusicTime/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ServerClientError::Request)?;

        Ok(Self {
            http,
            config: Arc::new(RwLock::new(ServerConfig { url, jwt: config.jwt })),
        })
    }

    /// Get the service URL.
    pub async fn url(&self) -> String {
        self.config.read().await.url.clone()
    }

    /// Replace the session token.
    pub async fn set_jwt(&self, jwt: Option<String>) {
        self.config.write().await.jwt = jwt;
    }

    pub async fn has_jwt(&self) -> bool {
        self.config.read().await.jwt.is_some()
    }

    async fn endpoint(&self, path: &str) -> (String, Option<String>) {
        let config = self.config.read().await;
        (format!("{}{}", config.url, path), config.jwt.clone())
    }

    /// Check whether the service answers at all.
    ///
    /// Never fails; any transport or status error reads as unavailable.
    pub async fn is_server_available(&self) -> bool {
        let (url, _) = self.endpoint("/ping").await;

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                debug!(status = %response.status(), "Service ping rejected");
                false
            }
            Err(e) => {
                debug!(error = %e, "Service ping failed");
                false
            }
        }
    }

    /// Remove the Spotify integration from the listener's account.
    pub async fn disconnect_spotify(&self) -> Result<()> {
        let (url, jwt) = self.endpoint("/disconnect/spotify").await;
        let jwt = jwt.ok_or(ServerClientError::AuthRequired)?;

        let response = self
            .http
            .put(&url)
            .header("Authorization", jwt)
            // The service rejects bodiless PUTs
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(ServerClientError::from_transport)?;

        let status = response.status();
        if status.is_success() {
            info!("Spotify disconnected");
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(ServerClientError::ServerError {
                status: status.as_u16(),
                message,
            })
        }
    }

    /// Fetch the listening dashboard rendered by the service.
    ///
    /// An empty body yields the "no data" placeholder.
    pub async fn fetch_dashboard(&self, plugin: &str, format: DashboardFormat) -> Result<String> {
        let (url, jwt) = self.endpoint("/dashboard").await;
        let jwt = jwt.ok_or(ServerClientError::AuthRequired)?;

        debug!(plugin, linux = format.linux, html = format.html, "Fetching dashboard");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("plugin", plugin.to_string()),
                ("linux", format.linux.to_string()),
                ("html", format.html.to_string()),
            ])
            .header("Authorization", jwt)
            .send()
            .await
            .map_err(ServerClientError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Dashboard request rejected");
            return Err(ServerClientError::ServerError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            Ok(NO_DATA.to_string())
        } else {
            Ok(body)
        }
    }

    /// Browser URL that starts the Spotify OAuth flow for this account.
    pub async fn spotify_connect_url(&self) -> Result<Url> {
        self.connect_url("spotify").await
    }

    /// Browser URL that starts the OAuth flow for `integration` ("spotify", "slack").
    pub async fn connect_url(&self, integration: &str) -> Result<Url> {
        let (url, jwt) = self.endpoint(&format!("/auth/{}", integration)).await;
        let jwt = jwt.ok_or(ServerClientError::AuthRequired)?;

        let mut url = Url::parse(&url).map_err(|e| ServerClientError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("integrate", integration)
            .append_pair("token", &jwt);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        assert!(SoftwareClient::new(ServerConfig::new("https://api.software.com")).is_ok());
        assert!(SoftwareClient::new(ServerConfig::new("http://localhost:5000")).is_ok());

        assert!(SoftwareClient::new(ServerConfig::new("")).is_err());
        assert!(SoftwareClient::new(ServerConfig::new("not-a-url")).is_err());
        assert!(SoftwareClient::new(ServerConfig::new("ftp://example.com")).is_err());
    }

    #[tokio::test]
    async fn test_url_normalization() {
        let client = SoftwareClient::new(ServerConfig::new("https://api.software.com/")).unwrap();
        assert_eq!(client.url().await, "https://api.software.com");
    }

    #[tokio::test]
    async fn connect_url_carries_token() {
        let client =
            SoftwareClient::new(ServerConfig::with_jwt("https://api.software.com", "JWT abc"))
                .unwrap();
        let url = client.spotify_connect_url().await.unwrap();

        assert_eq!(url.path(), "/auth/spotify");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("integrate".to_string(), "spotify".to_string()),
                ("token".to_string(), "JWT abc".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn connect_url_requires_token() {
        let client = SoftwareClient::new(ServerConfig::new("https://api.software.com")).unwrap();
        assert!(matches!(
            client.spotify_connect_url().await,
            Err(ServerClientError::AuthRequired)
        ));
    }
}
