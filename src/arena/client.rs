//! HTTP client for the battle arena server
//!
//! Everything the client knows about the server is the small REST contract
//! here; scoring, judging, and tie-breaking happen remotely. The
//! [`BattleBackend`] trait is the seam the chat loop talks through, so
//! tests can substitute a fake backend without a network.

use crate::arena::types::{BattleRecord, BattleRequest, BattleSummary, StatsResponse};
use crate::config::ServerConfig;
use crate::error::{ArenaError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use url::Url;

/// Remote battle operations consumed by the chat loop and subcommands
#[async_trait]
pub trait BattleBackend: Send + Sync {
    /// Run one battle: fan the prompt out, judge, and pick a winner
    async fn run_battle(&self, request: &BattleRequest) -> Result<BattleRecord>;

    /// Recent battles, most recent first
    async fn list_battles(&self) -> Result<Vec<BattleSummary>>;

    /// One full battle record
    async fn get_battle(&self, id: i64) -> Result<BattleRecord>;

    /// Delete one battle and its ratings
    async fn delete_battle(&self, id: i64) -> Result<()>;

    /// Aggregate leaderboard
    async fn stats(&self) -> Result<StatsResponse>;

    /// Reset all battles and statistics
    async fn clear_stats(&self) -> Result<()>;
}

/// reqwest-backed implementation of [`BattleBackend`]
pub struct ArenaClient {
    client: Client,
    base_url: Url,
}

impl ArenaClient {
    /// Build a client for the configured server
    ///
    /// # Errors
    ///
    /// Returns `ArenaError::Config` for an unparseable base URL and
    /// `ArenaError::Api` if the HTTP client cannot be constructed
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ArenaError::Config(format!("Invalid server URL: {}", e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("arenachat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ArenaError::Api(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!("Arena server: {}", base_url);

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{}{}", base, path)
    }

    /// Turn a non-2xx response into an error carrying the server detail
    ///
    /// The server reports failures as `{"detail": "..."}`; prefer that
    /// message, falling back to the raw status line.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
            .unwrap_or_else(|| format!("server returned {}", status));

        if status == StatusCode::NOT_FOUND {
            return Err(ArenaError::NotFound(detail).into());
        }
        Err(ArenaError::Api(detail).into())
    }
}

#[async_trait]
impl BattleBackend for ArenaClient {
    async fn run_battle(&self, request: &BattleRequest) -> Result<BattleRecord> {
        let url = self.endpoint("/api/battle");
        tracing::debug!("POST {}", url);

        let response = self.client.post(&url).json(request).send().await?;
        let record = Self::check(response).await?.json::<BattleRecord>().await?;

        tracing::debug!(
            "Battle {} complete, winner: {}",
            record.id,
            record.winner.as_deref().unwrap_or("none")
        );
        Ok(record)
    }

    async fn list_battles(&self) -> Result<Vec<BattleSummary>> {
        let response = self.client.get(self.endpoint("/api/battles")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_battle(&self, id: i64) -> Result<BattleRecord> {
        let url = self.endpoint(&format!("/api/battle/{}", id));
        let response = self.client.get(&url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_battle(&self, id: i64) -> Result<()> {
        let url = self.endpoint(&format!("/api/battle/{}", id));
        let response = self.client.delete(&url).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn stats(&self) -> Result<StatsResponse> {
        let response = self.client.get(self.endpoint("/api/stats")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn clear_stats(&self) -> Result<()> {
        let response = self.client.delete(self.endpoint("/api/stats")).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> ArenaClient {
        ArenaClient::new(&ServerConfig {
            base_url: base_url.to_string(),
            timeout_seconds: 5,
        })
        .expect("client builds")
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let client = test_client("http://localhost:8000/");
        assert_eq!(
            client.endpoint("/api/battles"),
            "http://localhost:8000/api/battles"
        );
    }

    #[test]
    fn test_endpoint_joins_without_trailing_slash() {
        let client = test_client("http://localhost:8000");
        assert_eq!(
            client.endpoint("/api/battle/3"),
            "http://localhost:8000/api/battle/3"
        );
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        let result = ArenaClient::new(&ServerConfig {
            base_url: "not a url".to_string(),
            timeout_seconds: 5,
        });
        assert!(result.is_err());
    }
}
