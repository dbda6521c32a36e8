use super::{LeaderboardEntry, NewScore};
use crate::app::config::Difficulty;
use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const TABLE_NAME: &str = "leaderboard";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// Leaderboard table behind a PostgREST API (Supabase).
#[derive(Debug, Clone)]
pub struct RemoteLeaderboard {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct RemoteRow {
    player_name: String,
    score: i64,
    #[serde(default)]
    difficulty: Option<String>,
    // timestamptz column; left out on insert so the table default fills it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
}

impl RemoteRow {
    fn for_insert(entry: &NewScore) -> Self {
        Self {
            player_name: entry.player_name.clone(),
            score: entry.score,
            difficulty: Some(entry.difficulty.as_str().to_string()),
            created_at: None,
        }
    }
}

impl From<RemoteRow> for LeaderboardEntry {
    fn from(row: RemoteRow) -> Self {
        Self {
            player_name: row.player_name,
            score: row.score,
            difficulty: row.difficulty.unwrap_or_default(),
            created_at: row
                .created_at
                .map(|created_at| created_at.timestamp_millis())
                .unwrap_or_default(),
        }
    }
}

impl RemoteLeaderboard {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE_NAME}", self.base_url.trim_end_matches('/'))
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.http
            .request(method, self.table_url())
            .timeout(REQUEST_TIMEOUT)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn fetch_rows(&self, query: &[(&str, String)]) -> anyhow::Result<Vec<RemoteRow>> {
        let rows = self
            .request(reqwest::Method::GET)
            .query(query)
            .send()
            .await
            .context("leaderboard request failed")?
            .error_for_status()
            .context("leaderboard query rejected")?
            .json::<Vec<RemoteRow>>()
            .await
            .context("invalid leaderboard response")?;
        Ok(rows)
    }

    pub async fn submit(&self, entry: &NewScore) -> anyhow::Result<()> {
        let row = RemoteRow::for_insert(entry);
        self.request(reqwest::Method::POST)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await
            .context("score submission failed")?
            .error_for_status()
            .context("score submission rejected")?;
        Ok(())
    }

    pub async fn top_scores(
        &self,
        limit: i64,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let mut query = vec![
            ("select", "player_name,score,difficulty,created_at".to_string()),
            ("order", "score.desc,created_at.asc".to_string()),
            ("limit", limit.to_string()),
        ];
        query.extend(difficulty_filter(difficulty));
        let rows = self.fetch_rows(&query).await?;
        Ok(rows.into_iter().map(LeaderboardEntry::from).collect())
    }

    pub async fn player_rank(
        &self,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Option<i64>> {
        let mut query = vec![
            ("select", "player_name,score".to_string()),
            ("order", "score.desc,created_at.asc".to_string()),
        ];
        query.extend(difficulty_filter(difficulty));
        let rows = self.fetch_rows(&query).await?;
        Ok(rank_in(&rows, player_name))
    }

    pub async fn player_best(
        &self,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Option<i64>> {
        let mut query = vec![
            ("select", "player_name,score".to_string()),
            ("player_name", format!("eq.{player_name}")),
            ("order", "score.desc".to_string()),
            ("limit", "1".to_string()),
        ];
        query.extend(difficulty_filter(difficulty));
        let rows = self.fetch_rows(&query).await?;
        Ok(rows.first().map(|row| row.score))
    }
}

fn difficulty_filter(difficulty: Option<Difficulty>) -> Option<(&'static str, String)> {
    difficulty.map(|value| ("difficulty", format!("eq.{}", value.as_str())))
}

fn rank_in(rows: &[RemoteRow], player_name: &str) -> Option<i64> {
    rows.iter()
        .position(|row| row.player_name == player_name)
        .map(|index| index as i64 + 1)
}
