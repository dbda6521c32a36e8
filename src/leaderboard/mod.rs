mod remote;
mod sqlite;

pub use remote::RemoteLeaderboard;
pub use sqlite::SqliteLeaderboard;

use crate::app::config::Difficulty;
use crate::shared::names::sanitize_player_name;
use anyhow::bail;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

pub const MAX_SCORE: i64 = 1_000_000;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "playerName")]
    pub player_name: String,
    pub score: i64,
    pub difficulty: String,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub player_name: String,
    pub score: i64,
    pub difficulty: Difficulty,
}

impl NewScore {
    pub fn new(player_name: &str, score: i64, difficulty: Difficulty) -> anyhow::Result<Self> {
        if !(0..=MAX_SCORE).contains(&score) {
            bail!("score {score} out of range");
        }
        Ok(Self {
            player_name: sanitize_player_name(player_name),
            score,
            difficulty,
        })
    }

    pub fn from_raw(player_name: &str, score: f64, difficulty: Difficulty) -> anyhow::Result<Self> {
        if !score.is_finite() {
            bail!("score must be a number");
        }
        Self::new(player_name, score.floor() as i64, difficulty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlayerStanding {
    pub rank: Option<i64>,
    pub best: Option<i64>,
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

#[derive(Debug, Clone)]
pub enum Leaderboard {
    Sqlite(SqliteLeaderboard),
    Remote(RemoteLeaderboard),
}

impl Leaderboard {
    pub async fn from_env() -> anyhow::Result<Self> {
        let remote_url = env::var("SUPABASE_URL").ok().filter(|value| !value.trim().is_empty());
        let remote_key = env::var("SUPABASE_KEY").ok().filter(|value| !value.trim().is_empty());
        if let (Some(url), Some(key)) = (remote_url, remote_key) {
            tracing::info!(url, "using remote leaderboard");
            return Ok(Self::Remote(RemoteLeaderboard::new(url, key)));
        }

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            let base = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            let default_path = base.join("data").join("leaderboard.db");
            format!("sqlite://{}", default_path.display())
        });
        tracing::info!(database_url, "using sqlite leaderboard");
        Ok(Self::Sqlite(SqliteLeaderboard::connect(&database_url).await?))
    }

    pub async fn submit(&self, entry: &NewScore) -> anyhow::Result<()> {
        match self {
            Self::Sqlite(store) => store.submit(entry).await,
            Self::Remote(store) => store.submit(entry).await,
        }
    }

    pub async fn top_scores(
        &self,
        limit: i64,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let limit = clamp_limit(Some(limit));
        match self {
            Self::Sqlite(store) => store.top_scores(limit, difficulty).await,
            Self::Remote(store) => store.top_scores(limit, difficulty).await,
        }
    }

    pub async fn player_rank(
        &self,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Option<i64>> {
        match self {
            Self::Sqlite(store) => store.player_rank(player_name, difficulty).await,
            Self::Remote(store) => store.player_rank(player_name, difficulty).await,
        }
    }

    pub async fn player_best(
        &self,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Option<i64>> {
        match self {
            Self::Sqlite(store) => store.player_best(player_name, difficulty).await,
            Self::Remote(store) => store.player_best(player_name, difficulty).await,
        }
    }

    pub async fn standing(
        &self,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<PlayerStanding> {
        let player_name = sanitize_player_name(player_name);
        Ok(PlayerStanding {
            rank: self.player_rank(&player_name, difficulty).await?,
            best: self.player_best(&player_name, difficulty).await?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionReport {
    pub submitted: bool,
    #[serde(rename = "topScores")]
    pub top_scores: Vec<LeaderboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standing: Option<PlayerStanding>,
}

// Failures are logged and reported, never retried.
pub async fn record_session(
    board: &Leaderboard,
    player_name: &str,
    score: i64,
    difficulty: Difficulty,
) -> SessionReport {
    let submitted = match NewScore::new(player_name, score, difficulty) {
        Ok(entry) => match board.submit(&entry).await {
            Ok(()) => {
                tracing::info!(player = %entry.player_name, score, %difficulty, "score submitted");
                true
            }
            Err(error) => {
                tracing::warn!(?error, score, "score submission failed");
                false
            }
        },
        Err(error) => {
            tracing::warn!(?error, score, "score not submitted");
            false
        }
    };

    let top_scores = match board.top_scores(DEFAULT_LIMIT, Some(difficulty)).await {
        Ok(entries) => entries,
        Err(error) => {
            tracing::warn!(?error, "failed to load leaderboard");
            Vec::new()
        }
    };
    let standing = match board.standing(player_name, Some(difficulty)).await {
        Ok(standing) => Some(standing),
        Err(error) => {
            tracing::warn!(?error, "failed to load player standing");
            None
        }
    };

    SessionReport {
        submitted,
        top_scores,
        standing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), DEFAULT_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(500)), MAX_LIMIT);
        assert_eq!(clamp_limit(Some(25)), 25);
    }

    #[test]
    fn new_score_validates_range_and_name() {
        let entry = NewScore::new("  Ada  ", 12, Difficulty::Hard).unwrap();
        assert_eq!(entry.player_name, "Ada");
        assert!(NewScore::new("Ada", -1, Difficulty::Easy).is_err());
        assert!(NewScore::new("Ada", MAX_SCORE + 1, Difficulty::Easy).is_err());
    }

    #[test]
    fn raw_scores_must_be_finite_and_are_floored() {
        assert!(NewScore::from_raw("Ada", f64::NAN, Difficulty::Medium).is_err());
        let entry = NewScore::from_raw("Ada", 7.9, Difficulty::Medium).unwrap();
        assert_eq!(entry.score, 7);
    }

    #[tokio::test]
    async fn record_session_submits_once_and_reports_board() {
        let board = Leaderboard::Sqlite(SqliteLeaderboard::in_memory().await.unwrap());
        let report = record_session(&board, " Ada ", 6, Difficulty::Easy).await;
        assert!(report.submitted);
        assert_eq!(report.top_scores.len(), 1);
        assert_eq!(report.top_scores[0].player_name, "Ada");
        assert_eq!(
            report.standing,
            Some(PlayerStanding {
                rank: Some(1),
                best: Some(6)
            })
        );

        let other = board.top_scores(10, Some(Difficulty::Hard)).await.unwrap();
        assert!(other.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_score_is_reported_not_submitted() {
        let board = Leaderboard::Sqlite(SqliteLeaderboard::in_memory().await.unwrap());
        let report = record_session(&board, "Ada", -3, Difficulty::Medium).await;
        assert!(!report.submitted);
        assert!(report.top_scores.is_empty());
    }
}
