use super::{LeaderboardEntry, NewScore};
use crate::app::config::Difficulty;
use crate::app::time::now_millis;
use anyhow::Context;
use sqlx::{sqlite::SqlitePoolOptions, Row, SqlitePool};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SqliteLeaderboard {
    db: SqlitePool,
}

impl SqliteLeaderboard {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        ensure_db_dir(database_url)?;
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .with_context(|| format!("failed to open {database_url}"))?;
        let store = Self { db };
        store.migrate().await?;
        Ok(store)
    }

    #[cfg(test)]
    pub(crate) async fn in_memory() -> anyhow::Result<Self> {
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { db };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.db)
            .await
            .context("failed to run leaderboard migrations")
    }

    pub async fn submit(&self, entry: &NewScore) -> anyhow::Result<()> {
        self.insert(entry, now_millis()).await
    }

    pub(crate) async fn insert(&self, entry: &NewScore, created_at: i64) -> anyhow::Result<()> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query(
            "INSERT INTO scores (id, player_name, score, difficulty, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(&entry.player_name)
        .bind(entry.score)
        .bind(entry.difficulty.as_str())
        .bind(created_at)
        .execute(&self.db)
        .await
        .context("failed to insert score")?;
        Ok(())
    }

    pub async fn top_scores(
        &self,
        limit: i64,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Vec<LeaderboardEntry>> {
        let difficulty = difficulty.map(|value| value.as_str());
        let rows = sqlx::query(
            "SELECT player_name, score, difficulty, created_at FROM scores \
             WHERE (? IS NULL OR difficulty = ?) \
             ORDER BY score DESC, created_at ASC LIMIT ?",
        )
        .bind(difficulty)
        .bind(difficulty)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("failed to load leaderboard")?;

        let entries = rows
            .into_iter()
            .filter_map(|row| {
                Some(LeaderboardEntry {
                    player_name: row.try_get("player_name").ok()?,
                    score: row.try_get("score").ok()?,
                    difficulty: row.try_get("difficulty").ok()?,
                    created_at: row.try_get("created_at").ok()?,
                })
            })
            .collect();
        Ok(entries)
    }

    // 1-based position of the player's best entry in leaderboard order.
    pub async fn player_rank(
        &self,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Option<i64>> {
        let difficulty = difficulty.map(|value| value.as_str());
        let best = sqlx::query(
            "SELECT score, created_at FROM scores \
             WHERE player_name = ? AND (? IS NULL OR difficulty = ?) \
             ORDER BY score DESC, created_at ASC LIMIT 1",
        )
        .bind(player_name)
        .bind(difficulty)
        .bind(difficulty)
        .fetch_optional(&self.db)
        .await
        .context("failed to load player best entry")?;
        let Some(best) = best else { return Ok(None) };
        let score: i64 = best.try_get("score")?;
        let created_at: i64 = best.try_get("created_at")?;

        let ahead: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM scores \
             WHERE (? IS NULL OR difficulty = ?) \
             AND (score > ? OR (score = ? AND created_at < ?))",
        )
        .bind(difficulty)
        .bind(difficulty)
        .bind(score)
        .bind(score)
        .bind(created_at)
        .fetch_one(&self.db)
        .await
        .context("failed to rank player")?;
        Ok(Some(ahead + 1))
    }

    pub async fn player_best(
        &self,
        player_name: &str,
        difficulty: Option<Difficulty>,
    ) -> anyhow::Result<Option<i64>> {
        let difficulty = difficulty.map(|value| value.as_str());
        let best: Option<i64> = sqlx::query_scalar(
            "SELECT MAX(score) FROM scores WHERE player_name = ? AND (? IS NULL OR difficulty = ?)",
        )
        .bind(player_name)
        .bind(difficulty)
        .bind(difficulty)
        .fetch_one(&self.db)
        .await
        .context("failed to load player best score")?;
        Ok(best)
    }
}

fn ensure_db_dir(database_url: &str) -> anyhow::Result<()> {
    if database_url.starts_with("sqlite::memory:") {
        return Ok(());
    }
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"));
    let Some(path) = path else { return Ok(()) };
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return Ok(());
    }
    let db_path = PathBuf::from(path);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    if !db_path.exists() {
        std::fs::File::create(&db_path)
            .with_context(|| format!("failed to create {}", db_path.display()))?;
    }
    Ok(())
}
