use crate::app::config::GameConfig;
use crate::game::driver::{self, Control, FrameSource, HandTracker, Renderer};
use crate::game::session::{GameSession, SessionSummary};
use crate::game::types::{Landmark, RenderState};
use crate::leaderboard::{record_session, Leaderboard};
use anyhow::{bail, Context};
use serde::Deserialize;
use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedFrame {
    pub t: f64,
    #[serde(default)]
    pub landmarks: Option<Vec<Landmark>>,
}

pub struct JsonlFrames<R> {
    lines: Lines<R>,
    line_no: usize,
    last_t: Option<f64>,
}

impl<R: BufRead> JsonlFrames<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            last_t: None,
        }
    }
}

impl<R: BufRead> FrameSource for JsonlFrames<R> {
    type Frame = RecordedFrame;

    fn next_frame(&mut self) -> anyhow::Result<Option<RecordedFrame>> {
        for line in self.lines.by_ref() {
            self.line_no += 1;
            let line = line.context("failed to read recording")?;
            if line.trim().is_empty() {
                continue;
            }
            let frame: RecordedFrame = serde_json::from_str(&line)
                .with_context(|| format!("invalid frame on line {}", self.line_no))?;
            // Trail expiry assumes frames arrive in time order.
            if self.last_t.is_some_and(|last| frame.t < last) {
                bail!("frame time {} on line {} goes backwards", frame.t, self.line_no);
            }
            self.last_t = Some(frame.t);
            return Ok(Some(frame));
        }
        Ok(None)
    }

    fn timestamp(&self, frame: &RecordedFrame) -> f64 {
        frame.t
    }
}

pub struct RecordedLandmarks;

impl HandTracker<RecordedFrame> for RecordedLandmarks {
    fn get_landmarks(&mut self, frame: &RecordedFrame) -> Option<Vec<Landmark>> {
        frame.landmarks.clone()
    }
}

#[derive(Debug, Default)]
pub struct LogRenderer {
    last_score: i64,
}

impl Renderer for LogRenderer {
    fn present(&mut self, state: &RenderState) -> anyhow::Result<Control> {
        if state.score != self.last_score {
            tracing::debug!(tick = state.tick, score = state.score, "score changed");
            self.last_score = state.score;
        }
        Ok(Control::Continue)
    }
}

pub fn replay<R: BufRead>(reader: R, config: GameConfig) -> SessionSummary {
    let mut session = GameSession::new(config, 0.0);
    driver::run(
        &mut JsonlFrames::new(reader),
        &mut RecordedLandmarks,
        &mut LogRenderer::default(),
        &mut session,
    )
}

pub async fn run_replay_mode(config: GameConfig) -> anyhow::Result<()> {
    let path = env::var("REPLAY_PATH").context("missing REPLAY_PATH")?;
    let file = File::open(&path).with_context(|| format!("failed to open {path}"))?;
    let summary = tokio::task::spawn_blocking(move || replay(BufReader::new(file), config))
        .await
        .context("replay task failed")?;
    tracing::info!(
        score = summary.score,
        ticks = summary.ticks,
        spawned = summary.spawned,
        sliced = summary.sliced,
        escaped = summary.escaped,
        reason = ?summary.reason,
        "replay finished"
    );

    let player_name = env::var("PLAYER_NAME")
        .ok()
        .filter(|value| !value.trim().is_empty());
    if let Some(player_name) = player_name {
        let leaderboard = Leaderboard::from_env().await?;
        let report =
            record_session(&leaderboard, &player_name, summary.score, summary.difficulty).await;
        tracing::info!(
            submitted = report.submitted,
            rank = ?report.standing.and_then(|standing| standing.rank),
            "replay score reported"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::StopReason;
    use std::io::Cursor;

    fn config() -> GameConfig {
        GameConfig {
            spawn_seed: Some(9),
            ..GameConfig::default()
        }
    }

    fn still_recording(frames: usize) -> String {
        let hand: Vec<[f64; 2]> = vec![[0.5, 0.5]; 21];
        let hand = serde_json::to_string(&hand).unwrap();
        (1..=frames)
            .map(|index| format!(r#"{{"t":{},"landmarks":{hand}}}"#, index as f64 / 30.0))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn still_recording_plays_to_the_end_without_score() {
        let recording = still_recording(300);
        let summary = replay(Cursor::new(recording), config());
        assert_eq!(summary.ticks, 300);
        assert_eq!(summary.score, 0);
        assert!(summary.spawned >= 6);
        assert_eq!(summary.reason, Some(StopReason::SessionEnd));
    }

    #[test]
    fn blank_lines_and_missing_hands_are_fine() {
        let recording = "{\"t\":0.1}\n\n{\"t\":0.2,\"landmarks\":null}\n";
        let summary = replay(Cursor::new(recording), config());
        assert_eq!(summary.ticks, 2);
    }

    #[test]
    fn malformed_line_is_a_capture_failure() {
        let recording = format!("{}\nnot json\n{}", still_recording(2), still_recording(2));
        let summary = replay(Cursor::new(recording), config());
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.reason, Some(StopReason::CaptureFailure));
    }

    #[test]
    fn time_going_backwards_is_a_capture_failure() {
        let recording = "{\"t\":5.0}\n{\"t\":5.0}\n{\"t\":1.0}\n{\"t\":6.0}\n";
        let summary = replay(Cursor::new(recording), config());
        assert_eq!(summary.ticks, 2);
        assert_eq!(summary.reason, Some(StopReason::CaptureFailure));

        let mut frames = JsonlFrames::new(Cursor::new("{\"t\":2.0}\n{\"t\":1.5}\n"));
        assert!(frames.next_frame().unwrap().is_some());
        let error = frames.next_frame().unwrap_err();
        assert!(error.to_string().contains("line 2"));
    }
}
