use crate::app::config::{Difficulty, GameConfig, PerceptionSettings};
use crate::game::session::SessionSummary;
use crate::game::types::{Landmark, RenderState};
use crate::leaderboard::{LeaderboardEntry, PlayerStanding};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
  #[serde(rename = "frame")]
  Frame {
    #[serde(default)]
    landmarks: Option<Vec<Landmark>>,
  },
  #[serde(rename = "quit")]
  Quit,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage<'a> {
  #[serde(rename = "init")]
  Init {
    #[serde(rename = "sessionId")]
    session_id: String,
    width: u32,
    height: u32,
    fps: u32,
    difficulty: Difficulty,
    debug: bool,
    perception: &'a PerceptionSettings,
  },
  #[serde(rename = "state")]
  State(&'a RenderState),
  #[serde(rename = "gameOver")]
  GameOver {
    summary: &'a SessionSummary,
    submitted: bool,
    #[serde(rename = "topScores")]
    top_scores: Vec<LeaderboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    standing: Option<PlayerStanding>,
  },
}

#[derive(Debug, Default, Deserialize)]
pub struct SessionOptions {
  pub difficulty: Option<String>,
  pub width: Option<u32>,
  pub height: Option<u32>,
  pub debug: Option<bool>,
  #[serde(rename = "noTrail")]
  pub no_trail: Option<bool>,
  pub name: Option<String>,
}

impl SessionOptions {
  pub fn apply(&self, base: &GameConfig) -> anyhow::Result<GameConfig> {
    let mut config = base.clone().with_dimensions(
      self.width.unwrap_or(base.window_width),
      self.height.unwrap_or(base.window_height),
    );
    if let Some(difficulty) = &self.difficulty {
      config = config.with_difficulty(difficulty.parse()?);
    }
    if self.debug.unwrap_or(false) {
      config = config.with_debug();
    }
    if self.no_trail.unwrap_or(false) {
      config = config.with_short_trail();
    }
    config.validate()?;
    Ok(config)
  }
}

pub fn decode_client_message(text: &str) -> Option<ClientMessage> {
  serde_json::from_str(text).ok()
}

pub fn encode_server_message(message: &ServerMessage<'_>) -> anyhow::Result<String> {
  Ok(serde_json::to_string(message)?)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::game::types::Gesture;

  #[test]
  fn decodes_frames_with_and_without_hand() {
    let Some(ClientMessage::Frame { landmarks }) =
      decode_client_message(r#"{"type":"frame","landmarks":[[0.1,0.2],[0.3,0.4]]}"#)
    else {
      panic!("expected frame");
    };
    let landmarks = landmarks.unwrap();
    assert_eq!(landmarks[1], Landmark { x: 0.3, y: 0.4 });

    assert!(matches!(
      decode_client_message(r#"{"type":"frame","landmarks":null}"#),
      Some(ClientMessage::Frame { landmarks: None })
    ));
    assert!(matches!(
      decode_client_message(r#"{"type":"frame"}"#),
      Some(ClientMessage::Frame { landmarks: None })
    ));
    assert!(matches!(
      decode_client_message(r#"{"type":"quit"}"#),
      Some(ClientMessage::Quit)
    ));
    assert!(decode_client_message(r#"{"type":"frame","landmarks":[[0.1]]}"#).is_none());
    assert!(decode_client_message("not json").is_none());
  }

  #[test]
  fn state_message_is_tagged() {
    let render = RenderState {
      tick: 3,
      score: 2,
      gesture: Gesture::Slashing,
      trail_color: "#00ffff".to_string(),
      trail: Vec::new(),
      fruits: Vec::new(),
      fingertip: None,
      landmarks: None,
    };
    let encoded = encode_server_message(&ServerMessage::State(&render)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(value["type"], "state");
    assert_eq!(value["score"], 2);
    assert_eq!(value["gesture"], "slashing");
    assert!(value.get("fingertip").is_none());
  }

  #[test]
  fn session_options_layer_over_base_config() {
    let options = SessionOptions {
      difficulty: Some("hard".to_string()),
      width: Some(1280),
      height: Some(720),
      debug: Some(true),
      no_trail: Some(true),
      name: None,
    };
    let config = options.apply(&GameConfig::default()).unwrap();
    assert_eq!(config.window_width, 1280);
    assert_eq!(config.difficulty, Difficulty::Hard);
    assert!(config.show_hand_landmarks);
    assert_eq!(config.trail_lifetime, 0.1);

    let bad = SessionOptions {
      difficulty: Some("impossible".to_string()),
      ..SessionOptions::default()
    };
    assert!(bad.apply(&GameConfig::default()).is_err());
  }
}
