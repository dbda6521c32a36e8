use axum::{
  extract::{Path, Query, State, WebSocketUpgrade},
  http::{Method, StatusCode},
  response::IntoResponse,
  routing::get,
  Json, Router,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::EnvFilter;

mod app;
mod game;
mod leaderboard;
mod protocol;
mod replay;
mod shared;
mod transport;

use app::config::{Difficulty, GameConfig};
use leaderboard::{clamp_limit, Leaderboard, LeaderboardEntry, NewScore, PlayerStanding};
use protocol::SessionOptions;
use shared::names::DEFAULT_PLAYER_NAME;

struct AppState {
  config: GameConfig,
  leaderboard: Leaderboard,
}

#[derive(Debug, Serialize)]
struct LeaderboardResponse {
  scores: Vec<LeaderboardEntry>,
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
  limit: Option<i64>,
  difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LeaderboardSubmission {
  name: Option<String>,
  score: Option<f64>,
  difficulty: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StandingQuery {
  difficulty: Option<String>,
}

#[derive(Debug, Serialize)]
struct StandingResponse {
  #[serde(rename = "playerName")]
  player_name: String,
  #[serde(flatten)]
  standing: PlayerStanding,
}

#[derive(Debug, Serialize)]
struct OkResponse {
  ok: bool,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
  ok: bool,
  error: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .init();

  let config = GameConfig::from_env()?;

  if env::var("APP_MODE").is_ok_and(|mode| mode.eq_ignore_ascii_case("replay")) {
    return replay::run_replay_mode(config).await;
  }

  let leaderboard = Leaderboard::from_env().await?;
  let state = Arc::new(AppState {
    config,
    leaderboard,
  });

  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([Method::GET, Method::POST])
    .allow_headers(Any);

  let app: Router = Router::new()
    .route("/api/health", get(health))
    .route("/api/leaderboard", get(leaderboard_get).post(leaderboard_post))
    .route("/api/leaderboard/player/:name", get(player_standing))
    .route("/api/session", get(ws_handler))
    .layer(cors)
    .with_state(state);

  let port: u16 = env::var("PORT")
    .ok()
    .and_then(|value| value.parse().ok())
    .unwrap_or(8787);

  let address = format!("0.0.0.0:{port}");
  tracing::info!("listening on {address}");

  let listener = tokio::net::TcpListener::bind(&address).await?;
  axum::serve(listener, app).await?;

  Ok(())
}

fn error_response(status: StatusCode, error: &str) -> axum::response::Response {
  (
    status,
    Json(ErrorResponse {
      ok: false,
      error: error.to_string(),
    }),
  )
    .into_response()
}

fn parse_difficulty(value: Option<&str>) -> Result<Option<Difficulty>, axum::response::Response> {
  match value {
    None => Ok(None),
    Some(value) => value
      .parse()
      .map(Some)
      .map_err(|_| error_response(StatusCode::BAD_REQUEST, "Unknown difficulty")),
  }
}

async fn health() -> impl IntoResponse {
  Json(OkResponse { ok: true })
}

async fn leaderboard_get(
  State(state): State<Arc<AppState>>,
  Query(params): Query<LeaderboardQuery>,
) -> impl IntoResponse {
  let difficulty = match parse_difficulty(params.difficulty.as_deref()) {
    Ok(difficulty) => difficulty,
    Err(response) => return response,
  };
  let limit = clamp_limit(params.limit);

  match state.leaderboard.top_scores(limit, difficulty).await {
    Ok(scores) => (StatusCode::OK, Json(LeaderboardResponse { scores })).into_response(),
    Err(error) => {
      tracing::warn!(?error, "leaderboard query failed");
      error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load leaderboard")
    }
  }
}

async fn leaderboard_post(
  State(state): State<Arc<AppState>>,
  payload: Result<Json<LeaderboardSubmission>, axum::extract::rejection::JsonRejection>,
) -> impl IntoResponse {
  let Json(payload) = match payload {
    Ok(payload) => payload,
    Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid JSON"),
  };

  let difficulty = match parse_difficulty(payload.difficulty.as_deref()) {
    Ok(difficulty) => difficulty.unwrap_or(state.config.difficulty),
    Err(response) => return response,
  };
  let raw_name = payload.name.unwrap_or_else(|| DEFAULT_PLAYER_NAME.to_string());
  let score = payload.score.unwrap_or(f64::NAN);

  let entry = match NewScore::from_raw(&raw_name, score, difficulty) {
    Ok(entry) => entry,
    Err(error) => return error_response(StatusCode::BAD_REQUEST, &error.to_string()),
  };

  if let Err(error) = state.leaderboard.submit(&entry).await {
    tracing::warn!(?error, "score submission failed");
    return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Submission failed");
  }

  (StatusCode::OK, Json(OkResponse { ok: true })).into_response()
}

async fn player_standing(
  State(state): State<Arc<AppState>>,
  Path(name): Path<String>,
  Query(params): Query<StandingQuery>,
) -> impl IntoResponse {
  let difficulty = match parse_difficulty(params.difficulty.as_deref()) {
    Ok(difficulty) => difficulty,
    Err(response) => return response,
  };
  let player_name = shared::names::sanitize_player_name(&name);

  match state.leaderboard.standing(&player_name, difficulty).await {
    Ok(standing) => Json(StandingResponse {
      player_name,
      standing,
    })
    .into_response(),
    Err(error) => {
      tracing::warn!(?error, "player standing query failed");
      error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to load player standing")
    }
  }
}

async fn ws_handler(
  ws: WebSocketUpgrade,
  Query(options): Query<SessionOptions>,
  State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
  let config = match options.apply(&state.config) {
    Ok(config) => config,
    Err(error) => return error_response(StatusCode::BAD_REQUEST, &error.to_string()),
  };
  let player_name =
    shared::names::sanitize_player_name(options.name.as_deref().unwrap_or(DEFAULT_PLAYER_NAME));
  let leaderboard = state.leaderboard.clone();
  ws.on_upgrade(move |socket| {
    transport::ws_session::handle_socket(socket, config, player_name, leaderboard)
  })
}
