use crate::app::config::GameConfig;
use crate::app::time::SessionClock;
use crate::game::session::{FrameInput, GameSession, StopReason};
use crate::game::types::{Landmark, RenderState};
use crate::leaderboard::{record_session, Leaderboard};
use crate::protocol::{self, ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

#[derive(Debug)]
enum Inbound {
    Frame(Option<Vec<Landmark>>),
    Quit,
    Closed,
    Failed,
    Ignored,
}

impl Inbound {
    fn from_message(result: Option<Result<Message, axum::Error>>) -> Self {
        match result {
            None => Self::Closed,
            Some(Err(_)) => Self::Failed,
            Some(Ok(Message::Close(_))) => Self::Closed,
            Some(Ok(Message::Text(text))) => match protocol::decode_client_message(&text) {
                Some(ClientMessage::Frame { landmarks }) => Self::Frame(landmarks),
                Some(ClientMessage::Quit) => Self::Quit,
                None => Self::Ignored,
            },
            Some(Ok(_)) => Self::Ignored,
        }
    }
}

fn step(session: &mut GameSession, inbound: Inbound, now: f64) -> Option<RenderState> {
    match inbound {
        Inbound::Frame(landmarks) => session.tick(&FrameInput::new(now, landmarks)),
        Inbound::Quit => {
            session.stop(StopReason::UserQuit);
            None
        }
        Inbound::Closed => {
            session.stop(StopReason::SessionEnd);
            None
        }
        Inbound::Failed => {
            session.stop(StopReason::CaptureFailure);
            None
        }
        Inbound::Ignored => None,
    }
}

pub async fn handle_socket(
    socket: WebSocket,
    config: GameConfig,
    player_name: String,
    leaderboard: Leaderboard,
) {
    let (mut sender, mut receiver) = socket.split();
    let session_id = uuid::Uuid::new_v4().to_string();
    let clock = SessionClock::start();
    let mut session = GameSession::new(config, clock.seconds());
    tracing::info!(
        session_id,
        difficulty = %session.config().difficulty,
        "play session started"
    );

    let init = ServerMessage::Init {
        session_id: session_id.clone(),
        width: session.config().window_width,
        height: session.config().window_height,
        fps: session.config().fps,
        difficulty: session.config().difficulty,
        debug: session.config().debug_mode,
        perception: &session.config().perception,
    };
    if !send(&mut sender, &init).await {
        session.stop(StopReason::CaptureFailure);
    }

    while session.is_running() {
        let inbound = Inbound::from_message(receiver.next().await);
        if let Inbound::Ignored = inbound {
            tracing::debug!(session_id, "ignoring unexpected client message");
            continue;
        }
        let Some(render) = step(&mut session, inbound, clock.seconds()) else { continue };
        if !send(&mut sender, &ServerMessage::State(&render)).await {
            session.request_stop(StopReason::CaptureFailure);
        }
    }

    session.stop(StopReason::SessionEnd);
    let summary = session.summary();
    let report = record_session(&leaderboard, &player_name, summary.score, summary.difficulty).await;
    let game_over = ServerMessage::GameOver {
        summary: &summary,
        submitted: report.submitted,
        top_scores: report.top_scores,
        standing: report.standing,
    };
    send(&mut sender, &game_over).await;
    let _ = sender.close().await;
    tracing::info!(session_id, score = summary.score, "play session ended");
}

async fn send<S>(sender: &mut S, message: &ServerMessage<'_>) -> bool
where
    S: futures_util::Sink<Message> + Unpin,
{
    let payload = match protocol::encode_server_message(message) {
        Ok(payload) => payload,
        Err(error) => {
            tracing::warn!(?error, "failed to encode server message");
            return false;
        }
    };
    sender.send(Message::Text(payload)).await.is_ok()
}
