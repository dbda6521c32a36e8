use super::session::{FrameInput, GameSession, LoopState, SessionSummary, StopReason};
use super::types::{Landmark, RenderState};

// Supplies captured frames. `Ok(None)` means the source is exhausted.
pub trait FrameSource {
    type Frame;

    fn next_frame(&mut self) -> anyhow::Result<Option<Self::Frame>>;

    fn timestamp(&self, frame: &Self::Frame) -> f64;
}

pub trait HandTracker<F> {
    fn get_landmarks(&mut self, frame: &F) -> Option<Vec<Landmark>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub trait Renderer {
    fn present(&mut self, state: &RenderState) -> anyhow::Result<Control>;
}

pub fn run<S, T, R>(
    source: &mut S,
    tracker: &mut T,
    renderer: &mut R,
    session: &mut GameSession,
) -> SessionSummary
where
    S: FrameSource,
    T: HandTracker<S::Frame>,
    R: Renderer,
{
    while session.loop_state() == LoopState::Running {
        if session.stop_pending() {
            break;
        }
        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                session.stop(StopReason::SessionEnd);
                break;
            }
            Err(error) => {
                tracing::warn!(?error, "frame capture failed");
                session.stop(StopReason::CaptureFailure);
                break;
            }
        };

        let input = FrameInput::new(source.timestamp(&frame), tracker.get_landmarks(&frame));
        let Some(render) = session.tick(&input) else { break };

        match renderer.present(&render) {
            Ok(Control::Continue) => {}
            Ok(Control::Quit) => session.request_stop(StopReason::UserQuit),
            Err(error) => {
                tracing::warn!(?error, "render failed");
                session.request_stop(StopReason::CaptureFailure);
            }
        }
    }

    // Applies a pending quit or render failure.
    session.stop(StopReason::SessionEnd);
    session.summary()
}
