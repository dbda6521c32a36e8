use super::constants::{HAND_LANDMARK_COUNT, MIN_TRAIL_THICKNESS};
use super::fruit::FruitPopulation;
use super::gesture::{fingertip, GestureClassifier};
use super::math::to_pixel;
use super::slice;
use super::trail::Trail;
use super::types::{FruitSnapshot, Gesture, Landmark, Point, RenderState, TrailPoint, TrailSegment};
use crate::app::config::{Difficulty, GameConfig};
use serde::Serialize;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopReason {
    UserQuit,
    CaptureFailure,
    SessionEnd,
}

#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    pub now: f64,
    pub landmarks: Option<Vec<Landmark>>,
}

impl FrameInput {
    pub fn new(now: f64, landmarks: Option<Vec<Landmark>>) -> Self {
        let landmarks = landmarks.map(|mut points| {
            points.truncate(HAND_LANDMARK_COUNT);
            points
        });
        Self { now, landmarks }
    }
}

#[derive(Debug)]
pub struct GameState {
    pub score: i64,
    pub fruits: FruitPopulation,
    pub trail: Trail,
    pub gesture_history: GestureClassifier,
    pub last_spawn_time: f64,
    pub running: bool,
    pub ticks: u64,
    pub spawned: u64,
    pub sliced: u64,
    pub escaped: u64,
}

impl GameState {
    pub fn new(config: &GameConfig, now: f64) -> Self {
        Self {
            score: 0,
            fruits: FruitPopulation::new(config),
            trail: Trail::new(config.trail_max_points, config.trail_lifetime),
            gesture_history: GestureClassifier::new(
                config.gesture_history_size,
                config.min_slash_velocity,
            ),
            last_spawn_time: now,
            running: true,
            ticks: 0,
            spawned: 0,
            sliced: 0,
            escaped: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub score: i64,
    pub difficulty: Difficulty,
    pub ticks: u64,
    pub spawned: u64,
    pub sliced: u64,
    pub escaped: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<StopReason>,
}

#[derive(Debug)]
pub struct GameSession {
    config: GameConfig,
    state: GameState,
    pending_stop: Option<StopReason>,
    stop_reason: Option<StopReason>,
}

impl GameSession {
    pub fn new(config: GameConfig, now: f64) -> Self {
        let state = GameState::new(&config, now);
        Self {
            config,
            state,
            pending_stop: None,
            stop_reason: None,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> &GameState {
        &self.state
    }

    pub fn loop_state(&self) -> LoopState {
        if self.state.running {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn stop_pending(&self) -> bool {
        self.pending_stop.is_some()
    }

    // Honoured at the start of the next tick.
    pub fn request_stop(&mut self, reason: StopReason) {
        if self.state.running && self.pending_stop.is_none() {
            self.pending_stop = Some(reason);
        }
    }

    pub fn stop(&mut self, reason: StopReason) {
        if !self.state.running {
            return;
        }
        let reason = self.pending_stop.take().unwrap_or(reason);
        self.state.running = false;
        self.stop_reason = Some(reason);
        tracing::info!(
            score = self.state.score,
            ticks = self.state.ticks,
            fruits_left = self.state.fruits.live_count(),
            ?reason,
            "session stopped"
        );
    }

    pub fn tick(&mut self, frame: &FrameInput) -> Option<RenderState> {
        if let Some(reason) = self.pending_stop {
            self.stop(reason);
        }
        if !self.state.running {
            return None;
        }

        let now = frame.now;
        let landmarks = frame.landmarks.as_deref();

        if now - self.state.last_spawn_time > self.config.spawn_interval {
            let fruit = self.state.fruits.spawn();
            tracing::debug!(x = fruit.x, y = fruit.y, "fruit spawned");
            self.state.last_spawn_time = now;
            self.state.spawned += 1;
        }

        let gesture = self.state.gesture_history.classify(landmarks);

        let tip = fingertip(landmarks)
            .map(|tip| to_pixel(tip, self.config.window_width, self.config.window_height));
        if let Some(tip) = tip {
            self.state.trail.add_point(tip.x, tip.y, now);
        }
        self.state.trail.prune(now);

        self.state.fruits.advance(self.config.fruit_velocity);
        let reaped = self.state.fruits.reap();
        if reaped.escaped > 0 || reaped.sliced > 0 {
            tracing::debug!(sliced = reaped.sliced, escaped = reaped.escaped, "fruit reaped");
        }
        self.state.escaped += reaped.escaped as u64;

        let recent = self
            .state
            .trail
            .recent(self.config.trail_collision_window, now);
        let delta = slice::resolve(
            gesture,
            &recent,
            self.state.fruits.fruits_mut(),
            self.config.slice_threshold,
        );
        self.state.score += delta;
        self.state.sliced += delta as u64;
        self.state.ticks += 1;
        tracing::trace!(
            tick = self.state.ticks,
            fruits = self.state.fruits.len(),
            trail = self.state.trail.len(),
            ?gesture,
            "tick"
        );

        Some(self.render_state(gesture, landmarks, tip, now))
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.state.score,
            difficulty: self.config.difficulty,
            ticks: self.state.ticks,
            spawned: self.state.spawned,
            sliced: self.state.sliced,
            escaped: self.state.escaped,
            reason: self.stop_reason,
        }
    }

    fn render_state(
        &self,
        gesture: Gesture,
        landmarks: Option<&[Landmark]>,
        tip: Option<Point>,
        now: f64,
    ) -> RenderState {
        let points: Vec<&TrailPoint> = self.state.trail.points().collect();
        let trail = points
            .windows(2)
            .map(|pair| {
                let alpha = pair[1].fade_alpha(now);
                let thickness =
                    ((self.config.trail_max_thickness as f64 * alpha) as u32).max(MIN_TRAIL_THICKNESS);
                TrailSegment {
                    from: Point {
                        x: pair[0].x,
                        y: pair[0].y,
                    },
                    to: Point {
                        x: pair[1].x,
                        y: pair[1].y,
                    },
                    alpha,
                    thickness,
                }
            })
            .collect();

        let fruits = self
            .state
            .fruits
            .fruits()
            .iter()
            .filter(|fruit| fruit.alive)
            .map(|fruit| FruitSnapshot {
                x: fruit.x,
                y: fruit.y,
                radius: fruit.radius,
                color: fruit.color.clone(),
            })
            .collect();

        let landmarks = if self.config.show_hand_landmarks {
            landmarks.map(|points| {
                points
                    .iter()
                    .map(|point| to_pixel(*point, self.config.window_width, self.config.window_height))
                    .collect()
            })
        } else {
            None
        };

        RenderState {
            tick: self.state.ticks,
            score: self.state.score,
            gesture,
            trail_color: self.config.trail_color.clone(),
            trail,
            fruits,
            fingertip: tip.filter(|_| self.config.show_fingertip_marker),
            landmarks,
        }
    }
}
