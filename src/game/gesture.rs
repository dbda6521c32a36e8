use super::constants::FINGERTIP_INDEX;
use super::types::{Gesture, Landmark};
use std::collections::VecDeque;

#[derive(Debug)]
pub struct GestureClassifier {
    history: VecDeque<Landmark>,
    capacity: usize,
    min_velocity: f64,
}

pub fn fingertip(landmarks: Option<&[Landmark]>) -> Option<Landmark> {
    let tip = *landmarks?.get(FINGERTIP_INDEX)?;
    if !tip.x.is_finite() || !tip.y.is_finite() {
        return None;
    }
    Some(tip)
}

impl GestureClassifier {
    pub fn new(capacity: usize, min_velocity: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: VecDeque::with_capacity(capacity),
            capacity,
            min_velocity,
        }
    }

    pub fn classify(&mut self, landmarks: Option<&[Landmark]>) -> Gesture {
        let Some(tip) = fingertip(landmarks) else {
            self.history.clear();
            return Gesture::None;
        };

        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(tip);

        match self.average_speed() {
            Some(speed) if speed >= self.min_velocity => Gesture::Slashing,
            _ => Gesture::None,
        }
    }

    pub fn average_speed(&self) -> Option<f64> {
        if self.history.len() < 2 {
            return None;
        }
        let (oldest, newest) = (self.history.front()?, self.history.back()?);
        let frames = (self.history.len() - 1) as f64;
        let vx = (newest.x - oldest.x) / frames;
        let vy = (newest.y - oldest.y) / frames;
        Some((vx * vx + vy * vy).sqrt())
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.history.len()
    }
}
