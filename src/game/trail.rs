use super::math::clamp;
use super::types::TrailPoint;
use std::collections::VecDeque;

impl TrailPoint {
    pub fn age(&self, now: f64) -> f64 {
        now - self.created_at
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) > self.lifetime
    }

    pub fn fade_alpha(&self, now: f64) -> f64 {
        clamp(1.0 - self.age(now) / self.lifetime, 0.0, 1.0)
    }
}

#[derive(Debug)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
    lifetime: f64,
}

impl Trail {
    pub fn new(capacity: usize, lifetime: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            lifetime,
        }
    }

    pub fn add_point(&mut self, x: f64, y: f64, now: f64) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(TrailPoint {
            x,
            y,
            created_at: now,
            lifetime: self.lifetime,
        });
    }

    // Lifetime is constant, so expiry follows insertion order.
    pub fn prune(&mut self, now: f64) -> usize {
        let mut removed = 0;
        while self
            .points
            .front()
            .is_some_and(|point| point.is_expired(now))
        {
            self.points.pop_front();
            removed += 1;
        }
        removed
    }

    pub fn recent(&self, window: f64, now: f64) -> Vec<TrailPoint> {
        self.points
            .iter()
            .filter(|point| point.age(now) <= window)
            .copied()
            .collect()
    }

    pub fn points(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    #[test]
    fn point_expiry_is_strictly_after_lifetime() {
        let point = TrailPoint {
            x: 0.0,
            y: 0.0,
            created_at: 10.0,
            lifetime: 0.5,
        };
        assert!(!point.is_expired(10.5 - EPS));
        assert!(!point.is_expired(10.5));
        assert!(point.is_expired(10.5 + EPS));
    }

    #[test]
    fn fade_alpha_decays_linearly_to_zero() {
        let point = TrailPoint {
            x: 0.0,
            y: 0.0,
            created_at: 2.0,
            lifetime: 0.5,
        };
        assert_eq!(point.fade_alpha(2.0), 1.0);
        assert!((point.fade_alpha(2.25) - 0.5).abs() < 1e-9);
        assert_eq!(point.fade_alpha(2.5), 0.0);
        assert_eq!(point.fade_alpha(9.0), 0.0);

        let mut previous = f64::INFINITY;
        for step in 0..=50 {
            let alpha = point.fade_alpha(2.0 + step as f64 * 0.01);
            assert!(alpha <= previous);
            previous = alpha;
        }
    }

    #[test]
    fn capacity_evicts_oldest_first() {
        let mut trail = Trail::new(3, 1.0);
        for index in 0..5 {
            trail.add_point(index as f64, 0.0, index as f64 * 0.01);
        }
        let xs: Vec<f64> = trail.points().map(|point| point.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn prune_removes_expired_prefix() {
        let mut trail = Trail::new(10, 0.5);
        trail.add_point(0.0, 0.0, 0.0);
        trail.add_point(1.0, 0.0, 0.2);
        trail.add_point(2.0, 0.0, 0.4);

        assert_eq!(trail.prune(0.65), 1);
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.prune(0.65), 0);
        assert_eq!(trail.prune(1.0), 2);
        assert!(trail.is_empty());
    }

    #[test]
    fn recent_uses_collision_window_not_lifetime() {
        let mut trail = Trail::new(10, 0.5);
        trail.add_point(0.0, 0.0, 0.0);
        trail.add_point(1.0, 0.0, 0.25);
        trail.add_point(2.0, 0.0, 0.4);

        let recent = trail.recent(0.3, 0.45);
        let xs: Vec<f64> = recent.iter().map(|point| point.x).collect();
        assert_eq!(xs, vec![1.0, 2.0]);
        assert_eq!(trail.len(), 3);
    }
}
