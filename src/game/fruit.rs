use super::math::distance;
use super::types::Fruit;
use crate::app::config::GameConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

impl Fruit {
    pub fn advance(&mut self, velocity: f64) {
        self.y -= velocity;
    }

    pub fn is_offscreen(&self, min_y: f64) -> bool {
        self.y < min_y
    }
}

pub fn check_collision(fruit: &Fruit, x: f64, y: f64, threshold: f64) -> bool {
    if !fruit.alive {
        return false;
    }
    distance(fruit.x, fruit.y, x, y) < fruit.radius + threshold
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReapOutcome {
    pub sliced: usize,
    pub escaped: usize,
}

#[derive(Debug)]
pub struct FruitPopulation {
    fruits: Vec<Fruit>,
    rng: StdRng,
    min_x: i64,
    max_x: i64,
    start_y: f64,
    min_y: f64,
    radius: f64,
    color: String,
}

impl FruitPopulation {
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.spawn_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let min_x = config.spawn_margin.round() as i64;
        let max_x = (config.window_width as i64 - min_x).max(min_x);
        Self {
            fruits: Vec::new(),
            rng,
            min_x,
            max_x,
            start_y: config.spawn_start_y(),
            min_y: config.offscreen_min_y,
            radius: config.fruit_radius,
            color: config.fruit_color.clone(),
        }
    }

    pub fn spawn(&mut self) -> &Fruit {
        let x = self.rng.gen_range(self.min_x..=self.max_x) as f64;
        self.fruits.push(Fruit {
            x,
            y: self.start_y,
            radius: self.radius,
            color: self.color.clone(),
            alive: true,
        });
        &self.fruits[self.fruits.len() - 1]
    }

    pub fn advance(&mut self, velocity: f64) {
        for fruit in &mut self.fruits {
            fruit.advance(velocity);
        }
    }

    pub fn reap(&mut self) -> ReapOutcome {
        let min_y = self.min_y;
        let mut outcome = ReapOutcome::default();
        self.fruits.retain(|fruit| {
            if !fruit.alive {
                outcome.sliced += 1;
                false
            } else if fruit.is_offscreen(min_y) {
                outcome.escaped += 1;
                false
            } else {
                true
            }
        });
        outcome
    }

    pub fn fruits(&self) -> &[Fruit] {
        &self.fruits
    }

    pub fn fruits_mut(&mut self) -> &mut [Fruit] {
        &mut self.fruits
    }

    pub fn live_count(&self) -> usize {
        self.fruits.iter().filter(|fruit| fruit.alive).count()
    }

    pub fn len(&self) -> usize {
        self.fruits.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.fruits.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn insert(&mut self, fruit: Fruit) {
        self.fruits.push(fruit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_config() -> GameConfig {
        GameConfig {
            spawn_seed: Some(7),
            ..GameConfig::default()
        }
    }

    fn fruit_at(x: f64, y: f64) -> Fruit {
        Fruit {
            x,
            y,
            radius: 20.0,
            color: "#ffff00".to_string(),
            alive: true,
        }
    }

    #[test]
    fn spawn_stays_within_margins_below_screen() {
        let config = seeded_config();
        let mut population = FruitPopulation::new(&config);
        for _ in 0..200 {
            let fruit = population.spawn().clone();
            assert!(fruit.x >= 50.0 && fruit.x <= 590.0);
            assert_eq!(fruit.x.fract(), 0.0);
            assert_eq!(fruit.y, 530.0);
            assert_eq!(fruit.radius, 20.0);
            assert!(fruit.alive);
        }
        assert_eq!(population.len(), 200);
    }

    #[test]
    fn seeded_spawns_are_deterministic() {
        let config = seeded_config();
        let mut a = FruitPopulation::new(&config);
        let mut b = FruitPopulation::new(&config);
        for _ in 0..20 {
            assert_eq!(a.spawn().x, b.spawn().x);
        }
    }

    #[test]
    fn advance_moves_only_upward() {
        let mut population = FruitPopulation::new(&seeded_config());
        population.insert(fruit_at(100.0, 300.0));
        population.advance(5.0);
        population.advance(5.0);
        let fruit = &population.fruits()[0];
        assert_eq!(fruit.x, 100.0);
        assert_eq!(fruit.y, 290.0);
    }

    #[test]
    fn collision_boundary_is_exclusive() {
        let fruit = fruit_at(100.0, 100.0);
        let eps = 1e-6;
        assert!(check_collision(&fruit, 100.0 + 40.0 - eps, 100.0, 20.0));
        assert!(!check_collision(&fruit, 100.0 + 40.0, 100.0, 20.0));
        assert!(!check_collision(&fruit, 100.0 + 40.0 + eps, 100.0, 20.0));
    }

    #[test]
    fn dead_fruit_never_collides() {
        let mut fruit = fruit_at(100.0, 100.0);
        fruit.alive = false;
        assert!(!check_collision(&fruit, 100.0, 100.0, 20.0));
    }

    #[test]
    fn reap_counts_sliced_and_escaped_and_is_idempotent() {
        let mut population = FruitPopulation::new(&seeded_config());
        let mut sliced = fruit_at(100.0, 200.0);
        sliced.alive = false;
        population.insert(sliced);
        population.insert(fruit_at(200.0, -50.5));
        population.insert(fruit_at(300.0, -50.0));

        let outcome = population.reap();
        assert_eq!(
            outcome,
            ReapOutcome {
                sliced: 1,
                escaped: 1
            }
        );
        assert_eq!(population.len(), 1);

        assert_eq!(population.reap(), ReapOutcome::default());
        assert_eq!(population.len(), 1);
        assert_eq!(population.live_count(), 1);
    }
}
