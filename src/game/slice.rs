use super::fruit::check_collision;
use super::types::{Fruit, Gesture, TrailPoint};

// Each trail point, oldest first, cuts at most the first live fruit it touches.
pub fn resolve(
    gesture: Gesture,
    recent: &[TrailPoint],
    fruits: &mut [Fruit],
    threshold: f64,
) -> i64 {
    if gesture != Gesture::Slashing {
        return 0;
    }

    let mut delta = 0;
    for point in recent {
        let hit = fruits
            .iter_mut()
            .find(|fruit| check_collision(fruit, point.x, point.y, threshold));
        if let Some(fruit) = hit {
            fruit.alive = false;
            delta += 1;
            tracing::debug!(x = fruit.x, y = fruit.y, "fruit sliced");
        }
    }
    delta
}
