use super::types::{Landmark, Point};

pub fn distance(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.min(max).max(min)
}

pub fn to_pixel(landmark: Landmark, width: u32, height: u32) -> Point {
    Point {
        x: (landmark.x * width as f64).trunc(),
        y: (landmark.y * height as f64).trunc(),
    }
}
