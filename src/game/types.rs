use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl From<[f64; 2]> for Landmark {
    fn from(value: [f64; 2]) -> Self {
        Self {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<Landmark> for [f64; 2] {
    fn from(value: Landmark) -> Self {
        [value.x, value.y]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    #[default]
    None,
    Slashing,
}

#[derive(Debug, Clone)]
pub struct Fruit {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
    pub alive: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub x: f64,
    pub y: f64,
    pub created_at: f64,
    pub lifetime: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrailSegment {
    pub from: Point,
    pub to: Point,
    pub alpha: f64,
    pub thickness: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FruitSnapshot {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderState {
    pub tick: u64,
    pub score: i64,
    pub gesture: Gesture,
    #[serde(rename = "trailColor")]
    pub trail_color: String,
    pub trail: Vec<TrailSegment>,
    pub fruits: Vec<FruitSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingertip: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmarks: Option<Vec<Point>>,
}
