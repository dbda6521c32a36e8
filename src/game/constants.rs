pub const HAND_LANDMARK_COUNT: usize = 21;
pub const FINGERTIP_INDEX: usize = 8;
pub const MIN_TRAIL_THICKNESS: u32 = 1;
