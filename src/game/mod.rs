pub mod constants;
pub mod driver;
pub mod fruit;
pub mod gesture;
pub mod math;
pub mod session;
pub mod slice;
pub mod trail;
pub mod types;
