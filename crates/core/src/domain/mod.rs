pub mod outfit;
pub mod season;
pub mod weather;
