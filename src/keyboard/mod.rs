pub mod display;
pub mod model;
