pub mod grading;
pub mod progress;
pub mod selector;

pub use progress::{LevelProgress, LevelSummary};
