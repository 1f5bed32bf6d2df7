pub mod compose;
pub mod composer;
pub mod jamo;
