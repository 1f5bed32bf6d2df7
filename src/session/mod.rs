pub mod drill;
pub mod flashcards;
pub mod input;
pub mod quiz;
pub mod result;
