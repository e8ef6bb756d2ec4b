pub mod cards;
pub mod progress;
