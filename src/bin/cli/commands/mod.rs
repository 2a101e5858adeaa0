pub mod cards;
pub mod complete;
pub mod level;
pub mod start;
pub mod status;
