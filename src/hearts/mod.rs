//! Heart (lives) economy
//!
//! Hearts gate lesson attempts and regenerate lazily on a fixed timer.
//! Nothing ticks in the background: the balance is recomputed from the
//! elapsed time whenever a caller asks.

pub mod economy;
pub mod models;

pub use economy::HeartEconomy;
pub use models::*;
