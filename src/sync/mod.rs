pub mod engine;
pub mod store;

pub use engine::{CycleReport, SyncEngine};
pub use store::OfferStore;
