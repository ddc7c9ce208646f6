pub mod peach;
pub mod types;

pub use peach::{OfferSource, PeachClient};
pub use types::*;
