pub mod listing;
pub mod publisher;

pub use listing::{map_offer, ListingEvent, LISTING_KIND, LISTING_TTL_SECS};
pub use publisher::{ListingPublisher, NostrPublisher};
