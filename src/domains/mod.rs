// Domain services - one per command surface, both over the same store

pub mod marketplace;
pub mod social;

pub use marketplace::MarketplaceService;
pub use social::SocialService;
