pub mod cache;
pub mod preview;
pub mod store;
pub mod types;

pub use cache::ClientCache;
pub use preview::PreviewLinks;
pub use store::HybridStore;
