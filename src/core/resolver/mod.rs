pub mod extract;
pub mod model;
pub mod resolve;

pub use model::{ResolveStatus, ResolvedMod};
pub use resolve::CollectionResolver;
