pub mod detect;
pub mod model;

pub use detect::detect;
pub use model::{LoaderInfo, LoaderType};
