pub mod ci;
pub mod context;
pub mod registry;
pub mod source;

pub use context::AcquireContext;
pub use source::{AcquireOutcome, ModSource, Source};
