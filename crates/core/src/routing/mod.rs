pub mod chain;
pub mod classifier;

pub use chain::{ChainBuilder, ChainStep};
pub use classifier::IntentClassifier;
