//! Intent classification and route resolution for incoming messages.

mod classifier;
mod keywords;
mod matching;
mod resolver;

pub use classifier::{IntentClassifier, IntentSignals};
pub use keywords::{SASS_REACTION, Topic};
pub use resolver::{Route, resolve};
