//! Online word-weight model and its tokenizer

pub mod tokenizer;
pub mod weights;

pub use tokenizer::{normalize, tokenize};
pub use weights::{Polarity, Sign, WordWeightModel, DEFAULT_LEARNING_RATE};
