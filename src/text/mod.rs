pub mod tokenizer;

pub use tokenizer::{Tokenizer, UnicodeTokenizer};
