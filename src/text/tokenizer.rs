//! Word tokenization for mixed Latin/Han text.
//!
//! Latin-script words are kept whole. Han text has no spaces between words,
//! so each run of consecutive ideographs is broken into overlapping
//! two-character tokens ("人工智能" becomes "人工", "工智", "智能"). A lone
//! ideograph is emitted as-is.

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

pub trait Tokenizer {
    /// Split `text` into word tokens, in order of appearance.
    fn tokenize(&self, text: &str) -> Vec<String>;
}

#[derive(Debug, Clone)]
pub struct UnicodeTokenizer {
    han: Regex,
}

impl UnicodeTokenizer {
    pub fn new() -> Self {
        Self {
            han: Regex::new(r"^\p{Han}+$").expect("Han pattern is valid"),
        }
    }

    fn flush_han_run(run: &mut Vec<char>, tokens: &mut Vec<String>) {
        match run.len() {
            0 => {}
            1 => tokens.push(run[0].to_string()),
            _ => tokens.extend(run.windows(2).map(|pair| pair.iter().collect::<String>())),
        }
        run.clear();
    }
}

impl Default for UnicodeTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for UnicodeTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut han_run: Vec<char> = Vec::new();

        // Punctuation and spaces end a Han run, so walk every segment
        // rather than only the words.
        for segment in text.split_word_bounds() {
            if self.han.is_match(segment) {
                han_run.extend(segment.chars());
                continue;
            }
            Self::flush_han_run(&mut han_run, &mut tokens);
            if segment.chars().any(char::is_alphanumeric) {
                tokens.push(segment.to_string());
            }
        }
        Self::flush_han_run(&mut han_run, &mut tokens);

        tokens
    }
}
