/// A trending term and the number of times it appeared in the trend pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub term: String,
    pub frequency: u32,
}

impl Keyword {
    pub fn new(term: &str, frequency: u32) -> Self {
        Self {
            term: term.to_string(),
            frequency,
        }
    }
}
