pub mod article;
pub mod keyword;
pub mod window;

pub use article::{Article, NewsEntry, RawArticle, RawSource, ScoredArticle};
pub use keyword::Keyword;
pub use window::DateWindow;
