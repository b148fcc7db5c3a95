use crate::domain::NewsEntry;
use crate::errors::TrendResult;

#[cfg_attr(test, mockall::automock)]
pub trait ArticleWriter {
    /// Replace the output with `entries`, in the given order. Either the
    /// whole list is persisted or the previous output is left as it was.
    fn write(&self, entries: &[NewsEntry]) -> TrendResult<()>;
}
