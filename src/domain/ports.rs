use crate::domain::model::Classification;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Raw phone-number rows in a stable order.
///
/// Both methods return at most `limit` rows starting at the `offset`-th row and
/// return fewer (possibly none) at the end of the data. Running past the end is
/// not an error.
#[async_trait]
pub trait RowSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn fetch_range(
        &self,
        offset: usize,
        limit: usize,
    ) -> std::result::Result<Vec<String>, Self::Error>;

    /// Same as `fetch_range`, restricted to rows starting with `(calling_code)`.
    async fn fetch_range_by_calling_code(
        &self,
        calling_code: &str,
        offset: usize,
        limit: usize,
    ) -> std::result::Result<Vec<String>, Self::Error>;
}

pub trait NumberClassifier: Send + Sync {
    fn classify(&self, raw: &str) -> Classification;

    /// Case-insensitive lookup of a country's calling code (digits, no `+`).
    fn calling_code_for(&self, country: &str) -> Result<&str>;
}
