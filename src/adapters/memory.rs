use crate::domain::ports::RowSource;
use async_trait::async_trait;
use std::convert::Infallible;

/// Row source over an ordered list held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRowSource {
    rows: Vec<String>,
}

impl InMemoryRowSource {
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows }
    }

    pub fn from_rows(rows: &[&str]) -> Self {
        Self::new(rows.iter().map(|row| row.to_string()).collect())
    }
}

#[async_trait]
impl RowSource for InMemoryRowSource {
    type Error = Infallible;

    async fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<String>, Infallible> {
        Ok(self.rows.iter().skip(offset).take(limit).cloned().collect())
    }

    async fn fetch_range_by_calling_code(
        &self,
        calling_code: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, Infallible> {
        let prefix = format!("({})", calling_code);
        Ok(self
            .rows
            .iter()
            .filter(|row| row.starts_with(&prefix))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}
