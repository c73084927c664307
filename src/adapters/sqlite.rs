use crate::domain::ports::RowSource;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

const CREATE_CUSTOMER_TABLE: &str = "CREATE TABLE IF NOT EXISTS customer (
    id INTEGER PRIMARY KEY,
    name TEXT,
    phone TEXT
)";

const SELECT_RANGE: &str =
    "SELECT phone FROM customer WHERE phone IS NOT NULL ORDER BY rowid LIMIT ?1 OFFSET ?2";

const SELECT_RANGE_BY_CODE: &str = "SELECT phone FROM customer \
     WHERE phone LIKE ?1 ORDER BY rowid LIMIT ?2 OFFSET ?3";

#[derive(Error, Debug)]
pub enum SqliteError {
    #[error("Failed to open database at {path}: {source}")]
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },

    #[error("SQLite query failed: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Database connection lock poisoned")]
    Poisoned,

    #[error("Blocking query task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Row source backed by the `customer` table of an SQLite database.
///
/// Rows come back in insertion (rowid) order. Queries run on tokio's blocking
/// pool; the connection itself is shared behind a mutex.
#[derive(Clone, Debug)]
pub struct SqliteRowSource {
    conn: Arc<Mutex<Connection>>,
    path: PathBuf,
}

impl SqliteRowSource {
    /// Opens (or creates) the database and makes sure the `customer` table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| SqliteError::Open {
            path: path.clone(),
            source,
        })?;
        Self::from_connection(conn, path)
    }

    pub fn open_in_memory() -> Result<Self, SqliteError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, PathBuf::from(":memory:"))
    }

    fn from_connection(conn: Connection, path: PathBuf) -> Result<Self, SqliteError> {
        conn.execute(CREATE_CUSTOMER_TABLE, [])?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends phone numbers in one transaction. Returns how many were written.
    pub fn insert_numbers<I, S>(&self, numbers: I) -> Result<usize, SqliteError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut conn = self.conn.lock().map_err(|_| SqliteError::Poisoned)?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare("INSERT INTO customer (phone) VALUES (?1)")?;
            for number in numbers {
                stmt.execute(params![number.as_ref()])?;
                inserted += 1;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    async fn select_phones(
        &self,
        like: Option<String>,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, SqliteError> {
        // an offset SQLite cannot address is past the end of any table
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || -> Result<Vec<String>, SqliteError> {
            let conn = conn.lock().map_err(|_| SqliteError::Poisoned)?;
            let phones = match like {
                Some(pattern) => {
                    let mut stmt = conn.prepare(SELECT_RANGE_BY_CODE)?;
                    let rows = stmt.query_map(params![pattern, limit, offset], |row| row.get(0))?;
                    rows.collect::<rusqlite::Result<Vec<String>>>()?
                }
                None => {
                    let mut stmt = conn.prepare(SELECT_RANGE)?;
                    let rows = stmt.query_map(params![limit, offset], |row| row.get(0))?;
                    rows.collect::<rusqlite::Result<Vec<String>>>()?
                }
            };
            Ok(phones)
        })
        .await?
    }
}

#[async_trait]
impl RowSource for SqliteRowSource {
    type Error = SqliteError;

    async fn fetch_range(&self, offset: usize, limit: usize) -> Result<Vec<String>, SqliteError> {
        self.select_phones(None, offset, limit).await
    }

    async fn fetch_range_by_calling_code(
        &self,
        calling_code: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<String>, SqliteError> {
        // codes are digits only, so no LIKE wildcards can sneak in
        let pattern = format!("({})%", calling_code);
        self.select_phones(Some(pattern), offset, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteRowSource {
        let source = SqliteRowSource::open_in_memory().unwrap();
        source
            .insert_numbers([
                "(212) 698054317",
                "(237) 697151594",
                "(258) 847651504",
                "(237) 677046616",
                "(237) 6780009592",
            ])
            .unwrap();
        source
    }

    #[tokio::test]
    async fn test_fetch_range_keeps_insertion_order() {
        let source = seeded();
        let rows = source.fetch_range(0, 3).await.unwrap();
        assert_eq!(
            rows,
            vec!["(212) 698054317", "(237) 697151594", "(258) 847651504"]
        );

        let tail = source.fetch_range(3, 10).await.unwrap();
        assert_eq!(tail, vec!["(237) 677046616", "(237) 6780009592"]);
        assert!(source.fetch_range(5, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_range_beyond_sqlite_integers_is_empty() {
        let source = seeded();
        assert!(source.fetch_range(usize::MAX, usize::MAX).await.unwrap().is_empty());
        assert!(source
            .fetch_range_by_calling_code("237", usize::MAX, 10)
            .await
            .unwrap()
            .is_empty());

        let all = source.fetch_range(0, usize::MAX).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_range_by_calling_code() {
        let source = seeded();
        let rows = source
            .fetch_range_by_calling_code("237", 1, 10)
            .await
            .unwrap();
        assert_eq!(rows, vec!["(237) 677046616", "(237) 6780009592"]);

        let none = source
            .fetch_range_by_calling_code("256", 0, 10)
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_insert_numbers_counts_rows() {
        let source = SqliteRowSource::open_in_memory().unwrap();
        assert_eq!(source.insert_numbers(Vec::<String>::new()).unwrap(), 0);
        assert_eq!(source.insert_numbers(["(256) 704244430"]).unwrap(), 1);
        assert_eq!(source.path(), Path::new(":memory:"));
    }
}
