use camino::Utf8Path;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::domain::Post;
use crate::error::HarvestError;

const CREATE_POSTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS posts (
        userId INTEGER,
        id INTEGER PRIMARY KEY,
        title TEXT,
        body TEXT
    )
"#;

const INSERT_POST: &str =
    "INSERT OR IGNORE INTO posts (userId, id, title, body) VALUES (?1, ?2, ?3, ?4)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InsertSummary {
    pub inserted: usize,
    /// Rows whose `id` was already present.
    pub skipped: usize,
}

/// SQLite-backed `posts` table. Rows are only ever inserted; an existing
/// primary key makes the insert a no-op.
pub struct PostStore {
    conn: Connection,
}

impl PostStore {
    /// Opens the database file, creating it and the `posts` table if needed.
    pub fn open(path: &Utf8Path) -> Result<Self, HarvestError> {
        let conn = Connection::open(path.as_std_path()).map_err(persistence)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, HarvestError> {
        let conn = Connection::open_in_memory().map_err(persistence)?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, HarvestError> {
        conn.execute(CREATE_POSTS_TABLE, []).map_err(persistence)?;
        Ok(Self { conn })
    }

    /// Inserts every post in one transaction. Duplicate ids are counted as
    /// skipped and never abort the batch.
    pub fn insert_posts(&mut self, posts: &[Post]) -> Result<InsertSummary, HarvestError> {
        let tx = self.conn.transaction().map_err(persistence)?;
        let mut summary = InsertSummary::default();
        {
            let mut stmt = tx.prepare(INSERT_POST).map_err(persistence)?;
            for post in posts {
                let changed = stmt
                    .execute(params![post.user_id, post.id, post.title, post.body])
                    .map_err(persistence)?;
                if changed == 0 {
                    summary.skipped += 1;
                } else {
                    summary.inserted += 1;
                }
            }
        }
        tx.commit().map_err(persistence)?;
        Ok(summary)
    }

    pub fn count(&self) -> Result<u64, HarvestError> {
        self.conn
            .query_row("SELECT COUNT(*) FROM posts", [], |row| row.get::<_, i64>(0))
            .map(|count| count as u64)
            .map_err(persistence)
    }

    pub fn get(&self, id: i64) -> Result<Option<Post>, HarvestError> {
        self.conn
            .query_row(
                "SELECT userId, id, title, body FROM posts WHERE id = ?1",
                [id],
                |row| {
                    Ok(Post {
                        user_id: row.get(0)?,
                        id: row.get(1)?,
                        title: row.get(2)?,
                        body: row.get(3)?,
                    })
                },
            )
            .optional()
            .map_err(persistence)
    }
}

/// Opens the database at `path`, inserts the posts and closes the
/// connection again.
pub fn persist_posts(posts: &[Post], path: &Utf8Path) -> Result<InsertSummary, HarvestError> {
    let mut store = PostStore::open(path)?;
    store.insert_posts(posts)
}

fn persistence(err: rusqlite::Error) -> HarvestError {
    HarvestError::Persistence(err.to_string())
}
