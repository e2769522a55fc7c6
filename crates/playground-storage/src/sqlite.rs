//! SQLite implementation of [`ProgramStore`].
//!
//! [`SqliteStore`] persists programs in a single `programs` table. The code
//! sequence is stored as a JSON TEXT column via serde_json. Every call opens
//! its own connection, so the store itself holds only the database path and
//! is trivially shareable across request threads.

use rusqlite::{params, Connection};

use crate::error::StorageError;
use crate::query::ProgramFilter;
use crate::traits::ProgramStore;
use crate::types::{ProgramUid, StoredProgram};

/// SQLite-backed implementation of [`ProgramStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens (or creates) a SQLite database at `path` and applies migrations.
    pub fn new(path: &str) -> Result<Self, StorageError> {
        let store = SqliteStore {
            db_path: path.to_string(),
        };
        // Fail at startup rather than on the first request.
        store.open_conn()?;
        Ok(store)
    }

    fn open_conn(&self) -> Result<Connection, StorageError> {
        crate::schema::open_database(&self.db_path)
    }

    fn row_to_program(id: i64, code_json: &str) -> Result<StoredProgram, StorageError> {
        let code: Vec<String> = serde_json::from_str(code_json)?;
        Ok(StoredProgram {
            uid: ProgramUid(id as u64),
            code,
        })
    }

    fn fetch(
        conn: &Connection,
        sql: &str,
        args: impl rusqlite::Params,
    ) -> Result<Vec<StoredProgram>, StorageError> {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut programs = Vec::new();
        for row in rows {
            let (id, code_json) = row?;
            programs.push(Self::row_to_program(id, &code_json)?);
        }
        Ok(programs)
    }
}

impl ProgramStore for SqliteStore {
    fn save(&self, code: &[String]) -> Result<StoredProgram, StorageError> {
        let code_json = serde_json::to_string(code)?;
        let mut conn = self
            .open_conn()
            .map_err(|e| StorageError::Mutate(e.to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StorageError::Mutate(e.to_string()))?;
        tx.execute("INSERT INTO programs (code) VALUES (?1)", params![code_json])
            .map_err(|e| StorageError::Mutate(e.to_string()))?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(|e| StorageError::Mutate(e.to_string()))?;

        Ok(StoredProgram {
            uid: ProgramUid(id as u64),
            code: code.to_vec(),
        })
    }

    fn query(&self, filter: &ProgramFilter) -> Result<Vec<StoredProgram>, StorageError> {
        let conn = self
            .open_conn()
            .map_err(|e| StorageError::Query(e.to_string()))?;

        // Row ids are positive i64, so a uid past i64::MAX matches nothing
        // and no row follows it.
        let result = match *filter {
            ProgramFilter::All => Self::fetch(
                &conn,
                "SELECT id, code FROM programs ORDER BY id ASC",
                params![],
            ),
            ProgramFilter::ByUid(uid) => match i64::try_from(uid.0) {
                Ok(id) => Self::fetch(
                    &conn,
                    "SELECT id, code FROM programs WHERE id = ?1",
                    params![id],
                ),
                Err(_) => Ok(Vec::new()),
            },
            ProgramFilter::Page { after, first } => match i64::try_from(after.0) {
                Ok(after) => Self::fetch(
                    &conn,
                    "SELECT id, code FROM programs WHERE id > ?1 ORDER BY id ASC LIMIT ?2",
                    params![after, i64::try_from(first).unwrap_or(i64::MAX)],
                ),
                Err(_) => Ok(Vec::new()),
            },
        };

        result.map_err(|e| match e {
            StorageError::Serialization(_) => e,
            other => StorageError::Query(other.to_string()),
        })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("programs.db");
        let store = SqliteStore::new(path.to_str().unwrap()).unwrap();
        (dir, store)
    }

    #[test]
    fn save_then_get_round_trips_code() {
        let (_dir, store) = temp_store();
        let code = vec!["print(1)".to_string(), "print(2)".to_string()];
        let saved = store.save(&code).unwrap();

        let found = store.query(&ProgramFilter::ByUid(saved.uid)).unwrap();
        assert_eq!(found, vec![saved.clone()]);
        assert_eq!(found[0].code, code);
    }

    #[test]
    fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("programs.db");
        let path = path.to_str().unwrap();

        let saved = SqliteStore::new(path)
            .unwrap()
            .save(&["x = 1".to_string()])
            .unwrap();
        let reopened = SqliteStore::new(path).unwrap();
        let all = reopened.query(&ProgramFilter::All).unwrap();
        assert_eq!(all, vec![saved]);
    }

    #[test]
    fn page_never_includes_cursor() {
        let (_dir, store) = temp_store();
        let saved: Vec<_> = (0..4)
            .map(|i| store.save(&[format!("print({i})")]).unwrap())
            .collect();

        let page = store
            .query(&ProgramFilter::Page {
                after: saved[0].uid,
                first: 2,
            })
            .unwrap();
        assert_eq!(page.len(), 2);
        assert!(page.iter().all(|p| p.uid != saved[0].uid));
        assert_eq!(page[0].uid, saved[1].uid);
    }

    #[test]
    fn uid_beyond_row_id_range_matches_nothing() {
        let (_dir, store) = temp_store();
        for i in 0..3 {
            store.save(&[format!("print({i})")]).unwrap();
        }

        let after = ProgramUid(u64::MAX);
        let page = store.query(&ProgramFilter::Page { after, first: 2 }).unwrap();
        assert!(page.iter().all(|p| p.uid > after));
        assert!(page.is_empty());

        let just_past = ProgramUid(i64::MAX as u64 + 1);
        assert!(store
            .query(&ProgramFilter::ByUid(just_past))
            .unwrap()
            .is_empty());
        assert!(store
            .query(&ProgramFilter::Page {
                after: just_past,
                first: 2
            })
            .unwrap()
            .is_empty());
    }

    #[test]
    fn missing_uid_yields_no_rows() {
        let (_dir, store) = temp_store();
        assert!(store
            .query(&ProgramFilter::ByUid(ProgramUid(42)))
            .unwrap()
            .is_empty());
    }
}
