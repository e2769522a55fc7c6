//! In-memory implementation of [`ProgramStore`].
//!
//! [`InMemoryStore`] is a first-class backend for tests and for running the
//! server without a database. It keeps records in a `BTreeMap` keyed by uid,
//! which gives the same ascending enumeration order as the other backends.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::query::ProgramFilter;
use crate::traits::ProgramStore;
use crate::types::{ProgramUid, StoredProgram};

#[derive(Debug)]
struct Inner {
    programs: BTreeMap<u64, Vec<String>>,
    next_uid: u64,
}

/// Process-local program store.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store. Uids start at `0x1`.
    pub fn new() -> Self {
        InMemoryStore {
            inner: Mutex::new(Inner {
                programs: BTreeMap::new(),
                next_uid: 1,
            }),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StorageError> {
        self.inner
            .lock()
            .map_err(|_| StorageError::Connection("in-memory store lock poisoned".to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramStore for InMemoryStore {
    fn save(&self, code: &[String]) -> Result<StoredProgram, StorageError> {
        let mut inner = self.lock().map_err(|e| StorageError::Mutate(e.to_string()))?;
        let uid = inner.next_uid;
        inner.next_uid += 1;
        inner.programs.insert(uid, code.to_vec());
        Ok(StoredProgram {
            uid: ProgramUid(uid),
            code: code.to_vec(),
        })
    }

    fn query(&self, filter: &ProgramFilter) -> Result<Vec<StoredProgram>, StorageError> {
        let inner = self.lock().map_err(|e| StorageError::Query(e.to_string()))?;
        let rows = inner.programs.iter().map(|(uid, code)| {
            (
                ProgramUid(*uid),
                StoredProgram {
                    uid: ProgramUid(*uid),
                    code: code.clone(),
                },
            )
        });
        Ok(filter.select(rows))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
