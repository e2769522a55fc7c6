//! ProgramService: the coordinator between HTTP handlers and the program store.
//!
//! Each operation builds a [`ProgramFilter`] and hands it to the configured
//! [`ProgramStore`] verbatim. Store calls are synchronous, so every call runs
//! on tokio's blocking pool and never stalls the runtime.

use std::sync::Arc;

use playground_storage::{ProgramFilter, ProgramStore, ProgramUid, StorageError, StoredProgram};

use crate::error::ApiError;

/// Storage-facing half of the API.
#[derive(Clone)]
pub struct ProgramService {
    store: Arc<dyn ProgramStore>,
    page_size: usize,
}

impl ProgramService {
    /// Wraps `store`, paging `page_size` records at a time.
    pub fn new(store: Arc<dyn ProgramStore>, page_size: usize) -> Self {
        ProgramService { store, page_size }
    }

    /// Name of the backing store, for diagnostics.
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Persists `code`. The write is committed before this returns.
    pub async fn save_program(&self, code: Vec<String>) -> Result<StoredProgram, ApiError> {
        let store = Arc::clone(&self.store);
        let saved = run_blocking(move || store.save(&code), ApiError::mutation).await?;
        tracing::info!(uid = %saved.uid, fragments = saved.code.len(), "saved program");
        Ok(saved)
    }

    /// Every stored program, in the order the store yields them.
    pub async fn get_all_programs(&self) -> Result<Vec<StoredProgram>, ApiError> {
        self.query(ProgramFilter::All).await
    }

    /// One program by uid. A malformed uid and an empty result both surface
    /// as not found.
    pub async fn get_program(&self, raw_uid: &str) -> Result<StoredProgram, ApiError> {
        let uid = ProgramUid::parse(raw_uid).map_err(ApiError::query)?;
        self.query(ProgramFilter::ByUid(uid))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(raw_uid.to_string()))
    }

    /// Up to `page_size` programs following `raw_after` in store order. The
    /// cursor record itself is never included.
    pub async fn get_programs_page(&self, raw_after: &str) -> Result<Vec<StoredProgram>, ApiError> {
        let after = ProgramUid::parse(raw_after).map_err(ApiError::query)?;
        self.query(ProgramFilter::Page {
            after,
            first: self.page_size,
        })
        .await
    }

    async fn query(&self, filter: ProgramFilter) -> Result<Vec<StoredProgram>, ApiError> {
        let store = Arc::clone(&self.store);
        let block = filter.block_name();
        let programs = run_blocking(move || store.query(&filter), ApiError::query).await?;
        tracing::debug!(block, count = programs.len(), "queried programs");
        Ok(programs)
    }
}

/// Runs a store call on the blocking pool, mapping failures with `on_err`.
async fn run_blocking<T, F>(f: F, on_err: fn(StorageError) -> ApiError) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, StorageError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => result.map_err(on_err),
        Err(e) => Err(on_err(StorageError::Connection(format!(
            "storage task failed: {}",
            e
        )))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playground_storage::InMemoryStore;

    fn service(page_size: usize) -> ProgramService {
        ProgramService::new(Arc::new(InMemoryStore::new()), page_size)
    }

    #[tokio::test]
    async fn save_then_get_round_trips_code() {
        let svc = service(2);
        let saved = svc.save_program(vec!["print(1)".to_string()]).await.unwrap();

        let fetched = svc.get_program(&saved.uid.to_string()).await.unwrap();
        assert_eq!(fetched.code, vec!["print(1)".to_string()]);
        assert_eq!(fetched.uid, saved.uid);
    }

    #[tokio::test]
    async fn unknown_uid_is_not_found() {
        let svc = service(2);
        assert!(matches!(
            svc.get_program("0xdead").await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            svc.get_program("not-a-uid").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn page_respects_size_and_skips_cursor() {
        let svc = service(2);
        let mut uids = Vec::new();
        for i in 0..5 {
            let saved = svc.save_program(vec![format!("print({i})")]).await.unwrap();
            uids.push(saved.uid);
        }

        let page = svc.get_programs_page(&uids[0].to_string()).await.unwrap();
        let got: Vec<_> = page.iter().map(|p| p.uid).collect();
        assert_eq!(got, vec![uids[1], uids[2]]);

        let tail = svc.get_programs_page(&uids[4].to_string()).await.unwrap();
        assert!(tail.is_empty());
    }

    #[tokio::test]
    async fn list_returns_everything() {
        let svc = service(2);
        for i in 0..3 {
            svc.save_program(vec![format!("x = {i}")]).await.unwrap();
        }
        assert_eq!(svc.get_all_programs().await.unwrap().len(), 3);
        assert_eq!(svc.backend_name(), "memory");
    }
}
