//! Async CRUD contract and its in-memory implementation.

use super::error::StoreError;
use super::record::{Latency, Record};
use chrono::Utc;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Asynchronous CRUD over one record type.
///
/// Reads return copies; mutating the result never touches stored state.
pub trait RecordStore<R: Record>: Clone + Send + Sync + 'static {
    fn get_all(&self) -> impl Future<Output = Result<Vec<R>, StoreError>> + Send;

    fn get_by_id(&self, id: &str) -> impl Future<Output = Result<R, StoreError>> + Send;

    fn create(&self, draft: R::Draft) -> impl Future<Output = Result<R, StoreError>> + Send;

    fn update(
        &self,
        id: &str,
        update: R::Update,
    ) -> impl Future<Output = Result<R, StoreError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<R, StoreError>> + Send;
}

enum Seed<R> {
    Fixture,
    Records(Vec<R>),
}

/// Process-lifetime store seeded on first access.
#[derive(Clone)]
pub struct InMemoryStore<R: Record> {
    records: Arc<RwLock<Option<Vec<R>>>>,
    seed: Arc<Seed<R>>,
    latency: Latency,
}

impl<R: Record> InMemoryStore<R> {
    /// Seeds from the bundled fixture for `R`.
    pub fn seeded(latency: Latency) -> Self {
        Self {
            records: Arc::new(RwLock::new(None)),
            seed: Arc::new(Seed::Fixture),
            latency,
        }
    }

    pub fn with_records(records: Vec<R>, latency: Latency) -> Self {
        Self {
            records: Arc::new(RwLock::new(None)),
            seed: Arc::new(Seed::Records(records)),
            latency,
        }
    }

    pub fn empty() -> Self {
        Self::with_records(Vec::new(), Latency::none())
    }

    async fn pause(&self, duration: std::time::Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    fn load_seed(&self) -> Result<Vec<R>, StoreError> {
        match self.seed.as_ref() {
            Seed::Records(records) => Ok(records.clone()),
            Seed::Fixture => {
                serde_json::from_str(R::KIND.fixture()).map_err(|e| StoreError::Fixture {
                    kind: R::KIND,
                    message: e.to_string(),
                })
            }
        }
    }

    /// Runs `f` against the record list, seeding it first if needed.
    fn with_data<T>(&self, f: impl FnOnce(&mut Vec<R>) -> T) -> Result<T, StoreError> {
        let mut guard = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if guard.is_none() {
            let seeded = self.load_seed()?;
            log::debug!(
                target: "dropzone::store",
                "seeded {} store with {} record(s)",
                R::KIND,
                seeded.len()
            );
            *guard = Some(seeded);
        }
        Ok(f(guard.get_or_insert_with(Vec::new)))
    }
}

/// Millisecond timestamp id, bumped past any id already in use.
fn next_id<R: Record>(data: &[R]) -> String {
    let mut candidate = Utc::now().timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !data.iter().any(|r| r.id() == id) {
            return id;
        }
        candidate += 1;
    }
}

impl<R: Record> RecordStore<R> for InMemoryStore<R> {
    async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        self.pause(self.latency.get_all).await;
        self.with_data(|data| data.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<R, StoreError> {
        self.pause(self.latency.get_by_id).await;
        self.with_data(|data| data.iter().find(|r| r.id() == id).cloned())?
            .ok_or(StoreError::NotFound(R::KIND))
    }

    async fn create(&self, draft: R::Draft) -> Result<R, StoreError> {
        self.pause(self.latency.create).await;
        let record = self.with_data(|data| {
            let record = R::from_draft(next_id(data), draft, Utc::now());
            data.push(record.clone());
            record
        })?;
        log::debug!(target: "dropzone::store", "created {} {}", R::KIND, record.id());
        Ok(record)
    }

    async fn update(&self, id: &str, update: R::Update) -> Result<R, StoreError> {
        self.pause(self.latency.update).await;
        self.with_data(|data| {
            data.iter_mut().find(|r| r.id() == id).map(|record| {
                record.apply(update);
                record.clone()
            })
        })?
        .ok_or(StoreError::NotFound(R::KIND))
    }

    async fn delete(&self, id: &str) -> Result<R, StoreError> {
        self.pause(self.latency.delete).await;
        self.with_data(|data| {
            data.iter()
                .position(|r| r.id() == id)
                .map(|index| data.remove(index))
        })?
        .ok_or(StoreError::NotFound(R::KIND))
    }
}
