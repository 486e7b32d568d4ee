use async_trait::async_trait;
use std::collections::HashMap;
use std::env;
use serde::{Deserialize, Serialize};
use crate::books::domain::model::BookEntity;
use crate::checkout::domain::model::CheckoutEntity;
use crate::circulation::domain::batch::CirculationBatch;
use crate::core::library::LibraryResult;
use crate::gateway::GatewayPublisherVia;
use crate::hold::domain::model::HoldEntity;
use crate::patrons::domain::model::PatronEntity;

// LibraryStore is the persistent store behind the catalog and the circulation
// ledger. Reads are individual calls; every write made by a patron action goes
// through `commit` so that it is applied as one atomic unit.
#[async_trait]
pub trait LibraryStore: Sync + Send {
    // adds a book and returns it with its assigned id
    async fn add_book(&self, book: &BookEntity) -> LibraryResult<BookEntity>;

    // adds a patron and returns it with its assigned id (>= PATRON_MIN_ID)
    async fn add_patron(&self, patron: &PatronEntity) -> LibraryResult<PatronEntity>;

    async fn find_book(&self, book_id: i64) -> LibraryResult<BookEntity>;

    async fn find_patron(&self, patron_id: i64) -> LibraryResult<PatronEntity>;

    // exact match on each column of the predicate, all books when empty
    async fn query_books(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>>;

    async fn find_hold(&self, book_id: i64, patron_id: i64) -> LibraryResult<Option<HoldEntity>>;

    async fn find_checkout(&self, book_id: i64, patron_id: i64) -> LibraryResult<Option<CheckoutEntity>>;

    async fn hold_exists(&self, book_id: i64, patron_id: i64) -> LibraryResult<bool> {
        Ok(self.find_hold(book_id, patron_id).await?.is_some())
    }

    async fn checkout_exists(&self, book_id: i64, patron_id: i64) -> LibraryResult<bool> {
        Ok(self.find_checkout(book_id, patron_id).await?.is_some())
    }

    async fn count_holds_for_book(&self, book_id: i64) -> LibraryResult<usize>;

    async fn count_checkouts_for_book(&self, book_id: i64) -> LibraryResult<usize>;

    async fn holds_for_patron(&self, patron_id: i64) -> LibraryResult<Vec<HoldEntity>>;

    async fn checkouts_for_patron(&self, patron_id: i64) -> LibraryResult<Vec<CheckoutEntity>>;

    // applies all mutations of the batch or none of them
    async fn commit(&self, batch: &CirculationBatch) -> LibraryResult<()>;
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone, Copy)]
pub enum RepositoryStore {
    Memory,
    DynamoDB,
    LocalDynamoDB,
}

impl RepositoryStore {
    pub fn gateway_publisher(&self) -> GatewayPublisherVia {
        match self {
            RepositoryStore::Memory => { GatewayPublisherVia::Logs }
            RepositoryStore::DynamoDB => { GatewayPublisherVia::Sns }
            RepositoryStore::LocalDynamoDB => { GatewayPublisherVia::LocalDynamoDB }
        }
    }

    // reads LMS_STORE, defaulting to the in-memory store
    pub fn from_env() -> RepositoryStore {
        RepositoryStore::from(env::var("LMS_STORE").unwrap_or_default())
    }
}

impl From<String> for RepositoryStore {
    fn from(s: String) -> Self {
        match s.to_lowercase().as_str() {
            "dynamodb" => RepositoryStore::DynamoDB,
            "local" | "localdynamodb" => RepositoryStore::LocalDynamoDB,
            _ => RepositoryStore::Memory,
        }
    }
}
