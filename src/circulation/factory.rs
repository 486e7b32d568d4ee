use std::sync::Arc;
use crate::catalog::factory::create_catalog_service;
use crate::circulation::domain::CirculationService;
use crate::circulation::domain::ledger::CirculationLedgerImpl;
use crate::circulation::domain::locks::PatronLocks;
use crate::circulation::domain::service::CirculationServiceImpl;
use crate::circulation::repository::ddb_library_store::{BOOKS_TABLE, CHECKOUTS_TABLE, COUNTERS_TABLE, DDBLibraryStore, HOLDS_TABLE, PATRONS_TABLE};
use crate::circulation::repository::memory_library_store::MemoryLibraryStore;
use crate::core::domain::Configuration;
use crate::core::repository::{LibraryStore, RepositoryStore};
use crate::gateway::factory::create_publisher;
use crate::utils::ddb::{build_db_client, create_numeric_table, create_table};

pub async fn create_library_store(store: RepositoryStore) -> Arc<dyn LibraryStore> {
    match store {
        RepositoryStore::Memory => {
            Arc::new(MemoryLibraryStore::new())
        }
        RepositoryStore::DynamoDB => {
            let client = build_db_client(store).await;
            Arc::new(DDBLibraryStore::new(client))
        }
        RepositoryStore::LocalDynamoDB => {
            let client = build_db_client(store).await;
            // tables may already exist from an earlier run
            let _ = create_numeric_table(&client, BOOKS_TABLE, "book_id").await;
            let _ = create_numeric_table(&client, PATRONS_TABLE, "patron_id").await;
            let _ = create_table(&client, HOLDS_TABLE, "pair_key").await;
            let _ = create_table(&client, CHECKOUTS_TABLE, "pair_key").await;
            let _ = create_table(&client, COUNTERS_TABLE, "counter_name").await;
            let _ = create_table(&client, "events", "event_id").await;
            Arc::new(DDBLibraryStore::new(client))
        }
    }
}

pub async fn create_circulation_service(config: &Configuration, store_kind: RepositoryStore,
                                        store: Arc<dyn LibraryStore>, locks: Arc<PatronLocks>) -> Box<dyn CirculationService> {
    let catalog_svc = create_catalog_service(config, store_kind, store.clone()).await;
    let ledger = CirculationLedgerImpl::new(config, store.clone(), catalog_svc);
    let publisher = create_publisher(store_kind.gateway_publisher()).await;
    Box::new(CirculationServiceImpl::new(config, store, Box::new(ledger), locks, publisher))
}
