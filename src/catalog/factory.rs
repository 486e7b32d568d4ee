use std::sync::Arc;
use crate::catalog::domain::CatalogService;
use crate::catalog::domain::service::CatalogServiceImpl;
use crate::core::domain::Configuration;
use crate::core::repository::{LibraryStore, RepositoryStore};
use crate::gateway::factory::create_publisher;

pub async fn create_catalog_service(config: &Configuration, store_kind: RepositoryStore,
                                    store: Arc<dyn LibraryStore>) -> Box<dyn CatalogService> {
    let publisher = create_publisher(store_kind.gateway_publisher()).await;
    Box::new(CatalogServiceImpl::new(config, store, publisher))
}
