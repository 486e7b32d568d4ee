use std::sync::Arc;
use crate::core::domain::Configuration;
use crate::core::repository::{LibraryStore, RepositoryStore};
use crate::gateway::factory::create_publisher;
use crate::patrons::domain::PatronService;
use crate::patrons::domain::service::PatronServiceImpl;

pub async fn create_patron_service(config: &Configuration, store_kind: RepositoryStore,
                                   store: Arc<dyn LibraryStore>) -> Box<dyn PatronService> {
    let publisher = create_publisher(store_kind.gateway_publisher()).await;
    Box::new(PatronServiceImpl::new(config, store, publisher))
}
