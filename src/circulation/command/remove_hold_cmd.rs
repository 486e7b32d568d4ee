use async_trait::async_trait;
use crate::circulation::command::respond;
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::{CirculationAction, CirculationRequest, CirculationResponse};
use crate::core::command::{Command, CommandError};

pub struct RemoveHoldCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl RemoveHoldCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[async_trait]
impl Command<CirculationRequest, CirculationResponse> for RemoveHoldCommand {
    async fn execute(&self, req: CirculationRequest) -> Result<CirculationResponse, CommandError> {
        let res = match req.ids() {
            Ok((patron_id, book_id)) => self.circulation_service.remove_hold(patron_id, book_id).await,
            Err(err) => Err(err),
        };
        respond(CirculationAction::RemoveHold, &req, res)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::books::domain::model::BookEntity;
    use crate::circulation::domain::locks::PatronLocks;
    use crate::circulation::dto::{CirculationAction, CirculationRequest, Outcome};
    use crate::circulation::factory::{create_circulation_service, create_library_store};
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::patrons::domain::model::PatronEntity;

    #[tokio::test]
    async fn test_should_run_remove_hold() {
        let config = Configuration::new("test");
        let store = create_library_store(RepositoryStore::Memory).await;
        let locks = Arc::new(PatronLocks::new());
        let book = store.add_book(&BookEntity::new("Dune", "Frank Herbert", "Science Fiction")).await.expect("should add book");
        let patron = store.add_patron(&PatronEntity::new("Ada", "Lovelace")).await.expect("should add patron");
        let req = CirculationRequest::new(patron.patron_id.to_string().as_str(), book.book_id.to_string().as_str());

        let svc = create_circulation_service(&config, RepositoryStore::Memory, store.clone(), locks.clone()).await;
        let res = CirculationAction::RemoveHold.dispatch(svc, req.clone()).await.expect("should respond");
        assert_eq!(Outcome::NotHeld, res.outcome);

        let svc = create_circulation_service(&config, RepositoryStore::Memory, store.clone(), locks.clone()).await;
        let _ = CirculationAction::PlaceHold.dispatch(svc, req.clone()).await.expect("should place hold");
        let svc = create_circulation_service(&config, RepositoryStore::Memory, store.clone(), locks.clone()).await;
        let res = CirculationAction::RemoveHold.dispatch(svc, req).await.expect("should remove hold");
        assert_eq!(Outcome::Success, res.outcome);
        assert_eq!(Some(0), res.receipt.map(|r| r.num_holds));
    }
}
