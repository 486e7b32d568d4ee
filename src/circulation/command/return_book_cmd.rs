use async_trait::async_trait;
use crate::circulation::command::respond;
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::{CirculationAction, CirculationRequest, CirculationResponse};
use crate::core::command::{Command, CommandError};

pub struct ReturnBookCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl ReturnBookCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[async_trait]
impl Command<CirculationRequest, CirculationResponse> for ReturnBookCommand {
    async fn execute(&self, req: CirculationRequest) -> Result<CirculationResponse, CommandError> {
        let res = match req.ids() {
            Ok((patron_id, book_id)) => self.circulation_service.return_book(patron_id, book_id).await,
            Err(err) => Err(err),
        };
        respond(CirculationAction::Return, &req, res)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::books::domain::model::BookEntity;
    use crate::circulation::command::return_book_cmd::ReturnBookCommand;
    use crate::circulation::domain::locks::PatronLocks;
    use crate::circulation::dto::{CirculationAction, CirculationRequest, Outcome};
    use crate::circulation::factory::{create_circulation_service, create_library_store};
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::patrons::domain::model::PatronEntity;

    #[tokio::test]
    async fn test_should_run_return_book() {
        let config = Configuration::new("test");
        let store = create_library_store(RepositoryStore::Memory).await;
        let locks = Arc::new(PatronLocks::new());
        let book = store.add_book(&BookEntity::new("Dune", "Frank Herbert", "Science Fiction")).await.expect("should add book");
        let patron = store.add_patron(&PatronEntity::new("Ada", "Lovelace")).await.expect("should add patron");
        let req = CirculationRequest::new(patron.patron_id.to_string().as_str(), book.book_id.to_string().as_str());

        let cmd = ReturnBookCommand::new(create_circulation_service(
            &config, RepositoryStore::Memory, store.clone(), locks.clone()).await);
        let res = cmd.execute(req.clone()).await.expect("should respond");
        assert_eq!(Outcome::NotCheckedOut, res.outcome);

        let svc = create_circulation_service(&config, RepositoryStore::Memory, store.clone(), locks.clone()).await;
        let _ = CirculationAction::CheckOut.dispatch(svc, req.clone()).await.expect("should check out");
        let res = cmd.execute(req).await.expect("should return");
        assert_eq!(Outcome::Success, res.outcome);
        assert!(!store.find_book(book.book_id).await.expect("should find book").checked_out);
    }
}
