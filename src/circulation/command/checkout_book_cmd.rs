use async_trait::async_trait;
use crate::circulation::command::respond;
use crate::circulation::domain::CirculationService;
use crate::circulation::dto::{CirculationAction, CirculationRequest, CirculationResponse};
use crate::core::command::{Command, CommandError};

pub struct CheckoutBookCommand {
    circulation_service: Box<dyn CirculationService>,
}

impl CheckoutBookCommand {
    pub fn new(circulation_service: Box<dyn CirculationService>) -> Self {
        Self {
            circulation_service,
        }
    }
}

#[async_trait]
impl Command<CirculationRequest, CirculationResponse> for CheckoutBookCommand {
    async fn execute(&self, req: CirculationRequest) -> Result<CirculationResponse, CommandError> {
        let res = match req.ids() {
            Ok((patron_id, book_id)) => self.circulation_service.check_out(patron_id, book_id).await,
            Err(err) => Err(err),
        };
        respond(CirculationAction::CheckOut, &req, res)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::books::domain::model::BookEntity;
    use crate::circulation::command::checkout_book_cmd::CheckoutBookCommand;
    use crate::circulation::domain::locks::PatronLocks;
    use crate::circulation::dto::{CirculationRequest, Outcome};
    use crate::circulation::factory::{create_circulation_service, create_library_store};
    use crate::core::command::Command;
    use crate::core::domain::Configuration;
    use crate::core::repository::{LibraryStore, RepositoryStore};
    use crate::patrons::domain::model::PatronEntity;

    lazy_static! {
        static ref STORE: AsyncOnce<Arc<dyn LibraryStore>> = AsyncOnce::new(async {
                create_library_store(RepositoryStore::Memory).await
            });
        static ref SUT_CMD: AsyncOnce<CheckoutBookCommand> = AsyncOnce::new(async {
                let svc = create_circulation_service(&Configuration::new("test"), RepositoryStore::Memory,
                                                     STORE.get().await.clone(), Arc::new(PatronLocks::new())).await;
                CheckoutBookCommand::new(svc)
            });
    }

    #[tokio::test]
    async fn test_should_run_checkout_book() {
        let store = STORE.get().await.clone();
        let cmd = SUT_CMD.get().await;
        let book = store.add_book(&BookEntity::new("Dune", "Frank Herbert", "Science Fiction")).await.expect("should add book");
        let owner = store.add_patron(&PatronEntity::new("Ada", "Lovelace")).await.expect("should add patron");
        let other = store.add_patron(&PatronEntity::new("Grace", "Hopper")).await.expect("should add patron");

        let res = cmd.execute(CirculationRequest::new(owner.patron_id.to_string().as_str(), book.book_id.to_string().as_str()))
            .await.expect("should check out");
        assert_eq!(Outcome::Success, res.outcome);
        assert!(res.receipt.as_ref().and_then(|r| r.due_at.clone()).is_some());

        let res = cmd.execute(CirculationRequest::new(owner.patron_id.to_string().as_str(), book.book_id.to_string().as_str()))
            .await.expect("should respond");
        assert_eq!(Outcome::AlreadyCheckedOut, res.outcome);

        let res = cmd.execute(CirculationRequest::new(other.patron_id.to_string().as_str(), book.book_id.to_string().as_str()))
            .await.expect("should respond");
        assert_eq!(Outcome::Unavailable, res.outcome);
        assert!(res.summary.contains("checked out to another patron"));
    }
}
