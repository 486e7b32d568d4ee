use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::checkout::domain::model::CheckoutEntity;
use crate::circulation::dto::CirculationReceiptDto;
use crate::core::library::LibraryResult;
use crate::hold::domain::model::HoldEntity;
use crate::patrons::domain::model::PatronEntity;

pub mod batch;
pub mod ledger;
pub mod locks;
pub mod service;

// CirculationLedger applies the hold and checkout state machine for one
// (book, patron) pair. It does not look at quotas: callers check the patron's
// counters before invoking it.
#[async_trait]
pub trait CirculationLedger: Sync + Send {
    async fn place_hold(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<HoldEntity>;
    async fn remove_hold(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<HoldEntity>;
    // the returned hold is the one released because the patron checked out a book they held
    async fn check_out(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<(CheckoutEntity, Option<HoldEntity>)>;
    async fn return_book(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<CheckoutEntity>;
}

// CirculationService is what the command layer talks to: it resolves ids,
// applies the quota gates and runs the ledger under the patron's lock.
#[async_trait]
pub trait CirculationService: Sync + Send {
    async fn place_hold(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto>;
    async fn remove_hold(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto>;
    async fn check_out(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto>;
    async fn return_book(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto>;
}
