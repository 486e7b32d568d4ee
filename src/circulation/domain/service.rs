use std::sync::Arc;
use async_trait::async_trait;
use tracing::{debug, warn};
use crate::circulation::domain::{CirculationLedger, CirculationService};
use crate::circulation::domain::locks::{PatronGuard, PatronLocks};
use crate::circulation::dto::{CirculationAction, CirculationReceiptDto};
use crate::core::domain::Configuration;
use crate::core::events::{DomainEvent, DomainEventType};
use crate::core::library::{LibraryError, LibraryResult, Quota};
use crate::core::repository::LibraryStore;
use crate::gateway::events::EventPublisher;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::Patron;

pub struct CirculationServiceImpl {
    config: Configuration,
    store: Arc<dyn LibraryStore>,
    ledger: Box<dyn CirculationLedger>,
    locks: Arc<PatronLocks>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CirculationServiceImpl {
    pub fn new(config: &Configuration, store: Arc<dyn LibraryStore>, ledger: Box<dyn CirculationLedger>,
               locks: Arc<PatronLocks>, events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            config: config.clone(),
            store,
            ledger,
            locks,
            events_publisher,
        }
    }

    // Unknown patrons are refused before a lock entry is created. The patron is
    // read again under the lock so the quota gate sees committed counters.
    async fn lock_patron(&self, patron_id: i64) -> LibraryResult<(PatronGuard, PatronEntity)> {
        let _ = self.store.find_patron(patron_id).await?;
        let guard = self.locks.lock(patron_id).await;
        let patron = self.store.find_patron(patron_id).await?;
        Ok((guard, patron))
    }

    // the action is already committed, so a failed publish is only logged
    async fn publish(&self, kind: DomainEventType, receipt: &CirculationReceiptDto) {
        match DomainEvent::for_pair(kind, receipt.book_id, receipt.patron_id, receipt) {
            Ok(event) => {
                if let Err(err) = self.events_publisher.publish(&event).await {
                    warn!(book_id = receipt.book_id, patron_id = receipt.patron_id,
                          "failed to publish {} event: {}", event.name, err);
                }
            }
            Err(err) => {
                warn!(book_id = receipt.book_id, patron_id = receipt.patron_id,
                      "failed to build {} event: {}", kind, err);
            }
        }
    }
}

#[async_trait]
impl CirculationService for CirculationServiceImpl {
    async fn place_hold(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto> {
        let (_guard, patron) = self.lock_patron(patron_id).await?;
        if patron.has_reached_hold_quota(&self.config) {
            return Err(LibraryError::quota_exceeded(
                format!("you have already placed {} books on hold, remove one or more holds first",
                        patron.num_holds).as_str(), Quota::Holds));
        }
        let book = self.store.find_book(book_id).await?;
        let _ = self.ledger.place_hold(&patron, &book).await?;
        let receipt = CirculationReceiptDto::new(CirculationAction::PlaceHold, &patron, &book)
            .with_counters(patron.num_holds + 1, patron.num_books_out);
        debug!(book_id, patron_id, "{}", receipt.summary());
        self.publish(DomainEventType::HoldPlaced, &receipt).await;
        Ok(receipt)
    }

    async fn remove_hold(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto> {
        let (_guard, patron) = self.lock_patron(patron_id).await?;
        let book = self.store.find_book(book_id).await?;
        let _ = self.ledger.remove_hold(&patron, &book).await?;
        let receipt = CirculationReceiptDto::new(CirculationAction::RemoveHold, &patron, &book)
            .with_counters(patron.num_holds - 1, patron.num_books_out);
        debug!(book_id, patron_id, "{}", receipt.summary());
        self.publish(DomainEventType::HoldRemoved, &receipt).await;
        Ok(receipt)
    }

    async fn check_out(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto> {
        let (_guard, patron) = self.lock_patron(patron_id).await?;
        if patron.has_reached_checkout_quota(&self.config) {
            return Err(LibraryError::quota_exceeded(
                format!("you have already checked out {} books, return at least one first",
                        patron.num_books_out).as_str(), Quota::BooksOut));
        }
        let book = self.store.find_book(book_id).await?;
        let (checkout, released) = self.ledger.check_out(&patron, &book).await?;
        let num_holds = if released.is_some() { patron.num_holds - 1 } else { patron.num_holds };
        let receipt = CirculationReceiptDto::new(CirculationAction::CheckOut, &patron, &book)
            .with_counters(num_holds, patron.num_books_out + 1)
            .with_checkout(&checkout, released.is_some());
        debug!(book_id, patron_id, "{}", receipt.summary());
        if released.is_some() {
            self.publish(DomainEventType::HoldRemoved, &receipt).await;
        }
        self.publish(DomainEventType::BookCheckedOut, &receipt).await;
        Ok(receipt)
    }

    async fn return_book(&self, patron_id: i64, book_id: i64) -> LibraryResult<CirculationReceiptDto> {
        let (_guard, patron) = self.lock_patron(patron_id).await?;
        let book = self.store.find_book(book_id).await?;
        let _ = self.ledger.return_book(&patron, &book).await?;
        let receipt = CirculationReceiptDto::new(CirculationAction::Return, &patron, &book)
            .with_counters(patron.num_holds, patron.num_books_out - 1);
        debug!(book_id, patron_id, "{}", receipt.summary());
        self.publish(DomainEventType::BookReturned, &receipt).await;
        Ok(receipt)
    }
}
