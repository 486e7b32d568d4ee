use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;
use crate::books::domain::model::BookEntity;
use crate::catalog::domain::CatalogService;
use crate::checkout::domain::model::CheckoutEntity;
use crate::circulation::domain::batch::CirculationBatch;
use crate::circulation::domain::CirculationLedger;
use crate::core::domain::Configuration;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::LibraryStore;
use crate::hold::domain::model::HoldEntity;
use crate::patrons::domain::model::PatronEntity;
use crate::utils::date::DISPLAY_DATE_FMT;

pub struct CirculationLedgerImpl {
    book_loan_days: i64,
    store: Arc<dyn LibraryStore>,
    catalog_service: Box<dyn CatalogService>,
}

impl CirculationLedgerImpl {
    pub fn new(config: &Configuration, store: Arc<dyn LibraryStore>,
               catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            book_loan_days: config.book_loan_days,
            store,
            catalog_service,
        }
    }

    // Stages the removal of a hold and returns true when it is the last hold
    // on the book, in which case the on_hold flag is cleared as well.
    async fn release_hold(&self, batch: &mut CirculationBatch, patron: &PatronEntity,
                          book: &BookEntity, hold: HoldEntity) -> LibraryResult<bool> {
        batch.delete_hold(hold);
        batch.patron_counters(patron).num_holds -= 1;
        if self.catalog_service.has_any_hold(book.book_id, batch).await? {
            return Ok(false);
        }
        self.catalog_service.mark_on_hold(batch, book, false);
        Ok(true)
    }
}

fn log_last_hold_removed(book: &BookEntity) {
    info!(book_id = book.book_id, "librarian log {}: no more holds on {} (ID: {})",
          chrono::Utc::now().format(DISPLAY_DATE_FMT), book.title, book.book_id);
}

#[async_trait]
impl CirculationLedger for CirculationLedgerImpl {
    async fn place_hold(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<HoldEntity> {
        if self.store.hold_exists(book.book_id, patron.patron_id).await? {
            return Err(LibraryError::already_held(
                format!("you have already placed {} (ID: {}) on hold", book.title, book.book_id).as_str()));
        }
        let hold = HoldEntity::new(book.book_id, patron.patron_id);
        let mut batch = CirculationBatch::new();
        batch.insert_hold(hold.clone());
        batch.patron_counters(patron).num_holds += 1;
        self.catalog_service.mark_on_hold(&mut batch, book, true);
        self.store.commit(&batch).await?;
        Ok(hold)
    }

    async fn remove_hold(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<HoldEntity> {
        let hold = self.store.find_hold(book.book_id, patron.patron_id).await?.ok_or_else(||
            LibraryError::not_held(
                format!("you have not placed a hold on {} (ID: {})", book.title, book.book_id).as_str()))?;
        let mut batch = CirculationBatch::new();
        let last_hold = self.release_hold(&mut batch, patron, book, hold.clone()).await?;
        self.store.commit(&batch).await?;
        if last_hold {
            log_last_hold_removed(book);
        }
        Ok(hold)
    }

    async fn check_out(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<(CheckoutEntity, Option<HoldEntity>)> {
        if self.store.checkout_exists(book.book_id, patron.patron_id).await? {
            return Err(LibraryError::already_checked_out(
                format!("you've already checked out {} (ID: {})", book.title, book.book_id).as_str()));
        }
        if !self.catalog_service.is_available(book) {
            return Err(LibraryError::unavailable(
                format!("unable to check out {} (ID: {}) because it is checked out to another patron",
                        book.title, book.book_id).as_str()));
        }
        let mut batch = CirculationBatch::new();
        let mut released = None;
        let mut last_hold = false;
        if let Some(hold) = self.store.find_hold(book.book_id, patron.patron_id).await? {
            last_hold = self.release_hold(&mut batch, patron, book, hold.clone()).await?;
            released = Some(hold);
        }
        let checkout = CheckoutEntity::new(book.book_id, patron.patron_id, self.book_loan_days);
        batch.insert_checkout(checkout.clone());
        batch.patron_counters(patron).num_books_out += 1;
        self.catalog_service.mark_checked_out(&mut batch, book, true);
        self.store.commit(&batch).await?;
        if released.is_some() {
            info!(book_id = book.book_id, patron_id = patron.patron_id,
                  "removing {} (ID: {}) from the holds of patron {} on checkout", book.title, book.book_id, patron.patron_id);
        }
        if last_hold {
            log_last_hold_removed(book);
        }
        Ok((checkout, released))
    }

    async fn return_book(&self, patron: &PatronEntity, book: &BookEntity) -> LibraryResult<CheckoutEntity> {
        let checkout = self.store.find_checkout(book.book_id, patron.patron_id).await?.ok_or_else(||
            LibraryError::not_checked_out(
                format!("you have not checked out {} (ID: {})", book.title, book.book_id).as_str()))?;
        let mut batch = CirculationBatch::new();
        batch.delete_checkout(checkout.clone());
        batch.patron_counters(patron).num_books_out -= 1;
        self.catalog_service.mark_checked_out(&mut batch, book, false);
        self.store.commit(&batch).await?;
        Ok(checkout)
    }
}
