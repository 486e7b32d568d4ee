use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::Utc;
use crate::books::domain::model::BookEntity;
use crate::checkout::domain::model::CheckoutEntity;
use crate::circulation::domain::batch::{CirculationBatch, Mutation};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::LibraryStore;
use crate::hold::domain::model::HoldEntity;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::PATRON_MIN_ID;

type PairKey = (i64, i64);

#[derive(Debug, Default)]
struct LibraryTables {
    books: BTreeMap<i64, BookEntity>,
    patrons: BTreeMap<i64, PatronEntity>,
    holds: HashMap<PairKey, HoldEntity>,
    checkouts: HashMap<PairKey, CheckoutEntity>,
    last_book_id: i64,
    last_patron_id: i64,
}

// MemoryLibraryStore keeps every table behind a single mutex so that a batch
// is validated and applied without interleaving with another commit.
#[derive(Debug)]
pub struct MemoryLibraryStore {
    tables: Mutex<LibraryTables>,
}

impl MemoryLibraryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(LibraryTables {
                last_patron_id: PATRON_MIN_ID - 1,
                ..LibraryTables::default()
            }),
        }
    }

    fn tables(&self) -> MutexGuard<'_, LibraryTables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MemoryLibraryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LibraryStore for MemoryLibraryStore {
    async fn add_book(&self, book: &BookEntity) -> LibraryResult<BookEntity> {
        let mut tables = self.tables();
        tables.last_book_id += 1;
        let mut saved = book.clone();
        saved.book_id = tables.last_book_id;
        saved.version = 0;
        tables.books.insert(saved.book_id, saved.clone());
        Ok(saved)
    }

    async fn add_patron(&self, patron: &PatronEntity) -> LibraryResult<PatronEntity> {
        let mut tables = self.tables();
        tables.last_patron_id += 1;
        let mut saved = patron.clone();
        saved.patron_id = tables.last_patron_id;
        saved.version = 0;
        tables.patrons.insert(saved.patron_id, saved.clone());
        Ok(saved)
    }

    async fn find_book(&self, book_id: i64) -> LibraryResult<BookEntity> {
        self.tables().books.get(&book_id).cloned().ok_or_else(||
            LibraryError::not_found(format!("book not found for {}", book_id).as_str()))
    }

    async fn find_patron(&self, patron_id: i64) -> LibraryResult<PatronEntity> {
        self.tables().patrons.get(&patron_id).cloned().ok_or_else(||
            LibraryError::not_found(format!("patron not found for {}", patron_id).as_str()))
    }

    async fn query_books(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>> {
        let tables = self.tables();
        let mut books = vec![];
        for book in tables.books.values() {
            if book.matches(predicate)? {
                books.push(book.clone());
            }
        }
        Ok(books)
    }

    async fn find_hold(&self, book_id: i64, patron_id: i64) -> LibraryResult<Option<HoldEntity>> {
        Ok(self.tables().holds.get(&(book_id, patron_id)).cloned())
    }

    async fn find_checkout(&self, book_id: i64, patron_id: i64) -> LibraryResult<Option<CheckoutEntity>> {
        Ok(self.tables().checkouts.get(&(book_id, patron_id)).cloned())
    }

    async fn count_holds_for_book(&self, book_id: i64) -> LibraryResult<usize> {
        Ok(self.tables().holds.keys().filter(|(b, _)| *b == book_id).count())
    }

    async fn count_checkouts_for_book(&self, book_id: i64) -> LibraryResult<usize> {
        Ok(self.tables().checkouts.keys().filter(|(b, _)| *b == book_id).count())
    }

    async fn holds_for_patron(&self, patron_id: i64) -> LibraryResult<Vec<HoldEntity>> {
        Ok(self.tables().holds.values().filter(|h| h.patron_id == patron_id).cloned().collect())
    }

    async fn checkouts_for_patron(&self, patron_id: i64) -> LibraryResult<Vec<CheckoutEntity>> {
        Ok(self.tables().checkouts.values().filter(|c| c.patron_id == patron_id).cloned().collect())
    }

    async fn commit(&self, batch: &CirculationBatch) -> LibraryResult<()> {
        let mutations = batch.mutations();
        let mut tables = self.tables();
        validate(&tables, &mutations)?;
        apply(&mut tables, mutations);
        Ok(())
    }
}

// Checks every mutation against the current tables, tracking the records the
// batch itself inserts or deletes. Nothing is written until all of them pass.
fn validate(tables: &LibraryTables, mutations: &[Mutation]) -> LibraryResult<()> {
    let mut holds: HashMap<PairKey, Option<String>> = HashMap::new();
    let mut checkouts: HashMap<PairKey, Option<String>> = HashMap::new();
    for mutation in mutations {
        match mutation {
            Mutation::InsertHold(hold) => {
                let key = (hold.book_id, hold.patron_id);
                let existing = holds.get(&key).cloned()
                    .unwrap_or_else(|| tables.holds.get(&key).map(|h| h.hold_id.to_string()));
                if existing.is_some() {
                    return Err(conflict("hold", key, "already exists"));
                }
                holds.insert(key, Some(hold.hold_id.to_string()));
            }
            Mutation::DeleteHold(hold) => {
                let key = (hold.book_id, hold.patron_id);
                let existing = holds.get(&key).cloned()
                    .unwrap_or_else(|| tables.holds.get(&key).map(|h| h.hold_id.to_string()));
                if existing.as_deref() != Some(hold.hold_id.as_str()) {
                    return Err(conflict("hold", key, "no longer exists"));
                }
                holds.insert(key, None);
            }
            Mutation::InsertCheckout(checkout) => {
                let key = (checkout.book_id, checkout.patron_id);
                let existing = checkouts.get(&key).cloned()
                    .unwrap_or_else(|| tables.checkouts.get(&key).map(|c| c.checkout_id.to_string()));
                if existing.is_some() {
                    return Err(conflict("checkout", key, "already exists"));
                }
                checkouts.insert(key, Some(checkout.checkout_id.to_string()));
            }
            Mutation::DeleteCheckout(checkout) => {
                let key = (checkout.book_id, checkout.patron_id);
                let existing = checkouts.get(&key).cloned()
                    .unwrap_or_else(|| tables.checkouts.get(&key).map(|c| c.checkout_id.to_string()));
                if existing.as_deref() != Some(checkout.checkout_id.as_str()) {
                    return Err(conflict("checkout", key, "no longer exists"));
                }
                checkouts.insert(key, None);
            }
            Mutation::UpdatePatronCounters { patron_id, expected_version, num_holds, num_books_out } => {
                let patron = tables.patrons.get(patron_id).ok_or_else(||
                    LibraryError::not_found(format!("patron not found for {}", patron_id).as_str()))?;
                if patron.version != *expected_version {
                    return Err(LibraryError::conflict(
                        format!("patron {} changed, expected version {} but found {}",
                                patron_id, expected_version, patron.version).as_str(), None, true));
                }
                if *num_holds < 0 || *num_books_out < 0 {
                    return Err(LibraryError::validation(
                        format!("patron {} counters cannot be negative", patron_id).as_str(), None));
                }
            }
            Mutation::UpdateBookFlags { book_id, expected_version, .. } => {
                let book = tables.books.get(book_id).ok_or_else(||
                    LibraryError::not_found(format!("book not found for {}", book_id).as_str()))?;
                if book.version != *expected_version {
                    return Err(LibraryError::conflict(
                        format!("book {} changed, expected version {} but found {}",
                                book_id, expected_version, book.version).as_str(), None, true));
                }
            }
            Mutation::RaiseOnHold { book_id } => {
                if !tables.books.contains_key(book_id) {
                    return Err(LibraryError::not_found(format!("book not found for {}", book_id).as_str()));
                }
            }
        }
    }
    Ok(())
}

fn apply(tables: &mut LibraryTables, mutations: Vec<Mutation>) {
    let now = Utc::now().naive_utc();
    for mutation in mutations {
        match mutation {
            Mutation::InsertHold(hold) => {
                tables.holds.insert((hold.book_id, hold.patron_id), hold);
            }
            Mutation::DeleteHold(hold) => {
                tables.holds.remove(&(hold.book_id, hold.patron_id));
            }
            Mutation::InsertCheckout(checkout) => {
                tables.checkouts.insert((checkout.book_id, checkout.patron_id), checkout);
            }
            Mutation::DeleteCheckout(checkout) => {
                tables.checkouts.remove(&(checkout.book_id, checkout.patron_id));
            }
            Mutation::UpdatePatronCounters { patron_id, num_holds, num_books_out, .. } => {
                if let Some(patron) = tables.patrons.get_mut(&patron_id) {
                    patron.num_holds = num_holds;
                    patron.num_books_out = num_books_out;
                    patron.version += 1;
                    patron.updated_at = now;
                }
            }
            Mutation::UpdateBookFlags { book_id, checked_out, on_hold, .. } => {
                if let Some(book) = tables.books.get_mut(&book_id) {
                    book.checked_out = checked_out;
                    book.on_hold = on_hold;
                    book.version += 1;
                    book.updated_at = now;
                }
            }
            Mutation::RaiseOnHold { book_id } => {
                if let Some(book) = tables.books.get_mut(&book_id) {
                    book.on_hold = true;
                    book.version += 1;
                    book.updated_at = now;
                }
            }
        }
    }
}

fn conflict(kind: &str, key: PairKey, reason: &str) -> LibraryError {
    LibraryError::conflict(format!("{} for book {} and patron {} {}",
                                   kind, key.0, key.1, reason).as_str(), None, true)
}
