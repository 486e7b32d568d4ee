use std::collections::{BTreeMap, BTreeSet};
use crate::books::domain::model::BookEntity;
use crate::checkout::domain::model::CheckoutEntity;
use crate::hold::domain::model::HoldEntity;
use crate::patrons::domain::model::PatronEntity;

// Mutation is a single write against the store. A batch is committed as a
// whole, so the store never sees a counter change without its record change.
#[derive(Debug, PartialEq, Clone)]
pub enum Mutation {
    InsertHold(HoldEntity),
    DeleteHold(HoldEntity),
    InsertCheckout(CheckoutEntity),
    DeleteCheckout(CheckoutEntity),
    UpdatePatronCounters {
        patron_id: i64,
        expected_version: i64,
        num_holds: i64,
        num_books_out: i64,
    },
    UpdateBookFlags {
        book_id: i64,
        expected_version: i64,
        checked_out: bool,
        on_hold: bool,
    },
    // sets on_hold without checking the version read, but still bumps it so a
    // concurrent versioned flag update on the same book is refused
    RaiseOnHold {
        book_id: i64,
    },
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct PatronCounters {
    pub expected_version: i64,
    pub num_holds: i64,
    pub num_books_out: i64,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct BookFlags {
    pub expected_version: i64,
    pub checked_out: bool,
    pub on_hold: bool,
}

// CirculationBatch collects the effects of one patron action. Counters and
// flags hold absolute values, so staging the same change twice is harmless and
// an action touching a patron or book more than once still ends up as a
// single update per row.
#[derive(Debug, Default, Clone)]
pub struct CirculationBatch {
    records: Vec<Mutation>,
    patrons: BTreeMap<i64, PatronCounters>,
    books: BTreeMap<i64, BookFlags>,
    raised: BTreeSet<i64>,
}

impl CirculationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_hold(&mut self, hold: HoldEntity) {
        self.records.push(Mutation::InsertHold(hold));
    }

    pub fn delete_hold(&mut self, hold: HoldEntity) {
        self.records.push(Mutation::DeleteHold(hold));
    }

    pub fn insert_checkout(&mut self, checkout: CheckoutEntity) {
        self.records.push(Mutation::InsertCheckout(checkout));
    }

    pub fn delete_checkout(&mut self, checkout: CheckoutEntity) {
        self.records.push(Mutation::DeleteCheckout(checkout));
    }

    pub fn patron_counters(&mut self, patron: &PatronEntity) -> &mut PatronCounters {
        self.patrons.entry(patron.patron_id).or_insert(PatronCounters {
            expected_version: patron.version,
            num_holds: patron.num_holds,
            num_books_out: patron.num_books_out,
        })
    }

    pub fn book_flags(&mut self, book: &BookEntity) -> &mut BookFlags {
        let raised = self.raised.remove(&book.book_id);
        self.books.entry(book.book_id).or_insert(BookFlags {
            expected_version: book.version,
            checked_out: book.checked_out,
            on_hold: book.on_hold || raised,
        })
    }

    // Any number of patrons may hold a book, so raising on_hold is idempotent
    // and does not need the version the book was read at.
    pub fn raise_on_hold(&mut self, book: &BookEntity) {
        match self.books.get_mut(&book.book_id) {
            Some(flags) => flags.on_hold = true,
            None => {
                self.raised.insert(book.book_id);
            }
        }
    }

    // holds inserted minus holds deleted for the book in this batch
    pub fn pending_hold_delta(&self, book_id: i64) -> i64 {
        self.records.iter().map(|m| match m {
            Mutation::InsertHold(hold) if hold.book_id == book_id => 1,
            Mutation::DeleteHold(hold) if hold.book_id == book_id => -1,
            _ => 0,
        }).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.patrons.is_empty() && self.books.is_empty() && self.raised.is_empty()
    }

    // record changes first, then one counter update per patron and one flag
    // update per book
    pub fn mutations(&self) -> Vec<Mutation> {
        let mut mutations = self.records.clone();
        for (patron_id, counters) in &self.patrons {
            mutations.push(Mutation::UpdatePatronCounters {
                patron_id: *patron_id,
                expected_version: counters.expected_version,
                num_holds: counters.num_holds,
                num_books_out: counters.num_books_out,
            });
        }
        for (book_id, flags) in &self.books {
            mutations.push(Mutation::UpdateBookFlags {
                book_id: *book_id,
                expected_version: flags.expected_version,
                checked_out: flags.checked_out,
                on_hold: flags.on_hold,
            });
        }
        for book_id in &self.raised {
            mutations.push(Mutation::RaiseOnHold { book_id: *book_id });
        }
        mutations
    }
}

#[cfg(test)]
mod tests {
    use crate::books::domain::model::BookEntity;
    use crate::circulation::domain::batch::{CirculationBatch, Mutation};
    use crate::hold::domain::model::HoldEntity;
    use crate::patrons::domain::model::PatronEntity;

    #[tokio::test]
    async fn test_should_merge_counter_updates() {
        let mut patron = PatronEntity::new("Ada", "Lovelace");
        patron.patron_id = 10;
        patron.version = 3;
        patron.num_holds = 2;
        let mut batch = CirculationBatch::new();
        batch.patron_counters(&patron).num_holds -= 1;
        batch.patron_counters(&patron).num_books_out += 1;
        let mutations = batch.mutations();
        assert_eq!(1, mutations.len());
        assert_eq!(Mutation::UpdatePatronCounters {
            patron_id: 10,
            expected_version: 3,
            num_holds: 1,
            num_books_out: 1,
        }, mutations[0]);
    }

    #[tokio::test]
    async fn test_should_order_records_before_updates() {
        let mut book = BookEntity::new("Dune", "Frank Herbert", "Science Fiction");
        book.book_id = 1;
        let mut batch = CirculationBatch::new();
        batch.book_flags(&book).on_hold = true;
        batch.insert_hold(HoldEntity::new(1, 10));
        let mutations = batch.mutations();
        assert!(matches!(mutations[0], Mutation::InsertHold(_)));
        assert!(matches!(mutations[1], Mutation::UpdateBookFlags { book_id: 1, on_hold: true, checked_out: false, .. }));
    }

    #[tokio::test]
    async fn test_should_raise_on_hold_without_version() {
        let mut book = BookEntity::new("Dune", "Frank Herbert", "Science Fiction");
        book.book_id = 1;
        book.version = 4;
        let mut batch = CirculationBatch::new();
        batch.raise_on_hold(&book);
        batch.raise_on_hold(&book);
        assert!(!batch.is_empty());
        assert_eq!(vec![Mutation::RaiseOnHold { book_id: 1 }], batch.mutations());

        batch.book_flags(&book).checked_out = true;
        assert_eq!(vec![Mutation::UpdateBookFlags {
            book_id: 1,
            expected_version: 4,
            checked_out: true,
            on_hold: true,
        }], batch.mutations());
    }

    #[tokio::test]
    async fn test_should_track_pending_hold_delta() {
        let mut batch = CirculationBatch::new();
        assert!(batch.is_empty());
        batch.insert_hold(HoldEntity::new(1, 10));
        batch.delete_hold(HoldEntity::new(2, 10));
        batch.delete_hold(HoldEntity::new(2, 11));
        assert_eq!(1, batch.pending_hold_delta(1));
        assert_eq!(-2, batch.pending_hold_delta(2));
        assert_eq!(0, batch.pending_hold_delta(3));
    }
}
