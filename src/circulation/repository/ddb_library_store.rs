use std::collections::HashMap;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::{AttributeValue, Delete, Put, ReturnValue, Select, TransactWriteItem, Update};
use chrono::Utc;
use serde::Serialize;
use crate::books::domain::model::BookEntity;
use crate::checkout::domain::model::CheckoutEntity;
use crate::circulation::domain::batch::{CirculationBatch, Mutation};
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::LibraryStore;
use crate::hold::domain::model::HoldEntity;
use crate::patrons::domain::model::PatronEntity;
use crate::patrons::PATRON_MIN_ID;
use crate::utils::ddb::{add_filter_expr, number, parse_bool_attribute, parse_date_attribute, parse_item, parse_number_attribute, parse_string_attribute, string_date};

pub const BOOKS_TABLE: &str = "books";
pub const PATRONS_TABLE: &str = "patrons";
pub const HOLDS_TABLE: &str = "holds";
pub const CHECKOUTS_TABLE: &str = "checkouts";
pub const COUNTERS_TABLE: &str = "counters";

// DDBLibraryStore keeps books and patrons keyed by their numeric id and holds
// and checkouts keyed by "book_id:patron_id", which makes each pair unique.
#[derive(Debug)]
pub struct DDBLibraryStore {
    client: Client,
}

impl DDBLibraryStore {
    pub fn new(client: Client) -> Self {
        Self {
            client,
        }
    }

    // atomically increments the named counter, starting after `floor`
    async fn next_id(&self, counter: &str, floor: i64) -> LibraryResult<i64> {
        let out = self.client
            .update_item()
            .table_name(COUNTERS_TABLE)
            .key("counter_name", AttributeValue::S(counter.to_string()))
            .update_expression("SET next_id = if_not_exists(next_id, :floor) + :one")
            .expression_attribute_values(":floor", number(floor))
            .expression_attribute_values(":one", number(1))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await?;
        let id = out.attributes().map(|attrs| parse_number_attribute("next_id", attrs)).unwrap_or_default();
        if id <= floor {
            return Err(LibraryError::database(format!("failed to allocate id from {}", counter).as_str(), None, false));
        }
        Ok(id)
    }

    async fn put_new<T: Serialize>(&self, table_name: &str, pk: &str, entity: &T) -> LibraryResult<()> {
        let val = serde_json::to_value(entity)?;
        self.client
            .put_item()
            .table_name(table_name)
            .condition_expression(format!("attribute_not_exists({})", pk))
            .set_item(Some(parse_item(val)?))
            .send()
            .await.map(|_| ()).map_err(LibraryError::from)
    }

    async fn get(&self, table_name: &str, pk: &str, key: AttributeValue) -> LibraryResult<Option<HashMap<String, AttributeValue>>> {
        let out = self.client
            .get_item()
            .table_name(table_name)
            .key(pk, key)
            .consistent_read(true)
            .send()
            .await?;
        Ok(out.item().cloned())
    }

    // scans the whole table following pagination, optionally filtered
    async fn scan(&self, table_name: &str, filter: &HashMap<String, AttributeValue>) -> LibraryResult<Vec<HashMap<String, AttributeValue>>> {
        let mut items = vec![];
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let mut request = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .set_exclusive_start_key(start_key.take());
            let mut filter_expr = String::new();
            for (k, v) in filter {
                let ks = add_filter_expr(k.as_str(), &mut filter_expr);
                request = request
                    .expression_attribute_names(format!("#{}", ks), ks.as_str())
                    .expression_attribute_values(format!(":{}", ks), v.clone());
            }
            if !filter_expr.is_empty() {
                request = request.filter_expression(filter_expr);
            }
            let out = request.send().await?;
            items.extend(out.items().unwrap_or_default().iter().cloned());
            match out.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => return Ok(items),
            }
        }
    }

    async fn count(&self, table_name: &str, column: &str, id: i64) -> LibraryResult<usize> {
        let mut total = 0;
        let mut start_key: Option<HashMap<String, AttributeValue>> = None;
        loop {
            let out = self.client
                .scan()
                .table_name(table_name)
                .consistent_read(true)
                .select(Select::Count)
                .filter_expression(format!("{} = :id", column))
                .expression_attribute_values(":id", number(id))
                .set_exclusive_start_key(start_key.take())
                .send()
                .await?;
            total += out.count() as usize;
            match out.last_evaluated_key() {
                Some(key) => start_key = Some(key.clone()),
                None => return Ok(total),
            }
        }
    }
}

#[async_trait]
impl LibraryStore for DDBLibraryStore {
    async fn add_book(&self, book: &BookEntity) -> LibraryResult<BookEntity> {
        let mut saved = book.clone();
        saved.book_id = self.next_id(BOOKS_TABLE, 0).await?;
        saved.version = 0;
        self.put_new(BOOKS_TABLE, "book_id", &saved).await?;
        Ok(saved)
    }

    async fn add_patron(&self, patron: &PatronEntity) -> LibraryResult<PatronEntity> {
        let mut saved = patron.clone();
        saved.patron_id = self.next_id(PATRONS_TABLE, PATRON_MIN_ID - 1).await?;
        saved.version = 0;
        self.put_new(PATRONS_TABLE, "patron_id", &saved).await?;
        Ok(saved)
    }

    async fn find_book(&self, book_id: i64) -> LibraryResult<BookEntity> {
        match self.get(BOOKS_TABLE, "book_id", number(book_id)).await? {
            Some(map) => Ok(map_to_book(&map)),
            None => Err(LibraryError::not_found(format!("book not found for {}", book_id).as_str())),
        }
    }

    async fn find_patron(&self, patron_id: i64) -> LibraryResult<PatronEntity> {
        match self.get(PATRONS_TABLE, "patron_id", number(patron_id)).await? {
            Some(map) => Ok(map_to_patron(&map)),
            None => Err(LibraryError::not_found(format!("patron not found for {}", patron_id).as_str())),
        }
    }

    // Note you cannot use certain reserved words per https://docs.aws.amazon.com/amazondynamodb/latest/developerguide/ReservedWords.html
    async fn query_books(&self, predicate: &HashMap<String, String>) -> LibraryResult<Vec<BookEntity>> {
        // flags are filtered by DynamoDB, text columns compare case-insensitively here
        let mut filter = HashMap::new();
        for flag in ["checked_out", "on_hold"] {
            if let Some(val) = predicate.get(flag) {
                if let Ok(b) = val.trim().parse::<bool>() {
                    filter.insert(flag.to_string(), AttributeValue::Bool(b));
                }
            }
        }
        let mut books = vec![];
        for item in self.scan(BOOKS_TABLE, &filter).await? {
            let book = map_to_book(&item);
            if book.matches(predicate)? {
                books.push(book);
            }
        }
        Ok(books)
    }

    async fn find_hold(&self, book_id: i64, patron_id: i64) -> LibraryResult<Option<HoldEntity>> {
        let item = self.get(HOLDS_TABLE, "pair_key", pair_key(book_id, patron_id)).await?;
        Ok(item.as_ref().map(map_to_hold))
    }

    async fn find_checkout(&self, book_id: i64, patron_id: i64) -> LibraryResult<Option<CheckoutEntity>> {
        let item = self.get(CHECKOUTS_TABLE, "pair_key", pair_key(book_id, patron_id)).await?;
        Ok(item.as_ref().map(map_to_checkout))
    }

    async fn count_holds_for_book(&self, book_id: i64) -> LibraryResult<usize> {
        self.count(HOLDS_TABLE, "book_id", book_id).await
    }

    async fn count_checkouts_for_book(&self, book_id: i64) -> LibraryResult<usize> {
        self.count(CHECKOUTS_TABLE, "book_id", book_id).await
    }

    async fn holds_for_patron(&self, patron_id: i64) -> LibraryResult<Vec<HoldEntity>> {
        let filter = HashMap::from([("patron_id".to_string(), number(patron_id))]);
        Ok(self.scan(HOLDS_TABLE, &filter).await?.iter().map(map_to_hold).collect())
    }

    async fn checkouts_for_patron(&self, patron_id: i64) -> LibraryResult<Vec<CheckoutEntity>> {
        let filter = HashMap::from([("patron_id".to_string(), number(patron_id))]);
        Ok(self.scan(CHECKOUTS_TABLE, &filter).await?.iter().map(map_to_checkout).collect())
    }

    async fn commit(&self, batch: &CirculationBatch) -> LibraryResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let mut items = vec![];
        for mutation in batch.mutations() {
            items.push(to_transact_item(mutation)?);
        }
        self.client
            .transact_write_items()
            .set_transact_items(Some(items))
            .send()
            .await.map(|_| ()).map_err(LibraryError::from)
    }
}

fn pair_key(book_id: i64, patron_id: i64) -> AttributeValue {
    AttributeValue::S(format!("{}:{}", book_id, patron_id))
}

fn record_item<T: Serialize>(entity: &T, book_id: i64, patron_id: i64) -> LibraryResult<HashMap<String, AttributeValue>> {
    let mut item = parse_item(serde_json::to_value(entity)?)?;
    item.insert("pair_key".to_string(), pair_key(book_id, patron_id));
    Ok(item)
}

// Each mutation carries its own condition so the transaction is cancelled as a
// whole when any record or version changed since it was read.
fn to_transact_item(mutation: Mutation) -> LibraryResult<TransactWriteItem> {
    let now = string_date(Utc::now().naive_utc());
    let item = match mutation {
        Mutation::InsertHold(hold) => {
            TransactWriteItem::builder().put(Put::builder()
                .table_name(HOLDS_TABLE)
                .set_item(Some(record_item(&hold, hold.book_id, hold.patron_id)?))
                .condition_expression("attribute_not_exists(pair_key)")
                .build()).build()
        }
        Mutation::DeleteHold(hold) => {
            TransactWriteItem::builder().delete(Delete::builder()
                .table_name(HOLDS_TABLE)
                .key("pair_key", pair_key(hold.book_id, hold.patron_id))
                .condition_expression("hold_id = :hold_id")
                .expression_attribute_values(":hold_id", AttributeValue::S(hold.hold_id))
                .build()).build()
        }
        Mutation::InsertCheckout(checkout) => {
            TransactWriteItem::builder().put(Put::builder()
                .table_name(CHECKOUTS_TABLE)
                .set_item(Some(record_item(&checkout, checkout.book_id, checkout.patron_id)?))
                .condition_expression("attribute_not_exists(pair_key)")
                .build()).build()
        }
        Mutation::DeleteCheckout(checkout) => {
            TransactWriteItem::builder().delete(Delete::builder()
                .table_name(CHECKOUTS_TABLE)
                .key("pair_key", pair_key(checkout.book_id, checkout.patron_id))
                .condition_expression("checkout_id = :checkout_id")
                .expression_attribute_values(":checkout_id", AttributeValue::S(checkout.checkout_id))
                .build()).build()
        }
        Mutation::UpdatePatronCounters { patron_id, expected_version, num_holds, num_books_out } => {
            TransactWriteItem::builder().update(Update::builder()
                .table_name(PATRONS_TABLE)
                .key("patron_id", number(patron_id))
                .update_expression("SET version = :version, num_holds = :num_holds, num_books_out = :num_books_out, updated_at = :updated_at")
                .expression_attribute_values(":old_version", number(expected_version))
                .expression_attribute_values(":version", number(expected_version + 1))
                .expression_attribute_values(":num_holds", number(num_holds))
                .expression_attribute_values(":num_books_out", number(num_books_out))
                .expression_attribute_values(":updated_at", now)
                .condition_expression("attribute_exists(version) AND version = :old_version")
                .build()).build()
        }
        Mutation::UpdateBookFlags { book_id, expected_version, checked_out, on_hold } => {
            TransactWriteItem::builder().update(Update::builder()
                .table_name(BOOKS_TABLE)
                .key("book_id", number(book_id))
                .update_expression("SET version = :version, checked_out = :checked_out, on_hold = :on_hold, updated_at = :updated_at")
                .expression_attribute_values(":old_version", number(expected_version))
                .expression_attribute_values(":version", number(expected_version + 1))
                .expression_attribute_values(":checked_out", AttributeValue::Bool(checked_out))
                .expression_attribute_values(":on_hold", AttributeValue::Bool(on_hold))
                .expression_attribute_values(":updated_at", now)
                .condition_expression("attribute_exists(version) AND version = :old_version")
                .build()).build()
        }
        Mutation::RaiseOnHold { book_id } => {
            TransactWriteItem::builder().update(Update::builder()
                .table_name(BOOKS_TABLE)
                .key("book_id", number(book_id))
                .update_expression("SET version = version + :one, on_hold = :on_hold, updated_at = :updated_at")
                .expression_attribute_values(":one", number(1))
                .expression_attribute_values(":on_hold", AttributeValue::Bool(true))
                .expression_attribute_values(":updated_at", now)
                .condition_expression("attribute_exists(version)")
                .build()).build()
        }
    };
    Ok(item)
}

fn map_to_book(map: &HashMap<String, AttributeValue>) -> BookEntity {
    BookEntity {
        book_id: parse_number_attribute("book_id", map),
        version: parse_number_attribute("version", map),
        title: parse_string_attribute("title", map).unwrap_or_default(),
        author: parse_string_attribute("author", map).unwrap_or_default(),
        genre: parse_string_attribute("genre", map).unwrap_or_default(),
        checked_out: parse_bool_attribute("checked_out", map),
        on_hold: parse_bool_attribute("on_hold", map),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

fn map_to_patron(map: &HashMap<String, AttributeValue>) -> PatronEntity {
    PatronEntity {
        patron_id: parse_number_attribute("patron_id", map),
        version: parse_number_attribute("version", map),
        first_name: parse_string_attribute("first_name", map).unwrap_or_default(),
        last_name: parse_string_attribute("last_name", map).unwrap_or_default(),
        num_books_out: parse_number_attribute("num_books_out", map),
        num_holds: parse_number_attribute("num_holds", map),
        total_fine_cents: parse_number_attribute("total_fine_cents", map),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

fn map_to_hold(map: &HashMap<String, AttributeValue>) -> HoldEntity {
    HoldEntity {
        hold_id: parse_string_attribute("hold_id", map).unwrap_or_default(),
        book_id: parse_number_attribute("book_id", map),
        patron_id: parse_number_attribute("patron_id", map),
        hold_at: parse_date_attribute("hold_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

fn map_to_checkout(map: &HashMap<String, AttributeValue>) -> CheckoutEntity {
    CheckoutEntity {
        checkout_id: parse_string_attribute("checkout_id", map).unwrap_or_default(),
        book_id: parse_number_attribute("book_id", map),
        patron_id: parse_number_attribute("patron_id", map),
        checkout_at: parse_date_attribute("checkout_at", map).unwrap_or(Utc::now().naive_utc()),
        due_at: parse_date_attribute("due_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}

#[cfg(test)]
mod tests {
    use async_once::AsyncOnce;
    use lazy_static::lazy_static;
    use crate::books::domain::model::BookEntity;
    use crate::checkout::domain::model::CheckoutEntity;
    use crate::circulation::domain::batch::CirculationBatch;
    use crate::circulation::factory::create_library_store;
    use aws_sdk_dynamodb::types::AttributeValue;
    use crate::circulation::domain::batch::Mutation;
    use crate::circulation::repository::ddb_library_store::{BOOKS_TABLE, CHECKOUTS_TABLE, HOLDS_TABLE, map_to_book, map_to_hold, PATRONS_TABLE, record_item, to_transact_item};
    use crate::core::library::LibraryError;
    use crate::core::repository::{LibraryStore, RepositoryStore};
    use crate::hold::domain::model::HoldEntity;
    use crate::patrons::domain::model::PatronEntity;
    use crate::utils::ddb::parse_item;
    use std::sync::Arc;

    lazy_static! {
        static ref SUT_STORE: AsyncOnce<Arc<dyn LibraryStore>> = AsyncOnce::new(async {
                create_library_store(RepositoryStore::LocalDynamoDB).await
            });
    }

    #[tokio::test]
    async fn test_should_map_items() {
        let mut book = BookEntity::new("Dune", "Frank Herbert", "Science Fiction");
        book.book_id = 4;
        book.on_hold = true;
        let item = parse_item(serde_json::to_value(&book).expect("should serialize")).expect("should parse");
        assert_eq!(book, map_to_book(&item));

        let hold = HoldEntity::new(4, 10);
        let item = record_item(&hold, 4, 10).expect("should build item");
        assert_eq!(hold, map_to_hold(&item));
    }

    fn pair(book_id: i64, patron_id: i64) -> AttributeValue {
        AttributeValue::S(format!("{}:{}", book_id, patron_id))
    }

    #[tokio::test]
    async fn test_should_guard_record_writes() {
        let hold = HoldEntity::new(4, 10);
        let item = to_transact_item(Mutation::InsertHold(hold.clone())).expect("should build");
        let put = item.put().expect("should put");
        assert_eq!(Some(HOLDS_TABLE), put.table_name());
        assert_eq!(Some("attribute_not_exists(pair_key)"), put.condition_expression());
        assert_eq!(Some(&pair(4, 10)), put.item().and_then(|i| i.get("pair_key")));

        let item = to_transact_item(Mutation::DeleteHold(hold.clone())).expect("should build");
        let delete = item.delete().expect("should delete");
        assert_eq!(Some(HOLDS_TABLE), delete.table_name());
        assert_eq!(Some("hold_id = :hold_id"), delete.condition_expression());
        assert_eq!(Some(&pair(4, 10)), delete.key().and_then(|k| k.get("pair_key")));
        assert_eq!(Some(&AttributeValue::S(hold.hold_id.to_string())),
                   delete.expression_attribute_values().and_then(|v| v.get(":hold_id")));

        let checkout = CheckoutEntity::new(5, 11, 14);
        let item = to_transact_item(Mutation::InsertCheckout(checkout.clone())).expect("should build");
        let put = item.put().expect("should put");
        assert_eq!(Some(CHECKOUTS_TABLE), put.table_name());
        assert_eq!(Some("attribute_not_exists(pair_key)"), put.condition_expression());
        assert_eq!(Some(&pair(5, 11)), put.item().and_then(|i| i.get("pair_key")));

        let item = to_transact_item(Mutation::DeleteCheckout(checkout.clone())).expect("should build");
        let delete = item.delete().expect("should delete");
        assert_eq!(Some(CHECKOUTS_TABLE), delete.table_name());
        assert_eq!(Some("checkout_id = :checkout_id"), delete.condition_expression());
        assert_eq!(Some(&pair(5, 11)), delete.key().and_then(|k| k.get("pair_key")));
    }

    #[tokio::test]
    async fn test_should_guard_counter_and_flag_updates() {
        let item = to_transact_item(Mutation::UpdatePatronCounters {
            patron_id: 10, expected_version: 3, num_holds: 2, num_books_out: 1,
        }).expect("should build");
        let update = item.update().expect("should update");
        assert_eq!(Some(PATRONS_TABLE), update.table_name());
        assert_eq!(Some("attribute_exists(version) AND version = :old_version"), update.condition_expression());
        assert_eq!(Some(&AttributeValue::N("10".to_string())), update.key().and_then(|k| k.get("patron_id")));
        let values = update.expression_attribute_values().expect("should bind values");
        assert_eq!(Some(&AttributeValue::N("3".to_string())), values.get(":old_version"));
        assert_eq!(Some(&AttributeValue::N("4".to_string())), values.get(":version"));

        let item = to_transact_item(Mutation::UpdateBookFlags {
            book_id: 4, expected_version: 7, checked_out: true, on_hold: false,
        }).expect("should build");
        let update = item.update().expect("should update");
        assert_eq!(Some(BOOKS_TABLE), update.table_name());
        assert_eq!(Some("attribute_exists(version) AND version = :old_version"), update.condition_expression());
        assert_eq!(Some(&AttributeValue::N("4".to_string())), update.key().and_then(|k| k.get("book_id")));
        let values = update.expression_attribute_values().expect("should bind values");
        assert_eq!(Some(&AttributeValue::N("7".to_string())), values.get(":old_version"));
        assert_eq!(Some(&AttributeValue::Bool(true)), values.get(":checked_out"));

        let item = to_transact_item(Mutation::RaiseOnHold { book_id: 4 }).expect("should build");
        let update = item.update().expect("should update");
        assert_eq!(Some(BOOKS_TABLE), update.table_name());
        assert_eq!(Some("attribute_exists(version)"), update.condition_expression());
        assert!(update.update_expression().unwrap_or_default().contains("version = version + :one"));
        let values = update.expression_attribute_values().expect("should bind values");
        assert!(values.get(":old_version").is_none());
        assert_eq!(Some(&AttributeValue::Bool(true)), values.get(":on_hold"));
    }

    #[tokio::test]
    #[ignore = "requires DynamoDB Local on localhost:8000"]
    async fn test_should_commit_to_ddb() {
        let store = SUT_STORE.get().await.clone();
        let book = store.add_book(&BookEntity::new("Dune", "Frank Herbert", "Science Fiction")).await.expect("should add book");
        let patron = store.add_patron(&PatronEntity::new("Ada", "Lovelace")).await.expect("should add patron");
        assert!(patron.patron_id >= 10);

        let mut batch = CirculationBatch::new();
        batch.insert_checkout(CheckoutEntity::new(book.book_id, patron.patron_id, 14));
        batch.patron_counters(&patron).num_books_out += 1;
        batch.book_flags(&book).checked_out = true;
        store.commit(&batch).await.expect("should commit");
        assert!(matches!(store.commit(&batch).await, Err(LibraryError::Conflict { .. })));

        let loaded = store.find_book(book.book_id).await.expect("should find book");
        assert!(loaded.checked_out);
        assert_eq!(1, store.count_checkouts_for_book(book.book_id).await.expect("should count"));
        assert_eq!(1, store.checkouts_for_patron(patron.patron_id).await.expect("should list").len());
    }
}
