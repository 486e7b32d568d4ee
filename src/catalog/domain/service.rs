use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::warn;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::circulation::domain::batch::CirculationBatch;
use crate::core::domain::Configuration;
use crate::core::events::{DomainEvent, DomainEventType};
use crate::core::library::{LibraryError, LibraryResult, SearchKeyword};
use crate::core::repository::LibraryStore;
use crate::gateway::events::EventPublisher;

pub struct CatalogServiceImpl {
    store: Arc<dyn LibraryStore>,
    events_publisher: Box<dyn EventPublisher>,
}

impl CatalogServiceImpl {
    pub fn new(_config: &Configuration, store: Arc<dyn LibraryStore>,
               events_publisher: Box<dyn EventPublisher>) -> Self {
        Self {
            store,
            events_publisher,
        }
    }
}

#[async_trait]
impl CatalogService for CatalogServiceImpl {
    fn is_available(&self, book: &BookEntity) -> bool {
        !book.checked_out
    }

    fn mark_checked_out(&self, batch: &mut CirculationBatch, book: &BookEntity, checked_out: bool) {
        batch.book_flags(book).checked_out = checked_out;
    }

    fn mark_on_hold(&self, batch: &mut CirculationBatch, book: &BookEntity, on_hold: bool) {
        if on_hold {
            batch.raise_on_hold(book);
        } else {
            batch.book_flags(book).on_hold = false;
        }
    }

    async fn has_any_hold(&self, book_id: i64, batch: &CirculationBatch) -> LibraryResult<bool> {
        let stored = self.store.count_holds_for_book(book_id).await? as i64;
        Ok(stored + batch.pending_hold_delta(book_id) > 0)
    }

    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto> {
        if book.title.trim().is_empty() {
            return Err(LibraryError::validation("book title is required", Some("400".to_string())));
        }
        let saved = self.store.add_book(&BookEntity::new(
            book.title.trim(), book.author.trim(), book.genre.trim())).await?;
        let dto = BookDto::from(&saved);
        let event = DomainEvent::build(DomainEventType::BookAdded, dto.book_id.to_string().as_str(),
                                       &HashMap::new(), &dto)?;
        if let Err(err) = self.events_publisher.publish(&event).await {
            warn!(book_id = dto.book_id, "failed to publish {} event: {}", event.name, err);
        }
        Ok(dto)
    }

    async fn find_book_by_id(&self, book_id: i64) -> LibraryResult<BookDto> {
        self.store.find_book(book_id).await.map(|b| BookDto::from(&b))
    }

    async fn search_books(&self, keyword: Option<SearchKeyword>, criterion: Option<&str>) -> LibraryResult<Vec<BookDto>> {
        let criterion = criterion.map(str::trim).unwrap_or_default();
        let predicate = match keyword {
            Some(keyword) if !criterion.is_empty() => {
                HashMap::from([(keyword.column().to_string(), search_value(keyword, criterion)?)])
            }
            _ => HashMap::new(),
        };
        let books = self.store.query_books(&predicate).await?;
        Ok(sorted_dtos(books))
    }

    async fn unheld_books(&self, patron_id: i64) -> LibraryResult<Vec<BookDto>> {
        let held: HashSet<i64> = self.store.holds_for_patron(patron_id).await?
            .iter().map(|hold| hold.book_id).collect();
        let books = self.store.query_books(&HashMap::new()).await?
            .into_iter().filter(|book| !held.contains(&book.book_id)).collect();
        Ok(sorted_dtos(books))
    }

    async fn recommend_book(&self, genre: &str) -> LibraryResult<BookDto> {
        let books = self.store.query_books(
            &HashMap::from([("genre".to_string(), genre.trim().to_string())])).await?;
        books.choose(&mut rand::thread_rng())
            .map(BookDto::from)
            .ok_or_else(|| LibraryError::not_found(
                format!("there are no books with genre {} in the catalog", genre).as_str()))
    }
}

// availability is stored inverted as the checked_out flag
fn search_value(keyword: SearchKeyword, criterion: &str) -> LibraryResult<String> {
    if keyword != SearchKeyword::Available {
        return Ok(criterion.to_string());
    }
    match criterion.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok("false".to_string()),
        "false" | "no" | "0" => Ok("true".to_string()),
        _ => Err(LibraryError::validation(
            format!("availability must be true or false, not {}", criterion).as_str(), Some("400".to_string()))),
    }
}

fn sorted_dtos(mut books: Vec<BookEntity>) -> Vec<BookDto> {
    books.sort_by(|a, b| a.title.cmp(&b.title).then_with(|| a.author.cmp(&b.author)));
    books.iter().map(BookDto::from).collect()
}
