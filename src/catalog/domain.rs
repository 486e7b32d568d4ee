pub mod service;

use async_trait::async_trait;
use crate::books::domain::model::BookEntity;
use crate::books::dto::BookDto;
use crate::circulation::domain::batch::CirculationBatch;
use crate::core::library::{LibraryResult, SearchKeyword};

// CatalogService owns the availability and hold flags of books. Flag setters
// stage absolute values on the batch of the action being applied.
#[async_trait]
pub trait CatalogService: Sync + Send {
    fn is_available(&self, book: &BookEntity) -> bool;
    fn mark_checked_out(&self, batch: &mut CirculationBatch, book: &BookEntity, checked_out: bool);
    fn mark_on_hold(&self, batch: &mut CirculationBatch, book: &BookEntity, on_hold: bool);
    // true if any hold on the book remains once the batch is applied
    async fn has_any_hold(&self, book_id: i64, batch: &CirculationBatch) -> LibraryResult<bool>;
    async fn add_book(&self, book: &BookDto) -> LibraryResult<BookDto>;
    async fn find_book_by_id(&self, book_id: i64) -> LibraryResult<BookDto>;
    async fn search_books(&self, keyword: Option<SearchKeyword>, criterion: Option<&str>) -> LibraryResult<Vec<BookDto>>;
    async fn unheld_books(&self, patron_id: i64) -> LibraryResult<Vec<BookDto>>;
    async fn recommend_book(&self, genre: &str) -> LibraryResult<BookDto>;
}
