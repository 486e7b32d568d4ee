use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};
use crate::core::library::{parse_id, SearchKeyword};

pub struct SearchBooksCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl SearchBooksCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

// An empty keyword or criterion lists the whole catalog. When unheld_by is
// set the listing skips books that patron already holds.
#[derive(Debug, Default, Deserialize)]
pub struct SearchBooksCommandRequest {
    pub keyword: Option<String>,
    pub criterion: Option<String>,
    pub unheld_by: Option<String>,
}

impl SearchBooksCommandRequest {
    pub fn new(keyword: &str, criterion: &str) -> Self {
        Self {
            keyword: Some(keyword.to_string()),
            criterion: Some(criterion.to_string()),
            unheld_by: None,
        }
    }

    pub fn unheld_by(patron_id: &str) -> Self {
        Self {
            unheld_by: Some(patron_id.to_string()),
            ..Default::default()
        }
    }

    fn search_keyword(&self) -> Result<Option<SearchKeyword>, CommandError> {
        match self.keyword.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(keyword) => Ok(Some(SearchKeyword::try_from(keyword)?)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchBooksCommandResponse {
    pub books: Vec<BookDto>,
}

impl SearchBooksCommandResponse {
    pub fn new(books: Vec<BookDto>) -> Self {
        Self {
            books,
        }
    }
}

#[async_trait]
impl Command<SearchBooksCommandRequest, SearchBooksCommandResponse> for SearchBooksCommand {
    async fn execute(&self, req: SearchBooksCommandRequest) -> Result<SearchBooksCommandResponse, CommandError> {
        if let Some(patron_id) = req.unheld_by.as_deref() {
            let patron_id = parse_id("patron", patron_id)?;
            return self.catalog_service.unheld_books(patron_id)
                .await.map_err(CommandError::from).map(SearchBooksCommandResponse::new);
        }
        let keyword = req.search_keyword()?;
        self.catalog_service.search_books(keyword, req.criterion.as_deref())
            .await.map_err(CommandError::from).map(SearchBooksCommandResponse::new)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::books::dto::BookDto;
    use crate::catalog::command::search_books_cmd::{SearchBooksCommand, SearchBooksCommandRequest};
    use crate::catalog::factory;
    use crate::circulation::domain::batch::CirculationBatch;
    use crate::circulation::repository::memory_library_store::MemoryLibraryStore;
    use crate::core::command::{Command, CommandError};
    use crate::core::domain::Configuration;
    use crate::core::repository::{LibraryStore, RepositoryStore};
    use crate::hold::domain::model::HoldEntity;
    use crate::patrons::domain::model::PatronEntity;

    async fn build_command() -> (Arc<dyn LibraryStore>, SearchBooksCommand) {
        let store: Arc<dyn LibraryStore> = Arc::new(MemoryLibraryStore::new());
        let svc = factory::create_catalog_service(&Configuration::new("test"), RepositoryStore::Memory, store.clone()).await;
        for (title, author, genre) in [
            ("Kindred", "Octavia Butler", "Science Fiction"),
            ("Dune", "Frank Herbert", "Science Fiction"),
            ("Beloved", "Toni Morrison", "Fiction"),
        ] {
            svc.add_book(&BookDto::new(title, author, genre)).await.expect("should add book");
        }
        (store, SearchBooksCommand::new(svc))
    }

    #[tokio::test]
    async fn test_should_run_search_books() {
        let (_, cmd) = build_command().await;
        let res = cmd.execute(SearchBooksCommandRequest::new("genre", "science fiction")).await.expect("should search");
        let titles: Vec<&str> = res.books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(vec!["Dune", "Kindred"], titles);

        let res = cmd.execute(SearchBooksCommandRequest::default()).await.expect("should search");
        assert_eq!(3, res.books.len());
        assert!(matches!(cmd.execute(SearchBooksCommandRequest::new("isbn", "123")).await,
                         Err(CommandError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_should_run_unheld_books() {
        let (store, cmd) = build_command().await;
        let patron = store.add_patron(&PatronEntity::new("Ada", "Lovelace")).await.expect("should add patron");
        let mut batch = CirculationBatch::new();
        batch.insert_hold(HoldEntity::new(1, patron.patron_id));
        store.commit(&batch).await.expect("should commit");

        let res = cmd.execute(SearchBooksCommandRequest::unheld_by(patron.patron_id.to_string().as_str()))
            .await.expect("should list");
        assert_eq!(2, res.books.len());
        assert!(res.books.iter().all(|b| b.book_id != 1));
    }
}
