use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::books::dto::BookDto;
use crate::catalog::domain::CatalogService;
use crate::core::command::{Command, CommandError};

pub struct RecommendBookCommand {
    catalog_service: Box<dyn CatalogService>,
}

impl RecommendBookCommand {
    pub fn new(catalog_service: Box<dyn CatalogService>) -> Self {
        Self {
            catalog_service,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RecommendBookCommandRequest {
    pub genre: String,
}

impl RecommendBookCommandRequest {
    pub fn new(genre: &str) -> Self {
        Self {
            genre: genre.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecommendBookCommandResponse {
    pub book: BookDto,
}

impl RecommendBookCommandResponse {
    pub fn new(book: BookDto) -> Self {
        Self {
            book,
        }
    }
}

#[async_trait]
impl Command<RecommendBookCommandRequest, RecommendBookCommandResponse> for RecommendBookCommand {
    async fn execute(&self, req: RecommendBookCommandRequest) -> Result<RecommendBookCommandResponse, CommandError> {
        self.catalog_service.recommend_book(req.genre.as_str())
            .await.map_err(CommandError::from).map(RecommendBookCommandResponse::new)
    }
}
