use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{Value};
use crate::circulation::dto::{CirculationAction, CirculationRequest, CirculationResponse};
use crate::circulation::factory;
use crate::core::command::CommandError;
use crate::core::controller::{AppState, ServerError};

// ids may be sent as JSON numbers or strings, the command layer validates them
fn id_field(json: &Value, key: &str) -> String {
    match json.get(key) {
        Some(Value::String(s)) => s.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub async fn circulate(
    State(state): State<AppState>,
    Path(action): Path<String>,
    json: Json<Value>) -> Result<(StatusCode, Json<CirculationResponse>), ServerError> {
    let action = CirculationAction::try_from(action.as_str()).map_err(CommandError::from)?;
    let req = CirculationRequest::new(id_field(&json.0, "patron_id").as_str(), id_field(&json.0, "book_id").as_str());
    let svc = factory::create_circulation_service(
        &state.config, state.store_kind, state.store.clone(), state.locks.clone()).await;
    let res = action.dispatch(svc, req).await?;
    Ok((res.outcome.status_code(), Json(res)))
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, State};
    use axum::http::StatusCode;
    use axum::response::Json;
    use serde_json::json;
    use crate::circulation::controller::{circulate, id_field};
    use crate::circulation::dto::Outcome;
    use crate::circulation::factory::create_library_store;
    use crate::core::controller::AppState;
    use crate::core::domain::Configuration;
    use crate::core::repository::RepositoryStore;
    use crate::books::domain::model::BookEntity;
    use crate::patrons::domain::model::PatronEntity;

    #[tokio::test]
    async fn test_should_read_id_fields() {
        let body = json!({"patron_id": 10, "book_id": "3"});
        assert_eq!("10", id_field(&body, "patron_id").as_str());
        assert_eq!("3", id_field(&body, "book_id").as_str());
        assert_eq!("", id_field(&body, "other").as_str());
    }

    #[tokio::test]
    async fn test_should_circulate_with_shared_state() {
        let store = create_library_store(RepositoryStore::Memory).await;
        let book = store.add_book(&BookEntity::new("Dune", "Frank Herbert", "Science Fiction")).await.expect("should add book");
        let patron = store.add_patron(&PatronEntity::new("Ada", "Lovelace")).await.expect("should add patron");
        let state = AppState::new(Configuration::new("test"), RepositoryStore::Memory, store);
        let body = json!({"patron_id": patron.patron_id, "book_id": book.book_id});

        let (status, Json(res)) = circulate(State(state.clone()), Path("check-out".to_string()), Json(body.clone()))
            .await.expect("should check out");
        assert_eq!(StatusCode::OK, status);
        assert_eq!(Outcome::Success, res.outcome);

        let (status, Json(res)) = circulate(State(state.clone()), Path("check_out".to_string()), Json(body.clone()))
            .await.expect("should respond");
        assert_eq!(StatusCode::CONFLICT, status);
        assert_eq!(Outcome::AlreadyCheckedOut, res.outcome);

        let (status, _) = circulate(State(state), Path("renew".to_string()), Json(body))
            .await.expect_err("should reject action");
        assert_eq!(StatusCode::BAD_REQUEST, status);
    }
}
