//! Category creation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    category::{Category, CategoryName, create_category, domain::CategoryForm},
};

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a category, responds with the new category.
///
/// # Errors
/// Responds with 400 if the name is missing or blank, 409 if a category with
/// the same trimmed name already exists, and 500 for unexpected errors.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryState>,
    payload: Result<Json<CategoryForm>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let Json(form) = payload?;
    let name = CategoryName::new(form.name.as_deref().unwrap_or_default())?;

    let connection = state.db_connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })?;

    let category = create_category(name, &connection).inspect_err(|error| {
        tracing::warn!("could not create category: {error}");
    })?;

    Ok((StatusCode::CREATED, Json(category)))
}
