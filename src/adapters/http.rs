use crate::core::service::{NumberQuery, NumberService};
use crate::domain::model::PageResult;
use crate::domain::ports::{NumberClassifier, RowSource};
use crate::utils::error::{AppError, ErrorKind};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const NUMBERS_PATH: &str = "/numbersvc";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    pub message: String,
    pub result: PageResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub message: String,
}

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind().status_code();
        let body = ErrorEnvelope {
            message: self.user_friendly_message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// `GET /numbersvc?limit=&page=&country=&state=`
pub fn router<R, C>(service: Arc<NumberService<R, C>>) -> Router
where
    R: RowSource + 'static,
    C: NumberClassifier + 'static,
{
    Router::new()
        .route(NUMBERS_PATH, get(list_numbers::<R, C>))
        .with_state(service)
}

async fn list_numbers<R, C>(
    State(service): State<Arc<NumberService<R, C>>>,
    query: Result<Query<NumberQuery>, QueryRejection>,
) -> Result<Json<SuccessEnvelope>, AppError>
where
    R: RowSource + 'static,
    C: NumberClassifier + 'static,
{
    let Query(query) = query.map_err(|rejection| {
        tracing::warn!(error = %rejection, "malformed query string");
        AppError::bad_request(rejection.body_text())
    })?;

    tracing::info!(
        page = %query.page,
        limit = %query.limit,
        country = %query.country,
        state = %query.state,
        "lookup request"
    );

    match service.lookup(&query).await {
        Ok(result) => Ok(Json(SuccessEnvelope {
            message: "success".to_string(),
            result,
        })),
        Err(e) => {
            if e.kind() != ErrorKind::ServerError {
                tracing::warn!(error = %e, "lookup rejected");
            }
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::bad_request("x").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("x").into_response().status(),
            StatusCode::NOT_FOUND
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "down");
        assert_eq!(
            AppError::row_source(io).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
