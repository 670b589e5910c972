//! HTTP surface
//!
//! JSON routes, camelCase on the wire:
//!
//! - `POST /request-review-token` `{userId, productId}` -> `{reviewToken}`
//! - `POST /submit-review` `{reviewToken, rating, comment}` -> `{success, message}`
//! - `GET /reviews/:product_id` -> reviews with stringified numerics
//! - `GET /health` -> token store counters
//!
//! Failures answer `{"error": "..."}` with 400 for malformed input, 403 for
//! token violations and 502 when the ledger fails.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use review_authority::ReviewTokenAuthority;
use review_core::{LedgerEffects, Rating, Review, ReviewError, ReviewToken, SubmissionReceipt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Ledger handle selected at startup
pub type SharedLedger = Arc<dyn LedgerEffects>;

/// Authority shared by every request handler
pub type SharedAuthority = Arc<ReviewTokenAuthority<SharedLedger>>;

/// Body of a token request
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenRequest {
    /// Requesting user
    pub user_id: Option<String>,
    /// Product to be reviewed
    pub product_id: Option<String>,
}

/// Answer to a token request
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    /// Freshly issued single-use token
    pub review_token: String,
}

/// Body of a review submission
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SubmitReviewRequest {
    /// Token obtained from `/request-review-token`
    pub review_token: Option<String>,
    /// Rating, conventionally 1-5
    pub rating: Option<u64>,
    /// Free-form comment
    pub comment: Option<String>,
}

/// Health report
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` while the server answers
    pub status: String,
    /// Tokens issued since start
    pub issued_tokens: usize,
    /// Tokens currently claimed
    pub claimed_tokens: usize,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason
    pub error: String,
}

/// Review error rendered as an HTTP response
#[derive(Debug)]
pub struct ApiError(pub ReviewError);

impl ApiError {
    /// Status code for the wrapped error
    pub fn status(&self) -> StatusCode {
        if !self.0.is_client_error() {
            StatusCode::BAD_GATEWAY
        } else if self.0.is_token_rejection() {
            StatusCode::FORBIDDEN
        } else {
            StatusCode::BAD_REQUEST
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(ReviewError::invalid_request(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router
pub fn router(authority: SharedAuthority, cors_permissive: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/request-review-token", post(request_token))
        .route("/submit-review", post(submit_review))
        .route("/reviews/:product_id", get(list_reviews))
        .with_state(authority)
        .layer(TraceLayer::new_for_http());

    if cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn health(State(authority): State<SharedAuthority>) -> Json<HealthResponse> {
    let stats = authority.stats();
    Json(HealthResponse {
        status: "ok".to_string(),
        issued_tokens: stats.issued,
        claimed_tokens: stats.claimed,
    })
}

async fn request_token(
    State(authority): State<SharedAuthority>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let Json(request) = payload?;
    let (Some(user_id), Some(product_id)) = (request.user_id, request.product_id) else {
        return Err(ReviewError::invalid_request("userId and productId are required").into());
    };
    let token = authority.issue_token(&user_id, &product_id)?;
    Ok(Json(TokenResponse {
        review_token: token.into(),
    }))
}

async fn submit_review(
    State(authority): State<SharedAuthority>,
    payload: Result<Json<SubmitReviewRequest>, JsonRejection>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let Json(request) = payload?;
    let token = request.review_token.as_deref();
    let Some(rating) = request.rating else {
        // Token presence is reported ahead of the rating.
        ReviewToken::from_client(token)?;
        return Err(ReviewError::invalid_request("rating is required").into());
    };
    let receipt = authority
        .submit_review(token, Rating(rating), request.comment.unwrap_or_default())
        .await?;
    Ok(Json(receipt))
}

async fn list_reviews(
    State(authority): State<SharedAuthority>,
    Path(product_id): Path<String>,
) -> Result<Json<Vec<Review>>, ApiError> {
    let reviews = authority.list_reviews(&product_id).await?;
    Ok(Json(reviews))
}
