//! HttpLedgerHandler against a local stand-in gateway

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use review_core::{
    LedgerError, LedgerReadEffects, LedgerUint, LedgerWriteEffects, ProductId, Rating,
    ReviewSubmission, UserId,
};
use review_effects::HttpLedgerHandler;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

type Received = Arc<Mutex<Vec<Value>>>;

async fn record_review(State(received): State<Received>, Json(body): Json<Value>) -> StatusCode {
    received.lock().unwrap().push(body);
    StatusCode::OK
}

async fn reviews_for(Path(product_id): Path<String>) -> Json<Value> {
    if product_id == "Product-A" {
        Json(json!([
            {
                "userId": "alice",
                "productId": "Product-A",
                "rating": 5,
                "comment": "great",
                "timestamp": "340282366920938463463374607431768211455"
            }
        ]))
    } else {
        Json(json!([]))
    }
}

async fn spawn_gateway(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/ledger")
}

fn submission() -> ReviewSubmission {
    ReviewSubmission {
        user_id: UserId::new("alice").unwrap(),
        product_id: ProductId::new("Product-A").unwrap(),
        rating: Rating(5),
        comment: "great".to_string(),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn posts_camel_case_submission() {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/ledger/reviews", post(record_review))
        .with_state(received.clone());
    let endpoint = spawn_gateway(app).await;
    let ledger = HttpLedgerHandler::new(&endpoint, Duration::from_secs(5)).unwrap();

    ledger.add_review(&submission()).await.unwrap();

    let received = received.lock().unwrap().clone();
    assert_eq!(
        received,
        vec![json!({
            "userId": "alice",
            "productId": "Product-A",
            "rating": 5,
            "comment": "great"
        })]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn reads_wide_integers_without_loss() {
    let app = Router::new().route("/ledger/reviews/:product_id", get(reviews_for));
    let endpoint = spawn_gateway(app).await;
    let ledger = HttpLedgerHandler::new(&endpoint, Duration::from_secs(5)).unwrap();

    let product = ProductId::new("Product-A").unwrap();
    let reviews = ledger.reviews_by_product(&product).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].rating, LedgerUint(5));
    assert_eq!(reviews[0].timestamp, LedgerUint(u128::MAX));

    let other = ProductId::new("Product-B").unwrap();
    assert!(ledger.reviews_by_product(&other).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn gateway_errors_become_rejections() {
    let app = Router::new().route(
        "/ledger/reviews",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "execution reverted") }),
    );
    let endpoint = spawn_gateway(app).await;
    let ledger = HttpLedgerHandler::new(&endpoint, Duration::from_secs(5)).unwrap();

    let err = ledger.add_review(&submission()).await.unwrap_err();
    assert_eq!(
        err,
        LedgerError::Rejected {
            status: Some(500),
            message: "execution reverted".to_string()
        }
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn undecodable_payload_is_malformed() {
    let app = Router::new().route(
        "/ledger/reviews/:product_id",
        get(|| async { Json(json!({ "not": "an array" })) }),
    );
    let endpoint = spawn_gateway(app).await;
    let ledger = HttpLedgerHandler::new(&endpoint, Duration::from_secs(5)).unwrap();

    let product = ProductId::new("Product-A").unwrap();
    let err = ledger.reviews_by_product(&product).await.unwrap_err();
    assert!(matches!(err, LedgerError::Malformed { .. }));
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_gateway_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let ledger =
        HttpLedgerHandler::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = ledger.add_review(&submission()).await.unwrap_err();
    assert!(matches!(err, LedgerError::Unavailable { .. }));
}
