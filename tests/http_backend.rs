//! End-to-end tests of the HTTP client and the rule registry against an
//! in-process axum backend that mirrors the offers API.

#![allow(clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use offers_console::api::{HttpOffersClient, OffersApi};
use offers_console::domain::{Award, AwardId, EditSession, Offer, OfferDraft, OfferId};
use offers_console::error::{ApiError, RegistryError};
use offers_console::registry::RuleRegistry;

#[derive(Debug, Default)]
struct Backend {
    offers: Mutex<Vec<Offer>>,
    awards: Mutex<Vec<Award>>,
    next_id: AtomicI64,
    fail_lists: AtomicBool,
    garbage_lists: AtomicBool,
}

type Shared = Arc<Backend>;

async fn list_offers(State(backend): State<Shared>) -> Response {
    if backend.fail_lists.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "database unavailable"})),
        )
            .into_response();
    }
    if backend.garbage_lists.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>maintenance</html>").into_response();
    }
    Json(backend.offers.lock().await.clone()).into_response()
}

async fn create_offer(State(backend): State<Shared>, Json(draft): Json<OfferDraft>) -> Response {
    let id = backend.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    backend.offers.lock().await.push(Offer {
        id: OfferId::new(id),
        name: draft.name,
        min_stake: draft.min_stake,
        bonus_pct: draft.bonus_pct,
        active: draft.active,
        created_at: Utc::now(),
    });
    (StatusCode::CREATED, Json(serde_json::json!({"id": id}))).into_response()
}

async fn update_offer(
    State(backend): State<Shared>,
    Path(id): Path<i64>,
    Json(draft): Json<OfferDraft>,
) -> Response {
    let mut offers = backend.offers.lock().await;
    let Some(offer) = offers.iter_mut().find(|o| o.id.get() == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "offer not found"})),
        )
            .into_response();
    };
    offer.name = draft.name;
    offer.min_stake = draft.min_stake;
    offer.bonus_pct = draft.bonus_pct;
    offer.active = draft.active;
    Json(serde_json::json!({"ok": true})).into_response()
}

async fn list_awards(
    State(backend): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Vec<Award>> {
    let limit = params
        .get("limit")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(100);
    let awards = backend.awards.lock().await;
    Json(awards.iter().take(limit).cloned().collect())
}

async fn spawn_backend(backend: Shared) -> String {
    let Ok(listener) = TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };
    let app = Router::new()
        .route("/offers", get(list_offers).post(create_offer))
        .route("/offers/{id}", axum::routing::put(update_offer))
        .route("/awards", get(list_awards))
        .with_state(backend);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

async fn client() -> (Shared, HttpOffersClient) {
    let backend = Arc::new(Backend::default());
    let base = spawn_backend(Arc::clone(&backend)).await;
    (backend, HttpOffersClient::with_client(reqwest::Client::new(), &base))
}

fn award(n: usize) -> Award {
    Award {
        award_id: AwardId::new(uuid::Uuid::new_v4().to_string()),
        event_id: format!("ev-{n}"),
        user_id: format!("u-{n}"),
        offer_id: OfferId::new(1),
        stake: 10.0,
        bonus_amount: 1.0,
        ts: None,
        created_at: Some(Utc::now()),
    }
}

#[tokio::test]
async fn create_list_update_over_http() {
    let (_backend, client) = client().await;

    let created = client.create_offer(&OfferDraft::default()).await;
    let Ok(Some(id)) = created else {
        panic!("create should return the new id, got {created:?}");
    };

    let Ok(offers) = client.list_offers().await else {
        panic!("list should succeed");
    };
    assert_eq!(offers.len(), 1);
    assert_eq!(offers.first().map(|o| o.id), Some(id));

    let renamed = OfferDraft {
        name: "Renamed".to_string(),
        ..OfferDraft::default()
    };
    tokio_test::assert_ok!(client.update_offer(id, &renamed).await);

    let Ok(offers) = client.list_offers().await else {
        panic!("list should succeed");
    };
    assert_eq!(offers.first().map(|o| o.name.as_str()), Some("Renamed"));
}

#[tokio::test]
async fn update_of_missing_offer_reports_status() {
    let (_backend, client) = client().await;
    let result = client
        .update_offer(OfferId::new(404), &OfferDraft::default())
        .await;
    assert!(matches!(
        result,
        Err(ApiError::Status(status)) if status == reqwest::StatusCode::NOT_FOUND
    ));
}

#[tokio::test]
async fn undecodable_list_body_is_decode_error() {
    let (backend, client) = client().await;
    backend.garbage_lists.store(true, Ordering::SeqCst);
    assert!(matches!(
        client.list_offers().await,
        Err(ApiError::Decode(_))
    ));
}

#[tokio::test]
async fn recent_awards_respects_limit() {
    let (backend, client) = client().await;
    backend.awards.lock().await.extend((0..10).map(award));

    let Ok(awards) = client.recent_awards(3).await else {
        panic!("awards should load");
    };
    assert_eq!(awards.len(), 3);
    assert_eq!(awards.first().map(|a| a.event_id.as_str()), Some("ev-0"));
}

#[tokio::test]
async fn registry_creates_then_edits_through_backend() {
    let (_backend, client) = client().await;
    let registry = RuleRegistry::new(client);

    tokio_test::assert_ok!(registry.refresh().await);
    assert!(registry.offers().await.is_empty());

    tokio_test::assert_ok!(registry.submit().await);
    let offers = registry.offers().await;
    let Some(created) = offers.first() else {
        panic!("offer should be listed after create");
    };
    assert_eq!(created.name, OfferDraft::default().name);

    registry.begin_edit(created).await;
    registry
        .edit_draft(|draft| {
            draft.min_stake = 50.0;
            draft.active = false;
        })
        .await;
    tokio_test::assert_ok!(registry.submit().await);

    assert_eq!(registry.session().await, EditSession::new());
    let Some(updated) = registry.offer(created.id).await else {
        panic!("offer should still be listed");
    };
    assert!((updated.min_stake - 50.0).abs() < f64::EPSILON);
    assert!(!updated.active);
    assert_eq!(registry.offers().await.len(), 1);
}

#[tokio::test]
async fn registry_keeps_list_when_backend_fails() {
    let (backend, client) = client().await;
    let registry = RuleRegistry::new(client);
    tokio_test::assert_ok!(registry.submit().await);
    assert_eq!(registry.offers().await.len(), 1);

    backend.fail_lists.store(true, Ordering::SeqCst);
    let result = registry.refresh().await;

    assert!(matches!(result, Err(RegistryError::Fetch(ApiError::Status(_)))));
    assert_eq!(registry.offers().await.len(), 1);
    assert_eq!(
        registry.last_error_message().await.as_deref(),
        Some("Failed to load offers")
    );
}

#[tokio::test]
async fn registry_update_to_deleted_offer_keeps_draft() {
    let (backend, client) = client().await;
    let registry = RuleRegistry::new(client);
    tokio_test::assert_ok!(registry.submit().await);
    let Some(offer) = registry.offers().await.into_iter().next() else {
        panic!("offer should exist");
    };

    registry.begin_edit(&offer).await;
    registry
        .edit_draft(|draft| draft.name = "Keep me".to_string())
        .await;
    backend.offers.lock().await.clear();
    let before = registry.session().await;

    let result = registry.submit().await;

    assert!(matches!(result, Err(RegistryError::Update { id, .. }) if id == offer.id));
    assert_eq!(registry.session().await, before);
    assert_eq!(registry.draft().await.name, "Keep me");
}
