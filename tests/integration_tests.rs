use auction_client::api::ApiClient;
use auction_client::bidding::commands::{handle_create_listing, handle_place_bid, PlaceBidCommand};
use auction_client::bidding::engine::compute_current_price;
use auction_client::bidding::validation::ListingForm;
use auction_client::config::Config;
use auction_client::database::DatabaseManager;
use auction_client::error::{AppError, BidError, PermissionDenied, ValidationError};
use auction_client::handlers::{router, AppState};
use auction_client::session::store::{MemorySessionStore, SqliteSessionStore};
use auction_client::session::{SessionManager, UserRecord};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use tracing::info;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 트레이싱 초기화
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .without_time()
        .with_target(false)
        .with_test_writer()
        .try_init();
}

async fn signed_in(name: &str, credits: i64) -> SessionManager {
    let sessions = SessionManager::load(Arc::new(MemorySessionStore::new()))
        .await
        .expect("세션 로드 실패");
    sessions
        .start(
            format!("token-{name}"),
            UserRecord {
                name: name.into(),
                credits,
                ..UserRecord::default()
            },
        )
        .await
        .expect("세션 시작 실패");
    sessions
}

fn listing_json(ends_at: DateTime<Utc>, bids: Value) -> Value {
    json!({
        "id": "L",
        "title": "Vintage Lamp",
        "description": "Brass desk lamp",
        "tags": ["antique", "lighting"],
        "media": [],
        "created": "2024-01-01T00:00:00Z",
        "endsAt": ends_at.to_rfc3339(),
        "seller": {"name": "seller_s"},
        "bids": bids
    })
}

fn bid(amount: &str) -> PlaceBidCommand {
    PlaceBidCommand {
        listing_id: "L".into(),
        amount: amount.into(),
    }
}

/// 생성 -> 입찰 -> 낮은 입찰 / 크레딧 부족 -> 종료 후 입찰
#[tokio::test]
async fn test_listing_bid_lifecycle() {
    init_tracing();
    let server = MockServer::start().await;
    let client = ApiClient::with_base_url(&server.uri(), None).expect("클라이언트 생성 실패");

    let now = Utc::now();
    let ends_at = now + Duration::hours(1);

    Mock::given(method("POST"))
        .and(path("/auction/listings"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({ "data": listing_json(ends_at, json!([])) })),
        )
        .expect(1)
        .mount(&server)
        .await;
    // 첫 조회는 입찰 없음, 이후 조회는 B 의 입찰 포함
    Mock::given(method("GET"))
        .and(path("/auction/listings/L"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": listing_json(ends_at, json!([])) })),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auction/listings/L"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": listing_json(ends_at, json!([{
                "id": "b1",
                "amount": 50,
                "bidder": {"name": "bidder_b"},
                "created": now.to_rfc3339()
            }]))
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auction/listings/L/bids"))
        .and(body_json(json!({"amount": 50})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": "L"}})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auction/profiles/bidder_b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "bidder_b", "credits": 200}
        })))
        .mount(&server)
        .await;

    // 판매자 S 가 1 시간 뒤 종료되는 목록 생성
    let seller = signed_in("seller_s", 1000).await;
    let form = ListingForm {
        title: "Vintage Lamp".into(),
        description: "Brass desk lamp".into(),
        tags: "antique, lighting".into(),
        ends_at: Some(ends_at),
        ..ListingForm::default()
    };
    let listing = handle_create_listing(&client, &seller, &form, now)
        .await
        .expect("목록 생성 실패");
    assert_eq!(listing.id, "L");

    // B (200 크레딧) 가 50 입찰 -> 성공
    let bidder_b = signed_in("bidder_b", 200).await;
    let outcome = handle_place_bid(&client, &bidder_b, bid("50"), now)
        .await
        .expect("입찰 실패");
    assert_eq!(compute_current_price(&outcome.listing.bids), 50);
    info!("{:<12} --> 현재 가격: 50", "Test");

    // B 가 40 입찰 -> TooLow
    let err = handle_place_bid(&client, &bidder_b, bid("40"), now)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::Bid(BidError::TooLow { current_price: 50 }))
    ));

    // C (30 크레딧) 가 60 입찰 -> InsufficientCredits
    let bidder_c = signed_in("bidder_c", 30).await;
    let err = handle_place_bid(&client, &bidder_c, bid("60"), now)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Validation(ValidationError::Bid(BidError::InsufficientCredits { credits: 30 }))
    ));

    // 종료 시각 이후 -> PermissionDenied
    let later = ends_at + Duration::seconds(1);
    let err = handle_place_bid(&client, &bidder_c, bid("60"), later)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::Permission(PermissionDenied::AuctionEnded)
    ));
}

/// sqlite 저장소를 통한 세션 복원
#[tokio::test]
async fn test_session_survives_restart() {
    init_tracing();
    let db_manager = Arc::new(
        DatabaseManager::new("sqlite::memory:")
            .await
            .expect("DB 연결 실패"),
    );
    db_manager
        .initialize_database()
        .await
        .expect("DB 초기화 실패");

    let store = Arc::new(SqliteSessionStore::new(Arc::clone(&db_manager)));
    let sessions = SessionManager::load(store.clone()).await.expect("세션 로드 실패");
    sessions
        .start(
            "persisted".into(),
            UserRecord {
                name: "alice".into(),
                credits: 1000,
                ..UserRecord::default()
            },
        )
        .await
        .expect("세션 시작 실패");

    let restored = SessionManager::load(store).await.expect("세션 로드 실패");
    let session = restored.current().await.expect("세션 없음");
    assert_eq!(session.token, "persisted");
    assert_eq!(session.user.credits, 1000);
}

// region:    --- Http Surface

async fn app(server: &MockServer, sessions: SessionManager) -> axum::Router {
    let config = Config {
        api_base_url: server.uri(),
        ..Config::default()
    };
    let client = ApiClient::new(&config).expect("클라이언트 생성 실패");
    router(AppState::new(&config, client, Arc::new(sessions)))
}

async fn anonymous() -> SessionManager {
    SessionManager::load(Arc::new(MemorySessionStore::new()))
        .await
        .expect("세션 로드 실패")
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("요청 실패");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("본문 읽기 실패");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON 본문 아님")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("요청 생성 실패")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("요청 생성 실패")
}

#[tokio::test]
async fn test_listings_endpoint_builds_views_and_pagination() {
    init_tracing();
    let server = MockServer::start().await;
    let ends_at = Utc::now() + Duration::days(2);
    Mock::given(method("GET"))
        .and(path("/auction/listings"))
        .and(query_param("_active", "true"))
        .and(query_param("page", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [listing_json(ends_at, json!([
                {"id": "b1", "amount": 30, "bidder": {"name": "x"}, "created": "2024-01-02T00:00:00Z"},
                {"id": "b2", "amount": 45, "bidder": {"name": "y"}, "created": "2024-01-01T00:00:00Z"}
            ]))],
            "meta": {"pageCount": 10, "currentPage": 5}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server, anonymous().await).await;
    let (status, body) = send(app, get("/listings?sort=endsAt-asc&page=5&width=375")).await;

    assert_eq!(status, StatusCode::OK);
    let listing = &body["listings"][0];
    assert_eq!(listing["currentPrice"], 45);
    assert_eq!(listing["minimumBid"], 46);
    assert_eq!(listing["topBidder"], "y");
    assert_eq!(listing["recentBidder"], "x");
    assert_eq!(listing["canBid"], false);

    let pagination = &body["pagination"];
    assert_eq!(pagination["previous"], 4);
    assert_eq!(pagination["next"], 6);
    assert_eq!(pagination["slots"].as_array().map(Vec::len), Some(7));
    assert_eq!(pagination["slots"][0], json!({"kind": "boundary", "page": 1}));
    assert_eq!(pagination["slots"][1], json!({"kind": "ellipsis"}));
}

#[tokio::test]
async fn test_listings_page_past_end_shows_last_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auction/listings"))
        .and(query_param("page", "99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "meta": {"pageCount": 3}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = app(&server, anonymous().await).await;
    let (status, body) = send(app, get("/listings?page=99")).await;

    assert_eq!(status, StatusCode::OK);
    let pagination = &body["pagination"];
    assert_eq!(pagination["current"], 3);
    assert_eq!(pagination["previous"], 2);
    assert_eq!(pagination["next"], Value::Null);
    assert_eq!(
        pagination["slots"],
        json!([
            {"kind": "number", "page": 1},
            {"kind": "number", "page": 2},
            {"kind": "number", "page": 3}
        ])
    );
}

#[tokio::test]
async fn test_invalid_sort_is_bad_request() {
    let server = MockServer::start().await;
    let app = app(&server, anonymous().await).await;
    let (status, body) = send(app, get("/listings?sort=price-asc")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["fields"][0]["field"], "sort");
}

#[tokio::test]
async fn test_anonymous_bid_is_unauthorized() {
    let server = MockServer::start().await;
    let app = app(&server, anonymous().await).await;
    let (status, body) = send(app, post_json("/listings/L/bids", json!({"amount": 10}))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "NOT_AUTHENTICATED");
}

#[tokio::test]
async fn test_non_numeric_bid_is_bad_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auction/listings/L"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": listing_json(Utc::now() + Duration::hours(1), json!([]))
        })))
        .mount(&server)
        .await;

    let app = app(&server, signed_in("bidder_b", 200).await).await;
    let (status, body) = send(app, post_json("/listings/L/bids", json!({"amount": "abc"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_A_NUMBER");
}

#[tokio::test]
async fn test_login_then_session_reports_user() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "alice", "email": "alice@stud.noroff.no", "accessToken": "tok"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auction/profiles/alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "alice", "credits": 1000}
        })))
        .mount(&server)
        .await;

    let app = app(&server, anonymous().await).await;
    let (status, body) = send(
        app.clone(),
        post_json(
            "/auth/login",
            json!({"email": "alice@stud.noroff.no", "password": "password1"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["credits"], 1000);

    let (_, body) = send(app.clone(), get("/session")).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["name"], "alice");

    let (status, _) = send(app.clone(), post_json("/auth/logout", json!({}))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(app, get("/session")).await;
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_profile_tab_is_filtered_client_side() {
    let server = MockServer::start().await;
    let ends_at = Utc::now() + Duration::days(1);
    let mut chair = listing_json(ends_at, json!([]));
    chair["id"] = json!("C");
    chair["title"] = json!("Oak Chair");
    chair["tags"] = json!(["furniture"]);
    chair["seller"] = Value::Null;

    Mock::given(method("GET"))
        .and(path("/auction/profiles/seller_s"))
        .and(query_param("_listings", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "name": "seller_s",
                "credits": 500,
                "listings": [listing_json(ends_at, json!([])), chair],
                "wins": []
            }
        })))
        .mount(&server)
        .await;

    let app = app(&server, signed_in("seller_s", 500).await).await;
    let (status, body) = send(
        app.clone(),
        get("/profiles/seller_s?tab=listings&tag=FURN"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isOwn"], true);
    let listings = body["listings"].as_array().expect("목록 배열");
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["id"], "C");
    assert_eq!(listings[0]["seller"], "seller_s");
    assert_eq!(listings[0]["canEdit"], true);

    let (_, body) = send(app, get("/profiles/seller_s?tab=wins")).await;
    assert_eq!(body["listings"], json!([]));
}

#[tokio::test]
async fn test_browse_page_is_clamped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auction/listings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [listing_json(Utc::now() + Duration::days(1), json!([]))],
            "meta": {"pageCount": 3}
        })))
        .mount(&server)
        .await;

    let app = app(&server, anonymous().await).await;
    let (status, body) = send(
        app.clone(),
        post_json("/browse/sort", json!({"sort": "title-asc"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sort"], "title-asc");
    assert_eq!(body["pagination"]["total"], 3);

    let (_, body) = send(app, post_json("/browse/page", json!({"page": 9}))).await;
    assert_eq!(body["pagination"]["current"], 3);
    assert_eq!(body["pagination"]["next"], Value::Null);
}

// endregion: --- Http Surface
