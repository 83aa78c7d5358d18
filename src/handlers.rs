// region:    --- Imports
use crate::api::ApiClient;
use crate::bidding::commands::{
    handle_create_listing, handle_delete_listing, handle_place_bid, handle_update_listing,
    handle_update_profile, PlaceBidCommand,
};
use crate::bidding::engine::ListingView;
use crate::bidding::model::{Listing, Profile};
use crate::bidding::validation::{ListingForm, ProfileForm, RegisterForm};
use crate::config::Config;
use crate::error::{FieldError, Result, ValidationError};
use crate::query::browser::{BrowserState, ListingsBrowser};
use crate::query::filter::{filter_listings, tab_listings, ProfileTab};
use crate::query::handlers::{get_listing, get_listings, get_profile, get_profile_bids};
use crate::query::pagination::{window_size_for_viewport, Pagination, DEFAULT_WINDOW};
use crate::query::queries::{ListingQuery, Sort};
use crate::session::auth::{login, logout, register, LoginForm};
use crate::session::{SessionManager, UserRecord};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

// endregion: --- Imports

// region:    --- State
#[derive(Clone)]
pub struct AppState {
    pub client: Arc<ApiClient>,
    pub sessions: Arc<SessionManager>,
    pub browser: Arc<ListingsBrowser>,
    pub page_size: u32,
}

impl AppState {
    pub fn new(config: &Config, client: ApiClient, sessions: Arc<SessionManager>) -> Self {
        let browser = ListingsBrowser::new(
            client.clone(),
            config.page_size,
            config.search_quiet_period,
        );
        Self {
            client: Arc::new(client),
            sessions,
            browser: Arc::new(browser),
            page_size: config.page_size,
        }
    }
}

/// 라우터 설정
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/listings", get(handle_get_listings).post(handle_create))
        .route(
            "/listings/:id",
            get(handle_get_listing)
                .put(handle_update)
                .delete(handle_delete),
        )
        .route("/listings/:id/bids", post(handle_bid))
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/logout", post(handle_logout))
        .route("/session", get(handle_get_session))
        .route(
            "/profiles/:name",
            get(handle_get_profile).put(handle_update_profile_request),
        )
        .route("/browse", get(handle_browse))
        .route("/browse/search", post(handle_browse_search))
        .route("/browse/sort", post(handle_browse_sort))
        .route("/browse/page", post(handle_browse_page))
        .with_state(state)
}

// endregion: --- State

// region:    --- Request Types
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ListingsParams {
    pub page: Option<u32>,
    pub sort: Option<String>,
    pub search: Option<String>,
    pub tag: Option<String>,
    /// 화면 너비 (px), 페이지 창 크기 결정
    pub width: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ProfileParams {
    pub tab: ProfileTab,
    pub search: String,
    pub tag: String,
}

/// 입찰 금액 (숫자 또는 입력 문자열)
#[derive(Debug, Deserialize)]
pub struct BidRequest {
    pub amount: Value,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct SearchRequest {
    pub search: String,
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct SortRequest {
    pub sort: String,
}

#[derive(Debug, Deserialize)]
pub struct PageRequest {
    pub page: u32,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ViewportParams {
    pub width: Option<u32>,
}

fn parse_sort(raw: &str) -> Result<Sort> {
    raw.parse::<Sort>()
        .map_err(|e| ValidationError::Form(vec![FieldError::new("sort", e)]).into())
}

fn window_size(width: Option<u32>) -> u32 {
    width.map(window_size_for_viewport).unwrap_or(DEFAULT_WINDOW)
}

fn raw_amount(amount: &Value) -> String {
    match amount {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn views(listings: &[Listing], user: Option<&UserRecord>) -> Vec<ListingView> {
    let now = Utc::now();
    listings
        .iter()
        .map(|l| ListingView::build(l, user, now))
        .collect()
}

fn session_json(user: Option<UserRecord>) -> Value {
    json!({ "authenticated": user.is_some(), "user": user })
}

fn browser_json(state: &BrowserState, user: Option<&UserRecord>, window: u32) -> Value {
    json!({
        "listings": views(&state.listings, user),
        "pagination": state.pagination(window),
        "sort": state.query.sort.to_string(),
        "search": state.query.search,
        "tag": state.query.tag,
        "error": state.error,
    })
}

// endregion: --- Request Types

// region:    --- Listing Handlers

/// 목록 검색
pub async fn handle_get_listings(
    State(state): State<AppState>,
    Query(params): Query<ListingsParams>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 목록 조회 요청: {:?}", "Handler", params);
    let session = state.sessions.current().await;

    let sort = match params.sort.as_deref() {
        Some(raw) => parse_sort(raw)?,
        None => Sort::default(),
    };
    let query = ListingQuery {
        limit: state.page_size,
        page: params.page.unwrap_or(1).max(1),
        sort,
        search: params.search.unwrap_or_default(),
        tag: params.tag.unwrap_or_default(),
    };

    let page = get_listings(&state.client, &query, session.as_ref()).await?;
    let user = session.as_ref().map(|s| &s.user);
    // 범위를 넘은 페이지 요청은 마지막 페이지로 표시
    let current = query.page.min(page.page_count());
    let pagination = Pagination::new(page.page_count(), current, window_size(params.width));

    Ok(Json(json!({
        "listings": views(&page.listings, user),
        "pagination": pagination,
    })))
}

/// 목록 단건 조회
pub async fn handle_get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ListingView>> {
    info!("{:<12} --> 목록 단건 조회 요청: {}", "Handler", id);
    let session = state.sessions.current().await;
    let listing = get_listing(&state.client, &id, session.as_ref()).await?;
    Ok(Json(ListingView::build(
        &listing,
        session.as_ref().map(|s| &s.user),
        Utc::now(),
    )))
}

/// 목록 생성
pub async fn handle_create(
    State(state): State<AppState>,
    Json(form): Json<ListingForm>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 목록 생성 요청", "Handler");
    let now = Utc::now();
    let listing = handle_create_listing(&state.client, &state.sessions, &form, now).await?;
    let user = state.sessions.current_user().await;
    Ok((
        StatusCode::CREATED,
        Json(ListingView::build(&listing, user.as_ref(), now)),
    ))
}

/// 목록 수정
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(form): Json<ListingForm>,
) -> Result<Json<ListingView>> {
    info!("{:<12} --> 목록 수정 요청: {}", "Handler", id);
    let now = Utc::now();
    let listing = handle_update_listing(&state.client, &state.sessions, &id, &form, now).await?;
    state.browser.replace_listing(listing.clone()).await;

    let user = state.sessions.current_user().await;
    Ok(Json(ListingView::build(&listing, user.as_ref(), now)))
}

/// 목록 삭제
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    info!("{:<12} --> 목록 삭제 요청: {}", "Handler", id);
    handle_delete_listing(&state.client, &state.sessions, &id, Utc::now()).await?;
    state.browser.remove_listing(&id).await;
    Ok(StatusCode::NO_CONTENT)
}

/// 입찰
pub async fn handle_bid(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<BidRequest>,
) -> Result<Json<Value>> {
    let cmd = PlaceBidCommand {
        listing_id: id,
        amount: raw_amount(&body.amount),
    };
    info!("{:<12} --> 입찰 요청: {:?}", "Handler", cmd);

    let now = Utc::now();
    let outcome = handle_place_bid(&state.client, &state.sessions, cmd, now).await?;
    if !outcome.stale {
        state.browser.replace_listing(outcome.listing.clone()).await;
    }

    let view = ListingView::build(&outcome.listing, outcome.user.as_ref(), now);
    Ok(Json(json!({
        "message": "입찰이 성공적으로 처리되었습니다.",
        "bidAmount": outcome.amount,
        "currentPrice": view.current_price,
        "credits": outcome.user.as_ref().map(|u| u.credits),
        "listing": view,
        "stale": outcome.stale,
    })))
}

// endregion: --- Listing Handlers

// region:    --- Auth Handlers

pub async fn handle_register(
    State(state): State<AppState>,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse> {
    info!("{:<12} --> 회원가입 요청: {}", "Handler", form.name);
    let profile = register(&state.client, &form).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

pub async fn handle_login(
    State(state): State<AppState>,
    Json(form): Json<LoginForm>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 로그인 요청: {}", "Handler", form.email);
    let session = login(&state.client, &state.sessions, &form).await?;
    Ok(Json(session_json(Some(session.user))))
}

pub async fn handle_logout(State(state): State<AppState>) -> Result<StatusCode> {
    info!("{:<12} --> 로그아웃 요청", "Handler");
    logout(&state.sessions).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn handle_get_session(State(state): State<AppState>) -> Json<Value> {
    Json(session_json(state.sessions.current_user().await))
}

// endregion: --- Auth Handlers

// region:    --- Profile Handlers

/// 프로필 조회 (탭 + 클라이언트 측 필터)
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ProfileParams>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 프로필 조회 요청: {} {:?}", "Handler", name, params);
    let session = state.sessions.current().await;

    let profile: Profile = get_profile(&state.client, &name, session.as_ref()).await?;
    let bids = match params.tab {
        ProfileTab::Bids => get_profile_bids(&state.client, &name, session.as_ref()).await?,
        _ => Vec::new(),
    };

    let source = tab_listings(&profile, &bids, params.tab);
    let filtered: Vec<Listing> = filter_listings(&source, &params.search, &params.tag)
        .into_iter()
        .cloned()
        .collect();

    let user = session.as_ref().map(|s| &s.user);
    let is_own = user.is_some_and(|u| u.name == profile.name);

    Ok(Json(json!({
        "profile": {
            "name": profile.name,
            "email": profile.email,
            "bio": profile.bio,
            "avatar": profile.avatar,
            "banner": profile.banner,
            "credits": profile.credits,
            "count": profile.count,
        },
        "isOwn": is_own,
        "listings": views(&filtered, user),
    })))
}

/// 프로필 수정
pub async fn handle_update_profile_request(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(form): Json<ProfileForm>,
) -> Result<Json<UserRecord>> {
    info!("{:<12} --> 프로필 수정 요청: {}", "Handler", name);
    let user = handle_update_profile(&state.client, &state.sessions, &name, &form).await?;
    Ok(Json(user))
}

// endregion: --- Profile Handlers

// region:    --- Browse Handlers

/// 목록 페이지 상태 조회
pub async fn handle_browse(
    State(state): State<AppState>,
    Query(params): Query<ViewportParams>,
) -> Json<Value> {
    let snapshot = state.browser.snapshot().await;
    let user = state.sessions.current_user().await;
    Json(browser_json(&snapshot, user.as_ref(), window_size(params.width)))
}

/// 검색어 입력 (대기 시간 뒤 조회)
pub async fn handle_browse_search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> StatusCode {
    info!("{:<12} --> 검색 입력: {:?}", "Handler", body);
    let session = state.sessions.current().await;
    // 조회는 대기 시간 뒤 백그라운드에서 실행
    let _pending = state
        .browser
        .search_input(body.search, body.tag, session)
        .await;
    StatusCode::ACCEPTED
}

/// 정렬 변경
pub async fn handle_browse_sort(
    State(state): State<AppState>,
    Query(params): Query<ViewportParams>,
    Json(body): Json<SortRequest>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 정렬 변경: {}", "Handler", body.sort);
    let sort = parse_sort(&body.sort)?;
    let session = state.sessions.current().await;
    state.browser.set_sort(sort, session.as_ref()).await?;
    Ok(handle_browse(State(state), Query(params)).await)
}

/// 페이지 이동
pub async fn handle_browse_page(
    State(state): State<AppState>,
    Query(params): Query<ViewportParams>,
    Json(body): Json<PageRequest>,
) -> Result<Json<Value>> {
    info!("{:<12} --> 페이지 이동: {}", "Handler", body.page);
    let session = state.sessions.current().await;
    state.browser.go_to_page(body.page, session.as_ref()).await?;
    Ok(handle_browse(State(state), Query(params)).await)
}

// endregion: --- Browse Handlers
