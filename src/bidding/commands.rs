/// 목록 / 입찰 / 프로필 변경 커맨드 처리
/// 1. 입찰
/// 2. 목록 생성 / 수정 / 삭제
/// 3. 프로필 수정
///
/// 변경이 성공하면 영향을 받은 항목만 다시 조회한다.
// region:    --- Imports
use super::engine::{bid_permission, compute_current_price, edit_permission, validate_bid_amount};
use super::model::{Listing, Profile};
use super::validation::{ListingForm, ProfileForm};
use crate::api::ApiClient;
use crate::error::{AppError, BidError, PermissionDenied, Result};
use crate::query::handlers::get_listing;
use crate::query::queries;
use crate::session::auth::refresh_user;
use crate::session::{Session, SessionManager, UserRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Commands
/// 입찰 명령 (금액은 입력된 문자열 그대로)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PlaceBidCommand {
    pub listing_id: String,
    pub amount: String,
}

#[derive(Debug, Serialize)]
struct BidBody {
    amount: i64,
}

/// 입찰 결과 (다시 조회한 목록과 갱신된 사용자 정보)
///
/// 입찰 이후 재조회가 실패하면 `stale` 이 true 이고 `listing` 은 입찰 전 상태다.
#[derive(Debug, Clone)]
pub struct BidOutcome {
    pub amount: i64,
    pub listing: Listing,
    pub user: Option<UserRecord>,
    pub stale: bool,
}

async fn require_session(sessions: &SessionManager) -> Result<Session> {
    sessions
        .current()
        .await
        .ok_or(AppError::Permission(PermissionDenied::NotAuthenticated))
}

/// API 의 4xx 입찰 거절은 로컬 검증 실패와 같은 경로로 전달
fn bid_rejection(e: AppError) -> AppError {
    match e {
        AppError::ApiRejection { status, message }
            if (400..500).contains(&status) && status != 401 && status != 403 =>
        {
            BidError::Rejected { message }.into()
        }
        other => other,
    }
}

// endregion: --- Commands

// region:    --- Bid
/// 1. 입찰
pub async fn handle_place_bid(
    client: &ApiClient,
    sessions: &SessionManager,
    cmd: PlaceBidCommand,
    now: DateTime<Utc>,
) -> Result<BidOutcome> {
    info!("{:<12} --> 입찰 요청 처리 시작: {:?}", "Command", cmd);
    let session = require_session(sessions).await?;

    let listing = get_listing(client, &cmd.listing_id, Some(&session)).await?;
    bid_permission(&listing, Some(&session.user), now)?;

    let current_price = compute_current_price(&listing.bids);
    let amount = validate_bid_amount(&cmd.amount, current_price, session.user.credits)
        .inspect_err(|e| warn!("{:<12} --> 입찰 검증 실패: {}", "Command", e))?;

    client
        .post::<_, serde_json::Value>(
            &queries::listing_bids(&listing.id),
            &BidBody { amount },
            Some(&session),
        )
        .await
        .map_err(bid_rejection)?;
    info!(
        "{:<12} --> 입찰 성공: listing={}, amount={}",
        "Command", listing.id, amount
    );

    // 입찰은 이미 반영됨. 재조회 실패로 결과를 실패 처리하지 않는다.
    let (listing, stale) = match get_listing(client, &listing.id, Some(&session)).await {
        Ok(refreshed) => (refreshed, false),
        Err(e) => {
            warn!("{:<12} --> 입찰 후 목록 재조회 실패: {:?}", "Command", e);
            (listing, true)
        }
    };
    let user = match refresh_user(client, sessions).await {
        Ok(user) => user,
        Err(e) => {
            warn!("{:<12} --> 입찰 후 사용자 갱신 실패: {:?}", "Command", e);
            sessions.current_user().await
        }
    };

    Ok(BidOutcome {
        amount,
        listing,
        user,
        stale,
    })
}

// endregion: --- Bid

// region:    --- Listing
/// 2. 목록 생성
pub async fn handle_create_listing(
    client: &ApiClient,
    sessions: &SessionManager,
    form: &ListingForm,
    now: DateTime<Utc>,
) -> Result<Listing> {
    info!("{:<12} --> 목록 생성 요청: {}", "Command", form.title);
    let session = require_session(sessions).await?;
    let request = form.into_create_request(now)?;

    let envelope = client
        .post::<_, Listing>(queries::LISTINGS, &request, Some(&session))
        .await?;
    info!("{:<12} --> 목록 생성 완료: {}", "Command", envelope.data.id);
    Ok(envelope.data)
}

/// 목록 수정 (소유자, 진행 중인 경매만)
pub async fn handle_update_listing(
    client: &ApiClient,
    sessions: &SessionManager,
    listing_id: &str,
    form: &ListingForm,
    now: DateTime<Utc>,
) -> Result<Listing> {
    info!("{:<12} --> 목록 수정 요청: {}", "Command", listing_id);
    let session = require_session(sessions).await?;

    let listing = get_listing(client, listing_id, Some(&session)).await?;
    edit_permission(&listing, Some(&session.user), now)?;
    let request = form.into_update_request()?;

    client
        .put::<_, serde_json::Value>(&queries::listing(listing_id), &request, Some(&session))
        .await?;

    get_listing(client, listing_id, Some(&session)).await
}

/// 목록 삭제 (소유자, 진행 중인 경매만)
pub async fn handle_delete_listing(
    client: &ApiClient,
    sessions: &SessionManager,
    listing_id: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    info!("{:<12} --> 목록 삭제 요청: {}", "Command", listing_id);
    let session = require_session(sessions).await?;

    let listing = get_listing(client, listing_id, Some(&session)).await?;
    edit_permission(&listing, Some(&session.user), now)?;

    client
        .delete(&queries::listing(listing_id), Some(&session))
        .await?;
    info!("{:<12} --> 목록 삭제 완료: {}", "Command", listing_id);
    Ok(())
}

// endregion: --- Listing

// region:    --- Profile
/// 3. 프로필 수정 (본인 프로필만)
pub async fn handle_update_profile(
    client: &ApiClient,
    sessions: &SessionManager,
    name: &str,
    form: &ProfileForm,
) -> Result<UserRecord> {
    info!("{:<12} --> 프로필 수정 요청: {}", "Command", name);
    let session = require_session(sessions).await?;
    if session.user.name != name {
        return Err(PermissionDenied::NotOwner.into());
    }
    let update = form.into_update()?;

    let envelope = client
        .put::<_, Profile>(&queries::profile(name), &update, Some(&session))
        .await?;

    let mut user = session.user;
    user.refresh_from(&envelope.data);
    let updated = sessions.update_user(user.clone()).await?;
    Ok(updated.map(|s| s.user).unwrap_or(user))
}

// endregion: --- Profile
