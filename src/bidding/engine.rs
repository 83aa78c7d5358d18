//! 입찰 / 목록 계산 규칙
//!
//! 모든 함수는 이미 받아온 데이터에 대한 순수 함수이다. 원격 API 가 최종 권한을
//! 가지므로 여기의 검증은 사전 확인 용도이다.

// region:    --- Imports
use super::model::{Bid, Listing, Media};
use crate::auction::time::{format_date, format_end_date, format_time_remaining};
use crate::error::{BidError, PermissionDenied};
use crate::session::UserRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;

// endregion: --- Imports

// region:    --- Price
/// 현재 가격 = 최고 입찰 금액 (입찰이 없으면 0)
///
/// 입찰 순서와 무관하다.
pub fn compute_current_price(bids: &[Bid]) -> i64 {
    bids.iter().map(|b| b.amount).max().unwrap_or(0)
}

/// 가장 최근 입찰 (표시 전용)
///
/// 생성 시각이 같으면 입력 순서상 마지막 입찰을 반환한다.
pub fn most_recent_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().max_by_key(|b| b.created)
}

/// 최고 금액 입찰
pub fn top_bid(bids: &[Bid]) -> Option<&Bid> {
    bids.iter().max_by_key(|b| b.amount)
}

/// 다음 입찰 최소 금액
pub fn minimum_bid(current_price: i64) -> i64 {
    current_price + 1
}

/// 입찰 금액 검증
///
/// 정수가 아니면 `NotANumber`, 현재 가격 이하이면 `TooLow`,
/// 보유 크레딧을 넘으면 `InsufficientCredits`.
pub fn validate_bid_amount(
    candidate: &str,
    current_price: i64,
    bidder_credits: i64,
) -> Result<i64, BidError> {
    let amount = candidate
        .trim()
        .parse::<i64>()
        .map_err(|_| BidError::NotANumber)?;

    if amount <= current_price {
        return Err(BidError::TooLow { current_price });
    }
    if amount > bidder_credits {
        return Err(BidError::InsufficientCredits {
            credits: bidder_credits,
        });
    }
    Ok(amount)
}

// endregion: --- Price

// region:    --- Permission
/// 종료 시각 이전이면 진행 중 (종료 시각 자체는 종료로 취급)
pub fn is_active(listing: &Listing, now: DateTime<Utc>) -> bool {
    now < listing.ends_at
}

pub fn is_owner(listing: &Listing, user: Option<&UserRecord>) -> bool {
    match (user, listing.seller.as_ref()) {
        (Some(user), Some(seller)) => user.name == seller.name,
        _ => false,
    }
}

/// 입찰 가능 여부: 로그인 + 진행 중 + 본인 목록 아님
pub fn bid_permission(
    listing: &Listing,
    user: Option<&UserRecord>,
    now: DateTime<Utc>,
) -> Result<(), PermissionDenied> {
    if user.is_none() {
        return Err(PermissionDenied::NotAuthenticated);
    }
    if !is_active(listing, now) {
        return Err(PermissionDenied::AuctionEnded);
    }
    if is_owner(listing, user) {
        return Err(PermissionDenied::OwnListing);
    }
    Ok(())
}

/// 수정 / 삭제 가능 여부: 소유자 + 진행 중 (종료된 목록은 소유자도 변경 불가)
pub fn edit_permission(
    listing: &Listing,
    user: Option<&UserRecord>,
    now: DateTime<Utc>,
) -> Result<(), PermissionDenied> {
    if user.is_none() {
        return Err(PermissionDenied::NotAuthenticated);
    }
    if !is_owner(listing, user) {
        return Err(PermissionDenied::NotOwner);
    }
    if !is_active(listing, now) {
        return Err(PermissionDenied::AuctionEnded);
    }
    Ok(())
}

pub fn can_bid(listing: &Listing, user: Option<&UserRecord>, now: DateTime<Utc>) -> bool {
    bid_permission(listing, user, now).is_ok()
}

pub fn can_edit(listing: &Listing, user: Option<&UserRecord>, now: DateTime<Utc>) -> bool {
    edit_permission(listing, user, now).is_ok()
}

// endregion: --- Permission

// region:    --- Listing View
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BidView {
    pub bidder: Option<String>,
    pub amount: i64,
    pub created: DateTime<Utc>,
    pub created_label: String,
}

/// 화면 표시용 파생 필드가 포함된 목록
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub image: Option<Media>,
    pub media: Vec<Media>,
    pub tags: Vec<String>,
    pub seller: Option<String>,
    pub ends_at: DateTime<Utc>,
    pub ends_label: String,
    pub time_remaining: String,
    pub ended: bool,
    pub current_price: i64,
    pub minimum_bid: i64,
    pub bid_count: usize,
    pub top_bidder: Option<String>,
    pub recent_bidder: Option<String>,
    pub bids: Vec<BidView>,
    pub is_owner: bool,
    pub can_bid: bool,
    pub can_edit: bool,
}

impl ListingView {
    pub fn build(listing: &Listing, user: Option<&UserRecord>, now: DateTime<Utc>) -> Self {
        let current_price = compute_current_price(&listing.bids);
        let bidder_name = |bid: &Bid| bid.bidder.as_ref().map(|b| b.name.clone());

        // 입찰 이력은 금액 내림차순
        let mut bids: Vec<&Bid> = listing.bids.iter().collect();
        bids.sort_by(|a, b| b.amount.cmp(&a.amount));

        Self {
            id: listing.id.clone(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            image: listing.media.first().cloned(),
            media: listing.media.clone(),
            tags: listing.tags.clone(),
            seller: listing.seller.as_ref().map(|s| s.name.clone()),
            ends_at: listing.ends_at,
            ends_label: format_end_date(listing.ends_at),
            time_remaining: format_time_remaining(listing.ends_at, now),
            ended: !is_active(listing, now),
            current_price,
            minimum_bid: minimum_bid(current_price),
            bid_count: listing.bid_count(),
            top_bidder: top_bid(&listing.bids).and_then(bidder_name),
            recent_bidder: most_recent_bid(&listing.bids).and_then(bidder_name),
            bids: bids
                .into_iter()
                .map(|bid| BidView {
                    bidder: bidder_name(bid),
                    amount: bid.amount,
                    created: bid.created,
                    created_label: format_date(bid.created),
                })
                .collect(),
            is_owner: is_owner(listing, user),
            can_bid: can_bid(listing, user, now),
            can_edit: can_edit(listing, user, now),
        }
    }
}

// endregion: --- Listing View
