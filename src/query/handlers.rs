// region:    --- Imports
use super::queries::{self, ListingQuery};
use crate::api::ApiClient;
use crate::bidding::model::{Bid, Listing, PageMeta, Profile};
use crate::error::Result;
use crate::session::Session;
use tracing::info;

// endregion: --- Imports

/// 한 페이지 분량의 목록
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub listings: Vec<Listing>,
    pub meta: PageMeta,
}

impl ListingPage {
    /// 전체 페이지 수 (메타데이터가 없으면 1)
    pub fn page_count(&self) -> u32 {
        self.meta.page_count.max(1)
    }
}

// region:    --- Query Handlers

/// 목록 검색 (서버 측 필터 / 정렬 / 페이지)
pub async fn get_listings(
    client: &ApiClient,
    query: &ListingQuery,
    session: Option<&Session>,
) -> Result<ListingPage> {
    info!("{:<12} --> 목록 조회: {:?}", "Query", query);
    let envelope = client
        .get::<Vec<Listing>>(queries::LISTINGS, &query.to_params(), session)
        .await?;
    Ok(ListingPage {
        listings: envelope.data,
        meta: envelope.meta.unwrap_or_default(),
    })
}

/// 목록 단건 조회 (판매자, 입찰 포함)
pub async fn get_listing(
    client: &ApiClient,
    listing_id: &str,
    session: Option<&Session>,
) -> Result<Listing> {
    info!("{:<12} --> 목록 조회 id: {}", "Query", listing_id);
    let params = queries::relations(&queries::LISTING_RELATIONS);
    let envelope = client
        .get::<Listing>(&queries::listing(listing_id), &params, session)
        .await?;
    Ok(envelope.data)
}

/// 프로필 조회 (목록, 낙찰 포함)
pub async fn get_profile(
    client: &ApiClient,
    name: &str,
    session: Option<&Session>,
) -> Result<Profile> {
    info!("{:<12} --> 프로필 조회 name: {}", "Query", name);
    let params = queries::relations(&queries::PROFILE_RELATIONS);
    let envelope = client
        .get::<Profile>(&queries::profile(name), &params, session)
        .await?;
    Ok(envelope.data)
}

/// 프로필 입찰 이력 조회 (입찰한 목록 포함)
pub async fn get_profile_bids(
    client: &ApiClient,
    name: &str,
    session: Option<&Session>,
) -> Result<Vec<Bid>> {
    info!("{:<12} --> 프로필 입찰 이력 조회 name: {}", "Query", name);
    let params = queries::relations(&queries::PROFILE_BID_RELATIONS);
    let envelope = client
        .get::<Vec<Bid>>(&queries::profile_bids(name), &params, session)
        .await?;
    Ok(envelope.data)
}

// endregion: --- Query Handlers
