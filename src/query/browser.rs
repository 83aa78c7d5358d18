//! 목록 페이지 상태
//!
//! 검색 입력은 [`Debouncer`] 로 대기 시간 뒤에 조회하고, 모든 조회는
//! [`RequestSequence`] 번호를 받아 가장 최근 요청의 응답만 반영한다.

// region:    --- Imports
use super::handlers::get_listings;
use super::pagination::Pagination;
use super::queries::{ListingQuery, Sort};
use crate::api::ApiClient;
use crate::bidding::model::Listing;
use crate::error::Result;
use crate::scheduler::{Debouncer, RequestSequence};
use crate::session::Session;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

// endregion: --- Imports

/// 화면에 반영된 목록 상태
#[derive(Debug, Clone, Default)]
pub struct BrowserState {
    pub query: ListingQuery,
    pub listings: Vec<Listing>,
    pub page_count: u32,
    pub error: Option<String>,
}

impl BrowserState {
    pub fn pagination(&self, window_size: u32) -> Pagination {
        Pagination::new(self.page_count, self.query.page, window_size)
    }
}

struct Shared {
    client: ApiClient,
    state: RwLock<BrowserState>,
    sequence: RequestSequence,
}

impl Shared {
    /// 조회 후 최신 요청이면 상태에 반영. 반영 여부를 돌려준다.
    async fn fetch(&self, query: ListingQuery, session: Option<&Session>) -> Result<bool> {
        let ticket = self.sequence.issue();
        let result = get_listings(&self.client, &query, session).await;

        if !self.sequence.is_latest(ticket) {
            debug!("{:<12} --> 오래된 응답 무시: {}", "Browser", ticket);
            return Ok(false);
        }

        let mut state = self.state.write().await;
        match result {
            Ok(page) => {
                state.page_count = page.page_count();
                state.listings = page.listings;
                state.query = query;
                state.error = None;
                Ok(true)
            }
            Err(e) => {
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// 현재 조건을 수정하고 복사본을 돌려줌
    async fn update_query(&self, f: impl FnOnce(&mut ListingQuery)) -> ListingQuery {
        let mut state = self.state.write().await;
        f(&mut state.query);
        state.query.clone()
    }
}

// region:    --- Listings Browser
pub struct ListingsBrowser {
    shared: Arc<Shared>,
    debouncer: Debouncer,
}

impl ListingsBrowser {
    pub fn new(client: ApiClient, page_size: u32, quiet_period: Duration) -> Self {
        let state = BrowserState {
            query: ListingQuery {
                limit: page_size,
                ..ListingQuery::default()
            },
            page_count: 1,
            ..BrowserState::default()
        };

        Self {
            shared: Arc::new(Shared {
                client,
                state: RwLock::new(state),
                sequence: RequestSequence::new(),
            }),
            debouncer: Debouncer::new(quiet_period),
        }
    }

    pub async fn snapshot(&self) -> BrowserState {
        self.shared.state.read().await.clone()
    }

    /// 현재 조건으로 다시 조회
    pub async fn load(&self, session: Option<&Session>) -> Result<bool> {
        let query = self.shared.state.read().await.query.clone();
        self.shared.fetch(query, session).await
    }

    /// 검색어 / 태그 입력 (대기 시간 뒤 1 페이지부터 조회)
    pub async fn search_input(
        &self,
        search: String,
        tag: String,
        session: Option<Session>,
    ) -> JoinHandle<()> {
        let query = self
            .shared
            .update_query(|q| {
                q.search = search;
                q.tag = tag;
                q.page = 1;
            })
            .await;

        let shared = Arc::clone(&self.shared);
        self.debouncer.call(async move {
            info!("{:<12} --> 검색 실행: {:?}", "Browser", query.tag_filter());
            if let Err(e) = shared.fetch(query, session.as_ref()).await {
                error!("{:<12} --> 검색 실패: {:?}", "Browser", e);
            }
        })
    }

    /// 정렬 변경 (즉시 1 페이지부터 조회)
    pub async fn set_sort(&self, sort: Sort, session: Option<&Session>) -> Result<bool> {
        self.debouncer.cancel();
        let query = self
            .shared
            .update_query(|q| {
                q.sort = sort;
                q.page = 1;
            })
            .await;
        self.shared.fetch(query, session).await
    }

    /// 페이지 이동 (`[1, page_count]` 범위로 보정)
    ///
    /// 대기 중인 검색 입력은 취소된다.
    pub async fn go_to_page(&self, page: u32, session: Option<&Session>) -> Result<bool> {
        self.debouncer.cancel();
        let page_count = self.shared.state.read().await.page_count.max(1);
        let page = page.clamp(1, page_count);
        let query = self.shared.update_query(|q| q.page = page).await;
        self.shared.fetch(query, session).await
    }

    /// 삭제된 목록을 현재 페이지에서 제거
    pub async fn remove_listing(&self, listing_id: &str) -> bool {
        let mut state = self.shared.state.write().await;
        let before = state.listings.len();
        state.listings.retain(|l| l.id != listing_id);
        before != state.listings.len()
    }

    /// 다시 조회한 목록으로 교체
    pub async fn replace_listing(&self, listing: Listing) -> bool {
        let mut state = self.shared.state.write().await;
        match state.listings.iter_mut().find(|l| l.id == listing.id) {
            Some(slot) => {
                *slot = listing;
                true
            }
            None => false,
        }
    }
}

// endregion: --- Listings Browser
