use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// 미디어 (이미지 url + 대체 텍스트)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Media {
    pub url: String,
    #[serde(default)]
    pub alt: String,
}

// 판매자 / 입찰자 참조
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct ProfileRef {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub banner: Option<Media>,
}

// 입찰 모델
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Bid {
    pub id: String,
    pub amount: i64,
    #[serde(default)]
    pub bidder: Option<ProfileRef>,
    pub created: DateTime<Utc>,
    // 프로필 입찰 목록 조회 시에만 포함 (_listings=true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<Box<Listing>>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ListingCount {
    #[serde(default)]
    pub bids: u32,
}

// 상품(경매 목록) 모델
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub seller: Option<ProfileRef>,
    #[serde(default)]
    pub bids: Vec<Bid>,
    #[serde(rename = "_count", default)]
    pub count: Option<ListingCount>,
}

impl Listing {
    /// 입찰 수 (_count 가 없으면 입찰 목록 길이)
    pub fn bid_count(&self) -> usize {
        self.count
            .as_ref()
            .map(|c| c.bids as usize)
            .unwrap_or(self.bids.len())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ProfileCount {
    #[serde(default)]
    pub listings: u32,
    #[serde(default)]
    pub wins: u32,
}

// 사용자 프로필 모델
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Profile {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub banner: Option<Media>,
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[serde(default)]
    pub wins: Vec<Listing>,
    #[serde(rename = "_count", default)]
    pub count: Option<ProfileCount>,
}

impl Profile {
    /// 목록에 판매자 정보가 없을 때 사용할 참조
    pub fn as_seller(&self) -> ProfileRef {
        ProfileRef {
            name: self.name.clone(),
            email: self.email.clone(),
            bio: self.bio.clone(),
            avatar: self.avatar.clone(),
            banner: self.banner.clone(),
        }
    }
}

// 페이지 메타데이터
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    #[serde(default)]
    pub is_first_page: bool,
    #[serde(default)]
    pub is_last_page: bool,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub previous_page: Option<u32>,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub total_count: u32,
}

// 목록 생성 / 수정 요청 본문
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingRequest {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<Media>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<DateTime<Utc>>,
}

// 프로필 수정 요청 본문
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Media>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<Media>,
}
