use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::form_urlencoded;

/// 회원가입
pub const AUTH_REGISTER: &str = "/auth/register";

/// 로그인
pub const AUTH_LOGIN: &str = "/auth/login";

/// 경매 목록
pub const LISTINGS: &str = "/auction/listings";

/// 목록 조회 시 함께 받는 관계 (판매자, 입찰)
pub const LISTING_RELATIONS: [(&str, &str); 2] = [("_seller", "true"), ("_bids", "true")];

/// 프로필 조회 시 함께 받는 관계
pub const PROFILE_RELATIONS: [(&str, &str); 4] = [
    ("_listings", "true"),
    ("_wins", "true"),
    ("_seller", "true"),
    ("_bids", "true"),
];

/// 프로필 입찰 조회 시 함께 받는 관계
pub const PROFILE_BID_RELATIONS: [(&str, &str); 1] = [("_listings", "true")];

/// 경로 세그먼트 인코딩 (`/`, `?`, `#` 등이 경로를 바꾸지 않도록)
fn segment(raw: &str) -> String {
    // 공백은 경로에서 `+` 가 아니라 `%20`
    form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// 단일 목록
pub fn listing(id: &str) -> String {
    format!("{LISTINGS}/{}", segment(id))
}

/// 목록 입찰
pub fn listing_bids(id: &str) -> String {
    format!("{LISTINGS}/{}/bids", segment(id))
}

/// 프로필
pub fn profile(name: &str) -> String {
    format!("/auction/profiles/{}", segment(name))
}

/// 프로필 입찰 이력
pub fn profile_bids(name: &str) -> String {
    format!("/auction/profiles/{}/bids", segment(name))
}

/// 관계 목록을 쿼리 파라미터로 변환
pub fn relations(pairs: &[(&'static str, &'static str)]) -> Vec<(&'static str, String)> {
    pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
}

// region:    --- Sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Created,
    EndsAt,
    Title,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Created => "created",
            SortField::EndsAt => "endsAt",
            SortField::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// 정렬 기준 (`"<field>-<order>"` 형태, 예: `endsAt-asc`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl FromStr for Sort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, order) = s.split_once('-').unwrap_or((s, "desc"));
        let field = match field {
            "created" => SortField::Created,
            "endsAt" => SortField::EndsAt,
            "title" => SortField::Title,
            other => return Err(format!("알 수 없는 정렬 기준: {other}")),
        };
        let order = match order {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            other => return Err(format!("알 수 없는 정렬 방향: {other}")),
        };
        Ok(Sort { field, order })
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.field.as_str(), self.order.as_str())
    }
}

// endregion: --- Sort

// region:    --- Listing Query
/// 서버 측 목록 검색 조건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    pub limit: u32,
    pub page: u32,
    pub sort: Sort,
    pub search: String,
    pub tag: String,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            limit: crate::config::PAGE_SIZE,
            page: 1,
            sort: Sort::default(),
            search: String::new(),
            tag: String::new(),
        }
    }
}

impl ListingQuery {
    /// 종료 시간 정렬일 때만 진행 중인 경매로 제한
    pub fn active_only(&self) -> bool {
        self.sort.field == SortField::EndsAt
    }

    /// 서버 측 필터 값 (태그가 우선, 없으면 검색어)
    pub fn tag_filter(&self) -> Option<&str> {
        let tag = self.tag.trim();
        let search = self.search.trim();
        if !tag.is_empty() {
            Some(tag)
        } else if !search.is_empty() {
            Some(search)
        } else {
            None
        }
    }

    /// 쿼리 파라미터 생성
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("limit", self.limit.to_string()),
            ("page", self.page.to_string()),
            ("sort", self.sort.field.as_str().to_string()),
            ("sortOrder", self.sort.order.as_str().to_string()),
        ];
        params.extend(relations(&LISTING_RELATIONS));
        if let Some(tag) = self.tag_filter() {
            params.push(("_tag", tag.to_string()));
        }
        if self.active_only() {
            params.push(("_active", "true".to_string()));
        }
        params
    }
}

// endregion: --- Listing Query
