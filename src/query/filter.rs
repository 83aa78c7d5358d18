//! 클라이언트 측 검색 / 태그 필터
//!
//! 이미 받아온 목록에만 적용된다. 전체 검색은 서버 측 쿼리 파라미터
//! ([`super::queries::ListingQuery`])로 처리한다.

use crate::bidding::model::{Bid, Listing, Profile};
use serde::Deserialize;

/// 대소문자 구분 없는 부분 문자열 필터
///
/// (검색어가 비었거나 제목/설명에 포함) 그리고 (태그어가 비었거나 태그 중 하나에 포함)
pub fn filter_listings<'a>(
    listings: &'a [Listing],
    search_term: &str,
    tag_term: &str,
) -> Vec<&'a Listing> {
    let search = search_term.trim().to_lowercase();
    let tag = tag_term.trim().to_lowercase();

    listings
        .iter()
        .filter(|listing| matches_search(listing, &search) && matches_tag(listing, &tag))
        .collect()
}

fn matches_search(listing: &Listing, search: &str) -> bool {
    search.is_empty()
        || listing.title.to_lowercase().contains(search)
        || listing
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(search))
}

fn matches_tag(listing: &Listing, tag: &str) -> bool {
    tag.is_empty() || listing.tags.iter().any(|t| t.to_lowercase().contains(tag))
}

// region:    --- Profile Tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileTab {
    #[default]
    Listings,
    Bids,
    Wins,
}

/// 프로필 탭에 표시할 목록
///
/// 판매자 정보가 없는 목록은 프로필 소유자를 판매자로 채운다.
/// 입찰 탭은 입찰에 포함된 목록을 사용한다.
pub fn tab_listings(profile: &Profile, bids: &[Bid], tab: ProfileTab) -> Vec<Listing> {
    let with_seller = |listing: &Listing| {
        let mut listing = listing.clone();
        if listing.seller.is_none() {
            listing.seller = Some(profile.as_seller());
        }
        listing
    };

    match tab {
        ProfileTab::Listings => profile.listings.iter().map(with_seller).collect(),
        ProfileTab::Wins => profile.wins.iter().map(with_seller).collect(),
        ProfileTab::Bids => bids
            .iter()
            .filter_map(|bid| bid.listing.as_deref())
            .cloned()
            .collect(),
    }
}

// endregion: --- Profile Tabs

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bidding::model::ProfileRef;
    use chrono::{Duration, Utc};

    fn listing(id: &str, title: &str, description: Option<&str>, tags: &[&str]) -> Listing {
        Listing {
            id: id.into(),
            title: title.into(),
            description: description.map(str::to_string),
            media: vec![],
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created: Utc::now(),
            updated: None,
            ends_at: Utc::now() + Duration::days(1),
            seller: None,
            bids: vec![],
            count: None,
        }
    }

    fn ids(listings: Vec<&Listing>) -> Vec<&str> {
        listings.into_iter().map(|l| l.id.as_str()).collect()
    }

    #[test]
    fn vintage_lamp_matching() {
        let listings = vec![listing("lamp", "Vintage Lamp", None, &["antique", "lighting"])];
        assert_eq!(ids(filter_listings(&listings, "lamp", "")), vec!["lamp"]);
        assert_eq!(ids(filter_listings(&listings, "", "ANTIQUE")), vec!["lamp"]);
        assert!(filter_listings(&listings, "chair", "").is_empty());
    }

    #[test]
    fn search_checks_description_and_requires_both_terms() {
        let listings = vec![
            listing("a", "Desk", Some("Oak writing desk"), &["furniture"]),
            listing("b", "Chair", Some("Oak chair"), &["seating"]),
        ];
        assert_eq!(ids(filter_listings(&listings, "oak", "")), vec!["a", "b"]);
        assert_eq!(ids(filter_listings(&listings, "oak", "seat")), vec!["b"]);
        assert_eq!(ids(filter_listings(&listings, "  ", "  ")), vec!["a", "b"]);
    }

    #[test]
    fn tabs_fill_missing_seller_and_extract_bid_listings() {
        let profile = Profile {
            name: "alice".into(),
            email: None,
            bio: None,
            avatar: None,
            banner: None,
            credits: 100,
            listings: vec![listing("own", "Own", None, &[])],
            wins: vec![],
            count: None,
        };
        let mut bid_listing = listing("other", "Other", None, &[]);
        bid_listing.seller = Some(ProfileRef {
            name: "bob".into(),
            ..ProfileRef::default()
        });
        let bids = vec![
            Bid {
                id: "b1".into(),
                amount: 5,
                bidder: None,
                created: Utc::now(),
                listing: Some(Box::new(bid_listing)),
            },
            Bid {
                id: "b2".into(),
                amount: 6,
                bidder: None,
                created: Utc::now(),
                listing: None,
            },
        ];

        let own = tab_listings(&profile, &bids, ProfileTab::Listings);
        assert_eq!(own[0].seller.as_ref().unwrap().name, "alice");

        let bid_tab = tab_listings(&profile, &bids, ProfileTab::Bids);
        assert_eq!(bid_tab.len(), 1);
        assert_eq!(bid_tab[0].seller.as_ref().unwrap().name, "bob");

        assert!(tab_listings(&profile, &bids, ProfileTab::Wins).is_empty());
    }
}
