//! 페이지 번호 목록 계산
//!
//! 현재 페이지를 중심으로 창(window)을 배치하고, 창 밖의 첫/마지막 페이지와
//! 생략 표시를 덧붙인다. 현재 페이지가 `[1, total]` 밖이면 호출자 오류이며
//! 여기서 보정하지 않는다.

use serde::Serialize;

/// 좁은 화면 기준 너비 (px)
pub const COMPACT_BREAKPOINT_PX: u32 = 576;
/// 좁은 화면의 창 크기
pub const COMPACT_WINDOW: u32 = 3;
/// 기본 창 크기
pub const DEFAULT_WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "camelCase")]
pub enum PageSlot {
    Number(u32),
    Ellipsis,
    Boundary(u32),
}

/// 화면 너비에 따른 창 크기
pub fn window_size_for_viewport(width_px: u32) -> u32 {
    if width_px < COMPACT_BREAKPOINT_PX {
        COMPACT_WINDOW
    } else {
        DEFAULT_WINDOW
    }
}

/// 페이지 슬롯 계산
///
/// `start = max(1, current - floor(window / 2))`,
/// `end = min(total, start + window - 1)` 후 오른쪽이 잘렸으면 `start` 를 다시 맞춘다.
pub fn paginate(total_pages: u32, current_page: u32, window_size: u32) -> Vec<PageSlot> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let total = i64::from(total_pages);
    let current = i64::from(current_page);
    let window = i64::from(window_size.max(1));

    let mut start = (current - window / 2).max(1);
    let end = (start + window - 1).min(total);
    if end - start < window - 1 {
        start = (end - window + 1).max(1);
    }

    let mut slots = Vec::with_capacity((end - start + 5).max(0) as usize);

    if start > 1 {
        slots.push(PageSlot::Boundary(1));
        if start > 2 {
            slots.push(PageSlot::Ellipsis);
        }
    }

    for page in start..=end {
        slots.push(PageSlot::Number(page as u32));
    }

    if end < total {
        if end < total - 1 {
            slots.push(PageSlot::Ellipsis);
        }
        slots.push(PageSlot::Boundary(total_pages));
    }

    slots
}

/// 이전 / 다음 버튼과 페이지 슬롯
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current: u32,
    pub total: u32,
    pub previous: Option<u32>,
    pub next: Option<u32>,
    pub slots: Vec<PageSlot>,
}

impl Pagination {
    pub fn new(total_pages: u32, current_page: u32, window_size: u32) -> Self {
        Self {
            current: current_page,
            total: total_pages,
            previous: (current_page > 1).then(|| current_page - 1),
            next: (current_page < total_pages).then(|| current_page + 1),
            slots: paginate(total_pages, current_page, window_size),
        }
    }
}
