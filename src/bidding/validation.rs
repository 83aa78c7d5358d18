//! 입력 폼 검증
//!
//! 모든 필드를 검사한 뒤 실패한 필드를 한 번에 돌려준다.

// region:    --- Imports
use super::model::{ListingRequest, Media, ProfileUpdate};
use crate::error::{FieldError, ValidationError};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

// endregion: --- Imports

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@stud\.noroff\.no$").expect("valid email regex"));

static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("valid name regex"));

/// 최소 비밀번호 길이
pub const MIN_PASSWORD_LEN: usize = 8;

// region:    --- Field Checks
pub fn validate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// 절대 URL 여부
pub fn validate_url(value: &str) -> bool {
    url::Url::parse(value.trim()).is_ok()
}

/// 미래 시각 여부
pub fn validate_date(value: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    value > now
}

pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn validate_password(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LEN
}

pub fn validate_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// 쉼표로 구분된 태그 파싱 (공백 제거, 빈 항목 제외)
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn finish<T>(value: T, errors: Vec<FieldError>) -> Result<T, ValidationError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(ValidationError::Form(errors))
    }
}

// endregion: --- Field Checks

// region:    --- Listing Form
/// 목록 생성 / 수정 폼 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    /// 쉼표로 구분된 태그
    pub tags: String,
    pub media_urls: Vec<String>,
    pub ends_at: Option<DateTime<Utc>>,
}

impl ListingForm {
    fn common_checks(&self) -> (Vec<FieldError>, Vec<String>) {
        let mut errors = Vec::new();

        if !validate_required(&self.title) {
            errors.push(FieldError::new("title", "제목은 필수입니다."));
        }
        if !validate_required(&self.description) {
            errors.push(FieldError::new("description", "설명은 필수입니다."));
        }

        let urls: Vec<String> = self
            .media_urls
            .iter()
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .collect();
        if urls.iter().any(|u| !validate_url(u)) {
            errors.push(FieldError::new("media", "모든 미디어 URL 은 올바른 주소여야 합니다."));
        }

        (errors, urls)
    }

    fn build(&self, urls: Vec<String>, ends_at: Option<DateTime<Utc>>) -> ListingRequest {
        let title = self.title.trim().to_string();
        let media: Vec<Media> = urls
            .into_iter()
            .map(|url| Media {
                url,
                alt: title.clone(),
            })
            .collect();

        ListingRequest {
            description: self.description.trim().to_string(),
            tags: parse_tags(&self.tags),
            media: (!media.is_empty()).then_some(media),
            ends_at,
            title,
        }
    }

    /// 생성 요청으로 변환 (종료 시각 필수, 미래여야 함)
    pub fn into_create_request(&self, now: DateTime<Utc>) -> Result<ListingRequest, ValidationError> {
        let (mut errors, urls) = self.common_checks();

        match self.ends_at {
            None => errors.push(FieldError::new("endsAt", "경매 종료 시간은 필수입니다.")),
            Some(ends_at) if !validate_date(ends_at, now) => {
                errors.push(FieldError::new("endsAt", "경매 종료 시간은 미래여야 합니다."))
            }
            Some(_) => {}
        }

        let request = self.build(urls, self.ends_at);
        finish(request, errors)
    }

    /// 수정 요청으로 변환 (종료 시각은 변경하지 않음)
    pub fn into_update_request(&self) -> Result<ListingRequest, ValidationError> {
        let (errors, urls) = self.common_checks();
        let request = self.build(urls, None);
        finish(request, errors)
    }
}

// endregion: --- Listing Form

// region:    --- Profile Form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    pub bio: String,
    pub avatar_url: String,
    pub banner_url: String,
}

impl ProfileForm {
    /// 빈 값은 요청에서 제외
    pub fn into_update(&self) -> Result<ProfileUpdate, ValidationError> {
        let mut errors = Vec::new();
        let avatar_url = self.avatar_url.trim();
        let banner_url = self.banner_url.trim();

        if !avatar_url.is_empty() && !validate_url(avatar_url) {
            errors.push(FieldError::new("avatarUrl", "아바타 URL 이 올바르지 않습니다."));
        }
        if !banner_url.is_empty() && !validate_url(banner_url) {
            errors.push(FieldError::new("bannerUrl", "배너 URL 이 올바르지 않습니다."));
        }

        let update = ProfileUpdate {
            bio: validate_required(&self.bio).then(|| self.bio.trim().to_string()),
            avatar: (!avatar_url.is_empty()).then(|| Media {
                url: avatar_url.to_string(),
                alt: "User avatar".to_string(),
            }),
            banner: (!banner_url.is_empty()).then(|| Media {
                url: banner_url.to_string(),
                alt: "Profile banner".to_string(),
            }),
        };
        finish(update, errors)
    }
}

// endregion: --- Profile Form

// region:    --- Register Form
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();
        if !validate_name(self.name.trim()) {
            errors.push(FieldError::new(
                "name",
                "이름은 영문, 숫자, 밑줄(_)만 사용할 수 있습니다.",
            ));
        }
        if !validate_email(self.email.trim()) {
            errors.push(FieldError::new(
                "email",
                "이메일은 stud.noroff.no 주소여야 합니다.",
            ));
        }
        if !validate_password(&self.password) {
            errors.push(FieldError::new(
                "password",
                format!("비밀번호는 최소 {MIN_PASSWORD_LEN}자 이상이어야 합니다."),
            ));
        }
        finish((), errors)
    }
}

// endregion: --- Register Form
