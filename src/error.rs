// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

// endregion: --- Imports

// region:    --- Error Types
/// 입찰 금액 검증 실패
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BidError {
    #[error("입찰 금액은 정수여야 합니다.")]
    NotANumber,

    #[error("입찰 금액은 현재 가격({current_price})보다 높아야 합니다.")]
    TooLow { current_price: i64 },

    #[error("보유 크레딧({credits})이 부족합니다.")]
    InsufficientCredits { credits: i64 },

    /// 로컬 검증은 통과했으나 API 가 입찰을 거절한 경우
    #[error("입찰이 거절되었습니다: {message}")]
    Rejected { message: String },
}

impl BidError {
    pub fn code(&self) -> &'static str {
        match self {
            BidError::NotANumber => "NOT_A_NUMBER",
            BidError::TooLow { .. } => "LOW_BID",
            BidError::InsufficientCredits { .. } => "INSUFFICIENT_CREDITS",
            BidError::Rejected { .. } => "BID_REJECTED",
        }
    }
}

/// 입력 필드 단위 검증 실패
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error(transparent)]
    Bid(#[from] BidError),

    #[error("입력값 오류: {}", join_fields(.0))]
    Form(Vec<FieldError>),
}

impl ValidationError {
    /// 특정 필드에 대한 오류 메시지 조회
    pub fn field(&self, name: &str) -> Option<&str> {
        match self {
            ValidationError::Form(fields) => fields
                .iter()
                .find(|f| f.field == name)
                .map(|f| f.message.as_str()),
            ValidationError::Bid(_) => None,
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// 권한 없음
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PermissionDenied {
    #[error("로그인이 필요합니다.")]
    NotAuthenticated,

    #[error("본인 소유가 아닙니다.")]
    NotOwner,

    #[error("본인 목록에는 입찰할 수 없습니다.")]
    OwnListing,

    #[error("경매가 이미 종료되었습니다.")]
    AuctionEnded,
}

impl PermissionDenied {
    pub fn code(&self) -> &'static str {
        match self {
            PermissionDenied::NotAuthenticated => "NOT_AUTHENTICATED",
            PermissionDenied::NotOwner => "NOT_OWNER",
            PermissionDenied::OwnListing => "OWN_LISTING",
            PermissionDenied::AuctionEnded => "ALREADY_ENDED",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("네트워크 오류: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{message}")]
    ApiRejection { status: u16, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Permission(#[from] PermissionDenied),

    #[error("응답 형식 오류: {0}")]
    Decode(String),

    #[error("세션 저장소 오류: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON 오류: {0}")]
    Json(#[from] serde_json::Error),

    #[error("설정 오류: {0}")]
    Config(String),
}

impl From<BidError> for AppError {
    fn from(e: BidError) -> Self {
        AppError::Validation(ValidationError::Bid(e))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

// endregion: --- Error Types

// region:    --- Response
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            AppError::Validation(ValidationError::Bid(e)) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": self.to_string(), "code": e.code() }),
            ),
            AppError::Validation(ValidationError::Form(fields)) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({
                    "error": self.to_string(),
                    "code": "INVALID_INPUT",
                    "fields": fields
                }),
            ),
            AppError::Permission(p) => {
                let status = match p {
                    PermissionDenied::NotAuthenticated => StatusCode::UNAUTHORIZED,
                    _ => StatusCode::FORBIDDEN,
                };
                (
                    status,
                    serde_json::json!({ "error": self.to_string(), "code": p.code() }),
                )
            }
            AppError::ApiRejection { status, message } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                serde_json::json!({ "error": message, "code": "API_REJECTED" }),
            ),
            AppError::Network(_) | AppError::Decode(_) => (
                StatusCode::BAD_GATEWAY,
                serde_json::json!({ "error": self.to_string(), "code": "UPSTREAM" }),
            ),
            AppError::Database(_) | AppError::Json(_) | AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({ "error": self.to_string(), "code": "INTERNAL" }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

// endregion: --- Response
