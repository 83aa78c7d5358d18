//! API 응답 봉투(envelope) 디코딩
//!
//! 성공 시 `{ data, meta? }`, 실패 시 `{ errors: [{ message }] }` 형태만 허용하고
//! 그 외 형태는 디코딩 오류로 처리한다.

// region:    --- Imports
use crate::bidding::model::PageMeta;
use crate::error::{AppError, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;

// endregion: --- Imports

/// 오류 메시지가 없을 때 사용하는 기본 메시지
pub const DEFAULT_ERROR_MESSAGE: &str = "Something went wrong";

// region:    --- Envelope
/// 성공 응답 본문
#[derive(Debug, Clone)]
pub struct Envelope<T> {
    pub data: T,
    pub meta: Option<PageMeta>,
}

/// 디코딩된 응답 (성공 / 실패)
#[derive(Debug, Clone)]
pub enum ApiOutcome<T> {
    Ok { data: T, meta: Option<PageMeta> },
    Error { message: String },
}

#[derive(Deserialize)]
struct WireError {
    message: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireEnvelope<T> {
    Data {
        data: T,
        #[serde(default)]
        meta: Option<PageMeta>,
    },
    Errors {
        errors: Vec<WireError>,
    },
}

impl<T: DeserializeOwned> ApiOutcome<T> {
    /// 응답 본문을 명시적으로 디코딩
    pub fn decode(body: &[u8]) -> Result<Self> {
        let envelope: WireEnvelope<T> = serde_json::from_slice(body)
            .map_err(|e| AppError::Decode(format!("알 수 없는 응답 형식: {e}")))?;
        Ok(match envelope {
            WireEnvelope::Data { data, meta } => ApiOutcome::Ok { data, meta },
            WireEnvelope::Errors { errors } => ApiOutcome::Error {
                message: errors
                    .into_iter()
                    .next()
                    .map(|e| e.message)
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
            },
        })
    }
}

impl<T> ApiOutcome<T> {
    /// HTTP 상태 코드와 결합하여 결과로 변환
    pub fn into_result(self, status: StatusCode) -> Result<Envelope<T>> {
        match self {
            ApiOutcome::Ok { data, meta } if status.is_success() => Ok(Envelope { data, meta }),
            ApiOutcome::Ok { .. } => Err(AppError::ApiRejection {
                status: status.as_u16(),
                message: DEFAULT_ERROR_MESSAGE.to_string(),
            }),
            ApiOutcome::Error { message } if !status.is_success() => Err(AppError::ApiRejection {
                status: status.as_u16(),
                message,
            }),
            ApiOutcome::Error { message } => Err(AppError::Decode(format!(
                "성공 상태({status})에 오류 본문: {message}"
            ))),
        }
    }
}

/// 상태 코드와 본문으로부터 응답 해석
pub fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<Envelope<T>> {
    match ApiOutcome::<T>::decode(body) {
        Ok(outcome) => outcome.into_result(status),
        // 실패 응답의 본문이 비정형이면 기본 메시지로 거절 처리
        Err(_) if !status.is_success() => Err(AppError::ApiRejection {
            status: status.as_u16(),
            message: DEFAULT_ERROR_MESSAGE.to_string(),
        }),
        Err(e) => Err(e),
    }
}

// endregion: --- Envelope
