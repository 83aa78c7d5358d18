//! 경매 API 게이트웨이 클라이언트
//!
//! 공통 base url, API 키 헤더, 세션 토큰(Bearer) 주입을 담당하고
//! 2xx 이외의 응답을 [`AppError::ApiRejection`] 으로 정규화한다.
//! 재시도는 하지 않는다.

// region:    --- Imports
use super::envelope::{decode_response, Envelope};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::session::Session;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info};

// endregion: --- Imports

/// API 키 헤더 이름
pub const API_KEY_HEADER: &str = "X-Noroff-API-Key";

// region:    --- Api Client
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// 설정으로부터 클라이언트 생성
    pub fn new(config: &Config) -> Result<Self> {
        Self::build(
            &config.api_base_url,
            config.api_key.as_deref(),
            config.http_timeout,
        )
    }

    /// base url 과 API 키를 직접 지정하여 생성
    pub fn with_base_url(base_url: &str, api_key: Option<&str>) -> Result<Self> {
        Self::build(base_url, api_key, Duration::from_secs(30))
    }

    fn build(base_url: &str, api_key: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = api_key {
            headers.insert(
                API_KEY_HEADER,
                HeaderValue::from_str(key)
                    .map_err(|e| AppError::Config(format!("API 키 헤더 값 오류: {e}")))?,
            );
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// 요청 생성 (세션이 있으면 Bearer 토큰 주입)
    fn request(&self, method: Method, path: &str, session: Option<&Session>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        match session {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    /// GET 요청
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        session: Option<&Session>,
    ) -> Result<Envelope<T>> {
        info!("{:<12} --> GET {}", "Api", path);
        let builder = self.request(Method::GET, path, session).query(query);
        self.execute(builder).await
    }

    /// POST 요청
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        session: Option<&Session>,
    ) -> Result<Envelope<T>> {
        info!("{:<12} --> POST {}", "Api", path);
        let builder = self.request(Method::POST, path, session).json(body);
        self.execute(builder).await
    }

    /// PUT 요청
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        session: Option<&Session>,
    ) -> Result<Envelope<T>> {
        info!("{:<12} --> PUT {}", "Api", path);
        let builder = self.request(Method::PUT, path, session).json(body);
        self.execute(builder).await
    }

    /// DELETE 요청 (성공 시 본문 없음)
    pub async fn delete(&self, path: &str, session: Option<&Session>) -> Result<()> {
        info!("{:<12} --> DELETE {}", "Api", path);
        let response = self
            .request(Method::DELETE, path, session)
            .send()
            .await
            .map_err(log_network)?;
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.bytes().await.map_err(log_network)?;
        decode_response::<serde_json::Value>(status, &body).map(|_| ())
    }

    async fn execute<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Envelope<T>> {
        let response = builder.send().await.map_err(log_network)?;
        let status = response.status();
        let body = response.bytes().await.map_err(log_network)?;
        debug!("{:<12} --> 응답 수신: status={}", "Api", status);

        if status == StatusCode::NO_CONTENT {
            return Err(AppError::Decode("본문이 없는 응답입니다.".to_string()));
        }

        decode_response(status, &body).inspect_err(|e| {
            if let AppError::ApiRejection { status, message } = e {
                error!("{:<12} --> API 거절: status={}, {}", "Api", status, message);
            }
        })
    }
}

fn log_network(e: reqwest::Error) -> AppError {
    error!("{:<12} --> 네트워크 오류: {:?}", "Api", e);
    AppError::Network(e)
}

// endregion: --- Api Client
