/// 인증 처리
/// 1. 회원가입
/// 2. 로그인 / 로그아웃
/// 3. 사용자 정보 갱신
// region:    --- Imports
use super::{Session, SessionManager, UserRecord};
use crate::api::ApiClient;
use crate::bidding::model::ProfileRef;
use crate::bidding::validation::{validate_required, RegisterForm};
use crate::error::{AppError, FieldError, PermissionDenied, Result, ValidationError};
use crate::query::handlers::get_profile;
use crate::query::queries;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

// endregion: --- Imports

// region:    --- Wire Types
#[derive(Debug, Serialize)]
struct RegisterBody<'a> {
    name: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginData {
    access_token: String,
    #[serde(flatten)]
    user: UserRecord,
}

// endregion: --- Wire Types

/// 로그인 입력
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

// region:    --- Auth
/// 1. 회원가입
pub async fn register(client: &ApiClient, form: &RegisterForm) -> Result<ProfileRef> {
    info!("{:<12} --> 회원가입 요청: {}", "Auth", form.name);
    form.validate()?;

    let body = RegisterBody {
        name: form.name.trim(),
        email: form.email.trim(),
        password: &form.password,
    };
    let envelope = client
        .post::<_, ProfileRef>(queries::AUTH_REGISTER, &body, None)
        .await?;
    info!("{:<12} --> 회원가입 완료: {}", "Auth", envelope.data.name);
    Ok(envelope.data)
}

/// 2. 로그인 (토큰과 사용자 정보 저장 후 프로필로 갱신)
pub async fn login(
    client: &ApiClient,
    sessions: &SessionManager,
    form: &LoginForm,
) -> Result<Session> {
    info!("{:<12} --> 로그인 요청: {}", "Auth", form.email);

    let mut errors = Vec::new();
    if !validate_required(&form.email) {
        errors.push(FieldError::new("email", "이메일은 필수입니다."));
    }
    if !validate_required(&form.password) {
        errors.push(FieldError::new("password", "비밀번호는 필수입니다."));
    }
    if !errors.is_empty() {
        return Err(ValidationError::Form(errors).into());
    }

    let body = LoginBody {
        email: form.email.trim(),
        password: &form.password,
    };
    let envelope = client
        .post::<_, LoginData>(queries::AUTH_LOGIN, &body, None)
        .await?;
    let LoginData { access_token, user } = envelope.data;

    sessions.start(access_token, user).await?;
    refresh_user(client, sessions).await?;

    sessions
        .current()
        .await
        .ok_or(AppError::Permission(PermissionDenied::NotAuthenticated))
}

/// 로그아웃 (세션 삭제)
pub async fn logout(sessions: &SessionManager) -> Result<()> {
    info!("{:<12} --> 로그아웃", "Auth");
    sessions.clear().await
}

/// 3. 사용자 정보 갱신
///
/// 실패하면 캐시된 정보를 유지한다. 401 은 토큰 만료로 보고 세션을 삭제한다.
pub async fn refresh_user(
    client: &ApiClient,
    sessions: &SessionManager,
) -> Result<Option<UserRecord>> {
    let Some(session) = sessions.current().await else {
        return Ok(None);
    };

    match get_profile(client, &session.user.name, Some(&session)).await {
        Ok(profile) => {
            let mut user = session.user;
            user.refresh_from(&profile);
            let updated = sessions.update_user(user).await?;
            Ok(updated.map(|s| s.user))
        }
        Err(AppError::ApiRejection { status: 401, message }) => {
            warn!("{:<12} --> 토큰 만료, 세션 삭제: {}", "Auth", message);
            sessions.clear().await?;
            Ok(None)
        }
        Err(e) => {
            warn!("{:<12} --> 사용자 정보 갱신 실패, 캐시 유지: {:?}", "Auth", e);
            Ok(Some(session.user))
        }
    }
}

// endregion: --- Auth

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemorySessionStore;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn manager() -> SessionManager {
        SessionManager::load(Arc::new(MemorySessionStore::new()))
            .await
            .unwrap()
    }

    fn login_form() -> LoginForm {
        LoginForm {
            email: "alice@stud.noroff.no".into(),
            password: "password1".into(),
        }
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_json(json!({"email": "alice@stud.noroff.no", "password": "password1"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "name": "alice",
                    "email": "alice@stud.noroff.no",
                    "bio": null,
                    "avatar": {"url": "https://img.example/a.png", "alt": ""},
                    "accessToken": "tok-123"
                },
                "meta": {}
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn login_stores_token_and_refreshes_credits() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/auction/profiles/alice"))
            .and(header("Authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"name": "alice", "credits": 1000, "bio": "Collector"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(&server.uri(), None).unwrap();
        let sessions = manager().await;
        let session = login(&client, &sessions, &login_form()).await.unwrap();

        assert_eq!(session.token, "tok-123");
        assert_eq!(session.user.credits, 1000);
        assert_eq!(session.user.bio.as_deref(), Some("Collector"));
        assert_eq!(session.user.email.as_deref(), Some("alice@stud.noroff.no"));
    }

    #[tokio::test]
    async fn failed_refresh_keeps_cached_user() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/auction/profiles/alice"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(&server.uri(), None).unwrap();
        let sessions = manager().await;
        let session = login(&client, &sessions, &login_form()).await.unwrap();
        assert_eq!(session.user.name, "alice");
        assert_eq!(session.user.credits, 0);
    }

    #[tokio::test]
    async fn unauthorized_refresh_clears_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auction/profiles/alice"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": [{"message": "Invalid token"}]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(&server.uri(), None).unwrap();
        let sessions = manager().await;
        sessions
            .start(
                "expired".into(),
                UserRecord {
                    name: "alice".into(),
                    ..UserRecord::default()
                },
            )
            .await
            .unwrap();

        assert!(refresh_user(&client, &sessions).await.unwrap().is_none());
        assert!(!sessions.is_authenticated().await);
    }

    #[tokio::test]
    async fn rejected_login_leaves_no_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "errors": [{"message": "Invalid email or password"}]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(&server.uri(), None).unwrap();
        let sessions = manager().await;
        let err = login(&client, &sessions, &login_form()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password");
        assert!(!sessions.is_authenticated().await);
    }

    #[tokio::test]
    async fn blank_login_fields_are_reported() {
        let client = ApiClient::with_base_url("http://127.0.0.1:9", None).unwrap();
        let sessions = manager().await;
        let err = login(&client, &sessions, &LoginForm::default())
            .await
            .unwrap_err();
        match err {
            AppError::Validation(v) => {
                assert!(v.field("email").is_some());
                assert!(v.field("password").is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_validates_before_calling_api() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/register"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "data": {"name": "new_user", "email": "new_user@stud.noroff.no"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(&server.uri(), None).unwrap();
        let bad = RegisterForm {
            name: "new user".into(),
            email: "new_user@stud.noroff.no".into(),
            password: "longenough".into(),
        };
        assert!(matches!(
            register(&client, &bad).await,
            Err(AppError::Validation(_))
        ));

        let good = RegisterForm {
            name: "new_user".into(),
            ..bad
        };
        let profile = register(&client, &good).await.unwrap();
        assert_eq!(profile.name, "new_user");
    }
}
