//! 세션 (액세스 토큰 + 캐시된 사용자 정보)
//!
//! [`SessionManager`] 가 세션의 유일한 소유자이다. 시작 시 저장소에서 로드하고,
//! 변경 시 저장하며, 로그아웃 시 삭제한다. 다른 구성요소는 [`Session`] 스냅샷을
//! 명시적으로 전달받는다.

// region:    --- Modules
pub mod auth;
pub mod store;

// endregion: --- Modules

// region:    --- Imports
use crate::bidding::model::{Media, Profile};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use store::SessionStore;
use tokio::sync::RwLock;
use tracing::{info, warn};

// endregion: --- Imports

/// 토큰 항목 이름
pub const TOKEN_KEY: &str = "accessToken";
/// 사용자 항목 이름
pub const USER_KEY: &str = "user";

// region:    --- Session Model
/// 캐시된 사용자 정보 (원격 프로필의 읽기 위주 사본)
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub credits: i64,
    #[serde(default)]
    pub avatar: Option<Media>,
    #[serde(default)]
    pub banner: Option<Media>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl UserRecord {
    /// 원격 프로필 값으로 갱신 (크레딧, 아바타, 배너, 소개)
    pub fn refresh_from(&mut self, profile: &Profile) {
        self.credits = profile.credits;
        self.avatar = profile.avatar.clone();
        self.banner = profile.banner.clone();
        self.bio = profile.bio.clone();
    }
}

/// 인증된 세션 스냅샷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

// endregion: --- Session Model

// region:    --- Session Manager
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionManager {
    /// 저장소에서 세션 로드
    pub async fn load(store: Arc<dyn SessionStore>) -> Result<Self> {
        let token = store.get(TOKEN_KEY).await?;
        let user = store.get(USER_KEY).await?;

        let current = match (token, user) {
            (Some(token), Some(raw)) => match serde_json::from_str::<UserRecord>(&raw) {
                Ok(user) => {
                    info!("{:<12} --> 세션 복원: {}", "Session", user.name);
                    Some(Session { token, user })
                }
                Err(e) => {
                    warn!("{:<12} --> 손상된 사용자 정보 삭제: {:?}", "Session", e);
                    store.remove_all(&[TOKEN_KEY, USER_KEY]).await?;
                    None
                }
            },
            (Some(_), None) => {
                warn!("{:<12} --> 사용자 정보가 없는 토큰 삭제", "Session");
                store.remove_all(&[TOKEN_KEY]).await?;
                None
            }
            _ => None,
        };

        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    /// 현재 세션 스냅샷
    pub async fn current(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub async fn current_user(&self) -> Option<UserRecord> {
        self.current.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// 로그인 성공 시 토큰과 사용자 정보를 함께 저장
    pub async fn start(&self, token: String, user: UserRecord) -> Result<Session> {
        let raw = serde_json::to_string(&user)?;
        self.store
            .put_all(&[(TOKEN_KEY, token.clone()), (USER_KEY, raw)])
            .await?;

        let session = Session { token, user };
        *self.current.write().await = Some(session.clone());
        info!("{:<12} --> 세션 시작: {}", "Session", session.user.name);
        Ok(session)
    }

    /// 캐시된 사용자 정보 갱신 (세션이 없으면 무시)
    pub async fn update_user(&self, user: UserRecord) -> Result<Option<Session>> {
        let mut current = self.current.write().await;
        let Some(session) = current.as_mut() else {
            return Ok(None);
        };

        let raw = serde_json::to_string(&user)?;
        self.store.put_all(&[(USER_KEY, raw)]).await?;
        session.user = user;
        Ok(Some(session.clone()))
    }

    /// 세션 삭제 (로그아웃 / 토큰 만료)
    pub async fn clear(&self) -> Result<()> {
        self.store.remove_all(&[TOKEN_KEY, USER_KEY]).await?;
        *self.current.write().await = None;
        info!("{:<12} --> 세션 종료", "Session");
        Ok(())
    }
}

// endregion: --- Session Manager
