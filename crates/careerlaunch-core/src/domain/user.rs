//! 사용자 및 역할 타입.
//!
//! - `Role` - 사용자 역할 (지원자/채용담당자)
//! - `User` - 저장된 사용자 레코드 (비밀번호 해시 포함)
//! - `NewUser` - 사용자 생성 입력
//! - `ProfileUpdate` - 프로필 수정 입력
//! - `UserProfile` - 클라이언트에 반환되는 공개 사용자 정보

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 사용자 역할.
///
/// 가입 시 결정되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 지원자 - 공고 조회 및 지원
    #[default]
    Candidate,
    /// 채용담당자 - 공고 등록 및 지원서 처리
    Recruiter,
}

impl Role {
    /// 저장소/토큰에 기록되는 문자열 표현.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Recruiter => "recruiter",
        }
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "candidate" => Some(Role::Candidate),
            "recruiter" => Some(Role::Recruiter),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 이메일 정규화 (공백 제거 + 소문자).
///
/// 저장과 조회 모두 이 함수를 거치므로 이메일 비교는 대소문자를 구분하지 않습니다.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 저장된 사용자 레코드.
///
/// `password_hash`를 포함하므로 직렬화하지 않습니다.
/// 응답에는 [`UserProfile`]을 사용하세요.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// 정규화된 이메일 (소문자)
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub school: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 공개 프로필로 변환.
    pub fn profile(&self) -> UserProfile {
        UserProfile::from(self)
    }
}

/// 사용자 생성 입력.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone_number: Option<String>,
    pub school: Option<String>,
    pub role: Role,
}

/// 프로필 수정 입력. `None` 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub school: Option<String>,
}

impl ProfileUpdate {
    /// 변경할 필드가 하나도 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone_number.is_none()
            && self.school.is_none()
    }

    /// 사용자 레코드에 변경 사항 적용.
    pub fn apply(&self, user: &mut User, now: DateTime<Utc>) {
        if let Some(first_name) = &self.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &self.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(phone_number) = &self.phone_number {
            user.phone_number = Some(phone_number.clone());
        }
        if let Some(school) = &self.school {
            user.school = Some(school.clone());
        }
        user.updated_at = now;
    }
}

/// 클라이언트에 노출되는 사용자 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            school: user.school.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}
