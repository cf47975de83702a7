//! Sessão explícita do usuário: token de acesso e informações do usuário logado.
//!
//! As informações vêm, em ordem, do payload do JWT, do endpoint `/auth/me`
//! ou de um usuário genérico sem departamento.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::ApiClient;

const ADMIN_ROLE: &str = "admin";

/// Logged-in user as seen by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub departamento: Option<String>,
    #[serde(default = "default_name")]
    pub nome: String,
}

fn default_role() -> String {
    "user".to_string()
}

fn default_name() -> String {
    "Usuário".to_string()
}

impl UserInfo {
    /// Generic user used when nothing better is known.
    pub fn fallback() -> Self {
        Self {
            id: String::new(),
            email: String::new(),
            role: default_role(),
            departamento: None,
            nome: default_name(),
        }
    }

    #[cfg(test)]
    pub fn with_role(role: &str) -> Self {
        Self {
            role: role.to_string(),
            ..Self::fallback()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.trim().eq_ignore_ascii_case(ADMIN_ROLE)
    }

    /// Lowercased key matched against board column names.
    pub fn department_key(&self) -> String {
        self.role.trim().to_lowercase()
    }

    /// Reads the user out of a JWT payload without verifying the signature.
    pub fn from_token(token: &str) -> Option<Self> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let claims: Value = serde_json::from_slice(&bytes).ok()?;
        if !claims.is_object() {
            return None;
        }

        Some(Self {
            id: claim(&claims, &["id", "sub"]).unwrap_or_default(),
            email: claim(&claims, &["email"]).unwrap_or_default(),
            role: claim(&claims, &["role", "perfil"]).unwrap_or_else(default_role),
            departamento: claim(&claims, &["departamento", "department"]),
            nome: claim(&claims, &["nome", "name"]).unwrap_or_else(default_name),
        })
    }
}

fn claim(claims: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| claims.get(*k).and_then(Value::as_str))
        .map(str::to_string)
}

/// Token plus resolved user, passed explicitly to whatever needs them.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: Option<String>,
    pub user: UserInfo,
}

impl Session {
    pub fn anonymous() -> Self {
        Self {
            token: None,
            user: UserInfo::fallback(),
        }
    }

    /// Resolves the user for `token`: JWT payload first, then `/auth/me`,
    /// then the generic fallback user.
    pub async fn resolve(client: &ApiClient, token: Option<String>) -> Self {
        let Some(token) = token else {
            return Self::anonymous();
        };

        if let Some(user) = UserInfo::from_token(&token) {
            debug!(role = %user.role, "user resolved from token payload");
            return Self {
                token: Some(token),
                user,
            };
        }

        let user = match client.me().await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "could not resolve current user, using fallback");
                UserInfo::fallback()
            }
        };
        Self {
            token: Some(token),
            user,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}
