//! Corpos de requisição e resposta do backend de pedidos.
//!
//! O backend às vezes embrulha a resposta em `{"data": ...}` e às vezes não;
//! [`resolve_payload`] aceita as duas formas.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::flow::SectorId;

/// Unwraps `{"data": ...}` if present, then deserializes.
pub fn resolve_payload<T: DeserializeOwned>(mut value: Value) -> Result<T, serde_json::Error> {
    if let Some(inner) = value.as_object_mut().and_then(|map| map.remove("data")) {
        return serde_json::from_value(inner);
    }
    serde_json::from_value(value)
}

/// Error body: `{"error": "..."}` or `{"message": "..."}`.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Body of `PATCH /pedidos/{id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub status: String,
    pub funcionario_nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacao: Option<String>,
}

/// Body of `POST /pedidos/{id}/mover-setor`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorMove {
    pub setor_id: SectorId,
    pub funcionario_nome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observacao: Option<String>,
}

/// Trims an optional note, dropping it when blank.
pub fn clean_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Answer of `GET /pedidos/{id}/proximo-setor`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NextSector {
    pub id: SectorId,
    #[serde(default)]
    pub nome: String,
}

/// An employee (funcionário) as listed by `/funcionarios`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Funcionario {
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub setor_id: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub telefone: Option<String>,
    #[serde(default)]
    pub cargo: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default = "active_by_default")]
    pub ativo: bool,
}

fn active_by_default() -> bool {
    true
}
