//! Tipos de erro para o cliente REST do backend de pedidos.
//!
//! Os códigos HTTP mais comuns ganham variantes próprias para que a interface
//! mostre mensagens específicas (sessão expirada, sem permissão, não encontrado).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 401: token ausente, inválido ou expirado.
    #[error("session expired (status 401): {0}")]
    SessionExpired(String),

    /// HTTP 403: o usuário não pode executar esta operação.
    #[error("forbidden (status 403): {0}")]
    Forbidden(String),

    /// HTTP 404.
    #[error("not found (status 404): {0}")]
    NotFound(String),

    /// Qualquer outro status de erro (4xx/5xx).
    #[error("API error (status {status}): {message}")]
    Status { status: u16, message: String },

    /// Corpo da resposta não corresponde ao formato esperado.
    #[error("failed to parse API response: {0}")]
    Parse(String),

    /// Falha de rede subjacente (DNS, conexão recusada, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ApiError {
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => ApiError::SessionExpired(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            _ => ApiError::Status { status, message },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_status_classifies() {
        assert!(matches!(
            ApiError::from_status(401, "Token inválido".into()),
            ApiError::SessionExpired(_)
        ));
        assert!(matches!(
            ApiError::from_status(403, "x".into()),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(404, "x".into()),
            ApiError::NotFound(_)
        ));
        let err = ApiError::from_status(500, "boom".into());
        assert!(matches!(err, ApiError::Status { status: 500, .. }));
        assert_eq!(err.to_string(), "API error (status 500): boom");
    }

    #[test]
    fn json_errors_become_parse_errors() {
        let err: ApiError = serde_json::from_str::<u32>("\"x\"").unwrap_err().into();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ApiError>();
    }
}
