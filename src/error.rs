//! Erro de topo do sapateiro e as mensagens mostradas ao usuário.

use thiserror::Error;

use crate::api::ApiError;
use crate::flow::FlowError;

#[derive(Debug, Error)]
pub enum SapateiroError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Another transition on the same order is still in flight.
    #[error("A transition for order {0} is already in progress")]
    TransitionPending(String),

    #[error("Not logged in. Run `sapateiro login` first.")]
    NotLoggedIn,

    /// Quick advance named a sector with no visible column.
    #[error("No board column for sector {0}")]
    NoQuickTarget(String),

    #[error("Validation error: {0}")]
    Flow(#[from] FlowError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SapateiroError {
    /// Short message for the terminal, in the workshop's language.
    pub fn user_message(&self) -> String {
        match self {
            SapateiroError::Config(msg) => format!("Erro de configuração: {msg}"),
            SapateiroError::OrderNotFound(_) => "Pedido ou cliente não encontrado".to_string(),
            SapateiroError::TransitionPending(id) => {
                format!("Pedido #{id} já está sendo atualizado, aguarde")
            }
            SapateiroError::NotLoggedIn => {
                "Você precisa estar logado para acessar esta página".to_string()
            }
            SapateiroError::NoQuickTarget(sector) => {
                format!("Não foi possível mover para o setor {sector}")
            }
            SapateiroError::Flow(FlowError::MissingActor) => {
                "Informe o nome do funcionário responsável".to_string()
            }
            SapateiroError::Flow(err) => format!("Transição inválida: {err}"),
            SapateiroError::Api(ApiError::SessionExpired(_)) => {
                "Sessão expirada. Faça login novamente".to_string()
            }
            SapateiroError::Api(ApiError::Forbidden(_)) => {
                "Você não tem permissão para esta operação".to_string()
            }
            SapateiroError::Api(ApiError::NotFound(_)) => "Pedido não encontrado".to_string(),
            SapateiroError::Api(ApiError::Network(_)) => {
                "Erro de conexão. Verifique sua conexão e tente novamente.".to_string()
            }
            SapateiroError::Api(ApiError::Status { message, .. }) => message.clone(),
            SapateiroError::Api(ApiError::Parse(_)) => {
                "Dados inválidos recebidos da API".to_string()
            }
            SapateiroError::Io(err) => format!("Erro de arquivo: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_follow_error_kind() {
        let err: SapateiroError = FlowError::MissingActor.into();
        assert_eq!(err.user_message(), "Informe o nome do funcionário responsável");

        let err: SapateiroError = ApiError::from_status(401, "jwt expired".into()).into();
        assert_eq!(err.user_message(), "Sessão expirada. Faça login novamente");

        let err: SapateiroError = ApiError::from_status(422, "Status inválido".into()).into();
        assert_eq!(err.user_message(), "Status inválido");

        let err = SapateiroError::TransitionPending("12".into());
        assert_eq!(err.user_message(), "Pedido #12 já está sendo atualizado, aguarde");
    }

    #[test]
    fn quick_without_target_names_the_sector() {
        let err = SapateiroError::NoQuickTarget("pintura".into());
        assert_eq!(err.user_message(), "Não foi possível mover para o setor pintura");
        assert_eq!(err.to_string(), "No board column for sector pintura");
    }

    #[test]
    fn display_wraps_source() {
        let err: SapateiroError = FlowError::AlreadyInSector(crate::flow::SectorId::Costura).into();
        assert_eq!(
            err.to_string(),
            "Validation error: order is already in sector costura"
        );
    }
}
