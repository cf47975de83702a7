//! Acesso ao backend REST: cliente, erros e corpos de requisição.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
pub use types::{Funcionario, SectorMove, StatusUpdate, clean_note};

use crate::board::BoardColumns;
use crate::flow::Pedido;

/// The backend calls the board tracker depends on.
pub trait OrderBackend {
    async fn fetch_columns(&self) -> Result<BoardColumns, ApiError>;

    async fn fetch_board_orders(&self) -> Result<Vec<Pedido>, ApiError>;

    async fn fetch_order(&self, id: &str) -> Result<Pedido, ApiError>;

    /// `Ok(None)` when the backend acknowledged the write without sending the
    /// updated order back.
    async fn update_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> Result<Option<Pedido>, ApiError>;

    async fn move_to_sector(
        &self,
        id: &str,
        body: &SectorMove,
    ) -> Result<Option<Pedido>, ApiError>;
}

impl OrderBackend for ApiClient {
    async fn fetch_columns(&self) -> Result<BoardColumns, ApiError> {
        self.status_columns().await
    }

    async fn fetch_board_orders(&self) -> Result<Vec<Pedido>, ApiError> {
        self.board_orders().await
    }

    async fn fetch_order(&self, id: &str) -> Result<Pedido, ApiError> {
        self.get_order(id).await
    }

    async fn update_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> Result<Option<Pedido>, ApiError> {
        ApiClient::update_status(self, id, update).await
    }

    async fn move_to_sector(
        &self,
        id: &str,
        body: &SectorMove,
    ) -> Result<Option<Pedido>, ApiError> {
        ApiClient::move_to_sector(self, id, body).await
    }
}
