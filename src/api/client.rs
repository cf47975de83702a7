//! Cliente HTTP do backend de pedidos.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::ApiError;
use super::types::{
    ErrorBody, Funcionario, LoginRequest, LoginResponse, NextSector, SectorMove, StatusUpdate,
    resolve_payload,
};
use crate::board::BoardColumns;
use crate::dashboard::SectorStatistics;
use crate::flow::Pedido;
use crate::session::UserInfo;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// REST client for the order backend.
pub struct ApiClient {
    token: Option<String>,
    client: Client,
    base_url: String,
}

/// Strips trailing slashes so paths never produce `//`.
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

impl ApiClient {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Result<Self, ApiError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            token,
            client,
            base_url: normalize_base_url(base_url),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4().to_string();
        debug!(method = method.as_str(), path, request_id = %request_id, "api request");
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(self.token.as_deref().unwrap_or_default())
            .header("cache-control", "no-store")
            .header("pragma", "no-cache")
            .header("x-request-id", request_id)
    }

    /// Checks the status and returns the raw success body.
    async fn send_raw(&self, request: RequestBuilder, fallback: &str) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_else(|| fallback.to_string());
            warn!(status = status.as_u16(), %message, "api request failed");
            return Err(ApiError::from_status(status.as_u16(), message));
        }

        Ok(response.text().await?)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let text = self.send_raw(request, fallback).await?;
        let body: Value = serde_json::from_str(&text)?;
        Ok(resolve_payload(body)?)
    }

    /// For writes: any 2xx body is a success. `None` when the body carries no
    /// decodable order (`{"success": true}`, empty text, ...).
    async fn send_write(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<Option<Pedido>, ApiError> {
        let text = self.send_raw(request, fallback).await?;
        let order = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|body| resolve_payload::<Pedido>(body).ok());
        if order.is_none() {
            debug!(body = %text, "write acknowledged without an order body");
        }
        Ok(order)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let request = self
            .request(Method::POST, "/auth/login")
            .json(&LoginRequest { email, password });
        let response: LoginResponse = self.send(request, "Email ou senha incorretos").await?;
        Ok(response.token)
    }

    pub async fn me(&self) -> Result<UserInfo, ApiError> {
        let request = self.request(Method::GET, "/auth/me");
        self.send(request, "Erro ao buscar informações do usuário").await
    }

    pub async fn status_columns(&self) -> Result<BoardColumns, ApiError> {
        let request = self.request(Method::GET, "/status/columns/filtered");
        self.send(request, "Erro ao buscar colunas de status").await
    }

    pub async fn board_orders(&self) -> Result<Vec<Pedido>, ApiError> {
        let request = self.request(Method::GET, "/pedidos/kanban/status");
        self.send(request, "Erro ao buscar pedidos").await
    }

    pub async fn list_orders(&self) -> Result<Vec<Pedido>, ApiError> {
        let request = self.request(Method::GET, "/pedidos");
        self.send(request, "Erro ao buscar pedidos").await
    }

    pub async fn get_order(&self, id: &str) -> Result<Pedido, ApiError> {
        let request = self.request(Method::GET, &format!("/pedidos/{id}"));
        self.send(request, "Erro ao buscar pedido").await
    }

    pub async fn update_status(
        &self,
        id: &str,
        update: &StatusUpdate,
    ) -> Result<Option<Pedido>, ApiError> {
        let request = self
            .request(Method::PATCH, &format!("/pedidos/{id}/status"))
            .json(update);
        self.send_write(request, "Erro ao atualizar status do pedido").await
    }

    pub async fn next_sector(&self, id: &str) -> Result<Option<NextSector>, ApiError> {
        let request = self.request(Method::GET, &format!("/pedidos/{id}/proximo-setor"));
        self.send(request, "Erro ao buscar próximo setor").await
    }

    pub async fn move_to_sector(
        &self,
        id: &str,
        body: &SectorMove,
    ) -> Result<Option<Pedido>, ApiError> {
        let request = self
            .request(Method::POST, &format!("/pedidos/{id}/mover-setor"))
            .json(body);
        self.send_write(request, "Erro ao mover pedido de setor").await
    }

    pub async fn sector_statistics(&self) -> Result<SectorStatistics, ApiError> {
        let request = self.request(Method::GET, "/setores/estatisticas");
        self.send(request, "Erro ao buscar estatísticas de setores").await
    }

    pub async fn employees(&self) -> Result<Vec<Funcionario>, ApiError> {
        let request = self.request(Method::GET, "/funcionarios");
        self.send(request, "Erro ao carregar funcionários").await
    }
}
