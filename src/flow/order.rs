//! Modelo de pedido (`Pedido`) como o backend envia, com as transições de setor
//! e de status aplicadas localmente.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::FlowError;
use super::history::{Actor, SectorHistory, SectorHistoryEntry};
use super::sector::{Advance, SectorCatalog, SectorFlow, SectorId};

/// One service line of an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicoPedido {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub preco: f64,
    #[serde(default)]
    pub descricao: String,
}

/// One status change as recorded by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistoryEntry {
    pub status: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClienteResumo {
    #[serde(default)]
    pub nome_completo: String,
}

/// A repair order (pedido) as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pedido {
    pub id: String,
    #[serde(default)]
    pub codigo: Option<String>,
    #[serde(default)]
    pub cliente_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub client_cpf: Option<String>,
    #[serde(default)]
    pub cliente: Option<ClienteResumo>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub modelo_tenis: String,
    #[serde(default, deserialize_with = "lenient_services")]
    pub servicos: Vec<ServicoPedido>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub preco_total: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valor_sinal: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub valor_restante: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status_history: Vec<StatusHistoryEntry>,
    #[serde(default)]
    pub data_criacao: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub data_prevista_entrega: Option<String>,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default, deserialize_with = "lenient_flow")]
    pub setores_fluxo: Vec<SectorId>,
    #[serde(default, deserialize_with = "lenient_sector")]
    pub setor_atual: Option<SectorId>,
    #[serde(default, deserialize_with = "lenient_history")]
    pub setores_historico: SectorHistory,
    #[serde(default)]
    pub funcionario_atual: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub finalizado: bool,
}

/// Result of a local sector transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectorTransition {
    Moved {
        from: Option<SectorId>,
        to: SectorId,
    },
    /// Entered the last sector of the flow; the client should be notified.
    Finalized {
        from: Option<SectorId>,
        at: SectorId,
    },
    /// No sector remains after the current one. Nothing was changed.
    Terminal { at: Option<SectorId> },
}

impl SectorTransition {
    /// Target sector when the transition changed anything.
    pub fn target(&self) -> Option<SectorId> {
        match self {
            SectorTransition::Moved { to, .. } => Some(*to),
            SectorTransition::Finalized { at, .. } => Some(*at),
            SectorTransition::Terminal { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Completed,
    Current,
    Pending,
}

/// Progress of one sector of an order's flow.
#[derive(Debug, Clone, PartialEq)]
pub struct StageProgress {
    pub sector: SectorId,
    pub status: StageStatus,
    /// Only set for completed stages.
    pub time_in_stage: Option<chrono::Duration>,
}

impl Pedido {
    #[cfg(test)]
    pub fn new(id: &str, status: &str) -> Self {
        Self {
            id: id.to_string(),
            codigo: None,
            cliente_id: None,
            client_id: None,
            client_name: None,
            client_cpf: None,
            cliente: None,
            modelo_tenis: String::new(),
            servicos: Vec::new(),
            preco_total: 0.0,
            valor_sinal: 0.0,
            valor_restante: 0.0,
            status: status.to_string(),
            status_history: Vec::new(),
            data_criacao: None,
            created_at: None,
            data_prevista_entrega: None,
            observacoes: None,
            setores_fluxo: Vec::new(),
            setor_atual: None,
            setores_historico: SectorHistory::default(),
            funcionario_atual: None,
            finalizado: false,
        }
    }

    pub fn client_display(&self) -> &str {
        self.client_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or_else(|| self.cliente.as_ref().map(|c| c.nome_completo.as_str()))
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Cliente não encontrado")
    }

    pub fn created(&self) -> Option<&str> {
        self.data_criacao.as_deref().or(self.created_at.as_deref())
    }

    pub fn display_code(&self) -> &str {
        self.codigo.as_deref().unwrap_or(&self.id)
    }

    pub fn services_summary(&self) -> String {
        self.servicos
            .iter()
            .map(|s| s.nome.trim())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// The order's own flow, or the catalog default when the backend sent none.
    pub fn flow(&self, catalog: &SectorCatalog) -> Result<SectorFlow, FlowError> {
        if self.setores_fluxo.is_empty() {
            Ok(catalog.default_flow())
        } else {
            SectorFlow::new(self.setores_fluxo.clone())
        }
    }

    /// Moves to the sector after the current one.
    ///
    /// From the last sector this returns [`SectorTransition::Terminal`] and
    /// leaves the order untouched.
    pub fn advance(
        &mut self,
        catalog: &SectorCatalog,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<SectorTransition, FlowError> {
        let flow = self.flow(catalog)?;
        match flow.next_after(self.setor_atual)? {
            Advance::Next(next) => self.enter(&flow, catalog, next, actor, now),
            Advance::Terminal => Ok(SectorTransition::Terminal {
                at: self.setor_atual,
            }),
        }
    }

    /// Jumps straight to `sector`, ignoring the flow order.
    pub fn move_to(
        &mut self,
        catalog: &SectorCatalog,
        sector: SectorId,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<SectorTransition, FlowError> {
        let flow = self.flow(catalog)?;
        if !flow.contains(sector) {
            return Err(FlowError::NotInFlow(sector));
        }
        if self.setor_atual == Some(sector) {
            return Err(FlowError::AlreadyInSector(sector));
        }
        self.enter(&flow, catalog, sector, actor, now)
    }

    fn enter(
        &mut self,
        flow: &SectorFlow,
        catalog: &SectorCatalog,
        sector: SectorId,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<SectorTransition, FlowError> {
        let nome = Some(catalog.name(sector).to_string());
        self.setores_historico.enter(sector, nome, actor, now)?;

        let from = self.setor_atual.replace(sector);
        self.funcionario_atual = Some(actor.as_str().to_string());
        self.finalizado = flow.is_last(sector);

        Ok(if self.finalizado {
            SectorTransition::Finalized { from, at: sector }
        } else {
            SectorTransition::Moved { from, to: sector }
        })
    }

    /// Records a board status change with the wall-clock time it happened.
    pub fn set_status(&mut self, status: &str, actor: &Actor, at: NaiveDateTime) {
        self.status = status.to_string();
        self.status_history.push(StatusHistoryEntry {
            status: status.to_string(),
            date: at.format("%Y-%m-%d").to_string(),
            time: at.format("%H:%M").to_string(),
            user_name: Some(actor.as_str().to_string()),
            user_id: None,
        });
    }

    pub fn stage_status(&self, sector: SectorId) -> StageStatus {
        let latest = self.setores_historico.latest_for(sector);
        let is_current = self.setor_atual == Some(sector);
        match latest {
            None if !is_current => StageStatus::Pending,
            None => StageStatus::Current,
            Some(entry) if is_current && entry.is_open() => StageStatus::Current,
            Some(_) => StageStatus::Completed,
        }
    }

    pub fn progress(&self, catalog: &SectorCatalog) -> Result<Vec<StageProgress>, FlowError> {
        let flow = self.flow(catalog)?;
        Ok(flow
            .sectors()
            .iter()
            .map(|&sector| {
                let status = self.stage_status(sector);
                let time_in_stage = match status {
                    StageStatus::Completed => self
                        .setores_historico
                        .latest_for(sector)
                        .and_then(|e| e.saida_em.map(|out| out - e.entrada_em)),
                    _ => None,
                };
                StageProgress {
                    sector,
                    status,
                    time_in_stage,
                }
            })
            .collect())
    }

    /// Structural checks on an order received from the backend.
    pub fn validate(&self, catalog: &SectorCatalog) -> Result<(), FlowError> {
        let flow = self.flow(catalog)?;
        catalog.check_flow(&flow)?;
        self.setores_historico.validate()?;
        if let Some(current) = self.setor_atual
            && !flow.contains(current)
        {
            return Err(FlowError::NotInFlow(current));
        }
        Ok(())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn sector_from_value(value: &Value) -> Option<SectorId> {
    value.as_str().and_then(|id| id.parse().ok())
}

/// Blank or unknown ids mean "no current sector".
fn lenient_sector<'de, D>(deserializer: D) -> Result<Option<SectorId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(sector_from_value))
}

/// Unknown ids are dropped from the flow.
fn lenient_flow<'de, D>(deserializer: D) -> Result<Vec<SectorId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .iter()
        .filter_map(sector_from_value)
        .collect())
}

/// Entries that do not decode (unknown sector, missing entry time) are skipped.
fn lenient_history<'de, D>(deserializer: D) -> Result<SectorHistory, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<SectorHistoryEntry> = Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .into_iter()
        .filter_map(|v| serde_json::from_value(v).ok())
        .collect();
    Ok(SectorHistory::from(entries))
}

/// The backend sends `servicos` as a list of objects, a list of names, a
/// single object or a plain string.
fn lenient_services<'de, D>(deserializer: D) -> Result<Vec<ServicoPedido>, D::Error>
where
    D: Deserializer<'de>,
{
    fn from_value(value: Value) -> Option<ServicoPedido> {
        match value {
            Value::String(nome) if !nome.trim().is_empty() => Some(ServicoPedido {
                nome,
                ..Default::default()
            }),
            Value::Object(map) => {
                let mut servico: ServicoPedido =
                    serde_json::from_value(Value::Object(map.clone())).unwrap_or_default();
                if servico.nome.trim().is_empty() {
                    servico.nome = ["name", "descricao", "id"]
                        .iter()
                        .find_map(|k| map.get(*k).and_then(Value::as_str))
                        .unwrap_or_default()
                        .to_string();
                }
                Some(servico)
            }
            _ => None,
        }
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(from_value).collect(),
        Value::Null => Vec::new(),
        other => from_value(other).into_iter().collect(),
    })
}
