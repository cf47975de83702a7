//! Histórico de passagem pelos setores e o funcionário responsável.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::FlowError;
use super::sector::SectorId;

/// Name of the employee responsible for a transition. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(String);

impl Actor {
    pub fn new(name: &str) -> Result<Self, FlowError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(FlowError::MissingActor);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One stay of an order in a sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorHistoryEntry {
    pub setor_id: SectorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setor_nome: Option<String>,
    pub entrada_em: DateTime<Utc>,
    #[serde(default)]
    pub saida_em: Option<DateTime<Utc>>,
    #[serde(default, alias = "funcionarioNome", skip_serializing_if = "Option::is_none")]
    pub funcionario: Option<String>,
}

impl SectorHistoryEntry {
    pub fn is_open(&self) -> bool {
        self.saida_em.is_none()
    }

    /// Time spent in the sector; an open entry counts up to `now`.
    pub fn time_in_stage(&self, now: DateTime<Utc>) -> Duration {
        self.saida_em.unwrap_or(now) - self.entrada_em
    }
}

/// Append-only log of sector stays, ordered by entry time.
///
/// Entering a sector closes the open entry (if any) at the same instant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectorHistory(Vec<SectorHistoryEntry>);

impl SectorHistory {
    pub fn entries(&self) -> &[SectorHistoryEntry] {
        &self.0
    }

    pub fn open_entry(&self) -> Option<&SectorHistoryEntry> {
        self.0.last().filter(|e| e.is_open())
    }

    /// Most recent stay in `sector`.
    pub fn latest_for(&self, sector: SectorId) -> Option<&SectorHistoryEntry> {
        self.0.iter().rev().find(|e| e.setor_id == sector)
    }

    pub fn enter(
        &mut self,
        sector: SectorId,
        setor_nome: Option<String>,
        actor: &Actor,
        at: DateTime<Utc>,
    ) -> Result<(), FlowError> {
        if let Some(last) = self.0.last_mut() {
            if at < last.entrada_em {
                return Err(FlowError::HistoryOutOfOrder { sector });
            }
            if last.is_open() {
                last.saida_em = Some(at);
            }
        }
        self.0.push(SectorHistoryEntry {
            setor_id: sector,
            setor_nome,
            entrada_em: at,
            saida_em: None,
            funcionario: Some(actor.as_str().to_string()),
        });
        Ok(())
    }

    /// Checks ordering and the single-open-entry rule on data received from
    /// the backend.
    pub fn validate(&self) -> Result<(), FlowError> {
        if let Some(pair) = self.0.windows(2).find(|w| w[1].entrada_em < w[0].entrada_em) {
            return Err(FlowError::HistoryOutOfOrder {
                sector: pair[1].setor_id,
            });
        }
        let open = self.0.iter().filter(|e| e.is_open()).count();
        if open > 1 {
            return Err(FlowError::MultipleOpenEntries(open));
        }
        if open == 1 && self.open_entry().is_none() {
            return Err(FlowError::OpenEntryNotLast);
        }
        Ok(())
    }
}

impl From<Vec<SectorHistoryEntry>> for SectorHistory {
    fn from(entries: Vec<SectorHistoryEntry>) -> Self {
        Self(entries)
    }
}

/// Label for a stay length: whole hours, floored.
pub fn format_hours(duration: Duration) -> String {
    match duration.num_hours() {
        h if h < 1 => "menos de 1h".to_string(),
        1 => "1h".to_string(),
        h => format!("{h}h"),
    }
}
