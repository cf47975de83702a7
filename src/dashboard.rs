//! Painéis de acompanhamento: estatísticas por setor, pedidos atrasados e
//! indicadores gerais.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::flow::Pedido;

const DONE_STATUS: &str = "concluido";
const IN_PROGRESS_STATUS: &str = "em-processamento";
const STARTED_STATUS: &str = "iniciado";

/// One order as listed in a sector's statistics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorStatsOrder {
    pub id: String,
    #[serde(default)]
    pub codigo: Option<String>,
    #[serde(default)]
    pub cliente: Option<String>,
    /// Hours spent in the sector so far.
    #[serde(default)]
    pub tempo_no_setor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectorStats {
    #[serde(default)]
    pub nome: String,
    #[serde(default)]
    pub cor: String,
    #[serde(default)]
    pub quantidade: u32,
    #[serde(default)]
    pub pedidos: Vec<SectorStatsOrder>,
}

impl SectorStats {
    pub fn pedidos_label(&self) -> String {
        pedidos_label(self.quantidade)
    }
}

pub fn pedidos_label(count: u32) -> String {
    if count == 1 {
        "1 pedido".to_string()
    } else {
        format!("{count} pedidos")
    }
}

/// Answer of `/setores/estatisticas`, keyed by sector id in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorStatistics(Vec<(String, SectorStats)>);

impl SectorStatistics {
    pub fn sectors(&self) -> &[(String, SectorStats)] {
        &self.0
    }

    #[cfg(test)]
    pub fn get(&self, sector_id: &str) -> Option<&SectorStats> {
        self.0
            .iter()
            .find(|(id, _)| id == sector_id)
            .map(|(_, stats)| stats)
    }

    pub fn total_orders(&self) -> u32 {
        self.0.iter().map(|(_, s)| s.quantidade).sum()
    }
}

impl<'de> Deserialize<'de> for SectorStatistics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        map.into_iter()
            .map(|(id, value)| {
                serde_json::from_value(value)
                    .map(|stats| (id, stats))
                    .map_err(serde::de::Error::custom)
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Leve,
    Moderado,
    Grave,
}

impl Severity {
    pub fn from_days(days: i64) -> Self {
        match days {
            ..=1 => Severity::Leve,
            2..=3 => Severity::Moderado,
            _ => Severity::Grave,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Leve => "Atraso Leve",
            Severity::Moderado => "Atraso Moderado",
            Severity::Grave => "Atraso Grave",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverdueOrder {
    pub id: String,
    pub cliente: String,
    pub modelo_tenis: String,
    pub data_prevista_entrega: String,
    pub status: String,
    pub dias_atraso: i64,
}

impl OverdueOrder {
    pub fn severity(&self) -> Severity {
        Severity::from_days(self.dias_atraso)
    }
}

/// Reads an expected delivery date: RFC 3339, or a bare `YYYY-MM-DD` taken
/// as midnight UTC.
pub fn parse_expected(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// Whole days late, rounded up. Zero when not late.
pub fn days_late(expected: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (now - expected).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;
    (millis + DAY_MS - 1) / DAY_MS
}

/// Late orders that are not done, most late first. Orders without a
/// readable expected date are skipped.
pub fn overdue_orders(orders: &[Pedido], now: DateTime<Utc>) -> Vec<OverdueOrder> {
    let mut late: Vec<OverdueOrder> = orders
        .iter()
        .filter(|o| o.status != DONE_STATUS)
        .filter_map(|o| {
            let raw = o.data_prevista_entrega.as_deref()?;
            let dias_atraso = days_late(parse_expected(raw)?, now);
            (dias_atraso > 0).then(|| OverdueOrder {
                id: o.id.clone(),
                cliente: o.client_display().to_string(),
                modelo_tenis: o.modelo_tenis.clone(),
                data_prevista_entrega: raw.to_string(),
                status: o.status.clone(),
                dias_atraso,
            })
        })
        .collect();
    late.sort_by(|a, b| b.dias_atraso.cmp(&a.dias_atraso));
    late
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KpiSummary {
    pub total: usize,
    pub concluidos: usize,
    pub em_processamento: usize,
    pub iniciados: usize,
    /// Percent of done orders, rounded.
    pub taxa_conclusao: u32,
}

pub fn summarize(orders: &[Pedido]) -> KpiSummary {
    let count = |status: &str| orders.iter().filter(|o| o.status == status).count();
    let total = orders.len();
    let concluidos = count(DONE_STATUS);
    let taxa_conclusao = if total == 0 {
        0
    } else {
        ((concluidos as f64 / total as f64) * 100.0).round() as u32
    };

    KpiSummary {
        total,
        concluidos,
        em_processamento: count(IN_PROGRESS_STATUS),
        iniciados: count(STARTED_STATUS),
        taxa_conclusao,
    }
}
