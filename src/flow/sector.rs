//! Setores da oficina, o catálogo configurado e o fluxo de cada pedido.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FlowError;

/// The production sectors of the workshop.
///
/// Serialized as the kebab-case ids the backend uses (`atendimento-inicial`,
/// `sapataria`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectorId {
    AtendimentoInicial,
    Sapataria,
    Costura,
    Lavagem,
    Acabamento,
    Pintura,
    AtendimentoFinal,
}

impl SectorId {
    pub const ALL: [SectorId; 7] = [
        SectorId::AtendimentoInicial,
        SectorId::Sapataria,
        SectorId::Costura,
        SectorId::Lavagem,
        SectorId::Acabamento,
        SectorId::Pintura,
        SectorId::AtendimentoFinal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectorId::AtendimentoInicial => "atendimento-inicial",
            SectorId::Sapataria => "sapataria",
            SectorId::Costura => "costura",
            SectorId::Lavagem => "lavagem",
            SectorId::Acabamento => "acabamento",
            SectorId::Pintura => "pintura",
            SectorId::AtendimentoFinal => "atendimento-final",
        }
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectorId {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SectorId::ALL
            .into_iter()
            .find(|id| id.as_str() == wanted)
            .ok_or_else(|| FlowError::UnknownSector(s.to_string()))
    }
}

/// A configured sector: display name, color and position in the default flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sector {
    pub id: SectorId,
    pub nome: String,
    pub cor: String,
    pub ordem: u32,
    pub obrigatorio: bool,
    pub ativo: bool,
}

impl Sector {
    fn new(id: SectorId, nome: &str, cor: &str, ordem: u32, obrigatorio: bool) -> Self {
        Self {
            id,
            nome: nome.to_string(),
            cor: cor.to_string(),
            ordem,
            obrigatorio,
            ativo: true,
        }
    }
}

const FALLBACK_COLOR: &str = "#ddd";

/// The set of sectors known to the workshop.
#[derive(Debug, Clone)]
pub struct SectorCatalog {
    sectors: Vec<Sector>,
}

impl Default for SectorCatalog {
    fn default() -> Self {
        Self {
            sectors: vec![
                Sector::new(SectorId::AtendimentoInicial, "Atendimento", "#2196F3", 1, true),
                Sector::new(SectorId::Sapataria, "Sapataria", "#FF9800", 2, false),
                Sector::new(SectorId::Costura, "Costura", "#9C27B0", 3, false),
                Sector::new(SectorId::Lavagem, "Lavagem", "#00BCD4", 4, false),
                Sector::new(SectorId::Acabamento, "Acabamento", "#4CAF50", 5, false),
                Sector::new(SectorId::Pintura, "Pintura", "#F44336", 6, false),
                Sector::new(SectorId::AtendimentoFinal, "Finalizado", "#4CAF50", 7, true),
            ],
        }
    }
}

impl SectorCatalog {
    #[cfg(test)]
    pub fn new(sectors: Vec<Sector>) -> Self {
        Self { sectors }
    }

    pub fn get(&self, id: SectorId) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.id == id)
    }

    pub fn name(&self, id: SectorId) -> &str {
        self.get(id).map(|s| s.nome.as_str()).unwrap_or(id.as_str())
    }

    pub fn color(&self, id: SectorId) -> &str {
        self.get(id).map(|s| s.cor.as_str()).unwrap_or(FALLBACK_COLOR)
    }

    /// Active sectors sorted by their order index.
    pub fn default_flow(&self) -> SectorFlow {
        let mut active: Vec<&Sector> = self.sectors.iter().filter(|s| s.ativo).collect();
        active.sort_by_key(|s| s.ordem);
        SectorFlow(active.into_iter().map(|s| s.id).collect())
    }

    /// Every active mandatory sector must be present in `flow`.
    pub fn check_flow(&self, flow: &SectorFlow) -> Result<(), FlowError> {
        match self
            .sectors
            .iter()
            .find(|s| s.ativo && s.obrigatorio && !flow.contains(s.id))
        {
            Some(missing) => Err(FlowError::MissingMandatory(missing.id)),
            None => Ok(()),
        }
    }
}

/// Outcome of asking a flow what comes after the current sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next(SectorId),
    /// Nothing remains after the current sector.
    Terminal,
}

/// Ordered list of sectors an order goes through. Sectors are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectorFlow(Vec<SectorId>);

impl SectorFlow {
    pub fn new(sectors: Vec<SectorId>) -> Result<Self, FlowError> {
        for (i, id) in sectors.iter().enumerate() {
            if sectors[..i].contains(id) {
                return Err(FlowError::DuplicateSector(*id));
            }
        }
        Ok(Self(sectors))
    }

    pub fn sectors(&self) -> &[SectorId] {
        &self.0
    }

    pub fn contains(&self, id: SectorId) -> bool {
        self.0.contains(&id)
    }

    pub fn position(&self, id: SectorId) -> Option<usize> {
        self.0.iter().position(|s| *s == id)
    }

    pub fn last(&self) -> Option<SectorId> {
        self.0.last().copied()
    }

    pub fn is_last(&self, id: SectorId) -> bool {
        self.last() == Some(id)
    }

    /// The sector strictly after `current`. With no current sector the first
    /// sector of the flow is next.
    pub fn next_after(&self, current: Option<SectorId>) -> Result<Advance, FlowError> {
        let next = match current {
            None => self.0.first().copied(),
            Some(id) => {
                let pos = self.position(id).ok_or(FlowError::NotInFlow(id))?;
                self.0.get(pos + 1).copied()
            }
        };
        Ok(next.map_or(Advance::Terminal, Advance::Next))
    }
}
