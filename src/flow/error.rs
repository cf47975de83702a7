//! Erros de validação local do modelo de setores.
//!
//! Todas as variantes de [`FlowError`] são detectadas antes de qualquer
//! requisição de rede: uma transição rejeitada aqui nunca chega ao backend.

use thiserror::Error;

use super::sector::SectorId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Toda transição exige o nome do funcionário responsável.
    #[error("responsible employee name must not be empty")]
    MissingActor,

    #[error("unknown sector: {0}")]
    UnknownSector(String),

    #[error("sector {0} appears more than once in the flow")]
    DuplicateSector(SectorId),

    #[error("sector {0} is not part of this order's flow")]
    NotInFlow(SectorId),

    #[error("order is already in sector {0}")]
    AlreadyInSector(SectorId),

    #[error("mandatory sector {0} is missing from the flow")]
    MissingMandatory(SectorId),

    /// Uma entrada nova não pode começar antes da última registrada.
    #[error("history entry for {sector} starts before the previous entry")]
    HistoryOutOfOrder { sector: SectorId },

    #[error("sector history has {0} open entries, at most one is allowed")]
    MultipleOpenEntries(usize),

    #[error("the open sector history entry must be the last one")]
    OpenEntryNotLast,

    #[error("status {0:?} does not match any board column")]
    UnknownColumn(String),
}
