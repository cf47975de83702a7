//! Modelo de domínio da oficina: setores, fluxo de cada pedido e histórico.
//!
//! Nada aqui faz I/O; as transições são validadas e aplicadas em memória.

mod error;
mod history;
mod order;
mod sector;

pub use error::FlowError;
pub use history::{Actor, format_hours};
pub use order::{Pedido, SectorTransition, StageProgress, StageStatus};
pub use sector::{SectorCatalog, SectorId};
