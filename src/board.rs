//! Quadro de status: pedidos agrupados por coluna e filtrados pelo departamento.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::flow::Pedido;
use crate::session::UserInfo;

/// Sector keywords understood by quick advance, with their labels.
pub const SECTOR_KEYWORDS: &[(&str, &str)] = &[
    ("atendimento", "Atendimento"),
    ("lavagem", "Lavagem"),
    ("pintura", "Pintura"),
    ("montagem", "Montagem"),
    ("acabamento", "Acabamento"),
];

/// Column names of the board, in the order the server sent them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardColumns(Vec<String>);

impl BoardColumns {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|c| c == name)
    }

    /// Columns the user may see: everything for admin, otherwise the columns
    /// whose name contains the user's department.
    pub fn visible_for(&self, user: &UserInfo) -> Vec<&str> {
        if user.is_admin() {
            return self.0.iter().map(String::as_str).collect();
        }
        let department = user.department_key();
        if department.is_empty() {
            return Vec::new();
        }
        self.0
            .iter()
            .filter(|c| c.to_lowercase().contains(&department))
            .map(String::as_str)
            .collect()
    }

    /// First column whose name contains `keyword`, case-insensitively.
    pub fn first_for_sector(&self, keyword: &str) -> Option<&str> {
        let keyword = keyword.to_lowercase();
        self.0
            .iter()
            .find(|c| c.to_lowercase().contains(&keyword))
            .map(String::as_str)
    }

    /// Sector keywords with at least one matching column.
    pub fn available_sectors(&self) -> Vec<(&'static str, &'static str)> {
        SECTOR_KEYWORDS
            .iter()
            .copied()
            .filter(|(keyword, _)| self.first_for_sector(keyword).is_some())
            .collect()
    }
}

impl<'de> Deserialize<'de> for BoardColumns {
    /// Accepts `{"column": [...], ...}` (key order preserved) or `["column", ...]`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Keyed(Map<String, Value>),
            Listed(Vec<String>),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Keyed(map) => Self(map.into_iter().map(|(k, _)| k).collect()),
            Raw::Listed(names) => Self(names),
        })
    }
}

#[derive(Debug)]
pub struct BoardColumn<'a> {
    pub name: &'a str,
    pub orders: Vec<&'a Pedido>,
}

/// Read-side grouping of orders by status.
#[derive(Debug)]
pub struct BoardProjection<'a> {
    pub columns: Vec<BoardColumn<'a>>,
    /// Orders whose status matches no configured column.
    pub orphans: Vec<&'a Pedido>,
}

impl<'a> BoardProjection<'a> {
    pub fn build(columns: &'a BoardColumns, orders: &'a [Pedido], user: &UserInfo) -> Self {
        let visible = columns
            .visible_for(user)
            .into_iter()
            .map(|name| BoardColumn {
                name,
                orders: orders.iter().filter(|o| o.status == name).collect(),
            })
            .collect();
        let orphans = orders
            .iter()
            .filter(|o| !columns.contains(&o.status))
            .collect();

        Self {
            columns: visible,
            orphans,
        }
    }

    #[cfg(test)]
    pub fn column(&self, name: &str) -> Option<&BoardColumn<'a>> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn total_orders(&self) -> usize {
        self.columns.iter().map(|c| c.orders.len()).sum()
    }
}

/// Where quick advance should send an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickTarget {
    Next,
    Prev,
    /// A column of the full board, or a sector keyword.
    Named(String),
}

impl std::str::FromStr for QuickTarget {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "next" => QuickTarget::Next,
            "prev" => QuickTarget::Prev,
            other => QuickTarget::Named(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuickOutcome {
    /// Change the order's status to `status`.
    Move { status: String, action: String },
    /// `next` from the last visible column.
    AlreadyFinal,
    /// No column matches the requested target.
    NoTarget(String),
}

/// Finds an order by id, then by client CPF comparing digits only.
pub fn find_order<'a>(orders: &'a [Pedido], query: &str) -> Option<&'a Pedido> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if let Some(found) = orders.iter().find(|o| o.id == query) {
        return Some(found);
    }
    let digits = only_digits(query);
    if digits.is_empty() {
        return None;
    }
    orders
        .iter()
        .find(|o| o.client_cpf.as_deref().map(only_digits).as_deref() == Some(digits.as_str()))
}

fn only_digits(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Resolves the target status for `order`.
///
/// `next`/`prev` move within the columns visible to `user`; an order in a
/// column the user does not see moves to the first visible column on `next`.
pub fn resolve_quick(
    columns: &BoardColumns,
    user: &UserInfo,
    order: &Pedido,
    target: &QuickTarget,
) -> QuickOutcome {
    let visible = columns.visible_for(user);
    let current = visible.iter().position(|c| *c == order.status);

    match target {
        QuickTarget::Next => {
            let next = current.map_or(0, |i| i + 1);
            match visible.get(next) {
                Some(status) => QuickOutcome::Move {
                    status: status.to_string(),
                    action: format!("avançado para {status}"),
                },
                None => QuickOutcome::AlreadyFinal,
            }
        }
        QuickTarget::Prev => match current.and_then(|i| i.checked_sub(1)) {
            Some(prev) => QuickOutcome::Move {
                status: visible[prev].to_string(),
                action: format!("voltado para {}", visible[prev]),
            },
            None => QuickOutcome::NoTarget("prev".to_string()),
        },
        QuickTarget::Named(name) if columns.contains(name) => QuickOutcome::Move {
            status: name.clone(),
            action: format!("movido para {name}"),
        },
        QuickTarget::Named(keyword) => {
            let label = SECTOR_KEYWORDS
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(keyword))
                .map(|(_, label)| *label);
            match (label, columns.first_for_sector(keyword)) {
                (Some(label), Some(status)) => QuickOutcome::Move {
                    status: status.to_string(),
                    action: format!("movido para {label}"),
                },
                _ => QuickOutcome::NoTarget(keyword.clone()),
            }
        }
    }
}
