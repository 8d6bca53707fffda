use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Closed set of agent kinds the orchestrator can route a chain step to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Buyer,
    Seller,
    Owner,
    Document,
    Dealer,
    Rag,
    Valuation,
    Loan,
}

impl AgentKind {
    pub const ALL: [AgentKind; 8] = [
        Self::Buyer,
        Self::Seller,
        Self::Owner,
        Self::Document,
        Self::Dealer,
        Self::Rag,
        Self::Valuation,
        Self::Loan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Seller => "seller",
            Self::Owner => "owner",
            Self::Document => "document",
            Self::Dealer => "dealer",
            Self::Rag => "rag",
            Self::Valuation => "valuation",
            Self::Loan => "loan",
        }
    }

    pub fn display_name(&self) -> String {
        display_name_for(self.as_str())
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AgentKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownAgentKind(value.to_string()))
    }
}

/// Title-cases an agent name and appends " Agent", e.g. `rag` -> `Rag Agent`.
pub fn display_name_for(name: &str) -> String {
    let mut chars = name.trim().chars();
    let titled = match chars.next() {
        Some(first) => {
            first.to_uppercase().chain(chars.flat_map(|ch| ch.to_lowercase())).collect::<String>()
        }
        None => String::new(),
    };
    format!("{titled} Agent")
}
