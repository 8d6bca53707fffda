use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntentKind {
    CarSearch,
    CarValuation,
    Maintenance,
    DocumentVerification,
    General,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CarSearch => "CAR_SEARCH",
            Self::CarValuation => "CAR_VALUATION",
            Self::Maintenance => "MAINTENANCE",
            Self::DocumentVerification => "DOCUMENT_VERIFICATION",
            Self::General => "GENERAL",
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub query: String,
    pub primary_agent: AgentKind,
}
