use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentKind;
use crate::domain::intent::{Intent, IntentKind};
use crate::domain::payload::StepParams;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainStep {
    pub agent: AgentKind,
    pub params: StepParams,
}

impl ChainStep {
    pub fn new(agent: AgentKind, params: StepParams) -> Self {
        Self { agent, params }
    }

    fn with_action(agent: AgentKind, action: &str) -> Self {
        Self::new(agent, StepParams::action(action))
    }
}

/// Maps an intent to the ordered agent steps that serve it.
#[derive(Clone, Debug, Default)]
pub struct ChainBuilder;

impl ChainBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, intent: &Intent) -> Vec<ChainStep> {
        self.build_for(intent.kind)
    }

    pub fn build_for(&self, kind: IntentKind) -> Vec<ChainStep> {
        use AgentKind::{Buyer, Dealer, Document, Loan, Owner, Rag, Seller, Valuation};

        match kind {
            IntentKind::CarSearch => vec![
                ChainStep::with_action(Buyer, "search"),
                ChainStep::new(
                    Rag,
                    StepParams::new().with("domain", serde_json::Value::from("automotive")),
                ),
                ChainStep::with_action(Valuation, "price_check"),
                ChainStep::with_action(Loan, "pre_check"),
                ChainStep::with_action(Dealer, "book_test_drive"),
            ],
            IntentKind::CarValuation => vec![
                ChainStep::with_action(Document, "verify"),
                ChainStep::with_action(Valuation, "full_assessment"),
                ChainStep::with_action(Seller, "create_listing"),
            ],
            IntentKind::Maintenance => vec![
                ChainStep::with_action(Owner, "maintenance_check"),
                ChainStep::with_action(Dealer, "book_service"),
            ],
            IntentKind::DocumentVerification => {
                vec![ChainStep::with_action(Document, "full_verification")]
            }
            IntentKind::General => vec![ChainStep::with_action(Buyer, "general")],
        }
    }
}
