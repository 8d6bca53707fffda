//! Built-in agents and the factory that constructs them.
//!
//! Only buyer, rag, valuation and loan ship an implementation. Dealer, seller,
//! owner and document are advertised in the catalog but report
//! [`AgentBuildError::Unavailable`], so the registry serves them with
//! [`MockAgent`].

pub mod buyer;
pub mod loan;
pub mod mock;
pub mod rag;
pub mod valuation;

use std::collections::BTreeSet;
use std::sync::Arc;

use carwise_core::{AgentBuildError, AgentError, AgentKind};
use serde_json::Value;

use crate::registry::{Agent, AgentFactory};

pub use buyer::BuyerAgent;
pub use loan::LoanAgent;
pub use mock::MockAgent;
pub use rag::RagAgent;
pub use valuation::ValuationAgent;

#[derive(Clone, Debug, Default)]
pub struct BuiltinAgentFactory {
    disabled: BTreeSet<AgentKind>,
}

impl BuiltinAgentFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disabled(disabled: impl IntoIterator<Item = AgentKind>) -> Self {
        Self { disabled: disabled.into_iter().collect() }
    }
}

impl AgentFactory for BuiltinAgentFactory {
    fn build(&self, kind: &str) -> Result<Arc<dyn Agent>, AgentBuildError> {
        let unavailable = || AgentBuildError::Unavailable { kind: kind.to_string() };
        let agent_kind = kind.parse::<AgentKind>().map_err(|_| unavailable())?;

        if self.disabled.contains(&agent_kind) {
            return Err(AgentBuildError::Disabled { kind: agent_kind.as_str().to_string() });
        }

        match agent_kind {
            AgentKind::Buyer => Ok(Arc::new(BuyerAgent::new())),
            AgentKind::Rag => Ok(Arc::new(RagAgent::new())),
            AgentKind::Valuation => Ok(Arc::new(ValuationAgent::new())),
            AgentKind::Loan => Ok(Arc::new(LoanAgent::new())),
            AgentKind::Dealer | AgentKind::Seller | AgentKind::Owner | AgentKind::Document => {
                Err(unavailable())
            }
        }
    }
}

pub(crate) fn cars_from(value: Option<&Value>) -> Vec<Value> {
    value.and_then(Value::as_array).cloned().unwrap_or_default()
}

pub(crate) fn car_str<'a>(car: &'a Value, field: &str) -> &'a str {
    car.get(field).and_then(Value::as_str).unwrap_or_default()
}

pub(crate) fn car_name(car: &Value) -> String {
    format!("{} {}", car_str(car, "make"), car_str(car, "model")).trim().to_string()
}

/// Price used for financing and valuation: market value when a valuation step
/// already ran, list price otherwise.
pub(crate) fn car_price(
    car: &Value,
    agent: &str,
    prefer_market_value: bool,
) -> Result<f64, AgentError> {
    let market_value =
        if prefer_market_value { car.get("market_value").and_then(Value::as_f64) } else { None };
    market_value
        .or_else(|| car.get("price").and_then(Value::as_f64))
        .filter(|price| price.is_finite() && *price > 0.0)
        .ok_or_else(|| {
            AgentError::InvalidInput(format!(
                "{agent}: car `{}` has no positive numeric price",
                car.get("id").and_then(Value::as_str).unwrap_or("unknown")
            ))
        })
}

/// Rounds to whole rupees. Negative and NaN amounts become zero and amounts past
/// `u64::MAX` saturate.
pub(crate) fn rupees(amount: f64) -> u64 {
    if amount.is_nan() || amount <= 0.0 {
        return 0;
    }
    let rounded = amount.round();
    if rounded >= u64::MAX as f64 {
        u64::MAX
    } else {
        rounded as u64
    }
}
