use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentCapability {
    pub name: String,
    pub description: String,
    pub capabilities: Vec<String>,
    pub status: String,
}

impl AgentCapability {
    fn active(name: &str, description: &str, capabilities: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            capabilities: capabilities.iter().map(|capability| capability.to_string()).collect(),
            status: "active".to_string(),
        }
    }
}

/// Static catalog of advertised agents. It describes the product surface and is
/// not derived from which agents the registry has constructed.
pub fn agent_capabilities() -> Vec<AgentCapability> {
    vec![
        AgentCapability::active(
            "Buyer Agent",
            "Helps buyers find cars, compare options, and coordinate purchases",
            &["car_search", "financing_options", "test_drive_booking"],
        ),
        AgentCapability::active(
            "Seller Agent",
            "Assists sellers with valuation, listing creation, and fraud prevention",
            &["car_valuation", "listing_optimization", "fraud_detection"],
        ),
        AgentCapability::active(
            "Owner Agent",
            "Manages vehicle ownership lifecycle including maintenance and insurance",
            &["maintenance_scheduling", "insurance_management", "predictive_maintenance"],
        ),
        AgentCapability::active(
            "Document Agent",
            "Verifies documents, detects fraud, and integrates with government APIs",
            &["document_verification", "fraud_detection", "government_api_integration"],
        ),
        AgentCapability::active(
            "Dealer Agent",
            "Manages dealer operations, inventory, and customer interactions",
            &["inventory_management", "test_drive_booking", "offer_negotiation"],
        ),
        AgentCapability::active(
            "RAG Agent",
            "Provides market intelligence and expert knowledge retrieval",
            &["market_analysis", "expert_insights", "competitive_intelligence"],
        ),
        AgentCapability::active(
            "Loan Agent",
            "Handles financing options, loan pre-approval, and subsidy information",
            &["loan_comparison", "pre_approval", "subsidy_calculation"],
        ),
        AgentCapability::active(
            "Valuation Agent",
            "Estimates market value and scores how fairly a listing is priced",
            &["market_valuation", "deal_scoring", "market_summary"],
        ),
    ]
}
