use async_trait::async_trait;
use carwise_core::{AgentError, Payload, StepParams};
use serde_json::{json, Value};

use super::{car_name, car_str, cars_from};
use crate::registry::Agent;

const BUDGET_SEGMENT_CEILING: f64 = 1_500_000.0;

struct ModelKnowledge {
    model: &'static str,
    expert_review: &'static str,
    resale_value: &'static str,
    safety_rating: &'static str,
}

static KNOWLEDGE: [ModelKnowledge; 5] = [
    ModelKnowledge {
        model: "Nexon EV",
        expert_review: "Strong value proposition with proven reliability and a dense service network",
        resale_value: "Good (65-70% after 3 years)",
        safety_rating: "5-star Global NCAP",
    },
    ModelKnowledge {
        model: "ZS EV",
        expert_review: "Feature-rich cabin with long real-world range; service network still growing",
        resale_value: "Moderate (55-60% after 3 years)",
        safety_rating: "5-star Euro NCAP",
    },
    ModelKnowledge {
        model: "Kona Electric",
        expert_review: "Refined drivetrain and premium build; priced at the top of the segment",
        resale_value: "Good (60-65% after 3 years)",
        safety_rating: "5-star Euro NCAP",
    },
    ModelKnowledge {
        model: "Harrier",
        expert_review: "Commanding road presence with a capable diesel; ride quality is a highlight",
        resale_value: "Good (65-70% after 3 years)",
        safety_rating: "5-star Global NCAP",
    },
    ModelKnowledge {
        model: "Creta",
        expert_review: "Segment benchmark for features and comfort with excellent resale",
        resale_value: "Excellent (70-75% after 3 years)",
        safety_rating: "3-star Global NCAP",
    },
];

static DEFAULT_KNOWLEDGE: ModelKnowledge = ModelKnowledge {
    model: "",
    expert_review: "Solid choice in its segment",
    resale_value: "Average (55-60% after 3 years)",
    safety_rating: "Not rated",
};

/// Annotates candidate cars with expert knowledge and derives market insights
/// from the set as a whole.
#[derive(Clone, Debug, Default)]
pub struct RagAgent;

impl RagAgent {
    pub fn new() -> Self {
        Self
    }

    fn knowledge_for(model: &str) -> &'static ModelKnowledge {
        KNOWLEDGE
            .iter()
            .find(|entry| entry.model.eq_ignore_ascii_case(model))
            .unwrap_or(&DEFAULT_KNOWLEDGE)
    }

    fn enhance(car: &Value) -> Value {
        let knowledge = Self::knowledge_for(car_str(car, "model"));
        let mut enhanced = car.clone();
        if let Some(fields) = enhanced.as_object_mut() {
            fields.insert("expert_review".to_string(), json!(knowledge.expert_review));
            fields.insert("resale_value".to_string(), json!(knowledge.resale_value));
            fields.insert("safety_rating".to_string(), json!(knowledge.safety_rating));
        }
        enhanced
    }

    fn insights(cars: &[Value]) -> Vec<String> {
        let mut insights = Vec::new();
        let any = |predicate: fn(&Value) -> bool| cars.iter().any(|car| predicate(car));

        if any(|car| car_str(car, "fuel_type") == "Electric") {
            insights.push(
                "EV adoption in India grew over 150% year on year; early buyers benefit from state subsidies"
                    .to_string(),
            );
            insights.push(
                "Public charging coverage is expanding fastest in metro cities and along national highways"
                    .to_string(),
            );
        }
        if any(|car| car_str(car, "location") == "Delhi") {
            insights.push(
                "Delhi offers road tax exemption and registration fee waivers for EVs".to_string(),
            );
        }
        if any(|car| car_str(car, "location") == "Mumbai") {
            insights.push(
                "Mumbai dealers typically run festive discounts during Ganesh Chaturthi"
                    .to_string(),
            );
        }
        if any(|car| {
            car.get("price")
                .and_then(Value::as_f64)
                .is_some_and(|price| price <= BUDGET_SEGMENT_CEILING)
        }) {
            insights.push(
                "The sub ₹15L segment is the most competitive; negotiate on accessories and extended warranty"
                    .to_string(),
            );
        }
        if any(|car| car_str(car, "make") == "Tata") {
            insights.push(
                "Tata vehicles hold strong resale value thanks to wide service availability"
                    .to_string(),
            );
        }
        insights
    }
}

#[async_trait]
impl Agent for RagAgent {
    fn kind(&self) -> &str {
        "rag"
    }

    fn display_name(&self) -> &str {
        "Rag Agent"
    }

    async fn process(&self, payload: Payload, _params: &StepParams) -> Result<Payload, AgentError> {
        let cars = cars_from(payload.get("cars"));
        let enhanced = cars.iter().map(Self::enhance).collect::<Vec<_>>();
        let insights = Self::insights(&enhanced);
        let reviewed = enhanced.iter().map(car_name).collect::<Vec<_>>();

        Ok(payload
            .with("action", json!("knowledge_enhancement"))
            .with(
                "summary",
                json!(format!(
                    "Enhanced {} cars with market intelligence and expert insights",
                    enhanced.len()
                )),
            )
            .with("cars", Value::Array(enhanced))
            .with("insights", json!(insights))
            .with("reviewed_models", json!(reviewed)))
    }
}
