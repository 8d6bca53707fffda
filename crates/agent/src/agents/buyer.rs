use async_trait::async_trait;
use carwise_core::{AgentError, Payload, StepParams};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::registry::Agent;

const LAKH: u64 = 100_000;
const BUDGET_PREFIXES: [&str; 3] = ["under ₹", "below ₹", "less than ₹"];
const BRANDS: [&str; 7] = ["Tata", "Hyundai", "MG", "Mahindra", "Maruti", "Honda", "Toyota"];
const MAX_RESULTS: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarListing {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    pub price: u64,
    pub fuel_type: String,
    pub location: String,
    pub rating: f64,
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fuel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make: Option<String>,
}

impl SearchCriteria {
    pub fn extract(query: &str) -> Self {
        let lowered = query.to_lowercase();
        let tokens = tokenize(query);
        let lowered_tokens = tokens.iter().map(|token| token.to_lowercase()).collect::<Vec<_>>();

        let fuel_type = if lowered_tokens.iter().any(|token| token == "ev")
            || lowered.contains("electric")
        {
            Some("Electric")
        } else if lowered.contains("petrol") || lowered.contains("gasoline") {
            Some("Petrol")
        } else if lowered.contains("diesel") {
            Some("Diesel")
        } else {
            None
        };

        let location = lowered_tokens
            .iter()
            .position(|token| token == "in")
            .and_then(|index| tokens.get(index + 1))
            .map(|token| title_case(token));

        let make = BRANDS
            .iter()
            .find(|brand| lowered_tokens.iter().any(|token| *token == brand.to_lowercase()))
            .map(|brand| brand.to_string());

        Self {
            max_price: extract_budget(&lowered),
            fuel_type: fuel_type.map(str::to_string),
            location,
            make,
        }
    }

    pub fn matches(&self, car: &CarListing) -> bool {
        self.max_price.map_or(true, |max_price| car.price <= max_price)
            && self.fuel_type.as_ref().map_or(true, |fuel_type| &car.fuel_type == fuel_type)
            && self.location.as_ref().map_or(true, |location| &car.location == location)
            && self.make.as_ref().map_or(true, |make| &car.make == make)
    }

    fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(max_price) = self.max_price {
            parts.push(format!("Budget: ₹{}L", max_price / LAKH));
        }
        if let Some(fuel_type) = &self.fuel_type {
            parts.push(format!("Fuel Type: {fuel_type}"));
        }
        if let Some(location) = &self.location {
            parts.push(format!("Location: {location}"));
        }
        if let Some(make) = &self.make {
            parts.push(format!("Make: {make}"));
        }
        parts.join(", ")
    }
}

/// Turns a free-text search into criteria and matches them against the listing
/// inventory.
pub struct BuyerAgent {
    inventory: Vec<CarListing>,
}

impl Default for BuyerAgent {
    fn default() -> Self {
        Self::with_inventory(default_inventory())
    }
}

impl BuyerAgent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inventory(inventory: Vec<CarListing>) -> Self {
        Self { inventory }
    }

    pub fn search(&self, criteria: &SearchCriteria) -> Vec<CarListing> {
        let mut cars = self
            .inventory
            .iter()
            .filter(|car| criteria.matches(car))
            .cloned()
            .collect::<Vec<_>>();
        cars.sort_by(|left, right| right.rating.total_cmp(&left.rating));
        cars.truncate(MAX_RESULTS);
        cars
    }

    fn search_payload(&self, payload: Payload) -> Result<Payload, AgentError> {
        let query = payload.get_str("query").unwrap_or_default().to_string();
        let criteria = SearchCriteria::extract(&query);
        let cars = self.search(&criteria);

        let criteria_value = serde_json::to_value(&criteria)
            .map_err(|error| AgentError::Internal(format!("buyer: {error}")))?;
        let cars_value = serde_json::to_value(&cars)
            .map_err(|error| AgentError::Internal(format!("buyer: {error}")))?;

        Ok(payload
            .with("action", json!("car_search"))
            .with("criteria", criteria_value)
            .with("summary", json!(format!("Found {} cars matching your criteria", cars.len())))
            .with("cars", cars_value)
            .with(
                "next_steps",
                json!(["Get detailed pricing", "Check financing options", "Book test drive"]),
            )
            .with(
                "reasoning",
                json!(format!(
                    "Based on your query '{query}', I identified key criteria: {}",
                    criteria.describe()
                )),
            ))
    }

    fn general_payload(&self, payload: Payload) -> Payload {
        payload
            .with("action", json!("general_assistance"))
            .with(
                "response",
                json!(
                    "I'm here to help you find the perfect car! I can assist with car search, \
                     financing options, and booking test drives."
                ),
            )
            .with(
                "suggestions",
                json!([
                    "Search for cars by budget and location",
                    "Compare financing options",
                    "Book test drives",
                    "Get market insights"
                ]),
            )
            .with("summary", json!("Provided general assistance and suggestions"))
    }
}

#[async_trait]
impl Agent for BuyerAgent {
    fn kind(&self) -> &str {
        "buyer"
    }

    fn display_name(&self) -> &str {
        "Buyer Agent"
    }

    async fn process(&self, payload: Payload, params: &StepParams) -> Result<Payload, AgentError> {
        match params.requested_action().unwrap_or("search") {
            "general" => Ok(self.general_payload(payload)),
            _ => self.search_payload(payload),
        }
    }
}

fn extract_budget(lowered_query: &str) -> Option<u64> {
    BUDGET_PREFIXES.iter().find_map(|prefix| {
        let start = lowered_query.find(prefix)? + prefix.len();
        let rest = &lowered_query[start..];
        let digits = rest.chars().take_while(char::is_ascii_digit).collect::<String>();
        if digits.is_empty() || !rest[digits.len()..].starts_with('l') {
            return None;
        }
        digits.parse::<u64>().ok().and_then(|lakhs| lakhs.checked_mul(LAKH))
    })
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|character: char| !character.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: &str,
    make: &str,
    model: &str,
    year: u16,
    price: u64,
    fuel_type: &str,
    location: &str,
    rating: f64,
    features: &[&str],
) -> CarListing {
    CarListing {
        id: id.to_string(),
        make: make.to_string(),
        model: model.to_string(),
        year,
        price,
        fuel_type: fuel_type.to_string(),
        location: location.to_string(),
        rating,
        features: features.iter().map(|feature| feature.to_string()).collect(),
    }
}

pub fn default_inventory() -> Vec<CarListing> {
    vec![
        listing(
            "car_001",
            "Tata",
            "Nexon EV",
            2023,
            1_400_000,
            "Electric",
            "Delhi",
            4.2,
            &["Fast Charging", "Connected Car Tech", "312km Range"],
        ),
        listing(
            "car_002",
            "MG",
            "ZS EV",
            2023,
            1_350_000,
            "Electric",
            "Delhi",
            4.0,
            &["AI Assistant", "419km Range", "Panoramic Sunroof"],
        ),
        listing(
            "car_003",
            "Hyundai",
            "Kona Electric",
            2022,
            1_450_000,
            "Electric",
            "Delhi",
            4.3,
            &["Premium Interior", "452km Range", "Wireless Charging"],
        ),
        listing(
            "car_004",
            "Tata",
            "Harrier",
            2023,
            1_600_000,
            "Diesel",
            "Mumbai",
            4.1,
            &["Panoramic Sunroof", "JBL Audio", "Terrain Modes"],
        ),
        listing(
            "car_005",
            "Hyundai",
            "Creta",
            2023,
            1_200_000,
            "Petrol",
            "Bangalore",
            4.4,
            &["Ventilated Seats", "Wireless Charging", "BlueLink"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use carwise_core::{Payload, StepParams};
    use serde_json::json;

    use super::{BuyerAgent, SearchCriteria};
    use crate::registry::Agent;

    #[test]
    fn extracts_budget_fuel_and_location() {
        let criteria = SearchCriteria::extract("Best EV under ₹15L in Delhi?");
        assert_eq!(criteria.max_price, Some(1_500_000));
        assert_eq!(criteria.fuel_type.as_deref(), Some("Electric"));
        assert_eq!(criteria.location.as_deref(), Some("Delhi"));
        assert_eq!(criteria.make, None);
    }

    #[test]
    fn extracts_brand_and_alternate_budget_phrasing() {
        let criteria = SearchCriteria::extract("find a hyundai diesel below ₹20l in mumbai");
        assert_eq!(criteria.max_price, Some(2_000_000));
        assert_eq!(criteria.fuel_type.as_deref(), Some("Diesel"));
        assert_eq!(criteria.location.as_deref(), Some("Mumbai"));
        assert_eq!(criteria.make.as_deref(), Some("Hyundai"));
    }

    #[test]
    fn budget_too_large_to_represent_is_ignored() {
        let criteria = SearchCriteria::extract("find a car under ₹999999999999999L");
        assert_eq!(criteria.max_price, None);

        let criteria = SearchCriteria::extract("find a car under ₹99999999999999999999999L");
        assert_eq!(criteria.max_price, None);
    }

    #[tokio::test]
    async fn oversized_budget_still_searches() {
        let output = BuyerAgent::new()
            .process(
                Payload::new().with("query", json!("find a car under ₹999999999999999L")),
                &StepParams::action("search"),
            )
            .await
            .expect("buyer search should succeed");

        assert_eq!(output.get("criteria"), Some(&json!({})));
        assert_eq!(output.get_array("cars").map(Vec::len), Some(3));
    }

    #[test]
    fn words_containing_ev_do_not_imply_electric() {
        let criteria = SearchCriteria::extract("find every petrol hatchback");
        assert_eq!(criteria.fuel_type.as_deref(), Some("Petrol"));
    }

    #[test]
    fn search_filters_and_ranks_by_rating() {
        let agent = BuyerAgent::new();
        let cars = agent.search(&SearchCriteria::extract("Best EV under ₹15L in Delhi?"));
        let ids = cars.iter().map(|car| car.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["car_003", "car_001", "car_002"]);
    }

    #[test]
    fn search_without_criteria_returns_top_three() {
        let cars = BuyerAgent::new().search(&SearchCriteria::default());
        let ids = cars.iter().map(|car| car.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["car_005", "car_003", "car_001"]);
    }

    #[tokio::test]
    async fn search_action_merges_results_onto_payload() {
        let input = Payload::new()
            .with("query", json!("Best EV under ₹15L in Delhi?"))
            .with("context", json!({"user_id": "u-1"}));

        let output = BuyerAgent::new()
            .process(input, &StepParams::action("search"))
            .await
            .expect("buyer search should succeed");

        assert_eq!(output.get_str("query"), Some("Best EV under ₹15L in Delhi?"));
        assert_eq!(output.get("context"), Some(&json!({"user_id": "u-1"})));
        assert_eq!(output.get_str("action"), Some("car_search"));
        assert_eq!(output.get_str("summary"), Some("Found 3 cars matching your criteria"));
        assert_eq!(output.get_array("cars").map(Vec::len), Some(3));
        assert_eq!(
            output.get("criteria").and_then(|criteria| criteria.get("max_price")),
            Some(&json!(1_500_000))
        );
        assert!(output.get_str("reasoning").is_some_and(|text| text.contains("Budget: ₹15L")));
    }

    #[tokio::test]
    async fn empty_params_default_to_search() {
        let output = BuyerAgent::new()
            .process(Payload::new().with("query", json!("petrol in Bangalore")), &StepParams::new())
            .await
            .expect("buyer search should succeed");
        assert_eq!(output.get_str("action"), Some("car_search"));
        assert_eq!(output.get_array("cars").map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn general_action_offers_suggestions() {
        let output = BuyerAgent::new()
            .process(Payload::new().with("query", json!("hello")), &StepParams::action("general"))
            .await
            .expect("general assistance should succeed");

        assert_eq!(output.get_str("query"), Some("hello"));
        assert_eq!(output.get_str("action"), Some("general_assistance"));
        assert_eq!(output.get_array("suggestions").map(Vec::len), Some(4));
        assert!(!output.contains_key("cars"));
    }
}
