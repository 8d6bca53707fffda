use async_trait::async_trait;
use carwise_core::{AgentError, Payload, StepParams};
use serde::Serialize;
use serde_json::{json, Value};

use super::{car_name, car_price, car_str, cars_from, rupees};
use crate::registry::Agent;

pub const REFERENCE_YEAR: i64 = 2024;
const YEARLY_DEPRECIATION: f64 = 0.08;
/// Age beyond which depreciation stops growing; keeps every factor above -100%.
const MAX_DEPRECIATION_YEARS: i64 = 12;
const EV_DEMAND: f64 = 0.05;
const BRAND_PREMIUMS: [(&str, f64); 5] =
    [("Tata", 0.02), ("Hyundai", 0.03), ("MG", -0.01), ("Mahindra", 0.01), ("Maruti", 0.025)];
const LOCATION_PREMIUMS: [(&str, f64); 5] =
    [("Delhi", 0.03), ("Mumbai", 0.04), ("Bangalore", 0.02), ("Chennai", 0.01), ("Pune", 0.015)];
const CLEAR_DIFFERENCE: f64 = 50_000.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MarketFactor {
    pub name: &'static str,
    pub impact: f64,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DealScore {
    Excellent,
    Good,
    Fair,
    Overpriced,
}

impl DealScore {
    /// Bands on `(market - list) / list` in percent.
    pub fn from_variance(variance_percent: f64) -> Self {
        if variance_percent > 5.0 {
            Self::Excellent
        } else if variance_percent > 0.0 {
            Self::Good
        } else if variance_percent > -5.0 {
            Self::Fair
        } else {
            Self::Overpriced
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Excellent => "Great value deal",
            Self::Good => "Fair market value",
            Self::Fair => "Slightly above market",
            Self::Overpriced => "Above market value",
        }
    }
}

pub fn market_factors(car: &Value) -> Vec<MarketFactor> {
    let mut factors = Vec::new();
    let fuel_type = car_str(car, "fuel_type");
    let make = car_str(car, "make");
    let location = car_str(car, "location");

    if fuel_type == "Electric" {
        factors.push(MarketFactor {
            name: "EV Market Demand",
            impact: EV_DEMAND,
            description: "High demand for electric vehicles with government incentives".to_string(),
        });
    }
    if let Some((_, impact)) = BRAND_PREMIUMS.iter().find(|(brand, _)| *brand == make) {
        factors.push(MarketFactor {
            name: "Brand Premium",
            impact: *impact,
            description: format!("{make} brand positioning and reliability reputation"),
        });
    }
    let age_years = car
        .get("year")
        .and_then(Value::as_i64)
        .map_or(0, |year| REFERENCE_YEAR.checked_sub(year).unwrap_or(i64::MAX))
        .clamp(0, MAX_DEPRECIATION_YEARS);
    if age_years > 0 {
        factors.push(MarketFactor {
            name: "Model Year Depreciation",
            impact: -YEARLY_DEPRECIATION * age_years as f64,
            description: format!("{age_years} year(s) old model with standard depreciation"),
        });
    }
    if let Some((_, impact)) = LOCATION_PREMIUMS.iter().find(|(city, _)| *city == location) {
        factors.push(MarketFactor {
            name: "Location Premium",
            impact: *impact,
            description: format!("{location} market pricing dynamics"),
        });
    }
    match fuel_type {
        "Diesel" => factors.push(MarketFactor {
            name: "Diesel Market Shift",
            impact: -0.02,
            description: "Declining diesel preference due to emission norms".to_string(),
        }),
        "Petrol" => factors.push(MarketFactor {
            name: "Petrol Stability",
            impact: 0.01,
            description: "Stable petrol market with consistent demand".to_string(),
        }),
        _ => {}
    }
    match car.get("rating").and_then(Value::as_f64) {
        Some(rating) if rating >= 4.2 => factors.push(MarketFactor {
            name: "High Rating Premium",
            impact: 0.02,
            description: "Premium for highly-rated vehicles".to_string(),
        }),
        Some(rating) if rating <= 3.8 => factors.push(MarketFactor {
            name: "Rating Discount",
            impact: -0.015,
            description: "Discount due to lower market rating".to_string(),
        }),
        _ => {}
    }
    factors
}

/// Prices each candidate car against market factors and summarises the set.
#[derive(Clone, Debug, Default)]
pub struct ValuationAgent;

impl ValuationAgent {
    pub fn new() -> Self {
        Self
    }

    fn appraise(car: &Value) -> Result<Value, AgentError> {
        let list_price = car_price(car, "valuation", false)?;
        let factors = market_factors(car);
        let market_value =
            factors.iter().fold(list_price, |price, factor| price * (1.0 + factor.impact)).round();
        let variance_percent = round_to_tenth((market_value - list_price) / list_price * 100.0);
        let deal_score = DealScore::from_variance(variance_percent);

        let mut appraised = car.clone();
        if let Some(fields) = appraised.as_object_mut() {
            fields.insert("market_value".to_string(), json!(rupees(market_value)));
            fields.insert(
                "price_analysis".to_string(),
                json!({
                    "list_price": rupees(list_price),
                    "market_price": rupees(market_value),
                    "factors": factors,
                    "variance_percent": variance_percent,
                }),
            );
            fields.insert(
                "deal_score".to_string(),
                json!({"score": deal_score, "description": deal_score.description()}),
            );
            fields.insert(
                "price_recommendation".to_string(),
                price_recommendation(market_value - list_price),
            );
        }
        Ok(appraised)
    }

    fn market_summary(cars: &[Value]) -> Value {
        if cars.is_empty() {
            return json!({"message": "No cars to analyze"});
        }

        let count = cars.len() as f64;
        let market_values = cars
            .iter()
            .filter_map(|car| car.get("market_value").and_then(Value::as_f64))
            .collect::<Vec<_>>();
        let list_prices = cars
            .iter()
            .filter_map(|car| car.get("price").and_then(Value::as_f64))
            .collect::<Vec<_>>();
        let average_variance = round_to_tenth(
            cars.iter()
                .filter_map(|car| {
                    car.pointer("/price_analysis/variance_percent").and_then(Value::as_f64)
                })
                .sum::<f64>()
                / count,
        );

        let best_deal = cars
            .iter()
            .filter_map(|car| {
                let savings = car.get("market_value")?.as_f64()? - car.get("price")?.as_f64()?;
                (savings > 0.0).then_some((car, savings))
            })
            .max_by(|(_, left), (_, right)| left.total_cmp(right))
            .map(|(car, savings)| json!({"car": car_name(car), "savings": rupees(savings)}));

        let market_trend = if average_variance > 2.0 {
            "Buyer's market - prices below market value"
        } else if average_variance < -2.0 {
            "Seller's market - prices above market value"
        } else {
            "Balanced market - fair pricing"
        };
        let recommendation = if average_variance > 3.0 {
            "Great time to buy - multiple vehicles priced below market value"
        } else if average_variance < -3.0 {
            "Consider waiting or expanding search - current options are overpriced"
        } else {
            "Normal market conditions - focus on features and financing options"
        };

        json!({
            "average_market_value": rupees((market_values.iter().sum::<f64>() / count).floor()),
            "average_list_price": rupees((list_prices.iter().sum::<f64>() / count).floor()),
            "price_range": {
                "min": rupees(market_values.iter().copied().fold(f64::INFINITY, f64::min)),
                "max": rupees(market_values.iter().copied().fold(0.0, f64::max)),
            },
            "best_deal": best_deal,
            "market_trend": market_trend,
            "average_variance": average_variance,
            "recommendation": recommendation,
        })
    }
}

#[async_trait]
impl Agent for ValuationAgent {
    fn kind(&self) -> &str {
        "valuation"
    }

    fn display_name(&self) -> &str {
        "Valuation Agent"
    }

    // `full_assessment` shares the price check; the seller flow has no extra inputs yet.
    async fn process(&self, payload: Payload, _params: &StepParams) -> Result<Payload, AgentError> {
        let cars = cars_from(payload.get("cars"))
            .iter()
            .map(Self::appraise)
            .collect::<Result<Vec<_>, _>>()?;
        let market_summary = Self::market_summary(&cars);

        Ok(payload
            .with("action", json!("price_analysis"))
            .with(
                "summary",
                json!(format!(
                    "Analyzed pricing for {} vehicles with market intelligence",
                    cars.len()
                )),
            )
            .with("cars", Value::Array(cars))
            .with("market_summary", market_summary))
    }
}

fn price_recommendation(difference: f64) -> Value {
    let amount = rupees(difference.abs());
    if difference > CLEAR_DIFFERENCE {
        json!({
            "action": "buy_immediately",
            "message": format!("Excellent deal! Car is priced ₹{amount} below market value."),
            "confidence": "high",
        })
    } else if difference > 0.0 {
        json!({
            "action": "proceed",
            "message": format!("Good value at ₹{amount} below market price."),
            "confidence": "high",
        })
    } else if difference.abs() < CLEAR_DIFFERENCE {
        json!({
            "action": "proceed",
            "message": "Pricing is fair and aligned with current market rates.",
            "confidence": "medium",
        })
    } else {
        json!({
            "action": "negotiate",
            "message": format!(
                "Consider negotiating. Car is priced ₹{amount} above market value."
            ),
            "confidence": "high",
        })
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
