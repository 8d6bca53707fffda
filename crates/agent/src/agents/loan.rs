use async_trait::async_trait;
use carwise_core::{AgentError, Payload, StepParams};
use serde::Serialize;
use serde_json::{json, Value};

use super::{car_name, car_price, car_str, cars_from, rupees};
use crate::registry::Agent;

const AFFORDABILITY_SHARE: f64 = 0.4;
const REFERENCE_LOAN_SHARE: f64 = 0.8;
const REFERENCE_RATE: f64 = 9.0;
const REFERENCE_TENURE: u32 = 84;
const OWNERSHIP_YEARS: i32 = 5;
const OWNERSHIP_MONTHS: u64 = 60;
const ANNUAL_KM: f64 = 12_000.0;
const INSURANCE_SHARE: f64 = 0.03;
const REGISTRATION_CHARGES: u64 = 50_000;
const FIVE_YEAR_DEPRECIATION: f64 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lender {
    pub name: &'static str,
    pub interest_rate: f64,
    pub tenure_months: u32,
    pub max_loan_amount: u64,
    pub processing_fee: u64,
    pub min_down_payment: f64,
}

pub const LENDERS: [Lender; 5] = [
    Lender {
        name: "HDFC Bank",
        interest_rate: 8.5,
        tenure_months: 84,
        max_loan_amount: 5_000_000,
        processing_fee: 3_500,
        min_down_payment: 0.15,
    },
    Lender {
        name: "ICICI Bank",
        interest_rate: 8.75,
        tenure_months: 84,
        max_loan_amount: 4_500_000,
        processing_fee: 2_500,
        min_down_payment: 0.15,
    },
    Lender {
        name: "Axis Bank",
        interest_rate: 9.0,
        tenure_months: 72,
        max_loan_amount: 4_000_000,
        processing_fee: 3_000,
        min_down_payment: 0.20,
    },
    Lender {
        name: "Tata Capital",
        interest_rate: 9.25,
        tenure_months: 84,
        max_loan_amount: 3_500_000,
        processing_fee: 2_000,
        min_down_payment: 0.15,
    },
    Lender {
        name: "Mahindra Finance",
        interest_rate: 9.5,
        tenure_months: 72,
        max_loan_amount: 3_000_000,
        processing_fee: 2_500,
        min_down_payment: 0.20,
    },
];

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoanOption {
    pub lender_name: &'static str,
    pub interest_rate: f64,
    pub tenure_months: u32,
    pub tenure_years: u32,
    pub max_loan_amount: u64,
    pub down_payment: u64,
    pub loan_amount: u64,
    pub emi: u64,
    pub total_payment: u64,
    pub total_interest: u64,
    pub processing_fee: u64,
}

/// Standard amortised monthly instalment. A zero rate spreads the principal
/// evenly.
pub fn emi(principal: f64, annual_rate_percent: f64, tenure_months: u32) -> f64 {
    if tenure_months == 0 {
        return principal;
    }
    let monthly_rate = annual_rate_percent / (12.0 * 100.0);
    if monthly_rate == 0.0 {
        return principal / f64::from(tenure_months);
    }
    let growth = (1.0 + monthly_rate).powi(tenure_months as i32);
    principal * monthly_rate * growth / (growth - 1.0)
}

pub fn loan_options(price: f64) -> Vec<LoanOption> {
    let mut options = LENDERS
        .iter()
        .map(|lender| {
            let down_payment = price * lender.min_down_payment;
            let principal = price - down_payment;
            let monthly = emi(principal, lender.interest_rate, lender.tenure_months);
            let total_payment = monthly * f64::from(lender.tenure_months);
            LoanOption {
                lender_name: lender.name,
                interest_rate: lender.interest_rate,
                tenure_months: lender.tenure_months,
                tenure_years: lender.tenure_months / 12,
                max_loan_amount: lender.max_loan_amount,
                down_payment: rupees(down_payment),
                loan_amount: rupees(principal),
                emi: rupees(monthly),
                total_payment: rupees(total_payment),
                total_interest: rupees(total_payment - principal),
                processing_fee: lender.processing_fee,
            }
        })
        .collect::<Vec<_>>();
    options.sort_by_key(|option| option.emi);
    options
}

fn eligibility_check(price: f64) -> Value {
    let reference_emi = emi(price * REFERENCE_LOAN_SHARE, REFERENCE_RATE, REFERENCE_TENURE);
    let monthly_income = reference_emi / AFFORDABILITY_SHARE;
    json!({
        "status": "pre_approved",
        "required_monthly_income": rupees(monthly_income),
        "required_annual_income": rupees(monthly_income * 12.0),
        "credit_score_required": 650,
        "documents_needed": [
            "Income proof (3 months salary slips/ITR)",
            "Bank statements (6 months)",
            "Identity proof (Aadhar/PAN)",
            "Address proof"
        ],
        "processing_time": "24-48 hours",
    })
}

/// Sum of `annual * growth^year` over the ownership period.
fn compounded(annual: f64, growth: f64) -> f64 {
    (0..OWNERSHIP_YEARS).map(|year| annual * growth.powi(year)).sum()
}

/// Five-year cost of ownership financed with the lowest-EMI option.
pub fn total_cost_of_ownership(price: f64, fuel_type: &str, best: &LoanOption) -> Value {
    let (maintenance_per_year, cost_per_km) = match fuel_type {
        "Electric" => (15_000.0, 1.5),
        "Diesel" => (30_000.0, 5.5),
        "CNG" => (28_000.0, 3.5),
        _ => (25_000.0, 6.0),
    };
    let insurance = rupees(compounded(price * INSURANCE_SHARE, 0.95));
    let maintenance = rupees(compounded(maintenance_per_year, 1.1));
    let fuel = rupees(compounded(ANNUAL_KM * cost_per_km, 1.05));
    let total = best
        .total_payment
        .saturating_add(insurance)
        .saturating_add(maintenance)
        .saturating_add(fuel)
        .saturating_add(REGISTRATION_CHARGES);

    json!({
        "car_price": rupees(price),
        "lender": best.lender_name,
        "down_payment": best.down_payment,
        "total_loan_payment": best.total_payment,
        "insurance_5_years": insurance,
        "maintenance_5_years": maintenance,
        "fuel_cost_5_years": fuel,
        "registration_charges": REGISTRATION_CHARGES,
        "depreciation_5_years": rupees(price * FIVE_YEAR_DEPRECIATION),
        "total_5_year_cost": total,
        "monthly_average": total / OWNERSHIP_MONTHS,
    })
}

/// Lender-independent approval estimate; cheaper cars and EVs score higher.
fn eligibility_score(price: f64, fuel_type: &str) -> Value {
    let mut score: u32 = 75;
    if price < 1_000_000.0 {
        score += 10;
    } else if price > 2_000_000.0 {
        score -= 5;
    }
    if fuel_type == "Electric" {
        score += 5;
    }
    let rating = match score {
        81.. => "High",
        61..=80 => "Medium",
        _ => "Low",
    };
    let score = score.min(95);
    json!({
        "score": score,
        "rating": rating,
        "approval_probability": format!("{score}%"),
    })
}

fn subsidies(car: &Value) -> Value {
    if car_str(car, "fuel_type") != "Electric" {
        return json!([]);
    }
    let mut subsidies = vec![json!({
        "name": "FAME II Central Subsidy",
        "amount": 150_000,
        "claim_process": "Dealer will adjust at time of purchase",
    })];
    if car_str(car, "location") == "Delhi" {
        subsidies.push(json!({
            "name": "Delhi EV Policy Incentive",
            "amount": 30_000,
            "claim_process": "Apply online after vehicle registration",
        }));
    }
    Value::Array(subsidies)
}

/// Builds per-car loan comparisons across the lender table.
#[derive(Clone, Debug, Default)]
pub struct LoanAgent;

impl LoanAgent {
    pub fn new() -> Self {
        Self
    }

    fn financing_for(car: &Value) -> Result<(Value, Vec<LoanOption>), AgentError> {
        let price = car_price(car, "loan", true)?;
        let fuel_type = car_str(car, "fuel_type");
        let options = loan_options(price);
        let total_cost = options.first().map_or_else(
            || json!({"error": "No loan options available"}),
            |best| total_cost_of_ownership(price, fuel_type, best),
        );
        let entry = json!({
            "car_id": car_str(car, "id"),
            "car_name": car_name(car),
            "car_price": rupees(price),
            "loan_options": options,
            "eligibility_check": eligibility_check(price),
            "eligibility_score": eligibility_score(price, fuel_type),
            "subsidies": subsidies(car),
            "total_cost_analysis": total_cost,
        });
        Ok((entry, options))
    }

    fn recommendation(candidates: &[(String, Vec<LoanOption>)]) -> Value {
        let all_loans = candidates
            .iter()
            .flat_map(|(car, options)| options.iter().map(move |option| (car.as_str(), option)))
            .collect::<Vec<_>>();

        let best_emi = all_loans.iter().min_by_key(|(_, option)| option.emi);
        let best_rate = all_loans
            .iter()
            .min_by(|(_, left), (_, right)| left.interest_rate.total_cmp(&right.interest_rate));
        let best_total = all_loans.iter().min_by_key(|(_, option)| option.total_payment);

        match (best_emi, best_rate, best_total) {
            (Some((emi_car, emi)), Some((rate_car, rate)), Some((total_car, total))) => json!({
                "best_emi_option": {
                    "car": emi_car,
                    "lender": emi.lender_name,
                    "emi": emi.emi,
                    "reason": "Lowest monthly payment",
                },
                "best_rate_option": {
                    "car": rate_car,
                    "lender": rate.lender_name,
                    "rate": rate.interest_rate,
                    "reason": "Lowest interest rate",
                },
                "best_total_cost": {
                    "car": total_car,
                    "lender": total.lender_name,
                    "total": total.total_payment,
                    "reason": "Lowest total payment",
                },
                "tips": [
                    "Compare total interest paid, not just EMI",
                    "Check for prepayment penalties and charges",
                    "Negotiate processing fees and other charges"
                ],
            }),
            _ => json!({"error": "No financing options available"}),
        }
    }
}

#[async_trait]
impl Agent for LoanAgent {
    fn kind(&self) -> &str {
        "loan"
    }

    fn display_name(&self) -> &str {
        "Loan Agent"
    }

    async fn process(&self, payload: Payload, _params: &StepParams) -> Result<Payload, AgentError> {
        let cars = cars_from(payload.get("cars"));
        let mut financing_options = Vec::with_capacity(cars.len());
        let mut candidates = Vec::with_capacity(cars.len());
        for car in &cars {
            let (entry, options) = Self::financing_for(car)?;
            financing_options.push(entry);
            candidates.push((car_name(car), options));
        }

        Ok(payload
            .with("action", json!("financing_analysis"))
            .with(
                "summary",
                json!(format!(
                    "Generated financing options for {} vehicles across {} lenders",
                    cars.len(),
                    LENDERS.len()
                )),
            )
            .with("financing_options", Value::Array(financing_options))
            .with("financing_recommendation", Self::recommendation(&candidates)))
    }
}
