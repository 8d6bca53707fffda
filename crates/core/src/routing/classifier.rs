use crate::domain::agent::AgentKind;
use crate::domain::intent::{Intent, IntentKind};

/// Keyword groups in priority order; the first group with any keyword contained in
/// the query decides the intent.
const KEYWORD_RULES: [(IntentKind, AgentKind, &[&str]); 4] = [
    (IntentKind::CarSearch, AgentKind::Buyer, &["best", "find", "buy", "search"]),
    (IntentKind::CarValuation, AgentKind::Seller, &["sell", "value", "price"]),
    (IntentKind::Maintenance, AgentKind::Owner, &["service", "maintenance", "repair"]),
    (IntentKind::DocumentVerification, AgentKind::Document, &["document", "verify", "papers"]),
];

#[derive(Clone, Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, query: &str) -> Intent {
        let normalized = normalize_text(query);

        let (kind, primary_agent) = KEYWORD_RULES
            .iter()
            .find(|(_, _, keywords)| keywords.iter().any(|keyword| normalized.contains(keyword)))
            .map(|(kind, agent, _)| (*kind, *agent))
            .unwrap_or((IntentKind::General, AgentKind::Buyer));

        Intent { kind, query: query.to_string(), primary_agent }
    }
}

fn normalize_text(text: &str) -> String {
    text.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::IntentClassifier;
    use crate::domain::agent::AgentKind;
    use crate::domain::intent::IntentKind;

    #[test]
    fn ev_search_query_routes_to_buyer() {
        let intent = IntentClassifier::new().classify("Best EV under ₹15L in Delhi?");
        assert_eq!(intent.kind, IntentKind::CarSearch);
        assert_eq!(intent.primary_agent, AgentKind::Buyer);
        assert_eq!(intent.query, "Best EV under ₹15L in Delhi?");
    }

    #[test]
    fn sell_query_routes_to_seller() {
        let intent = IntentClassifier::new().classify("I want to sell my car");
        assert_eq!(intent.kind, IntentKind::CarValuation);
        assert_eq!(intent.primary_agent, AgentKind::Seller);
    }

    #[test]
    fn each_keyword_group_maps_to_its_intent() {
        let classifier = IntentClassifier::new();
        let cases = [
            ("can you FIND me a hatchback", IntentKind::CarSearch, AgentKind::Buyer),
            ("search listings near me", IntentKind::CarSearch, AgentKind::Buyer),
            ("what is the value of my sedan", IntentKind::CarValuation, AgentKind::Seller),
            ("Price for a 2019 Creta", IntentKind::CarValuation, AgentKind::Seller),
            ("my car needs a repair", IntentKind::Maintenance, AgentKind::Owner),
            ("next Service due?", IntentKind::Maintenance, AgentKind::Owner),
            ("please verify the RC", IntentKind::DocumentVerification, AgentKind::Document),
            ("are my papers in order", IntentKind::DocumentVerification, AgentKind::Document),
        ];

        for (query, kind, agent) in cases {
            let intent = classifier.classify(query);
            assert_eq!(intent.kind, kind, "query `{query}`");
            assert_eq!(intent.primary_agent, agent, "query `{query}`");
        }
    }

    #[test]
    fn earlier_group_wins_when_several_match() {
        let classifier = IntentClassifier::new();
        assert_eq!(classifier.classify("buy or sell?").kind, IntentKind::CarSearch);
        assert_eq!(classifier.classify("repair price estimate").kind, IntentKind::CarValuation);
        assert_eq!(classifier.classify("service documents").kind, IntentKind::Maintenance);
    }

    #[test]
    fn matching_is_substring_based() {
        // "bestseller" contains "best"
        let intent = IntentClassifier::new().classify("which bestseller hatchback");
        assert_eq!(intent.kind, IntentKind::CarSearch);
    }

    #[test]
    fn unmatched_and_empty_queries_fall_back_to_general() {
        let classifier = IntentClassifier::new();
        for query in ["hello there", ""] {
            let intent = classifier.classify(query);
            assert_eq!(intent.kind, IntentKind::General);
            assert_eq!(intent.primary_agent, AgentKind::Buyer);
        }
    }

    #[test]
    fn classification_is_repeatable() {
        let classifier = IntentClassifier::new();
        let query = "find a diesel SUV";
        assert_eq!(classifier.classify(query), classifier.classify(query));
    }
}
