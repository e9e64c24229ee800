use crate::domain::ml::feature_registry::FeatureVector;
use crate::domain::prediction::{Decision, Horizon, HorizonPrediction, PredictionResult};
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Human-friendly explanation attached to a single-horizon prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonInsights {
    pub sale_confidence_comment: String,
    pub contextual_factors: Vec<String>,
}

/// Explanation covering both horizons, shown on search and upcoming cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedInsights {
    pub score_30d: f64,
    pub score_60d: f64,
    pub will_discount_30d: bool,
    pub will_discount_60d: bool,
    pub decision: Decision,
    pub contextual_factors: Vec<String>,
    pub bullets: Vec<String>,
}

/// Turns raw scores and features into short explanations.
#[derive(Debug, Clone)]
pub struct InsightService {
    reference_year: i32,
    default_threshold: f64,
}

impl Default for InsightService {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl InsightService {
    pub fn new(default_threshold: f64) -> Self {
        Self {
            reference_year: Utc::now().year(),
            default_threshold,
        }
    }

    /// Pins "this year" for the release-year hint.
    pub fn with_reference_year(mut self, year: i32) -> Self {
        self.reference_year = year;
        self
    }

    pub fn confidence_comment(&self, score: f64, horizon: Horizon, will_discount: bool) -> String {
        let days = horizon.days();
        if score >= 0.85 {
            format!("Very strong chance of a discount within the next {} days.", days)
        } else if score >= 0.65 {
            format!("Good chance of a discount within the next {} days.", days)
        } else if score >= 0.45 {
            if will_discount {
                format!(
                    "Borderline case, but slightly in favor of a discount within {} days.",
                    days
                )
            } else {
                format!(
                    "Borderline probability; a discount within {} days is possible but uncertain.",
                    days
                )
            }
        } else {
            format!(
                "Unlikely to see a discount within the next {} days based on current signals.",
                days
            )
        }
    }

    /// Hints about the features that usually drive launch discounts.
    /// Absent features are skipped.
    pub fn contextual_factors(&self, features: &FeatureVector) -> Vec<String> {
        let mut factors = Vec::new();
        let is_set = |name: &str| features.get(name).is_some_and(|v| v >= 0.5);

        if let Some(year) = features.get("release_year") {
            let year = year as i32;
            if year >= self.reference_year - 1 {
                factors.push(
                    "This is a new or upcoming title; deep discounts right after launch are less common."
                        .to_string(),
                );
            } else if year <= 2018 {
                factors.push(
                    "Older title; more likely to appear in recurring sale events.".to_string(),
                );
            }
        }

        let publisher_log = features.get("publisher_size_log");
        if is_set("publisher_size_bin__Major (>50)") || publisher_log.is_some_and(|v| v >= 3.0) {
            factors.push(
                "Published by a major publisher; they often join the big seasonal sales."
                    .to_string(),
            );
        } else if is_set("publisher_size_bin__Small (≤5)")
            || publisher_log.is_some_and(|v| v <= 1.5)
        {
            factors.push(
                "Smaller publisher; discount timing is more flexible but less predictable."
                    .to_string(),
            );
        }

        if features
            .get("franchise_count_prev")
            .is_some_and(|count| count >= 3.0)
        {
            factors.push(
                "Part of an established franchise; franchise-wide promotions and bundles are common."
                    .to_string(),
            );
        }

        let near_sale = [
            "is_summer_sale_window",
            "is_autumn_sale_window",
            "is_holiday_season",
            "within_7d_of_steam_sale",
        ]
        .into_iter()
        .any(is_set);
        if near_sale {
            factors.push(
                "Launches close to a major Steam sale window, which raises early discount odds."
                    .to_string(),
            );
        }

        factors
    }

    pub fn horizon_insights(
        &self,
        prediction: &HorizonPrediction,
        features: &FeatureVector,
    ) -> HorizonInsights {
        HorizonInsights {
            sale_confidence_comment: self.confidence_comment(
                prediction.score,
                prediction.horizon,
                prediction.will_discount,
            ),
            contextual_factors: self.contextual_factors(features),
        }
    }

    pub fn combined(&self, result: &PredictionResult, features: &FeatureVector) -> CombinedInsights {
        let will_30 = result.probability_30d >= self.default_threshold;
        let will_60 = result.probability_60d >= self.default_threshold;

        let advice = match result.decision {
            Decision::Wait => "Our advice: wait, a launch-window discount looks likely.",
            Decision::Uncertain => {
                "Our advice: no strong signal either way; add it to your wishlist and watch the price."
            }
            Decision::BuyNow => "Our advice: buy now if you want it, an early discount looks unlikely.",
        };

        CombinedInsights {
            score_30d: result.probability_30d,
            score_60d: result.probability_60d,
            will_discount_30d: will_30,
            will_discount_60d: will_60,
            decision: result.decision,
            contextual_factors: self.contextual_factors(features),
            bullets: vec![
                self.confidence_comment(result.probability_30d, Horizon::Days30, will_30),
                self.confidence_comment(result.probability_60d, Horizon::Days60, will_60),
                advice.to_string(),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(pairs: &[(&str, f64)]) -> FeatureVector {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn service() -> InsightService {
        InsightService::new(0.5).with_reference_year(2026)
    }

    #[test]
    fn test_new_major_publisher_near_sale() {
        let fv = features(&[
            ("release_year", 2025.0),
            ("publisher_size_bin__Major (>50)", 1.0),
            ("is_summer_sale_window", 1.0),
            ("is_autumn_sale_window", 0.0),
        ]);

        let joined = service().contextual_factors(&fv).join(" ");
        assert!(joined.contains("new or upcoming title"));
        assert!(joined.contains("major publisher"));
        assert!(joined.contains("major Steam sale window"));
    }

    #[test]
    fn test_small_publisher_franchise() {
        let fv = features(&[
            ("release_year", 2025.0),
            ("publisher_size_bin__Small (≤5)", 1.0),
            ("franchise_count_prev", 4.0),
        ]);

        let joined = service().contextual_factors(&fv).join(" ").to_lowercase();
        assert!(joined.contains("smaller publisher"));
        assert!(joined.contains("franchise"));
    }

    #[test]
    fn test_missing_features_yield_no_factors() {
        assert!(service().contextual_factors(&FeatureVector::default()).is_empty());
    }

    #[test]
    fn test_confidence_comment_bands() {
        let s = service();
        assert!(s.confidence_comment(0.9, Horizon::Days30, true).starts_with("Very strong"));
        assert!(s.confidence_comment(0.7, Horizon::Days60, true).starts_with("Good chance"));
        assert!(s.confidence_comment(0.5, Horizon::Days30, true).starts_with("Borderline case"));
        assert!(s.confidence_comment(0.46, Horizon::Days30, false).starts_with("Borderline probability"));
        assert!(s.confidence_comment(0.1, Horizon::Days30, false).starts_with("Unlikely"));
    }

    #[test]
    fn test_combined_has_three_bullets() {
        let result = PredictionResult {
            probability_30d: 0.72,
            probability_60d: 0.91,
            decision: Decision::Wait,
        };
        let insights = service().combined(&result, &FeatureVector::default());

        assert_eq!(insights.bullets.len(), 3);
        assert!(insights.will_discount_30d);
        assert!(insights.bullets[1].contains("60 days"));
        assert!(insights.bullets[2].contains("wait"));
    }
}
