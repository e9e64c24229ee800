use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::errors::PredictionError;

/// Forward-looking window for the first-discount prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "30d")]
    Days30,
    #[serde(rename = "60d")]
    Days60,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days30 => "30d",
            Self::Days60 => "60d",
        }
    }

    pub fn days(&self) -> u32 {
        match self {
            Self::Days30 => 30,
            Self::Days60 => 60,
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "30d" => Ok(Self::Days30),
            "60d" => Ok(Self::Days60),
            other => Err(PredictionError::validation(format!(
                "Invalid horizon: {}. Must be '30d' or '60d'.",
                other
            ))),
        }
    }
}

/// Human-readable advice derived from the two horizon probabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    #[serde(rename = "Unlikely — Buy now")]
    BuyNow,
    #[serde(rename = "Uncertain")]
    Uncertain,
    #[serde(rename = "Likely to discount — Wait")]
    Wait,
}

impl Decision {
    pub fn label(&self) -> &'static str {
        match self {
            Self::BuyNow => "Unlikely — Buy now",
            Self::Uncertain => "Uncertain",
            Self::Wait => "Likely to discount — Wait",
        }
    }

    /// Ordinal position from "buy now" (0) to "wait" (2).
    pub fn rank(&self) -> u8 {
        match self {
            Self::BuyNow => 0,
            Self::Uncertain => 1,
            Self::Wait => 2,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const DEFAULT_WAIT_THRESHOLD: f64 = 0.65;
pub const DEFAULT_BUY_THRESHOLD: f64 = 0.35;

/// Fixed cutoffs mapping `(p30, p60)` to a [`Decision`].
///
/// Only the larger of the two probabilities is compared, so raising either
/// probability can never move the label towards [`Decision::BuyNow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionPolicy {
    wait_threshold: f64,
    buy_threshold: f64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            wait_threshold: DEFAULT_WAIT_THRESHOLD,
            buy_threshold: DEFAULT_BUY_THRESHOLD,
        }
    }
}

impl DecisionPolicy {
    pub fn new(wait_threshold: f64, buy_threshold: f64) -> Result<Self, PredictionError> {
        let ordered = (0.0..=1.0).contains(&buy_threshold)
            && (0.0..=1.0).contains(&wait_threshold)
            && buy_threshold < wait_threshold;
        if !ordered {
            return Err(PredictionError::validation(format!(
                "Decision thresholds must satisfy 0 <= buy ({}) < wait ({}) <= 1",
                buy_threshold, wait_threshold
            )));
        }
        Ok(Self {
            wait_threshold,
            buy_threshold,
        })
    }

    pub fn wait_threshold(&self) -> f64 {
        self.wait_threshold
    }

    pub fn buy_threshold(&self) -> f64 {
        self.buy_threshold
    }

    pub fn decide(&self, prob_30d: f64, prob_60d: f64) -> Decision {
        let strongest = prob_30d.max(prob_60d);
        if strongest >= self.wait_threshold {
            Decision::Wait
        } else if strongest < self.buy_threshold {
            Decision::BuyNow
        } else {
            Decision::Uncertain
        }
    }
}

/// Two-horizon result returned by `POST /predict`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "prob_30d")]
    pub probability_30d: f64,
    #[serde(rename = "prob_60d")]
    pub probability_60d: f64,
    pub decision: Decision,
}

/// Single-horizon result with an explicit classification cutoff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonPrediction {
    pub appid: u64,
    pub horizon: Horizon,
    pub will_discount: bool,
    pub score: f64,
    pub threshold: f64,
}

/// Clamp a raw model output into a well-formed probability.
///
/// Non-finite values are rejected rather than clamped.
pub fn sanitize_probability(raw: f64) -> Result<f64, PredictionError> {
    if !raw.is_finite() {
        return Err(PredictionError::Internal {
            reason: format!("model produced a non-finite score: {}", raw),
        });
    }
    Ok(raw.clamp(0.0, 1.0))
}
