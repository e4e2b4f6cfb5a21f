//! Classifier prediction output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The winning label of a classifier forward pass.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Prediction {
    /// Raw model label, e.g. `"burglary"`
    pub label: String,
    /// Probability assigned to the winning label, in [0, 1]
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_round_trip() {
        let p = Prediction {
            label: "burglary".to_string(),
            confidence: 0.93,
        };
        let json = serde_json::to_string(&p).unwrap();
        let back: Prediction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.label, "burglary");
        assert!((back.confidence - 0.93).abs() < 1e-6);
    }
}
