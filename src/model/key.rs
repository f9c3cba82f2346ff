use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The fixed set of prediction models the ensemble knows about.
///
/// Keys arriving from persisted records or config files are parsed with
/// [`ModelKey::from_str`], which ignores case and whitespace; anything that
/// does not resolve to a variant fails safe downstream (the model is
/// DISABLED, never a panic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKey {
    Logistic,
    RandomForest,
    DecisionTree,
    NaiveBayes,
    Original,
    Momentum,
    MeanReversion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    RuleBased,
    Ml,
}

impl ModelKey {
    pub const ALL: [ModelKey; 7] = [
        ModelKey::Logistic,
        ModelKey::RandomForest,
        ModelKey::DecisionTree,
        ModelKey::NaiveBayes,
        ModelKey::Original,
        ModelKey::Momentum,
        ModelKey::MeanReversion,
    ];

    pub fn kind(self) -> ModelKind {
        match self {
            ModelKey::Logistic
            | ModelKey::RandomForest
            | ModelKey::DecisionTree
            | ModelKey::NaiveBayes => ModelKind::Ml,
            ModelKey::Original | ModelKey::Momentum | ModelKey::MeanReversion => {
                ModelKind::RuleBased
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ModelKey::Logistic => "logistic",
            ModelKey::RandomForest => "randomforest",
            ModelKey::DecisionTree => "decisiontree",
            ModelKey::NaiveBayes => "naivebayes",
            ModelKey::Original => "original",
            ModelKey::Momentum => "momentum",
            ModelKey::MeanReversion => "meanreversion",
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "logistic" => Ok(ModelKey::Logistic),
            "randomforest" => Ok(ModelKey::RandomForest),
            "decisiontree" => Ok(ModelKey::DecisionTree),
            "naivebayes" => Ok(ModelKey::NaiveBayes),
            "original" => Ok(ModelKey::Original),
            "momentum" => Ok(ModelKey::Momentum),
            "meanreversion" => Ok(ModelKey::MeanReversion),
            _ => Err(AppError::UnknownModel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case_and_whitespace() {
        assert_eq!("Logistic".parse::<ModelKey>().unwrap(), ModelKey::Logistic);
        assert_eq!(
            " Decision Tree ".parse::<ModelKey>().unwrap(),
            ModelKey::DecisionTree
        );
        assert_eq!(
            "mean_reversion".parse::<ModelKey>().unwrap(),
            ModelKey::MeanReversion
        );
    }

    #[test]
    fn parse_rejects_unknown_keys() {
        assert!("xgboost".parse::<ModelKey>().is_err());
        assert!("".parse::<ModelKey>().is_err());
    }

    #[test]
    fn kind_split_matches_model_family() {
        assert_eq!(ModelKey::Logistic.kind(), ModelKind::Ml);
        assert_eq!(ModelKey::Momentum.kind(), ModelKind::RuleBased);
    }
}
