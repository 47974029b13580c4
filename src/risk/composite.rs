//! Weighted linear scoring of climate and ESG risk factors

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{ValuationError, ValuationResult};
use crate::validation::{check_weight_sum, ValidationWarning};

/// One scored risk dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// Share of the composite score (factor weights should sum to 1)
    pub weight: f64,
    /// Exposure level, 0.0 (none) to 1.0 (extreme)
    pub level: f64,
}

impl RiskFactor {
    /// Build a factor, rejecting levels outside [0, 1] and negative weights
    pub fn new(name: &str, weight: f64, level: f64) -> ValuationResult<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ValuationError::out_of_range(name, weight, "weight must be non-negative"));
        }
        if !(0.0..=1.0).contains(&level) {
            return Err(ValuationError::out_of_range(name, level, "level must be between 0 and 1"));
        }
        Ok(Self {
            name: name.to_string(),
            weight,
            level,
        })
    }

    pub fn contribution(&self) -> f64 {
        self.weight * self.level
    }
}

/// A set of risk factors scored together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub factors: Vec<RiskFactor>,
}

impl RiskProfile {
    pub fn new(factors: Vec<RiskFactor>) -> Self {
        Self { factors }
    }

    /// Precondition violations: weight sum off 1, levels outside [0, 1], negative weights
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        if let Some(w) = check_weight_sum("risk profile", self.factors.iter().map(|f| f.weight)) {
            warnings.push(w);
        }
        for factor in &self.factors {
            if factor.weight < 0.0 {
                warnings.push(ValidationWarning::NegativeWeight {
                    context: format!("risk factor '{}'", factor.name),
                    weight: factor.weight,
                });
            }
            if !(0.0..=1.0).contains(&factor.level) {
                warnings.push(ValidationWarning::LevelOutOfRange {
                    factor: factor.name.clone(),
                    level: factor.level,
                });
            }
        }
        warnings
    }

    /// Each factor's `weight × level`, in profile order
    pub fn contributions(&self) -> Vec<(String, f64)> {
        self.factors
            .iter()
            .map(|f| (f.name.clone(), f.contribution()))
            .collect()
    }
}

/// Composite score `Σ weight × level`
///
/// Nominally in [0, 1]. Not clamped: weights that do not sum to 1 or levels
/// outside [0, 1] carry straight through to the result. Such inputs are
/// logged as warnings.
pub fn score(profile: &RiskProfile) -> f64 {
    for warning in profile.validate() {
        warn!("{}", warning);
    }
    profile.factors.iter().map(RiskFactor::contribution).sum()
}

/// Physical climate hazard levels for one site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClimateExposure {
    #[serde(default)]
    pub flood: f64,
    #[serde(default)]
    pub bushfire: f64,
    #[serde(default)]
    pub extreme_heat: f64,
    #[serde(default)]
    pub coastal_inundation: f64,
    #[serde(default)]
    pub drought: f64,
}

impl ClimateExposure {
    /// Hazard weights used by [`ClimateExposure::to_profile`]
    pub const WEIGHTS: [(&'static str, f64); 5] = [
        ("flood", 0.30),
        ("bushfire", 0.25),
        ("extreme_heat", 0.20),
        ("coastal_inundation", 0.15),
        ("drought", 0.10),
    ];

    pub fn to_profile(&self) -> ValuationResult<RiskProfile> {
        let levels = [
            self.flood,
            self.bushfire,
            self.extreme_heat,
            self.coastal_inundation,
            self.drought,
        ];
        let factors = Self::WEIGHTS
            .iter()
            .zip(levels)
            .map(|((name, weight), level)| RiskFactor::new(name, *weight, level))
            .collect::<ValuationResult<Vec<_>>>()?;
        Ok(RiskProfile::new(factors))
    }
}

/// Qualitative band for a composite score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    Low,
    Moderate,
    High,
    Severe,
}

/// Ascending score cutoffs, each the inclusive upper bound of its band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBandScale {
    pub cutoffs: Vec<(f64, RiskBand)>,
    /// Band for scores above every cutoff
    pub above: RiskBand,
}

impl Default for RiskBandScale {
    fn default() -> Self {
        Self {
            cutoffs: vec![
                (0.25, RiskBand::Low),
                (0.50, RiskBand::Moderate),
                (0.75, RiskBand::High),
            ],
            above: RiskBand::Severe,
        }
    }
}

impl RiskBandScale {
    pub fn classify(&self, score: f64) -> RiskBand {
        self.cutoffs
            .iter()
            .find(|(upper, _)| score <= *upper)
            .map(|(_, band)| *band)
            .unwrap_or(self.above)
    }

    /// Reject cutoffs that are not finite and strictly ascending
    pub fn validate(&self) -> ValuationResult<()> {
        if let Some((upper, _)) = self.cutoffs.iter().find(|(upper, _)| !upper.is_finite()) {
            return Err(ValuationError::out_of_range("risk band cutoff", *upper, "must be finite"));
        }
        if let Some(pair) = self.cutoffs.windows(2).find(|pair| pair[0].0 >= pair[1].0) {
            return Err(ValuationError::out_of_range(
                "risk band cutoff",
                pair[1].0,
                "cutoffs must be strictly ascending",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn profile() -> RiskProfile {
        RiskProfile::new(vec![
            RiskFactor::new("flood", 0.5, 0.8).unwrap(),
            RiskFactor::new("bushfire", 0.3, 0.2).unwrap(),
            RiskFactor::new("heat", 0.2, 0.5).unwrap(),
        ])
    }

    #[test]
    fn test_weighted_score() {
        let p = profile();
        assert_relative_eq!(score(&p), 0.4 + 0.06 + 0.1, epsilon = 1e-12);
        assert!(p.validate().is_empty());

        let contributions = p.contributions();
        assert_eq!(contributions[0].0, "flood");
        assert_relative_eq!(contributions[0].1, 0.4, epsilon = 1e-12);
    }

    #[test]
    fn test_score_is_not_clamped() {
        // Weights sum to 1.5 and a level of 1.4 slips past the constructor
        let p = RiskProfile::new(vec![
            RiskFactor { name: "flood".into(), weight: 1.0, level: 1.4 },
            RiskFactor { name: "heat".into(), weight: 0.5, level: 1.0 },
        ]);
        assert_relative_eq!(score(&p), 1.9, epsilon = 1e-12);

        let warnings = p.validate();
        assert_eq!(warnings.len(), 2);
        assert!(matches!(warnings[0], ValidationWarning::WeightSum { .. }));
        assert!(matches!(warnings[1], ValidationWarning::LevelOutOfRange { .. }));
    }

    #[test]
    fn test_factor_constructor_domain() {
        assert!(matches!(
            RiskFactor::new("flood", 0.5, 1.2),
            Err(ValuationError::OutOfRangeInput { .. })
        ));
        assert!(matches!(
            RiskFactor::new("flood", -0.1, 0.5),
            Err(ValuationError::OutOfRangeInput { .. })
        ));
    }

    #[test]
    fn test_empty_profile() {
        let p = RiskProfile::default();
        assert_eq!(score(&p), 0.0);
        assert_eq!(p.validate().len(), 1);
    }

    #[test]
    fn test_climate_exposure() {
        let exposure = ClimateExposure {
            flood: 1.0,
            bushfire: 0.0,
            extreme_heat: 0.5,
            coastal_inundation: 0.0,
            drought: 1.0,
        };
        let p = exposure.to_profile().unwrap();
        assert!(p.validate().is_empty());
        assert_relative_eq!(score(&p), 0.30 + 0.10 + 0.10, epsilon = 1e-12);

        let bad = ClimateExposure { flood: 2.0, ..exposure };
        assert!(bad.to_profile().is_err());
    }

    #[test]
    fn test_band_scale() {
        let scale = RiskBandScale::default();
        assert_eq!(scale.classify(0.0), RiskBand::Low);
        assert_eq!(scale.classify(0.25), RiskBand::Low);
        assert_eq!(scale.classify(0.26), RiskBand::Moderate);
        assert_eq!(scale.classify(0.75), RiskBand::High);
        assert_eq!(scale.classify(1.9), RiskBand::Severe);
        assert!(scale.validate().is_ok());
    }

    #[test]
    fn test_unsorted_band_scale_is_invalid() {
        let scale = RiskBandScale {
            cutoffs: vec![(0.75, RiskBand::High), (0.25, RiskBand::Low)],
            above: RiskBand::Severe,
        };
        assert!(matches!(
            scale.validate(),
            Err(ValuationError::OutOfRangeInput { value, .. }) if value == 0.25
        ));
    }
}
