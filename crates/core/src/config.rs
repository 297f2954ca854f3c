use crate::error::CoreError;
use crate::knots::{validate_knot_budget, DEFAULT_ALLOWED_KNOT_BUDGETS, DEFAULT_KNOT_BUDGET};
use crate::resolver::OrderingStrategy;
use crate::viewport::{PixelRect, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_MARGIN, DEFAULT_CANVAS_WIDTH};

/// Annotation configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// submission secret, which stays `None` until configured.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationConfig {
    /// Budget given to each freshly loaded trajectory.
    pub default_knot_budget: usize,
    /// Budgets the user may switch between.
    pub allowed_knot_budgets: Vec<usize>,
    /// Ordering for the live annotation view.
    pub live_ordering: OrderingStrategy,
    /// Ordering for the review view.
    pub review_ordering: OrderingStrategy,
    /// Plot rectangle inside the canvas.
    pub canvas: PixelRect,
    /// Plain or Argon2-hashed submission secret.
    pub submission_password: Option<String>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            default_knot_budget: DEFAULT_KNOT_BUDGET,
            allowed_knot_budgets: DEFAULT_ALLOWED_KNOT_BUDGETS.to_vec(),
            live_ordering: OrderingStrategy::NearestSampleIndex,
            review_ordering: OrderingStrategy::NearestNeighborChain,
            canvas: PixelRect::default(),
            submission_password: None,
        }
    }
}

impl AnnotationConfig {
    /// Load a `.env` file if present, then read the environment.
    pub fn load() -> Result<Self, CoreError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `KNOT_BUDGET`          | `3`                      |
    /// | `ALLOWED_KNOT_BUDGETS` | `3,4,5`                  |
    /// | `LIVE_ORDERING`        | `nearest_sample_index`   |
    /// | `REVIEW_ORDERING`      | `nearest_neighbor_chain` |
    /// | `CANVAS_WIDTH`         | `800`                    |
    /// | `CANVAS_HEIGHT`        | `600`                    |
    /// | `CANVAS_MARGIN`        | `50`                     |
    /// | `SUBMISSION_PASSWORD`  | unset                    |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let allowed_knot_budgets = match lookup("ALLOWED_KNOT_BUDGETS") {
            Some(raw) => parse_budget_list(&raw)?,
            None => DEFAULT_ALLOWED_KNOT_BUDGETS.to_vec(),
        };

        let default_knot_budget = match lookup("KNOT_BUDGET") {
            Some(raw) => parse_number::<usize>("KNOT_BUDGET", &raw)?,
            None => DEFAULT_KNOT_BUDGET,
        };
        validate_knot_budget(default_knot_budget, &allowed_knot_budgets)?;

        let live_ordering = match lookup("LIVE_ORDERING") {
            Some(raw) => OrderingStrategy::from_str(raw.trim())?,
            None => OrderingStrategy::NearestSampleIndex,
        };
        let review_ordering = match lookup("REVIEW_ORDERING") {
            Some(raw) => OrderingStrategy::from_str(raw.trim())?,
            None => OrderingStrategy::NearestNeighborChain,
        };

        let width = lookup("CANVAS_WIDTH")
            .map(|raw| parse_number::<f64>("CANVAS_WIDTH", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_CANVAS_WIDTH);
        let height = lookup("CANVAS_HEIGHT")
            .map(|raw| parse_number::<f64>("CANVAS_HEIGHT", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_CANVAS_HEIGHT);
        let margin = lookup("CANVAS_MARGIN")
            .map(|raw| parse_number::<f64>("CANVAS_MARGIN", &raw))
            .transpose()?
            .unwrap_or(DEFAULT_CANVAS_MARGIN);
        let canvas = PixelRect::inset(width, height, margin)?;

        let submission_password = lookup("SUBMISSION_PASSWORD").filter(|s| !s.is_empty());

        Ok(Self {
            default_knot_budget,
            allowed_knot_budgets,
            live_ordering,
            review_ordering,
            canvas,
            submission_password,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, CoreError> {
    raw.trim()
        .parse()
        .map_err(|_| CoreError::Validation(format!("{key} must be a number, got '{raw}'")))
}

fn parse_budget_list(raw: &str) -> Result<Vec<usize>, CoreError> {
    let budgets: Vec<usize> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_number("ALLOWED_KNOT_BUDGETS", s))
        .collect::<Result<_, _>>()?;
    if budgets.is_empty() {
        return Err(CoreError::Validation(
            "ALLOWED_KNOT_BUDGETS must list at least one budget".to_string(),
        ));
    }
    Ok(budgets)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AnnotationConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AnnotationConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = AnnotationConfig::from_lookup(lookup(&[
            ("KNOT_BUDGET", "4"),
            ("ALLOWED_KNOT_BUDGETS", "2, 4 ,6"),
            ("LIVE_ORDERING", "nearest_neighbor_chain"),
            ("REVIEW_ORDERING", "nearest_sample_index"),
            ("CANVAS_WIDTH", "1000"),
            ("CANVAS_HEIGHT", "500"),
            ("CANVAS_MARGIN", "20"),
            ("SUBMISSION_PASSWORD", "hunter2"),
        ]))
        .unwrap();
        assert_eq!(config.default_knot_budget, 4);
        assert_eq!(config.allowed_knot_budgets, vec![2, 4, 6]);
        assert_eq!(config.live_ordering, OrderingStrategy::NearestNeighborChain);
        assert_eq!(config.review_ordering, OrderingStrategy::NearestSampleIndex);
        assert_eq!(config.canvas.width, 960.0);
        assert_eq!(config.canvas.height, 460.0);
        assert_eq!(config.submission_password.as_deref(), Some("hunter2"));
    }

    #[test]
    fn default_budget_must_be_allowed() {
        let err = AnnotationConfig::from_lookup(lookup(&[("KNOT_BUDGET", "7")])).unwrap_err();
        assert!(err.to_string().contains("Invalid knot budget 7"));
    }

    #[test]
    fn bad_numbers_rejected() {
        assert!(AnnotationConfig::from_lookup(lookup(&[("CANVAS_WIDTH", "wide")])).is_err());
        assert!(AnnotationConfig::from_lookup(lookup(&[("ALLOWED_KNOT_BUDGETS", "3,x")])).is_err());
        assert!(AnnotationConfig::from_lookup(lookup(&[("ALLOWED_KNOT_BUDGETS", " , ")])).is_err());
    }

    #[test]
    fn bad_strategy_rejected() {
        assert!(AnnotationConfig::from_lookup(lookup(&[("LIVE_ORDERING", "spiral")])).is_err());
    }

    #[test]
    fn empty_password_treated_as_unset() {
        let config = AnnotationConfig::from_lookup(lookup(&[("SUBMISSION_PASSWORD", "")])).unwrap();
        assert!(config.submission_password.is_none());
    }
}
