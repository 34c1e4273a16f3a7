use serde::{Deserialize, Serialize};

use super::shared::EngineError;

/// Elo parameters. `k` is the total weight one seat can move per match;
/// it is split across the `seats - 1` pairwise comparisons so table size
/// does not change rating volatility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloConfig {
    pub k: f64,
    pub min_rating: f64,
    pub max_rating: f64,
}

impl Default for EloConfig {
    fn default() -> Self {
        EloConfig {
            k: 32.0,
            min_rating: 100.0,
            max_rating: 4000.0,
        }
    }
}

/// Probability that a player rated `rating_a` beats one rated `rating_b`.
pub fn expected_score(rating_a: f64, rating_b: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf((rating_b - rating_a) / 400.0))
}

pub fn clamp_rating(rating: f64, cfg: &EloConfig) -> f64 {
    rating.clamp(cfg.min_rating, cfg.max_rating)
}

/// Pairwise Elo update over a multi-seat result.
///
/// `scores` are continuous (chip deltas); each unordered pair is scored
/// 1/0/0.5 by comparison, so the update reduces to classical Elo when
/// there are two seats. Clamping happens after summation, so rating mass
/// is conserved up to the clamp bounds.
pub fn update_elo_pairwise(
    old_ratings: &[f64],
    scores: &[f64],
    cfg: &EloConfig,
) -> Result<Vec<f64>, EngineError> {
    let n = old_ratings.len();
    if scores.len() != n {
        return Err(EngineError::InvalidInput(
            "ratings and scores must have the same length".to_string(),
        ));
    }
    if n < 2 {
        return Err(EngineError::InvalidInput(
            "pairwise Elo needs at least two seats".to_string(),
        ));
    }

    let per_pair = cfg.k / (n - 1) as f64;
    let mut deltas = vec![0.0f64; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let expected = expected_score(old_ratings[i], old_ratings[j]);
            let actual = if scores[i] > scores[j] {
                1.0
            } else if scores[i] < scores[j] {
                0.0
            } else {
                0.5
            };
            deltas[i] += per_pair * (actual - expected);
            deltas[j] += per_pair * ((1.0 - actual) - (1.0 - expected));
        }
    }

    Ok(old_ratings
        .iter()
        .zip(&deltas)
        .map(|(&r, &d)| clamp_rating(r + d, cfg))
        .collect())
}
