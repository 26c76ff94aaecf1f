use rand::Rng;
use rand::RngCore;

/// Weights below this are raised to it, so every option keeps a nonzero chance.
pub const MIN_WEIGHT: f64 = 0.01;

/// Raise a weight to `MIN_WEIGHT`; non-finite weights count as the minimum.
pub fn floor_weight(weight: f64) -> f64 {
    if weight.is_finite() {
        weight.max(MIN_WEIGHT)
    } else {
        MIN_WEIGHT
    }
}

/// Pick one index with probability proportional to its (floored) weight.
/// Returns `None` only for an empty slice.
pub fn weighted_pick(weights: &[f64], rng: &mut dyn RngCore) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().map(|&w| floor_weight(w)).sum();
    let roll = rng.random_range(0.0..total);
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        cumulative += floor_weight(w);
        if roll < cumulative {
            return Some(i);
        }
    }
    Some(weights.len() - 1)
}

/// Draw `draws` distinct indices, each draw weighted over the remaining pool.
/// Indices are returned in draw order; at most `weights.len()` are drawn.
pub fn weighted_draw_without_replacement(
    weights: &[f64],
    draws: usize,
    rng: &mut dyn RngCore,
) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..weights.len()).collect();
    let mut drawn = Vec::with_capacity(draws.min(pool.len()));
    while drawn.len() < draws && !pool.is_empty() {
        let pool_weights: Vec<f64> = pool.iter().map(|&i| weights[i]).collect();
        let Some(slot) = weighted_pick(&pool_weights, rng) else {
            break;
        };
        drawn.push(pool.remove(slot));
    }
    drawn
}
