use rand::distr::weighted::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;

use rangmillion_db::models::{Draw, Pool};

use super::{count_frequencies, to_ball_array, to_star_array, Candidate, PredictError, Predictor};

const MIN_DRAWS: usize = 5;
/// Taille du vivier de candidats pour le tirage pondéré.
const BALL_CANDIDATES: usize = 12;
const STAR_CANDIDATES: usize = 5;

/// Score chaque numéro par l'écart de sa fréquence observée à l'attendu
/// uniforme, en faveur des sous-tirés, puis pioche au hasard pondéré parmi
/// les meilleurs candidats (pas d'arg-max pur : deux seeds différents
/// peuvent donner deux grilles différentes).
pub struct DeviationPredictor;

impl DeviationPredictor {
    pub fn new() -> Self {
        Self
    }

    /// Écart normalisé à l'attendu uniforme. Positif = sous-tiré.
    fn deviation_scores(draws: &[Draw], pool: Pool) -> Vec<f64> {
        let counts = count_frequencies(draws, pool, draws.len());
        let expected =
            draws.len() as f64 * pool.pick_count() as f64 / pool.size() as f64;
        counts
            .iter()
            .map(|&c| (expected - c as f64) / expected.max(1.0).sqrt())
            .collect()
    }

    /// Pioche `count` numéros distincts parmi les `pool_size` meilleurs
    /// scores, pondérés par leur score décalé en positif.
    fn weighted_pick(
        scores: &[f64],
        pool_size: usize,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<u8>, PredictError> {
        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });
        let candidates: Vec<usize> = order.into_iter().take(pool_size).collect();

        let floor = candidates
            .iter()
            .map(|&i| scores[i])
            .fold(f64::MAX, f64::min);
        let mut available: Vec<(u8, f64)> = candidates
            .iter()
            .map(|&i| ((i + 1) as u8, scores[i] - floor + 0.1))
            .collect();

        let mut picked = Vec::with_capacity(count);
        for _ in 0..count {
            let weights: Vec<f64> = available.iter().map(|(_, w)| *w).collect();
            let dist = WeightedIndex::new(&weights)
                .map_err(|e| PredictError::Sampling(e.to_string()))?;
            let idx = dist.sample(rng);
            let (number, _) = available.remove(idx);
            picked.push(number);
        }
        picked.sort();
        Ok(picked)
    }
}

impl Default for DeviationPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for DeviationPredictor {
    fn name(&self) -> &str {
        "Déviation"
    }

    fn evaluate(&self, draws: &[Draw], seed: u64) -> Result<Candidate, PredictError> {
        if draws.len() < MIN_DRAWS {
            return Err(PredictError::InsufficientData {
                required: MIN_DRAWS,
                available: draws.len(),
            });
        }

        let mut rng = StdRng::seed_from_u64(seed);

        let ball_scores = Self::deviation_scores(draws, Pool::Balls);
        let balls = Self::weighted_pick(&ball_scores, BALL_CANDIDATES, 5, &mut rng)?;

        let star_scores = Self::deviation_scores(draws, Pool::Stars);
        let stars = Self::weighted_pick(&star_scores, STAR_CANDIDATES, 2, &mut rng)?;

        let data_factor = (draws.len() as f64 / 50.0).min(1.0);
        let confidence = 0.55 + 0.1 * data_factor;

        let max_dev = ball_scores.iter().cloned().fold(f64::MIN, f64::max);
        let reasoning = format!(
            "Écart maximal à l'attendu uniforme {:.2} sur {} tirages ; pioche pondérée parmi les {} numéros les plus sous-tirés",
            max_dev,
            draws.len(),
            BALL_CANDIDATES,
        );

        Ok(Candidate {
            balls: to_ball_array(&balls),
            stars: to_star_array(&stars),
            confidence,
            reasoning,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictors::make_test_draws;
    use rangmillion_db::models::validate_draw;

    #[test]
    fn test_deviation_valid_candidate() {
        let predictor = DeviationPredictor::new();
        let draws = make_test_draws(30);
        let candidate = predictor.evaluate(&draws, 42).unwrap();
        assert!(validate_draw(&candidate.balls, &candidate.stars).is_ok());
    }

    #[test]
    fn test_deviation_insufficient_data() {
        let predictor = DeviationPredictor::new();
        let draws = make_test_draws(2);
        assert!(matches!(
            predictor.evaluate(&draws, 42),
            Err(PredictError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_deviation_same_seed_same_grid() {
        let predictor = DeviationPredictor::new();
        let draws = make_test_draws(30);
        let a = predictor.evaluate(&draws, 7).unwrap();
        let b = predictor.evaluate(&draws, 7).unwrap();
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.stars, b.stars);
    }

    #[test]
    fn test_deviation_seed_varies_output() {
        let predictor = DeviationPredictor::new();
        let draws = make_test_draws(30);
        // Au moins deux seeds parmi plusieurs doivent produire des grilles
        // différentes (pioche pondérée, pas d'arg-max)
        let grids: Vec<[u8; 5]> = (0..8)
            .map(|s| predictor.evaluate(&draws, s).unwrap().balls)
            .collect();
        assert!(grids.iter().any(|g| *g != grids[0]),
            "8 seeds ont produit la même grille : {:?}", grids[0]);
    }

    #[test]
    fn test_deviation_favors_never_drawn() {
        let draws = make_test_draws(30);
        let scores = DeviationPredictor::deviation_scores(&draws, Pool::Balls);
        // La boule 10 n'apparaît jamais dans l'historique synthétique :
        // son score doit dominer celui d'une boule fréquente
        assert!(scores[9] > scores[0]);
    }

    #[test]
    fn test_weighted_pick_distinct_sorted() {
        let scores: Vec<f64> = (0..50).map(|i| i as f64 * 0.01).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let picked = DeviationPredictor::weighted_pick(&scores, 12, 5, &mut rng).unwrap();
        assert_eq!(picked.len(), 5);
        assert!(picked.windows(2).all(|w| w[0] < w[1]));
    }
}
