use std::collections::HashMap;

use rangmillion_db::models::{Draw, Pool};

use super::{to_ball_array, to_star_array, top_scored, Candidate, PredictError, Predictor};

const MIN_DRAWS: usize = 5;
/// Bonus appliqué aux paires d'entiers consécutifs.
const CONSECUTIVE_BONUS: f64 = 1.5;

/// Compte les cooccurrences de paires de numéros sur l'historique, avec un
/// bonus pour les paires d'entiers consécutifs, et privilégie les numéros
/// membres des paires les plus fréquentes.
pub struct PairPredictor;

impl PairPredictor {
    pub fn new() -> Self {
        Self
    }

    /// Cooccurrences de toutes les paires du pool. La clé est (min, max).
    fn pair_counts(draws: &[Draw], pool: Pool) -> HashMap<(u8, u8), u32> {
        let mut counts: HashMap<(u8, u8), u32> = HashMap::new();
        for draw in draws {
            let numbers = pool.numbers_from(draw);
            for i in 0..numbers.len() {
                for j in (i + 1)..numbers.len() {
                    let (a, b) = if numbers[i] < numbers[j] {
                        (numbers[i], numbers[j])
                    } else {
                        (numbers[j], numbers[i])
                    };
                    *counts.entry((a, b)).or_insert(0) += 1;
                }
            }
        }
        counts
    }

    /// Score par numéro : somme des comptes des paires auxquelles il
    /// appartient, paires consécutives bonifiées.
    fn member_scores(counts: &HashMap<(u8, u8), u32>, pool: Pool) -> Vec<f64> {
        let mut scores = vec![0.0f64; pool.size()];
        for (&(a, b), &count) in counts {
            let weight = if b == a + 1 {
                count as f64 * CONSECUTIVE_BONUS
            } else {
                count as f64
            };
            scores[(a - 1) as usize] += weight;
            scores[(b - 1) as usize] += weight;
        }
        scores
    }
}

impl Default for PairPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for PairPredictor {
    fn name(&self) -> &str {
        "Paires"
    }

    fn evaluate(&self, draws: &[Draw], _seed: u64) -> Result<Candidate, PredictError> {
        if draws.len() < MIN_DRAWS {
            return Err(PredictError::InsufficientData {
                required: MIN_DRAWS,
                available: draws.len(),
            });
        }

        let ball_pairs = Self::pair_counts(draws, Pool::Balls);
        let ball_scores = Self::member_scores(&ball_pairs, Pool::Balls);
        let balls = top_scored(&ball_scores, 5);

        let star_pairs = Self::pair_counts(draws, Pool::Stars);
        let star_scores = Self::member_scores(&star_pairs, Pool::Stars);
        let stars = top_scored(&star_scores, 2);

        // Égalités départagées par la plus petite paire pour rester
        // indépendant de l'ordre d'itération de la table
        let best_pair = ball_pairs
            .iter()
            .max_by_key(|(pair, count)| (**count, std::cmp::Reverse(**pair)))
            .map(|(&(a, b), &count)| (a, b, count));

        let data_factor = (draws.len() as f64 / 40.0).min(1.0);
        let confidence = 0.52 + 0.13 * data_factor;

        let reasoning = match best_pair {
            Some((a, b, count)) => format!(
                "Paire la plus fréquente ({a}, {b}) vue {count} fois sur {} tirages ; sélection des numéros aux paires dominantes",
                draws.len(),
            ),
            None => "Aucune paire observée ; sélection uniforme".to_string(),
        };

        Ok(Candidate {
            balls: to_ball_array(&balls),
            stars: to_star_array(&stars),
            confidence,
            reasoning,
        })
    }
}
