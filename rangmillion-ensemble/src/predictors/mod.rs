pub mod baseline;
pub mod deviation;
pub mod frequency;
pub mod gap_pattern;
pub mod pairs;
pub mod temporal;

use chrono::NaiveDate;
use thiserror::Error;

use rangmillion_db::models::{Draw, Pool};
use rangmillion_index::PositionError;

/// Grille candidate proposée par un prédicteur, avec sa confiance et la
/// justification lisible du choix.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub balls: [u8; 5],
    pub stars: [u8; 2],
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("données insuffisantes : {available} tirages, minimum {required}")]
    InsufficientData { required: usize, available: usize },

    #[error(transparent)]
    Position(#[from] PositionError),

    #[error("échantillonnage pondéré impossible : {0}")]
    Sampling(String),
}

/// Un prédicteur heuristique. Chaque implémentation est une lentille
/// analytique indépendante ; elle ne conserve aucun état entre deux appels.
/// draws[0] = tirage le plus récent. Le seed rend toute composante
/// aléatoire reproductible.
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;
    fn evaluate(&self, draws: &[Draw], seed: u64) -> Result<Candidate, PredictError>;
}

/// Les cinq prédicteurs de l'ensemble. `reference` est la date du prochain
/// tirage visé (utilisée par le prédicteur temporel).
pub fn all_predictors(reference: NaiveDate) -> Vec<Box<dyn Predictor>> {
    vec![
        Box::new(frequency::FrequencyPredictor::new(50)),
        Box::new(gap_pattern::GapPatternPredictor::new(0.8)),
        Box::new(deviation::DeviationPredictor::new()),
        Box::new(pairs::PairPredictor::new()),
        Box::new(temporal::TemporalPredictor::new(reference)),
    ]
}

/// Fréquence d'apparition de chaque numéro sur les `window` tirages les
/// plus récents.
pub(crate) fn count_frequencies(draws: &[Draw], pool: Pool, window: usize) -> Vec<u32> {
    let size = pool.size();
    let mut counts = vec![0u32; size];
    for draw in draws.iter().take(window) {
        for &n in pool.numbers_from(draw) {
            let idx = (n - 1) as usize;
            if idx < size {
                counts[idx] += 1;
            }
        }
    }
    counts
}

/// Retard actuel de chaque numéro : nombre de tirages depuis sa dernière
/// apparition (taille de l'historique s'il n'est jamais apparu).
pub(crate) fn current_gaps(draws: &[Draw], pool: Pool) -> Vec<usize> {
    let size = pool.size();
    let mut gaps = vec![draws.len(); size];
    for (t, draw) in draws.iter().enumerate() {
        for &n in pool.numbers_from(draw) {
            let idx = (n - 1) as usize;
            if idx < size && gaps[idx] == draws.len() {
                gaps[idx] = t;
            }
        }
    }
    gaps
}

/// Les `count` numéros aux meilleurs scores, à égalité de score le plus
/// petit numéro d'abord. Résultat trié croissant.
pub(crate) fn top_scored(scores: &[f64], count: usize) -> Vec<u8> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut picked: Vec<u8> = order.iter().take(count).map(|&i| (i + 1) as u8).collect();
    picked.sort();
    picked
}

pub(crate) fn to_ball_array(numbers: &[u8]) -> [u8; 5] {
    let mut arr = [0u8; 5];
    for (slot, &n) in arr.iter_mut().zip(numbers.iter()) {
        *slot = n;
    }
    arr
}

pub(crate) fn to_star_array(numbers: &[u8]) -> [u8; 2] {
    let mut arr = [0u8; 2];
    for (slot, &n) in arr.iter_mut().zip(numbers.iter()) {
        *slot = n;
    }
    arr
}

/// Historique synthétique pour les tests : dates valides (tous les 3 jours)
/// et grilles déterministes variées.
pub fn make_test_draws(n: usize) -> Vec<Draw> {
    let start = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
    (0..n)
        .map(|i| {
            let base = (i % 9) as u8;
            let date = start + chrono::Days::new(3 * i as u64);
            Draw {
                draw_id: format!("{:03}", i),
                date: date.format("%Y-%m-%d").to_string(),
                balls: [base + 1, base + 11, base + 21, base + 31, base + 41],
                stars: [(i % 6) as u8 + 1, (i % 6) as u8 + 7],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangmillion_db::models::validate_draw;

    #[test]
    fn test_make_test_draws_valid() {
        for draw in make_test_draws(40) {
            assert!(validate_draw(&draw.balls, &draw.stars).is_ok(),
                "tirage invalide : {:?} {:?}", draw.balls, draw.stars);
            assert!(draw.parsed_date().is_some(), "date invalide : {}", draw.date);
        }
    }

    #[test]
    fn test_count_frequencies_window() {
        let draws = make_test_draws(20);
        let counts = count_frequencies(&draws, Pool::Balls, 10);
        let total: u32 = counts.iter().sum();
        assert_eq!(total, 50); // 10 tirages × 5 boules
    }

    #[test]
    fn test_current_gaps() {
        let draws = make_test_draws(9);
        let gaps = current_gaps(&draws, Pool::Balls);
        // draws[0] a base=0 → boules 1,11,21,31,41 vues au tirage 0
        assert_eq!(gaps[0], 0);
        assert_eq!(gaps[40], 0);
        // La boule 10 (base=9) n'existe jamais : retard = taille historique
        assert_eq!(gaps[9], 9);
    }

    #[test]
    fn test_top_scored_tie_break_ascending() {
        let mut scores = vec![0.0; 10];
        scores[7] = 1.0;
        // Tous les autres à égalité : les plus petits numéros complètent
        let top = top_scored(&scores, 3);
        assert_eq!(top, vec![1, 2, 8]);
    }

    #[test]
    fn test_top_scored_sorted_output() {
        let mut scores = vec![0.0; 50];
        scores[49] = 3.0;
        scores[0] = 2.0;
        scores[24] = 1.0;
        let top = top_scored(&scores, 3);
        assert_eq!(top, vec![1, 25, 50]);
    }

    #[test]
    fn test_all_predictors_count() {
        let reference = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        assert_eq!(all_predictors(reference).len(), 5);
    }
}
