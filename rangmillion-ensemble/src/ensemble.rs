use chrono::NaiveDate;
use serde::Serialize;

use rangmillion_db::models::Draw;

use crate::predictors::baseline::BaselinePredictor;
use crate::predictors::{all_predictors, Candidate, Predictor};

/// En deçà de ce nombre de tirages, l'ensemble est court-circuité au
/// profit du prédicteur de référence.
pub const MIN_HISTORY: usize = 10;
/// Plafond de confiance : jamais de surenchère sur un processus aléatoire.
pub const CONFIDENCE_CAP: f64 = 0.85;

/// Prédiction finale : grille, confiance, méthode et justification.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub balls: [u8; 5],
    pub stars: [u8; 2],
    pub confidence: f64,
    pub method: String,
    pub reasoning: String,
}

impl Prediction {
    fn from_candidate(candidate: Candidate, method: &str) -> Self {
        Self {
            balls: candidate.balls,
            stars: candidate.stars,
            confidence: candidate.confidence,
            method: method.to_string(),
            reasoning: candidate.reasoning,
        }
    }
}

/// Combine les prédicteurs heuristiques par vote pondéré par la confiance.
pub struct Ensemble {
    predictors: Vec<Box<dyn Predictor>>,
    baseline: BaselinePredictor,
}

impl Ensemble {
    /// `reference` : date du prochain tirage visé (prédicteur temporel).
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            predictors: all_predictors(reference),
            baseline: BaselinePredictor::new(),
        }
    }

    pub fn with_predictors(predictors: Vec<Box<dyn Predictor>>) -> Self {
        Self {
            predictors,
            baseline: BaselinePredictor::new(),
        }
    }

    /// Candidats des prédicteurs qui ont abouti. Un échec individuel est
    /// non fatal : son vote est simplement omis.
    fn successful_candidates(&self, draws: &[Draw], seed: u64) -> Vec<(String, Candidate)> {
        self.predictors
            .iter()
            .filter_map(|p| {
                p.evaluate(draws, seed)
                    .ok()
                    .map(|c| (p.name().to_string(), c))
            })
            .collect()
    }

    fn baseline_prediction(&self, draws: &[Draw]) -> Prediction {
        Prediction::from_candidate(self.baseline.candidate(draws), self.baseline.name())
    }

    /// Prédiction unique par vote pondéré. Avec moins de [`MIN_HISTORY`]
    /// tirages, ou si tous les prédicteurs échouent, retourne la grille de
    /// référence.
    pub fn predict(&self, draws: &[Draw], seed: u64) -> Prediction {
        if draws.len() < MIN_HISTORY {
            return self.baseline_prediction(draws);
        }

        let candidates = self.successful_candidates(draws, seed);
        if candidates.is_empty() {
            return self.baseline_prediction(draws);
        }

        // Chaque prédicteur vote pour ses numéros, pondéré par sa confiance
        let mut ball_votes = [0.0f64; 50];
        let mut star_votes = [0.0f64; 12];
        for (_, candidate) in &candidates {
            for &b in &candidate.balls {
                ball_votes[(b - 1) as usize] += candidate.confidence;
            }
            for &s in &candidate.stars {
                star_votes[(s - 1) as usize] += candidate.confidence;
            }
        }

        let balls = top_votes(&ball_votes, 5);
        let stars = top_votes(&star_votes, 2);

        let avg_confidence: f64 = candidates
            .iter()
            .map(|(_, c)| c.confidence)
            .sum::<f64>()
            / candidates.len() as f64;
        let data_quality = (draws.len() as f64 / 50.0).min(1.0);
        let confidence = (avg_confidence * 0.8 + data_quality * 0.2).min(CONFIDENCE_CAP);

        let names: Vec<&str> = candidates.iter().map(|(n, _)| n.as_str()).collect();
        let reasoning = format!(
            "Vote pondéré de {} prédicteurs ({}) sur {} tirages ; confiance moyenne {:.2}, qualité des données {:.2}",
            candidates.len(),
            names.join(", "),
            draws.len(),
            avg_confidence,
            data_quality,
        );

        Prediction {
            balls: [balls[0], balls[1], balls[2], balls[3], balls[4]],
            stars: [stars[0], stars[1]],
            confidence,
            method: "Ensemble".to_string(),
            reasoning,
        }
    }

    /// Alternatives classées : la grille de chaque prédicteur ayant abouti,
    /// triées par confiance décroissante.
    pub fn predict_alternatives(&self, draws: &[Draw], seed: u64) -> Vec<Prediction> {
        if draws.len() < MIN_HISTORY {
            return vec![self.baseline_prediction(draws)];
        }

        let mut predictions: Vec<Prediction> = self
            .successful_candidates(draws, seed)
            .into_iter()
            .map(|(name, c)| Prediction::from_candidate(c, &name))
            .collect();

        if predictions.is_empty() {
            return vec![self.baseline_prediction(draws)];
        }

        predictions.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        predictions
    }
}

/// Les `count` numéros aux totaux de votes les plus hauts, à égalité le
/// plus petit numéro d'abord. Résultat trié croissant.
fn top_votes(votes: &[f64], count: usize) -> Vec<u8> {
    let mut order: Vec<usize> = (0..votes.len()).collect();
    order.sort_by(|&a, &b| {
        votes[b]
            .partial_cmp(&votes[a])
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.cmp(&b))
    });
    let mut picked: Vec<u8> = order.iter().take(count).map(|&i| (i + 1) as u8).collect();
    picked.sort();
    picked
}
