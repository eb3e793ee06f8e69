use rangmillion_db::models::Draw;

use super::{Candidate, PredictError, Predictor};

/// Grille de référence issue des fréquences historiques publiées du jeu
/// (numéros les plus sortis depuis 2004).
pub const EDUCATED_BALLS: [u8; 5] = [19, 21, 23, 42, 44];
pub const EDUCATED_STARS: [u8; 2] = [2, 3];
/// Confiance fixe du repli : volontairement basse.
pub const BASELINE_CONFIDENCE: f64 = 0.45;

/// Repli quand l'historique est trop mince pour les heuristiques : grille
/// fixe documentée, jamais d'échec.
pub struct BaselinePredictor;

impl BaselinePredictor {
    pub fn new() -> Self {
        Self
    }

    /// Variante infaillible, pour les appelants qui ont besoin d'une
    /// grille quoi qu'il arrive.
    pub fn candidate(&self, draws: &[Draw]) -> Candidate {
        Candidate {
            balls: EDUCATED_BALLS,
            stars: EDUCATED_STARS,
            confidence: BASELINE_CONFIDENCE,
            reasoning: format!(
                "Historique insuffisant ({} tirages) : grille de référence bâtie sur les fréquences historiques publiées, confiance fixe {}",
                draws.len(),
                BASELINE_CONFIDENCE,
            ),
        }
    }
}

impl Default for BaselinePredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl Predictor for BaselinePredictor {
    fn name(&self) -> &str {
        "Référence"
    }

    fn evaluate(&self, draws: &[Draw], _seed: u64) -> Result<Candidate, PredictError> {
        Ok(self.candidate(draws))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rangmillion_db::models::validate_draw;

    #[test]
    fn test_baseline_never_fails() {
        let predictor = BaselinePredictor::new();
        let candidate = predictor.evaluate(&[], 42).unwrap();
        assert!(validate_draw(&candidate.balls, &candidate.stars).is_ok());
        assert_eq!(candidate.confidence, BASELINE_CONFIDENCE);
    }

    #[test]
    fn test_baseline_mentions_history_size() {
        let predictor = BaselinePredictor::new();
        let candidate = predictor.evaluate(&[], 42).unwrap();
        assert!(candidate.reasoning.contains("insuffisant"));
        assert!(candidate.reasoning.contains("0 tirages"));
    }

    #[test]
    fn test_baseline_sorted_grid() {
        assert!(EDUCATED_BALLS.windows(2).all(|w| w[0] < w[1]));
        assert!(EDUCATED_STARS[0] < EDUCATED_STARS[1]);
    }
}
