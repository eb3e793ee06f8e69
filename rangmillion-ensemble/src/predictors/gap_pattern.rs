use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use rangmillion_db::models::Draw;
use rangmillion_index::{analyze_gaps, combination_at, position_of, TOTAL_POSITIONS};

use super::{Candidate, PredictError, Predictor};

const MIN_DRAWS: usize = 3;

/// Extrapole la prochaine position depuis la tendance des écarts récents
/// (pondération à décroissance exponentielle) plus une perturbation
/// gaussienne (Box-Muller) calée sur l'écart-type observé, puis décode la
/// position candidate via la bijection.
pub struct GapPatternPredictor {
    decay: f64,
}

impl GapPatternPredictor {
    pub fn new(decay: f64) -> Self {
        Self { decay }
    }

    /// Moyenne des sauts chronologiques successifs, le plus récent pesant
    /// le plus lourd : poids decay^âge.
    fn weighted_trend(&self, chronological: &[u64]) -> f64 {
        let mut num = 0.0f64;
        let mut den = 0.0f64;
        let steps = chronological.len() - 1;
        for i in 0..steps {
            let jump = chronological[i + 1] as f64 - chronological[i] as f64;
            let age = (steps - 1 - i) as u32;
            let weight = self.decay.powi(age as i32);
            num += weight * jump;
            den += weight;
        }
        if den > 0.0 { num / den } else { 0.0 }
    }
}

/// Tirage gaussien standard par transformation de Box-Muller.
fn box_muller(rng: &mut StdRng) -> f64 {
    // 1 - u ∈ (0, 1] : jamais de ln(0)
    let u1 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

impl Predictor for GapPatternPredictor {
    fn name(&self) -> &str {
        "Écarts"
    }

    fn evaluate(&self, draws: &[Draw], seed: u64) -> Result<Candidate, PredictError> {
        if draws.len() < MIN_DRAWS {
            return Err(PredictError::InsufficientData {
                required: MIN_DRAWS,
                available: draws.len(),
            });
        }

        // Positions en ordre chronologique (draws[0] = le plus récent)
        let mut positions = Vec::with_capacity(draws.len());
        for draw in draws.iter().rev() {
            let (balls, stars) = draw.canonical();
            positions.push(position_of(&balls, &stars)?);
        }

        let stats = analyze_gaps(&positions);
        let trend = self.weighted_trend(&positions);

        let mut rng = StdRng::seed_from_u64(seed);
        let perturbation = box_muller(&mut rng) * stats.std_dev;

        let last = *positions.last().unwrap() as f64;
        let raw = last + trend + perturbation;
        let target = (raw.round() as i64).clamp(1, TOTAL_POSITIONS as i64) as u64;

        let (balls, stars) = combination_at(target)?;

        // Plus les écarts sont réguliers, plus l'extrapolation est fiable
        let stability = if stats.average > 0.0 {
            1.0 / (1.0 + stats.std_dev / stats.average)
        } else {
            0.5
        };
        let confidence = 0.5 + 0.15 * stability;

        let reasoning = format!(
            "Position extrapolée {} (dernière {}, tendance {:+.0}, perturbation {:+.0}) ; écart moyen {:.0}, écart-type {:.0}",
            target, last as u64, trend, perturbation, stats.average, stats.std_dev,
        );

        Ok(Candidate {
            balls,
            stars,
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

    /// Historique dont les positions chronologiques croissent d'exactement
    /// `spacing` à chaque tirage.
    fn uniformly_spaced_draws(n: u64, spacing: u64) -> Vec<Draw> {
        (0..n)
            .rev()
            .map(|i| {
                let (balls, stars) = combination_at(1 + i * spacing).unwrap();
                Draw {
                    draw_id: format!("{:03}", i),
                    date: "2025-06-03".to_string(),
                    balls,
                    stars,
                }
            })
            .collect()
    }

    #[test]
    fn test_gap_pattern_valid_candidate() {
        let predictor = GapPatternPredictor::new(0.8);
        let draws = make_test_draws(20);
        let candidate = predictor.evaluate(&draws, 42).unwrap();
        assert!(validate_draw(&candidate.balls, &candidate.stars).is_ok());
    }

    #[test]
    fn test_gap_pattern_insufficient_data() {
        let predictor = GapPatternPredictor::new(0.8);
        let draws = make_test_draws(2);
        assert!(matches!(
            predictor.evaluate(&draws, 42),
            Err(PredictError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_gap_pattern_deterministic_with_seed() {
        let predictor = GapPatternPredictor::new(0.8);
        let draws = make_test_draws(20);
        let a = predictor.evaluate(&draws, 7).unwrap();
        let b = predictor.evaluate(&draws, 7).unwrap();
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.stars, b.stars);
    }

    #[test]
    fn test_gap_pattern_uniform_spacing_exact() {
        // 20 positions espacées de 1 000 000 : écart-type nul, donc aucune
        // perturbation ; l'extrapolation tombe exactement un cran plus loin
        let draws = uniformly_spaced_draws(20, 1_000_000);
        let predictor = GapPatternPredictor::new(0.8);
        let candidate = predictor.evaluate(&draws, 123).unwrap();

        let expected = combination_at(1 + 20 * 1_000_000).unwrap();
        assert_eq!(candidate.balls, expected.0);
        assert_eq!(candidate.stars, expected.1);
    }

    #[test]
    fn test_weighted_trend_uniform() {
        let predictor = GapPatternPredictor::new(0.8);
        let positions: Vec<u64> = (0..10).map(|i| 1 + i * 500).collect();
        let trend = predictor.weighted_trend(&positions);
        assert!((trend - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_trend_favors_recent() {
        let predictor = GapPatternPredictor::new(0.5);
        // Anciens sauts de 100, saut le plus récent de 1000
        let positions = vec![0u64, 100, 200, 300, 1300];
        let trend = predictor.weighted_trend(&positions);
        assert!(trend > 325.0, "la tendance devrait pencher vers le saut récent : {trend}");
    }

    #[test]
    fn test_box_muller_standard_moments() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 10_000;
        let samples: Vec<f64> = (0..n).map(|_| box_muller(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05, "moyenne trop éloignée de 0 : {mean}");
        assert!((var - 1.0).abs() < 0.1, "variance trop éloignée de 1 : {var}");
    }

    #[test]
    fn test_gap_pattern_clamps_to_interval() {
        // Historique collé à la fin de l'espace : l'extrapolation dépasse
        // et doit être ramenée dans [1, TOTAL_POSITIONS]
        let top = TOTAL_POSITIONS;
        let draws: Vec<Draw> = (0..5u64)
            .map(|i| {
                let (balls, stars) = combination_at(top - i * 10).unwrap();
                Draw {
                    draw_id: format!("{:03}", i),
                    date: "2025-06-03".to_string(),
                    balls,
                    stars,
                }
            })
            .collect();
        let predictor = GapPatternPredictor::new(0.8);
        // draws[0] le plus récent = position la plus haute → tendance positive
        let candidate = predictor.evaluate(&draws, 42).unwrap();
        assert!(validate_draw(&candidate.balls, &candidate.stars).is_ok());
    }
}
