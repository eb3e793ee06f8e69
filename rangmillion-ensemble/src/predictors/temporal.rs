use chrono::{Datelike, NaiveDate};

use rangmillion_db::models::{Draw, Pool};

use super::{to_ball_array, to_star_array, top_scored, Candidate, PredictError, Predictor};

const MIN_DRAWS: usize = 5;
/// Poids d'un tirage du même jour de semaine que la date de référence.
const WEEKDAY_WEIGHT: f64 = 2.0;
/// Poids d'un tirage du même mois.
const MONTH_WEIGHT: f64 = 1.0;
/// Poids résiduel de tout tirage (fallback fréquentiel quand aucun
/// bucket ne correspond).
const BASE_WEIGHT: f64 = 0.1;

/// Classe l'historique par jour de semaine et par mois, et privilégie les
/// numéros sur-représentés dans les buckets correspondant à la date de
/// référence (celle du prochain tirage visé).
pub struct TemporalPredictor {
    reference: NaiveDate,
}

impl TemporalPredictor {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    fn draw_weight(&self, draw: &Draw) -> f64 {
        let mut weight = BASE_WEIGHT;
        if let Some(date) = draw.parsed_date() {
            if date.weekday() == self.reference.weekday() {
                weight += WEEKDAY_WEIGHT;
            }
            if date.month() == self.reference.month() {
                weight += MONTH_WEIGHT;
            }
        }
        weight
    }

    fn bucket_scores(&self, draws: &[Draw], pool: Pool) -> Vec<f64> {
        let mut scores = vec![0.0f64; pool.size()];
        for draw in draws {
            let weight = self.draw_weight(draw);
            for &n in pool.numbers_from(draw) {
                let idx = (n - 1) as usize;
                if idx < scores.len() {
                    scores[idx] += weight;
                }
            }
        }
        scores
    }
}

impl Predictor for TemporalPredictor {
    fn name(&self) -> &str {
        "Temporel"
    }

    fn evaluate(&self, draws: &[Draw], _seed: u64) -> Result<Candidate, PredictError> {
        if draws.len() < MIN_DRAWS {
            return Err(PredictError::InsufficientData {
                required: MIN_DRAWS,
                available: draws.len(),
            });
        }

        let ball_scores = self.bucket_scores(draws, Pool::Balls);
        let balls = top_scored(&ball_scores, 5);

        let star_scores = self.bucket_scores(draws, Pool::Stars);
        let stars = top_scored(&star_scores, 2);

        let matching = draws
            .iter()
            .filter(|d| self.draw_weight(d) > BASE_WEIGHT)
            .count();
        let coverage = matching as f64 / draws.len() as f64;
        let confidence = 0.48 + 0.12 * coverage;

        let reasoning = format!(
            "{} tirages sur {} dans les buckets {} / mois {} de la date de référence {}",
            matching,
            draws.len(),
            self.reference.weekday(),
            self.reference.month(),
            self.reference,
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

    fn draw(id: usize, date: &str, balls: [u8; 5], stars: [u8; 2]) -> Draw {
        Draw {
            draw_id: format!("{:03}", id),
            date: date.to_string(),
            balls,
            stars,
        }
    }

    #[test]
    fn test_temporal_valid_candidate() {
        let reference = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let predictor = TemporalPredictor::new(reference);
        let draws = make_test_draws(30);
        let candidate = predictor.evaluate(&draws, 42).unwrap();
        assert!(validate_draw(&candidate.balls, &candidate.stars).is_ok());
    }

    #[test]
    fn test_temporal_insufficient_data() {
        let reference = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let predictor = TemporalPredictor::new(reference);
        let draws = make_test_draws(3);
        assert!(matches!(
            predictor.evaluate(&draws, 42),
            Err(PredictError::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_temporal_favors_matching_weekday() {
        // Référence : mardi 2025-06-03. Les tirages du mardi portent les
        // boules 40-44, ceux du vendredi les boules 1-5.
        let reference = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let draws = vec![
            draw(0, "2025-05-27", [40, 41, 42, 43, 44], [10, 11]), // mardi
            draw(1, "2025-05-23", [1, 2, 3, 4, 5], [1, 2]),        // vendredi
            draw(2, "2025-05-20", [40, 41, 42, 43, 44], [10, 11]), // mardi
            draw(3, "2025-05-16", [1, 2, 3, 4, 5], [1, 2]),        // vendredi
            draw(4, "2025-05-13", [40, 41, 42, 43, 44], [10, 11]), // mardi
            draw(5, "2025-05-09", [1, 2, 3, 4, 5], [1, 2]),        // vendredi
        ];
        let predictor = TemporalPredictor::new(reference);
        let candidate = predictor.evaluate(&draws, 42).unwrap();
        assert_eq!(candidate.balls, [40, 41, 42, 43, 44]);
        assert_eq!(candidate.stars, [10, 11]);
    }

    #[test]
    fn test_temporal_unparseable_dates_degrade_to_frequency() {
        // Dates illisibles : seul le poids résiduel s'applique, la
        // sélection retombe sur la fréquence brute
        let reference = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        let draws: Vec<Draw> = (0..6)
            .map(|i| draw(i, "pas-une-date", [10, 20, 30, 40, 50], [4, 9]))
            .collect();
        let predictor = TemporalPredictor::new(reference);
        let candidate = predictor.evaluate(&draws, 42).unwrap();
        assert_eq!(candidate.balls, [10, 20, 30, 40, 50]);
        assert_eq!(candidate.stars, [4, 9]);
        // Aucune correspondance de bucket : confiance plancher
        assert!((candidate.confidence - 0.48).abs() < 1e-12);
    }

    #[test]
    fn test_temporal_deterministic() {
        let reference = NaiveDate::from_ymd_opt(2025, 7, 15).unwrap();
        let predictor = TemporalPredictor::new(reference);
        let draws = make_test_draws(30);
        let a = predictor.evaluate(&draws, 1).unwrap();
        let b = predictor.evaluate(&draws, 2).unwrap();
        assert_eq!(a.balls, b.balls);
        assert_eq!(a.stars, b.stars);
    }
}
