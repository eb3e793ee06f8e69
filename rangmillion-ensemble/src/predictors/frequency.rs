use rangmillion_db::models::{Draw, Pool};

use super::{
    count_frequencies, current_gaps, to_ball_array, to_star_array, Candidate, PredictError,
    Predictor,
};

const MIN_DRAWS: usize = 5;

/// Mélange chaud/froid : combine les numéros sur-représentés dans la
/// fenêtre récente, les sous-représentés, et le numéro au retard maximal.
pub struct FrequencyPredictor {
    window: usize,
}

impl FrequencyPredictor {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Numéros triés par fréquence décroissante (à égalité, le plus petit
    /// numéro d'abord).
    fn by_frequency(counts: &[u32]) -> Vec<u8> {
        let mut order: Vec<usize> = (0..counts.len()).collect();
        order.sort_by(|&a, &b| counts[b].cmp(&counts[a]).then(a.cmp(&b)));
        order.iter().map(|&i| (i + 1) as u8).collect()
    }

    fn most_overdue(gaps: &[usize]) -> u8 {
        let mut best = 0usize;
        for (i, &g) in gaps.iter().enumerate() {
            if g > gaps[best] {
                best = i;
            }
        }
        (best + 1) as u8
    }
}

impl Predictor for FrequencyPredictor {
    fn name(&self) -> &str {
        "Fréquence"
    }

    fn evaluate(&self, draws: &[Draw], _seed: u64) -> Result<Candidate, PredictError> {
        if draws.len() < MIN_DRAWS {
            return Err(PredictError::InsufficientData {
                required: MIN_DRAWS,
                available: draws.len(),
            });
        }

        let ball_counts = count_frequencies(draws, Pool::Balls, self.window);
        let ball_gaps = current_gaps(draws, Pool::Balls);
        let hot = Self::by_frequency(&ball_counts);
        let overdue = Self::most_overdue(&ball_gaps);

        // 1 numéro en retard maximal + 2 chauds + 2 froids, complété par
        // les chauds suivants en cas de collision
        let mut balls: Vec<u8> = vec![overdue];
        for &n in hot.iter().take(3) {
            if balls.len() < 3 && !balls.contains(&n) {
                balls.push(n);
            }
        }
        for &n in hot.iter().rev() {
            if balls.len() < 5 && !balls.contains(&n) {
                balls.push(n);
            }
        }
        for &n in &hot {
            if balls.len() < 5 && !balls.contains(&n) {
                balls.push(n);
            }
        }
        balls.sort();

        let star_counts = count_frequencies(draws, Pool::Stars, self.window);
        let star_hot = Self::by_frequency(&star_counts);
        let mut stars: Vec<u8> = vec![star_hot[0]];
        for &s in star_hot.iter().rev() {
            if stars.len() < 2 && !stars.contains(&s) {
                stars.push(s);
            }
        }
        stars.sort();

        let effective = draws.len().min(self.window);
        let data_factor = effective as f64 / self.window as f64;
        let confidence = 0.58 + 0.12 * data_factor.min(1.0);

        let reasoning = format!(
            "Fenêtre de {} tirages : 2 numéros chauds ({}, {}), 2 froids, retard maximal {} ({} tirages sans sortie)",
            effective,
            hot[0],
            hot[1],
            overdue,
            ball_gaps[(overdue - 1) as usize],
        );

        Ok(Candidate {
            balls: to_ball_array(&balls),
            stars: to_star_array(&stars),
            confidence,
            reasoning,
        })
    }
}
