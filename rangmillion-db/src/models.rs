use anyhow::{bail, Result};
use chrono::NaiveDate;

/// Un tirage historique : identifiant, date (YYYY-MM-DD), 5 boules, 2 étoiles.
/// Les boules et étoiles sont stockées telles quelles ; la forme canonique
/// (triée croissante) est obtenue via [`Draw::canonical`].
#[derive(Debug, Clone, PartialEq)]
pub struct Draw {
    pub draw_id: String,
    pub date: String,
    pub balls: [u8; 5],
    pub stars: [u8; 2],
}

impl Draw {
    /// Boules et étoiles triées croissantes (forme canonique pour l'indexage).
    pub fn canonical(&self) -> ([u8; 5], [u8; 2]) {
        let mut balls = self.balls;
        balls.sort();
        let mut stars = self.stars;
        stars.sort();
        (balls, stars)
    }

    /// Date parsée, ou None si le champ est mal formé.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pool {
    Balls,
    Stars,
}

impl Pool {
    pub fn size(&self) -> usize {
        match self {
            Pool::Balls => 50,
            Pool::Stars => 12,
        }
    }

    pub fn pick_count(&self) -> usize {
        match self {
            Pool::Balls => 5,
            Pool::Stars => 2,
        }
    }

    pub fn numbers_from<'a>(&self, draw: &'a Draw) -> &'a [u8] {
        match self {
            Pool::Balls => &draw.balls,
            Pool::Stars => &draw.stars,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NumberStats {
    pub number: u8,
    pub frequency: u32,
    pub gap: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrequencyTag {
    Hot,
    Cold,
    Normal,
}

impl std::fmt::Display for FrequencyTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrequencyTag::Hot => write!(f, "HOT"),
            FrequencyTag::Cold => write!(f, "COLD"),
            FrequencyTag::Normal => write!(f, "-"),
        }
    }
}

pub fn validate_draw(balls: &[u8; 5], stars: &[u8; 2]) -> Result<()> {
    for &b in balls {
        if b < 1 || b > 50 {
            bail!("Boule {} hors limites (1-50)", b);
        }
    }
    for &s in stars {
        if s < 1 || s > 12 {
            bail!("Étoile {} hors limites (1-12)", s);
        }
    }
    for i in 0..balls.len() {
        for j in (i + 1)..balls.len() {
            if balls[i] == balls[j] {
                bail!("Boule en double : {}", balls[i]);
            }
        }
    }
    if stars[0] == stars[1] {
        bail!("Étoile en double : {}", stars[0]);
    }
    Ok(())
}

/// Statistiques descriptives par numéro : fréquence et retard (nombre de
/// tirages depuis la dernière apparition). draws[0] = le plus récent.
pub fn compute_stats(draws: &[Draw], pool: Pool) -> Vec<NumberStats> {
    let size = pool.size();
    let mut stats: Vec<NumberStats> = (1..=size as u8)
        .map(|n| NumberStats {
            number: n,
            frequency: 0,
            gap: 0,
        })
        .collect();

    let mut seen = vec![false; size];
    for (i, draw) in draws.iter().enumerate() {
        for &n in pool.numbers_from(draw) {
            let idx = (n - 1) as usize;
            if idx < size {
                stats[idx].frequency += 1;
                if !seen[idx] {
                    stats[idx].gap = i as u32;
                    seen[idx] = true;
                }
            }
        }
    }

    for (idx, stat) in stats.iter_mut().enumerate() {
        if !seen[idx] {
            stat.gap = draws.len() as u32;
        }
    }

    stats
}

/// Tague chaque numéro Hot/Cold selon l'écart relatif de sa fréquence à
/// l'attendu uniforme (seuil ±30 %).
pub fn tag_frequencies(stats: &[NumberStats], draws_count: usize, pool: Pool) -> Vec<FrequencyTag> {
    let expected = draws_count as f64 * pool.pick_count() as f64 / pool.size() as f64;
    let threshold = 0.3;

    stats
        .iter()
        .map(|s| {
            if expected <= 0.0 {
                return FrequencyTag::Normal;
            }
            let deviation = (s.frequency as f64 - expected) / expected;
            if deviation > threshold {
                FrequencyTag::Hot
            } else if deviation < -threshold {
                FrequencyTag::Cold
            } else {
                FrequencyTag::Normal
            }
        })
        .collect()
}
