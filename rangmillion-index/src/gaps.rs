//! Statistiques d'écarts entre positions historiques observées.

use serde::Serialize;

/// Écarts entre positions consécutives (après tri croissant).
/// Avec moins de 2 positions, tous les champs sont à zéro et `gaps` est vide.
#[derive(Debug, Clone, Serialize)]
pub struct GapStats {
    pub average: f64,
    pub min: u64,
    pub max: u64,
    pub std_dev: f64,
    pub gaps: Vec<u64>,
}

impl GapStats {
    pub fn empty() -> Self {
        Self {
            average: 0.0,
            min: 0,
            max: 0,
            std_dev: 0.0,
            gaps: Vec::new(),
        }
    }
}

/// Trie les positions puis calcule les écarts consécutifs et leurs
/// statistiques. Indépendant de l'ordre d'entrée ; les doublons sont admis
/// (écart nul). Ne retourne jamais d'erreur.
pub fn analyze_gaps(positions: &[u64]) -> GapStats {
    if positions.len() < 2 {
        return GapStats::empty();
    }

    let mut sorted = positions.to_vec();
    sorted.sort();

    let gaps: Vec<u64> = sorted.windows(2).map(|w| w[1] - w[0]).collect();

    let min = *gaps.iter().min().unwrap_or(&0);
    let max = *gaps.iter().max().unwrap_or(&0);
    let average = gaps.iter().sum::<u64>() as f64 / gaps.len() as f64;

    let variance = gaps
        .iter()
        .map(|&g| {
            let d = g as f64 - average;
            d * d
        })
        .sum::<f64>()
        / gaps.len() as f64;

    GapStats {
        average,
        min,
        max,
        std_dev: variance.sqrt(),
        gaps,
    }
}
