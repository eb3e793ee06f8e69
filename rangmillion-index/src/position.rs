//! Bijection entre une combinaison EuroMillions (5 boules parmi 50,
//! 2 étoiles parmi 12) et sa position dans [1, 139 838 160].
//!
//! Les deux sous-espaces sont indexés indépendamment par le système de
//! numération combinatoire puis composés en base mixte :
//! `position = rang_boules * 66 + rang_étoiles + 1`.

use thiserror::Error;

use crate::combinatorics::{rank_combination, unrank_combination};

/// C(50,5) : nombre de quintuplets de boules.
pub const BALL_SPACE: u64 = 2_118_760;
/// C(12,2) : nombre de paires d'étoiles.
pub const STAR_SPACE: u64 = 66;
/// Taille totale de l'espace des combinaisons.
pub const TOTAL_POSITIONS: u64 = BALL_SPACE * STAR_SPACE;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// Numéros hors plage ou en double.
    #[error("combinaison invalide : {0}")]
    InvalidCombination(String),

    /// Position hors de [1, 139 838 160].
    #[error("position {0} hors de l'intervalle [1, 139838160]")]
    OutOfRange(u64),
}

fn check_members(values: &[u8], max: u8, label: &str) -> Result<(), PositionError> {
    for &v in values {
        if v < 1 || v > max {
            return Err(PositionError::InvalidCombination(format!(
                "{label} {v} hors limites (1-{max})"
            )));
        }
    }
    for i in 0..values.len() {
        for j in (i + 1)..values.len() {
            if values[i] == values[j] {
                return Err(PositionError::InvalidCombination(format!(
                    "{label} en double : {}",
                    values[i]
                )));
            }
        }
    }
    Ok(())
}

/// Indices 0-basés triés croissants d'une sélection 1-basée.
fn to_indices(values: &[u8]) -> Vec<u64> {
    let mut indices: Vec<u64> = values.iter().map(|&v| (v - 1) as u64).collect();
    indices.sort();
    indices
}

/// Position (1-indexée) d'une combinaison. L'ordre d'entrée est sans
/// importance : le calcul passe toujours par la forme canonique triée.
pub fn position_of(balls: &[u8; 5], stars: &[u8; 2]) -> Result<u64, PositionError> {
    check_members(balls, 50, "boule")?;
    check_members(stars, 12, "étoile")?;

    let ball_rank = rank_combination(50, &to_indices(balls));
    let star_rank = rank_combination(12, &to_indices(stars));

    Ok(ball_rank * STAR_SPACE + star_rank + 1)
}

/// Combinaison (triée croissante) à une position donnée.
pub fn combination_at(position: u64) -> Result<([u8; 5], [u8; 2]), PositionError> {
    if position < 1 || position > TOTAL_POSITIONS {
        return Err(PositionError::OutOfRange(position));
    }

    let zero_based = position - 1;
    let ball_rank = zero_based / STAR_SPACE;
    let star_rank = zero_based % STAR_SPACE;

    let ball_indices = unrank_combination(50, 5, ball_rank);
    let star_indices = unrank_combination(12, 2, star_rank);

    let mut balls = [0u8; 5];
    for (slot, &idx) in balls.iter_mut().zip(ball_indices.iter()) {
        *slot = (idx + 1) as u8;
    }
    let mut stars = [0u8; 2];
    for (slot, &idx) in stars.iter_mut().zip(star_indices.iter()) {
        *slot = (idx + 1) as u8;
    }

    Ok((balls, stars))
}

/// Positions des tirages valides d'une liste de combinaisons, dans le même
/// ordre. Les combinaisons invalides sont ignorées.
pub fn positions_of_draws<'a, I>(draws: I) -> Vec<u64>
where
    I: IntoIterator<Item = (&'a [u8; 5], &'a [u8; 2])>,
{
    draws
        .into_iter()
        .filter_map(|(balls, stars)| position_of(balls, stars).ok())
        .collect()
}
