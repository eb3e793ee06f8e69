use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;

use rangmillion_index::position::STAR_SPACE;
use rangmillion_index::{combination_at, position_of, TOTAL_POSITIONS};

/// Bilan de la vérification des propriétés de la bijection.
pub struct VerifyReport {
    pub boundary_checked: u64,
    pub boundary_failures: u64,
    pub star_block_checked: u64,
    pub star_block_failures: u64,
    pub sample_checked: u64,
    pub sample_failures: u64,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.boundary_failures == 0
            && self.star_block_failures == 0
            && self.sample_failures == 0
    }
}

/// Aller-retour position → combinaison → position, avec contrôle de la
/// forme canonique au passage.
fn roundtrip_ok(p: u64) -> bool {
    match combination_at(p) {
        Ok((balls, stars)) => {
            balls.windows(2).all(|w| w[0] < w[1])
                && stars[0] < stars[1]
                && position_of(&balls, &stars) == Ok(p)
        }
        Err(_) => false,
    }
}

fn check_boundaries() -> (u64, u64) {
    let mut checked = 0u64;
    let mut failures = 0u64;

    // Identités de bornes du rang
    checked += 1;
    if position_of(&[1, 2, 3, 4, 5], &[1, 2]) != Ok(1) {
        failures += 1;
    }
    checked += 1;
    if position_of(&[46, 47, 48, 49, 50], &[11, 12]) != Ok(TOTAL_POSITIONS) {
        failures += 1;
    }

    // Les positions hors intervalle doivent être rejetées
    for p in [0, TOTAL_POSITIONS + 1] {
        checked += 1;
        if combination_at(p).is_ok() {
            failures += 1;
        }
    }

    // Aller-retour aux extrémités et autour du premier bloc d'étoiles
    for p in [1, 2, STAR_SPACE, STAR_SPACE + 1, TOTAL_POSITIONS - 1, TOTAL_POSITIONS] {
        checked += 1;
        if !roundtrip_ok(p) {
            failures += 1;
        }
    }

    (checked, failures)
}

/// Les 66 premières positions doivent partager les boules [1..5] et
/// énumérer les 66 paires d'étoiles sans collision.
fn check_star_block() -> (u64, u64) {
    let mut checked = 0u64;
    let mut failures = 0u64;
    let mut seen = std::collections::HashSet::new();

    for p in 1..=STAR_SPACE {
        checked += 1;
        match combination_at(p) {
            Ok((balls, stars)) => {
                if balls != [1, 2, 3, 4, 5] || !seen.insert(stars) || !roundtrip_ok(p) {
                    failures += 1;
                }
            }
            Err(_) => failures += 1,
        }
    }

    (checked, failures)
}

/// Vérifie la bijection sur un échantillon déterministe couvrant tout
/// l'intervalle [1, TOTAL_POSITIONS], en plus des bornes et du premier
/// bloc d'étoiles.
pub fn run_verify(samples: u64) -> VerifyReport {
    let (boundary_checked, boundary_failures) = check_boundaries();
    let (star_block_checked, star_block_failures) = check_star_block();

    let samples = samples.clamp(1, TOTAL_POSITIONS);
    let stride = (TOTAL_POSITIONS / samples).max(1);
    let positions: Vec<u64> = (1..=TOTAL_POSITIONS).step_by(stride as usize).collect();

    let pb = ProgressBar::new(positions.len() as u64);
    pb.set_style(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("=> "));
    pb.set_message("aller-retour rank/unrank");

    let sample_failures = positions
        .par_iter()
        .progress_with(pb)
        .filter(|&&p| !roundtrip_ok(p))
        .count() as u64;

    VerifyReport {
        boundary_checked,
        boundary_failures,
        star_block_checked,
        star_block_failures,
        sample_checked: positions.len() as u64,
        sample_failures,
    }
}
