//! Système de numération combinatoire (combinadics) : rang et dé-rang
//! en forme close pour les k-sous-ensembles de {0..n-1}.

/// Coefficient binomial C(n, k). Retourne 0 si k > n.
/// La forme multiplicative garde chaque produit intermédiaire exact :
/// après l'itération i, result vaut C(n - k + i, i).
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u64 = 1;
    for i in 1..=k {
        result = result * (n - (k - i)) / i;
    }
    result
}

/// Rang (0-indexé) d'un k-sous-ensemble trié croissant de {0..n-1}.
/// Pour chaque slot i, on compte les complétions valides de chaque valeur
/// sautée avant indices[i] : C(n - j - 1, k - i - 1) pour j < indices[i].
pub fn rank_combination(n: u64, indices: &[u64]) -> u64 {
    let k = indices.len() as u64;
    let mut rank = 0u64;
    for (i, &c) in indices.iter().enumerate() {
        let start = if i == 0 { 0 } else { indices[i - 1] + 1 };
        for j in start..c {
            rank += binomial(n - j - 1, k - i as u64 - 1);
        }
    }
    rank
}

/// Inverse de [`rank_combination`] : reconstruit le k-sous-ensemble trié
/// depuis son rang, en O(n·k). Aucune énumération des combinaisons.
pub fn unrank_combination(n: u64, k: usize, mut rank: u64) -> Vec<u64> {
    let mut combo = Vec::with_capacity(k);
    let mut x = 0u64;
    for i in 0..k {
        let mut c = x;
        loop {
            let count = binomial(n - c - 1, (k - i - 1) as u64);
            if count <= rank {
                rank -= count;
                c += 1;
            } else {
                combo.push(c);
                x = c + 1;
                break;
            }
        }
    }
    combo
}
