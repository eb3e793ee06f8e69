mod display;
mod import;
mod verify;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::{Parser, Subcommand};

use rangmillion_db::db::{
    count_draws, db_path, fetch_last_draws, insert_draw, migrate, open_db, seed_if_empty,
};
use rangmillion_db::models::{compute_stats, tag_frequencies, validate_draw, Draw, Pool};
use rangmillion_ensemble::Ensemble;
use rangmillion_index::{analyze_gaps, combination_at, position_of};

use crate::display::{
    display_alternatives, display_draws, display_gap_stats, display_import_summary,
    display_prediction, display_stats, display_verify_report,
};

#[derive(Parser)]
#[command(name = "rangmillion", about = "Indexeur combinatoire et prédicteurs EuroMillions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Importer les tirages depuis un fichier CSV (draw_id;date;5 boules;2 étoiles)
    Import {
        /// Chemin vers le fichier CSV
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Afficher le chemin de la base de données
    DbPath,

    /// Peupler la base avec l'historique de démarrage si elle est vide
    Seed,

    /// Lister les derniers tirages avec leur position
    List {
        /// Nombre de tirages à afficher
        #[arg(short, long, default_value = "10")]
        last: u32,
    },

    /// Afficher les statistiques (fréquences, retards, tags chaud/froid)
    Stats {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,
    },

    /// Position d'une combinaison (5 boules puis 2 étoiles)
    Rank {
        /// 5 boules + 2 étoiles (7 nombres)
        numbers: Vec<u8>,
    },

    /// Combinaison à une position donnée
    Unrank {
        /// Position dans [1, 139838160]
        position: u64,
    },

    /// Statistiques d'écarts entre les positions historiques
    Gaps {
        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,

        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Prédire la prochaine grille (ensemble + alternatives)
    Predict {
        /// Seed pour la reproductibilité (défaut : date du jour YYYYMMDD)
        #[arg(long)]
        seed: Option<u64>,

        /// Fenêtre d'analyse (nombre de tirages)
        #[arg(short, long, default_value = "100")]
        window: u32,

        /// Afficher aussi la grille de chaque heuristique
        #[arg(short, long)]
        alternatives: bool,

        /// Sortie JSON
        #[arg(long)]
        json: bool,
    },

    /// Vérifier la bijection position ↔ combinaison
    Verify {
        /// Taille de l'échantillon aller-retour
        #[arg(short, long, default_value = "1000000")]
        samples: u64,
    },

    /// Ajouter un tirage manuellement
    Add,
}

/// Seed déterministe basé sur la date du jour (YYYYMMDD).
fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let path = db_path();
    let conn = open_db(&path)?;
    migrate(&conn)?;

    match cli.command {
        Command::Import { file } => cmd_import(&conn, &file),
        Command::DbPath => {
            println!("{}", path.display());
            Ok(())
        }
        Command::Seed => cmd_seed(&conn),
        Command::List { last } => cmd_list(&conn, last),
        Command::Stats { window } => cmd_stats(&conn, window),
        Command::Rank { numbers } => cmd_rank(&numbers),
        Command::Unrank { position } => cmd_unrank(position),
        Command::Gaps { window, json } => cmd_gaps(&conn, window, json),
        Command::Predict { seed, window, alternatives, json } => {
            cmd_predict(&conn, seed, window, alternatives, json)
        }
        Command::Verify { samples } => cmd_verify(samples),
        Command::Add => cmd_add(&conn),
    }
}

fn cmd_import(conn: &rangmillion_db::rusqlite::Connection, file: &PathBuf) -> Result<()> {
    let result = import::import_csv(conn, file)?;
    display_import_summary(&result);
    Ok(())
}

fn cmd_seed(conn: &rangmillion_db::rusqlite::Connection) -> Result<()> {
    let inserted = seed_if_empty(conn)?;
    if inserted > 0 {
        println!("Base initialisée avec {} tirages de démarrage.", inserted);
    } else {
        println!("Base déjà peuplée ({} tirages), rien à faire.", count_draws(conn)?);
    }
    Ok(())
}

fn cmd_list(conn: &rangmillion_db::rusqlite::Connection, last: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : rangmillion seed (ou import)");
        return Ok(());
    }
    let draws = fetch_last_draws(conn, last)?;
    display_draws(&draws);
    Ok(())
}

fn cmd_stats(conn: &rangmillion_db::rusqlite::Connection, window: u32) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : rangmillion seed (ou import)");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws(conn, effective_window)?;

    let ball_stats = compute_stats(&draws, Pool::Balls);
    let ball_tags = tag_frequencies(&ball_stats, draws.len(), Pool::Balls);
    let star_stats = compute_stats(&draws, Pool::Stars);
    let star_tags = tag_frequencies(&star_stats, draws.len(), Pool::Stars);

    display_stats(&ball_stats, &ball_tags, &star_stats, &star_tags, effective_window);
    Ok(())
}

fn cmd_rank(numbers: &[u8]) -> Result<()> {
    if numbers.len() != 7 {
        bail!("Attendu 7 nombres : 5 boules + 2 étoiles. Reçu : {}", numbers.len());
    }
    let balls: [u8; 5] = [numbers[0], numbers[1], numbers[2], numbers[3], numbers[4]];
    let stars: [u8; 2] = [numbers[5], numbers[6]];

    let position = position_of(&balls, &stars)?;
    println!("Position : {}", position);
    Ok(())
}

fn cmd_unrank(position: u64) -> Result<()> {
    let (balls, stars) = combination_at(position)?;
    println!(
        "Boules : {}  |  Étoiles : {}",
        balls.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(" - "),
        stars.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(" - "),
    );
    Ok(())
}

/// Positions des tirages en base, du plus récent au plus ancien.
fn history_positions(draws: &[Draw]) -> Vec<u64> {
    draws
        .iter()
        .filter_map(|d| {
            let (balls, stars) = d.canonical();
            position_of(&balls, &stars).ok()
        })
        .collect()
}

fn cmd_gaps(conn: &rangmillion_db::rusqlite::Connection, window: u32, json: bool) -> Result<()> {
    let n = count_draws(conn)?;
    let effective_window = window.min(n.max(1));
    let draws = fetch_last_draws(conn, effective_window)?;
    let positions = history_positions(&draws);

    let stats = analyze_gaps(&positions);
    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        display_gap_stats(&stats, positions.len());
    }
    Ok(())
}

fn cmd_predict(
    conn: &rangmillion_db::rusqlite::Connection,
    seed: Option<u64>,
    window: u32,
    alternatives: bool,
    json: bool,
) -> Result<()> {
    let n = count_draws(conn)?;
    if n == 0 {
        println!("Base vide. Lancez d'abord : rangmillion seed (ou import)");
        return Ok(());
    }
    let effective_window = window.min(n);
    let draws = fetch_last_draws(conn, effective_window)?;

    let effective_seed = seed.unwrap_or_else(|| {
        let ds = date_seed();
        if !json {
            println!("(Seed du jour : {ds})");
        }
        ds
    });

    let reference = chrono::Local::now().date_naive();
    let ensemble = Ensemble::new(reference);

    let prediction = ensemble.predict(&draws, effective_seed);

    if alternatives {
        let ranked = ensemble.predict_alternatives(&draws, effective_seed);
        if json {
            println!("{}", serde_json::to_string_pretty(&ranked)?);
        } else {
            display_prediction(&prediction);
            display_alternatives(&ranked);
        }
    } else if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        display_prediction(&prediction);
    }

    Ok(())
}

fn cmd_verify(samples: u64) -> Result<()> {
    let report = verify::run_verify(samples);
    display_verify_report(&report);
    if !report.is_clean() {
        bail!("Bijection invalide : voir le rapport ci-dessus");
    }
    Ok(())
}

fn cmd_add(conn: &rangmillion_db::rusqlite::Connection) -> Result<()> {
    println!("Ajout d'un tirage manuellement\n");

    let draw_id = prompt("Identifiant du tirage (ex: 25044) : ")?;
    let raw_date = prompt("Date (JJ/MM/AAAA) : ")?;

    let date_parts: Vec<&str> = raw_date.split('/').collect();
    if date_parts.len() != 3 {
        bail!("Format de date invalide");
    }
    let date = format!("{}-{}-{}", date_parts[2], date_parts[1], date_parts[0]);

    let balls = prompt_balls()?;
    let stars = prompt_stars()?;

    validate_draw(&balls, &stars)?;

    let draw = Draw {
        draw_id,
        date,
        balls,
        stars,
    };

    println!("\nTirage à insérer :");
    display_draws(&[draw.clone()]);

    let confirm = prompt("\nConfirmer l'insertion ? (o/n) : ")?;
    if confirm.trim().to_lowercase() == "o" {
        let inserted = insert_draw(conn, &draw)?;
        if inserted {
            println!("Tirage inséré avec succès.");
        } else {
            println!("Ce tirage existe déjà (doublon ignoré).");
        }
    } else {
        println!("Insertion annulée.");
    }

    Ok(())
}

fn prompt(msg: &str) -> Result<String> {
    print!("{}", msg);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("Erreur de lecture")?;
    Ok(input.trim().to_string())
}

fn prompt_balls() -> Result<[u8; 5]> {
    loop {
        let input = prompt("5 boules (séparées par des espaces, 1-50) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 5 => {
                let arr = [v[0], v[1], v[2], v[3], v[4]];
                if validate_draw(&arr, &[1, 2]).is_ok() {
                    return Ok(arr);
                }
                println!("Numéros invalides (1-50, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 5 numéros. Réessayez."),
        }
    }
}

fn prompt_stars() -> Result<[u8; 2]> {
    loop {
        let input = prompt("2 étoiles (séparées par un espace, 1-12) : ")?;
        let nums: Result<Vec<u8>, _> = input.split_whitespace().map(|s| s.parse::<u8>()).collect();
        match nums {
            Ok(v) if v.len() == 2 => {
                let arr = [v[0], v[1]];
                if validate_draw(&[1, 2, 3, 4, 5], &arr).is_ok() {
                    return Ok(arr);
                }
                println!("Étoiles invalides (1-12, pas de doublons). Réessayez.");
            }
            _ => println!("Entrez exactement 2 numéros. Réessayez."),
        }
    }
}
