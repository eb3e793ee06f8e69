use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::import::ImportResult;
use crate::verify::VerifyReport;
use rangmillion_db::models::{Draw, FrequencyTag, NumberStats};
use rangmillion_ensemble::Prediction;
use rangmillion_index::GapStats;

fn numbers_str(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:2}", n))
        .collect::<Vec<_>>()
        .join(" - ")
}

pub fn display_draws(draws: &[Draw]) {
    if draws.is_empty() {
        println!("Aucun tirage à afficher.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Tirage", "Date", "Boules", "Étoiles", "Position"]);

    for draw in draws {
        let (balls, stars) = draw.canonical();
        let position = rangmillion_index::position_of(&balls, &stars)
            .map(|p| p.to_string())
            .unwrap_or_else(|_| "—".to_string());

        table.add_row(vec![
            &draw.draw_id,
            &draw.date,
            &numbers_str(&balls),
            &numbers_str(&stars),
            &position,
        ]);
    }

    println!("{table}");
}

pub fn display_import_summary(result: &ImportResult) {
    println!("Import terminé :");
    println!("  Total lignes lues : {}", result.total_records);
    println!("  Insérés           : {}", result.inserted);
    println!("  Doublons ignorés  : {}", result.skipped);
    if result.errors > 0 {
        println!("  Erreurs           : {}", result.errors);
    }
}

fn stats_table(stats: &[NumberStats], tags: &[FrequencyTag]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Numéro", "Fréquence", "Retard", "Tag"]);

    let mut order: Vec<usize> = (0..stats.len()).collect();
    order.sort_by(|&a, &b| stats[b].frequency.cmp(&stats[a].frequency));

    for &i in &order {
        let color = match tags[i] {
            FrequencyTag::Hot => Color::Green,
            FrequencyTag::Cold => Color::Red,
            FrequencyTag::Normal => Color::White,
        };
        table.add_row(vec![
            Cell::new(format!("{:2}", stats[i].number)),
            Cell::new(stats[i].frequency.to_string()),
            Cell::new(stats[i].gap.to_string()),
            Cell::new(tags[i].to_string()).fg(color),
        ]);
    }
    table
}

pub fn display_stats(
    ball_stats: &[NumberStats],
    ball_tags: &[FrequencyTag],
    star_stats: &[NumberStats],
    star_tags: &[FrequencyTag],
    window: u32,
) {
    println!("\n📊 Statistiques sur les {} derniers tirages\n", window);

    println!("── Boules (1-50) ──");
    println!("{}", stats_table(ball_stats, ball_tags));

    println!("\n── Étoiles (1-12) ──");
    println!("{}", stats_table(star_stats, star_tags));
}

pub fn display_gap_stats(stats: &GapStats, n_positions: usize) {
    println!("\n📏 Écarts entre les {} positions historiques\n", n_positions);

    if stats.gaps.is_empty() {
        println!("Moins de 2 positions : aucun écart à analyser.");
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Écarts", "Moyenne", "Min", "Max", "Écart-type"]);
    table.add_row(vec![
        stats.gaps.len().to_string(),
        format!("{:.1}", stats.average),
        stats.min.to_string(),
        stats.max.to_string(),
        format!("{:.1}", stats.std_dev),
    ]);
    println!("{table}");
}

pub fn display_prediction(prediction: &Prediction) {
    println!("\n🎯 Prédiction ({})\n", prediction.method);

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Boules", "Étoiles", "Confiance"]);
    table.add_row(vec![
        numbers_str(&prediction.balls),
        numbers_str(&prediction.stars),
        format!("{:.2}", prediction.confidence),
    ]);
    println!("{table}");
    println!("{}", prediction.reasoning);
}

pub fn display_alternatives(predictions: &[Prediction]) {
    println!("\n🎲 Grilles alternatives par heuristique\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Méthode", "Boules", "Étoiles", "Confiance"]);

    for p in predictions {
        table.add_row(vec![
            p.method.clone(),
            numbers_str(&p.balls),
            numbers_str(&p.stars),
            format!("{:.2}", p.confidence),
        ]);
    }
    println!("{table}");

    for p in predictions {
        println!("[{}] {}", p.method, p.reasoning);
    }
}

pub fn display_verify_report(report: &VerifyReport) {
    println!("\n🔍 Vérification de la bijection position ↔ combinaison\n");

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Contrôle", "Positions testées", "Échecs"]);
    table.add_row(vec![
        "Bornes".to_string(),
        report.boundary_checked.to_string(),
        report.boundary_failures.to_string(),
    ]);
    table.add_row(vec![
        "Bloc étoiles (exhaustif)".to_string(),
        report.star_block_checked.to_string(),
        report.star_block_failures.to_string(),
    ]);
    table.add_row(vec![
        "Échantillon aller-retour".to_string(),
        report.sample_checked.to_string(),
        report.sample_failures.to_string(),
    ]);
    println!("{table}");

    if report.is_clean() {
        println!("Bijection vérifiée : aucun échec.");
    } else {
        println!("ATTENTION : échecs détectés, l'indexeur n'est pas fiable.");
    }
}
