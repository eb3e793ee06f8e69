use anyhow::{bail, Context, Result};
use rangmillion_db::rusqlite::Connection;
use std::path::Path;

use rangmillion_db::db::insert_draw;
use rangmillion_db::models::{validate_draw, Draw};

/// Format attendu : draw_id;date;boule1;...;boule5;etoile1;etoile2
/// La date est acceptée en JJ/MM/AAAA (format FDJ) ou en AAAA-MM-JJ.
fn parse_record(record: &csv::StringRecord) -> Result<Draw> {
    let get = |idx: usize| -> Result<String> {
        record
            .get(idx)
            .map(|s| s.trim().to_string())
            .with_context(|| format!("Champ manquant à l'index {}", idx))
    };

    let get_u8 = |idx: usize| -> Result<u8> {
        let s = get(idx)?;
        s.parse::<u8>()
            .with_context(|| format!("Impossible de parser '{}' (index {})", s, idx))
    };

    let draw_id = get(0)?;
    let date = parse_date(&get(1)?)?;

    let balls: [u8; 5] = [get_u8(2)?, get_u8(3)?, get_u8(4)?, get_u8(5)?, get_u8(6)?];
    let stars: [u8; 2] = [get_u8(7)?, get_u8(8)?];

    validate_draw(&balls, &stars)?;

    Ok(Draw {
        draw_id,
        date,
        balls,
        stars,
    })
}

fn parse_date(raw: &str) -> Result<String> {
    if raw.contains('/') {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != 3 {
            bail!("Format de date invalide: '{}'", raw);
        }
        return Ok(format!("{}-{}-{}", parts[2], parts[1], parts[0]));
    }
    if chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
        bail!("Format de date invalide: '{}'", raw);
    }
    Ok(raw.to_string())
}

pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Impossible d'ouvrir {:?}", path))?;

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;

    let mut result = ImportResult {
        total_records: 0,
        inserted: 0,
        skipped: 0,
        errors: 0,
    };

    for record_result in reader.records() {
        result.total_records += 1;
        match record_result {
            Ok(record) => {
                match parse_record(&record) {
                    Ok(draw) => {
                        match insert_draw(&tx, &draw) {
                            Ok(true) => result.inserted += 1,
                            Ok(false) => result.skipped += 1,
                            Err(e) => {
                                eprintln!("Erreur insertion tirage {}: {}", result.total_records, e);
                                result.errors += 1;
                            }
                        }
                    }
                    Err(e) => {
                        eprintln!("Erreur parsing ligne {}: {}", result.total_records, e);
                        result.errors += 1;
                    }
                }
            }
            Err(e) => {
                eprintln!("Erreur lecture ligne {}: {}", result.total_records, e);
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Échec du commit")?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_french() {
        assert_eq!(parse_date("17/02/2026").unwrap(), "2026-02-17");
        assert_eq!(parse_date("01/01/2020").unwrap(), "2020-01-01");
    }

    #[test]
    fn test_parse_date_iso() {
        assert_eq!(parse_date("2025-06-03").unwrap(), "2025-06-03");
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date("03.06.2025").is_err());
        assert!(parse_date("2025/06").is_err());
    }

    #[test]
    fn test_parse_record() {
        let record = csv::StringRecord::from(vec![
            "25044", "03/06/2025", "7", "15", "23", "31", "42", "3", "8",
        ]);
        let draw = parse_record(&record).unwrap();
        assert_eq!(draw.draw_id, "25044");
        assert_eq!(draw.date, "2025-06-03");
        assert_eq!(draw.balls, [7, 15, 23, 31, 42]);
        assert_eq!(draw.stars, [3, 8]);
    }

    #[test]
    fn test_parse_record_rejects_invalid_grid() {
        let record = csv::StringRecord::from(vec![
            "25044", "03/06/2025", "7", "7", "23", "31", "42", "3", "8",
        ]);
        assert!(parse_record(&record).is_err());
    }

    #[test]
    fn test_import_csv_roundtrip() {
        use rangmillion_db::db::{count_draws, migrate};

        let dir = std::env::temp_dir().join("rangmillion_import_test");
        std::fs::create_dir_all(&dir).unwrap();
        let csv_path = dir.join("tirages.csv");
        std::fs::write(
            &csv_path,
            "draw_id;date;b1;b2;b3;b4;b5;s1;s2\n\
             25044;03/06/2025;7;15;23;31;42;3;8\n\
             25045;06/06/2025;2;19;27;38;46;5;11\n\
             25045;06/06/2025;2;19;27;38;46;5;11\n",
        )
        .unwrap();

        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        let result = import_csv(&conn, &csv_path).unwrap();

        assert_eq!(result.total_records, 3);
        assert_eq!(result.inserted, 2);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors, 0);
        assert_eq!(count_draws(&conn).unwrap(), 2);

        std::fs::remove_file(&csv_path).ok();
    }
}
