use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use crate::models::Draw;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS draws (
    draw_id  TEXT PRIMARY KEY,
    date     TEXT NOT NULL,
    ball_1   INTEGER NOT NULL,
    ball_2   INTEGER NOT NULL,
    ball_3   INTEGER NOT NULL,
    ball_4   INTEGER NOT NULL,
    ball_5   INTEGER NOT NULL,
    star_1   INTEGER NOT NULL,
    star_2   INTEGER NOT NULL
);
";

/// Historique de démarrage : tirages récents embarqués pour que les
/// prédicteurs aient des données dès la première exécution.
/// (draw_id, date, boules, étoiles)
const STARTER_DRAWS: &[(&str, &str, [u8; 5], [u8; 2])] = &[
    ("25044", "2025-06-03", [7, 15, 23, 31, 42], [3, 8]),
    ("25045", "2025-06-06", [2, 19, 27, 38, 46], [5, 11]),
    ("25046", "2025-06-10", [4, 13, 21, 35, 50], [2, 9]),
    ("25047", "2025-06-13", [9, 17, 26, 33, 44], [1, 7]),
    ("25048", "2025-06-17", [5, 11, 29, 40, 48], [4, 10]),
    ("25049", "2025-06-20", [3, 16, 24, 37, 45], [6, 12]),
    ("25050", "2025-06-24", [8, 14, 22, 30, 41], [2, 5]),
    ("25051", "2025-06-27", [1, 20, 28, 36, 49], [3, 9]),
    ("25052", "2025-07-01", [6, 12, 25, 34, 47], [1, 8]),
    ("25053", "2025-07-04", [10, 18, 23, 39, 43], [7, 11]),
    ("25054", "2025-07-08", [2, 15, 26, 32, 50], [4, 6]),
    ("25055", "2025-07-11", [5, 19, 21, 35, 44], [2, 10]),
];

pub fn db_path() -> std::path::PathBuf {
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("rangmillion.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Impossible de créer le répertoire {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Impossible d'ouvrir la base {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
        .context("Échec de la migration")?;
    Ok(())
}

pub fn insert_draw(conn: &Connection, draw: &Draw) -> Result<bool> {
    let changed = conn.execute(
        "INSERT OR IGNORE INTO draws (draw_id, date, ball_1, ball_2, ball_3, ball_4, ball_5, star_1, star_2)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        rusqlite::params![
            draw.draw_id,
            draw.date,
            draw.balls[0],
            draw.balls[1],
            draw.balls[2],
            draw.balls[3],
            draw.balls[4],
            draw.stars[0],
            draw.stars[1],
        ],
    ).context("Échec de l'insertion")?;
    Ok(changed > 0)
}

pub fn fetch_last_draws(conn: &Connection, limit: u32) -> Result<Vec<Draw>> {
    let mut stmt = conn.prepare(
        "SELECT draw_id, date, ball_1, ball_2, ball_3, ball_4, ball_5, star_1, star_2
         FROM draws ORDER BY date DESC, draw_id DESC LIMIT ?1"
    )?;
    let draws = stmt.query_map([limit], |row| {
        Ok(Draw {
            draw_id: row.get(0)?,
            date: row.get(1)?,
            balls: [
                row.get::<_, u8>(2)?,
                row.get::<_, u8>(3)?,
                row.get::<_, u8>(4)?,
                row.get::<_, u8>(5)?,
                row.get::<_, u8>(6)?,
            ],
            stars: [
                row.get::<_, u8>(7)?,
                row.get::<_, u8>(8)?,
            ],
        })
    })?.collect::<Result<Vec<_>, _>>()?;
    Ok(draws)
}

pub fn count_draws(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM draws", [], |row| row.get(0))?;
    Ok(count)
}

/// Insère l'historique de démarrage si la base est vide. Idempotent :
/// rappeler cette fonction sur une base déjà peuplée ne fait rien.
/// Retourne le nombre de tirages insérés.
pub fn seed_if_empty(conn: &Connection) -> Result<u32> {
    if count_draws(conn)? > 0 {
        return Ok(0);
    }

    let tx = conn.unchecked_transaction()
        .context("Impossible de démarrer la transaction")?;
    let mut inserted = 0u32;
    for &(draw_id, date, balls, stars) in STARTER_DRAWS {
        let draw = Draw {
            draw_id: draw_id.to_string(),
            date: date.to_string(),
            balls,
            stars,
        };
        if insert_draw(&tx, &draw)? {
            inserted += 1;
        }
    }
    tx.commit().context("Échec du commit")?;
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validate_draw;

    fn test_draw(id: &str, date: &str) -> Draw {
        Draw {
            draw_id: id.to_string(),
            date: date.to_string(),
            balls: [1, 2, 3, 4, 5],
            stars: [1, 2],
        }
    }

    #[test]
    fn test_insert_and_count() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 0);

        insert_draw(&conn, &test_draw("001", "2025-01-01")).unwrap();
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let inserted = insert_draw(&conn, &test_draw("001", "2025-01-01")).unwrap();
        assert!(inserted);
        let inserted = insert_draw(&conn, &test_draw("001", "2025-01-01")).unwrap();
        assert!(!inserted);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_fetch_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw("001", "2025-01-01")).unwrap();
        insert_draw(&conn, &test_draw("002", "2025-01-05")).unwrap();
        insert_draw(&conn, &test_draw("003", "2025-01-03")).unwrap();

        let draws = fetch_last_draws(&conn, 10).unwrap();
        assert_eq!(draws.len(), 3);
        assert_eq!(draws[0].date, "2025-01-05");
        assert_eq!(draws[1].date, "2025-01-03");
        assert_eq!(draws[2].date, "2025-01-01");
    }

    #[test]
    fn test_seed_if_empty() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        let inserted = seed_if_empty(&conn).unwrap();
        assert_eq!(inserted as usize, STARTER_DRAWS.len());
        assert_eq!(count_draws(&conn).unwrap() as usize, STARTER_DRAWS.len());

        // Idempotent : un second appel n'insère rien
        let again = seed_if_empty(&conn).unwrap();
        assert_eq!(again, 0);
        assert_eq!(count_draws(&conn).unwrap() as usize, STARTER_DRAWS.len());
    }

    #[test]
    fn test_seed_after_manual_insert_does_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        insert_draw(&conn, &test_draw("001", "2025-01-01")).unwrap();
        let inserted = seed_if_empty(&conn).unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(count_draws(&conn).unwrap(), 1);
    }

    #[test]
    fn test_starter_draws_valid() {
        for &(_, date, balls, stars) in STARTER_DRAWS {
            assert!(validate_draw(&balls, &stars).is_ok(), "tirage invalide : {:?}", balls);
            assert!(chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok(),
                "date invalide : {date}");
        }
    }
}
