// src/reconcile/mod.rs
//! Column name reconciler: rewrites one source's column names to canonical
//! form and resolves the duplicate keys canonicalization creates.
//!
//! The export tool emitted age-bracket columns in several spellings
//! (`"5YO Slpr."`, `"5YO Slpr"`) that all mean the `5YO` series. After
//! renaming, duplicates inside one table are resolved by an ordered
//! fill-forward merge: the first column to claim a canonical name is the
//! base and keeps its position; later claimants copy their values into the
//! base only where the base is null, then disappear from the schema.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Optional digits, literal `YO`, optional whitespace, literal `Slpr`,
/// optional trailing period. The canonical name is the `<digits>YO` prefix.
static SLEEPER_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d*YO)\s*Slpr\.?$").expect("sleeper column regex"));

/// Outcome of reconciling one table, minus the source id (the pipeline
/// attaches that when it folds these into the run report).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileLog {
    pub collisions: Vec<Collision>,
    pub unrecognized: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub base_column: String,
    pub dropped_column: String,
    pub filled_rows: usize,
    pub discarded_values: usize,
}

/// Canonical form of a single column name, or `None` if it matches no
/// grammar and passes through unchanged.
pub fn canonical_name(original: &str) -> Option<String> {
    SLEEPER_COLUMN
        .captures(original)
        .map(|caps| caps[1].to_string())
}

/// Reconcile one table's columns. `rows` are value vectors aligned with
/// `headers`; the returned rows are aligned with the returned headers, which
/// contain no duplicate canonical keys. Walk order is the original
/// left-to-right column order, so which column becomes the base is
/// reproducible across runs.
///
/// When both the base and a later duplicate hold non-null values for the
/// same row, the base wins and the later value is discarded. Kept as-is and
/// surfaced in the log; see `ReconcileLog::collisions`.
pub fn reconcile_columns(
    headers: &[String],
    mut rows: Vec<Vec<Option<String>>>,
) -> (Vec<String>, Vec<Vec<Option<String>>>, ReconcileLog) {
    let mut log = ReconcileLog::default();

    let canonical: Vec<String> = headers
        .iter()
        .map(|h| match canonical_name(h) {
            Some(c) => {
                if c != *h {
                    debug!(original = %h, canonical = %c, "standardizing column");
                }
                c
            }
            None => {
                log.unrecognized.push(h.clone());
                h.clone()
            }
        })
        .collect();

    // First column to claim each canonical name is its base and keeps its
    // position; later claimants fill-forward into it and are dropped.
    let mut kept: Vec<usize> = Vec::with_capacity(headers.len());
    for (idx, name) in canonical.iter().enumerate() {
        match kept.iter().copied().find(|&k| canonical[k] == *name) {
            None => kept.push(idx),
            Some(base_idx) => {
                let mut filled = 0usize;
                let mut discarded = 0usize;
                for row in rows.iter_mut() {
                    match (row[base_idx].is_some(), row[idx].is_some()) {
                        (false, true) => {
                            row[base_idx] = row[idx].take();
                            filled += 1;
                        }
                        (true, true) => discarded += 1,
                        _ => {}
                    }
                }
                log.collisions.push(Collision {
                    base_column: name.clone(),
                    dropped_column: headers[idx].clone(),
                    filled_rows: filled,
                    discarded_values: discarded,
                });
            }
        }
    }

    let out_headers: Vec<String> = kept.iter().map(|&i| canonical[i].clone()).collect();
    let out_rows: Vec<Vec<Option<String>>> = rows
        .into_iter()
        .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
        .collect();

    (out_headers, out_rows, log)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn hdrs(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn sleeper_columns_canonicalize() {
        assert_eq!(canonical_name("5YO Slpr."), Some("5YO".to_string()));
        assert_eq!(canonical_name("5YO Slpr"), Some("5YO".to_string()));
        assert_eq!(canonical_name("12YO  Slpr."), Some("12YO".to_string()));
        assert_eq!(canonical_name("YO Slpr"), Some("YO".to_string()));
        assert_eq!(canonical_name("5YO"), None);
        assert_eq!(canonical_name("Weanlings"), None);
        assert_eq!(canonical_name("5YO Slpr. extra"), None);
    }

    #[test]
    fn duplicate_columns_fill_forward_into_base() {
        let headers = hdrs(&["5YO Slpr.", "5YO Slpr"]);
        let rows = vec![
            vec![None, s("42")],     // base null, duplicate fills it
            vec![s("7"), s("9")],    // both set, base wins
            vec![s("3"), None],      // duplicate null, base untouched
        ];
        let (out_headers, out_rows, log) = reconcile_columns(&headers, rows);

        assert_eq!(out_headers, vec!["5YO"]);
        assert_eq!(out_rows, vec![vec![s("42")], vec![s("7")], vec![s("3")]]);

        assert_eq!(log.collisions.len(), 1);
        let c = &log.collisions[0];
        assert_eq!(c.base_column, "5YO");
        assert_eq!(c.dropped_column, "5YO Slpr");
        assert_eq!(c.filled_rows, 1);
        assert_eq!(c.discarded_values, 1);
    }

    #[test]
    fn unique_columns_rename_in_place() {
        let headers = hdrs(&["6YO Slpr.", "Weanlings"]);
        let rows = vec![vec![s("1"), s("2")]];
        let (out_headers, out_rows, log) = reconcile_columns(&headers, rows);
        assert_eq!(out_headers, vec!["6YO", "Weanlings"]);
        assert_eq!(out_rows, vec![vec![s("1"), s("2")]]);
        assert!(log.collisions.is_empty());
        assert_eq!(log.unrecognized, vec!["Weanlings"]);
    }

    #[test]
    fn base_retains_original_position() {
        let headers = hdrs(&["A", "5YO Slpr.", "B", "5YO Slpr"]);
        let rows = vec![vec![s("a"), None, s("b"), s("x")]];
        let (out_headers, out_rows, _) = reconcile_columns(&headers, rows);
        assert_eq!(out_headers, vec!["A", "5YO", "B"]);
        assert_eq!(out_rows, vec![vec![s("a"), s("x"), s("b")]]);
    }

    #[test]
    fn three_way_collision_resolves_left_to_right() {
        let headers = hdrs(&["5YO Slpr.", "5YO Slpr", "5YOSlpr"]);
        let rows = vec![
            vec![None, None, s("c")],
            vec![None, s("b"), s("c")],
        ];
        let (out_headers, out_rows, log) = reconcile_columns(&headers, rows);
        assert_eq!(out_headers, vec!["5YO"]);
        // Second column fills first where it can; the third only gets what
        // is still null afterwards.
        assert_eq!(out_rows, vec![vec![s("c")], vec![s("b")]]);
        assert_eq!(log.collisions.len(), 2);
        assert_eq!(log.collisions[0].dropped_column, "5YO Slpr");
        assert_eq!(log.collisions[1].dropped_column, "5YOSlpr");
        assert_eq!(log.collisions[1].discarded_values, 1);
    }

    #[test]
    fn reconcile_is_idempotent_on_canonical_tables() {
        let headers = hdrs(&["5YO", "6YO", "Notes"]);
        let rows = vec![vec![s("1"), None, s("n")], vec![None, s("2"), None]];
        let (h1, r1, log1) = reconcile_columns(&headers, rows.clone());
        assert_eq!(h1, headers);
        assert_eq!(r1, rows);
        assert!(log1.collisions.is_empty());

        let (h2, r2, _) = reconcile_columns(&h1, r1.clone());
        assert_eq!(h2, h1);
        assert_eq!(r2, r1);
    }
}
