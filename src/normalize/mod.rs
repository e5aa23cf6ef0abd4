// src/normalize/mod.rs
//! Date token normalizer: turns one source's raw date strings into
//! `(year, month)` values, carrying inferred-year state across rows.
//!
//! Tokens look like `"Jan-16"` (month + two-digit year suffix) or a bare
//! `"Feb"` that inherits the most recently resolved year. A bare `"Dec"`
//! advances the carried year for the tokens after it. Parenthetical
//! annotations such as `"Dec (est.)"` are stripped before matching.

use crate::error::DateParseError;
use crate::table::YearMonth;

/// Year assumed for a bare month token seen before any explicit year suffix.
/// Tied to the historical dataset this tool was built for; override via
/// `PipelineConfig::fallback_year`.
pub const DEFAULT_FALLBACK_YEAR: i32 = 2016;

/// Separates the month abbreviation from the year suffix in tokens like
/// `"Jan-16"`.
const YEAR_SEPARATOR: char = '-';

const MONTH_ABBREVS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Per-source carried state: the year most recently resolved from an
/// explicit suffix (or the fallback). One `ParseState` per source; it never
/// crosses a source boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseState {
    pub current_year: Option<i32>,
}

/// Normalize one source's ordered date tokens. Pure: identical inputs and
/// fallback year always yield identical results and final state. A failed
/// token yields `Err` in its slot and processing continues.
pub fn normalize_dates(
    tokens: &[String],
    fallback_year: i32,
) -> (Vec<Result<YearMonth, DateParseError>>, ParseState) {
    let mut state = ParseState::default();
    let results = tokens
        .iter()
        .map(|t| advance(&mut state, t, fallback_year))
        .collect();
    (results, state)
}

/// One fold step: resolve a single token against the carried state,
/// updating the state as a side effect.
pub fn advance(
    state: &mut ParseState,
    token: &str,
    fallback_year: i32,
) -> Result<YearMonth, DateParseError> {
    let mut cleaned = token.trim();

    // Drop annotations like "(est.)".
    if let Some(idx) = cleaned.find('(') {
        cleaned = cleaned[..idx].trim();
    }

    if let Some((month_part, year_suffix)) = cleaned.split_once(YEAR_SEPARATOR) {
        let digits: String = year_suffix.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(DateParseError::EmptyYearSuffix {
                token: token.to_string(),
            });
        }
        let year = if digits.len() == 2 {
            format!("20{digits}").parse::<i32>()
        } else {
            digits.parse::<i32>()
        }
        .map_err(|_| DateParseError::BadYearSuffix {
            token: token.to_string(),
            suffix: digits.clone(),
        })?;

        // The resolved year carries forward even when the month part below
        // turns out to be garbage.
        state.current_year = Some(year);

        let month = resolve_month(token, month_part)?;
        Ok(YearMonth::new(year, month))
    } else {
        let year = *state.current_year.get_or_insert(fallback_year);
        let month = resolve_month(token, cleaned)?;

        // A bare December means the next rows belong to the following year;
        // this row itself keeps the pre-increment year.
        if cleaned.eq_ignore_ascii_case("dec") {
            state.current_year = Some(year + 1);
        }
        Ok(YearMonth::new(year, month))
    }
}

fn resolve_month(token: &str, month_part: &str) -> Result<u32, DateParseError> {
    let wanted = month_part.trim();
    MONTH_ABBREVS
        .iter()
        .position(|abbrev| wanted.eq_ignore_ascii_case(abbrev))
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| DateParseError::UnknownMonth {
            token: token.to_string(),
            month: month_part.to_string(),
        })
}
