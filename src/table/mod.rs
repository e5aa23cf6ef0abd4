// src/table/mod.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A calendar (year, month) value, the resolution every source reports at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        YearMonth { year, month }
    }

    /// First day of the month, for callers that need a real calendar date.
    /// `None` only if the month is out of range, which the normalizer never
    /// produces.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// A row's date after normalization: either a resolved month or the invalid
/// sentinel. `Invalid` orders after every valid month so sentinel rows
/// collect at the tail of the merged output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateValue {
    Month(YearMonth),
    Invalid,
}

impl DateValue {
    pub fn valid(&self) -> Option<YearMonth> {
        match self {
            DateValue::Month(ym) => Some(*ym),
            DateValue::Invalid => None,
        }
    }

    /// Sort key: valid months ascending, sentinel last.
    pub fn sort_key(&self) -> (bool, i32, u32) {
        match self {
            DateValue::Month(ym) => (false, ym.year, ym.month),
            DateValue::Invalid => (true, 0, 0),
        }
    }
}

/// One record from one source: the raw date string plus values aligned
/// positionally with the owning table's header list. `None` is a null cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub date_raw: String,
    pub values: Vec<Option<String>>,
}

/// One source file's table, as handed over by the reading collaborator.
/// `headers` excludes the date column; header order is significant and is
/// preserved through canonicalization.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// A row after date normalization and column reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRow {
    pub date: DateValue,
    pub values: Vec<Option<String>>,
}

/// One source's table after both per-source stages: canonical headers with
/// no duplicate keys, rows aligned with them.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<NormalizedRow>,
}

/// A merged row: date, provenance, and values aligned with the merged
/// table's union schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRow {
    pub date: DateValue,
    pub source: String,
    pub values: Vec<Option<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    pub rows: usize,
    pub min_date: Option<YearMonth>,
    pub max_date: Option<YearMonth>,
}

/// The final table: union schema (date column excluded from `headers`,
/// rendered first by the writing collaborator), rows sorted ascending by
/// date with sentinel rows at the tail.
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub headers: Vec<String>,
    pub rows: Vec<MergedRow>,
    pub stats: MergeStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn year_month_orders_chronologically() {
        let a = YearMonth::new(2016, 12);
        let b = YearMonth::new(2017, 1);
        assert!(a < b);
        assert_eq!(a.to_string(), "2016-12");
    }

    #[test]
    fn invalid_sorts_after_any_month() {
        let far_future = DateValue::Month(YearMonth::new(9999, 12));
        assert!(DateValue::Invalid.sort_key() > far_future.sort_key());
    }

    #[test]
    fn first_day_is_a_real_date() {
        let d = YearMonth::new(2016, 2).first_day().unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2016, 2, 1).unwrap());
    }
}
