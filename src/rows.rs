// src/rows.rs
use crate::config::DateValidation;
use crate::models::{CandidateRow, Delimiter, RowStats, ValidatedRow};
use crate::sniff::HeaderGate;
use log::debug;

/// Rewrite MT5 dotted dates to `YYYY-MM-DD HH:MM`.
///
/// `YYYY.MM.DD HH:MM[...]` keeps only the minutes precision, a bare
/// `YYYY.MM.DD` gets midnight. Anything else comes back unchanged.
pub fn normalize_date(raw: &str) -> String {
    let s = raw.trim();
    let b = s.as_bytes();

    if b.len() >= 16 && b[4] == b'.' && b[7] == b'.' && b[10] == b' ' && s.is_char_boundary(16) {
        return format!("{}-{}-{} {}", &s[0..4], &s[5..7], &s[8..10], &s[11..16]);
    }
    if b.len() == 10 && b[4] == b'.' && b[7] == b'.' && s.is_ascii() {
        return format!("{}-{}-{} 00:00", &s[0..4], &s[5..7], &s[8..10]);
    }
    s.to_string()
}

pub fn is_canonical_datetime(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 16 && b[4] == b'-' && b[7] == b'-' && b[10] == b' '
}

/// Numeric text with surrounding whitespace trimmed and thousands separators removed.
fn strip_number(s: &str) -> String {
    s.trim().replace(',', "")
}

pub fn is_numeric(s: &str) -> bool {
    let cleaned = strip_number(s);
    !cleaned.is_empty() && cleaned.parse::<f64>().is_ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowVerdict {
    Accepted(ValidatedRow),
    /// Kept despite a non-canonical datetime; counts as invalid.
    Tolerated(ValidatedRow),
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NonNumericPrice,
    BadDatetime,
}

#[derive(Debug, Default)]
pub struct NormalizedBatch {
    pub rows: Vec<ValidatedRow>,
    pub stats: RowStats,
    pub header_consumed: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RowNormalizer {
    date_validation: DateValidation,
}

impl RowNormalizer {
    pub fn new(date_validation: DateValidation) -> Self {
        Self { date_validation }
    }

    /// Validate one six-field row.
    pub fn validate(&self, candidate: &CandidateRow) -> RowVerdict {
        if !candidate.ohlc().iter().all(|f| is_numeric(f)) {
            return RowVerdict::Rejected(RejectReason::NonNumericPrice);
        }

        let datetime = normalize_date(candidate.datetime());
        let date_ok = is_canonical_datetime(&datetime);
        if !date_ok && self.date_validation == DateValidation::Strict {
            return RowVerdict::Rejected(RejectReason::BadDatetime);
        }

        let volume = if is_numeric(candidate.volume()) {
            strip_number(candidate.volume())
        } else {
            "0".to_string()
        };

        let row = ValidatedRow {
            datetime,
            open: strip_number(&candidate.fields[1]),
            high: strip_number(&candidate.fields[2]),
            low: strip_number(&candidate.fields[3]),
            close: strip_number(&candidate.fields[4]),
            volume,
        };

        if date_ok {
            RowVerdict::Accepted(row)
        } else {
            RowVerdict::Tolerated(row)
        }
    }

    /// Run every line through the header gate and the row validator.
    pub fn normalize<S: AsRef<str>>(&self, lines: &[S], delimiter: Delimiter) -> NormalizedBatch {
        let mut batch = NormalizedBatch::default();
        let mut gate = HeaderGate::new();
        let sep = delimiter.as_char();

        for (idx, line) in lines.iter().enumerate() {
            let parts: Vec<&str> = line.as_ref().trim().split(sep).collect();
            if gate.consume(&parts) {
                debug!("Line {}: header discarded", idx + 1);
                continue;
            }

            batch.stats.total += 1;
            let candidate = CandidateRow::from_fields(parts);
            match self.validate(&candidate) {
                RowVerdict::Accepted(row) => batch.rows.push(row),
                RowVerdict::Tolerated(row) => {
                    debug!("Line {}: kept non-canonical datetime {:?}", idx + 1, row.datetime);
                    batch.stats.invalid += 1;
                    batch.rows.push(row);
                }
                RowVerdict::Rejected(reason) => {
                    debug!("Line {}: dropped ({:?})", idx + 1, reason);
                    batch.stats.invalid += 1;
                }
            }
        }

        batch.header_consumed = gate.header_consumed();
        batch
    }
}

impl Default for RowNormalizer {
    fn default() -> Self {
        Self::new(DateValidation::Strict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[&str]) -> CandidateRow {
        CandidateRow::from_fields(fields.iter().copied())
    }

    #[test]
    fn test_normalize_date_variants() {
        assert_eq!(normalize_date("1993.04.12 00:00"), "1993-04-12 00:00");
        assert_eq!(normalize_date("1993.04.12"), "1993-04-12 00:00");
        assert_eq!(normalize_date("2020.01.31 23:45:10"), "2020-01-31 23:45");
        assert_eq!(normalize_date(" 2020-01-31 23:45 "), "2020-01-31 23:45");
        assert_eq!(normalize_date("12/04/1993"), "12/04/1993");
    }

    #[test]
    fn test_canonical_datetime_check() {
        assert!(is_canonical_datetime("1993-04-12 00:00"));
        assert!(!is_canonical_datetime("1993-04-12"));
        assert!(!is_canonical_datetime("bad-date"));
        assert!(!is_canonical_datetime("1993.04.12 00:00"));
    }

    #[test]
    fn test_numeric_check() {
        assert!(is_numeric("1.15"));
        assert!(is_numeric(" 1,234.50 "));
        assert!(is_numeric("-0.5"));
        assert!(is_numeric("1e3"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("abc"));
        assert!(!is_numeric("1.2.3"));
        assert!(!is_numeric("1 234.5"));
    }

    #[test]
    fn test_validate_accepts_and_rewrites_date() {
        let normalizer = RowNormalizer::default();
        let verdict = normalizer.validate(&row(&["1993.04.12 00:00", "1.1", "1.2", "1.0", "1.15", "100"]));
        match verdict {
            RowVerdict::Accepted(r) => {
                assert_eq!(r.to_record(), ["1993-04-12 00:00", "1.1", "1.2", "1.0", "1.15", "100"]);
            }
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_empty_volume_defaults_to_zero() {
        let normalizer = RowNormalizer::default();
        let verdict = normalizer.validate(&row(&["1993.04.12 00:00", "1.1", "1.2", "1.0", "1.15", ""]));
        match verdict {
            RowVerdict::Accepted(r) => assert_eq!(r.volume, "0"),
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_price_rejected() {
        let normalizer = RowNormalizer::default();
        let verdict = normalizer.validate(&row(&["1993.04.12 00:00", "1.1", "n/a", "1.0", "1.15", "100"]));
        assert_eq!(verdict, RowVerdict::Rejected(RejectReason::NonNumericPrice));
    }

    #[test]
    fn test_bad_date_strict_vs_lenient() {
        let candidate = row(&["bad-date", "1.1", "1.2", "1.0", "1.15", "100"]);

        let strict = RowNormalizer::new(DateValidation::Strict);
        assert_eq!(strict.validate(&candidate), RowVerdict::Rejected(RejectReason::BadDatetime));

        let lenient = RowNormalizer::new(DateValidation::Lenient);
        match lenient.validate(&candidate) {
            RowVerdict::Tolerated(r) => assert_eq!(r.datetime, "bad-date"),
            other => panic!("unexpected verdict {:?}", other),
        }
    }

    #[test]
    fn test_normalize_counts_and_skips_header() {
        let lines = vec![
            "datetime,open,high,low,close,volume",
            "1993.04.12 00:00,1.1,1.2,1.0,1.15,100",
            "bad-date,1.1,1.2,1.0,1.15,100",
            ",,,,,",
            "1993.04.13,1.2,1.3,1.1,1.25,abc",
        ];
        let batch = RowNormalizer::default().normalize(&lines, Delimiter::Comma);

        assert!(batch.header_consumed);
        assert_eq!(batch.stats, RowStats { total: 4, invalid: 2 });
        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.rows[1].datetime, "1993-04-13 00:00");
        assert_eq!(batch.rows[1].volume, "0");
    }

    #[test]
    fn test_second_header_line_is_data() {
        let lines = vec![
            "1993.04.12 00:00,1.1,1.2,1.0,1.15,100",
            "datetime,open,high,low,close,volume",
        ];
        let batch = RowNormalizer::default().normalize(&lines, Delimiter::Comma);

        assert!(!batch.header_consumed);
        assert_eq!(batch.stats, RowStats { total: 2, invalid: 1 });
    }

    #[test]
    fn test_semicolon_and_comma_parse_identically() {
        let comma = vec!["1993.04.12 00:00,1.1,1.2,1.0,1.15,100", "1993.04.13,1.2,1.3,1.1,1.25,7"];
        let semi = vec!["1993.04.12 00:00;1.1;1.2;1.0;1.15;100", "1993.04.13;1.2;1.3;1.1;1.25;7"];

        let normalizer = RowNormalizer::default();
        let a = normalizer.normalize(&comma, Delimiter::Comma);
        let b = normalizer.normalize(&semi, Delimiter::Semicolon);
        assert_eq!(a.rows, b.rows);
        assert_eq!(a.stats, b.stats);
    }

    #[test]
    fn test_thousands_separators_removed_from_output() {
        let lines = vec!["2001.01.02 00:00;1,234.5;1,240.0;1,230.1;1,238.2;5,000"];
        let batch = RowNormalizer::default().normalize(&lines, Delimiter::Semicolon);
        assert_eq!(batch.rows[0].open, "1234.5");
        assert_eq!(batch.rows[0].volume, "5000");
    }

    #[test]
    fn test_inner_whitespace_is_not_a_separator() {
        let lines = vec!["2001.01.02 00:00,1.1,1.2,1.0,1.15,1 000"];
        let batch = RowNormalizer::default().normalize(&lines, Delimiter::Comma);
        assert_eq!(batch.stats.invalid, 0);
        assert_eq!(batch.rows[0].volume, "0");

        let lines = vec!["2001.01.02 00:00,1 .1,1.2,1.0,1.15,10"];
        let batch = RowNormalizer::default().normalize(&lines, Delimiter::Comma);
        assert_eq!(batch.stats.invalid, 1);
        assert!(batch.rows.is_empty());
    }
}
