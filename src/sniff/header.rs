const HEADER_KEYWORDS: [&str; 5] = ["datetime", "open", "high", "low", "close"];

/// True when the joined, lowercased fields mention every OHLC header keyword.
pub fn looks_like_header<S: AsRef<str>>(fields: &[S]) -> bool {
    let joined = fields
        .iter()
        .map(|f| f.as_ref().trim())
        .collect::<Vec<_>>()
        .join(",")
        .to_lowercase();
    HEADER_KEYWORDS.iter().all(|keyword| joined.contains(keyword))
}

/// One-shot header check: only the first line is ever examined.
#[derive(Debug, Default)]
pub struct HeaderGate {
    first_line_seen: bool,
    consumed: bool,
}

impl HeaderGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when this line is the header and must be discarded.
    pub fn consume<S: AsRef<str>>(&mut self, fields: &[S]) -> bool {
        if self.first_line_seen {
            return false;
        }
        self.first_line_seen = true;
        self.consumed = looks_like_header(fields);
        self.consumed
    }

    pub fn header_consumed(&self) -> bool {
        self.consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_header() {
        assert!(looks_like_header(&["datetime", "open", "high", "low", "close", "volume"]));
    }

    #[test]
    fn test_mixed_case_header_without_volume() {
        assert!(looks_like_header(&[" DateTime ", "Open", "High", "Low", "Close"]));
    }

    #[test]
    fn test_partial_header_is_data() {
        assert!(!looks_like_header(&["date", "open", "high", "low", "close"]));
        assert!(!looks_like_header(&["1993.04.12 00:00", "1.1", "1.2", "1.0", "1.15"]));
    }

    #[test]
    fn test_gate_fires_at_most_once() {
        let header = ["datetime", "open", "high", "low", "close", "volume"];
        let mut gate = HeaderGate::new();
        assert!(gate.consume(&header));
        assert!(!gate.consume(&header));
        assert!(gate.header_consumed());
    }

    #[test]
    fn test_gate_closed_after_data_line() {
        let mut gate = HeaderGate::new();
        assert!(!gate.consume(&["1993.04.12 00:00", "1.1", "1.2", "1.0", "1.15", "100"]));
        assert!(!gate.consume(&["datetime", "open", "high", "low", "close", "volume"]));
        assert!(!gate.header_consumed());
    }
}
