use crate::models::Delimiter;

/// Pick the field separator from the first `sample_size` lines.
///
/// The candidate with the highest total count wins. Ties go to the earlier
/// entry in [`Delimiter::PREFERENCE`]; no candidate at all means comma.
pub fn detect_delimiter<S: AsRef<str>>(lines: &[S], sample_size: usize) -> Delimiter {
    let mut counts = [0usize; 3];
    for line in lines.iter().take(sample_size) {
        for ch in line.as_ref().chars() {
            match ch {
                ',' => counts[0] += 1,
                ';' => counts[1] += 1,
                '\t' => counts[2] += 1,
                _ => {}
            }
        }
    }

    let mut best = Delimiter::Comma;
    let mut best_count = 0;
    for (delimiter, &count) in Delimiter::PREFERENCE.iter().zip(counts.iter()) {
        // Strictly greater keeps the earlier candidate on ties.
        if count > best_count {
            best = *delimiter;
            best_count = count;
        }
    }
    best
}
