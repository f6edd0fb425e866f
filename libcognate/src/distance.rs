/// The edit distance between two sequences: the least number of insertions,
/// deletions and substitutions turning one into the other.
pub fn levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev_row: Vec<usize> = (0..=b.len()).collect();
    let mut row: Vec<usize> = vec![0; b.len() + 1];

    for (a_idx, a_item) in a.iter().enumerate() {
        row[0] = a_idx + 1;
        for (b_idx, b_item) in b.iter().enumerate() {
            let substitution = prev_row[b_idx] + usize::from(a_item != b_item);
            row[b_idx + 1] = substitution
                .min(prev_row[b_idx + 1] + 1)
                .min(row[b_idx] + 1);
        }
        std::mem::swap(&mut prev_row, &mut row);
    }
    prev_row[b.len()]
}

/// The edit distance divided by the length of the longer sequence. Two empty
/// sequences have distance 0.
pub fn normalized_levenshtein<T: PartialEq>(a: &[T], b: &[T]) -> f64 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 0.0;
    }
    levenshtein(a, b) as f64 / longest as f64
}
