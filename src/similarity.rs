//! Sequence similarity.
//!
//! [`ratio`] is the Ratcliff/Obershelp "gestalt" score: the longest common
//! block is found, the same search recurses on both sides of it, and the
//! total matched length `M` gives `2·M / T` where `T` is the combined length
//! of the two strings.

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
///
/// Among equally long blocks the one starting earliest in `a` wins, then
/// the one starting earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; bhi - blo + 1];

    for i in alo..ahi {
        let mut current = vec![0usize; bhi - blo + 1];
        for j in blo..bhi {
            if a[i] == b[j] {
                let k = prev[j - blo] + 1;
                current[j - blo + 1] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        prev = current;
    }

    best
}

fn matched_len(a: &[char], b: &[char], alo: usize, ahi: usize, blo: usize, bhi: usize) -> usize {
    if alo >= ahi || blo >= bhi {
        return 0;
    }

    let (i, j, k) = longest_match(a, b, (alo, ahi), (blo, bhi));
    if k == 0 {
        return 0;
    }

    k + matched_len(a, b, alo, i, blo, j) + matched_len(a, b, i + k, ahi, j + k, bhi)
}

/// Similarity of two strings in `[0, 1]`; two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matched_len(&a, &b, 0, a.len(), 0, b.len());
    2.0 * matched as f64 / total as f64
}

/// Case-insensitive [`ratio`].
pub fn ratio_ignore_case(a: &str, b: &str) -> f64 {
    ratio(&a.to_lowercase(), &b.to_lowercase())
}

/// Picks the candidate whose name is most similar to `query`.
///
/// Comparison is case-insensitive. The global maximum is accepted when it
/// reaches `threshold`; on equal scores the first candidate wins.
pub fn best_match<'a, T, I>(query: &str, candidates: I, threshold: f64) -> Option<(&'a T, f64)>
where
    I: IntoIterator<Item = (&'a str, &'a T)>,
{
    let mut best: Option<(&'a T, f64)> = None;
    for (name, item) in candidates {
        let score = ratio_ignore_case(query, name);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((item, score)),
        }
    }

    best.filter(|&(_, score)| score >= threshold)
}
