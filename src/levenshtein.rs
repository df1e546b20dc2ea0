//! Levenshtein edit distance and nearest-candidate lookup.

/// Edit distance between two strings.
///
/// Both inputs are lowercased and stripped of spaces before comparison.
/// Insertions, deletions and substitutions each cost one.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let mut short = normalize(a);
    let mut long = normalize(b);
    if short.len() > long.len() {
        std::mem::swap(&mut short, &mut long);
    }

    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = Vec::with_capacity(short.len() + 1);

    for (j, long_ch) in long.iter().enumerate() {
        current.clear();
        current.push(j + 1);
        for (i, short_ch) in short.iter().enumerate() {
            let cost = if short_ch == long_ch {
                previous[i]
            } else {
                1 + previous[i].min(previous[i + 1]).min(current[i])
            };
            current.push(cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[short.len()]
}

fn normalize(s: &str) -> Vec<char> {
    s.chars()
        .filter(|ch| *ch != ' ')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Candidate closest to `query` by [`edit_distance`].
///
/// Among candidates at the same minimal distance the lexicographically
/// smallest wins, so the result does not depend on iteration order.
/// Returns an empty string when there are no candidates.
pub fn closest_match<I, S>(query: &str, candidates: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut best: Option<(usize, S)> = None;

    for candidate in candidates {
        let distance = edit_distance(query, candidate.as_ref());
        let better = match &best {
            None => true,
            Some((best_distance, best_candidate)) => {
                distance < *best_distance
                    || (distance == *best_distance && candidate.as_ref() < best_candidate.as_ref())
            }
        };
        if better {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, candidate)| candidate.as_ref().to_string())
        .unwrap_or_default()
}
