//
//  asc-cli
//  cli/suggest.rs
//
//  Created by Ngonidzashe Mangudya on 2026/10/17.
//  Copyright (c) 2026 IAMNGONI. All rights reserved.
//

//! "Did you mean" suggestions for mistyped subcommands.

/// Shorter inputs prefix too many commands to mean anything.
const MIN_PREFIX_LEN: usize = 3;

/// Best candidate for `input`, or `None` when nothing is close enough.
///
/// A candidate that starts with the input (or that the input starts with)
/// wins outright, once at least [`MIN_PREFIX_LEN`] characters were typed. Otherwise the smallest edit distance wins if it is within
/// the threshold for the candidate's length.
pub fn suggest<'a, I>(input: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let input = input.trim().to_ascii_lowercase();
    if input.is_empty() {
        return None;
    }
    let candidates: Vec<&str> = candidates.into_iter().collect();

    if input.chars().count() >= MIN_PREFIX_LEN {
        let prefixed = candidates
            .iter()
            .filter(|c| c.starts_with(&input) || (input.starts_with(**c) && input.len() - c.len() <= 2))
            .min_by_key(|c| c.len().abs_diff(input.len()));
        if let Some(found) = prefixed {
            return Some(found);
        }
    }

    candidates
        .iter()
        .map(|c| (levenshtein(&input, c), *c))
        .filter(|(distance, c)| *distance <= threshold(c))
        .min_by_key(|(distance, c)| (*distance, c.len()))
        .map(|(_, c)| c)
}

/// Allowed edit distance for a candidate of this length.
fn threshold(candidate: &str) -> usize {
    match candidate.chars().count() {
        0..=4 => 1,
        5..=8 => 2,
        _ => 3,
    }
}

pub fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}
