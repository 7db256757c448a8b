use anyhow::{Context, Result, bail};
use std::collections::HashSet;

const DEFAULT_SEED: u64 = 1337;
const MAX_RANGE_LEN: u64 = 10_000;

/// Resolve CLI seed tokens into concrete seeds.
///
/// Supports decimal integers (negative values use their magnitude), `0x`
/// hexadecimal and inclusive ranges written `start..end`. Duplicates keep
/// their first position.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<u64>> {
    let mut pending = Vec::new();
    for token in tokens.iter().map(|t| t.trim()) {
        if token.is_empty() {
            continue;
        }
        if let Some((start, end)) = token.split_once("..") {
            let start = parse_seed(start)?;
            let end = parse_seed(end.trim_start_matches('='))?;
            if start > end {
                bail!("Seed range {token} is inverted");
            }
            if end - start >= MAX_RANGE_LEN {
                bail!("Seed range {token} exceeds {MAX_RANGE_LEN} seeds");
            }
            pending.extend(start..=end);
            continue;
        }
        pending.push(parse_seed(token)?);
    }

    let mut seen = HashSet::new();
    pending.retain(|seed| seen.insert(*seed));
    if pending.is_empty() {
        pending.push(DEFAULT_SEED);
    }
    Ok(pending)
}

/// Seeds for every iteration: each base seed followed by its successors.
#[must_use]
pub fn expand_iterations(seeds: &[u64], iterations: usize) -> Vec<u64> {
    let per_seed = u64::try_from(iterations.max(1)).unwrap_or(u64::MAX);
    seeds
        .iter()
        .flat_map(|seed| (0..per_seed).map(move |offset| seed.wrapping_add(offset)))
        .collect()
}

fn parse_seed(token: &str) -> Result<u64> {
    let token = token.trim();
    if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        return u64::from_str_radix(&hex.replace('_', ""), 16)
            .with_context(|| format!("Unrecognized seed token: {token}"));
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    token
        .parse::<u64>()
        .with_context(|| format!("Unrecognized seed token: {token}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_numeric_hex_and_ranges() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7", "0xFF", "3..5", "4"])).unwrap();
        assert_eq!(seeds, vec![42, 7, 255, 3, 4, 5]);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        assert_eq!(resolve_seed_inputs(&tokens(&["", " "])).unwrap(), vec![1337]);
    }

    #[test]
    fn rejects_garbage_and_inverted_ranges() {
        assert!(resolve_seed_inputs(&tokens(&["CL-ORANGE42"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..2"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["0..99999"])).is_err());
    }

    #[test]
    fn iterations_walk_successive_seeds() {
        assert_eq!(expand_iterations(&[10, u64::MAX], 2), vec![10, 11, u64::MAX, 0]);
        assert_eq!(expand_iterations(&[5], 0), vec![5]);
    }
}
