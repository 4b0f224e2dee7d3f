//! Trip identifier variants.
//!
//! Real-time feeds and static datasets do not always agree on identifier
//! formatting: a feed may report trip `7` where the static tables carry `07`.
//! Lookups try a small, ordered set of variants and take the first that hits.

/// Candidate identifiers for `trip_id`, verbatim first.
///
/// The result is deterministic and free of duplicates. Purely numeric ids
/// gain a leading zero, or lose their leading zeros when they have any.
#[must_use]
pub fn variants_of(trip_id: &str) -> Vec<String> {
    let mut variants = vec![trip_id.to_string()];
    let trimmed = trip_id.trim();
    push_unique(&mut variants, trimmed.to_string());

    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let stripped = trimmed.trim_start_matches('0');
        if stripped.len() == trimmed.len() {
            push_unique(&mut variants, format!("0{trimmed}"));
        } else if stripped.is_empty() {
            push_unique(&mut variants, "0".to_string());
        } else {
            push_unique(&mut variants, stripped.to_string());
        }
    }

    variants
}

fn push_unique(variants: &mut Vec<String>, candidate: String) {
    if !candidate.is_empty() && !variants.contains(&candidate) {
        variants.push(candidate);
    }
}
