//! Scent note selection for product highlights.

use std::collections::HashSet;

use forvrmurr_core::{NoteCategory, NoteId, ScentNote, ScentNotes};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

/// Pick up to `limit` notes spread across the pyramid.
///
/// With `k` nonempty categories, up to `limit / k` notes are sampled from
/// each (top, middle, base), then the rest is filled from notes not yet
/// chosen. Notes sharing an ID are only picked once. Within each step the
/// source order is kept, and the same `seed` always gives the same result.
#[must_use]
pub fn select_notes(notes: &ScentNotes, limit: usize, seed: u64) -> Vec<ScentNote> {
    let categories = notes.nonempty_categories();
    if limit == 0 || categories == 0 {
        return Vec::new();
    }

    let per_category = limit / categories;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut taken: HashSet<&NoteId> = HashSet::new();
    let mut chosen = Vec::with_capacity(limit);

    for category in NoteCategory::ALL {
        let pool = notes.category(category);
        let amount = per_category.min(pool.len());
        for note in sample_in_order(&mut rng, pool.iter().collect(), amount) {
            if taken.insert(&note.id) {
                chosen.push(note.clone());
            }
        }
    }

    let remaining = limit.saturating_sub(chosen.len());
    if remaining > 0 {
        let mut seen = taken.clone();
        let rest: Vec<&ScentNote> = NoteCategory::ALL
            .iter()
            .flat_map(|c| notes.category(*c))
            .filter(|note| seen.insert(&note.id))
            .collect();
        let amount = remaining.min(rest.len());
        for note in sample_in_order(&mut rng, rest, amount) {
            taken.insert(&note.id);
            chosen.push(note.clone());
        }
    }

    chosen
}

/// Sample `amount` entries without replacement, returned in source order.
fn sample_in_order<'a>(
    rng: &mut StdRng,
    pool: Vec<&'a ScentNote>,
    amount: usize,
) -> Vec<&'a ScentNote> {
    if amount == 0 {
        return Vec::new();
    }

    let mut picked = index::sample(rng, pool.len(), amount).into_vec();
    picked.sort_unstable();
    picked
        .into_iter()
        .filter_map(|i| pool.get(i).copied())
        .collect()
}
