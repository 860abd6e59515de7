use std::sync::Arc;

use rand::{Rng, RngCore, seq::SliceRandom};

use crate::{
    config::Participant,
    foundation::{
        core::{Affine, Point, Transform2D, Vec2},
        error::{RaffleError, RaffleResult},
    },
    styles::rarity::{Rarity, RarityFn},
};

/// Strategy-owned visual instance of one participant.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayItem {
    pub participant: Arc<Participant>,
    pub rarity: Rarity,
    pub pos: Point,
    pub vel: Vec2,
    pub rotation: f64,
    pub scale: Vec2,
    pub alpha: f64,
    pub is_winner: bool,
}

impl DisplayItem {
    pub fn new(participant: Arc<Participant>, rarity: Rarity) -> Self {
        Self {
            participant,
            rarity,
            pos: Point::ZERO,
            vel: Vec2::ZERO,
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
            alpha: 1.0,
            is_winner: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.participant.id
    }

    pub fn name(&self) -> &str {
        &self.participant.display_name
    }

    pub fn image_ref(&self) -> Option<&str> {
        self.participant.image_ref.as_deref()
    }

    /// Placement as an affine about `pos`.
    pub fn affine(&self) -> Affine {
        Transform2D {
            translate: self.pos.to_vec2(),
            rotation_rad: self.rotation,
            scale: self.scale,
        }
        .to_affine()
    }
}

/// Shared participant handles, so display items never clone participant data.
pub fn share_participants(participants: &[Participant]) -> Vec<Arc<Participant>> {
    participants.iter().cloned().map(Arc::new).collect()
}

/// `len` items made of repeated shuffled passes over `participants`, each with a fresh rarity.
pub fn build_sequence(
    participants: &[Arc<Participant>],
    len: usize,
    rng: &mut dyn RngCore,
    rarity: RarityFn,
) -> Vec<DisplayItem> {
    let mut out = Vec::with_capacity(len);
    if participants.is_empty() {
        return out;
    }
    let mut pass: Vec<&Arc<Participant>> = participants.iter().collect();
    while out.len() < len {
        pass.shuffle(rng);
        for p in &pass {
            if out.len() == len {
                break;
            }
            out.push(DisplayItem::new(Arc::clone(p), rarity(rng)));
        }
    }
    out
}

/// One item per participant in input order, padded by repetition up to `min_len`.
pub fn padded_items(
    participants: &[Arc<Participant>],
    min_len: usize,
    rng: &mut dyn RngCore,
    rarity: RarityFn,
) -> Vec<DisplayItem> {
    let len = participants.len().max(min_len);
    participants
        .iter()
        .cycle()
        .take(len)
        .map(|p| DisplayItem::new(Arc::clone(p), rarity(&mut *rng)))
        .collect()
}

/// Make sure `winner` occurs within `window` of `ideal` and at least once on each side of that
/// window, replacing random items where needed.
pub fn plant_winner(
    items: &mut [DisplayItem],
    winner: &Arc<Participant>,
    ideal: usize,
    window: usize,
    rng: &mut dyn RngCore,
    rarity: RarityFn,
) {
    let len = items.len();
    if len == 0 {
        return;
    }
    let ideal = ideal.min(len - 1);
    let lo = ideal.saturating_sub(window);
    let hi = (ideal + window).min(len - 1);
    let place = |items: &mut [DisplayItem], idx: usize, rng: &mut dyn RngCore| {
        items[idx] = DisplayItem::new(Arc::clone(winner), rarity(rng));
    };

    if !items[lo..=hi].iter().any(|it| it.id() == winner.id) {
        place(items, ideal, rng);
    }
    if lo > 0 && !items[..lo].iter().any(|it| it.id() == winner.id) {
        let idx = rng.gen_range(0..lo);
        place(items, idx, rng);
    }
    if hi + 1 < len && !items[hi + 1..].iter().any(|it| it.id() == winner.id) {
        let idx = rng.gen_range(hi + 1..len);
        place(items, idx, rng);
    }
}

/// Index of the winner occurrence closest to `ideal`.
///
/// With three or more occurrences the first and last ones are never chosen. Ties go to the
/// lower index.
pub fn choose_winner_occurrence(
    items: &[DisplayItem],
    winner_id: &str,
    ideal: usize,
) -> RaffleResult<usize> {
    let occurrences: Vec<usize> = items
        .iter()
        .enumerate()
        .filter(|(_, it)| it.id() == winner_id)
        .map(|(i, _)| i)
        .collect();
    if occurrences.is_empty() {
        return Err(RaffleError::config(format!(
            "winner not found among display items (winner '{winner_id}')"
        )));
    }
    let candidates = if occurrences.len() >= 3 {
        &occurrences[1..occurrences.len() - 1]
    } else {
        &occurrences[..]
    };
    candidates
        .iter()
        .copied()
        .min_by_key(|&i| (i.abs_diff(ideal), i))
        .ok_or_else(|| RaffleError::config("winner has no interior occurrence among display items"))
}

/// Flag exactly the item at `index` as the winner.
pub fn mark_winner(items: &mut [DisplayItem], index: usize) {
    for (i, it) in items.iter_mut().enumerate() {
        it.is_winner = i == index;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/styles/layout.rs"]
mod tests;
