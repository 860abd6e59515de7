use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::styles::rarity::assign_rarity;

fn people(n: usize) -> Vec<Arc<Participant>> {
    let ps: Vec<Participant> = (0..n)
        .map(|i| Participant::new(format!("p{i}"), format!("Person {i}")))
        .collect();
    share_participants(&ps)
}

fn always_rare(_: &mut dyn RngCore) -> Rarity {
    Rarity::Rare
}

fn item(id: &str) -> DisplayItem {
    DisplayItem::new(Arc::new(Participant::new(id, id)), Rarity::Common)
}

#[test]
fn sequence_has_requested_length_and_every_participant() {
    let ps = people(7);
    let mut rng = StdRng::seed_from_u64(1);
    let items = build_sequence(&ps, 30, &mut rng, assign_rarity);
    assert_eq!(items.len(), 30);
    for p in &ps {
        assert!(items.iter().any(|it| it.id() == p.id));
    }
}

#[test]
fn injected_rarity_fn_is_used() {
    let ps = people(3);
    let mut rng = StdRng::seed_from_u64(2);
    let items = padded_items(&ps, 8, &mut rng, always_rare);
    assert_eq!(items.len(), 8);
    assert!(items.iter().all(|it| it.rarity == Rarity::Rare));
    assert_eq!(items[3].id(), "p0");
}

#[test]
fn planted_winner_has_interior_occurrence_near_ideal() {
    let ps = people(50);
    let winner = Arc::clone(&ps[17]);
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut items = build_sequence(&ps, 40, &mut rng, assign_rarity);
        plant_winner(&mut items, &winner, 28, 2, &mut rng, assign_rarity);
        let idx = choose_winner_occurrence(&items, &winner.id, 28).unwrap();
        assert!((26..=30).contains(&idx), "seed {seed}: {idx}");
        let first = items.iter().position(|it| it.id() == winner.id).unwrap();
        let last = items.iter().rposition(|it| it.id() == winner.id).unwrap();
        assert!(first < idx && idx < last);
    }
}

#[test]
fn occurrence_choice_skips_edges_and_breaks_ties_low() {
    let items: Vec<DisplayItem> = ["w", "a", "w", "b", "c", "w", "d", "w"]
        .into_iter()
        .map(item)
        .collect();
    assert_eq!(choose_winner_occurrence(&items, "w", 0).unwrap(), 2);
    assert_eq!(choose_winner_occurrence(&items, "w", 7).unwrap(), 5);
    assert_eq!(choose_winner_occurrence(&items, "w", 3).unwrap(), 2);
    assert_eq!(choose_winner_occurrence(&items, "w", 4).unwrap(), 5);
}

#[test]
fn single_occurrence_is_accepted_and_absence_is_an_error() {
    let items: Vec<DisplayItem> = ["a", "w", "b"].into_iter().map(item).collect();
    assert_eq!(choose_winner_occurrence(&items, "w", 0).unwrap(), 1);
    let err = choose_winner_occurrence(&items, "zz", 1).unwrap_err();
    assert!(err.to_string().contains("winner not found among display items"));
}

#[test]
fn mark_winner_flags_one_item() {
    let mut items: Vec<DisplayItem> = ["a", "b", "c"].into_iter().map(item).collect();
    mark_winner(&mut items, 1);
    assert_eq!(
        items.iter().map(|it| it.is_winner).collect::<Vec<_>>(),
        vec![false, true, false]
    );
}
