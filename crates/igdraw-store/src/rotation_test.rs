use igdraw_core::{PostReference, PostType};

use super::*;

fn winner(name: &str) -> Winner {
    Winner {
        username: name.to_owned(),
        profile_url: format!("https://www.instagram.com/{name}/"),
        comment: format!("{name} wants it"),
    }
}

fn campaign(shortcode: &str, names: &[&str]) -> Campaign {
    Campaign::from_post(
        PostReference::new(PostType::Photo, shortcode),
        names.iter().map(|n| winner(n)).collect(),
        Vec::new(),
        0,
    )
}

fn picks(engine: &mut RotationEngine, campaign: &Campaign, count: usize) -> Vec<usize> {
    (0..count)
        .map(|_| engine.pick_winner(campaign).expect("winner").order)
        .collect()
}

fn sorted(mut values: Vec<usize>) -> Vec<usize> {
    values.sort_unstable();
    values
}

// -----------------------------------------------------------------------
// Fingerprint and shuffle
// -----------------------------------------------------------------------

#[test]
fn fingerprint_ignores_order() {
    let a = [winner("anna"), winner("bob")];
    let b = [winner("bob"), winner("anna")];
    assert_eq!(fingerprint(&a), fingerprint(&b));
    assert_eq!(
        fingerprint(&a),
        "anna-https://www.instagram.com/anna/|bob-https://www.instagram.com/bob/"
    );
}

#[test]
fn fingerprint_changes_with_membership() {
    let a = [winner("anna"), winner("bob")];
    let b = [winner("anna"), winner("carl")];
    assert_ne!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn shuffle_produces_permutation() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut order: Vec<usize> = (0..50).collect();
    shuffle(&mut order, &mut rng);
    assert_eq!(sorted(order), (0..50).collect::<Vec<_>>());
}

// -----------------------------------------------------------------------
// pick_winner
// -----------------------------------------------------------------------

#[test]
fn n_picks_form_a_permutation() {
    let mut engine = RotationEngine::seeded(1);
    let c = campaign("ABC", &["a", "b", "c", "d", "e"]);
    let orders = picks(&mut engine, &c, 5);
    assert_eq!(sorted(orders), vec![1, 2, 3, 4, 5]);
}

#[test]
fn k_cycles_pick_each_winner_k_times() {
    let mut engine = RotationEngine::seeded(2);
    let c = campaign("ABC", &["a", "b", "c", "d"]);
    let orders = picks(&mut engine, &c, 4 * 3);

    let mut counts = [0usize; 4];
    for order in &orders {
        counts[order - 1] += 1;
    }
    assert_eq!(counts, [3, 3, 3, 3]);

    for cycle in orders.chunks(4) {
        assert_eq!(sorted(cycle.to_vec()), vec![1, 2, 3, 4]);
    }
}

#[test]
fn consecutive_cycles_are_shuffled_independently() {
    let mut engine = RotationEngine::seeded(11);
    let c = campaign("MANY", &["a", "b", "c", "d", "e", "f"]);
    let orders = picks(&mut engine, &c, 6 * 8);

    let cycles: Vec<&[usize]> = orders.chunks(6).collect();
    for cycle in &cycles {
        assert_eq!(sorted(cycle.to_vec()), vec![1, 2, 3, 4, 5, 6]);
    }
    assert!(
        cycles.windows(2).any(|pair| pair[0] != pair[1]),
        "every cycle repeated the same order: {cycles:?}"
    );
}

#[test]
fn wrapping_the_cursor_reshuffles_the_order() {
    let mut engine = RotationEngine::seeded(12);
    let c = campaign("WRAP", &["a", "b", "c", "d", "e", "f", "g", "h"]);

    let mut reshuffled = false;
    for _ in 0..5 {
        engine.pick_winner(&c).unwrap();
        let before = engine.state("WRAP").unwrap().order().to_vec();
        picks(&mut engine, &c, 7);

        let state = engine.state("WRAP").unwrap();
        assert_eq!(state.cursor(), 0);
        assert_eq!(sorted(state.order().to_vec()), (0..8).collect::<Vec<_>>());
        reshuffled |= state.order() != before.as_slice();
    }
    assert!(reshuffled, "order never changed across five wraps");
}

#[test]
fn six_picks_over_three_winners_are_two_permutations() {
    for seed in 0..20 {
        let mut engine = RotationEngine::seeded(seed);
        let c = campaign("ABC", &["A", "B", "C"]);
        let orders = picks(&mut engine, &c, 6);
        assert_eq!(sorted(orders[..3].to_vec()), vec![1, 2, 3], "seed {seed}");
        assert_eq!(sorted(orders[3..].to_vec()), vec![1, 2, 3], "seed {seed}");
    }
}

#[test]
fn single_winner_is_always_picked() {
    let mut engine = RotationEngine::seeded(3);
    let c = campaign("ONE", &["solo"]);
    for _ in 0..3 {
        let picked = engine.pick_winner(&c).unwrap();
        assert_eq!(picked.username, "solo");
        assert_eq!(picked.order, 1);
    }
    let state = engine.state("ONE").unwrap();
    assert_eq!(state.order(), &[0]);
    assert_eq!(state.cursor(), 0);
}

#[test]
fn picked_winner_carries_winner_fields() {
    let mut engine = RotationEngine::seeded(4);
    let c = campaign("ONE", &["solo"]);
    let picked = engine.pick_winner(&c).unwrap();
    assert_eq!(
        picked,
        PickedWinner {
            username: "solo".to_owned(),
            profile_url: "https://www.instagram.com/solo/".to_owned(),
            comment: "solo wants it".to_owned(),
            order: 1,
        }
    );
}

#[test]
fn empty_campaign_yields_no_winner() {
    let mut engine = RotationEngine::seeded(5);
    let mut c = campaign("NONE", &["x"]);
    c.winners.clear();
    assert!(engine.pick_winner(&c).is_none());
    assert!(engine.is_empty());
}

// -----------------------------------------------------------------------
// ensure_rotation
// -----------------------------------------------------------------------

#[test]
fn same_membership_keeps_state() {
    let mut engine = RotationEngine::seeded(6);
    let c = campaign("ABC", &["a", "b", "c"]);
    picks(&mut engine, &c, 2);
    let before = engine.state("ABC").unwrap().clone();

    let change = engine.ensure_rotation("ABC", &c.winners);

    assert_eq!(change, RotationChange::Unchanged);
    assert_eq!(engine.state("ABC").unwrap(), &before);
    assert_eq!(before.cursor(), 2);
}

#[test]
fn reordered_membership_keeps_cursor_and_cycle() {
    let mut engine = RotationEngine::seeded(7);
    let original = campaign("ABC", &["a", "b", "c"]);
    let first = engine.pick_winner(&original).unwrap().username;

    let reordered = campaign("ABC", &["c", "a", "b"]);
    let change = engine.ensure_rotation("ABC", &reordered.winners);
    assert_eq!(change, RotationChange::Reindexed);
    assert_eq!(engine.state("ABC").unwrap().cursor(), 1);

    let mut names: Vec<String> = vec![first];
    for _ in 0..2 {
        let picked = engine.pick_winner(&reordered).unwrap();
        assert_eq!(
            reordered.winners[picked.order - 1].username,
            picked.username,
            "order must point into the reordered list"
        );
        names.push(picked.username);
    }
    names.sort();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn reordered_duplicates_are_remapped_by_occurrence() {
    let mut engine = RotationEngine::seeded(8);
    let original = campaign("DUP", &["a", "b", "a"]);
    engine.pick_winner(&original).unwrap();

    let reordered = campaign("DUP", &["a", "a", "b"]);
    assert_eq!(
        engine.ensure_rotation("DUP", &reordered.winners),
        RotationChange::Reindexed
    );
    let state = engine.state("DUP").unwrap();
    assert_eq!(sorted(state.order().to_vec()), vec![0, 1, 2]);
    assert_eq!(state.cursor(), 1);
}

#[test]
fn new_member_reseeds_at_cursor_zero() {
    let mut engine = RotationEngine::seeded(9);
    let c = campaign("ABC", &["a", "b", "c"]);
    picks(&mut engine, &c, 2);

    let grown = campaign("ABC", &["a", "b", "c", "d"]);
    let change = engine.ensure_rotation("ABC", &grown.winners);

    assert_eq!(change, RotationChange::Reseeded);
    let state = engine.state("ABC").unwrap();
    assert_eq!(state.cursor(), 0);
    assert_eq!(sorted(state.order().to_vec()), vec![0, 1, 2, 3]);
    assert_eq!(state.key(), fingerprint(&grown.winners));
}

#[test]
fn ensure_rotation_ignores_empty_winners() {
    let mut engine = RotationEngine::seeded(10);
    let c = campaign("ABC", &["a", "b"]);
    engine.ensure_rotation("ABC", &c.winners);
    let before = engine.state("ABC").unwrap().clone();

    assert_eq!(engine.ensure_rotation("ABC", &[]), RotationChange::Unchanged);
    assert_eq!(engine.state("ABC").unwrap(), &before);
}

#[test]
fn retain_drops_rejected_shortcodes() {
    let mut engine = RotationEngine::seeded(11);
    engine.ensure_rotation("KEEP", &[winner("a")]);
    engine.ensure_rotation("DROP", &[winner("b")]);

    engine.retain(|code| code == "KEEP");

    assert_eq!(engine.len(), 1);
    assert!(engine.state("KEEP").is_some());
    assert!(engine.state("DROP").is_none());
}
