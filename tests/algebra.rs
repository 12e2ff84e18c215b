use rankset::RankedSet;

fn scored(pairs: &[(u32, f32)]) -> RankedSet {
    let s = RankedSet::new();
    for &(id, score) in pairs {
        s.insert(id, score);
    }
    s
}

fn members(s: &RankedSet) -> Vec<u32> {
    let mut out = Vec::new();
    s.iterate(false, |id| {
        out.push(id);
        true
    });
    out
}

fn ranked(s: &RankedSet) -> Vec<u32> {
    let mut out = Vec::new();
    s.iterate(true, |id| {
        out.push(id);
        true
    });
    out
}

#[test]
fn and_keeps_surviving_scores() {
    let a = scored(&[(1, 4.0), (2, 3.0), (3, 2.0), (4, 1.0)]);
    let b = RankedSet::new();
    b.add([2, 4, 6]);
    a.and(&b);
    assert_eq!(members(&a), [2, 4]);
    assert_eq!(ranked(&a), [4, 2]);
    assert_eq!(a.score(2), Some(3.0));
    assert_eq!(a.score(1), None);
    assert_eq!(a.scored_len(), 2);
}

#[test]
fn and_keeps_unscored_survivors_unscored() {
    let a = scored(&[(1, 1.0)]);
    a.add([2, 3]);
    let b = RankedSet::new();
    b.add([1, 2]);
    a.and(&b);
    assert_eq!(members(&a), [1, 2]);
    assert_eq!(ranked(&a), [1]);
}

#[test]
fn and_not_removes_scores_of_removed_ids() {
    let a = scored(&[(1, 1.0), (2, 2.0), (3, 3.0)]);
    let b = scored(&[(2, 100.0)]);
    a.and_not(&b);
    assert_eq!(members(&a), [1, 3]);
    assert_eq!(ranked(&a), [1, 3]);
    assert_eq!(b.count(), 1);
    assert_eq!(b.score(2), Some(100.0));
}

#[test]
fn and_any_intersects_with_union() {
    let a = scored(&[(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0)]);
    let x = RankedSet::new();
    x.add([1, 10]);
    let y = RankedSet::new();
    y.add([4]);
    a.and_any(&[&x, &y]);
    assert_eq!(members(&a), [1, 4]);
    assert_eq!(ranked(&a), [1, 4]);
}

#[test]
fn and_any_without_operands_is_noop() {
    let a = scored(&[(1, 1.0), (2, 2.0)]);
    a.and_any(&[]);
    assert_eq!(members(&a), [1, 2]);
    assert_eq!(a.scored_len(), 2);
}

#[test]
fn or_drops_all_scores() {
    let a = scored(&[(1, 1.0), (2, 2.0)]);
    let b = scored(&[(3, 3.0)]);
    a.or(&b);
    assert_eq!(members(&a), [1, 2, 3]);
    assert_eq!(a.scored_len(), 0);
    assert!(ranked(&a).is_empty());
    let mut buf = [0u32; 4];
    assert_eq!(a.rank(0, &mut buf), 0);
    assert_eq!(b.scored_len(), 1);
}

#[test]
fn xor_drops_all_scores() {
    let a = scored(&[(1, 1.0), (2, 2.0)]);
    let b = scored(&[(2, 2.0), (3, 3.0)]);
    a.xor(&b);
    assert_eq!(members(&a), [1, 3]);
    assert_eq!(a.scored_len(), 0);
}

#[test]
fn scores_can_be_restored_after_union() {
    let a = scored(&[(1, 1.0)]);
    let b = scored(&[(2, 0.5)]);
    a.or(&b);
    a.insert(1, 1.0);
    a.insert(2, 0.5);
    assert_eq!(ranked(&a), [2, 1]);
}

#[test]
fn opposite_direction_ops_do_not_deadlock() {
    use std::sync::Arc;
    use std::thread;

    let a = Arc::new(scored(&(0..1000u32).map(|i| (i, i as f32)).collect::<Vec<_>>()));
    let b = Arc::new(scored(&(500..1500u32).map(|i| (i, i as f32)).collect::<Vec<_>>()));
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            thread::spawn(move || {
                for _ in 0..50 {
                    if t % 2 == 0 {
                        a.and(&b);
                    } else {
                        b.and(&a);
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(a.count(), 500);
    assert_eq!(b.count(), 500);
}
