#![cfg(test)]

// Property tests for KvFifo kept inside the crate so they can check the
// internal invariants of the shared state after every step.

use crate::error::FifoError;
use crate::kv_fifo::KvFifo;
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Push(u8, i32),
    Pop,
    PopKey(u8),
    MoveToBack(u8),
    FrontMut(i32),
    BackMut(i32),
    FirstMut(u8, i32),
    LastMut(u8, i32),
    Clear,
    // Take a clone of the handle and remember what it must keep showing.
    Snapshot,
    // Overwrite one remembered clone with the current handle (assignment).
    Assign(usize),
}

fn arb_op(keys: u8) -> impl Strategy<Value = Op> {
    let k = 0..keys;
    prop_oneof![
        4 => (k.clone(), any::<i32>()).prop_map(|(k, v)| Op::Push(k, v)),
        1 => Just(Op::Pop),
        2 => k.clone().prop_map(Op::PopKey),
        2 => k.clone().prop_map(Op::MoveToBack),
        1 => (-5i32..5).prop_map(Op::FrontMut),
        1 => (-5i32..5).prop_map(Op::BackMut),
        1 => (k.clone(), -5i32..5).prop_map(|(k, d)| Op::FirstMut(k, d)),
        1 => (k, -5i32..5).prop_map(|(k, d)| Op::LastMut(k, d)),
        1 => Just(Op::Clear),
        1 => Just(Op::Snapshot),
        1 => (0usize..8).prop_map(Op::Assign),
    ]
}

fn contents(q: &KvFifo<u8, i32>) -> Vec<(u8, i32)> {
    q.iter().map(|(k, v)| (*k, *v)).collect()
}

fn check(q: &KvFifo<u8, i32>, model: &[(u8, i32)], keys: u8) -> Result<(), TestCaseError> {
    q.shared.debug_validate_invariants();
    prop_assert_eq!(contents(q), model.to_vec());
    prop_assert_eq!(q.len(), model.len());
    for k in 0..keys {
        let n = model.iter().filter(|(mk, _)| *mk == k).count();
        prop_assert_eq!(q.count(&k), n);
    }
    let mut distinct: Vec<u8> = model.iter().map(|(k, _)| *k).collect();
    distinct.sort_unstable();
    distinct.dedup();
    prop_assert_eq!(q.keys().copied().collect::<Vec<_>>(), distinct);
    Ok(())
}

fn bump(model: &mut [(u8, i32)], at: Option<usize>, delta: i32) {
    if let Some(i) = at {
        model[i].1 = model[i].1.wrapping_add(delta);
    }
}

// Property: state-machine equivalence against a Vec<(K, V)> model, with
// clones taken along the way.
// Invariants exercised:
// - FIFO order, per-key order and counts match the model after every op.
// - move_to_back is a stable partition of the sequence.
// - Errors are returned exactly when the model says the precondition fails,
//   and they leave the handle unchanged.
// - Every earlier clone keeps showing the contents it had when taken, no
//   matter what the live handle does (including `_mut` writes).
// - The sequence and the key index stay mutually consistent.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_matches_vec_model(keys in 1u8..=4, ops in proptest::collection::vec(arb_op(4), 1..80)) {
        let mut q: KvFifo<u8, i32> = KvFifo::new();
        let mut model: Vec<(u8, i32)> = Vec::new();
        let mut snapshots: Vec<(KvFifo<u8, i32>, Vec<(u8, i32)>)> = Vec::new();

        for op in ops {
            match op {
                Op::Push(k, v) => {
                    let k = k % keys;
                    q.push(k, v);
                    model.push((k, v));
                }
                Op::Pop => {
                    let got = q.pop();
                    if model.is_empty() {
                        prop_assert_eq!(got, Err(FifoError::EmptyQueue));
                    } else {
                        prop_assert_eq!(got, Ok(model.remove(0)));
                    }
                }
                Op::PopKey(k) => {
                    let k = k % keys;
                    let got = q.pop_key(&k);
                    match model.iter().position(|(mk, _)| *mk == k) {
                        Some(i) => prop_assert_eq!(got, Ok(model.remove(i))),
                        None => prop_assert_eq!(got, Err(FifoError::KeyNotFound)),
                    }
                }
                Op::MoveToBack(k) => {
                    let k = k % keys;
                    let got = q.move_to_back(&k);
                    if model.iter().any(|(mk, _)| *mk == k) {
                        prop_assert_eq!(got, Ok(()));
                        let (mut hit, rest): (Vec<_>, Vec<_>) =
                            model.drain(..).partition(|(mk, _)| *mk == k);
                        model = rest;
                        model.append(&mut hit);
                    } else {
                        prop_assert_eq!(got, Err(FifoError::KeyNotFound));
                    }
                }
                Op::FrontMut(d) => {
                    match q.front_mut() {
                        Ok((_, v)) => *v = v.wrapping_add(d),
                        Err(e) => prop_assert_eq!(e, FifoError::EmptyQueue),
                    }
                    let at = if model.is_empty() { None } else { Some(0) };
                    bump(&mut model, at, d);
                }
                Op::BackMut(d) => {
                    match q.back_mut() {
                        Ok((_, v)) => *v = v.wrapping_add(d),
                        Err(e) => prop_assert_eq!(e, FifoError::EmptyQueue),
                    }
                    let at = model.len().checked_sub(1);
                    bump(&mut model, at, d);
                }
                Op::FirstMut(k, d) => {
                    let k = k % keys;
                    match q.first_mut(&k) {
                        Ok((key, v)) => {
                            prop_assert_eq!(*key, k);
                            *v = v.wrapping_add(d);
                        }
                        Err(e) => prop_assert_eq!(e, FifoError::KeyNotFound),
                    }
                    let at = model.iter().position(|(mk, _)| *mk == k);
                    bump(&mut model, at, d);
                }
                Op::LastMut(k, d) => {
                    let k = k % keys;
                    match q.last_mut(&k) {
                        Ok((key, v)) => {
                            prop_assert_eq!(*key, k);
                            *v = v.wrapping_add(d);
                        }
                        Err(e) => prop_assert_eq!(e, FifoError::KeyNotFound),
                    }
                    let at = model.iter().rposition(|(mk, _)| *mk == k);
                    bump(&mut model, at, d);
                }
                Op::Clear => {
                    q.clear();
                    model.clear();
                }
                Op::Snapshot => {
                    snapshots.push((q.clone(), model.clone()));
                }
                Op::Assign(i) => {
                    if let Some((h, m)) = snapshots.get_mut(i) {
                        h.clone_from(&q);
                        *m = model.clone();
                    }
                }
            }

            check(&q, &model, keys)?;
            for (h, m) in &snapshots {
                check(h, m, keys)?;
            }
        }
    }
}
