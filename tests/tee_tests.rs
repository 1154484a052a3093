mod common;

use proptest::prelude::*;
use snapiter::prelude::*;

#[test]
fn two_consumers_over_three_elements() {
    let mut cs = split(vec![5, 2, 4], 2).unwrap();
    let mut second = cs.pop().unwrap();
    let mut first = cs.pop().unwrap();

    assert_eq!(first.next().unwrap(), Some(5));
    assert_eq!(second.next().unwrap(), Some(5));
    assert_eq!(second.next().unwrap(), Some(2));
    assert_eq!(second.next().unwrap(), Some(4));
    assert_eq!(second.next().unwrap(), None);
    assert_eq!(first.drain_vec().unwrap(), vec![2, 4]);
    assert_eq!(first.next().unwrap(), None);
}

#[test]
fn group_snapshot_round_trips_through_envelope() {
    let mut cs = split(vec![1u16, 2, 3, 4, 5], 3).unwrap();
    cs[0].take_vec(4).unwrap();
    cs[2].take_vec(1).unwrap();

    let snap = Snapshot::capture(&cs[1], Codec::None).unwrap();
    let state = Snapshot::from_bytes(&snap.to_bytes()).unwrap().state().unwrap();
    let mut group = TeeConsumer::<SequenceProducer<u16>>::restore_group(state).unwrap();

    assert_eq!(group.len(), 3);
    let restored: Vec<Vec<u16>> = group.iter_mut().map(|c| c.drain_vec().unwrap()).collect();
    let original: Vec<Vec<u16>> = cs.iter_mut().map(|c| c.drain_vec().unwrap()).collect();
    assert_eq!(restored, original);
    assert_eq!(original, vec![vec![5], vec![1, 2, 3, 4, 5], vec![2, 3, 4, 5]]);
}

proptest! {
    #[test]
    fn fair_under_any_interleaving(
        data in proptest::collection::vec(any::<i16>(), 0..20),
        n in 1usize..5,
        schedule in proptest::collection::vec(0usize..5, 0..60),
    ) {
        let (src, pulls) = common::Counted::new(data.clone());
        let mut consumers = split(src, n).unwrap();
        let mut seen = vec![Vec::new(); n];

        for pick in schedule {
            let i = pick % n;
            if let Some(x) = consumers[i].next().unwrap() {
                seen[i].push(x);
            }
            prop_assert!(pulls.get() <= data.len() + 1);
        }
        for (i, c) in consumers.iter_mut().enumerate() {
            seen[i].extend(c.drain_vec().unwrap());
        }
        for s in &seen {
            prop_assert_eq!(s, &data);
        }
        prop_assert_eq!(pulls.get(), data.len() + 1);
    }

    #[test]
    fn single_slot_restore_matches(
        data in proptest::collection::vec(any::<u8>(), 0..15),
        lead in 0usize..20,
        lag in 0usize..20,
    ) {
        let mut cs = split(data.clone(), 2).unwrap();
        cs[0].take_vec(lead).unwrap();
        cs[1].take_vec(lag).unwrap();
        let state = cs[1].capture().unwrap();
        let mut solo = TeeConsumer::<SequenceProducer<u8>>::restore(state).unwrap();
        let expected: Vec<u8> = data.iter().copied().skip(lag).collect();
        prop_assert_eq!(solo.drain_vec().unwrap(), expected);
    }
}
