use pmgraph_pma::Pma;
use proptest::prelude::*;

fn sorted_insert(pma: &mut Pma<u32>, value: u32) {
    let at = pma.lower_bound(&value);
    pma.insert(at, value, &mut ());
}

fn contents(pma: &Pma<u32>) -> Vec<u32> {
    pma.iter().copied().collect()
}

proptest! {
    #[test]
    fn iteration_is_sorted(values in proptest::collection::vec(any::<u32>(), 0..600)) {
        let mut pma = Pma::new();
        for &v in &values {
            sorted_insert(&mut pma, v);
        }
        let mut expected = values.clone();
        expected.sort_unstable();
        prop_assert_eq!(contents(&pma), expected);
        prop_assert!(pma.pool_size().is_power_of_two());
    }

    #[test]
    fn interleaved_insert_erase(ops in proptest::collection::vec((any::<bool>(), any::<u32>()), 0..400)) {
        let mut pma = Pma::new();
        let mut model: Vec<u32> = Vec::new();
        for (insert, v) in ops {
            if insert || model.is_empty() {
                sorted_insert(&mut pma, v);
                let at = model.binary_search(&v).unwrap_or_else(|e| e);
                model.insert(at, v);
            } else {
                let target = model[(v as usize) % model.len()];
                let pos = pma.find(&target);
                prop_assert!(pos < pma.end());
                pma.erase(pos, &mut ());
                let at = model.iter().position(|&m| m == target).unwrap();
                model.remove(at);
            }
            prop_assert_eq!(pma.len(), model.len());
        }
        prop_assert_eq!(contents(&pma), model);
    }

    #[test]
    fn rank_round_trips(count in 1usize..300) {
        let mut pma = Pma::new();
        for v in 0..count as u32 {
            sorted_insert(&mut pma, v);
        }
        for rank in 0..count {
            let pos = pma.at_rank(rank);
            prop_assert_eq!(pma.rank_of(pos), rank);
        }
    }
}
