//! Randomized comparison against a naive dense reference vector over a bounded window, and
//! arithmetic identities from spec §8 property 5.

use corelib_sparse_vector::{MutableIntSparseVector, MutableSparseVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const WINDOW: i32 = 64;
const OFFSET: i32 = WINDOW;

fn dense_get(dense: &[f64], index: i32) -> f64 {
    dense[(index + OFFSET) as usize]
}

#[test]
fn random_mutations_match_dense_reference() {
    let mut rng = StdRng::seed_from_u64(0x5EED_0001);
    let mut dense = vec![0.0; (2 * WINDOW + 1) as usize];
    let mut sparse = MutableSparseVector::new();

    for _ in 0..2000 {
        let index = rng.random_range(-WINDOW..=WINDOW);
        let value: f64 = rng.random_range(-10.0..=10.0);

        match rng.random_range(0..3) {
            0 => {
                dense[(index + OFFSET) as usize] = value;
                sparse.set(index, value);
            }
            1 => {
                dense[(index + OFFSET) as usize] += value;
                sparse.add(index, value);
            }
            _ => {
                dense[(index + OFFSET) as usize] -= value;
                sparse.sub(index, value);
            }
        }

        for i in -WINDOW..=WINDOW {
            assert_eq!(sparse.get(i), dense_get(&dense, i), "mismatch at {i}");
        }
        let expected_non_zero = dense.iter().filter(|&&v| v != 0.0).count();
        assert_eq!(sparse.non_zero_count(), expected_non_zero);
    }
}

#[test]
fn arithmetic_identities_hold() {
    let mut rng = StdRng::seed_from_u64(0xFEED_BEEF);

    for _ in 0..200 {
        let mut v = MutableSparseVector::new();
        for _ in 0..10 {
            let index = rng.random_range(-WINDOW..=WINDOW);
            let value: f64 = rng.random_range(-10.0..=10.0);
            v.set(index, value);
        }

        // v + 0 = v
        let zero = MutableSparseVector::new();
        let v_plus_zero = v.plus(&zero);
        for i in -WINDOW..=WINDOW {
            assert_eq!(v_plus_zero.get(i), v.get(i));
        }

        // v - v = 0
        let self_minus_self = v.minus(&v);
        assert_eq!(self_minus_self.non_zero_count(), 0);

        // ||v||^2 == v . v (sum of element-wise products)
        let self_dot_self = v.dot(&v);
        let norm_squared = v.norm() * v.norm();
        assert!((self_dot_self.sum() - norm_squared).abs() < 1e-6);
    }
}

#[test]
fn int_vector_random_mutations_match_dense_reference() {
    let mut rng = StdRng::seed_from_u64(0x1234_5678);
    let mut dense = vec![0i64; (2 * WINDOW + 1) as usize];
    let mut sparse = MutableIntSparseVector::new();

    for _ in 0..2000 {
        let index = rng.random_range(-WINDOW..=WINDOW);
        let value: i32 = rng.random_range(-10..=10);

        match rng.random_range(0..3) {
            0 => {
                dense[(index + OFFSET) as usize] = i64::from(value);
                sparse.set(index, value);
            }
            1 => {
                dense[(index + OFFSET) as usize] += i64::from(value);
                sparse.add(index, value);
            }
            _ => {
                dense[(index + OFFSET) as usize] -= i64::from(value);
                sparse.sub(index, value);
            }
        }

        for i in -WINDOW..=WINDOW {
            let expected = dense[(i + OFFSET) as usize];
            assert_eq!(i64::from(sparse.get(i)), expected, "mismatch at {i}");
        }
    }
}
