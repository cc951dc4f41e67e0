//! Free functions over a plain `BTreeMap<i32, i32>` implementing every `IntSparseVector`
//! operation from spec §4.2. Mirrors [`crate::core_f64`] except values are `i32` and "absent"
//! means exactly `0`; `norm`/`distance` are computed in `f64` and rounded half-to-even back to
//! `i32`, and normalization discards components that round to zero.

use std::collections::BTreeMap;

pub(crate) type Entries = BTreeMap<i32, i32>;

pub(crate) fn is_zero(value: i32) -> bool {
    value == 0
}

pub(crate) fn get(map: &Entries, index: i32) -> i32 {
    map.get(&index).copied().unwrap_or(0)
}

pub(crate) fn get_all(map: &Entries, lo: i32, hi: i32) -> Vec<i32> {
    if lo > hi {
        return Vec::new();
    }
    (lo..=hi).map(|i| get(map, i)).collect()
}

pub(crate) fn set(map: &mut Entries, index: i32, value: i32) {
    if is_zero(value) {
        map.remove(&index);
    } else {
        map.insert(index, value);
    }
}

pub(crate) fn first_non_zero_index(map: &Entries) -> i32 {
    map.keys().next().copied().unwrap_or(-1)
}

pub(crate) fn last_non_zero_index(map: &Entries) -> i32 {
    map.keys().next_back().copied().unwrap_or(-1)
}

pub(crate) fn next_non_zero_index(map: &Entries, from: i32) -> i32 {
    map.range(from..).next().map_or(-1, |(&k, _)| k)
}

pub(crate) fn previous_non_zero_index(map: &Entries, from: i32) -> i32 {
    map.range(..=from).next_back().map_or(-1, |(&k, _)| k)
}

pub(crate) fn first_zero_index(map: &Entries) -> i32 {
    let mut candidate: i32 = 0;
    for &k in map.keys() {
        if k < candidate {
            continue;
        }
        if k == candidate {
            let Some(next) = candidate.checked_add(1) else {
                return -1;
            };
            candidate = next;
        } else {
            break;
        }
    }
    candidate
}

pub(crate) fn last_zero_index(map: &Entries) -> i32 {
    if !map.contains_key(&i32::MAX) {
        return i32::MAX;
    }
    let mut candidate = i32::MAX;
    for (&k, _) in map.range(..=i32::MAX).rev() {
        if k != candidate {
            return candidate;
        }
        let Some(prev) = candidate.checked_sub(1) else {
            return -1;
        };
        candidate = prev;
    }
    candidate
}

pub(crate) fn plus(a: &Entries, b: &Entries) -> Entries {
    let mut result = a.clone();
    for (&index, &value) in b {
        let merged = get(&result, index).wrapping_add(value);
        set(&mut result, index, merged);
    }
    result
}

pub(crate) fn minus(a: &Entries, b: &Entries) -> Entries {
    let mut result = a.clone();
    for (&index, &value) in b {
        let merged = get(&result, index).wrapping_sub(value);
        set(&mut result, index, merged);
    }
    result
}

pub(crate) fn dot(a: &Entries, b: &Entries) -> Entries {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut result = Entries::new();
    for (&index, &value) in smaller {
        let product = value.wrapping_mul(get(larger, index));
        set(&mut result, index, product);
    }
    result
}

pub(crate) fn cross(a: &Entries, b: &Entries) -> Entries {
    let (ax, ay, az) = (get(a, 0), get(a, 1), get(a, 2));
    let (bx, by, bz) = (get(b, 0), get(b, 1), get(b, 2));
    let mut result = Entries::new();
    set(&mut result, 0, ay.wrapping_mul(bz).wrapping_sub(az.wrapping_mul(by)));
    set(&mut result, 1, az.wrapping_mul(bx).wrapping_sub(ax.wrapping_mul(bz)));
    set(&mut result, 2, ax.wrapping_mul(by).wrapping_sub(ay.wrapping_mul(bx)));
    result
}

pub(crate) fn multiplied(map: &Entries, scalar: i32) -> Entries {
    if is_zero(scalar) {
        return Entries::new();
    }
    let mut result = Entries::new();
    for (&index, &value) in map {
        set(&mut result, index, value.wrapping_mul(scalar));
    }
    result
}

/// Divides each element by `scalar`, dropping any result that rounds to zero. The caller has
/// already rejected `scalar == 0`.
pub(crate) fn divided(map: &Entries, scalar: i32) -> Entries {
    let mut result = Entries::new();
    for (&index, &value) in map {
        let rounded = round_half_to_even(f64::from(value) / f64::from(scalar));
        set(&mut result, index, rounded);
    }
    result
}

/// Rounds `value` half-to-even (banker's rounding) and saturates into `i32` range.
pub(crate) fn round_half_to_even(value: f64) -> i32 {
    let rounded = value.round_ties_even();
    if rounded >= f64::from(i32::MAX) {
        i32::MAX
    } else if rounded <= f64::from(i32::MIN) {
        i32::MIN
    } else {
        rounded as i32
    }
}

pub(crate) fn norm(map: &Entries) -> i32 {
    let sum_sq: f64 = map.values().map(|&v| f64::from(v) * f64::from(v)).sum();
    round_half_to_even(sum_sq.sqrt())
}

pub(crate) fn abs(map: &Entries) -> Entries {
    let mut result = Entries::new();
    for (&index, &value) in map {
        set(&mut result, index, value.wrapping_abs());
    }
    result
}

pub(crate) fn sum(map: &Entries) -> i64 {
    map.values().map(|&v| i64::from(v)).sum()
}

pub(crate) fn add_scalar(map: &mut Entries, index: i32, value: i32) {
    let merged = get(map, index).wrapping_add(value);
    set(map, index, merged);
}

pub(crate) fn sub_scalar(map: &mut Entries, index: i32, value: i32) {
    let merged = get(map, index).wrapping_sub(value);
    set(map, index, merged);
}

pub(crate) fn multiply(map: &mut Entries, scalar: i32) {
    if is_zero(scalar) {
        map.clear();
        return;
    }
    let next: Entries = map
        .iter()
        .filter_map(|(&i, &v)| {
            let product = v.wrapping_mul(scalar);
            (!is_zero(product)).then_some((i, product))
        })
        .collect();
    *map = next;
}

/// Divides every element by `scalar` in place. The caller has already rejected `scalar == 0`.
pub(crate) fn divide(map: &mut Entries, scalar: i32) {
    let next: Entries = map
        .iter()
        .filter_map(|(&i, &v)| {
            let rounded = round_half_to_even(f64::from(v) / f64::from(scalar));
            (!is_zero(rounded)).then_some((i, rounded))
        })
        .collect();
    *map = next;
}

pub(crate) fn transform_non_zero(map: &mut Entries, mut f: impl FnMut(i32, i32) -> i32) {
    let indices: Vec<i32> = map.keys().copied().collect();
    for index in indices {
        let value = f(index, get(map, index));
        set(map, index, value);
    }
}

pub(crate) fn transform(map: &mut Entries, lo: i32, hi: i32, mut f: impl FnMut(i32, i32) -> i32) {
    if lo > hi {
        return;
    }
    for index in lo..=hi {
        let value = f(index, get(map, index));
        set(map, index, value);
    }
}

pub(crate) fn add_vector(map: &mut Entries, other: &Entries) {
    for (&index, &value) in other {
        add_scalar(map, index, value);
    }
}

pub(crate) fn sub_vector(map: &mut Entries, other: &Entries) {
    for (&index, &value) in other {
        sub_scalar(map, index, value);
    }
}

pub(crate) fn for_each_non_zero(map: &Entries, mut action: impl FnMut(i32, i32)) {
    for (&index, &value) in map {
        action(index, value);
    }
}

pub(crate) fn for_each(map: &Entries, lo: i32, hi: i32, mut action: impl FnMut(i32, i32)) {
    if lo > hi {
        return;
    }
    for index in lo..=hi {
        action(index, get(map, index));
    }
}
