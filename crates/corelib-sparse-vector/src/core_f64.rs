//! Free functions over a plain `BTreeMap<i32, f64>` implementing every `SparseVector` operation
//! from spec §4.2. Kept separate from the public types so the mutable and read-only facades can
//! share the same logic without duplicating it.
//!
//! Zero-canonical: a stored value is never exactly `+0.0` or `-0.0`; an unstored index reads as
//! `0.0`. `NaN` is a legitimate stored value and is preserved verbatim — the zero test below is
//! the arithmetic `value == 0.0`, which is `false` for `NaN` by IEEE 754, so `NaN` is never
//! dropped as if it were absent.

use std::collections::BTreeMap;

pub(crate) type Entries = BTreeMap<i32, f64>;

pub(crate) fn is_zero(value: f64) -> bool {
    value == 0.0
}

pub(crate) fn get(map: &Entries, index: i32) -> f64 {
    map.get(&index).copied().unwrap_or(0.0)
}

pub(crate) fn get_all(map: &Entries, lo: i32, hi: i32) -> Vec<f64> {
    if lo > hi {
        return Vec::new();
    }
    (lo..=hi).map(|i| get(map, i)).collect()
}

pub(crate) fn set(map: &mut Entries, index: i32, value: f64) {
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
        let merged = get(&result, index) + value;
        set(&mut result, index, merged);
    }
    result
}

pub(crate) fn minus(a: &Entries, b: &Entries) -> Entries {
    let mut result = a.clone();
    for (&index, &value) in b {
        let merged = get(&result, index) - value;
        set(&mut result, index, merged);
    }
    result
}

pub(crate) fn dot(a: &Entries, b: &Entries) -> Entries {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let mut result = Entries::new();
    for (&index, &value) in smaller {
        let product = value * get(larger, index);
        set(&mut result, index, product);
    }
    result
}

pub(crate) fn cross(a: &Entries, b: &Entries) -> Entries {
    let (ax, ay, az) = (get(a, 0), get(a, 1), get(a, 2));
    let (bx, by, bz) = (get(b, 0), get(b, 1), get(b, 2));
    let mut result = Entries::new();
    set(&mut result, 0, ay * bz - az * by);
    set(&mut result, 1, az * bx - ax * bz);
    set(&mut result, 2, ax * by - ay * bx);
    result
}

pub(crate) fn multiplied(map: &Entries, scalar: f64) -> Entries {
    if is_zero(scalar) {
        return Entries::new();
    }
    map.iter()
        .filter_map(|(&index, &value)| {
            let product = value * scalar;
            (!is_zero(product)).then_some((index, product))
        })
        .collect()
}

pub(crate) fn divided(map: &Entries, scalar: f64) -> Entries {
    map.iter()
        .filter_map(|(&index, &value)| {
            let quotient = value / scalar;
            (!is_zero(quotient)).then_some((index, quotient))
        })
        .collect()
}

pub(crate) fn norm(map: &Entries) -> f64 {
    map.values().map(|v| v * v).sum::<f64>().sqrt()
}

pub(crate) fn abs(map: &Entries) -> Entries {
    let mut result = Entries::new();
    for (&index, &value) in map {
        set(&mut result, index, value.abs());
    }
    result
}

pub(crate) fn sum(map: &Entries) -> f64 {
    map.values().sum()
}

pub(crate) fn add_scalar(map: &mut Entries, index: i32, value: f64) {
    let merged = get(map, index) + value;
    set(map, index, merged);
}

pub(crate) fn sub_scalar(map: &mut Entries, index: i32, value: f64) {
    let merged = get(map, index) - value;
    set(map, index, merged);
}

pub(crate) fn multiply(map: &mut Entries, scalar: f64) {
    if is_zero(scalar) {
        map.clear();
        return;
    }
    *map = multiplied(map, scalar);
}

pub(crate) fn divide(map: &mut Entries, scalar: f64) {
    *map = divided(map, scalar);
}

pub(crate) fn transform_non_zero(map: &mut Entries, mut f: impl FnMut(i32, f64) -> f64) {
    let indices: Vec<i32> = map.keys().copied().collect();
    for index in indices {
        let value = f(index, get(map, index));
        set(map, index, value);
    }
}

pub(crate) fn transform(map: &mut Entries, lo: i32, hi: i32, mut f: impl FnMut(i32, f64) -> f64) {
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

pub(crate) fn for_each_non_zero(map: &Entries, mut action: impl FnMut(i32, f64)) {
    for (&index, &value) in map {
        action(index, value);
    }
}

pub(crate) fn for_each(map: &Entries, lo: i32, hi: i32, mut action: impl FnMut(i32, f64)) {
    if lo > hi {
        return;
    }
    for index in lo..=hi {
        action(index, get(map, index));
    }
}
