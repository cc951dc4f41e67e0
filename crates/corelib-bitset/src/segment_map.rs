//! Free functions over a plain `BTreeMap<i64, i64>` (segment start -> inclusive end) implementing
//! every operation in spec §4.1. Kept separate from the public types so the read-only facades
//! ([`crate::SegmentedBitSet`], [`crate::SegmentedBitSetView`]) and the owning
//! [`crate::MutableSegmentedBitSet`] can all delegate to the same logic without duplicating it.

use std::collections::BTreeMap;

pub(crate) type Segments = BTreeMap<i64, i64>;

/// The entry with the largest start `<= key`.
pub(crate) fn floor_entry(map: &Segments, key: i64) -> Option<(i64, i64)> {
    map.range(..=key).next_back().map(|(&s, &e)| (s, e))
}

/// The entry with the smallest start `>= key`.
pub(crate) fn ceiling_entry(map: &Segments, key: i64) -> Option<(i64, i64)> {
    map.range(key..).next().map(|(&s, &e)| (s, e))
}

pub(crate) fn contains(map: &Segments, n: i64) -> bool {
    matches!(floor_entry(map, n), Some((_, e)) if e >= n)
}

pub(crate) fn contains_all(map: &Segments, lo: i64, hi: i64) -> bool {
    if lo > hi {
        return true;
    }
    matches!(floor_entry(map, lo), Some((s, e)) if s <= lo && e >= hi)
}

pub(crate) fn contains_any(map: &Segments, lo: i64, hi: i64) -> bool {
    if lo > hi {
        return false;
    }
    if matches!(floor_entry(map, lo), Some((_, e)) if e >= lo) {
        return true;
    }
    if let Some((s, _)) = map.range((std::ops::Bound::Excluded(lo), std::ops::Bound::Unbounded)).next() {
        if *s <= hi {
            return true;
        }
    }
    false
}

fn touches_or_precedes(start: i64, hi: i64) -> bool {
    hi == i64::MAX || start <= hi + 1
}

pub(crate) fn add_all(map: &mut Segments, lo: i64, hi: i64) {
    if lo > hi {
        return;
    }

    let mut new_start = lo;
    let mut new_end = hi;

    // Absorb a segment touching or overlapping from the left, if any.
    let pred_key = if lo == i64::MIN { lo } else { lo - 1 };
    if let Some((s, e)) = floor_entry(map, pred_key) {
        if e >= pred_key {
            new_start = new_start.min(s);
            new_end = new_end.max(e);
            map.remove(&s);
        }
    }

    // Absorb every remaining segment that touches or overlaps the growing candidate from the
    // right.
    loop {
        let Some((s, e)) = ceiling_entry(map, new_start) else {
            break;
        };
        if !touches_or_precedes(s, new_end) {
            break;
        }
        new_end = new_end.max(e);
        map.remove(&s);
    }

    map.insert(new_start, new_end);
}

pub(crate) fn remove_all(map: &mut Segments, lo: i64, hi: i64) {
    if lo > hi {
        return;
    }

    // A segment starting strictly before `lo` may straddle the whole removal range.
    if let Some((s, e)) = map.range(..lo).next_back().map(|(&s, &e)| (s, e)) {
        if e >= lo {
            map.remove(&s);
            map.insert(s, lo - 1);
            if e > hi {
                map.insert(hi + 1, e);
                return;
            }
            // Otherwise this segment is fully consumed from `lo` onward; fall through to remove
            // any further segments up to `hi`.
        }
    }

    let starts: Vec<i64> = map.range(lo..=hi).map(|(&s, _)| s).collect();
    for s in starts {
        let e = map.remove(&s).expect("key was just read from this map; qed");
        if e > hi {
            map.insert(hi + 1, e);
            break;
        }
    }
}

/// Segments of `map` intersecting `[lo, hi]`, clipped to that range. Returns an empty vector for
/// an empty range.
pub(crate) fn subset_segments(map: &Segments, lo: i64, hi: i64) -> Vec<(i64, i64)> {
    let mut result = Vec::new();
    if lo > hi {
        return result;
    }
    for (&s, &e) in map.range(..=hi) {
        if e < lo {
            continue;
        }
        let cs = s.max(lo);
        let ce = e.min(hi);
        if cs <= ce {
            result.push((cs, ce));
        }
    }
    result
}

pub(crate) fn subset(map: &Segments, lo: i64, hi: i64) -> Segments {
    subset_segments(map, lo, hi).into_iter().collect()
}

pub(crate) fn flip_all(map: &mut Segments, lo: i64, hi: i64) {
    if lo > hi {
        return;
    }

    let present = subset_segments(map, lo, hi);
    remove_all(map, lo, hi);

    let mut cursor = Some(lo);
    for (s, e) in present {
        if let Some(c) = cursor {
            if c < s {
                add_all(map, c, s - 1);
            }
        }
        cursor = e.checked_add(1);
    }
    if let Some(c) = cursor {
        if c <= hi {
            add_all(map, c, hi);
        }
    }
}

pub(crate) fn union(a: &Segments, b: &Segments) -> Segments {
    let (mut result, smaller) = if a.len() >= b.len() {
        (a.clone(), b)
    } else {
        (b.clone(), a)
    };
    for (&s, &e) in smaller {
        add_all(&mut result, s, e);
    }
    result
}

pub(crate) fn intersect(a: &Segments, b: &Segments) -> Segments {
    let mut result = Segments::new();
    for (&s, &e) in a {
        let mut current = s;
        loop {
            if current > e {
                break;
            }
            let candidate = floor_entry(b, current)
                .filter(|&(_, oe)| oe >= current)
                .or_else(|| ceiling_entry(b, current));
            let Some((os, oe)) = candidate else {
                break;
            };
            if os > e {
                break;
            }
            let start = current.max(os);
            let end = e.min(oe);
            if start <= end {
                add_all(&mut result, start, end);
            }
            match end.checked_add(1) {
                Some(v) => current = v,
                None => break,
            }
        }
    }
    result
}

pub(crate) fn xor(a: &Segments, b: &Segments) -> Segments {
    let mut result = union(a, b);
    let overlap = intersect(a, b);
    for (&s, &e) in &overlap {
        remove_all(&mut result, s, e);
    }
    result
}

pub(crate) fn right_shift(map: &Segments, amount: i64) -> Segments {
    if amount < 0 {
        return left_shift(map, amount.wrapping_neg());
    }
    map.iter()
        .map(|(&s, &e)| (s.wrapping_add(amount), e.wrapping_add(amount)))
        .collect()
}

pub(crate) fn left_shift(map: &Segments, amount: i64) -> Segments {
    if amount < 0 {
        return right_shift(map, amount.wrapping_neg());
    }
    map.iter()
        .map(|(&s, &e)| (s.wrapping_sub(amount), e.wrapping_sub(amount)))
        .collect()
}

pub(crate) fn first(map: &Segments) -> Option<i64> {
    map.iter().next().map(|(&s, _)| s)
}

pub(crate) fn last(map: &Segments) -> Option<i64> {
    map.iter().next_back().map(|(_, &e)| e)
}

pub(crate) fn next(map: &Segments, from: i64) -> Option<i64> {
    match floor_entry(map, from) {
        Some((_, e)) if e >= from => Some(from),
        _ => ceiling_entry(map, from).map(|(s, _)| s),
    }
}

pub(crate) fn previous(map: &Segments, from: i64) -> Option<i64> {
    match floor_entry(map, from) {
        Some((_, e)) if e >= from => Some(from),
        Some((_, e)) => Some(e),
        None => None,
    }
}

pub(crate) fn next_absent(map: &Segments, from: i64) -> Option<i64> {
    match floor_entry(map, from) {
        Some((_, e)) if e >= from => {
            if e == i64::MAX {
                None
            } else {
                Some(e + 1)
            }
        }
        _ => Some(from),
    }
}

pub(crate) fn previous_absent(map: &Segments, from: i64) -> Option<i64> {
    match floor_entry(map, from) {
        Some((s, e)) if e >= from => {
            if s == i64::MIN {
                None
            } else {
                Some(s - 1)
            }
        }
        _ => Some(from),
    }
}

pub(crate) fn for_each_range(map: &Segments, mut action: impl FnMut(i64, i64)) {
    for (&s, &e) in map {
        action(s, e);
    }
}

pub(crate) fn for_each_absent_range(map: &Segments, lo: i64, hi: i64, mut action: impl FnMut(i64, i64)) {
    if lo > hi {
        return;
    }

    let mut cursor = match next_absent(map, lo) {
        Some(c) if c <= hi => c,
        _ => return,
    };

    loop {
        let gap_end = match next(map, cursor) {
            Some(p) if p <= hi => p - 1,
            _ => hi,
        };
        action(cursor, gap_end);
        if gap_end == i64::MAX || gap_end >= hi {
            break;
        }
        cursor = match next_absent(map, gap_end + 1) {
            Some(c) if c <= hi => c,
            _ => break,
        };
    }
}

/// Sum of each segment's cardinality (`end - start + 1`). Matches the source's signed 64-bit
/// addition, which silently wraps for totals beyond `i64::MAX` rather than panicking or failing;
/// see `DESIGN.md` for why this workspace keeps that policy instead of raising.
pub(crate) fn size(map: &Segments) -> i64 {
    let mut total: i64 = 0;
    for (&s, &e) in map {
        let len = e.wrapping_sub(s).wrapping_add(1);
        total = total.wrapping_add(len);
    }
    total
}

pub(crate) fn validate(segments: &[(i64, i64)]) -> Result<(), crate::error::BitSetError> {
    for &(s, e) in segments {
        if s > e {
            return Err(crate::error::BitSetError::InvalidSegment { start: s, end: e });
        }
    }
    for window in segments.windows(2) {
        let (a_start, a_end) = window[0];
        let (b_start, b_end) = window[1];
        if b_start <= a_end.saturating_add(1) {
            return Err(crate::error::BitSetError::OverlappingSegments {
                a_start,
                a_end,
                b_start,
                b_end,
            });
        }
    }
    Ok(())
}
