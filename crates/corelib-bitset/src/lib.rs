//! A coalesced segment set over the full 64-bit signed integer domain.
//!
//! [`MutableSegmentedBitSet`] stores a set of integers as an ordered map from each maximal run's
//! inclusive start to its inclusive end. No two stored segments ever overlap or touch; every
//! mutation re-establishes that invariant before returning. [`SegmentedBitSet`] and
//! [`SegmentedBitSetView`] are read-only facades over an independent copy and a borrowed view of
//! the same backing map, respectively.

mod codec;
mod error;
mod segment_map;

use segment_map::Segments;
use std::collections::BTreeMap;

pub use error::BitSetError;

/// Expands to the read-only navigation/query API shared by [`MutableSegmentedBitSet`],
/// [`SegmentedBitSet`], and [`SegmentedBitSetView`]. Every method here forwards to a free
/// function in [`segment_map`] operating on the type's backing `BTreeMap<i64, i64>`, obtained
/// through `$map_expr`.
macro_rules! impl_read_ops {
    ($ty:ty, $map_expr:expr) => {
        impl $ty {
            /// Number of integers contained in this set.
            ///
            /// Uses wrapping signed 64-bit addition: a set whose total cardinality exceeds
            /// `i64::MAX` silently wraps around rather than panicking, matching the source.
            #[must_use]
            pub fn size(&self) -> i64 {
                segment_map::size($map_expr(self))
            }

            /// Number of stored segments (not the number of integers; see [`Self::size`]).
            #[must_use]
            pub fn segment_count(&self) -> usize {
                $map_expr(self).len()
            }

            /// True if the set has no members.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                $map_expr(self).is_empty()
            }

            /// Whether `n` is a member of the set.
            #[must_use]
            pub fn contains(&self, n: i64) -> bool {
                segment_map::contains($map_expr(self), n)
            }

            /// Whether every integer in `[lo, hi]` is a member. An empty range (`lo > hi`)
            /// vacuously returns `true`.
            #[must_use]
            pub fn contains_all(&self, lo: i64, hi: i64) -> bool {
                segment_map::contains_all($map_expr(self), lo, hi)
            }

            /// Whether any integer in `[lo, hi]` is a member. An empty range (`lo > hi`) returns
            /// `false`.
            #[must_use]
            pub fn contains_any(&self, lo: i64, hi: i64) -> bool {
                segment_map::contains_any($map_expr(self), lo, hi)
            }

            /// Smallest member, or [`BitSetError::NotFound`] if the set is empty.
            pub fn first(&self) -> Result<i64, BitSetError> {
                self.first_opt().ok_or(BitSetError::NotFound)
            }

            /// Smallest member, or `None` if the set is empty.
            #[must_use]
            pub fn first_opt(&self) -> Option<i64> {
                segment_map::first($map_expr(self))
            }

            /// Largest member, or [`BitSetError::NotFound`] if the set is empty.
            pub fn last(&self) -> Result<i64, BitSetError> {
                self.last_opt().ok_or(BitSetError::NotFound)
            }

            /// Largest member, or `None` if the set is empty.
            #[must_use]
            pub fn last_opt(&self) -> Option<i64> {
                segment_map::last($map_expr(self))
            }

            /// Smallest member `>= from`, or [`BitSetError::NotFound`] if none exists.
            pub fn next(&self, from: i64) -> Result<i64, BitSetError> {
                self.next_opt(from).ok_or(BitSetError::NotFound)
            }

            /// Smallest member `>= from`, or `None` if none exists.
            #[must_use]
            pub fn next_opt(&self, from: i64) -> Option<i64> {
                segment_map::next($map_expr(self), from)
            }

            /// Largest member `<= from`, or [`BitSetError::NotFound`] if none exists.
            pub fn previous(&self, from: i64) -> Result<i64, BitSetError> {
                self.previous_opt(from).ok_or(BitSetError::NotFound)
            }

            /// Largest member `<= from`, or `None` if none exists.
            #[must_use]
            pub fn previous_opt(&self, from: i64) -> Option<i64> {
                segment_map::previous($map_expr(self), from)
            }

            /// Smallest non-member `>= from`, or [`BitSetError::NotFound`] if `from..=i64::MAX`
            /// is entirely contained in the set.
            pub fn next_absent(&self, from: i64) -> Result<i64, BitSetError> {
                self.next_absent_opt(from).ok_or(BitSetError::NotFound)
            }

            /// Smallest non-member `>= from`, or `None` if `from..=i64::MAX` is entirely
            /// contained in the set.
            #[must_use]
            pub fn next_absent_opt(&self, from: i64) -> Option<i64> {
                segment_map::next_absent($map_expr(self), from)
            }

            /// Largest non-member `<= from`, or [`BitSetError::NotFound`] if `i64::MIN..=from`
            /// is entirely contained in the set.
            pub fn previous_absent(&self, from: i64) -> Result<i64, BitSetError> {
                self.previous_absent_opt(from).ok_or(BitSetError::NotFound)
            }

            /// Largest non-member `<= from`, or `None` if `i64::MIN..=from` is entirely
            /// contained in the set.
            #[must_use]
            pub fn previous_absent_opt(&self, from: i64) -> Option<i64> {
                segment_map::previous_absent($map_expr(self), from)
            }

            /// Whether [`Self::next`] would succeed for `from`.
            #[must_use]
            pub fn has_next(&self, from: i64) -> bool {
                self.next_opt(from).is_some()
            }

            /// Whether [`Self::previous`] would succeed for `from`.
            #[must_use]
            pub fn has_previous(&self, from: i64) -> bool {
                self.previous_opt(from).is_some()
            }

            /// Visit every stored segment in ascending order of start.
            pub fn for_each_range(&self, action: impl FnMut(i64, i64)) {
                segment_map::for_each_range($map_expr(self), action);
            }

            /// Visit every maximal gap inside `[lo, hi]`, in ascending order.
            pub fn for_each_absent_range(&self, lo: i64, hi: i64, action: impl FnMut(i64, i64)) {
                segment_map::for_each_absent_range($map_expr(self), lo, hi, action);
            }

            /// The subset of this set's members that fall inside `[lo, hi]`, as an independent
            /// set. An empty range (`lo > hi`) yields an empty set.
            #[must_use]
            pub fn subset(&self, lo: i64, hi: i64) -> MutableSegmentedBitSet {
                MutableSegmentedBitSet {
                    segments: segment_map::subset($map_expr(self), lo, hi),
                }
            }

            /// Union with `other`, as a new independent set.
            #[must_use]
            pub fn union(&self, other: &impl SegmentView) -> MutableSegmentedBitSet {
                MutableSegmentedBitSet {
                    segments: segment_map::union($map_expr(self), other.segments()),
                }
            }

            /// Intersection with `other`, as a new independent set.
            #[must_use]
            pub fn intersect(&self, other: &impl SegmentView) -> MutableSegmentedBitSet {
                MutableSegmentedBitSet {
                    segments: segment_map::intersect($map_expr(self), other.segments()),
                }
            }

            /// Symmetric difference with `other`, as a new independent set.
            #[must_use]
            pub fn xor(&self, other: &impl SegmentView) -> MutableSegmentedBitSet {
                MutableSegmentedBitSet {
                    segments: segment_map::xor($map_expr(self), other.segments()),
                }
            }

            /// Alias for [`Self::intersect`].
            #[must_use]
            pub fn and(&self, other: &impl SegmentView) -> MutableSegmentedBitSet {
                self.intersect(other)
            }

            /// Alias for [`Self::union`].
            #[must_use]
            pub fn or(&self, other: &impl SegmentView) -> MutableSegmentedBitSet {
                self.union(other)
            }

            /// Every member shifted up by `amount` (down, if `amount` is negative), as a new
            /// independent set.
            ///
            /// Overflowing a shifted endpoint past `i64::MAX`/`i64::MIN` is the caller's
            /// responsibility to avoid; this wraps rather than panicking.
            #[must_use]
            pub fn right_shifted(&self, amount: i64) -> MutableSegmentedBitSet {
                MutableSegmentedBitSet {
                    segments: segment_map::right_shift($map_expr(self), amount),
                }
            }

            /// Every member shifted down by `amount` (up, if `amount` is negative), as a new
            /// independent set.
            #[must_use]
            pub fn left_shifted(&self, amount: i64) -> MutableSegmentedBitSet {
                MutableSegmentedBitSet {
                    segments: segment_map::left_shift($map_expr(self), amount),
                }
            }

            /// The complement of this set is not representable: it would have infinitely many
            /// segments over the unbounded domain. Use
            /// `set.subset(lo, hi).flip_all(lo, hi)` to get the complement within a bounded
            /// window instead.
            pub fn flipped(&self) -> Result<MutableSegmentedBitSet, BitSetError> {
                Err(BitSetError::Unsupported {
                    reason: "complement over the unbounded i64 domain; use subset(range).flip_all(range) instead",
                })
            }

            /// An independent mutable snapshot of this set.
            #[must_use]
            pub fn copy(&self) -> MutableSegmentedBitSet {
                MutableSegmentedBitSet {
                    segments: $map_expr(self).clone(),
                }
            }

            /// An independent read-only snapshot of this set.
            #[must_use]
            pub fn immutable_copy(&self) -> SegmentedBitSet {
                SegmentedBitSet {
                    segments: $map_expr(self).clone(),
                }
            }
        }
    };
}

/// Implemented by every read-only view over a segment map, so `union`/`intersect`/`xor` can
/// accept any of [`MutableSegmentedBitSet`], [`SegmentedBitSet`], or [`SegmentedBitSetView`] as
/// the other operand.
pub trait SegmentView {
    #[doc(hidden)]
    fn segments(&self) -> &Segments;
}

/// The owning, mutable coalesced segment set. See the module documentation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutableSegmentedBitSet {
    segments: Segments,
}

impl MutableSegmentedBitSet {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            segments: Segments::new(),
        }
    }

    /// Build a set from an explicit segment list, validating and canonicalizing order but
    /// rejecting overlapping, touching, or inverted (`start > end`) segments outright rather
    /// than silently merging them — callers that want merging should start from
    /// [`Self::new`] and call [`Self::add_all`] for each range instead.
    pub fn from_segments(mut segments: Vec<(i64, i64)>) -> Result<Self, BitSetError> {
        segments.sort_unstable_by_key(|&(start, _)| start);
        segment_map::validate(&segments)?;
        Ok(Self {
            segments: segments.into_iter().collect(),
        })
    }

    /// Add every integer in `[lo, hi]` to the set, coalescing with any touching or overlapping
    /// segments. An empty range (`lo > hi`) is a no-op.
    pub fn add_all(&mut self, lo: i64, hi: i64) {
        segment_map::add_all(&mut self.segments, lo, hi);
    }

    /// Remove every integer in `[lo, hi]` from the set, splitting any segment that straddles a
    /// boundary. An empty range (`lo > hi`) is a no-op.
    pub fn remove_all(&mut self, lo: i64, hi: i64) {
        segment_map::remove_all(&mut self.segments, lo, hi);
    }

    /// Toggle membership of every integer in `[lo, hi]`. An empty range (`lo > hi`) is a no-op.
    pub fn flip_all(&mut self, lo: i64, hi: i64) {
        segment_map::flip_all(&mut self.segments, lo, hi);
    }

    /// A read-only facade that borrows this set's backing storage: mutations made through
    /// `self` after this call are visible through the returned view.
    #[must_use]
    pub fn immutable_view(&self) -> SegmentedBitSetView<'_> {
        SegmentedBitSetView {
            segments: &self.segments,
        }
    }
}

impl SegmentView for MutableSegmentedBitSet {
    fn segments(&self) -> &Segments {
        &self.segments
    }
}

impl_read_ops!(MutableSegmentedBitSet, |s: &Self| &s.segments);

/// An independent, read-only snapshot of a segment set. See [`MutableSegmentedBitSet::immutable_copy`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentedBitSet {
    segments: Segments,
}

impl SegmentView for SegmentedBitSet {
    fn segments(&self) -> &Segments {
        &self.segments
    }
}

impl_read_ops!(SegmentedBitSet, |s: &Self| &s.segments);

/// A read-only facade borrowing another set's backing storage. See
/// [`MutableSegmentedBitSet::immutable_view`].
#[derive(Debug, Clone, Copy)]
pub struct SegmentedBitSetView<'a> {
    segments: &'a Segments,
}

impl SegmentView for SegmentedBitSetView<'_> {
    fn segments(&self) -> &Segments {
        self.segments
    }
}

impl_read_ops!(SegmentedBitSetView<'_>, |s: &Self| s.segments);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_coalesce() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(0, 1);
        set.add_all(4, 5);
        assert_eq!(set.segment_count(), 2);
        set.add_all(2, 3);
        assert_eq!(set.segment_count(), 1);
        assert!(set.contains_all(0, 5));
        assert_eq!(set.size(), 6);
    }

    #[test]
    fn s2_xor() {
        let mut a = MutableSegmentedBitSet::new();
        a.add_all(0, 4);
        let mut b = MutableSegmentedBitSet::new();
        b.add_all(3, 7);

        let x = a.xor(&b);
        assert_eq!(x.size(), 6);
        assert_eq!(x.segment_count(), 2);
        assert!(x.contains_all(0, 2));
        assert!(x.contains_all(5, 7));
        assert!(!x.contains(3));
        assert!(!x.contains(4));
    }

    #[test]
    fn s3_absent_navigation() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(10, 20);
        set.add_all(40, 50);

        assert_eq!(set.previous_absent_opt(20), Some(9));
        assert_eq!(set.next_absent_opt(20), Some(21));
        assert_eq!(set.previous_absent_opt(9), Some(9));
        assert!(!set.has_previous(0));
    }

    #[test]
    fn empty_set_navigation_fails() {
        let set = MutableSegmentedBitSet::new();
        assert_eq!(set.first(), Err(BitSetError::NotFound));
        assert_eq!(set.last(), Err(BitSetError::NotFound));
        assert!(!set.has_next(0));
        assert!(!set.has_previous(0));
    }

    #[test]
    fn flipped_is_unsupported() {
        let set = MutableSegmentedBitSet::new();
        assert!(matches!(set.flipped(), Err(BitSetError::Unsupported { .. })));
    }

    #[test]
    fn subset_and_flip_all_workaround() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(0, 9);
        set.remove_all(3, 5);

        let mut window = set.subset(2, 7);
        window.flip_all(2, 7);
        // Complement, within [2,7], of {2,6,7} present -> {3,4,5} should now be present and
        // 2,6,7 absent.
        assert!(window.contains_all(3, 5));
        assert!(!window.contains(2));
        assert!(!window.contains(6));
        assert!(!window.contains(7));
    }

    #[test]
    fn immutable_view_sees_later_mutation() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(0, 10);
        let view = set.immutable_view();
        assert!(view.contains(5));
        drop(view);

        set.remove_all(5, 5);
        let view = set.immutable_view();
        assert!(!view.contains(5));
    }

    #[test]
    fn immutable_copy_is_independent() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(0, 10);
        let snapshot = set.immutable_copy();
        set.remove_all(0, 10);
        assert!(snapshot.contains(5));
        assert!(!set.contains(5));
    }

    #[test]
    fn from_segments_rejects_adjacent() {
        let err = MutableSegmentedBitSet::from_segments(vec![(0, 4), (5, 9)]).unwrap_err();
        assert!(matches!(err, BitSetError::OverlappingSegments { .. }));
    }

    #[test]
    fn from_segments_rejects_inverted() {
        let err = MutableSegmentedBitSet::from_segments(vec![(5, 0)]).unwrap_err();
        assert!(matches!(err, BitSetError::InvalidSegment { .. }));
    }

    #[test]
    fn for_each_absent_range_visits_maximal_gaps() {
        let mut set = MutableSegmentedBitSet::new();
        set.add_all(10, 20);
        set.add_all(40, 50);

        let mut gaps = Vec::new();
        set.for_each_absent_range(0, 60, |lo, hi| gaps.push((lo, hi)));
        assert_eq!(gaps, vec![(0, 9), (21, 39), (51, 60)]);
    }
}
