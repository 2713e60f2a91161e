/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Masked traversal.
//!
//! [`MaskedCursor`] decorates a cursor kind so that it visits only the
//! positions of a region where a mask grid is non-zero. It owns two
//! cursors of the same kind, one over the data grid and one over the
//! mask grid, both bound to the same region, and moves them in
//! lockstep:
//!
//! ```text
//!   data  ──▶ d0 d1 d2 d3 d4 d5 ...
//!   mask  ──▶  0  1  0  0  1  1 ...
//!                 ▲        ▲  ▲      visited
//! ```
//!
//! After every movement that does not end the traversal, both
//! cursors report the same position and the mask is non-zero there.
//!
//! # Begin
//!
//! The first visited position may be arbitrarily far from where the
//! underlying cursors begin, so the adapter does not trust their own
//! notion of begin. It resolves the ordinal of the first included
//! step itself (on a scratch copy of the mask cursor, the first time
//! it is needed) and [`MaskedCursor::is_at_begin`] compares against
//! that. Ordinals, unlike positions, stay exact for kinds that may
//! revisit a position.
//!
//! # Example
//!
//! ```
//! use ndmask::Grid;
//! use ndmask::Image;
//! use ndmask::Linear;
//! use ndmask::MaskedCursor;
//! use ndmask::Point;
//!
//! let mask = Image::from_fn([2, 3], |p| u8::from(p[1] != 1)).unwrap();
//! let data = Image::from_fn([2, 3], |p| p[0] * 3 + p[1]).unwrap();
//! let region = mask.region().unwrap();
//!
//! let mut it = MaskedCursor::<Linear, _, _>::new(&mask, &data, &region).unwrap();
//! let visited: Vec<Point> = it.positions().collect();
//! assert_eq!(visited, vec![[0, 0].into(), [0, 2].into(), [1, 0].into(), [1, 2].into()]);
//! ```

use std::cell::OnceCell;
use std::fmt;

use num_traits::Zero;

use crate::Point;
use crate::Region;
use crate::cursor::CursorError;
use crate::cursor::CursorKind;
use crate::cursor::GridCursor;
use crate::cursor::ReverseCursor;
use crate::grid::Grid;
use crate::grid::GridMut;

/// A cursor visiting exactly the positions of a region where a mask
/// is non-zero, forward and (for reversible kinds) backward.
///
/// `K` is the cursor kind, `D` the data grid handle, and `M` the mask
/// grid handle. The adapter is bound once, at construction, and is
/// not rebindable.
pub struct MaskedCursor<K: CursorKind, D: Grid, M: Grid> {
    data: K::Cursor<D>,
    mask: K::Cursor<M>,
    // Ordinal of the first included step; `None` for an empty
    // traversal.
    begin: OnceCell<Option<usize>>,
}

impl<K, D, M> MaskedCursor<K, D, M>
where
    K: CursorKind,
    D: Grid,
    M: Grid,
    M::Value: Zero,
    K::Cursor<M>: Clone,
{
    /// Bind a masked cursor over `region` of `data`, skipping the
    /// positions where `mask` is zero.
    ///
    /// The region is authoritative: neither grid is read outside it,
    /// but both must cover it. Call [`MaskedCursor::go_to_begin`] or
    /// [`MaskedCursor::go_to_end`] before reading a position.
    ///
    /// Pass the mask as a borrowed handle (`&G`). Resolving begin and
    /// [`MaskedCursor::count_included`] clone the mask cursor, and a
    /// cursor over an owned grid clones the whole grid with it.
    pub fn new(mask: M, data: D, region: &Region) -> Result<Self, CursorError> {
        let data = <K::Cursor<D> as GridCursor>::bind(data, region)?;
        let mask = <K::Cursor<M> as GridCursor>::bind(mask, region)?;
        debug_assert_eq!(data.len(), mask.len(), "cursors of one kind disagree");
        tracing::debug!(
            kind = K::NAME,
            %region,
            steps = data.len(),
            "bound masked cursor"
        );
        Ok(Self {
            data,
            mask,
            begin: OnceCell::new(),
        })
    }

    /// Move to the first position with a non-zero mask, or to the end
    /// if there is none.
    pub fn go_to_begin(&mut self) {
        self.data.go_to_begin();
        self.mask.go_to_begin();
        let skipped = self.skip_forward();
        let first = (!self.is_at_end()).then(|| self.data.ordinal());
        let cached = *self.begin.get_or_init(|| first);
        debug_assert_eq!(cached, first, "begin moved");
        if skipped > 0 {
            tracing::trace!(kind = K::NAME, skipped, "skipped masked prefix");
        }
    }

    /// Move past the last position.
    pub fn go_to_end(&mut self) {
        self.data.go_to_end();
        self.mask.go_to_end();
    }

    /// Move to the next position with a non-zero mask, or to the end.
    ///
    /// Fails with [`CursorError::PastEnd`], without moving, when
    /// already at end.
    pub fn advance(&mut self) -> Result<(), CursorError> {
        if self.is_at_end() {
            tracing::debug!(kind = K::NAME, "advance past end rejected");
            return Err(CursorError::PastEnd);
        }
        self.step_forward();
        self.skip_forward();
        Ok(())
    }

    /// Whether the traversal is past its last position.
    pub fn is_at_end(&self) -> bool {
        self.data.is_at_end()
    }

    /// Whether the cursor is on the first position that
    /// [`MaskedCursor::go_to_begin`] would produce. Never true for an
    /// empty traversal.
    pub fn is_at_begin(&self) -> bool {
        match self.begin_ordinal() {
            Some(begin) => !self.is_at_end() && self.data.ordinal() == begin,
            None => false,
        }
    }

    /// Whether no position of the region passes the mask.
    pub fn is_empty(&self) -> bool {
        self.begin_ordinal().is_none()
    }

    /// The number of steps of a full traversal, without moving.
    pub fn count_included(&self) -> usize {
        let mut probe = self.mask.clone();
        probe.go_to_begin();
        let mut count = 0;
        while !probe.is_at_end() {
            if !probe.value_is_zero() {
                count += 1;
            }
            probe.advance();
        }
        count
    }

    /// The current position, shared by both cursors; `None` at end.
    pub fn position(&self) -> Option<&Point> {
        self.data.position()
    }

    /// The region being traversed.
    pub fn region(&self) -> &Region {
        self.data.region()
    }

    /// The cursor over the data grid.
    pub fn data_cursor(&self) -> &K::Cursor<D> {
        &self.data
    }

    /// The cursor over the mask grid.
    pub fn mask_cursor(&self) -> &K::Cursor<M> {
        &self.mask
    }

    /// The data value at the current position.
    pub fn value(&self) -> Option<&D::Value> {
        self.data.value()
    }

    /// Mutable access to the data value at the current position.
    pub fn value_mut(&mut self) -> Option<&mut D::Value>
    where
        D: GridMut,
    {
        self.data.value_mut()
    }

    /// Apply `f` to the data value at every visited position, from
    /// begin to end. Returns the number of positions visited; the
    /// cursor is left at end.
    pub fn for_each_value_mut(&mut self, mut f: impl FnMut(&Point, &mut D::Value)) -> usize
    where
        D: GridMut,
    {
        let mut visited = 0;
        self.go_to_begin();
        while let Some(point) = self.data.position().cloned() {
            if let Some(value) = self.data.value_mut() {
                f(&point, value);
            }
            visited += 1;
            self.step_forward();
            self.skip_forward();
        }
        visited
    }

    /// Iterate over the visited positions, from begin to end.
    pub fn positions(&mut self) -> MaskedPositions<'_, K, D, M> {
        self.go_to_begin();
        MaskedPositions { cursor: self }
    }

    fn begin_ordinal(&self) -> Option<usize> {
        *self.begin.get_or_init(|| {
            let mut probe = self.mask.clone();
            probe.go_to_begin();
            while !probe.is_at_end() && probe.value_is_zero() {
                probe.advance();
            }
            (!probe.is_at_end()).then(|| probe.ordinal())
        })
    }

    fn step_forward(&mut self) {
        self.data.advance();
        self.mask.advance();
        self.check_sync();
    }

    fn skip_forward(&mut self) -> usize {
        let mut skipped = 0;
        while !self.data.is_at_end() && self.mask.value_is_zero() {
            self.step_forward();
            skipped += 1;
        }
        skipped
    }

    fn check_sync(&self) {
        debug_assert_eq!(
            self.data.position(),
            self.mask.position(),
            "data and mask cursors out of step"
        );
    }
}

impl<K, D, M> MaskedCursor<K, D, M>
where
    K: CursorKind,
    D: Grid,
    M: Grid,
    M::Value: Zero,
    K::Cursor<M>: Clone + ReverseCursor,
    K::Cursor<D>: ReverseCursor,
{
    /// Move to the previous position with a non-zero mask. From the
    /// end this is the last visited position.
    ///
    /// Fails with [`CursorError::BeforeBegin`], without moving, when
    /// already at begin or when the traversal is empty.
    pub fn retreat(&mut self) -> Result<(), CursorError> {
        if self.is_empty() || self.is_at_begin() {
            tracing::debug!(kind = K::NAME, "retreat before begin rejected");
            return Err(CursorError::BeforeBegin);
        }
        self.step_backward();
        while !self.is_at_begin() && self.mask.value_is_zero() && self.data.ordinal() > 0 {
            self.step_backward();
        }
        Ok(())
    }

    /// Iterate over the visited positions, from the last back to
    /// begin.
    pub fn positions_rev(&mut self) -> MaskedPositionsRev<'_, K, D, M> {
        self.go_to_end();
        MaskedPositionsRev {
            cursor: self,
            done: false,
        }
    }

    fn step_backward(&mut self) {
        self.data.retreat();
        self.mask.retreat();
        self.check_sync();
    }
}

impl<K: CursorKind, D: Grid, M: Grid> fmt::Debug for MaskedCursor<K, D, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskedCursor")
            .field("kind", &K::NAME)
            .field("region", self.data.region())
            .field("position", &self.data.position())
            .field("begin", &self.begin.get())
            .finish()
    }
}

/// Forward iterator over the positions of a [`MaskedCursor`].
pub struct MaskedPositions<'a, K: CursorKind, D: Grid, M: Grid> {
    cursor: &'a mut MaskedCursor<K, D, M>,
}

impl<K, D, M> Iterator for MaskedPositions<'_, K, D, M>
where
    K: CursorKind,
    D: Grid,
    M: Grid,
    M::Value: Zero,
    K::Cursor<M>: Clone,
{
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let point = self.cursor.position().cloned()?;
        self.cursor.advance().ok()?;
        Some(point)
    }
}

/// Reverse iterator over the positions of a [`MaskedCursor`].
pub struct MaskedPositionsRev<'a, K: CursorKind, D: Grid, M: Grid> {
    cursor: &'a mut MaskedCursor<K, D, M>,
    done: bool,
}

impl<K, D, M> Iterator for MaskedPositionsRev<'_, K, D, M>
where
    K: CursorKind,
    D: Grid,
    M: Grid,
    M::Value: Zero,
    K::Cursor<M>: Clone + ReverseCursor,
    K::Cursor<D>: ReverseCursor,
{
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done || self.cursor.retreat().is_err() {
            self.done = true;
            return None;
        }
        self.done = self.cursor.is_at_begin();
        self.cursor.position().cloned()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use tracing_test::traced_test;

    use super::*;
    use crate::cursor::Linear;
    use crate::cursor::RandomPermutation;
    use crate::cursor::RandomSample;
    use crate::cursor::Scanline;
    use crate::cursor::Sequential;
    use crate::cursor::Subsampled;
    use crate::grid::Image;
    use crate::strategy::gen_masked_case;

    type Mask = Image<u8>;
    type Data = Image<f32>;

    fn data_for(mask: &Mask) -> Data {
        Image::from_fn(mask.sizes(), |p| p.iter().sum::<usize>() as f32).unwrap()
    }

    /// The positions an undecorated cursor visits where the mask is
    /// non-zero.
    fn expected<'a, K: CursorKind>(mask: &'a Mask, data: &'a Data, region: &Region) -> Vec<Point> {
        let mut plain = <K::Cursor<&'a Data> as GridCursor>::bind(data, region).unwrap();
        let mut out = Vec::new();
        plain.go_to_begin();
        while let Some(p) = plain.position() {
            if mask.get(p).is_some_and(|v| *v != 0) {
                out.push(p.clone());
            }
            plain.advance();
        }
        out
    }

    fn check_forward<'a, K: CursorKind>(
        mask: &'a Mask,
        data: &'a Data,
        region: &Region,
    ) -> Result<Vec<Point>, TestCaseError>
    where
        K::Cursor<&'a Mask>: Clone,
    {
        let want = expected::<K>(mask, data, region);
        let mut it = MaskedCursor::<K, _, _>::new(mask, data, region).unwrap();

        it.go_to_begin();
        let first = it.position().cloned();
        prop_assert_eq!(it.is_at_begin(), !want.is_empty());
        it.go_to_begin();
        prop_assert_eq!(it.position().cloned(), first);

        let mut got = Vec::new();
        while !it.is_at_end() {
            let p = it.position().unwrap().clone();
            prop_assert_eq!(it.data_cursor().position(), Some(&p));
            prop_assert_eq!(it.mask_cursor().position(), Some(&p));
            prop_assert!(!it.mask_cursor().value_is_zero());
            prop_assert_eq!(it.is_at_begin(), got.is_empty());
            got.push(p);
            it.advance().unwrap();
        }
        prop_assert!(matches!(it.advance(), Err(CursorError::PastEnd)));
        prop_assert!(it.is_at_end());
        prop_assert_eq!(&got, &want);
        prop_assert_eq!(it.count_included(), want.len());
        prop_assert_eq!(it.is_empty(), want.is_empty());
        Ok(got)
    }

    fn check_reverse<'a, K: CursorKind>(
        mask: &'a Mask,
        data: &'a Data,
        region: &Region,
    ) -> Result<(), TestCaseError>
    where
        K::Cursor<&'a Mask>: Clone + ReverseCursor,
        K::Cursor<&'a Data>: ReverseCursor,
    {
        let mut forward = check_forward::<K>(mask, data, region)?;
        forward.reverse();

        let mut it = MaskedCursor::<K, _, _>::new(mask, data, region).unwrap();
        it.go_to_end();
        prop_assert!(it.is_at_end());

        let mut got = Vec::new();
        while it.retreat().is_ok() {
            prop_assert!(!it.is_at_end());
            prop_assert!(!it.mask_cursor().value_is_zero());
            prop_assert_eq!(it.data_cursor().position(), it.mask_cursor().position());
            got.push(it.position().unwrap().clone());
        }
        prop_assert_eq!(&got, &forward);
        if !forward.is_empty() {
            prop_assert!(it.is_at_begin());
        }

        let collected: Vec<Point> = it.positions_rev().collect();
        prop_assert_eq!(&collected, &forward);
        Ok(())
    }

    proptest! {
        #[test]
        fn linear_traversal((mask, region) in gen_masked_case(3, 6)) {
            let data = data_for(&mask);
            check_reverse::<Linear>(&mask, &data, &region)?;
        }

        #[test]
        fn sequential_traversal((mask, region) in gen_masked_case(3, 6)) {
            let data = data_for(&mask);
            check_forward::<Sequential>(&mask, &data, &region)?;
        }

        #[test]
        fn scanline_traversal((mask, region) in gen_masked_case(3, 6)) {
            let data = data_for(&mask);
            check_reverse::<Scanline>(&mask, &data, &region)?;
        }

        #[test]
        fn subsampled_traversal((mask, region) in gen_masked_case(3, 7)) {
            let data = data_for(&mask);
            check_reverse::<Subsampled<2>>(&mask, &data, &region)?;
            check_reverse::<Subsampled<3>>(&mask, &data, &region)?;
        }

        #[test]
        fn random_sample_traversal((mask, region) in gen_masked_case(2, 6)) {
            let data = data_for(&mask);
            check_reverse::<RandomSample>(&mask, &data, &region)?;
        }

        #[test]
        fn random_permutation_traversal((mask, region) in gen_masked_case(2, 6)) {
            let data = data_for(&mask);
            check_reverse::<RandomPermutation>(&mask, &data, &region)?;
        }
    }

    #[test]
    fn test_every_other_cell() {
        let mask = Image::from_fn([10, 10], |p| u8::from((p[0] * 10 + p[1]) % 2 == 0)).unwrap();
        let data = Image::new([10, 10], 10.0f64);
        let region = data.region().unwrap();
        let mut it = MaskedCursor::<Sequential, _, _>::new(&mask, &data, &region).unwrap();

        it.go_to_begin();
        assert_eq!(it.position(), Some(&Point::from([0, 0])));
        for i in 1..50 {
            it.advance().unwrap();
            let cell = 2 * i;
            assert_eq!(it.position(), Some(&Point::from([cell / 10, cell % 10])));
        }
        it.advance().unwrap();
        assert!(it.is_at_end());
    }

    #[test]
    fn test_write_through_masked_positions() {
        let mask = Image::from_fn([4, 4], |p| u8::from(p[0] == p[1])).unwrap();
        let mut data = Image::new([4, 4], 1.0f64);
        let region = Region::new([1, 0], vec![3, 4]).unwrap();
        {
            let mut it = MaskedCursor::<Linear, _, _>::new(&mask, &mut data, &region).unwrap();
            let visited = it.for_each_value_mut(|_, v| *v *= 0.5);
            assert_eq!(visited, 3);
            assert!(it.is_at_end());

            it.go_to_end();
            it.retreat().unwrap();
            assert_eq!(it.position(), Some(&Point::from([3, 3])));
            *it.value_mut().unwrap() = 7.0;
            assert_eq!(it.value(), Some(&7.0));
        }
        assert_eq!(data.get(&[0, 0]), Some(&1.0));
        assert_eq!(data.get(&[1, 1]), Some(&0.5));
        assert_eq!(data.get(&[2, 2]), Some(&0.5));
        assert_eq!(data.get(&[3, 3]), Some(&7.0));
        assert_eq!(data.get(&[1, 2]), Some(&1.0));
    }

    #[test]
    fn test_begin_resolved_lazily() {
        let mut mask = Image::new([3, 3], 0u8);
        mask.set(&[2, 1], 1);
        mask.set(&[2, 2], 1);
        let data = Image::new([3, 3], 0.0f32);
        let region = mask.region().unwrap();
        let mut it = MaskedCursor::<Linear, _, _>::new(&mask, &data, &region).unwrap();

        it.go_to_end();
        assert!(!it.is_at_begin());
        it.retreat().unwrap();
        assert_eq!(it.position(), Some(&Point::from([2, 2])));
        assert!(!it.is_at_begin());
        it.retreat().unwrap();
        assert_eq!(it.position(), Some(&Point::from([2, 1])));
        assert!(it.is_at_begin());
        assert!(matches!(it.retreat(), Err(CursorError::BeforeBegin)));
        assert_eq!(it.position(), Some(&Point::from([2, 1])));
    }

    #[test]
    fn test_empty_traversal() {
        let mask = Image::new([10, 10], 0u8);
        let data = Image::new([10, 10], 10.0f32);
        let region = mask.region().unwrap();
        let mut it = MaskedCursor::<Scanline, _, _>::new(&mask, &data, &region).unwrap();

        it.go_to_begin();
        assert!(it.is_at_end());
        assert!(!it.is_at_begin());
        assert!(it.is_empty());
        assert_eq!(it.position(), None);
        assert!(matches!(it.advance(), Err(CursorError::PastEnd)));
        it.go_to_end();
        assert!(matches!(it.retreat(), Err(CursorError::BeforeBegin)));
        assert!(it.is_at_end());
        assert_eq!(it.positions().count(), 0);
        assert_eq!(it.positions_rev().count(), 0);
    }

    #[test]
    fn test_rejects_region_outside_grids() {
        let mask = Image::new([100, 100], 0u8);
        let data = Image::new([9, 9], 0.0f32);
        let region = Region::from_sizes(vec![10, 10]).unwrap();
        let err = MaskedCursor::<Linear, _, _>::new(&mask, &data, &region).unwrap_err();
        assert!(matches!(err, CursorError::RegionError(_)));
    }

    #[traced_test]
    #[test]
    fn test_logs_binding() {
        let mask = Image::new([2, 2], 1u8);
        let data = Image::new([2, 2], 0u8);
        let region = mask.region().unwrap();
        let mut it = MaskedCursor::<Linear, _, _>::new(&mask, &data, &region).unwrap();
        it.go_to_end();
        let _ = it.advance();
        assert!(logs_contain("bound masked cursor"));
        assert!(logs_contain("advance past end rejected"));
        assert!(format!("{:?}", it).contains("linear"));
    }
}
