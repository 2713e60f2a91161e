/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::iter::zip;

use itertools::izip;
use serde::Deserialize;
use serde::Serialize;

use crate::Point;

/// The type of error for region operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum RegionError {
    #[error("invalid dims: expected {expected}, got {got}")]
    InvalidDims { expected: usize, got: usize },

    #[error("a region needs at least one dimension")]
    NoDims,

    #[error("region starting at {start} with sizes {sizes:?} overflows")]
    Overflow { start: Point, sizes: Vec<usize> },

    #[error("index {index} out of range {total}")]
    IndexOutOfRange { index: usize, total: usize },

    #[error("point {point} not in region {region}")]
    PointNotInRegion { point: Point, region: Region },

    #[error("region {region} does not fit in extent {sizes:?}")]
    NotContained { region: Region, sizes: Vec<usize> },
}

/// A rectangular index range over an N-dimensional grid.
///
/// A region is a start point together with a size per axis, and
/// covers the half-open range `[start, start + size)` on every axis.
/// A zero size on any axis makes the region empty.
///
/// Regions are linearised in row-major order: the last axis varies
/// fastest, so linear index `i` and [`Point`] order agree.
///
/// ```
/// # use ndmask::Region;
/// let r = Region::new([1, 2], vec![2, 3]).unwrap();
/// assert_eq!(r.len(), 6);
/// assert_eq!(r.point_at(4).unwrap(), [2, 3].into());
/// assert_eq!(r.index_of(&[2, 3]).unwrap(), 4);
/// ```
#[derive(Serialize, Deserialize, Clone, PartialEq, Eq, Hash, Debug)]
#[serde(try_from = "RawRegion")]
pub struct Region {
    start: Point,
    sizes: Vec<usize>,
}

#[derive(Deserialize)]
struct RawRegion {
    start: Point,
    sizes: Vec<usize>,
}

impl TryFrom<RawRegion> for Region {
    type Error = RegionError;

    fn try_from(raw: RawRegion) -> Result<Self, Self::Error> {
        Region::new(raw.start, raw.sizes)
    }
}

impl Region {
    /// Create a new region from its start point and per-axis sizes.
    /// The two must have the same, nonzero, number of dimensions, and
    /// `start + size` must be representable on every axis, as must
    /// the number of points.
    pub fn new(start: impl Into<Point>, sizes: Vec<usize>) -> Result<Self, RegionError> {
        let start = start.into();
        if start.num_dim() != sizes.len() {
            return Err(RegionError::InvalidDims {
                expected: sizes.len(),
                got: start.num_dim(),
            });
        }
        if sizes.is_empty() {
            return Err(RegionError::NoDims);
        }
        if zip(start.iter(), &sizes).any(|(s, n)| s.checked_add(*n).is_none())
            || (!sizes.contains(&0)
                && sizes
                    .iter()
                    .try_fold(1usize, |acc, n| acc.checked_mul(*n))
                    .is_none())
        {
            return Err(RegionError::Overflow { start, sizes });
        }
        Ok(Self { start, sizes })
    }

    /// The region covering a whole grid of the given sizes, anchored
    /// at the origin.
    pub fn from_sizes(sizes: impl Into<Vec<usize>>) -> Result<Self, RegionError> {
        let sizes = sizes.into();
        Self::new(Point::origin(sizes.len()), sizes)
    }

    /// The number of dimensions in this region.
    pub fn num_dim(&self) -> usize {
        self.sizes.len()
    }

    /// The first corner of the region.
    pub fn start(&self) -> &Point {
        &self.start
    }

    /// The size of each dimension.
    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// The exclusive far corner, `start + sizes`.
    pub fn end(&self) -> Point {
        zip(self.start.iter(), &self.sizes)
            .map(|(s, n)| s + n)
            .collect::<Vec<_>>()
            .into()
    }

    /// The number of points in the region.
    pub fn len(&self) -> usize {
        self.sizes.iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.contains(&0)
    }

    /// Whether `point` lies in `[start, start + size)` on every axis.
    pub fn contains(&self, point: &[usize]) -> bool {
        point.len() == self.num_dim()
            && izip!(point, self.start.iter(), &self.sizes).all(|(p, s, n)| p >= s && p - s < *n)
    }

    /// The first point in row-major order, if any.
    pub fn first(&self) -> Option<Point> {
        (!self.is_empty()).then(|| self.start.clone())
    }

    /// The last point in row-major order, if any.
    pub fn last(&self) -> Option<Point> {
        if self.is_empty() {
            return None;
        }
        Some(
            zip(self.start.iter(), &self.sizes)
                .map(|(s, n)| s + n - 1)
                .collect::<Vec<_>>()
                .into(),
        )
    }

    /// The row-major index of `point` within this region.
    pub fn index_of(&self, point: &[usize]) -> Result<usize, RegionError> {
        if point.len() != self.num_dim() {
            return Err(RegionError::InvalidDims {
                expected: self.num_dim(),
                got: point.len(),
            });
        }
        if !self.contains(point) {
            return Err(RegionError::PointNotInRegion {
                point: point.into(),
                region: self.clone(),
            });
        }
        let mut stride = 1;
        let mut index = 0;
        for (p, s, n) in izip!(point, self.start.iter(), &self.sizes).rev() {
            index += (p - s) * stride;
            stride *= n;
        }
        Ok(index)
    }

    /// The point at row-major `index` within this region. This is the
    /// inverse of [`Region::index_of`].
    pub fn point_at(&self, index: usize) -> Result<Point, RegionError> {
        let total = self.len();
        if index >= total {
            return Err(RegionError::IndexOutOfRange { index, total });
        }
        let mut point = self.start.clone();
        self.decode_into(index, &mut point);
        Ok(point)
    }

    /// Overwrite `out` with the point at row-major `index`. The index
    /// must be in range.
    pub(crate) fn decode_into(&self, index: usize, out: &mut Point) {
        debug_assert!(index < self.len(), "index {} out of range", index);
        let coords = out.coords_mut();
        let mut rest = index;
        for (c, s, n) in izip!(coords.iter_mut(), self.start.iter(), &self.sizes).rev() {
            *c = s + rest % n;
            rest /= n;
        }
    }

    /// Move `point` to its row-major successor. Returns false, leaving
    /// the point at [`Region::first`], when it was the last point.
    pub(crate) fn step_forward(&self, point: &mut Point) -> bool {
        for (c, s, n) in izip!(point.coords_mut().iter_mut(), self.start.iter(), &self.sizes).rev()
        {
            *c += 1;
            if *c < s + n {
                return true;
            }
            *c = *s;
        }
        false
    }

    /// Move `point` to its row-major predecessor. Returns false, leaving
    /// the point at [`Region::last`], when it was the first point.
    pub(crate) fn step_backward(&self, point: &mut Point) -> bool {
        for (c, s, n) in izip!(point.coords_mut().iter_mut(), self.start.iter(), &self.sizes).rev()
        {
            if *c > *s {
                *c -= 1;
                return true;
            }
            *c = s + n - 1;
        }
        false
    }

    /// The overlap of two regions of the same rank, or `None` when they
    /// do not overlap.
    pub fn intersection(&self, other: &Region) -> Option<Region> {
        if self.num_dim() != other.num_dim() {
            return None;
        }
        let mut start = Vec::with_capacity(self.num_dim());
        let mut sizes = Vec::with_capacity(self.num_dim());
        let (self_end, other_end) = (self.end(), other.end());
        for (a, b, a_end, b_end) in izip!(
            self.start.iter(),
            other.start.iter(),
            self_end.iter(),
            other_end.iter()
        ) {
            let lo = *a.max(b);
            let hi = *a_end.min(b_end);
            if hi <= lo {
                return None;
            }
            start.push(lo);
            sizes.push(hi - lo);
        }
        Some(Region {
            start: start.into(),
            sizes,
        })
    }

    /// Whether every point of this region is addressable in a grid of
    /// the given extent. Empty regions fit anywhere of matching rank.
    pub fn is_within(&self, sizes: &[usize]) -> bool {
        sizes.len() == self.num_dim()
            && (self.is_empty()
                || izip!(self.start.iter(), &self.sizes, sizes).all(|(s, n, max)| s + n <= *max))
    }

    /// Ensures that every point of `self` is addressable in a grid of
    /// the given extent.
    ///
    /// Returns `self` on success, enabling fluent chaining.
    ///
    /// ```
    /// # use ndmask::Region;
    /// let r = Region::new([1, 1], vec![8, 8]).unwrap();
    /// assert!(r.enforce_within(&[9, 9]).is_ok());
    /// assert!(r.enforce_within(&[8, 9]).is_err());
    /// ```
    pub fn enforce_within(&self, sizes: &[usize]) -> Result<&Self, RegionError> {
        if sizes.len() != self.num_dim() {
            return Err(RegionError::InvalidDims {
                expected: self.num_dim(),
                got: sizes.len(),
            });
        }
        if !self.is_within(sizes) {
            return Err(RegionError::NotContained {
                region: self.clone(),
                sizes: sizes.to_vec(),
            });
        }
        Ok(self)
    }

    /// Iterator over the region's points in row-major order.
    pub fn iter(&self) -> RegionIterator {
        RegionIterator {
            region: self.clone(),
            front: 0,
            back: self.len(),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, (s, n)) in zip(self.start.iter(), &self.sizes).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}..{}", s, s + n)?;
        }
        write!(f, "]")
    }
}

impl IntoIterator for &Region {
    type Item = Point;
    type IntoIter = RegionIterator;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterates over all points of a [`Region`] in row-major order.
pub struct RegionIterator {
    region: Region,
    front: usize,
    back: usize,
}

impl Iterator for RegionIterator {
    type Item = Point;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        let mut point = self.region.start.clone();
        self.region.decode_into(self.front, &mut point);
        self.front += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }
}

impl DoubleEndedIterator for RegionIterator {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        let mut point = self.region.start.clone();
        self.region.decode_into(self.back, &mut point);
        Some(point)
    }
}

impl ExactSizeIterator for RegionIterator {}
