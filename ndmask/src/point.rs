/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::ops::Deref;

use serde::Deserialize;
use serde::Serialize;

/// A coordinate tuple identifying one cell of an N-dimensional grid.
///
/// Points compare lexicographically, which is the same order in
/// which row-major traversals (last axis fastest) visit them:
///
/// ```
/// # use ndmask::Point;
/// assert!(Point::from([0, 9]) < Point::from([1, 0]));
/// assert!(Point::from([1, 0]) < Point::from([1, 1]));
/// ```
#[derive(Serialize, Deserialize, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Point(Vec<usize>);

impl Point {
    /// Create a point from its coordinates.
    pub fn new(coords: impl Into<Vec<usize>>) -> Self {
        Self(coords.into())
    }

    /// The point at the origin of a `dims`-dimensional space.
    pub fn origin(dims: usize) -> Self {
        Self(vec![0; dims])
    }

    /// The number of coordinates.
    pub fn num_dim(&self) -> usize {
        self.0.len()
    }

    /// The coordinates of this point.
    pub fn coords(&self) -> &[usize] {
        &self.0
    }

    pub(crate) fn coords_mut(&mut self) -> &mut [usize] {
        &mut self.0
    }

    /// Consume the point, returning its coordinates.
    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for Point {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl AsRef<[usize]> for Point {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for Point {
    fn from(coords: Vec<usize>) -> Self {
        Self(coords)
    }
}

impl From<&[usize]> for Point {
    fn from(coords: &[usize]) -> Self {
        Self(coords.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Point {
    fn from(coords: [usize; N]) -> Self {
        Self(coords.to_vec())
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ")")
    }
}
