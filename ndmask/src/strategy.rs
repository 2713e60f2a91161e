/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Property-based generators for regions and masks.
//!
//! The main entry point is [`gen_masked_case`], which generates a
//! random 0/1 mask image together with a region inside it:
//!
//! ```ignore
//! use proptest::prelude::*;
//!
//! use crate::strategy::gen_masked_case;
//!
//! proptest! {
//!     #[test]
//!     fn test_traversal((mask, region) in gen_masked_case(3, 6)) {
//!         // Traverse `region` of `mask`.
//!     }
//! }
//! ```
//!
//! This module is only included in test builds (`#[cfg(test)]`).

use proptest::prelude::*;

use crate::Region;
use crate::grid::Image;

/// Generates grid sizes with up to `max_dims` dimensions, each
/// between 1 and `max_len` (inclusive).
pub fn gen_sizes(max_dims: usize, max_len: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(1..=max_len, 1..=max_dims)
}

/// Generates a pair `(sizes, region)` where `region` lies within a
/// grid of extent `sizes`. Regions may be empty along any axis.
pub fn gen_region(
    max_dims: usize,
    max_len: usize,
) -> impl Strategy<Value = (Vec<usize>, Region)> {
    gen_sizes(max_dims, max_len).prop_flat_map(|sizes| {
        // (start, len) per dimension
        let dims: Vec<BoxedStrategy<(usize, usize)>> = sizes
            .iter()
            .map(|&extent| {
                (0..extent)
                    .prop_flat_map(move |start| (0..=extent - start).prop_map(move |len| (start, len)))
                    .boxed()
            })
            .collect();
        (Just(sizes), dims).prop_map(|(sizes, dims)| {
            let (start, lens): (Vec<usize>, Vec<usize>) = dims.into_iter().unzip();
            let region = Region::new(start, lens).unwrap();
            (sizes, region)
        })
    })
}

/// Generates a 0/1 mask of extent `sizes`, where each position is set
/// with probability `density`.
pub fn gen_mask(sizes: Vec<usize>, density: f64) -> impl Strategy<Value = Image<u8>> {
    let len: usize = sizes.iter().product();
    prop::collection::vec(prop::bool::weighted(density), len).prop_map(move |bits| {
        Image::from_vec(sizes.clone(), bits.into_iter().map(u8::from).collect()).unwrap()
    })
}

/// Generates a mask together with a region inside it. Densities range
/// from all-zero to all-one.
pub fn gen_masked_case(
    max_dims: usize,
    max_len: usize,
) -> impl Strategy<Value = (Image<u8>, Region)> {
    (
        gen_region(max_dims, max_len),
        prop::sample::select(vec![0.0, 0.1, 0.5, 0.9, 1.0]),
    )
        .prop_flat_map(|((sizes, region), density)| (gen_mask(sizes, density), Just(region)))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::grid::Grid;

    proptest! {
        #[test]
        fn regions_fit_their_grids((sizes, region) in gen_region(4, 5)) {
            prop_assert_eq!(region.num_dim(), sizes.len());
            prop_assert!(region.is_within(&sizes));
        }

        #[test]
        fn masks_are_binary((mask, region) in gen_masked_case(3, 4)) {
            prop_assert!(mask.as_slice().iter().all(|&v| v <= 1));
            prop_assert!(region.is_within(mask.sizes()));
        }
    }
}
