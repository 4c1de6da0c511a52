//! Rectangle primitives. Every rectangle is `2*dims` coordinates in
//! `[min0, max0, min1, max1, ...]` order.

use super::types::Rect;

pub fn area(r: &[f64], dims: usize) -> f64 {
    let mut a = 1.0;
    for i in 0..dims {
        a *= r[2 * i + 1] - r[2 * i];
    }
    a
}

pub fn margin(r: &[f64], dims: usize) -> f64 {
    let mut m = 0.0;
    for i in 0..dims {
        m += r[2 * i + 1] - r[2 * i];
    }
    m
}

/// Componentwise min-of-mins, max-of-maxes, written into `r1`.
pub fn union_in_place(r1: &mut [f64], r2: &[f64], dims: usize) {
    for i in 0..dims {
        if r2[2 * i] < r1[2 * i] {
            r1[2 * i] = r2[2 * i];
        }
        if r2[2 * i + 1] > r1[2 * i + 1] {
            r1[2 * i + 1] = r2[2 * i + 1];
        }
    }
}

pub fn union(r1: &[f64], r2: &[f64], dims: usize) -> Rect {
    let mut out = r1.to_vec();
    union_in_place(&mut out, r2, dims);
    out
}

/// True iff `r2` lies inside `r1` on every axis.
pub fn contains(r1: &[f64], r2: &[f64], dims: usize) -> bool {
    (0..dims).all(|i| r1[2 * i] <= r2[2 * i] && r2[2 * i + 1] <= r1[2 * i + 1])
}

/// `area(union(r, c)) - area(r)`.
pub fn growth(r: &[f64], c: &[f64], dims: usize) -> f64 {
    let merged = union(r, c, dims);
    area(&merged, dims) - area(r, dims)
}

/// Volume of the intersection of two rectangles, 0 if disjoint on any axis.
pub fn intersection_volume(r1: &[f64], r2: &[f64], dims: usize) -> f64 {
    let mut vol = 1.0;
    for i in 0..dims {
        let lo = r1[2 * i].max(r2[2 * i]);
        let hi = r1[2 * i + 1].min(r2[2 * i + 1]);
        if hi <= lo {
            return 0.0;
        }
        vol *= hi - lo;
    }
    vol
}

/// Sum of the intersection volume of `r` against every rectangle in `rects`,
/// optionally skipping the entry at `exclude`.
pub fn overlap(rects: &[Rect], r: &[f64], dims: usize, exclude: Option<usize>) -> f64 {
    rects
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != exclude)
        .map(|(_, other)| intersection_volume(other, r, dims))
        .sum()
}

/// True iff two rectangles overlap (positive-volume intersection or touching)
/// on every axis — used by the search engine's internal-cell exclusion test
/// is expressed directly via relational comparisons instead; this helper is
/// for geometry callbacks and MATCH support.
pub fn intersects(r1: &[f64], r2: &[f64], dims: usize) -> bool {
    (0..dims).all(|i| r1[2 * i] <= r2[2 * i + 1] && r2[2 * i] <= r1[2 * i + 1])
}

/// Centroid of a rectangle, used by R*-tree forced reinsertion to rank
/// cells by distance from the node's center.
pub fn centroid(r: &[f64], dims: usize) -> Vec<f64> {
    (0..dims).map(|i| (r[2 * i] + r[2 * i + 1]) / 2.0).collect()
}

pub fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_of_unit_square() {
        assert_eq!(area(&[0.0, 1.0, 0.0, 1.0], 2), 1.0);
    }

    #[test]
    fn margin_of_rect() {
        assert_eq!(margin(&[0.0, 2.0, 0.0, 3.0], 2), 5.0);
    }

    #[test]
    fn union_grows_to_enclose_both() {
        let r2 = [5.0, 6.0, -1.0, 0.0];
        let merged = union(&[0.0, 1.0, 0.0, 1.0], &r2, 2);
        assert_eq!(merged, vec![0.0, 6.0, -1.0, 1.0]);
    }

    #[test]
    fn contains_checks_all_axes() {
        assert!(contains(&[0.0, 10.0, 0.0, 10.0], &[1.0, 2.0, 1.0, 2.0], 2));
        assert!(!contains(&[0.0, 10.0, 0.0, 10.0], &[1.0, 20.0, 1.0, 2.0], 2));
    }

    #[test]
    fn disjoint_rects_have_zero_overlap() {
        assert_eq!(intersection_volume(&[0.0, 1.0], &[2.0, 3.0], 1), 0.0);
    }

    #[test]
    fn touching_rects_have_zero_volume_overlap() {
        assert_eq!(intersection_volume(&[0.0, 1.0], &[1.0, 2.0], 1), 0.0);
    }

    #[test]
    fn overlap_sums_excluding_self() {
        let rects = vec![vec![0.0, 2.0], vec![1.0, 3.0], vec![5.0, 6.0]];
        let total = overlap(&rects, &vec![1.0, 3.0], 1, Some(1));
        assert_eq!(total, 1.0);
    }

    #[test]
    fn growth_is_zero_when_already_contained() {
        assert_eq!(growth(&[0.0, 10.0, 0.0, 10.0], &[1.0, 2.0, 1.0, 2.0], 2), 0.0);
    }
}
