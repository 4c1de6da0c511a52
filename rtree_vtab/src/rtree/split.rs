//! The three split/assignment policies: Guttman quadratic seeds, Guttman
//! linear seeds, and the R*-tree margin-minimizing split. Each partitions
//! `M+1` cells into two non-empty groups, both respecting the minimum
//! fill `ceil(M/3)`.

use super::geometry::{area, growth, intersection_volume, margin, union};
use super::types::{Cell, Rect};

pub fn compute_bbox(cells: &[Cell], dims: usize) -> Rect {
    let mut bbox = cells[0].coords.clone();
    for c in &cells[1..] {
        super::geometry::union_in_place(&mut bbox, &c.coords, dims);
    }
    bbox
}

/// Guttman's quadratic-seed pick, followed by maximal growth-difference
/// assignment: each remaining cell's growth is measured against both the
/// left and right candidate boxes, and the cell with the largest
/// preference (difference) goes to whichever side it prefers.
pub fn guttman_quadratic_assign(cells: &[Cell], dims: usize, min_group: usize) -> (Vec<usize>, Vec<usize>) {
    let n = cells.len();
    let (seed_i, seed_j) = pick_seeds_quadratic(cells, dims);

    let mut left = vec![seed_i];
    let mut right = vec![seed_j];
    let mut left_box = cells[seed_i].coords.clone();
    let mut right_box = cells[seed_j].coords.clone();
    let mut remaining: Vec<usize> = (0..n).filter(|&k| k != seed_i && k != seed_j).collect();

    while !remaining.is_empty() {
        if left.len() + remaining.len() <= min_group {
            left.extend(remaining.drain(..));
            break;
        }
        if right.len() + remaining.len() <= min_group {
            right.extend(remaining.drain(..));
            break;
        }

        let mut best_idx = 0;
        let mut best_diff = f64::MIN;
        let mut best_to_left = true;
        for (pos, &ii) in remaining.iter().enumerate() {
            let left_growth = growth(&left_box, &cells[ii].coords, dims);
            let right_growth = growth(&right_box, &cells[ii].coords, dims);
            let diff = (left_growth - right_growth).abs();
            if diff > best_diff {
                best_diff = diff;
                best_idx = pos;
                best_to_left = left_growth <= right_growth;
            }
        }
        let chosen = remaining.remove(best_idx);
        if best_to_left {
            union_into(&mut left_box, &cells[chosen].coords, dims);
            left.push(chosen);
        } else {
            union_into(&mut right_box, &cells[chosen].coords, dims);
            right.push(chosen);
        }
    }

    (left, right)
}

fn pick_seeds_quadratic(cells: &[Cell], dims: usize) -> (usize, usize) {
    let n = cells.len();
    let mut best = (0, 1);
    let mut best_waste = f64::MIN;
    for i in 0..n {
        for j in (i + 1)..n {
            let merged = union(&cells[i].coords, &cells[j].coords, dims);
            let waste = area(&merged, dims) - area(&cells[i].coords, dims) - area(&cells[j].coords, dims);
            if waste > best_waste {
                best_waste = waste;
                best = (i, j);
            }
        }
    }
    best
}

/// Guttman's linear-seed pick: per axis, the pair (leftmost-max,
/// rightmost-min), normalized by axis extent; the axis of maximum
/// normalized separation selects the seeds. Remaining cells are assigned
/// in array order.
pub fn guttman_linear_assign(cells: &[Cell], dims: usize, min_group: usize) -> (Vec<usize>, Vec<usize>) {
    let n = cells.len();
    let mut best_axis = 0;
    let mut best_separation = f64::MIN;
    let mut best_pair = (0usize, 1usize);

    for axis in 0..dims {
        let mut highest_low = f64::MIN;
        let mut highest_low_idx = 0;
        let mut lowest_high = f64::MAX;
        let mut lowest_high_idx = 0;
        let mut overall_min = f64::MAX;
        let mut overall_max = f64::MIN;
        for (idx, c) in cells.iter().enumerate() {
            let lo = c.coords[2 * axis];
            let hi = c.coords[2 * axis + 1];
            if lo > highest_low {
                highest_low = lo;
                highest_low_idx = idx;
            }
            if hi < lowest_high {
                lowest_high = hi;
                lowest_high_idx = idx;
            }
            overall_min = overall_min.min(lo);
            overall_max = overall_max.max(hi);
        }
        let extent = (overall_max - overall_min).max(f64::EPSILON);
        let separation = (highest_low - lowest_high) / extent;
        if separation > best_separation && highest_low_idx != lowest_high_idx {
            best_separation = separation;
            best_axis = axis;
            best_pair = (lowest_high_idx, highest_low_idx);
        }
    }
    let _ = best_axis;

    let (seed_i, seed_j) = best_pair;
    let mut left = vec![seed_i];
    let mut right = vec![seed_j];
    for k in 0..n {
        if k == seed_i || k == seed_j {
            continue;
        }
        if left.len() < min_group && left.len() <= right.len() {
            left.push(k);
        } else {
            right.push(k);
        }
    }
    (left, right)
}

/// R*-tree margin-minimizing split: choose the axis minimizing total
/// margin over all valid split positions, then split at that axis's best
/// position (minimum overlap, tie-broken by minimum area).
pub fn rstar_assign(cells: &[Cell], dims: usize, min_group: usize) -> (Vec<usize>, Vec<usize>) {
    let n = cells.len();
    let mut best_axis = 0;
    let mut best_axis_margin_sum = f64::MAX;

    // First pass: per axis, sort by min (tie by max), accumulate margin
    // sums over all valid split positions to choose the axis.
    let mut orders: Vec<Vec<usize>> = Vec::with_capacity(dims);
    for axis in 0..dims {
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            let ca = &cells[a].coords;
            let cb = &cells[b].coords;
            ca[2 * axis]
                .partial_cmp(&cb[2 * axis])
                .unwrap()
                .then(ca[2 * axis + 1].partial_cmp(&cb[2 * axis + 1]).unwrap())
        });

        let mut margin_sum = 0.0;
        for k in min_group..=(n - min_group) {
            let left_cells: Vec<&Cell> = order[..k].iter().map(|&i| &cells[i]).collect();
            let right_cells: Vec<&Cell> = order[k..].iter().map(|&i| &cells[i]).collect();
            let left_box = bbox_of_refs(&left_cells, dims);
            let right_box = bbox_of_refs(&right_cells, dims);
            margin_sum += margin(&left_box, dims) + margin(&right_box, dims);
        }
        if margin_sum < best_axis_margin_sum {
            best_axis_margin_sum = margin_sum;
            best_axis = axis;
        }
        orders.push(order);
    }

    let order = &orders[best_axis];
    let mut best_k = min_group;
    let mut best_overlap = f64::MAX;
    let mut best_area = f64::MAX;
    for k in min_group..=(n - min_group) {
        let left_cells: Vec<&Cell> = order[..k].iter().map(|&i| &cells[i]).collect();
        let right_cells: Vec<&Cell> = order[k..].iter().map(|&i| &cells[i]).collect();
        let left_box = bbox_of_refs(&left_cells, dims);
        let right_box = bbox_of_refs(&right_cells, dims);
        let overlap = intersection_volume(&left_box, &right_box, dims);
        let total_area = area(&left_box, dims) + area(&right_box, dims);
        if overlap < best_overlap || (overlap == best_overlap && total_area < best_area) {
            best_overlap = overlap;
            best_area = total_area;
            best_k = k;
        }
    }

    let left = order[..best_k].to_vec();
    let right = order[best_k..].to_vec();
    (left, right)
}

fn bbox_of_refs(cells: &[&Cell], dims: usize) -> Rect {
    let mut bbox = cells[0].coords.clone();
    for c in &cells[1..] {
        super::geometry::union_in_place(&mut bbox, &c.coords, dims);
    }
    let _ = dims;
    bbox
}

fn union_into(bbox: &mut Rect, other: &[f64], dims: usize) {
    super::geometry::union_in_place(bbox, other, dims);
}
