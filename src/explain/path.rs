//! Path-dependent SHAP value computation for a single tree.
//!
//! This is the polynomial-time algorithm for exact Shapley values on tree
//! models: walk every root-to-leaf path once while maintaining, for each
//! feature on the path, the fraction of "background" paths that flow through
//! when the feature is excluded (`zero`), the fraction when it is included
//! (`one`), and the permutation weight of each path-subset size. Cover ratios
//! stand in for the background distribution, so no reference dataset is
//! needed beyond the trained tree itself.
//!
//! The contributions of all features sum to `leaf(x) - E[tree]` exactly,
//! which is what makes the ensemble-level attribution additive.

use crate::model::Tree;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    /// Feature that split this path segment; -1 for the root sentinel.
    feature: i32,
    /// Proportion of background paths flowing through when the feature is
    /// excluded from the coalition.
    zero: f64,
    /// Proportion flowing through when it is included (1 if x follows this
    /// branch, 0 otherwise).
    one: f64,
    /// Permutation weight for subsets of this size.
    weight: f64,
}

/// SHAP values of one tree for one vector, indexed by feature.
pub fn shap_values(tree: &Tree, x: &[f64], n_features: usize) -> Vec<f64> {
    let mut phi = vec![0.0; n_features];
    recurse(tree, x, &mut phi, 0, Vec::new(), 1.0, 1.0, -1);
    phi
}

fn recurse(
    tree: &Tree,
    x: &[f64],
    phi: &mut [f64],
    node_idx: usize,
    mut path: Vec<PathElement>,
    zero: f64,
    one: f64,
    feature: i32,
) {
    extend(&mut path, zero, one, feature);
    let node = &tree.nodes[node_idx];

    if node.is_leaf() {
        // Element 0 is the root sentinel; every other element is a feature
        // whose inclusion/exclusion difference this leaf contributes to.
        for i in 1..path.len() {
            let w = unwound_sum(&path, i);
            let el = path[i];
            phi[el.feature as usize] += w * (el.one - el.zero) * node.value;
        }
        return;
    }

    let (hot, cold) = if x[node.feature as usize] < node.threshold {
        (node.left as usize, node.right as usize)
    } else {
        (node.right as usize, node.left as usize)
    };
    let hot_zero = tree.nodes[hot].cover / node.cover;
    let cold_zero = tree.nodes[cold].cover / node.cover;

    // If this feature already split higher up the path, merge its fractions
    // instead of double counting it.
    let mut incoming_zero = 1.0;
    let mut incoming_one = 1.0;
    if let Some(k) = path.iter().position(|el| el.feature == node.feature) {
        incoming_zero = path[k].zero;
        incoming_one = path[k].one;
        unwind(&mut path, k);
    }

    recurse(
        tree,
        x,
        phi,
        hot,
        path.clone(),
        hot_zero * incoming_zero,
        incoming_one,
        node.feature,
    );
    recurse(tree, x, phi, cold, path, cold_zero * incoming_zero, 0.0, node.feature);
}

/// Grow the path by one feature split, updating subset-size weights.
fn extend(path: &mut Vec<PathElement>, zero: f64, one: f64, feature: i32) {
    let len = path.len();
    path.push(PathElement {
        feature,
        zero,
        one,
        weight: if len == 0 { 1.0 } else { 0.0 },
    });
    let denom = (len + 1) as f64;
    for i in (0..len).rev() {
        path[i + 1].weight += one * path[i].weight * (i as f64 + 1.0) / denom;
        path[i].weight *= zero * (len - i) as f64 / denom;
    }
}

/// Undo an [`extend`] for the element at `index`, removing it from the path.
fn unwind(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one = path[index].one;
    let zero = path[index].zero;

    if one != 0.0 {
        let mut next_one = path[depth].weight;
        for i in (0..depth).rev() {
            let tmp = path[i].weight;
            path[i].weight = next_one * (depth + 1) as f64 / ((i + 1) as f64 * one);
            next_one = tmp - path[i].weight * zero * (depth - i) as f64 / (depth + 1) as f64;
        }
    } else {
        for i in (0..depth).rev() {
            path[i].weight = path[i].weight * (depth + 1) as f64 / (zero * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero = path[i + 1].zero;
        path[i].one = path[i + 1].one;
    }
    path.pop();
}

/// Total weight the path would carry after unwinding `index`, without
/// mutating the path. Used at leaves, once per on-path feature.
fn unwound_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one = path[index].one;
    let zero = path[index].zero;
    let mut total = 0.0;

    if one != 0.0 {
        let mut next_one = path[depth].weight;
        for i in (0..depth).rev() {
            let tmp = next_one / ((i + 1) as f64 * one);
            total += tmp;
            next_one = path[i].weight - tmp * zero * (depth - i) as f64;
        }
    } else {
        for i in (0..depth).rev() {
            total += path[i].weight / (zero * (depth - i) as f64);
        }
    }

    total * (depth + 1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TreeNode;
    use std::collections::HashSet;

    fn leaf(value: f64, cover: f64) -> TreeNode {
        TreeNode { feature: -1, threshold: 0.0, left: -1, right: -1, value, cover }
    }

    fn split(feature: i32, threshold: f64, left: i32, right: i32, cover: f64) -> TreeNode {
        TreeNode { feature, threshold, left, right, value: 0.0, cover }
    }

    /// Expected tree output when only the features in `known` follow x and
    /// every other split averages its children by cover.
    fn cond_exp(tree: &Tree, idx: usize, x: &[f64], known: &HashSet<usize>) -> f64 {
        let node = &tree.nodes[idx];
        if node.is_leaf() {
            return node.value;
        }
        let (l, r) = (node.left as usize, node.right as usize);
        if known.contains(&(node.feature as usize)) {
            let next = if x[node.feature as usize] < node.threshold { l } else { r };
            return cond_exp(tree, next, x, known);
        }
        let (cl, cr) = (tree.nodes[l].cover, tree.nodes[r].cover);
        (cl * cond_exp(tree, l, x, known) + cr * cond_exp(tree, r, x, known)) / (cl + cr)
    }

    fn factorial(n: usize) -> f64 {
        (1..=n).map(|v| v as f64).product()
    }

    /// Classic Shapley-value sum over all coalitions, exponential in the
    /// feature count. Only usable for tiny fixtures, which is the point.
    fn brute_shapley(tree: &Tree, x: &[f64], n_features: usize) -> Vec<f64> {
        let mut phi = vec![0.0; n_features];
        for i in 0..n_features {
            let others: Vec<usize> = (0..n_features).filter(|&f| f != i).collect();
            for mask in 0..(1usize << others.len()) {
                let subset: HashSet<usize> = others
                    .iter()
                    .enumerate()
                    .filter(|(bit, _)| mask & (1 << bit) != 0)
                    .map(|(_, &f)| f)
                    .collect();
                let s = subset.len();
                let weight =
                    factorial(s) * factorial(n_features - s - 1) / factorial(n_features);
                let mut with_i = subset.clone();
                with_i.insert(i);
                phi[i] += weight
                    * (cond_exp(tree, 0, x, &with_i) - cond_exp(tree, 0, x, &subset));
            }
        }
        phi
    }

    #[test]
    fn stump_attributes_everything_to_its_split_feature() {
        let tree = Tree {
            nodes: vec![split(0, 0.5, 1, 2, 100.0), leaf(-1.0, 60.0), leaf(2.0, 40.0)],
        };
        let expected = (60.0 * -1.0 + 40.0 * 2.0) / 100.0;

        let phi = shap_values(&tree, &[0.0, 7.0], 2);
        assert!((phi[0] - (-1.0 - expected)).abs() < 1e-12);
        assert_eq!(phi[1], 0.0);

        let phi = shap_values(&tree, &[1.0, 7.0], 2);
        assert!((phi[0] - (2.0 - expected)).abs() < 1e-12);
    }

    #[test]
    fn matches_brute_force_on_a_two_level_tree() {
        let tree = Tree {
            nodes: vec![
                split(0, 10.0, 1, 2, 100.0),
                split(1, 0.5, 3, 4, 70.0),
                split(2, 3.0, 5, 6, 30.0),
                leaf(-0.8, 40.0),
                leaf(0.4, 30.0),
                leaf(0.9, 10.0),
                leaf(1.6, 20.0),
            ],
        };

        for x in [
            [5.0, 1.0, 2.0],
            [5.0, 0.0, 2.0],
            [15.0, 1.0, 2.0],
            [15.0, 0.0, 9.0],
        ] {
            let fast = shap_values(&tree, &x, 3);
            let slow = brute_shapley(&tree, &x, 3);
            for (a, b) in fast.iter().zip(&slow) {
                assert!((a - b).abs() < 1e-9, "fast={fast:?} slow={slow:?}");
            }
        }
    }

    #[test]
    fn contributions_sum_to_margin_minus_expectation() {
        // Deeper tree, including a feature reused on one path.
        let tree = Tree {
            nodes: vec![
                split(0, 0.0, 1, 2, 200.0),
                split(1, 5.0, 3, 4, 120.0),
                split(0, 4.0, 5, 6, 80.0),
                leaf(-1.2, 70.0),
                leaf(0.3, 50.0),
                leaf(0.8, 30.0),
                leaf(2.1, 50.0),
            ],
        };
        let expected = {
            let e2 = (30.0 * 0.8 + 50.0 * 2.1) / 80.0;
            let e1 = (70.0 * -1.2 + 50.0 * 0.3) / 120.0;
            (120.0 * e1 + 80.0 * e2) / 200.0
        };

        for x in [[-1.0, 4.0], [-1.0, 6.0], [1.0, 0.0], [7.0, 0.0]] {
            let margin = tree.margin(&x);
            let phi = shap_values(&tree, &x, 2);
            let total: f64 = phi.iter().sum();
            assert!(
                (expected + total - margin).abs() < 1e-9,
                "x={x:?} expected={expected} total={total} margin={margin}"
            );
        }
    }

    #[test]
    fn single_leaf_tree_has_no_contributions() {
        let tree = Tree { nodes: vec![leaf(0.7, 50.0)] };
        let phi = shap_values(&tree, &[1.0, 2.0], 2);
        assert_eq!(phi, vec![0.0, 0.0]);
    }
}
