//! Non-dominated sorting utilities for minimized objectives.
//!
//! Constraint handling follows the constrained domination principle:
//! a feasible point dominates an infeasible one, two infeasible points
//! are compared by their constraint violation and two feasible points
//! by Pareto dominance.
use ndarray::{Array1, ArrayBase, ArrayView1, Axis, Data, Ix2};

/// Tolerance under which a constraint violation is considered feasible
pub const CV_TOL: f64 = 1e-12;

/// Check whether `a` Pareto-dominates `b` (all objectives minimized)
pub fn dominates(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> bool {
    let mut strictly_better = false;
    for (&av, &bv) in a.iter().zip(b.iter()) {
        if av > bv {
            return false;
        }
        if av < bv {
            strictly_better = true;
        }
    }
    strictly_better
}

fn constrained_dominates(a: &ArrayView1<f64>, b: &ArrayView1<f64>, cv_a: f64, cv_b: f64) -> bool {
    match (cv_a <= CV_TOL, cv_b <= CV_TOL) {
        (true, false) => true,
        (false, true) => false,
        (false, false) => cv_a < cv_b,
        (true, true) => dominates(a, b),
    }
}

/// Fast non-dominated sorting (Deb et al., 2002).
///
/// Returns the successive fronts as lists of row indices of `f`, `fronts[0]`
/// being the non-dominated one. `cv` is either empty (unconstrained) or holds
/// the constraint violation of each row.
pub fn non_dominated_sort(f: &ArrayBase<impl Data<Elem = f64>, Ix2>, cv: &[f64]) -> Vec<Vec<usize>> {
    let n = f.nrows();
    if n == 0 {
        return Vec::new();
    }
    let cv_of = |i: usize| if cv.is_empty() { 0. } else { cv[i] };

    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut domination_count: Vec<usize> = vec![0; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let (fi, fj) = (f.row(i), f.row(j));
            if constrained_dominates(&fi, &fj, cv_of(i), cv_of(j)) {
                dominated_by[i].push(j);
                domination_count[j] += 1;
            } else if constrained_dominates(&fj, &fi, cv_of(j), cv_of(i)) {
                dominated_by[j].push(i);
                domination_count[i] += 1;
            }
        }
    }

    let mut fronts: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();
    while !current.is_empty() {
        let mut next: Vec<usize> = Vec::new();
        for &p in &current {
            for &q in &dominated_by[p] {
                domination_count[q] -= 1;
                if domination_count[q] == 0 {
                    next.push(q);
                }
            }
        }
        fronts.push(current);
        current = next;
    }
    fronts
}

/// Crowding distance of the rows `front` of `f`, boundary points get infinity
pub fn crowding_distance(f: &ArrayBase<impl Data<Elem = f64>, Ix2>, front: &[usize]) -> Vec<f64> {
    let n = front.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }
    let mut distances = vec![0.; n];
    for col in f.axis_iter(Axis(1)) {
        let mut sorted: Vec<usize> = (0..n).collect();
        sorted.sort_by(|&a, &b| {
            col[front[a]]
                .partial_cmp(&col[front[b]])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        distances[sorted[0]] = f64::INFINITY;
        distances[sorted[n - 1]] = f64::INFINITY;
        let range = col[front[sorted[n - 1]]] - col[front[sorted[0]]];
        if range > 0. {
            for i in 1..(n - 1) {
                distances[sorted[i]] +=
                    (col[front[sorted[i + 1]]] - col[front[sorted[i - 1]]]) / range;
            }
        }
    }
    distances
}

/// Ranks rows of `f` by non-dominated front then decreasing crowding distance
/// and returns the first `n` row indices.
pub fn select_best(f: &ArrayBase<impl Data<Elem = f64>, Ix2>, cv: &[f64], n: usize) -> Vec<usize> {
    let mut selected = Vec::with_capacity(n);
    for front in non_dominated_sort(f, cv) {
        if selected.len() >= n {
            break;
        }
        let dists = crowding_distance(f, &front);
        let mut order: Vec<usize> = (0..front.len()).collect();
        order.sort_by(|&a, &b| {
            dists[b]
                .partial_cmp(&dists[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        selected.extend(order.into_iter().map(|k| front[k]).take(n - selected.len()));
    }
    selected
}

/// Constraint violation of each row of `g`: sum of positive constraint values
pub fn constraint_violation(g: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array1<f64> {
    g.map_axis(Axis(1), |gi| gi.iter().map(|v| v.max(0.)).sum())
}
