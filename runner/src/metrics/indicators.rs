//! Quality indicators of an approximated Pareto front, all objectives minimized.
use archopt_algos::{dominates, utils::min_distances};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Axis, Data, Ix2};
use ndarray_stats::QuantileExt;

/// Hypervolume dominated by `front` rows and bounded by `reference`.
///
/// Points not strictly dominating the reference point do not contribute.
pub fn hypervolume(front: &ArrayBase<impl Data<Elem = f64>, Ix2>, reference: &[f64]) -> f64 {
    let points: Vec<Vec<f64>> = front
        .rows()
        .into_iter()
        .filter(|p| p.iter().zip(reference).all(|(&v, &r)| v < r))
        .map(|p| p.to_vec())
        .collect();
    if points.is_empty() {
        return 0.;
    }
    hv_slices(&points, reference)
}

/// Hypervolume by slicing along the last objective
fn hv_slices(points: &[Vec<f64>], reference: &[f64]) -> f64 {
    let d = reference.len();
    if d == 1 {
        let best = points.iter().map(|p| p[0]).fold(f64::INFINITY, f64::min);
        return (reference[0] - best).max(0.);
    }
    if points.len() == 1 {
        return points[0]
            .iter()
            .zip(reference)
            .map(|(&p, &r)| (r - p).max(0.))
            .product();
    }

    let mut sorted: Vec<&Vec<f64>> = points.iter().collect();
    sorted.sort_by(|a, b| a[d - 1].total_cmp(&b[d - 1]));

    let sub_ref = &reference[..d - 1];
    let mut volume = 0.;
    for i in 0..sorted.len() {
        let upper = if i + 1 < sorted.len() {
            sorted[i + 1][d - 1]
        } else {
            reference[d - 1]
        };
        let height = upper - sorted[i][d - 1];
        if height <= 0. {
            continue;
        }
        let projected: Vec<Vec<f64>> = sorted[..=i].iter().map(|p| p[..d - 1].to_vec()).collect();
        let front = non_dominated(&projected);
        volume += height * hv_slices(&front, sub_ref);
    }
    volume
}

fn non_dominated(points: &[Vec<f64>]) -> Vec<Vec<f64>> {
    points
        .iter()
        .enumerate()
        .filter(|(i, p)| {
            !points.iter().enumerate().any(|(j, q)| {
                j != *i && dominates(&ArrayView1::from(q.as_slice()), &ArrayView1::from(p.as_slice()))
            })
        })
        .map(|(_, p)| p.clone())
        .collect()
}

/// Inverted generational distance: mean distance of `reference_front` points
/// to their closest `front` point, NaN when `front` is empty
pub fn igd(
    front: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    reference_front: &ArrayBase<impl Data<Elem = f64>, Ix2>,
) -> f64 {
    if front.nrows() == 0 || reference_front.nrows() == 0 {
        return f64::NAN;
    }
    min_distances(reference_front, front).mean().unwrap_or(f64::NAN)
}

/// Deb's spread indicator of a front, 0 for an ideally uniform front spanning
/// the extremes of `reference_front` (when given). NaN below 2 points.
pub fn spread(
    front: &ArrayBase<impl Data<Elem = f64>, Ix2>,
    reference_front: Option<&Array2<f64>>,
) -> f64 {
    let n = front.nrows();
    if n < 2 || front.ncols() < 2 {
        return f64::NAN;
    }
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| front[[a, 0]].total_cmp(&front[[b, 0]]));
    let sorted = front.select(Axis(0), &order);

    let gaps: Array1<f64> = (0..n - 1)
        .map(|i| (&sorted.row(i + 1) - &sorted.row(i)).mapv(|v| v * v).sum().sqrt())
        .collect();
    let mean_gap = gaps.mean().unwrap_or(0.);

    let (d_first, d_last) = match reference_front {
        Some(pf) if pf.nrows() > 0 => {
            let extremes = |p: usize| -> f64 {
                let best = pf.column(0).argmin().unwrap_or(0);
                let worst = pf.column(0).argmax().unwrap_or(0);
                let target = if p == 0 { pf.row(best) } else { pf.row(worst) };
                let point = if p == 0 { sorted.row(0) } else { sorted.row(n - 1) };
                (&point - &target).mapv(|v| v * v).sum().sqrt()
            };
            (extremes(0), extremes(1))
        }
        _ => (0., 0.),
    };

    let denominator = d_first + d_last + (n - 1) as f64 * mean_gap;
    if denominator <= 0. {
        return f64::NAN;
    }
    (d_first + d_last + gaps.mapv(|g| (g - mean_gap).abs()).sum()) / denominator
}
