//! Rotation subproblems for axes through the origin.
//!
//! All axis arguments are unit vectors.

use nalgebra::Vector3;

/// Component of `v` perpendicular to `axis`.
pub(crate) fn project(v: &Vector3<f64>, axis: &Vector3<f64>) -> Vector3<f64> {
    v - axis * axis.dot(v)
}

/// Angle (radians) of the rotation about `axis` that carries `from` onto `to`.
///
/// Only the parts of the vectors perpendicular to `axis` are used, so the
/// result is the best fit when the two do not lie on the same cone. Returns 0
/// when either projection vanishes.
pub(crate) fn rotation_angle(axis: &Vector3<f64>, from: &Vector3<f64>, to: &Vector3<f64>) -> f64 {
    let u = project(from, axis);
    let v = project(to, axis);
    axis.dot(&u.cross(&v)).atan2(u.dot(&v))
}

/// Intermediate vectors `c` with `Rot(second, t2) * p == c` and
/// `Rot(first, t1) * c == q`.
///
/// Yields two pivots (equal when the solution is unique) or `None` when no
/// pair of rotations maps `p` to `q`. `first` and `second` must not be parallel.
pub(crate) fn two_axis_pivots(
    first: &Vector3<f64>,
    second: &Vector3<f64>,
    p: &Vector3<f64>,
    q: &Vector3<f64>,
) -> Option<[Vector3<f64>; 2]> {
    let k = first.dot(second);
    let normal = first.cross(second);
    let normal_sq = normal.norm_squared();
    if normal_sq < 1e-12 {
        return None;
    }

    let denom = k * k - 1.0;
    let alpha = (k * second.dot(p) - first.dot(q)) / denom;
    let beta = (k * first.dot(q) - second.dot(p)) / denom;
    let gamma_sq = (p.norm_squared() - alpha * alpha - beta * beta - 2.0 * alpha * beta * k) / normal_sq;
    if gamma_sq < -1e-12 {
        return None;
    }
    let gamma = gamma_sq.max(0.0).sqrt();

    let base = first * alpha + second * beta;
    Some([base + normal * gamma, base - normal * gamma])
}
