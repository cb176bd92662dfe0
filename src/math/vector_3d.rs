use super::{Vector3, TOLERANCE};

/// Reflects `v` across the plane through the origin orthogonal to `axis`.
///
/// Householder reflection: `v - axis * (2 / |axis|²) * (axis · v)`.
/// Returns `None` when `axis` is too short to define a plane.
#[must_use]
pub fn reflect(v: &Vector3, axis: &Vector3) -> Option<Vector3> {
    let len_sq = axis.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }
    Some(v - axis * (2.0 / len_sq * axis.dot(v)))
}

/// Normalizes `v`, rejecting near-zero and non-finite results.
#[must_use]
pub fn unit(v: &Vector3) -> Option<Vector3> {
    v.try_normalize(TOLERANCE)
        .filter(|u| u.iter().all(|c| c.is_finite()))
}

/// Returns `normalize(tangent × up)`, or `None` if `tangent` is parallel to `up`
/// (or either is zero).
#[must_use]
pub fn planar_normal(tangent: &Vector3, up: &Vector3) -> Option<Vector3> {
    unit(&tangent.cross(up))
}

/// Returns the component of `v` orthogonal to `n`, normalized.
///
/// `None` if `v` is (nearly) parallel to `n` or `n` is zero.
#[must_use]
pub fn orthogonal_component(v: &Vector3, n: &Vector3) -> Option<Vector3> {
    let len_sq = n.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return None;
    }
    unit(&(v - n * (n.dot(v) / len_sq)))
}

/// Returns a unit vector perpendicular to `v`.
///
/// Crosses `v` with the world axis it is least aligned with. A zero `v`
/// yields the Y axis.
#[must_use]
pub fn any_perpendicular(v: &Vector3) -> Vector3 {
    let (ax, ay, az) = (v.x.abs(), v.y.abs(), v.z.abs());
    let axis = if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    };
    unit(&v.cross(&axis)).unwrap_or_else(Vector3::y)
}

/// Angle in radians between two vectors, `0` if either is zero.
#[must_use]
pub fn angle_between(a: &Vector3, b: &Vector3) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < TOLERANCE {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}
