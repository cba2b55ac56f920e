//! Polygon geometry for body construction.
//!
//! All shapes are convex polygons stored relative to their centre of mass.
//! Mass properties follow the backend's conventions: mass is `density * area`
//! and rotational inertia is the polygon's second moment scaled by
//! [`INERTIA_SCALE`].

use crate::error::GeometryError;
use glam::DVec2;

/// Scale applied to the raw polygon second moment.
pub const INERTIA_SCALE: f64 = 4.0;

/// Minimum and maximum number of sides used to approximate a circle.
const CIRCLE_MIN_SIDES: f64 = 10.0;
const CIRCLE_MAX_SIDES: f64 = 25.0;

/// Polygons with less area than this are rejected as degenerate.
const MIN_AREA: f64 = 1e-9;

/// Axis-aligned rectangle centred on the origin.
pub fn rectangle(width: f64, height: f64) -> Vec<DVec2> {
    let hw = width * 0.5;
    let hh = height * 0.5;
    vec![
        DVec2::new(-hw, -hh),
        DVec2::new(hw, -hh),
        DVec2::new(hw, hh),
        DVec2::new(-hw, hh),
    ]
}

/// Number of polygon sides used for a circle of the given radius.
pub fn circle_sides(radius: f64) -> usize {
    CIRCLE_MIN_SIDES.max(CIRCLE_MAX_SIDES.min(radius)).ceil() as usize
}

/// Regular polygon approximating a circle, re-centred on its centroid.
pub fn circle(radius: f64) -> Vec<DVec2> {
    let sides = circle_sides(radius);
    let theta = std::f64::consts::TAU / sides as f64;
    let offset = theta * 0.5;
    let vertices: Vec<DVec2> = (0..sides)
        .map(|i| {
            let angle = offset + i as f64 * theta;
            DVec2::new(angle.cos() * radius, angle.sin() * radius)
        })
        .collect();
    recentre(&vertices).1
}

/// Unsigned polygon area.
pub fn area(vertices: &[DVec2]) -> f64 {
    signed_area(vertices).abs()
}

fn signed_area(vertices: &[DVec2]) -> f64 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        sum += (vertices[j].x - vertices[i].x) * (vertices[j].y + vertices[i].y);
        j = i;
    }
    sum * 0.5
}

/// Area-weighted centroid. Returns the vertex mean for degenerate input.
pub fn centroid(vertices: &[DVec2]) -> DVec2 {
    let n = vertices.len();
    if n == 0 {
        return DVec2::ZERO;
    }
    let mut cross_sum = 0.0;
    let mut centre = DVec2::ZERO;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let cross = a.x * b.y - a.y * b.x;
        cross_sum += cross;
        centre += (a + b) * cross;
    }
    if cross_sum.abs() < MIN_AREA {
        let sum: DVec2 = vertices.iter().copied().sum();
        return sum / n as f64;
    }
    // cross_sum is twice the signed area.
    centre / (3.0 * cross_sum)
}

/// Translate vertices so their centroid sits at the origin.
pub fn recentre(vertices: &[DVec2]) -> (DVec2, Vec<DVec2>) {
    let c = centroid(vertices);
    (c, vertices.iter().map(|v| *v - c).collect())
}

/// Raw second moment of a polygon about the origin for the given mass.
pub fn second_moment(vertices: &[DVec2], mass: f64) -> f64 {
    let n = vertices.len();
    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for i in 0..n {
        let vi = vertices[i];
        let vj = vertices[(i + 1) % n];
        let cross = (vj.x * vi.y - vj.y * vi.x).abs();
        numerator += cross * (vj.dot(vj) + vj.dot(vi) + vi.dot(vi));
        denominator += cross;
    }
    if denominator == 0.0 {
        return 0.0;
    }
    (mass / 6.0) * (numerator / denominator)
}

/// Check that a vertex set forms a usable convex polygon.
pub fn validate_convex(vertices: &[DVec2]) -> Result<(), GeometryError> {
    let n = vertices.len();
    if n < 3 {
        return Err(GeometryError::TooFewVertices(n));
    }
    if !vertices.iter().all(|v| v.x.is_finite() && v.y.is_finite()) || area(vertices) < MIN_AREA {
        return Err(GeometryError::Degenerate);
    }
    let mut sign = 0.0f64;
    for i in 0..n {
        let a = vertices[i];
        let b = vertices[(i + 1) % n];
        let c = vertices[(i + 2) % n];
        let cross = (b - a).perp_dot(c - b);
        if cross == 0.0 {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return Err(GeometryError::NonConvex);
        }
    }
    Ok(())
}

/// Mass properties of a shape expressed about its centre of mass.
#[derive(Debug, Clone, PartialEq)]
pub struct MassSummary {
    pub area: f64,
    pub mass: f64,
    pub inertia: f64,
}

/// Mass properties of a single centred polygon.
pub fn polygon_mass(vertices: &[DVec2], density: f64) -> MassSummary {
    let area = area(vertices);
    let mass = density * area;
    MassSummary {
        area,
        mass,
        inertia: INERTIA_SCALE * second_moment(vertices, mass),
    }
}

/// A rigid body assembled from several convex parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    /// Part outlines relative to the composite centre of mass.
    pub parts: Vec<Vec<DVec2>>,
    /// Offset of the centre of mass from the parts' original origin.
    pub centre: DVec2,
    pub mass: MassSummary,
}

/// Combine convex parts into one rigid body.
///
/// Inertia of each part is moved to the shared centre of mass with the
/// parallel-axis theorem.
pub fn assemble(parts: &[Vec<DVec2>], density: f64) -> Result<Composite, GeometryError> {
    if parts.is_empty() {
        return Err(GeometryError::TooFewVertices(0));
    }

    let mut measured = Vec::with_capacity(parts.len());
    for part in parts {
        validate_convex(part)?;
        let (c, local) = recentre(part);
        let a = area(&local);
        let m = density * a;
        measured.push((c, local, a, m));
    }

    let total_area: f64 = measured.iter().map(|p| p.2).sum();
    let total_mass: f64 = measured.iter().map(|p| p.3).sum();
    let centre = if total_mass > 0.0 {
        measured.iter().map(|(c, _, _, m)| *c * *m).sum::<DVec2>() / total_mass
    } else {
        measured.iter().map(|(c, _, a, _)| *c * *a).sum::<DVec2>() / total_area
    };

    let mut moment = 0.0;
    for (c, local, _, m) in &measured {
        let d = *c - centre;
        moment += second_moment(local, *m) + m * d.length_squared();
    }

    let parts = parts
        .iter()
        .map(|part| part.iter().map(|v| *v - centre).collect())
        .collect();

    Ok(Composite {
        parts,
        centre,
        mass: MassSummary {
            area: total_area,
            mass: total_mass,
            inertia: INERTIA_SCALE * moment,
        },
    })
}

/// Rotate a local vertex and place it in the world.
pub fn to_world(local: DVec2, position: DVec2, angle: f64) -> DVec2 {
    let (sin, cos) = angle.sin_cos();
    DVec2::new(
        position.x + local.x * cos - local.y * sin,
        position.y + local.x * sin + local.y * cos,
    )
}
