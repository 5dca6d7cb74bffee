use std::{
    collections::HashSet,
    hash::{Hash, Hasher},
};

use footprints_core::{
    math::AABB,
    nalgebra::{Point3, Vector2, Vector3},
};
use thiserror::Error;

/// Tolerance for degeneracy tests, relative to the extent of the input points. A point set counts as collinear if
/// twice the area of its 2D hull is below `HULL_RELATIVE_TOLERANCE * extent²`, and as coplanar if the volume spanned
/// by its initial tetrahedron is below `HULL_RELATIVE_TOLERANCE * extent³`.
pub const HULL_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Reasons why no convex hull with a positive area (2D) or volume (3D) exists for a set of points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum HullError {
    #[error("too few distinct points")]
    TooFewPoints,
    #[error("all points are collinear")]
    Collinear,
    #[error("all points are coplanar")]
    Coplanar,
}

/// Computes the 2D convex hull of `points` with Andrew's monotone chain algorithm.
///
/// The hull is returned as an open ring in counter-clockwise order starting at the vertex with the smallest
/// x (and then y) coordinate. Points on the boundary that are collinear with their neighbours are not part of the
/// ring. Fails with [`HullError::TooFewPoints`] for less than 3 distinct points and with [`HullError::Collinear`]
/// if all points lie on one line.
/// ```
/// # use footprints_core::nalgebra::Vector2;
/// # use footprints_algorithms::convexhull::*;
/// let hull = convex_hull_2d(&[
///     Vector2::new(0.0, 0.0),
///     Vector2::new(2.0, 0.0),
///     Vector2::new(1.0, 0.5),
///     Vector2::new(0.0, 2.0),
/// ]).unwrap();
/// assert_eq!(hull.len(), 3);
/// assert_eq!(polygon_area(&hull), 2.0);
/// ```
pub fn convex_hull_2d(points: &[Vector2<f64>]) -> Result<Vec<Vector2<f64>>, HullError> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();
    if sorted.len() < 3 {
        return Err(HullError::TooFewPoints);
    }

    let extent = planar_extent(&sorted);
    let tolerance = HULL_RELATIVE_TOLERANCE * extent * extent;

    let mut lower: Vec<Vector2<f64>> = Vec::with_capacity(sorted.len());
    for point in sorted.iter() {
        while lower.len() >= 2
            && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], point) <= tolerance
        {
            lower.pop();
        }
        lower.push(*point);
    }
    let mut upper: Vec<Vector2<f64>> = Vec::with_capacity(sorted.len());
    for point in sorted.iter().rev() {
        while upper.len() >= 2
            && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], point) <= tolerance
        {
            upper.pop();
        }
        upper.push(*point);
    }

    // The last point of each chain is the first point of the other one
    lower.pop();
    upper.pop();
    lower.append(&mut upper);

    if lower.len() < 3 || 2.0 * polygon_area(&lower) <= tolerance {
        return Err(HullError::Collinear);
    }
    Ok(lower)
}

/// Area of the polygon given as an open ring, calculated with the shoelace formula. The result does not depend on
/// the orientation of the ring and is never negative
pub fn polygon_area(ring: &[Vector2<f64>]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let twice_area: f64 = (0..ring.len())
        .map(|idx| {
            let current = &ring[idx];
            let next = &ring[(idx + 1) % ring.len()];
            current.x * next.y - next.x * current.y
        })
        .sum();
    twice_area.abs() / 2.0
}

/// z-component of `(a - o) x (b - o)`. Positive if `o -> a -> b` is a counter-clockwise turn
fn cross(o: &Vector2<f64>, a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn planar_extent(points: &[Vector2<f64>]) -> f64 {
    let (min, max) = points.iter().fold(
        (Vector2::repeat(f64::MAX), Vector2::repeat(f64::MIN)),
        |(min, max), p| (min.inf(p), max.sup(p)),
    );
    (max - min).max()
}

#[derive(Clone, Copy, Debug)]
struct Triangle {
    a: usize,
    b: usize,
    c: usize,
    normal: Vector3<f64>,
}

#[derive(Eq, Clone, Copy, Debug)]
struct Edge {
    a: usize,
    b: usize,
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.a == other.a && self.b == other.b || self.a == other.b && self.b == other.a
    }
}

impl Hash for Edge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.a.min(self.b).hash(state);
        self.a.max(self.b).hash(state);
    }
}

/// The 3D convex hull of a point set as a closed triangle mesh. All triangles are oriented counter-clockwise when
/// seen from outside the hull
#[derive(Debug, Clone)]
pub struct ConvexHull3 {
    vertices: Vec<Vector3<f64>>,
    triangles: Vec<Triangle>,
    interior_point: Vector3<f64>,
}

impl ConvexHull3 {
    /// The triangles of the hull, as indices into the points that the hull was computed from
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        self.triangles.iter().map(|t| [t.a, t.b, t.c]).collect()
    }

    /// Indices of the points that are vertices of the hull, ascending
    pub fn vertex_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self
            .triangles
            .iter()
            .flat_map(|t| [t.a, t.b, t.c])
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        indices.sort_unstable();
        indices
    }

    /// Volume enclosed by the hull, as the sum of the signed volumes of the tetrahedra spanned by each triangle and
    /// a point inside the hull
    pub fn volume(&self) -> f64 {
        let reference = self.interior_point;
        let six_times_volume: f64 = self
            .triangles
            .iter()
            .map(|t| {
                let a = self.vertices[t.a] - reference;
                let b = self.vertices[t.b] - reference;
                let c = self.vertices[t.c] - reference;
                a.dot(&b.cross(&c))
            })
            .sum();
        six_times_volume.abs() / 6.0
    }
}

/// Computes the 3D convex hull of `points` as a triangle mesh.
///
/// The hull starts from a tetrahedron of extreme points and is extended incrementally: every point outside of the
/// current hull removes the triangles it can see, and the boundary of the removed region is connected to the new
/// point. Fails with [`HullError::TooFewPoints`] for less than 4 points or a zero extent, with
/// [`HullError::Collinear`] if all points lie on one line and with [`HullError::Coplanar`] if all points lie in one
/// plane.
pub fn convex_hull_3d(points: &[Vector3<f64>]) -> Result<ConvexHull3, HullError> {
    if points.len() < 4 {
        return Err(HullError::TooFewPoints);
    }
    let extent = spatial_extent(points);
    if extent == 0.0 {
        return Err(HullError::TooFewPoints);
    }

    let [i0, i1, i2, i3] = initial_tetrahedron(points, extent)?;
    let interior_point = (points[i0] + points[i1] + points[i2] + points[i3]) / 4.0;
    let mut triangles = Vec::new();
    for (a, b, c) in [(i0, i1, i2), (i0, i1, i3), (i0, i2, i3), (i1, i2, i3)] {
        triangles.push(outward_triangle(points, a, b, c, &interior_point));
    }

    let visibility_tolerance = HULL_RELATIVE_TOLERANCE * extent * extent * extent;
    for (pointid, point) in points.iter().enumerate() {
        if pointid == i0 || pointid == i1 || pointid == i2 || pointid == i3 {
            continue;
        }
        iteration(points, pointid, point, visibility_tolerance, &mut triangles);
    }

    Ok(ConvexHull3 {
        vertices: points.to_vec(),
        triangles,
        interior_point,
    })
}

/// Adds the point `pointid` to the hull given by `triangles`. If the point lies inside the current hull, nothing
/// changes. Otherwise all triangles facing the point are removed, and every edge of the removed region that is
/// not shared by two removed triangles gets connected to the point by a new triangle.
fn iteration(
    points: &[Vector3<f64>],
    pointid: usize,
    point: &Vector3<f64>,
    visibility_tolerance: f64,
    triangles: &mut Vec<Triangle>,
) {
    let mut outer_edges = HashSet::new();
    let mut inner_edges = HashSet::new();
    let mut horizon = Vec::new();

    triangles.retain(|tri| {
        let ap: Vector3<f64> = point - points[tri.a];
        if ap.dot(&tri.normal) > visibility_tolerance {
            add_edge_to_outer_or_inner_edges(tri.a, tri.b, &mut outer_edges, &mut inner_edges);
            add_edge_to_outer_or_inner_edges(tri.b, tri.c, &mut outer_edges, &mut inner_edges);
            add_edge_to_outer_or_inner_edges(tri.c, tri.a, &mut outer_edges, &mut inner_edges);
            horizon.extend([
                Edge { a: tri.a, b: tri.b },
                Edge { a: tri.b, b: tri.c },
                Edge { a: tri.c, b: tri.a },
            ]);
            return false;
        }
        true
    });

    // Keep the orientation the edges had in the removed triangles, so that the new triangles face outwards
    horizon.retain(|edge| outer_edges.contains(edge));
    for edge in horizon {
        triangles.push(Triangle {
            a: edge.a,
            b: edge.b,
            c: pointid,
            normal: calc_normal(points[edge.a], points[edge.b], *point),
        });
    }
}

/// Picks four points that span a tetrahedron with a large volume: the two axis-extreme points farthest apart, the
/// point farthest from the line through them, and the point farthest from the plane through those three
fn initial_tetrahedron(points: &[Vector3<f64>], extent: f64) -> Result<[usize; 4], HullError> {
    let mut extremes = Vec::with_capacity(6);
    for axis in 0..3 {
        let (min_idx, max_idx) = (0..points.len()).fold((0, 0), |(min_idx, max_idx), idx| {
            (
                if points[idx][axis] < points[min_idx][axis] { idx } else { min_idx },
                if points[idx][axis] > points[max_idx][axis] { idx } else { max_idx },
            )
        });
        extremes.push((min_idx, max_idx));
    }
    let (i0, i1, _) = extremes
        .into_iter()
        .fold((0, 0, -1.0), |best, (a, b)| {
            let distance = (points[b] - points[a]).magnitude_squared();
            if distance > best.2 {
                (a, b, distance)
            } else {
                best
            }
        });

    let line = points[i1] - points[i0];
    let (i2, line_distance) = farthest(points, |p| line.cross(&(p - points[i0])).magnitude());
    if line_distance <= HULL_RELATIVE_TOLERANCE * extent * extent {
        return Err(HullError::Collinear);
    }

    let normal = calc_normal(points[i0], points[i1], points[i2]);
    let (i3, plane_distance) = farthest(points, |p| normal.dot(&(p - points[i0])).abs());
    if plane_distance <= HULL_RELATIVE_TOLERANCE * extent * extent * extent {
        return Err(HullError::Coplanar);
    }
    Ok([i0, i1, i2, i3])
}

/// Index of the first point with the largest `measure`, together with that value
fn farthest<F: Fn(&Vector3<f64>) -> f64>(points: &[Vector3<f64>], measure: F) -> (usize, f64) {
    points
        .iter()
        .enumerate()
        .fold((0, f64::MIN), |best, (idx, p)| {
            let value = measure(p);
            if value > best.1 {
                (idx, value)
            } else {
                best
            }
        })
}

fn outward_triangle(
    points: &[Vector3<f64>],
    a: usize,
    b: usize,
    c: usize,
    interior_point: &Vector3<f64>,
) -> Triangle {
    let normal = calc_normal(points[a], points[b], points[c]);
    if normal.dot(&(interior_point - points[a])) > 0.0 {
        Triangle {
            a,
            b: c,
            c: b,
            normal: -normal,
        }
    } else {
        Triangle { a, b, c, normal }
    }
}

fn spatial_extent(points: &[Vector3<f64>]) -> f64 {
    AABB::from_positions(points.iter().map(|p| Point3::from(*p)))
        .map_or(0.0, |bounds| bounds.max_extent())
}

/// Adds the given edge to the set of outer edges. If the given edge is already contained in the set of outer edges it is removed and added to the set of inner edges.
/// `a`: first vertex of the edge
/// `b`: second vertex of the edge
/// `outer_edges`: the set of outer edges
/// `inner_edges`: the set of inner edges
fn add_edge_to_outer_or_inner_edges(
    a: usize,
    b: usize,
    outer_edges: &mut HashSet<Edge>,
    inner_edges: &mut HashSet<Edge>,
) {
    let e = Edge { a, b };
    if !outer_edges.insert(e) {
        outer_edges.remove(&e);
        inner_edges.insert(e);
    }
}

/// Calculates the (non-normalized) normal of the triangle `a`, `b`, `c`
fn calc_normal(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Vector3<f64> {
    let ab: Vector3<f64> = b - a;
    let ac: Vector3<f64> = c - a;
    ab.cross(&ac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use assert_approx_eq::assert_approx_eq;
    use rand::{distributions::Uniform, thread_rng, Rng};

    fn unit_cube() -> Vec<Vector3<f64>> {
        let mut corners = Vec::new();
        for z in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                for x in [0.0, 1.0] {
                    corners.push(Vector3::new(x, y, z));
                }
            }
        }
        corners
    }

    fn test_normals_for_triangles(hull: &ConvexHull3, normals: &[Vector3<f64>]) {
        for n in normals {
            let found = hull
                .triangles
                .iter()
                .any(|t| f64::abs(t.normal.normalize().dot(n) - 1.0) < 0.0001);
            assert!(found, "No triangle with normal {:?}", n);
        }
    }

    fn test_all_points_inside_hull(points: &[Vector3<f64>], hull: &ConvexHull3) {
        for point in points {
            for t in hull.triangles.iter() {
                let pa = points[t.a] - point;
                assert!(pa.dot(&t.normal) >= -0.0000001);
            }
        }
    }

    fn test_closed_mesh(hull: &ConvexHull3) {
        // In a closed, consistently oriented mesh every directed edge appears exactly once
        let mut directed = HashSet::new();
        for t in hull.triangles.iter() {
            for edge in [(t.a, t.b), (t.b, t.c), (t.c, t.a)] {
                assert!(directed.insert(edge));
            }
        }
        for (a, b) in directed.iter() {
            assert!(directed.contains(&(*b, *a)));
        }
    }

    #[test]
    fn test_hull_2d_square_with_interior_and_boundary_points() -> Result<()> {
        let points = vec![
            Vector2::new(0.5, 0.5),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 0.0),
            Vector2::new(0.5, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
            Vector2::new(0.2, 0.7),
        ];
        let hull = convex_hull_2d(&points)?;
        assert_eq!(
            hull,
            vec![
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(0.0, 1.0),
            ]
        );
        assert_approx_eq!(polygon_area(&hull), 1.0);
        Ok(())
    }

    #[test]
    fn test_hull_2d_is_counter_clockwise() -> Result<()> {
        let mut rng = thread_rng();
        let points: Vec<Vector2<f64>> = (0..200)
            .map(|_| {
                Vector2::new(
                    rng.sample(Uniform::new(-50.0, 50.0)),
                    rng.sample(Uniform::new(-50.0, 50.0)),
                )
            })
            .collect();
        let hull = convex_hull_2d(&points)?;
        for idx in 0..hull.len() {
            let o = &hull[idx];
            let a = &hull[(idx + 1) % hull.len()];
            let b = &hull[(idx + 2) % hull.len()];
            assert!(cross(o, a, b) > 0.0);
        }
        for point in points.iter() {
            for idx in 0..hull.len() {
                let turn = cross(&hull[idx], &hull[(idx + 1) % hull.len()], point);
                assert!(turn >= -HULL_RELATIVE_TOLERANCE * 100.0 * 100.0);
            }
        }
        Ok(())
    }

    #[test]
    fn test_hull_2d_degenerate_inputs() {
        assert_eq!(
            convex_hull_2d(&[Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)]),
            Err(HullError::TooFewPoints)
        );
        assert_eq!(
            convex_hull_2d(&[Vector2::new(1.0, 1.0); 5]),
            Err(HullError::TooFewPoints)
        );
        assert_eq!(
            convex_hull_2d(&[
                Vector2::new(0.0, 0.0),
                Vector2::new(1.0, 1.0),
                Vector2::new(2.0, 2.0),
            ]),
            Err(HullError::Collinear)
        );
    }

    #[test]
    fn test_polygon_area_ignores_orientation() {
        let ccw = vec![
            Vector2::new(0.0, 0.0),
            Vector2::new(4.0, 0.0),
            Vector2::new(4.0, 3.0),
        ];
        let cw: Vec<Vector2<f64>> = ccw.iter().rev().copied().collect();
        assert_approx_eq!(polygon_area(&ccw), 6.0);
        assert_approx_eq!(polygon_area(&cw), 6.0);
        assert_eq!(polygon_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_hull_3d_tetrahedron() -> Result<()> {
        let points = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        let hull = convex_hull_3d(&points)?;
        assert_eq!(hull.triangles().len(), 4);
        let normals = vec![
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(1.0, 1.0, 1.0).normalize(),
        ];
        test_normals_for_triangles(&hull, &normals);
        test_all_points_inside_hull(&points, &hull);
        assert_approx_eq!(hull.volume(), 1.0 / 6.0);
        Ok(())
    }

    #[test]
    fn test_hull_3d_tetrahedron_with_outside_point() -> Result<()> {
        let points = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(-1.0, -1.0, -1.0),
        ];
        let hull = convex_hull_3d(&points)?;
        assert_eq!(hull.triangles().len(), 4);
        assert_eq!(hull.vertex_indices(), vec![1, 2, 3, 4]);
        let normals = vec![
            Vector3::new(1.0, 1.0, 1.0).normalize(),
            Vector3::new(1.0, 1.0, -3.0).normalize(),
            Vector3::new(1.0, -3.0, 1.0).normalize(),
            Vector3::new(-3.0, 1.0, 1.0).normalize(),
        ];
        test_normals_for_triangles(&hull, &normals);
        test_all_points_inside_hull(&points, &hull);
        test_closed_mesh(&hull);
        Ok(())
    }

    #[test]
    fn test_hull_3d_unit_cube_volume() -> Result<()> {
        let points = unit_cube();
        let hull = convex_hull_3d(&points)?;
        assert_approx_eq!(hull.volume(), 1.0);
        assert_eq!(hull.vertex_indices(), (0..8).collect::<Vec<_>>());
        test_all_points_inside_hull(&points, &hull);
        test_closed_mesh(&hull);
        Ok(())
    }

    #[test]
    fn test_hull_3d_in_projected_coordinates() -> Result<()> {
        let offset = Vector3::new(524288.0, 4194304.0, 128.0);
        let corners: Vec<Vector3<f64>> = unit_cube()
            .into_iter()
            .map(|corner| offset + corner.component_mul(&Vector3::new(10.0, 20.0, 5.0)))
            .collect();
        let hull = convex_hull_3d(&corners)?;
        assert_approx_eq!(hull.volume(), 1000.0, 1e-6);
        test_closed_mesh(&hull);

        let roof: Vec<Vector3<f64>> = corners
            .iter()
            .map(|p| Vector3::new(p.x, p.y, 128.0))
            .collect();
        assert_eq!(convex_hull_3d(&roof).err(), Some(HullError::Coplanar));
        Ok(())
    }

    #[test]
    fn test_hull_3d_random_points_in_cube() -> Result<()> {
        let mut rng = thread_rng();
        let mut points = unit_cube();
        for _ in 0..500 {
            points.push(Vector3::new(
                rng.sample(Uniform::new(0.0, 1.0)),
                rng.sample(Uniform::new(0.0, 1.0)),
                rng.sample(Uniform::new(0.0, 1.0)),
            ));
        }
        let hull = convex_hull_3d(&points)?;
        assert_approx_eq!(hull.volume(), 1.0, 1e-9);
        test_all_points_inside_hull(&points, &hull);
        test_closed_mesh(&hull);
        Ok(())
    }

    #[test]
    fn test_hull_3d_degenerate_inputs() {
        let three = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ];
        assert_eq!(convex_hull_3d(&three).err(), Some(HullError::TooFewPoints));

        let same = vec![Vector3::new(2.0, 2.0, 2.0); 6];
        assert_eq!(convex_hull_3d(&same).err(), Some(HullError::TooFewPoints));

        let line: Vec<Vector3<f64>> = (0..5)
            .map(|i| Vector3::new(i as f64, 2.0 * i as f64, 0.0))
            .collect();
        assert_eq!(convex_hull_3d(&line).err(), Some(HullError::Collinear));

        let plane = vec![
            Vector3::new(0.0, 0.0, 5.0),
            Vector3::new(1.0, 0.0, 5.0),
            Vector3::new(1.0, 1.0, 5.0),
            Vector3::new(0.0, 1.0, 5.0),
        ];
        assert_eq!(convex_hull_3d(&plane).err(), Some(HullError::Coplanar));
    }
}
