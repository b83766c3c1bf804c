//! Utility functions and extension traits for geometry values.
//!
//! The streaming transform needs to look at a geometry as a list of parts
//! and to put a list of parts back together. `geo` does not expose either
//! view uniformly across its `Geometry` variants, so this module adds them.

use geo::{
    Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point,
    Polygon,
};

/// Extension trait exposing a part-oriented view of [`Geometry`].
///
/// # Examples
///
/// ```
/// use geo::{Geometry, MultiPoint, Point};
/// use spatialstats_core::utils::GeometryExt;
///
/// let geometry = Geometry::MultiPoint(MultiPoint::new(vec![
///     Point::new(0.0, 0.0),
///     Point::new(1.0, 1.0),
/// ]));
/// assert_eq!(geometry.num_geometries(), 2);
/// assert_eq!(geometry.geometry_type(), "MultiPoint");
/// ```
pub trait GeometryExt {
    /// Human-readable name of the geometry variant.
    fn geometry_type(&self) -> &'static str;

    /// Number of parts: the member count of a multi-part geometry, 1 otherwise.
    fn num_geometries(&self) -> usize;

    /// The parts of this geometry, in order. A single-part geometry yields
    /// a clone of itself.
    fn parts(&self) -> Vec<Geometry<f64>>;
}

impl GeometryExt for Geometry<f64> {
    fn geometry_type(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::Line(_) => "Line",
            Geometry::LineString(_) => "LineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::GeometryCollection(_) => "GeometryCollection",
            Geometry::Rect(_) => "Rect",
            Geometry::Triangle(_) => "Triangle",
        }
    }

    fn num_geometries(&self) -> usize {
        match self {
            Geometry::MultiPoint(g) => g.0.len(),
            Geometry::MultiLineString(g) => g.0.len(),
            Geometry::MultiPolygon(g) => g.0.len(),
            Geometry::GeometryCollection(g) => g.0.len(),
            _ => 1,
        }
    }

    fn parts(&self) -> Vec<Geometry<f64>> {
        match self {
            Geometry::MultiPoint(g) => g.0.iter().copied().map(Geometry::Point).collect(),
            Geometry::MultiLineString(g) => {
                g.0.iter().cloned().map(Geometry::LineString).collect()
            },
            Geometry::MultiPolygon(g) => g.0.iter().cloned().map(Geometry::Polygon).collect(),
            Geometry::GeometryCollection(g) => g.0.clone(),
            other => vec![other.clone()],
        }
    }
}

/// Combines parts into a single multi-part geometry.
///
/// Homogeneous parts produce the matching multi type (`MultiPolygon`,
/// `MultiLineString`, `MultiPoint`); anything else becomes a
/// `GeometryCollection`. Part order is preserved.
#[must_use]
pub fn build_geometry(parts: Vec<Geometry<f64>>) -> Geometry<f64> {
    if parts.iter().all(|g| matches!(g, Geometry::Polygon(_))) {
        let polygons: Vec<Polygon<f64>> = parts
            .into_iter()
            .filter_map(|g| match g {
                Geometry::Polygon(p) => Some(p),
                _ => None,
            })
            .collect();
        return Geometry::MultiPolygon(MultiPolygon::new(polygons));
    }
    if parts.iter().all(|g| matches!(g, Geometry::LineString(_))) {
        let lines: Vec<LineString<f64>> = parts
            .into_iter()
            .filter_map(|g| match g {
                Geometry::LineString(l) => Some(l),
                _ => None,
            })
            .collect();
        return Geometry::MultiLineString(MultiLineString::new(lines));
    }
    if parts.iter().all(|g| matches!(g, Geometry::Point(_))) {
        let points: Vec<Point<f64>> = parts
            .into_iter()
            .filter_map(|g| match g {
                Geometry::Point(p) => Some(p),
                _ => None,
            })
            .collect();
        return Geometry::MultiPoint(MultiPoint::new(points));
    }
    Geometry::GeometryCollection(GeometryCollection(parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{line_string, point, polygon};

    fn square(x: f64) -> Polygon<f64> {
        polygon![(x: x, y: 0.0), (x: x + 1.0, y: 0.0), (x: x + 1.0, y: 1.0), (x: x, y: 1.0)]
    }

    #[test]
    fn test_num_geometries_single_part() {
        assert_eq!(Geometry::Polygon(square(0.0)).num_geometries(), 1);
        assert_eq!(Geometry::Point(point!(x: 1.0, y: 2.0)).num_geometries(), 1);
    }

    #[test]
    fn test_parts_of_multipolygon_keep_order() {
        let geometry = Geometry::MultiPolygon(MultiPolygon::new(vec![square(0.0), square(5.0)]));
        let parts = geometry.parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], Geometry::Polygon(square(0.0)));
        assert_eq!(parts[1], Geometry::Polygon(square(5.0)));
    }

    #[test]
    fn test_build_geometry_homogeneous() {
        let built = build_geometry(vec![
            Geometry::Polygon(square(0.0)),
            Geometry::Polygon(square(2.0)),
        ]);
        assert_eq!(built.geometry_type(), "MultiPolygon");
        assert_eq!(built.num_geometries(), 2);

        let built = build_geometry(vec![
            Geometry::LineString(line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)]),
            Geometry::LineString(line_string![(x: 2.0, y: 0.0), (x: 3.0, y: 1.0)]),
        ]);
        assert_eq!(built.geometry_type(), "MultiLineString");
    }

    #[test]
    fn test_build_geometry_mixed() {
        let built = build_geometry(vec![
            Geometry::Polygon(square(0.0)),
            Geometry::Point(point!(x: 9.0, y: 9.0)),
        ]);
        assert_eq!(built.geometry_type(), "GeometryCollection");
        assert_eq!(built.num_geometries(), 2);
    }
}
