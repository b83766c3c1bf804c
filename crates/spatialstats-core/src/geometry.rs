//! Geometry operations applied by the streaming transform.

use geo::{Geometry, HasDimensions, MinimumRotatedRect};

use crate::error::GeometryError;
use crate::schema::GeometryType;
use crate::utils::GeometryExt;

/// A pure function from one geometry to one derived geometry.
pub trait GeometryOperation: Send + Sync {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    /// Declared type of every geometry this operation produces.
    fn output_type(&self) -> GeometryType;

    /// Applies the operation.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`] if the input is empty or degenerate.
    fn apply(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, GeometryError>;
}

/// Minimum-area bounding rectangle, of any orientation.
///
/// Delegates to [`geo::MinimumRotatedRect`]; the result is always a polygon.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumRectangle;

impl GeometryOperation for MinimumRectangle {
    fn name(&self) -> &'static str {
        "minimum rectangle"
    }

    fn output_type(&self) -> GeometryType {
        GeometryType::Polygon
    }

    fn apply(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>, GeometryError> {
        if geometry.is_empty() {
            return Err(GeometryError::Empty {
                operation: self.name(),
                geometry_type: geometry.geometry_type(),
            });
        }
        geometry
            .minimum_rotated_rect()
            .map(Geometry::Polygon)
            .ok_or(GeometryError::Degenerate {
                operation: self.name(),
                geometry_type: geometry.geometry_type(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::{Area, LineString, MultiPolygon, Polygon, polygon};

    fn area(geometry: &Geometry<f64>) -> f64 {
        geometry.unsigned_area()
    }

    #[test]
    fn test_rectangle_of_triangle() {
        let triangle = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 4.0, y: 0.0),
            (x: 0.0, y: 3.0),
        ]);
        let rect = MinimumRectangle.apply(&triangle).unwrap();
        let Geometry::Polygon(rect) = rect else {
            panic!("expected polygon")
        };
        // Closed ring of four corners
        assert_eq!(rect.exterior().0.len(), 5);
        assert!(rect.interiors().is_empty());
        assert_relative_eq!(rect.unsigned_area(), 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rectangle_of_rectangle_is_itself() {
        let square = Geometry::Polygon(polygon![
            (x: 1.0, y: 1.0),
            (x: 3.0, y: 1.0),
            (x: 3.0, y: 2.0),
            (x: 1.0, y: 2.0),
        ]);
        let rect = MinimumRectangle.apply(&square).unwrap();
        assert_relative_eq!(area(&rect), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_geometry_rejected() {
        let empty = Geometry::MultiPolygon(MultiPolygon::<f64>::new(vec![]));
        let err = MinimumRectangle.apply(&empty).unwrap_err();
        assert_eq!(
            err,
            GeometryError::Empty {
                operation: "minimum rectangle",
                geometry_type: "MultiPolygon",
            }
        );

        let empty = Geometry::Polygon(Polygon::new(LineString::new(vec![]), vec![]));
        assert!(MinimumRectangle.apply(&empty).is_err());
    }

    #[test]
    fn test_output_type_is_polygon() {
        assert_eq!(MinimumRectangle.output_type(), GeometryType::Polygon);
    }
}
