use nalgebra::{ClosedSub, Point3, Scalar, Vector3};

/// 3D axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB<T: Scalar + PartialOrd> {
    min: Point3<T>,
    max: Point3<T>,
}

impl<T: Scalar + ClosedSub + PartialOrd + Copy> AABB<T> {
    /// Creates a new AABB from the given minimum and maximum coordinates. Panics if the minimum position is
    /// not less than or equal to the maximum position
    /// ```
    /// # use footprints_core::math::AABB;
    /// let bounds = AABB::from_min_max(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 1.0, 1.0));
    /// ```
    pub fn from_min_max(min: Point3<T>, max: Point3<T>) -> Self {
        if min.x > max.x || min.y > max.y || min.z > max.z {
            panic!("AABB::from_min_max: Minimum position must be <= maximum position!");
        }
        Self { min, max }
    }

    /// Creates a new AABB from the given minimum and maximum coordinates without checking that min <= max
    pub fn from_min_max_unchecked(min: Point3<T>, max: Point3<T>) -> Self {
        Self { min, max }
    }

    /// Calculates the bounds of the given positions. Returns `None` if `positions` is empty
    /// ```
    /// # use footprints_core::math::AABB;
    /// # use nalgebra::Point3;
    /// let bounds = AABB::from_positions(vec![Point3::new(1.0, -2.0, 0.5), Point3::new(-1.0, 3.0, 0.0)]).unwrap();
    /// assert_eq!(*bounds.min(), Point3::new(-1.0, -2.0, 0.0));
    /// assert_eq!(*bounds.max(), Point3::new(1.0, 3.0, 0.5));
    /// ```
    pub fn from_positions<I: IntoIterator<Item = Point3<T>>>(positions: I) -> Option<Self> {
        let mut positions = positions.into_iter();
        let first = positions.next()?;
        let initial = Self::from_min_max_unchecked(first, first);
        Some(positions.fold(initial, |bounds, position| {
            Self::extend_with_point(&bounds, &position)
        }))
    }

    pub fn min(&self) -> &Point3<T> {
        &self.min
    }

    pub fn max(&self) -> &Point3<T> {
        &self.max
    }

    /// Returns the extent of this AABB. The extent is the size between the minimum and maximum position of this AABB
    /// ```
    /// # use footprints_core::math::AABB;
    /// let bounds = AABB::from_min_max_unchecked(nalgebra::Point3::new(0.0, 0.0, 0.0), nalgebra::Point3::new(1.0, 2.0, 3.0));
    /// assert_eq!(bounds.extent(), nalgebra::Vector3::new(1.0, 2.0, 3.0));
    /// ```
    pub fn extent(&self) -> Vector3<T> {
        self.max - self.min
    }

    /// Computes the smallest AABB that fully contains both `a` and `b`
    pub fn union(a: &AABB<T>, b: &AABB<T>) -> Self {
        Self {
            min: Point3::new(
                lesser(a.min.x, b.min.x),
                lesser(a.min.y, b.min.y),
                lesser(a.min.z, b.min.z),
            ),
            max: Point3::new(
                greater(a.max.x, b.max.x),
                greater(a.max.y, b.max.y),
                greater(a.max.z, b.max.z),
            ),
        }
    }

    /// Extends the given AABB so that it contains the given point
    pub fn extend_with_point(bounds: &AABB<T>, point: &Point3<T>) -> AABB<T> {
        Self::union(bounds, &Self::from_min_max_unchecked(*point, *point))
    }
}

impl AABB<f64> {
    /// Length of the longest side of this AABB
    pub fn max_extent(&self) -> f64 {
        self.extent().max()
    }
}

fn lesser<T: PartialOrd>(a: T, b: T) -> T {
    if b < a {
        b
    } else {
        a
    }
}

fn greater<T: PartialOrd>(a: T, b: T) -> T {
    if b > a {
        b
    } else {
        a
    }
}
