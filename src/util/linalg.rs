#[allow(unused_imports)]
use crate::core::prelude::*;

use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::iter::Sum;
use std::{
    fmt,
    fmt::Formatter,
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};

use crate::util::gg_float;

/// A 2D vector using 32-bit floating point components.
///
/// [`Vec2`] carries no coordinate-space tag: it is the scratch type used for untyped math
/// (edge vectors, projection axes, matrix products). Values that belong to a particular space
/// live in the tagged types of [`coords`](crate::util::coords) and are converted to [`Vec2`]
/// explicitly.
///
/// # Examples
///
/// ```
/// use ggshape::util::linalg::Vec2;
///
/// let v1 = Vec2 { x: 3.0, y: 4.0 };
/// let v2 = Vec2 { x: 1.0, y: 2.0 };
/// assert_eq!(v1 + v2, Vec2 { x: 4.0, y: 6.0 });
/// assert_eq!(v1.len(), 5.0);
/// ```
///
/// # Equality and ordering
/// Two vectors are considered equal if their components differ by less than
/// [`EPSILON`](crate::core::config::EPSILON). The [`Ord`] implementation exists so that axes can
/// be collected into a `BTreeSet`; it has no geometric meaning.
#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl PartialEq for Vec2 {
    fn eq(&self, other: &Self) -> bool {
        if self.is_finite() || other.is_finite() {
            (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
        } else {
            self.x == other.x && self.y == other.y
        }
    }
}
impl Eq for Vec2 {}

impl PartialOrd<Self> for Vec2 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vec2 {
    fn cmp(&self, other: &Self) -> Ordering {
        if self == other {
            return Ordering::Equal;
        }
        if (self.x - other.x).abs() < EPSILON {
            return self.y.partial_cmp(&other.y).unwrap_or_else(|| {
                warn!("Vec2: partial_cmp() failed for y: {} vs. {}", self, other);
                self.y.total_cmp(&other.y)
            });
        }
        self.x.partial_cmp(&other.x).unwrap_or_else(|| {
            warn!("Vec2: partial_cmp() failed for x: {} vs. {}", self, other);
            self.x.total_cmp(&other.x)
        })
    }
}

impl Vec2 {
    /// Returns a vector with both components set to 1.0.
    #[must_use]
    pub fn one() -> Vec2 {
        Vec2 { x: 1.0, y: 1.0 }
    }
    /// Returns a vector with both components set to 0.0.
    #[must_use]
    pub fn zero() -> Vec2 {
        Vec2 { x: 0.0, y: 0.0 }
    }

    /// Creates a new vector with both components set to the given value.
    ///
    /// # Examples
    ///
    /// ```
    /// use ggshape::util::linalg::Vec2;
    /// let vec = Vec2::splat(3.0);
    /// assert_eq!(vec.x, 3.0);
    /// assert_eq!(vec.y, 3.0);
    /// ```
    #[must_use]
    pub fn splat(v: f32) -> Vec2 {
        Vec2 { x: v, y: v }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns the squared length of the vector.
    ///
    /// Use this instead of [`len`](Vec2::len) when comparing lengths to avoid the square root.
    #[must_use]
    pub fn len_squared(&self) -> f32 {
        self.dot(*self)
    }

    /// Returns the length of the vector.
    #[must_use]
    pub fn len(&self) -> f32 {
        self.len_squared().sqrt()
    }

    /// Returns a normalised (unit) vector in the same direction as this vector.
    ///
    /// If the original vector's length is zero, returns a zero vector to avoid
    /// division by zero. Also converts negative zero (-0.0) to positive zero (0.0).
    #[must_use]
    pub fn normed(&self) -> Vec2 {
        let mut rv = match self.len() {
            0.0 => Vec2::zero(),
            len => *self / len,
        };
        rv.x = gg_float::force_positive_zero(rv.x);
        rv.y = gg_float::force_positive_zero(rv.y);
        rv
    }

    /// Returns a new vector rotated counterclockwise by the given angle in radians, in a
    /// +y-up frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use ggshape::util::linalg::Vec2;
    /// let v = Vec2 { x: 1.0, y: 0.0 };
    /// let rotated = v.rotated(std::f32::consts::FRAC_PI_2);
    /// assert!(rotated.almost_eq(Vec2 { x: 0.0, y: 1.0 }));
    /// ```
    #[must_use]
    pub fn rotated(&self, radians: f32) -> Vec2 {
        Mat3x3::rotation(radians) * *self
    }

    /// Returns the vector rotated by 90 degrees: `(x, y) -> (y, -x)`.
    ///
    /// Used to turn an edge direction into a projection axis.
    #[must_use]
    pub fn orthog(&self) -> Vec2 {
        Vec2 {
            x: self.y,
            y: -self.x,
        }
    }

    #[must_use]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// The z-component of the 3D cross product of the two vectors extended with z = 0.
    #[must_use]
    pub fn cross(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    #[must_use]
    pub fn almost_eq(&self, rhs: Vec2) -> bool {
        (*self - rhs).len() < EPSILON
    }
}

impl Zero for Vec2 {
    fn zero() -> Self {
        Vec2::zero()
    }

    fn is_zero(&self) -> bool {
        *self == Vec2::zero()
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(value: [f32; 2]) -> Self {
        Vec2 {
            x: value[0],
            y: value[1],
        }
    }
}

impl From<Vec2> for [f32; 2] {
    fn from(value: Vec2) -> Self {
        [value.x, value.y]
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let precision = f.precision();

        write!(f, "vec(")?;
        if let Some(p) = precision {
            write!(f, "{0:.1$}", self.x, p)?;
            write!(f, ", {0:.1$}", self.y, p)?;
        } else {
            write!(f, "{}, {}", self.x, self.y)?;
        }
        write!(f, ")")
    }
}

impl Add<Vec2> for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl AddAssign<Vec2> for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub<Vec2> for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl SubAssign<Vec2> for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Sum<Vec2> for Vec2 {
    fn sum<I: Iterator<Item = Vec2>>(iter: I) -> Self {
        iter.fold(Vec2::zero(), Vec2::add)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Self::Output {
        rhs * self
    }
}
impl Mul<Vec2> for f32 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}
impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f32) -> Self::Output {
        Vec2 {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}
impl DivAssign<f32> for Vec2 {
    fn div_assign(&mut self, rhs: f32) {
        self.x /= rhs;
        self.y /= rhs;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Self::Output {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// A 3x3 matrix representation for 2D transformations.
///
/// This matrix uses homogeneous coordinates. The elements are arranged as follows:
/// ```text
/// | xx xy xw |
/// | yx yy yw |
/// | wx wy ww |
/// ```
/// where the first two columns represent linear transformation components,
/// and the third column represents translation components.
///
/// Shapes hand these to the shader binder as uniforms; CPU-side geometry never goes through
/// them (see [`Transform`](crate::shape::transform::Transform)).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Mat3x3 {
    pub xx: f32,
    pub xy: f32,
    pub xw: f32,
    pub yx: f32,
    pub yy: f32,
    pub yw: f32,
    pub wx: f32,
    pub wy: f32,
    pub ww: f32,
}

impl Mat3x3 {
    /// Creates an identity matrix.
    pub fn one() -> Mat3x3 {
        Mat3x3 {
            xx: 1.0,
            xy: 0.0,
            xw: 0.0,
            yx: 0.0,
            yy: 1.0,
            yw: 0.0,
            wx: 0.0,
            wy: 0.0,
            ww: 1.0,
        }
    }

    /// Creates a translation matrix.
    ///
    /// ```text
    /// | 1 0 dx |
    /// | 0 1 dy |
    /// | 0 0 1  |
    /// ```
    pub fn translation(dx: f32, dy: f32) -> Mat3x3 {
        Mat3x3 {
            xw: dx,
            yw: dy,
            ..Mat3x3::one()
        }
    }

    pub fn translation_vec2(vec2: Vec2) -> Mat3x3 {
        Self::translation(vec2.x, vec2.y)
    }

    /// Creates a non-uniform scale matrix.
    pub fn scale(sx: f32, sy: f32) -> Mat3x3 {
        Mat3x3 {
            xx: sx,
            yy: sy,
            ..Mat3x3::one()
        }
    }

    /// Creates a rotation matrix.
    ///
    /// Returns a matrix that rotates points counterclockwise (in a +y-up frame) by the
    /// specified angle:
    /// ```text
    /// | cos(θ)  -sin(θ)  0 |
    /// | sin(θ)   cos(θ)  0 |
    /// | 0        0       1 |
    /// ```
    pub fn rotation(radians: f32) -> Mat3x3 {
        Mat3x3 {
            xx: f32::cos(radians),
            xy: -f32::sin(radians),
            yx: f32::sin(radians),
            yy: f32::cos(radians),
            ..Mat3x3::one()
        }
    }

    /// Row-major flattening, the layout uniform upload hooks expect.
    #[must_use]
    pub fn to_array(&self) -> [f32; 9] {
        [
            self.xx, self.xy, self.xw, self.yx, self.yy, self.yw, self.wx, self.wy, self.ww,
        ]
    }

    #[must_use]
    pub fn almost_eq(&self, rhs: Mat3x3) -> bool {
        self.to_array()
            .into_iter()
            .zip(rhs.to_array())
            .all(|(a, b)| (a - b).abs() < EPSILON)
    }
}

impl One for Mat3x3 {
    fn one() -> Self {
        Mat3x3::one()
    }
}

impl Mul<Vec2> for Mat3x3 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.xx * rhs.x + self.xy * rhs.y + self.xw,
            y: self.yx * rhs.x + self.yy * rhs.y + self.yw,
        }
    }
}

impl Mul<Mat3x3> for Mat3x3 {
    type Output = Mat3x3;

    fn mul(self, rhs: Mat3x3) -> Self::Output {
        Mat3x3 {
            xx: self.xx * rhs.xx + self.xy * rhs.yx + self.xw * rhs.wx,
            xy: self.xx * rhs.xy + self.xy * rhs.yy + self.xw * rhs.wy,
            xw: self.xx * rhs.xw + self.xy * rhs.yw + self.xw * rhs.ww,
            yx: self.yx * rhs.xx + self.yy * rhs.yx + self.yw * rhs.wx,
            yy: self.yx * rhs.xy + self.yy * rhs.yy + self.yw * rhs.wy,
            yw: self.yx * rhs.xw + self.yy * rhs.yw + self.yw * rhs.ww,
            wx: self.wx * rhs.xx + self.wy * rhs.yx + self.ww * rhs.wx,
            wy: self.wx * rhs.xy + self.wy * rhs.yy + self.ww * rhs.wy,
            ww: self.wx * rhs.xw + self.wy * rhs.yw + self.ww * rhs.ww,
        }
    }
}

impl MulAssign<Mat3x3> for Mat3x3 {
    fn mul_assign(&mut self, rhs: Mat3x3) {
        *self = *self * rhs;
    }
}
