use std::cmp::{max, min};
use std::fmt::Debug;

use rand::Rng;

//////////////////////////////////////////////////////////////////////////////

// Basics

#[macro_export]
macro_rules! static_assert_size {
    ($x:ty, $y:expr) => {
        const _: fn() = || { let _ = std::mem::transmute::<$x, [u8; $y]>; };
    }
}

pub type RNG = rand::rngs::StdRng;
pub type HashSet<K> = fxhash::FxHashSet<K>;
pub type HashMap<K, V> = fxhash::FxHashMap<K, V>;

pub fn clamp<T: PartialOrd>(x: T, min: T, max: T) -> T {
    if x < min { min } else if x > max { max } else { x }
}

pub fn sample<'a, T>(xs: &'a [T], rng: &mut RNG) -> &'a T {
    assert!(!xs.is_empty());
    &xs[rng.gen_range(0..xs.len())]
}

pub fn weighted<'a, T: Debug>(xs: &'a [(i32, T)], rng: &mut RNG) -> &'a T {
    let total = xs.iter().fold(0, |acc, x| acc + x.0);
    assert!(total > 0, "Total: {}; values: {:?}", total, xs);
    let mut value = rng.gen_range(0..total);
    for (weight, choice) in xs {
        value -= weight;
        if value < 0 { return choice; }
    }
    &xs[xs.len() - 1].1
}

//////////////////////////////////////////////////////////////////////////////

// Point and Direction

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Point(pub i32, pub i32);
static_assert_size!(Point, 8);

impl Point {
    pub fn dot(&self, other: Point) -> i64 {
        (self.0 as i64 * other.0 as i64) + (self.1 as i64 * other.1 as i64)
    }

    pub fn in_l2_range(&self, range: i32) -> bool {
        self.len_l2() <= range as f64 + 0.5
    }

    pub fn len_taxicab(&self) -> i32 {
        self.0.abs() + self.1.abs()
    }

    pub fn len_l1(&self) -> i32 {
        max(self.0.abs(), self.1.abs())
    }

    pub fn len_l2(&self) -> f64 {
        (self.len_l2_squared() as f64).sqrt()
    }

    pub fn len_l2_squared(&self) -> i64 {
        let (x, y) = (self.0 as i64, self.1 as i64);
        x * x + y * y
    }

    pub fn signum(&self) -> Point {
        Point(self.0.signum(), self.1.signum())
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, other: Point) -> Point {
        Point(self.0 + other.0, self.1 + other.1)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;
    fn sub(self, other: Point) -> Point {
        Point(self.0 - other.0, self.1 - other.1)
    }
}

pub mod dirs {
    use crate::base::Point;

    pub const NONE: Point = Point( 0,  0);
    pub const N:    Point = Point( 0, -1);
    pub const S:    Point = Point( 0,  1);
    pub const E:    Point = Point( 1,  0);
    pub const W:    Point = Point(-1,  0);
    pub const NE:   Point = Point( 1, -1);
    pub const NW:   Point = Point(-1, -1);
    pub const SE:   Point = Point( 1,  1);
    pub const SW:   Point = Point(-1,  1);

    pub const ALL: [Point; 8] = [N, S, E, W, NE, NW, SE, SW];
    pub const CARDINAL: [Point; 4] = [N, S, E, W];
}

//////////////////////////////////////////////////////////////////////////////

// Matrix

#[derive(Clone, Default)]
pub struct Matrix<T> {
    pub data: Vec<T>,
    pub size: Point,
    pub default: T,
}

// SAFETY: Non-none index() results are always valid indices into data.
impl<T: Clone> Matrix<T> {
    pub fn new(size: Point, value: T) -> Self {
        assert!(0 <= size.0);
        assert!(0 <= size.1);
        let mut data = Vec::new();
        data.resize((size.0 * size.1) as usize, value.clone());
        Self { data, size, default: value }
    }

    pub fn get(&self, point: Point) -> T {
        let Some(x) = self.index(point) else { return self.default.clone(); };
        unsafe { self.data.get_unchecked(x).clone() }
    }

    pub fn set(&mut self, point: Point, value: T) {
        let Some(x) = self.index(point) else { return; };
        unsafe { *self.data.get_unchecked_mut(x) = value; }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    #[inline(always)]
    pub fn contains(&self, point: Point) -> bool {
        let Point(px, py) = point;
        let Point(sx, sy) = self.size;
        0 <= px && px < sx && 0 <= py && py < sy
    }

    #[inline(always)]
    pub fn index(&self, point: Point) -> Option<usize> {
        if !self.contains(point) { return None; }
        Some((point.0 + point.1 * self.size.0) as usize)
    }
}

//////////////////////////////////////////////////////////////////////////////

// Bresenham line-of-sight

#[allow(non_snake_case)]
pub fn LOS(a: Point, b: Point) -> Vec<Point> {
    let x_diff = (a.0 - b.0).abs();
    let y_diff = (a.1 - b.1).abs();
    let x_sign = if b.0 < a.0 { -1 } else { 1 };
    let y_sign = if b.1 < a.1 { -1 } else { 1 };

    let size = (max(x_diff, y_diff) + 1) as usize;
    let mut result = vec![];
    result.reserve_exact(size);
    result.push(a);

    let mut test = 0;
    let mut current = a;

    if x_diff >= y_diff {
        test = (x_diff + test) / 2;
        for _ in 0..x_diff {
            current.0 += x_sign;
            test -= y_diff;
            if test < 0 {
                current.1 += y_sign;
                test += x_diff;
            }
            result.push(current);
        }
    } else {
        test = (y_diff + test) / 2;
        for _ in 0..y_diff {
            current.1 += y_sign;
            test -= x_diff;
            if test < 0 {
                current.0 += x_sign;
                test += y_diff;
            }
            result.push(current);
        }
    }

    assert!(result.len() == size);
    result
}

//////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_point_metrics() {
        let p = Point(3, -4);
        assert_eq!(p.len_l1(), 4);
        assert_eq!(p.len_taxicab(), 7);
        assert_eq!(p.len_l2_squared(), 25);
        assert_eq!(p.signum(), Point(1, -1));
        assert_eq!(p.dot(Point(2, 1)), 2);
    }

    #[test]
    fn test_los_endpoints() {
        let (a, b) = (Point(-2, 3), Point(5, -1));
        let los = LOS(a, b);
        assert_eq!(*los.first().unwrap(), a);
        assert_eq!(*los.last().unwrap(), b);
        for pair in los.windows(2) {
            assert_eq!((pair[1] - pair[0]).len_l1(), 1);
        }
    }

    #[test]
    fn test_weighted_respects_zero_weights() {
        let mut rng = RNG::seed_from_u64(17);
        let xs = [(0, 'a'), (5, 'b'), (0, 'c')];
        for _ in 0..64 {
            assert_eq!(*weighted(&xs, &mut rng), 'b');
        }
    }

    #[test]
    fn test_matrix_out_of_bounds() {
        let matrix = Matrix::new(Point(4, 4), -1);
        assert_eq!(matrix.get(Point(3, 3)), -1);
        assert_eq!(matrix.get(Point(4, 0)), -1);
        assert_eq!(matrix.get(Point(0, -1)), -1);
    }
}
