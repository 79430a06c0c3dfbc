//! Measurement newtypes shared across the document model and content-stream builder.

use std::cmp::Ordering;
use std::num::FpCategory;

macro_rules! impl_partialeq {
    ($t:ty) => {
        impl PartialEq for $t {
            // custom compare function because of floating point inaccuracy
            fn eq(&self, other: &$t) -> bool {
                if (self.0.classify() == FpCategory::Zero || self.0.classify() == FpCategory::Normal)
                    && (other.0.classify() == FpCategory::Zero || other.0.classify() == FpCategory::Normal)
                {
                    (self.0 - other.0).abs() < 0.0001
                } else {
                    self.0.classify() == other.0.classify()
                }
            }
        }
    };
}

macro_rules! impl_ord {
    ($t:ty) => {
        impl Ord for $t {
            fn cmp(&self, other: &Self) -> Ordering {
                self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
            }
        }
    };
}

/// Scale in millimeters, the unit pages are usually created in.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Mm(pub f32);

impl Mm {
    pub fn into_pt(&self) -> Pt {
        (*self).into()
    }
}

impl From<Pt> for Mm {
    fn from(value: Pt) -> Mm {
        Mm(value.0 * 0.352_778_f32)
    }
}

impl Eq for Mm {}
impl_partialeq!(Mm);
impl_ord!(Mm);

/// Scale in PDF points (1/72 inch), the unit content-stream operands are expressed in.
#[derive(Debug, Default, Copy, Clone, PartialOrd)]
pub struct Pt(pub f32);

impl From<Mm> for Pt {
    fn from(value: Mm) -> Pt {
        Pt(value.0 * 2.834_646_f32)
    }
}

impl Eq for Pt {}
impl_partialeq!(Pt);
impl_ord!(Pt);

use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

macro_rules! impl_add_self {
    ($type:ident) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, other: Self) -> Self {
                Self(self.0 + other.0)
            }
        }
    };
}

macro_rules! impl_add_assign_self {
    ($type:ident) => {
        impl AddAssign for $type {
            fn add_assign(&mut self, other: Self) {
                self.0 += other.0;
            }
        }
    };
}

macro_rules! impl_sub_self {
    ($type:ident) => {
        impl Sub for $type {
            type Output = Self;
            fn sub(self, other: Self) -> Self {
                Self(self.0 - other.0)
            }
        }
    };
}

macro_rules! impl_sub_assign_self {
    ($type:ident) => {
        impl SubAssign for $type {
            fn sub_assign(&mut self, other: Self) {
                self.0 -= other.0;
            }
        }
    };
}

macro_rules! impl_mul_f32 {
    ($type:ident) => {
        impl Mul<f32> for $type {
            type Output = Self;
            fn mul(self, other: f32) -> Self {
                Self(self.0 * other)
            }
        }
    };
}

macro_rules! impl_mul_assign_f32 {
    ($type:ident) => {
        impl MulAssign<f32> for $type {
            fn mul_assign(&mut self, other: f32) {
                self.0 *= other;
            }
        }
    };
}

macro_rules! impl_div {
    ($type:ident) => {
        impl Div<$type> for $type {
            type Output = f32;
            fn div(self, other: $type) -> Self::Output {
                self.0 / other.0
            }
        }
        impl Div<f32> for $type {
            type Output = Self;
            fn div(self, other: f32) -> Self::Output {
                Self(self.0 / other)
            }
        }
    };
}

macro_rules! impl_div_assign_f32 {
    ($type:ident) => {
        impl DivAssign<f32> for $type {
            fn div_assign(&mut self, other: f32) {
                self.0 /= other;
            }
        }
    };
}

impl_add_self!(Mm);
impl_add_self!(Pt);
impl_add_assign_self!(Mm);
impl_add_assign_self!(Pt);
impl_sub_self!(Mm);
impl_sub_self!(Pt);
impl_sub_assign_self!(Mm);
impl_sub_assign_self!(Pt);
impl_mul_f32!(Mm);
impl_mul_f32!(Pt);
impl_mul_assign_f32!(Mm);
impl_mul_assign_f32!(Pt);
impl_div!(Mm);
impl_div!(Pt);
impl_div_assign_f32!(Mm);
impl_div_assign_f32!(Pt);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_to_mm_conversion() {
        let mm1: Mm = Pt(1.0).into();
        let mm2: Mm = Pt(15.0).into();
        assert_eq!(mm1, Mm(0.352778));
        assert_eq!(mm2, Mm(5.29167));
    }

    #[test]
    fn mm_to_point_conversion() {
        let pt1: Pt = Mm(1.0).into();
        let pt2: Pt = Mm(23.0).into();
        assert_eq!(pt1, Pt(2.834_647_4));
        assert_eq!(pt2, Pt(65.1969));
    }

    #[test]
    fn mm_eq_zero_check() {
        assert_eq!(Mm(0.0), Mm(0.0));
    }
}
