//! Axis-aligned rectangles in PDF user space (points): `/MediaBox`, `/Rect`, `/BBox`.
//! Purely a geometry value type — higher-level path-building sugar (fill/stroke/clip
//! painting modes) is out of scope for this engine; see [`crate::content`] for the raw
//! operator-level equivalent.

use crate::object::Object;
use crate::units::Pt;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rect {
    pub llx: Pt,
    pub lly: Pt,
    pub urx: Pt,
    pub ury: Pt,
}

impl Rect {
    pub fn new(llx: Pt, lly: Pt, urx: Pt, ury: Pt) -> Self {
        Rect { llx, lly, urx, ury }
    }

    pub fn width(&self) -> Pt {
        Pt((self.urx.0 - self.llx.0).abs())
    }

    pub fn height(&self) -> Pt {
        Pt((self.ury.0 - self.lly.0).abs())
    }

    /// Normalized so `ll <= ur` on both axes (a widget `/Rect` is not required to store
    /// its corners in that order).
    pub fn normalized(&self) -> Rect {
        Rect {
            llx: Pt(self.llx.0.min(self.urx.0)),
            lly: Pt(self.lly.0.min(self.ury.0)),
            urx: Pt(self.llx.0.max(self.urx.0)),
            ury: Pt(self.lly.0.max(self.ury.0)),
        }
    }

    pub fn as_array(&self) -> [f32; 4] {
        [self.llx.0, self.lly.0, self.urx.0, self.ury.0]
    }

    pub fn to_object(self) -> Object {
        Object::Array(vec![
            Object::from(self.llx.0 as f64),
            Object::from(self.lly.0 as f64),
            Object::from(self.urx.0 as f64),
            Object::from(self.ury.0 as f64),
        ])
    }

    pub fn from_object(obj: &Object) -> Option<Rect> {
        let items = obj.as_array()?;
        if items.len() != 4 {
            return None;
        }
        let n = |o: &Object| o.as_f64().map(|v| v as f32);
        Some(Rect {
            llx: Pt(n(&items[0])?),
            lly: Pt(n(&items[1])?),
            urx: Pt(n(&items[2])?),
            ury: Pt(n(&items[3])?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_height() {
        let r = Rect::new(Pt(10.0), Pt(20.0), Pt(110.0), Pt(70.0));
        assert_eq!(r.width(), Pt(100.0));
        assert_eq!(r.height(), Pt(50.0));
    }

    #[test]
    fn normalizes_reversed_corners() {
        let r = Rect::new(Pt(100.0), Pt(70.0), Pt(10.0), Pt(20.0));
        let n = r.normalized();
        assert_eq!(n.llx, Pt(10.0));
        assert_eq!(n.ury, Pt(70.0));
    }

    #[test]
    fn object_roundtrip() {
        let r = Rect::new(Pt(0.0), Pt(0.0), Pt(612.0), Pt(792.0));
        let obj = r.to_object();
        let back = Rect::from_object(&obj).unwrap();
        assert_eq!(back, r);
    }
}
