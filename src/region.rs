use egui::Pos2;

pub type RegionId = u64;

/// A draft narrower or shorter than this (in image units) is discarded at
/// pointer-up instead of being committed.
pub const MIN_REGION_SIZE: f32 = 5.0;

/// A resize that would shrink either extent below this is ignored for that
/// pointer event, leaving the region unchanged.
pub const MIN_RESIZE_SIZE: f32 = 1.0;

/// Handle hit radius in screen pixels; divide by the current zoom to get the
/// radius in image units so handles keep a constant on-screen size.
pub const HANDLE_HIT_RADIUS: f32 = 8.0;

/// An axis-aligned rectangle in image space. Width and height may be
/// transiently negative while a draft is being dragged; committed regions are
/// always normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Region {
    pub id: RegionId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionField {
    X,
    Y,
    Width,
    Height,
}

impl Region {
    /// Zero-extent draft anchored at `origin`. Drafts carry id 0 until they
    /// are committed and assigned a real id.
    pub fn draft(origin: Pos2) -> Self {
        Self {
            id: 0,
            x: origin.x,
            y: origin.y,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Canonical form with the origin at the top-left and positive extents.
    pub fn normalized(self) -> Self {
        let mut out = self;
        if out.width < 0.0 {
            out.x += out.width;
            out.width = out.width.abs();
        }
        if out.height < 0.0 {
            out.y += out.height;
            out.height = out.height.abs();
        }
        out
    }

    pub fn min(&self) -> Pos2 {
        Pos2::new(self.x, self.y)
    }

    pub fn max(&self) -> Pos2 {
        Pos2::new(self.x + self.width, self.y + self.height)
    }

    /// Inclusive containment test against the normalized bounds.
    pub fn contains(&self, point: Pos2) -> bool {
        let norm = self.normalized();
        point.x >= norm.x
            && point.x <= norm.x + norm.width
            && point.y >= norm.y
            && point.y <= norm.y + norm.height
    }

    /// The eight resize handles: corners plus edge midpoints.
    pub fn handles(&self) -> [(Handle, Pos2); 8] {
        let norm = self.normalized();
        let (x, y, w, h) = (norm.x, norm.y, norm.width, norm.height);
        [
            (Handle::TopLeft, Pos2::new(x, y)),
            (Handle::Top, Pos2::new(x + w * 0.5, y)),
            (Handle::TopRight, Pos2::new(x + w, y)),
            (Handle::Right, Pos2::new(x + w, y + h * 0.5)),
            (Handle::BottomRight, Pos2::new(x + w, y + h)),
            (Handle::Bottom, Pos2::new(x + w * 0.5, y + h)),
            (Handle::BottomLeft, Pos2::new(x, y + h)),
            (Handle::Left, Pos2::new(x, y + h * 0.5)),
        ]
    }

    /// First handle whose center is within `radius` of `point`, measured as
    /// an axis-aligned box distance (not Euclidean).
    pub fn handle_at(&self, point: Pos2, radius: f32) -> Option<Handle> {
        self.handles()
            .into_iter()
            .find(|(_, center)| {
                (point.x - center.x).abs() <= radius && (point.y - center.y).abs() <= radius
            })
            .map(|(handle, _)| handle)
    }

    /// Recomputes the rectangle with the given handle dragged to `to`.
    /// Corner handles adjust both extents, edge handles one. Returns `None`
    /// when the result would drop below [`MIN_RESIZE_SIZE`] on either axis.
    pub fn resized(&self, handle: Handle, to: Pos2) -> Option<Self> {
        let mut out = *self;
        match handle {
            Handle::TopLeft => {
                out.width = self.x + self.width - to.x;
                out.height = self.y + self.height - to.y;
                out.x = to.x;
                out.y = to.y;
            }
            Handle::Top => {
                out.height = self.y + self.height - to.y;
                out.y = to.y;
            }
            Handle::TopRight => {
                out.width = to.x - self.x;
                out.height = self.y + self.height - to.y;
                out.y = to.y;
            }
            Handle::Right => {
                out.width = to.x - self.x;
            }
            Handle::BottomRight => {
                out.width = to.x - self.x;
                out.height = to.y - self.y;
            }
            Handle::Bottom => {
                out.height = to.y - self.y;
            }
            Handle::BottomLeft => {
                out.width = self.x + self.width - to.x;
                out.height = to.y - self.y;
                out.x = to.x;
            }
            Handle::Left => {
                out.width = self.x + self.width - to.x;
                out.x = to.x;
            }
        }

        if out.width < MIN_RESIZE_SIZE || out.height < MIN_RESIZE_SIZE {
            return None;
        }
        Some(out)
    }

    /// Clamps the region so it lies fully inside a `bounds_w` × `bounds_h`
    /// image: origin at 0 or greater, extents at least one unit, and the far
    /// edges inside the image.
    pub fn clamp_to(&mut self, bounds_w: f32, bounds_h: f32) {
        self.x = self.x.clamp(0.0, (bounds_w - self.width).max(0.0));
        self.y = self.y.clamp(0.0, (bounds_h - self.height).max(0.0));
        self.width = self.width.clamp(1.0, bounds_w - self.x);
        self.height = self.height.clamp(1.0, bounds_h - self.y);
    }

    pub fn set_field(&mut self, field: RegionField, value: f32) {
        match field {
            RegionField::X => self.x = value,
            RegionField::Y => self.y = value,
            RegionField::Width => self.width = value,
            RegionField::Height => self.height = value,
        }
    }

    /// `"x,y,w,h"` with every value rounded to the nearest integer. This is
    /// the exact per-region form the processing endpoint expects.
    pub fn coords_string(&self) -> String {
        format!(
            "{},{},{},{}",
            self.x.round() as i64,
            self.y.round() as i64,
            self.width.round() as i64,
            self.height.round() as i64
        )
    }
}

/// Semicolon-joined region list, e.g. `"10,10,50,70;20,20,10,10"`.
pub fn format_region_list(regions: &[Region]) -> String {
    regions
        .iter()
        .map(Region::coords_string)
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod tests {
    use super::{format_region_list, Handle, Region, MIN_RESIZE_SIZE};
    use egui::Pos2;

    fn region(x: f32, y: f32, w: f32, h: f32) -> Region {
        Region {
            id: 1,
            x,
            y,
            width: w,
            height: h,
        }
    }

    #[test]
    fn normalize_flips_negative_extents() {
        let norm = region(60.0, 80.0, -50.0, -70.0).normalized();
        assert_eq!((norm.x, norm.y), (10.0, 10.0));
        assert_eq!((norm.width, norm.height), (50.0, 70.0));

        let unchanged = region(10.0, 10.0, 50.0, 70.0).normalized();
        assert_eq!(unchanged, region(10.0, 10.0, 50.0, 70.0));
    }

    #[test]
    fn contains_is_inclusive_on_edges() {
        let r = region(10.0, 10.0, 40.0, 40.0);
        assert!(r.contains(Pos2::new(10.0, 10.0)));
        assert!(r.contains(Pos2::new(50.0, 50.0)));
        assert!(r.contains(Pos2::new(30.0, 30.0)));
        assert!(!r.contains(Pos2::new(50.1, 30.0)));
        assert!(!r.contains(Pos2::new(9.9, 30.0)));
    }

    #[test]
    fn handle_hit_uses_box_distance() {
        let r = region(0.0, 0.0, 100.0, 100.0);
        // Corner of the box around the bottom-right handle: Euclidean
        // distance exceeds the radius but both axis distances are inside it.
        assert_eq!(
            r.handle_at(Pos2::new(107.0, 107.0), 8.0),
            Some(Handle::BottomRight)
        );
        assert_eq!(r.handle_at(Pos2::new(109.0, 100.0), 8.0), None);
        assert_eq!(r.handle_at(Pos2::new(50.0, 0.0), 8.0), Some(Handle::Top));
        assert_eq!(r.handle_at(Pos2::new(0.0, 50.0), 8.0), Some(Handle::Left));
        assert_eq!(r.handle_at(Pos2::new(50.0, 50.0), 8.0), None);
    }

    #[test]
    fn corner_resize_moves_origin_and_both_extents() {
        let r = region(10.0, 10.0, 50.0, 70.0);
        let resized = r
            .resized(Handle::TopLeft, Pos2::new(5.0, 20.0))
            .expect("valid resize");
        assert_eq!((resized.x, resized.y), (5.0, 20.0));
        assert_eq!((resized.width, resized.height), (55.0, 60.0));

        let resized = r
            .resized(Handle::BottomRight, Pos2::new(100.0, 100.0))
            .expect("valid resize");
        assert_eq!((resized.x, resized.y), (10.0, 10.0));
        assert_eq!((resized.width, resized.height), (90.0, 90.0));
    }

    #[test]
    fn edge_resize_adjusts_one_extent_only() {
        let r = region(10.0, 10.0, 50.0, 70.0);
        let resized = r
            .resized(Handle::Right, Pos2::new(90.0, 999.0))
            .expect("valid resize");
        assert_eq!((resized.width, resized.height), (80.0, 70.0));
        assert_eq!((resized.x, resized.y), (10.0, 10.0));

        let resized = r
            .resized(Handle::Top, Pos2::new(999.0, 30.0))
            .expect("valid resize");
        assert_eq!((resized.width, resized.height), (50.0, 50.0));
        assert_eq!(resized.y, 30.0);
    }

    #[test]
    fn degenerate_resize_is_rejected() {
        let r = region(10.0, 10.0, 50.0, 70.0);
        assert!(r.resized(Handle::Right, Pos2::new(10.2, 0.0)).is_none());
        assert!(r
            .resized(Handle::BottomRight, Pos2::new(100.0, 10.0 + MIN_RESIZE_SIZE * 0.5))
            .is_none());
        // Dragging past the opposite edge inverts the extent; also rejected.
        assert!(r.resized(Handle::Left, Pos2::new(200.0, 0.0)).is_none());
    }

    #[test]
    fn clamp_keeps_region_inside_bounds() {
        let mut r = region(180.0, 10.0, 50.0, 70.0);
        r.clamp_to(200.0, 200.0);
        assert_eq!(r.x, 150.0);
        assert_eq!(r.width, 50.0);

        let mut r = region(-20.0, -5.0, 400.0, 400.0);
        r.clamp_to(200.0, 200.0);
        assert!(r.x >= 0.0 && r.y >= 0.0);
        assert!(r.x + r.width <= 200.0);
        assert!(r.y + r.height <= 200.0);
        assert!(r.width >= 1.0 && r.height >= 1.0);
    }

    #[test]
    fn region_list_format_rounds_to_integers() {
        let regions = vec![region(10.4, 9.6, 50.2, 69.5), region(20.0, 20.0, 10.0, 10.0)];
        assert_eq!(format_region_list(&regions), "10,10,50,70;20,20,10,10");
        assert_eq!(format_region_list(&[]), "");
    }
}
