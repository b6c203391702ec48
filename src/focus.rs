//! Pointer focus probe
//!
//! Decides every frame whether the cursor sits over something the user can
//! interact with. Two kinds of targets are checked, in order:
//! - UI regions: plain rectangles, always interactive
//! - scene objects: the mascot sprite(s), filtered by layer and tested
//!   against their alpha mask so transparent corners stay click-through

use parking_lot::RwLock;
use std::sync::Arc;

use crate::sprite::AlphaMask;
use crate::window::{Point, Rect};

/// "Is the pointer over an interactive region right now?"
pub trait FocusProbe {
    fn is_pointer_over_interactive_region(&self) -> bool;
}

/// Cursor position in overlay client coordinates
pub trait PointerSource {
    fn pointer_position(&self) -> Option<Point>;
}

/// Bit set of the layers (0..=31) that take pointer focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub fn contains(self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Something drawn in the overlay that can catch the pointer
#[derive(Debug, Clone)]
pub struct HitObject {
    pub bounds: Rect,
    pub layer: u8,
    pub mask: Option<Arc<AlphaMask>>,
    pub flip_x: bool,
}

impl HitObject {
    fn hit(&self, point: Point) -> bool {
        if !self.bounds.contains(point) {
            return false;
        }
        let Some(mask) = &self.mask else {
            return true;
        };

        let mut local_x = point.x - self.bounds.left;
        let local_y = point.y - self.bounds.top;
        if self.flip_x {
            local_x = mask.width() as i32 - 1 - local_x;
        }
        mask.is_opaque(local_x, local_y)
    }
}

#[derive(Debug, Default)]
struct SceneState {
    ui_regions: Vec<Rect>,
    objects: Vec<HitObject>,
}

/// Hit targets, refreshed by the render loop each frame
#[derive(Debug, Default)]
pub struct HitScene {
    state: RwLock<SceneState>,
}

impl HitScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rectangles that always take input, such as buttons drawn over the
    /// scene. The mascot overlay draws no such controls yet and leaves
    /// this empty.
    pub fn set_ui_regions(&self, regions: Vec<Rect>) {
        self.state.write().ui_regions = regions;
    }

    pub fn set_objects(&self, objects: Vec<HitObject>) {
        self.state.write().objects = objects;
    }

    fn hit(&self, point: Point, layers: LayerMask) -> bool {
        let state = self.state.read();
        if state.ui_regions.iter().any(|r| r.contains(point)) {
            return true;
        }
        state
            .objects
            .iter()
            .filter(|o| layers.contains(o.layer))
            .any(|o| o.hit(point))
    }
}

/// Focus probe combining UI and scene hit-testing
pub struct HitTestProbe<P> {
    pointer: P,
    scene: Arc<HitScene>,
    layers: LayerMask,
}

impl<P: PointerSource> HitTestProbe<P> {
    pub fn new(pointer: P, scene: Arc<HitScene>, layers: LayerMask) -> Self {
        Self {
            pointer,
            scene,
            layers,
        }
    }
}

impl<P: PointerSource> FocusProbe for HitTestProbe<P> {
    fn is_pointer_over_interactive_region(&self) -> bool {
        match self.pointer.pointer_position() {
            Some(point) => self.scene.hit(point, self.layers),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::Sprite;
    use std::cell::Cell;

    struct FixedPointer(Cell<Option<Point>>);

    impl PointerSource for FixedPointer {
        fn pointer_position(&self) -> Option<Point> {
            self.0.get()
        }
    }

    fn probe_at(point: Option<Point>, scene: Arc<HitScene>, layers: LayerMask) -> HitTestProbe<FixedPointer> {
        HitTestProbe::new(FixedPointer(Cell::new(point)), scene, layers)
    }

    fn left_half_sprite() -> Arc<AlphaMask> {
        // 2x1: left opaque, right transparent
        let sprite = Sprite::from_rgba(2, 1, &[0, 0, 0, 255, 0, 0, 0, 0]).unwrap();
        Arc::new(sprite.mask(16))
    }

    #[test]
    fn test_no_pointer_means_no_focus() {
        let scene = Arc::new(HitScene::new());
        scene.set_ui_regions(vec![Rect::new(0, 0, 100, 100)]);
        assert!(!probe_at(None, scene, LayerMask::ALL).is_pointer_over_interactive_region());
    }

    #[test]
    fn test_ui_region_ignores_layer_mask() {
        let scene = Arc::new(HitScene::new());
        scene.set_ui_regions(vec![Rect::new(0, 0, 10, 10)]);
        let probe = probe_at(Some(Point::new(5, 5)), scene, LayerMask(0));
        assert!(probe.is_pointer_over_interactive_region());
    }

    #[test]
    fn test_scene_object_respects_layers() {
        let scene = Arc::new(HitScene::new());
        scene.set_objects(vec![HitObject {
            bounds: Rect::new(0, 0, 10, 10),
            layer: 3,
            mask: None,
            flip_x: false,
        }]);

        let inside = Some(Point::new(1, 1));
        assert!(probe_at(inside, scene.clone(), LayerMask(1 << 3)).is_pointer_over_interactive_region());
        assert!(!probe_at(inside, scene, LayerMask(1 << 2)).is_pointer_over_interactive_region());
    }

    #[test]
    fn test_alpha_mask_and_flip() {
        let scene = Arc::new(HitScene::new());
        let object = HitObject {
            bounds: Rect::new(10, 10, 12, 11),
            layer: 0,
            mask: Some(left_half_sprite()),
            flip_x: false,
        };
        scene.set_objects(vec![object.clone()]);

        let left = Some(Point::new(10, 10));
        let right = Some(Point::new(11, 10));
        assert!(probe_at(left, scene.clone(), LayerMask::ALL).is_pointer_over_interactive_region());
        assert!(!probe_at(right, scene.clone(), LayerMask::ALL).is_pointer_over_interactive_region());

        scene.set_objects(vec![HitObject {
            flip_x: true,
            ..object
        }]);
        assert!(!probe_at(left, scene.clone(), LayerMask::ALL).is_pointer_over_interactive_region());
        assert!(probe_at(right, scene, LayerMask::ALL).is_pointer_over_interactive_region());
    }

    #[test]
    fn test_layer_mask_bounds() {
        assert!(LayerMask::ALL.contains(31));
        assert!(!LayerMask::ALL.contains(32));
        assert!(!LayerMask(0).contains(0));
    }
}
