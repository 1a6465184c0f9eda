use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use egui::{ColorImage, Context as EguiContext, Pos2, TextureHandle, TextureOptions, Vec2};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::history::UndoHistory;
use crate::region::{
    format_region_list, Handle, Region, RegionField, RegionId, HANDLE_HIT_RADIUS, MIN_REGION_SIZE,
};
use crate::viewport::Viewport;

/// Which pointer gesture the canvas currently interprets. Exactly one mode
/// is active; transitions happen only through explicit tool selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    Create,
    Edit,
    Delete,
    Move,
}

impl SelectionMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "Draw",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
            Self::Move => "Pan",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Self::Create => "Click and drag to mark a new region",
            Self::Edit => "Click a region to select it, drag its handles to resize",
            Self::Delete => "Click a region to remove it",
            Self::Move => "Drag to pan around the image",
        }
    }
}

#[derive(Clone, Debug)]
pub enum DragState {
    /// An uncommitted rubber-band rectangle; extents may run negative until
    /// normalization at pointer-up.
    Draw { draft: Region },
    /// A handle resize. `original` is the shape at grab time: every move
    /// recomputes from it, and it is restored if the gesture is abandoned.
    Resize {
        id: RegionId,
        handle: Handle,
        original: Region,
    },
    /// Viewport pan; `last` is the previous screen-space pointer position.
    Pan { last: Pos2 },
}

pub struct EditorImage {
    pub dynamic: DynamicImage,
    pub texture: Option<TextureHandle>,
}

impl EditorImage {
    pub fn size_vec2(&self) -> Vec2 {
        Vec2::new(self.dynamic.width() as f32, self.dynamic.height() as f32)
    }

    pub fn ensure_texture(&mut self, ctx: &EguiContext) {
        if self.texture.is_some() {
            return;
        }
        let rgba = self.dynamic.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        let color = ColorImage::from_rgba_unmultiplied(size, rgba.as_raw());
        let texture = ctx.load_texture("backdrop", color, TextureOptions::LINEAR);
        self.texture = Some(texture);
    }
}

#[derive(Clone)]
pub struct PendingImage {
    pub image: DynamicImage,
}

#[derive(Default)]
pub struct AppUiFlags {
    pub copy_feedback_until: Option<f64>,
    pub ask_replace_image: Option<PendingImage>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub last_mode: SelectionMode,
    pub show_region_panel: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            last_mode: SelectionMode::Create,
            show_region_panel: true,
        }
    }
}

pub struct EditorState {
    pub image: Option<EditorImage>,
    pub regions: Vec<Region>,
    pub history: UndoHistory<Vec<Region>>,
    pub mode: SelectionMode,
    pub selection: Option<RegionId>,
    pub drag: Option<DragState>,
    pub viewport: Viewport,
    pub next_id: RegionId,
    /// Bumped on every committed region-set change; collaborators that feed
    /// the processing endpoint poll this to notice edits.
    pub revision: u64,
    pub settings: UserSettings,
}

impl Default for EditorState {
    fn default() -> Self {
        let settings = UserSettings::load().unwrap_or_default();
        Self {
            image: None,
            regions: Vec::new(),
            history: UndoHistory::new(Vec::new()),
            mode: settings.last_mode,
            selection: None,
            drag: None,
            viewport: Viewport::default(),
            next_id: 1,
            revision: 0,
            settings,
        }
    }
}

impl EditorState {
    pub fn mark_changed(&mut self) {
        self.revision += 1;
    }

    pub fn push_history_snapshot(&mut self) {
        self.history.push_snapshot(self.regions.clone());
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) {
        if let Some(snapshot) = self.history.undo() {
            self.regions = snapshot;
            self.selection = None;
            self.drag = None;
            self.mark_changed();
        }
    }

    pub fn redo(&mut self) {
        if let Some(snapshot) = self.history.redo() {
            self.regions = snapshot;
            self.selection = None;
            self.drag = None;
            self.mark_changed();
        }
    }

    /// Replaces the backdrop and resets regions, history, and viewport. Any
    /// in-progress gesture is dropped without a history entry.
    pub fn load_image(&mut self, image: DynamicImage) {
        self.image = Some(EditorImage {
            dynamic: image,
            texture: None,
        });
        self.regions.clear();
        self.selection = None;
        self.drag = None;
        self.viewport = Viewport::default();
        self.history.clear_with(Vec::new());
        self.next_id = 1;
        self.mark_changed();
    }

    pub fn image_size(&self) -> Option<Vec2> {
        self.image.as_ref().map(EditorImage::size_vec2)
    }

    /// Switches the active mode, abandoning any in-progress gesture: a draft
    /// is discarded, a half-done resize snaps back to the grab-time shape.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.cancel_gesture();
        self.mode = mode;
        if self.settings.last_mode != mode {
            self.settings.last_mode = mode;
            if let Err(err) = self.settings.save() {
                log::warn!("cannot persist settings: {err:#}");
            }
        }
    }

    pub fn cancel_gesture(&mut self) {
        if let Some(DragState::Resize { id, original, .. }) = self.drag.take() {
            if let Some(region) = self.find_region_mut(id) {
                *region = original;
            }
        }
    }

    pub fn pointer_down(&mut self, screen: Pos2) {
        let point = self.viewport.to_image(screen);

        match self.mode {
            SelectionMode::Move => {
                self.drag = Some(DragState::Pan { last: screen });
            }
            SelectionMode::Delete => {
                if let Some(index) = self.regions.iter().position(|r| r.contains(point)) {
                    let removed = self.regions.remove(index);
                    if self.selection == Some(removed.id) {
                        self.selection = None;
                    }
                    self.mark_changed();
                    self.push_history_snapshot();
                }
            }
            SelectionMode::Edit => {
                let radius = HANDLE_HIT_RADIUS / self.viewport.zoom;
                for region in &self.regions {
                    if let Some(handle) = region.handle_at(point, radius) {
                        self.selection = Some(region.id);
                        self.drag = Some(DragState::Resize {
                            id: region.id,
                            handle,
                            original: *region,
                        });
                        return;
                    }
                }
                if let Some(region) = self.regions.iter().find(|r| r.contains(point)) {
                    self.selection = Some(region.id);
                }
            }
            SelectionMode::Create => {
                self.drag = Some(DragState::Draw {
                    draft: Region::draft(point),
                });
            }
        }
    }

    pub fn pointer_move(&mut self, screen: Pos2) {
        let point = self.viewport.to_image(screen);

        match &mut self.drag {
            Some(DragState::Pan { last }) => {
                let delta = screen - *last;
                *last = screen;
                self.viewport.pan_by(delta);
            }
            Some(DragState::Draw { draft }) => {
                draft.width = point.x - draft.x;
                draft.height = point.y - draft.y;
            }
            Some(DragState::Resize {
                id,
                handle,
                original,
            }) => {
                let (id, handle, original) = (*id, *handle, *original);
                // Recompute from the grab-time shape; a candidate below the
                // minimum size leaves the region as it was for this event.
                if let Some(candidate) = original.resized(handle, point) {
                    if let Some(region) = self.find_region_mut(id) {
                        *region = candidate;
                    }
                }
            }
            None => {}
        }
    }

    pub fn pointer_up(&mut self, screen: Pos2) {
        match self.drag.take() {
            Some(DragState::Pan { .. }) => {}
            Some(DragState::Draw { mut draft }) => {
                let point = self.viewport.to_image(screen);
                draft.width = point.x - draft.x;
                draft.height = point.y - draft.y;

                let normalized = draft.normalized();
                if normalized.width >= MIN_REGION_SIZE && normalized.height >= MIN_REGION_SIZE {
                    let mut region = normalized;
                    region.id = self.next_region_id();
                    self.regions.push(region);
                    self.mark_changed();
                    self.push_history_snapshot();
                }
            }
            Some(DragState::Resize { id, original, .. }) => {
                // One history entry per completed gesture, and only when the
                // shape actually changed.
                let changed = self
                    .find_region(id)
                    .map_or(false, |region| *region != original);
                if changed {
                    self.mark_changed();
                    self.push_history_snapshot();
                }
            }
            None => {}
        }
    }

    pub fn remove_region(&mut self, id: RegionId) {
        let before = self.regions.len();
        self.regions.retain(|region| region.id != id);
        if self.regions.len() != before {
            if self.selection == Some(id) {
                self.selection = None;
            }
            self.mark_changed();
            self.push_history_snapshot();
        }
    }

    pub fn clear_regions(&mut self) {
        if self.regions.is_empty() {
            return;
        }
        self.regions.clear();
        self.selection = None;
        self.mark_changed();
        self.push_history_snapshot();
    }

    pub fn delete_selected(&mut self) {
        if let Some(selected) = self.selection {
            self.remove_region(selected);
        }
    }

    /// Manual numeric entry for one field of a region. Non-finite input is
    /// ignored; the result is clamped so the region never references pixels
    /// outside the loaded image.
    pub fn update_region_field(&mut self, id: RegionId, field: RegionField, value: f32) {
        if !value.is_finite() {
            return;
        }
        let Some(size) = self.image_size() else {
            return;
        };

        let mut changed = false;
        if let Some(region) = self.find_region_mut(id) {
            let before = *region;
            region.set_field(field, value);
            region.clamp_to(size.x, size.y);
            changed = *region != before;
        }
        if changed {
            self.mark_changed();
            self.push_history_snapshot();
        }
    }

    pub fn region_list_string(&self) -> String {
        format_region_list(&self.regions)
    }

    pub fn selected_region(&self) -> Option<&Region> {
        self.selection.and_then(|id| self.find_region(id))
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn zoom_reset(&mut self) {
        self.viewport.zoom_reset();
    }

    pub fn find_region(&self, id: RegionId) -> Option<&Region> {
        self.regions.iter().find(|region| region.id == id)
    }

    pub fn find_region_mut(&mut self, id: RegionId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|region| region.id == id)
    }

    fn next_region_id(&mut self) -> RegionId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }
}

impl UserSettings {
    fn file_path() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("com", "regionmark", "regionmark")?;
        let config_dir = dirs.config_dir();
        std::fs::create_dir_all(config_dir).ok()?;
        Some(config_dir.join("settings.json"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::file_path().context("cannot resolve settings path")?;
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DragState, EditorState, SelectionMode, UserSettings};
    use crate::history::UndoHistory;
    use crate::region::{Region, RegionField};
    use crate::viewport::Viewport;
    use egui::{Pos2, Vec2};
    use image::DynamicImage;

    fn editor_with_image(width: u32, height: u32) -> EditorState {
        // Built by hand instead of Default so tests don't depend on
        // whatever settings file is on disk.
        let mut state = EditorState {
            image: None,
            regions: Vec::new(),
            history: UndoHistory::new(Vec::new()),
            mode: SelectionMode::Create,
            selection: None,
            drag: None,
            viewport: Viewport::default(),
            next_id: 1,
            revision: 0,
            settings: UserSettings::default(),
        };
        state.load_image(DynamicImage::new_rgba8(width, height));
        state.mode = SelectionMode::Create;
        state
    }

    fn drag(state: &mut EditorState, from: Pos2, to: Pos2) {
        state.pointer_down(from);
        state.pointer_move(to);
        state.pointer_up(to);
    }

    #[test]
    fn create_drag_commits_normalized_region() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));

        assert_eq!(state.regions.len(), 1);
        let region = state.regions[0];
        assert_eq!((region.x, region.y), (10.0, 10.0));
        assert_eq!((region.width, region.height), (50.0, 70.0));

        // Same shape regardless of drag direction.
        drag(&mut state, Pos2::new(160.0, 180.0), Pos2::new(110.0, 110.0));
        let region = state.regions[1];
        assert_eq!((region.x, region.y), (110.0, 110.0));
        assert_eq!((region.width, region.height), (50.0, 70.0));
    }

    #[test]
    fn sub_minimum_draft_is_discarded() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(14.0, 80.0));
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(80.0, 12.0));

        assert!(state.regions.is_empty());
        assert!(!state.can_undo());
    }

    #[test]
    fn create_resize_undo_scenario() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));

        state.set_mode(SelectionMode::Edit);
        // Grab the bottom-right handle and pull it out.
        drag(&mut state, Pos2::new(60.0, 80.0), Pos2::new(100.0, 100.0));

        let region = state.regions[0];
        assert_eq!((region.x, region.y), (10.0, 10.0));
        assert_eq!((region.width, region.height), (90.0, 90.0));

        state.undo();
        let region = state.regions[0];
        assert_eq!((region.width, region.height), (50.0, 70.0));

        state.undo();
        assert!(state.regions.is_empty());
        assert!(!state.can_undo());
    }

    #[test]
    fn redo_restores_undone_state() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        drag(&mut state, Pos2::new(100.0, 100.0), Pos2::new(150.0, 150.0));
        let before = state.regions.clone();

        state.undo();
        assert_eq!(state.regions.len(), 1);
        state.redo();
        assert_eq!(state.regions, before);
        assert!(!state.can_redo());
    }

    #[test]
    fn rejected_resize_leaves_history_untouched() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        let before = state.regions.clone();

        state.set_mode(SelectionMode::Edit);
        // Collapse the right edge past the minimum: every event rejects, the
        // gesture ends with an unchanged shape and no history entry.
        drag(&mut state, Pos2::new(60.0, 45.0), Pos2::new(10.2, 45.0));

        assert_eq!(state.regions, before);
        state.undo();
        assert!(state.regions.is_empty());
    }

    #[test]
    fn edit_click_selects_without_history_entry() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        let id = state.regions[0].id;

        state.set_mode(SelectionMode::Edit);
        state.pointer_down(Pos2::new(30.0, 40.0));
        state.pointer_up(Pos2::new(30.0, 40.0));

        assert_eq!(state.selection, Some(id));
        state.undo();
        assert!(state.regions.is_empty());
    }

    #[test]
    fn delete_click_removes_first_hit_in_insertion_order() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(0.0, 0.0), Pos2::new(10.0, 10.0));
        drag(&mut state, Pos2::new(20.0, 20.0), Pos2::new(30.0, 30.0));
        let second = state.regions[1];

        state.set_mode(SelectionMode::Delete);
        state.pointer_down(Pos2::new(5.0, 5.0));
        state.pointer_up(Pos2::new(5.0, 5.0));

        assert_eq!(state.regions, vec![second]);

        // A miss is a no-op.
        state.pointer_down(Pos2::new(150.0, 150.0));
        state.pointer_up(Pos2::new(150.0, 150.0));
        assert_eq!(state.regions.len(), 1);
    }

    #[test]
    fn move_mode_pans_without_touching_regions() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        let regions = state.regions.clone();

        state.set_mode(SelectionMode::Move);
        state.pointer_down(Pos2::new(100.0, 100.0));
        state.pointer_move(Pos2::new(130.0, 120.0));
        state.pointer_move(Pos2::new(150.0, 150.0));
        state.pointer_up(Pos2::new(150.0, 150.0));

        assert_eq!(state.viewport.pan, Vec2::new(50.0, 50.0));
        assert_eq!(state.regions, regions);
        // Pan produced no history entry.
        state.undo();
        assert!(state.regions.is_empty());
    }

    #[test]
    fn pointer_input_respects_viewport_transform() {
        let mut state = editor_with_image(200, 200);
        state.viewport.zoom = 2.0;
        state.viewport.pan = Vec2::new(50.0, 50.0);

        // Screen (150, 150) resolves to image (50, 50).
        drag(&mut state, Pos2::new(150.0, 150.0), Pos2::new(230.0, 230.0));
        let region = state.regions[0];
        assert_eq!((region.x, region.y), (50.0, 50.0));
        assert_eq!((region.width, region.height), (40.0, 40.0));
    }

    #[test]
    fn mode_switch_abandons_draft_and_restores_resize() {
        let mut state = editor_with_image(200, 200);
        state.pointer_down(Pos2::new(10.0, 10.0));
        state.pointer_move(Pos2::new(90.0, 90.0));
        state.set_mode(SelectionMode::Edit);
        assert!(state.regions.is_empty());
        assert!(state.drag.is_none());

        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        state.set_mode(SelectionMode::Edit);
        let original = state.regions[0];
        state.pointer_down(Pos2::new(60.0, 80.0));
        state.pointer_move(Pos2::new(120.0, 130.0));
        assert!(matches!(state.drag, Some(DragState::Resize { .. })));

        state.set_mode(SelectionMode::Create);
        assert_eq!(state.regions[0], original);
        // The abandoned gesture left no history entry behind.
        state.undo();
        assert!(state.regions.is_empty());
    }

    #[test]
    fn field_update_clamps_to_image_bounds() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        let id = state.regions[0].id;

        state.update_region_field(id, RegionField::X, 500.0);
        let region = *state.find_region(id).expect("region exists");
        assert!(region.x + region.width <= 200.0);
        assert!(region.x >= 0.0);

        state.update_region_field(id, RegionField::Width, 10_000.0);
        let region = *state.find_region(id).expect("region exists");
        assert!(region.x + region.width <= 200.0);

        // Non-finite input is ignored outright.
        let before = *state.find_region(id).expect("region exists");
        state.update_region_field(id, RegionField::Y, f32::NAN);
        assert_eq!(*state.find_region(id).expect("region exists"), before);
    }

    #[test]
    fn load_image_resets_everything() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        state.zoom_in();
        state.viewport.pan = Vec2::new(30.0, 30.0);

        state.load_image(DynamicImage::new_rgba8(64, 64));
        assert!(state.regions.is_empty());
        assert!(!state.can_undo());
        assert_eq!(state.viewport.zoom, 1.0);
        assert_eq!(state.viewport.pan, Vec2::ZERO);
        assert_eq!(state.image_size(), Some(Vec2::new(64.0, 64.0)));
    }

    #[test]
    fn region_list_string_matches_wire_contract() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        drag(&mut state, Pos2::new(100.0, 100.0), Pos2::new(110.0, 110.0));

        assert_eq!(state.region_list_string(), "10,10,50,70;100,100,10,10");
    }

    #[test]
    fn revision_tracks_committed_changes_only() {
        let mut state = editor_with_image(200, 200);
        let after_load = state.revision;

        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        assert!(state.revision > after_load);

        let committed = state.revision;
        // A discarded draft is not a change.
        drag(&mut state, Pos2::new(0.0, 0.0), Pos2::new(2.0, 2.0));
        assert_eq!(state.revision, committed);
    }

    #[test]
    fn clear_regions_is_single_undo_step() {
        let mut state = editor_with_image(200, 200);
        drag(&mut state, Pos2::new(10.0, 10.0), Pos2::new(60.0, 80.0));
        drag(&mut state, Pos2::new(100.0, 100.0), Pos2::new(150.0, 150.0));

        state.clear_regions();
        assert!(state.regions.is_empty());
        state.undo();
        assert_eq!(state.regions.len(), 2);

        // Clearing an empty set is a no-op.
        let mut empty = editor_with_image(64, 64);
        empty.clear_regions();
        assert!(!empty.can_undo());
    }
}
