use std::fmt;
use std::time::Instant;

use super::camera::CameraTransition;
use crate::pipeline::{TrackedInfo, TrackedSet};
use crate::scene::{Camera, Color, Ndc, RenderHandle, Renderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected(RenderHandle),
}

impl SelectionState {
    pub fn selected(&self) -> Option<RenderHandle> {
        match self {
            SelectionState::Idle => None,
            SelectionState::Selected(handle) => Some(*handle),
        }
    }
}

/// Name and NORAD id of the selected object, when visible
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoPanel {
    shown: Option<TrackedInfo>,
}

impl InfoPanel {
    pub fn show(&mut self, info: &TrackedInfo) {
        self.shown = Some(info.clone());
    }

    pub fn hide(&mut self) {
        self.shown = None;
    }

    pub fn is_visible(&self) -> bool {
        self.shown.is_some()
    }

    pub fn info(&self) -> Option<&TrackedInfo> {
        self.shown.as_ref()
    }
}

impl fmt::Display for InfoPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shown {
            Some(info) => write!(f, "{}\nNORAD ID: {}", info.name, info.id_label()),
            None => Ok(()),
        }
    }
}

/// Everything the controller mutates, owned by the caller
#[derive(Debug, Clone, Default)]
pub struct SelectionContext {
    pub state: SelectionState,
    pub info_panel: InfoPanel,
    pub transition: Option<CameraTransition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(RenderHandle),
    NotFound,
    /// Blank query
    Ignored,
}

/// Selection state machine over the tracked set
#[derive(Debug, Clone, Copy)]
pub struct InteractionController {
    pub default_color: Color,
    pub highlight_color: Color,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self {
            default_color: Color::SATELLITE,
            highlight_color: Color::HIGHLIGHT,
        }
    }
}

impl InteractionController {
    /// Select `handle`, or deselect it if it is already selected
    pub fn select<H, R: Renderer>(
        &self,
        ctx: &mut SelectionContext,
        objects: &TrackedSet<H>,
        renderer: &mut R,
        camera: &Camera,
        handle: RenderHandle,
        now: Instant,
    ) {
        let Some(object) = objects.get(handle) else {
            tracing::debug!("Ignoring select of untracked handle {:?}", handle);
            return;
        };

        match ctx.state {
            SelectionState::Selected(current) if current == handle => {
                self.deselect(ctx, renderer);
                return;
            }
            SelectionState::Selected(previous) => {
                renderer.set_color(previous, self.default_color);
            }
            SelectionState::Idle => {}
        }

        renderer.set_color(handle, self.highlight_color);
        ctx.state = SelectionState::Selected(handle);
        ctx.info_panel.show(&object.info);
        ctx.transition = Some(CameraTransition::focusing(camera, object.position, now));

        tracing::info!("Selected {} (NORAD ID: {})", object.info.name, object.info.id_label());
    }

    /// Back to `Idle` without moving the camera
    pub fn deselect<R: Renderer>(&self, ctx: &mut SelectionContext, renderer: &mut R) {
        if let SelectionState::Selected(previous) = ctx.state {
            renderer.set_color(previous, self.default_color);
        }
        ctx.state = SelectionState::Idle;
        ctx.info_panel.hide();
    }

    /// Deselect and ease the camera back to the default view
    pub fn escape<R: Renderer>(&self, ctx: &mut SelectionContext, renderer: &mut R, camera: &Camera, now: Instant) {
        self.deselect(ctx, renderer);
        ctx.transition = Some(CameraTransition::returning_home(camera, now));
    }

    /// Resolve a pointer event. Hits on untracked objects (the globe) change nothing.
    pub fn handle_pointer<H, R: Renderer>(
        &self,
        ctx: &mut SelectionContext,
        objects: &TrackedSet<H>,
        renderer: &mut R,
        camera: &Camera,
        pointer: Ndc,
        now: Instant,
    ) {
        match renderer.hit_test(pointer, camera) {
            Some(handle) if objects.contains(handle) => {
                self.select(ctx, objects, renderer, camera, handle, now);
            }
            Some(_) => {}
            None => {
                if ctx.state != SelectionState::Idle {
                    self.deselect(ctx, renderer);
                }
            }
        }
    }

    /// Case-insensitive substring match on names, first hit in catalog order
    pub fn search<H, R: Renderer>(
        &self,
        ctx: &mut SelectionContext,
        objects: &TrackedSet<H>,
        renderer: &mut R,
        camera: &Camera,
        query: &str,
        now: Instant,
    ) -> SearchOutcome {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return SearchOutcome::Ignored;
        }

        match objects
            .iter()
            .find(|object| object.info.name.to_lowercase().contains(&query))
        {
            Some(object) => {
                let handle = object.render_handle;
                self.select(ctx, objects, renderer, camera, handle, now);
                SearchOutcome::Found(handle)
            }
            None => SearchOutcome::NotFound,
        }
    }

    /// Advance the active camera transition by one frame
    pub fn step_camera(&self, ctx: &mut SelectionContext, camera: &mut Camera, now: Instant) {
        let finished = ctx
            .transition
            .as_ref()
            .is_some_and(|transition| transition.apply(camera, now));
        if finished {
            ctx.transition = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::camera::{HOME_POSITION, RETURN_DURATION};
    use crate::pipeline::{fake_pipeline, test_epoch};
    use crate::scene::HeadlessScene;
    use nalgebra::Vector3;
    use orbitrack_common::{Catalog, CatalogEntry, ElementSetRecord};

    struct Fixture {
        ctx: SelectionContext,
        objects: TrackedSet<String>,
        scene: HeadlessScene,
        camera: Camera,
        controller: InteractionController,
    }

    fn fixture(names: &[&str]) -> Fixture {
        fixture_in(HeadlessScene::new(0.02), names)
    }

    fn fixture_in(mut scene: HeadlessScene, names: &[&str]) -> Fixture {
        let entries: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| CatalogEntry::new(i as u64 + 1, *name))
            .collect();
        let records: Vec<_> = entries
            .iter()
            .map(|entry| ElementSetRecord::success(entry.id, "L1\nL2", None))
            .collect();
        let catalog = Catalog::from_entries(entries);
        let objects = fake_pipeline().build_tracked_objects(&records, &catalog, &mut scene, test_epoch());

        Fixture {
            ctx: SelectionContext::default(),
            objects,
            scene,
            camera: Camera::new(1.0),
            controller: InteractionController::default(),
        }
    }

    fn handles(f: &Fixture) -> Vec<RenderHandle> {
        f.objects.iter().map(|o| o.render_handle).collect()
    }

    #[test]
    fn test_select_highlights_and_shows_info() {
        let mut f = fixture(&["Alpha"]);
        let alpha = handles(&f)[0];

        f.controller
            .select(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, alpha, Instant::now());

        assert_eq!(f.ctx.state, SelectionState::Selected(alpha));
        assert_eq!(f.scene.color(alpha), Some(Color::HIGHLIGHT));
        assert_eq!(f.ctx.info_panel.to_string(), "Alpha\nNORAD ID: 1");
        assert!(f.ctx.transition.is_some());
    }

    #[test]
    fn test_selecting_selected_object_toggles_off() {
        let mut f = fixture(&["Alpha"]);
        let alpha = handles(&f)[0];
        let now = Instant::now();

        f.controller.select(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, alpha, now);
        f.controller.select(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, alpha, now);

        assert_eq!(f.ctx.state, SelectionState::Idle);
        assert_eq!(f.scene.color(alpha), Some(Color::SATELLITE));
        assert!(!f.ctx.info_panel.is_visible());
    }

    #[test]
    fn test_selecting_other_object_switches() {
        let mut f = fixture(&["Alpha", "Beta"]);
        let tracked = handles(&f);
        let (alpha, beta) = (tracked[0], tracked[1]);
        let now = Instant::now();

        f.controller.select(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, alpha, now);
        f.controller.select(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, beta, now);

        assert_eq!(f.ctx.state, SelectionState::Selected(beta));
        assert_eq!(f.scene.color(alpha), Some(Color::SATELLITE));
        assert_eq!(f.scene.color(beta), Some(Color::HIGHLIGHT));
        assert_eq!(f.ctx.info_panel.info().map(|i| i.name.as_str()), Some("Beta"));
    }

    #[test]
    fn test_search_then_escape() {
        let mut f = fixture(&["Alpha"]);
        let alpha = handles(&f)[0];
        let now = Instant::now();

        let outcome = f
            .controller
            .search(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, "alp", now);
        assert_eq!(outcome, SearchOutcome::Found(alpha));
        assert_eq!(f.ctx.state, SelectionState::Selected(alpha));

        f.controller.escape(&mut f.ctx, &mut f.scene, &f.camera, now);
        assert_eq!(f.ctx.state, SelectionState::Idle);
        assert_eq!(f.scene.color(alpha), Some(Color::SATELLITE));
        assert!(!f.ctx.info_panel.is_visible());

        f.controller.step_camera(&mut f.ctx, &mut f.camera, now + RETURN_DURATION);
        assert!((f.camera.position - HOME_POSITION).norm() < 1e-9);
        assert!(f.ctx.transition.is_none());
    }

    #[test]
    fn test_search_first_match_in_catalog_order() {
        let mut f = fixture(&["STARLINK-2", "starlink-1"]);
        let first = handles(&f)[0];

        let outcome = f
            .controller
            .search(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, "  StarLink ", Instant::now());
        assert_eq!(outcome, SearchOutcome::Found(first));
    }

    #[test]
    fn test_search_not_found_leaves_state() {
        let mut f = fixture(&["Alpha", "Beta"]);
        let alpha = handles(&f)[0];
        let now = Instant::now();
        f.controller.select(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, alpha, now);

        let outcome = f
            .controller
            .search(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, "gamma", now);

        assert_eq!(outcome, SearchOutcome::NotFound);
        assert_eq!(f.ctx.state, SelectionState::Selected(alpha));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let mut f = fixture(&["Alpha"]);

        let outcome = f
            .controller
            .search(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, "   ", Instant::now());

        assert_eq!(outcome, SearchOutcome::Ignored);
        assert_eq!(f.ctx.state, SelectionState::Idle);
        assert!(f.ctx.transition.is_none());
    }

    #[test]
    fn test_pointer_hit_and_miss() {
        let mut f = fixture(&["Alpha"]);
        let alpha = handles(&f)[0];
        let now = Instant::now();
        // put the object in front of the camera
        f.scene.set_position(alpha, Vector3::new(0.0, 0.0, 1.0));

        let center = Ndc { x: 0.0, y: 0.0 };
        f.controller
            .handle_pointer(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, center, now);
        assert_eq!(f.ctx.state, SelectionState::Selected(alpha));

        let corner = Ndc { x: 0.99, y: 0.99 };
        f.controller
            .handle_pointer(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, corner, now);
        assert_eq!(f.ctx.state, SelectionState::Idle);
        assert_eq!(f.scene.color(alpha), Some(Color::SATELLITE));

        // miss with nothing selected is a no-op
        f.controller
            .handle_pointer(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, corner, now);
        assert_eq!(f.ctx.state, SelectionState::Idle);
    }

    #[test]
    fn test_pointer_on_globe_changes_nothing() {
        let mut f = fixture_in(HeadlessScene::with_globe(0.02, 0.6371), &["Alpha"]);

        f.controller.handle_pointer(
            &mut f.ctx,
            &f.objects,
            &mut f.scene,
            &f.camera,
            Ndc { x: 0.0, y: 0.0 },
            Instant::now(),
        );

        assert_eq!(f.ctx.state, SelectionState::Idle);
    }

    #[test]
    fn test_new_transition_replaces_old() {
        let mut f = fixture(&["Alpha"]);
        let alpha = handles(&f)[0];
        let now = Instant::now();

        f.controller.select(&mut f.ctx, &f.objects, &mut f.scene, &f.camera, alpha, now);
        f.controller.escape(&mut f.ctx, &mut f.scene, &f.camera, now);

        let (position, target) = f.ctx.transition.as_ref().unwrap().destination();
        assert_eq!(position, HOME_POSITION);
        assert_eq!(target, Vector3::zeros());
    }
}
