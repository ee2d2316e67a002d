//! The viewer: owns the scene, the tracked set and the selection context, and
//! is driven one tick at a time by the animation loop.

use chrono::{DateTime, Utc};
use orbitrack_common::{Catalog, ElementSetRecord};
use std::time::Instant;

use crate::command::Command;
use crate::interaction::{InteractionController, SearchOutcome, SelectionContext};
use crate::pipeline::{PositionPipeline, Propagator, TrackedSet};
use crate::scene::{Camera, Renderer, Viewport};

pub const NOT_FOUND_NOTICE: &str = "No satellite found matching that name.";

/// What the loop should do after a command
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Message(String),
    Silent,
    Quit,
}

pub struct Viewer<P: Propagator, R> {
    pipeline: PositionPipeline<P>,
    renderer: R,
    camera: Camera,
    viewport: Viewport,
    catalog: Catalog,
    objects: TrackedSet<P::Handle>,
    loaded: bool,
    controller: InteractionController,
    selection: SelectionContext,
}

impl<P: Propagator, R: Renderer> Viewer<P, R> {
    pub fn new(pipeline: PositionPipeline<P>, renderer: R, viewport: Viewport, catalog: Catalog) -> Self {
        Self {
            pipeline,
            renderer,
            camera: Camera::new(viewport.aspect()),
            viewport,
            catalog,
            objects: TrackedSet::default(),
            loaded: false,
            controller: InteractionController::default(),
            selection: SelectionContext::default(),
        }
    }

    /// Build the tracked set from the fetched records. Only the first call has any effect.
    pub fn load_records(&mut self, records: &[ElementSetRecord], at: DateTime<Utc>) {
        if self.loaded {
            tracing::warn!("Tracked objects already built, ignoring {} records", records.len());
            return;
        }
        self.objects = self
            .pipeline
            .build_tracked_objects(records, &self.catalog, &mut self.renderer, at);
        self.loaded = true;
    }

    /// One animation frame: recompute positions, step the camera, render
    pub fn tick(&mut self, at: DateTime<Utc>, now: Instant) {
        self.pipeline.tick(&mut self.objects, &mut self.renderer, at);
        self.controller
            .step_camera(&mut self.selection, &mut self.camera, now);
        self.renderer.render(&self.camera);
    }

    pub fn handle_command(&mut self, command: Command, now: Instant) -> Reply {
        match command {
            Command::Search(query) => {
                let outcome = self.controller.search(
                    &mut self.selection,
                    &self.objects,
                    &mut self.renderer,
                    &self.camera,
                    &query,
                    now,
                );
                match outcome {
                    SearchOutcome::Found(_) => Reply::Message(self.selection.info_panel.to_string()),
                    SearchOutcome::NotFound => Reply::Message(NOT_FOUND_NOTICE.to_string()),
                    SearchOutcome::Ignored => Reply::Silent,
                }
            }
            Command::Click { x, y } => {
                let pointer = self.viewport.to_ndc(x, y);
                self.controller.handle_pointer(
                    &mut self.selection,
                    &self.objects,
                    &mut self.renderer,
                    &self.camera,
                    pointer,
                    now,
                );
                if self.selection.info_panel.is_visible() {
                    Reply::Message(self.selection.info_panel.to_string())
                } else {
                    Reply::Silent
                }
            }
            Command::Escape => {
                self.controller
                    .escape(&mut self.selection, &mut self.renderer, &self.camera, now);
                Reply::Silent
            }
            Command::Status => Reply::Message(self.status()),
            Command::Help => Reply::Message(Command::HELP.to_string()),
            Command::Quit => Reply::Quit,
            Command::Empty => Reply::Silent,
            Command::Unknown(text) => Reply::Message(format!("unknown command '{}'; {}", text, Command::HELP)),
        }
    }

    pub fn status(&self) -> String {
        let selected = self
            .selection
            .info_panel
            .info()
            .map(|info| info.name.clone())
            .unwrap_or_else(|| "none".to_string());
        format!(
            "{} tracked objects, selected: {}, camera at ({:.3}, {:.3}, {:.3})",
            self.objects.len(),
            selected,
            self.camera.position.x,
            self.camera.position.y,
            self.camera.position.z
        )
    }

    pub fn objects(&self) -> &TrackedSet<P::Handle> {
        &self.objects
    }

    pub fn selection(&self) -> &SelectionContext {
        &self.selection
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{HOME_POSITION, RETURN_DURATION, SelectionState};
    use crate::pipeline::{FakePropagator, fake_pipeline, test_epoch};
    use crate::scene::{Color, HeadlessScene};
    use orbitrack_common::CatalogEntry;
    use std::time::Duration;

    fn viewer(names: &[&str]) -> Viewer<FakePropagator, HeadlessScene> {
        let catalog = Catalog::from_entries(
            names
                .iter()
                .enumerate()
                .map(|(i, name)| CatalogEntry::new(i as u64 + 1, *name))
                .collect(),
        );
        Viewer::new(
            fake_pipeline(),
            HeadlessScene::with_globe(0.02, 0.6371),
            Viewport::new(800.0, 600.0),
            catalog,
        )
    }

    #[test]
    fn test_renders_with_zero_objects_before_load() {
        let mut viewer = viewer(&["Alpha"]);
        viewer.tick(test_epoch(), Instant::now());
        viewer.tick(test_epoch(), Instant::now());

        assert!(viewer.objects().is_empty());
        assert_eq!(viewer.renderer().frames(), 2);
    }

    #[test]
    fn test_alpha_search_and_escape() {
        let mut viewer = viewer(&["Alpha"]);
        viewer.load_records(&[ElementSetRecord::success(1, "L1\nL2", None)], test_epoch());
        let now = Instant::now();

        let reply = viewer.handle_command(Command::parse("search alp"), now);
        assert_eq!(reply, Reply::Message("Alpha\nNORAD ID: 1".to_string()));
        let alpha = viewer.selection().state.selected().unwrap();
        assert_eq!(viewer.renderer().color(alpha), Some(Color::HIGHLIGHT));

        assert_eq!(viewer.handle_command(Command::Escape, now), Reply::Silent);
        assert_eq!(viewer.selection().state, SelectionState::Idle);
        assert_eq!(viewer.renderer().color(alpha), Some(Color::SATELLITE));

        viewer.tick(test_epoch(), now + RETURN_DURATION);
        assert!((viewer.camera().position - HOME_POSITION).norm() < 1e-9);
    }

    #[test]
    fn test_error_records_give_empty_scene() {
        let mut viewer = viewer(&["Beta"]);
        viewer.load_records(&[ElementSetRecord::failure(2, "Failed")], test_epoch());

        assert!(viewer.objects().is_empty());
        assert_eq!(
            viewer.handle_command(Command::parse("search beta"), Instant::now()),
            Reply::Message(NOT_FOUND_NOTICE.to_string())
        );
    }

    #[test]
    fn test_records_load_once() {
        let mut viewer = viewer(&["Alpha", "Beta"]);
        viewer.load_records(&[ElementSetRecord::success(1, "L1\nL2", None)], test_epoch());
        viewer.load_records(&[ElementSetRecord::success(2, "L1\nL2", None)], test_epoch());

        assert_eq!(viewer.objects().len(), 1);
    }

    #[test]
    fn test_click_on_globe_then_empty_space() {
        let mut viewer = viewer(&["Alpha"]);
        viewer.load_records(&[ElementSetRecord::success(1, "L1\nL2", None)], test_epoch());
        let now = Instant::now();
        viewer.handle_command(Command::parse("search alpha"), now);

        // the globe sits in the middle of the view
        viewer.handle_command(Command::Click { x: 400.0, y: 300.0 }, now);
        assert!(viewer.selection().info_panel.is_visible());

        viewer.handle_command(Command::Click { x: 1.0, y: 1.0 }, now);
        assert_eq!(viewer.selection().state, SelectionState::Idle);
    }

    #[test]
    fn test_tick_advances_focus_transition() {
        let mut viewer = viewer(&["Alpha"]);
        viewer.load_records(&[ElementSetRecord::success(1, "L1\nL2", None)], test_epoch());
        let start = viewer.camera().position;
        let now = Instant::now();

        viewer.handle_command(Command::parse("search alpha"), now);
        viewer.tick(test_epoch(), now + Duration::from_secs(1));

        assert_ne!(viewer.camera().position, start);
        assert!(viewer.selection().transition.is_none());
    }

    #[test]
    fn test_status_and_quit() {
        let mut viewer = viewer(&[]);
        let now = Instant::now();

        match viewer.handle_command(Command::Status, now) {
            Reply::Message(text) => assert!(text.starts_with("0 tracked objects, selected: none")),
            other => panic!("unexpected reply {:?}", other),
        }
        assert_eq!(viewer.handle_command(Command::parse("quit"), now), Reply::Quit);
    }
}
