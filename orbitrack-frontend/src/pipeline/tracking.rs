use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use orbitrack_common::{Catalog, ElementSetRecord};
use std::collections::HashMap;

use super::propagator::{Geodetic, ParseError, Propagator};
use crate::scene::{Color, RenderHandle, Renderer};

pub const UNKNOWN_NAME: &str = "Unknown";
pub const UNKNOWN_ID: &str = "N/A";

/// Display metadata for the selection UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedInfo {
    pub name: String,
    pub norad_id: Option<u64>,
}

impl TrackedInfo {
    fn resolve(record: &ElementSetRecord, catalog: &Catalog) -> Self {
        let entry = catalog.get(record.id);
        // blank names and id 0 count as missing
        let name = record
            .info
            .as_ref()
            .map(|info| info.satname.trim())
            .filter(|name| !name.is_empty())
            .or_else(|| entry.map(|e| e.name.trim()).filter(|name| !name.is_empty()))
            .map(str::to_string)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string());
        let norad_id = record
            .info
            .as_ref()
            .map(|info| info.satid)
            .filter(|&id| id != 0)
            .or_else(|| entry.map(|e| e.id).filter(|&id| id != 0));

        Self { name, norad_id }
    }

    pub fn id_label(&self) -> String {
        match self.norad_id {
            Some(id) => id.to_string(),
            None => UNKNOWN_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackedObject<H> {
    pub info: TrackedInfo,
    pub propagable: H,
    pub render_handle: RenderHandle,
    /// Last valid render-space position
    pub position: Vector3<f64>,
}

/// Objects derived once per session; only positions change afterwards.
#[derive(Debug)]
pub struct TrackedSet<H> {
    objects: Vec<TrackedObject<H>>,
    by_handle: HashMap<RenderHandle, usize>,
}

impl<H> Default for TrackedSet<H> {
    fn default() -> Self {
        Self {
            objects: Vec::new(),
            by_handle: HashMap::new(),
        }
    }
}

impl<H> TrackedSet<H> {
    fn push(&mut self, object: TrackedObject<H>) {
        self.by_handle.insert(object.render_handle, self.objects.len());
        self.objects.push(object);
    }

    pub fn get(&self, handle: RenderHandle) -> Option<&TrackedObject<H>> {
        self.by_handle.get(&handle).map(|&index| &self.objects[index])
    }

    pub fn contains(&self, handle: RenderHandle) -> bool {
        self.by_handle.contains_key(&handle)
    }

    /// Catalog order
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject<H>> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Geodetic to render-space mapping onto a globe of `base_radius`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobeMapping {
    pub base_radius: f64,
    pub reference_radius_km: f64,
}

impl Default for GlobeMapping {
    fn default() -> Self {
        Self {
            base_radius: 0.6371,
            reference_radius_km: 6371.0,
        }
    }
}

impl GlobeMapping {
    pub fn to_render(&self, geodetic: &Geodetic) -> Vector3<f64> {
        let radius = self.base_radius + geodetic.height_km / self.reference_radius_km;
        let (sin_lat, cos_lat) = geodetic.latitude.sin_cos();
        let (sin_lon, cos_lon) = geodetic.longitude.sin_cos();

        Vector3::new(
            radius * cos_lat * cos_lon,
            radius * sin_lat,
            radius * cos_lat * sin_lon,
        )
    }
}

/// First two non-empty trimmed lines of a raw element set
pub fn split_element_set(raw: &str) -> Result<(&str, &str), ParseError> {
    let mut lines = raw.lines().map(str::trim).filter(|line| !line.is_empty());
    match (lines.next(), lines.next()) {
        (Some(line1), Some(line2)) => Ok((line1, line2)),
        (Some(_), None) => Err(ParseError::TooFewLines { found: 1 }),
        _ => Err(ParseError::TooFewLines { found: 0 }),
    }
}

pub struct PositionPipeline<P> {
    propagator: P,
    mapping: GlobeMapping,
}

impl<P: Propagator> PositionPipeline<P> {
    pub fn new(propagator: P, mapping: GlobeMapping) -> Self {
        Self { propagator, mapping }
    }

    pub fn mapping(&self) -> &GlobeMapping {
        &self.mapping
    }

    /// Parse every usable record once and place it in the scene.
    ///
    /// Error records, records with fewer than two usable lines, rejected element
    /// sets and element sets with no position at `at` are skipped.
    pub fn build_tracked_objects<R: Renderer>(
        &self,
        records: &[ElementSetRecord],
        catalog: &Catalog,
        renderer: &mut R,
        at: DateTime<Utc>,
    ) -> TrackedSet<P::Handle> {
        let mut set = TrackedSet::default();

        for record in records {
            let Some(raw) = record.raw_element_set() else {
                tracing::debug!("Skipping {}: {}", record.id, record.error().unwrap_or_default());
                continue;
            };

            let propagable = match split_element_set(raw)
                .and_then(|(line1, line2)| self.propagator.parse(line1, line2))
            {
                Ok(handle) => handle,
                Err(e) => {
                    tracing::warn!("Skipping element set for {}: {}", record.id, e);
                    continue;
                }
            };

            let Some(position) = self.compute_position(&propagable, at) else {
                tracing::warn!("Skipping {}: no position at initial placement", record.id);
                continue;
            };

            let render_handle = renderer.create_point(position, Color::SATELLITE);
            set.push(TrackedObject {
                info: TrackedInfo::resolve(record, catalog),
                propagable,
                render_handle,
                position,
            });
        }

        tracing::info!(
            "Built {} tracked objects from {} records",
            set.len(),
            records.len()
        );
        set
    }

    pub fn compute_position(&self, propagable: &P::Handle, at: DateTime<Utc>) -> Option<Vector3<f64>> {
        self.propagator
            .position_at(propagable, at)
            .map(|geodetic| self.mapping.to_render(&geodetic))
    }

    /// Recompute every object at `at`. Objects without a position keep their last one.
    /// Returns how many objects moved.
    pub fn tick<R: Renderer>(&self, set: &mut TrackedSet<P::Handle>, renderer: &mut R, at: DateTime<Utc>) -> usize {
        let mut updated = 0;
        for object in set.objects.iter_mut() {
            if let Some(position) = self.compute_position(&object.propagable, at) {
                object.position = position;
                renderer.set_position(object.render_handle, position);
                updated += 1;
            }
        }
        updated
    }
}
