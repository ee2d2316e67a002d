use nalgebra::Vector3;

use super::{Camera, Color, Ndc, RenderHandle, Renderer};

const FRAME_LOG_INTERVAL: u64 = 600;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Point,
    Globe,
}

#[derive(Debug, Clone)]
struct SceneNode {
    position: Vector3<f64>,
    radius: f64,
    color: Color,
    kind: NodeKind,
}

/// In-memory scene: spheres with positions and colors, no pixels
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    nodes: Vec<SceneNode>,
    point_radius: f64,
    globe: Option<RenderHandle>,
    frames: u64,
}

impl HeadlessScene {
    pub fn new(point_radius: f64) -> Self {
        Self {
            nodes: Vec::new(),
            point_radius,
            globe: None,
            frames: 0,
        }
    }

    /// Scene with an opaque globe of `radius` at the origin
    pub fn with_globe(point_radius: f64, radius: f64) -> Self {
        let mut scene = Self::new(point_radius);
        let handle = scene.push(Vector3::zeros(), radius, Color::GLOBE, NodeKind::Globe);
        scene.globe = Some(handle);
        scene
    }

    fn push(&mut self, position: Vector3<f64>, radius: f64, color: Color, kind: NodeKind) -> RenderHandle {
        self.nodes.push(SceneNode {
            position,
            radius,
            color,
            kind,
        });
        RenderHandle((self.nodes.len() - 1) as u64)
    }

    fn node(&self, handle: RenderHandle) -> Option<&SceneNode> {
        self.nodes.get(handle.0 as usize)
    }

    fn node_mut(&mut self, handle: RenderHandle) -> Option<&mut SceneNode> {
        self.nodes.get_mut(handle.0 as usize)
    }

    pub fn globe(&self) -> Option<RenderHandle> {
        self.globe
    }

    pub fn position(&self, handle: RenderHandle) -> Option<Vector3<f64>> {
        self.node(handle).map(|n| n.position)
    }

    pub fn color(&self, handle: RenderHandle) -> Option<Color> {
        self.node(handle).map(|n| n.color)
    }

    pub fn point_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.kind == NodeKind::Point).count()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Distance along a unit ray to the first intersection with a sphere
fn ray_sphere(origin: &Vector3<f64>, direction: &Vector3<f64>, center: &Vector3<f64>, radius: f64) -> Option<f64> {
    let oc = origin - center;
    let b = oc.dot(direction);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = -b - root;
    if near >= 0.0 {
        return Some(near);
    }
    let far = -b + root;
    (far >= 0.0).then_some(far)
}

impl Renderer for HeadlessScene {
    fn create_point(&mut self, position: Vector3<f64>, color: Color) -> RenderHandle {
        self.push(position, self.point_radius, color, NodeKind::Point)
    }

    fn set_position(&mut self, handle: RenderHandle, position: Vector3<f64>) {
        if let Some(node) = self.node_mut(handle) {
            node.position = position;
        }
    }

    fn set_color(&mut self, handle: RenderHandle, color: Color) {
        if let Some(node) = self.node_mut(handle) {
            node.color = color;
        }
    }

    fn hit_test(&self, pointer: Ndc, camera: &Camera) -> Option<RenderHandle> {
        let (origin, direction) = camera.ray(pointer);

        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                ray_sphere(&origin, &direction, &node.position, node.radius)
                    .map(|distance| (distance, RenderHandle(index as u64)))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, handle)| handle)
    }

    fn render(&mut self, _camera: &Camera) {
        self.frames += 1;
        if self.frames % FRAME_LOG_INTERVAL == 0 {
            tracing::debug!("Rendered {} frames ({} points)", self.frames, self.point_count());
        }
    }
}
