//! Render-side capability used by the tracking and interaction code.
//!
//! Nothing here rasterizes anything: the [`Renderer`] trait is the seam to
//! whatever engine draws the globe, and [`HeadlessScene`] is an in-memory
//! implementation with real ray picking.

use nalgebra::Vector3;

mod headless;
pub use headless::HeadlessScene;

/// 0xRRGGBB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const SATELLITE: Color = Color(0xff0000);
    pub const HIGHLIGHT: Color = Color(0x00ffff);
    pub const GLOBE: Color = Color(0x00578a);
}

/// Opaque reference to an object owned by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderHandle(pub u64);

/// Normalized device coordinates, both axes in [-1, 1], y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ndc {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    /// Map a pointer position in pixels (origin top-left) to NDC
    pub fn to_ndc(&self, x: f64, y: f64) -> Ndc {
        Ndc {
            x: (x / self.width) * 2.0 - 1.0,
            y: -(y / self.height) * 2.0 + 1.0,
        }
    }
}

/// Perspective camera orbiting a target point
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vector3<f64>,
    pub target: Vector3<f64>,
    pub fov_y_deg: f64,
    pub aspect: f64,
}

impl Camera {
    pub const INITIAL_DISTANCE: f64 = 8.0;
    pub const FOV_Y_DEG: f64 = 75.0;

    pub fn new(aspect: f64) -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, Self::INITIAL_DISTANCE),
            target: Vector3::zeros(),
            fov_y_deg: Self::FOV_Y_DEG,
            aspect,
        }
    }

    /// World-space ray through `ndc`: (origin, unit direction)
    pub fn ray(&self, ndc: Ndc) -> (Vector3<f64>, Vector3<f64>) {
        let forward = (self.target - self.position)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(|| -Vector3::z());

        let world_up = Vector3::y();
        let right = forward
            .cross(&world_up)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::x);
        let up = right.cross(&forward);

        let half_height = (self.fov_y_deg.to_radians() / 2.0).tan();
        let half_width = half_height * self.aspect;

        let direction = (forward + right * (ndc.x * half_width) + up * (ndc.y * half_height)).normalize();
        (self.position, direction)
    }
}

/// What the tracking pipeline and interaction controller need from a renderer
pub trait Renderer {
    fn create_point(&mut self, position: Vector3<f64>, color: Color) -> RenderHandle;

    fn set_position(&mut self, handle: RenderHandle, position: Vector3<f64>);

    fn set_color(&mut self, handle: RenderHandle, color: Color);

    /// Nearest object of any kind under the pointer
    fn hit_test(&self, pointer: Ndc, camera: &Camera) -> Option<RenderHandle>;

    /// Submit one frame
    fn render(&mut self, camera: &Camera);
}
