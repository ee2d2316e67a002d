use nalgebra::Vector3;
use std::time::{Duration, Instant};

use crate::scene::Camera;

/// Default view: a bit above the globe, looking at its center
pub const HOME_POSITION: Vector3<f64> = Vector3::new(0.0, 0.0, 2.0);
pub const RETURN_DURATION: Duration = Duration::from_millis(1000);
pub const FOCUS_DURATION: Duration = Duration::from_millis(300);
/// Fraction of the way the camera moves toward the focus point on select
pub const FOCUS_LERP: f64 = 0.2;
/// Focus point is this multiple of the object's position
pub const FOCUS_DISTANCE_FACTOR: f64 = 2.0;

/// Time-driven interpolation of camera position and orbit target.
///
/// Stepped once per frame until progress reaches 1. A newer transition simply
/// replaces an older one.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraTransition {
    from_position: Vector3<f64>,
    to_position: Vector3<f64>,
    from_target: Vector3<f64>,
    to_target: Vector3<f64>,
    started_at: Instant,
    duration: Duration,
}

impl CameraTransition {
    pub fn new(
        camera: &Camera,
        to_position: Vector3<f64>,
        to_target: Vector3<f64>,
        started_at: Instant,
        duration: Duration,
    ) -> Self {
        Self {
            from_position: camera.position,
            to_position,
            from_target: camera.target,
            to_target,
            started_at,
            duration,
        }
    }

    pub fn returning_home(camera: &Camera, now: Instant) -> Self {
        Self::new(camera, HOME_POSITION, Vector3::zeros(), now, RETURN_DURATION)
    }

    pub fn focusing(camera: &Camera, object: Vector3<f64>, now: Instant) -> Self {
        let to_position = camera
            .position
            .lerp(&(object * FOCUS_DISTANCE_FACTOR), FOCUS_LERP);
        Self::new(camera, to_position, object, now, FOCUS_DURATION)
    }

    pub fn destination(&self) -> (Vector3<f64>, Vector3<f64>) {
        (self.to_position, self.to_target)
    }

    /// Interpolation parameter in [0, 1]
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Move the camera to where it should be at `now`; true once finished
    pub fn apply(&self, camera: &mut Camera, now: Instant) -> bool {
        let t = self.progress(now);
        camera.position = self.from_position.lerp(&self.to_position, t);
        camera.target = self.from_target.lerp(&self.to_target, t);
        t >= 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vector3<f64>, b: Vector3<f64>) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn test_return_transition_runs_for_one_second() {
        let mut camera = Camera::new(1.0);
        let start = Instant::now();
        let transition = CameraTransition::returning_home(&camera, start);

        assert!(!transition.apply(&mut camera, start + Duration::from_millis(500)));
        assert!(close(camera.position, Vector3::new(0.0, 0.0, 5.0)));

        assert!(transition.apply(&mut camera, start + Duration::from_millis(1000)));
        assert!(close(camera.position, HOME_POSITION));
        assert!(close(camera.target, Vector3::zeros()));
    }

    #[test]
    fn test_progress_is_clamped() {
        let camera = Camera::new(1.0);
        let start = Instant::now();
        let transition = CameraTransition::returning_home(&camera, start);

        assert_eq!(transition.progress(start), 0.0);
        assert_eq!(transition.progress(start + Duration::from_secs(5)), 1.0);
    }

    #[test]
    fn test_focus_moves_fifth_of_the_way_to_twice_the_object() {
        let camera = Camera::new(1.0);
        let object = Vector3::new(1.0, 0.0, 0.0);
        let transition = CameraTransition::focusing(&camera, object, Instant::now());

        let (position, target) = transition.destination();
        // (0,0,8) + 0.2 * ((2,0,0) - (0,0,8))
        assert!(close(position, Vector3::new(0.4, 0.0, 6.4)));
        assert_eq!(target, object);
    }

    #[test]
    fn test_focus_eases_rather_than_jumps() {
        let mut camera = Camera::new(1.0);
        let start = Instant::now();
        let transition = CameraTransition::focusing(&camera, Vector3::new(1.0, 0.0, 0.0), start);

        transition.apply(&mut camera, start + FOCUS_DURATION / 2);
        assert!(close(camera.target, Vector3::new(0.5, 0.0, 0.0)));

        assert!(transition.apply(&mut camera, start + FOCUS_DURATION));
        assert!(close(camera.target, Vector3::new(1.0, 0.0, 0.0)));
    }
}
