//! Scriptable camera system - decoupled from the crossfade core.
//!
//! The runner owns an [`OrbitCamera`] and asks a [`CameraScript`] each frame
//! where it should go. Only the resulting world position is handed to the
//! crossfade manager.

use glam::Vec3;
use std::f32::consts::PI;

/// Camera update context provided to scripts each frame.
#[derive(Debug, Clone, Copy)]
pub struct CameraUpdateContext {
    /// Seconds since the run started.
    pub elapsed: f32,
    /// Current camera position.
    pub position: Vec3,
    /// Current orbit target.
    pub target: Vec3,
}

/// Camera intent produced by a script.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraIntent {
    /// Target position.
    pub position: Option<Vec3>,
    /// Target orbit center.
    pub target: Option<Vec3>,
}

impl CameraIntent {
    /// Create an empty intent (no changes).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Set target.
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = Some(target);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.position.is_none() && self.target.is_none()
    }
}

/// Trait for scriptable camera controllers.
pub trait CameraScript {
    /// Update the camera each frame.
    /// Returns a CameraIntent describing desired camera changes.
    fn update(&mut self, ctx: &CameraUpdateContext) -> CameraIntent;

    /// True once the script has nothing more to do.
    fn is_finished(&self) -> bool {
        false
    }
}

/// Arc-rotate camera: orbits a target at `radius`, with `alpha` around the
/// vertical axis and `beta` measured down from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    pub alpha: f32,
    pub beta: f32,
    pub radius: f32,
    pub target: Vec3,
    pub lower_radius_limit: f32,
    pub upper_radius_limit: f32,
}

impl OrbitCamera {
    pub fn new(alpha: f32, beta: f32, radius: f32, target: Vec3) -> Self {
        let mut camera = Self {
            alpha,
            beta,
            radius,
            target,
            lower_radius_limit: 2.0,
            upper_radius_limit: 50.0,
        };
        camera.clamp();
        camera
    }

    /// World-space camera position.
    pub fn position(&self) -> Vec3 {
        let (sin_beta, cos_beta) = self.beta.sin_cos();
        let (sin_alpha, cos_alpha) = self.alpha.sin_cos();
        self.target + self.radius * Vec3::new(cos_alpha * sin_beta, cos_beta, sin_alpha * sin_beta)
    }

    /// Move the camera to `position`, keeping the current target.
    ///
    /// The distance to the target is clamped to the radius limits.
    pub fn set_position(&mut self, position: Vec3) {
        let offset = position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        self.radius = radius;
        self.beta = (offset.y / radius).clamp(-1.0, 1.0).acos();
        self.alpha = offset.z.atan2(offset.x);
        self.clamp();
    }

    /// Apply a script intent. A new target is applied before a new position.
    pub fn apply(&mut self, intent: &CameraIntent) {
        if let Some(target) = intent.target {
            self.target = target;
        }
        if let Some(position) = intent.position {
            self.set_position(position);
        }
    }

    pub fn update_context(&self, elapsed: f32) -> CameraUpdateContext {
        CameraUpdateContext {
            elapsed,
            position: self.position(),
            target: self.target,
        }
    }

    fn clamp(&mut self) {
        self.radius = self
            .radius
            .clamp(self.lower_radius_limit, self.upper_radius_limit);
        // Keep away from the poles where alpha is undefined.
        self.beta = self.beta.clamp(0.01, PI - 0.01);
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(-PI / 2.0, PI / 2.5, 10.0, Vec3::ZERO)
    }
}

/// Flies the camera through a list of waypoints at constant speed, looking ahead along the path.
#[derive(Debug, Clone)]
pub struct FlyThrough {
    waypoints: Vec<Vec3>,
    seconds_per_leg: f32,
    height: f32,
    look_ahead: f32,
    finished: bool,
}

impl FlyThrough {
    pub fn new(waypoints: Vec<Vec3>, seconds_per_leg: f32) -> Self {
        Self {
            waypoints,
            seconds_per_leg: seconds_per_leg.max(f32::EPSILON),
            height: 1.5,
            look_ahead: 4.0,
            finished: false,
        }
    }

    /// Point on the path (before the height offset) at `elapsed` seconds.
    pub fn point_at(&self, elapsed: f32) -> Option<Vec3> {
        let (first, last) = (self.waypoints.first()?, self.waypoints.last()?);
        if self.waypoints.len() == 1 {
            return Some(*first);
        }
        let legs = (self.waypoints.len() - 1) as f32;
        let progress = (elapsed / self.seconds_per_leg).clamp(0.0, legs);
        if progress >= legs {
            return Some(*last);
        }
        let leg = progress.floor() as usize;
        let t = progress - leg as f32;
        Some(self.waypoints[leg].lerp(self.waypoints[leg + 1], t))
    }

    /// Total duration of the flight in seconds.
    pub fn duration(&self) -> f32 {
        self.waypoints.len().saturating_sub(1) as f32 * self.seconds_per_leg
    }
}

impl CameraScript for FlyThrough {
    fn update(&mut self, ctx: &CameraUpdateContext) -> CameraIntent {
        let Some(point) = self.point_at(ctx.elapsed) else {
            self.finished = true;
            return CameraIntent::new();
        };
        self.finished = ctx.elapsed >= self.duration();

        let position = point + Vec3::Y * self.height;
        let ahead = self
            .point_at(ctx.elapsed + self.seconds_per_leg * 0.25)
            .unwrap_or(point);
        let direction = (ahead - point).normalize_or(Vec3::X);
        let target = position + direction * self.look_ahead;

        // Already there, e.g. parked at the end of the path.
        if ctx.position.abs_diff_eq(position, 1e-4) && ctx.target.abs_diff_eq(target, 1e-4) {
            return CameraIntent::new();
        }
        CameraIntent::new().with_target(target).with_position(position)
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_orbit_position_from_angles() {
        let camera = OrbitCamera::new(0.0, PI / 2.0, 10.0, Vec3::ZERO);
        assert!(approx(camera.position(), Vec3::new(10.0, 0.0, 0.0)));

        let camera = OrbitCamera::new(PI / 2.0, PI / 2.0, 5.0, Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(camera.position(), Vec3::new(1.0, 2.0, 8.0)));
    }

    #[test]
    fn test_orbit_radius_limits() {
        let camera = OrbitCamera::new(0.0, PI / 2.0, 100.0, Vec3::ZERO);
        assert_eq!(camera.radius, 50.0);
        let camera = OrbitCamera::new(0.0, PI / 2.0, 0.5, Vec3::ZERO);
        assert_eq!(camera.radius, 2.0);
    }

    #[test]
    fn test_set_position_round_trips_within_limits() {
        let mut camera = OrbitCamera::default();
        let wanted = Vec3::new(3.0, 4.0, -6.0);
        camera.set_position(wanted);
        assert!(approx(camera.position(), wanted));
    }

    #[test]
    fn test_apply_intent_moves_target_then_position() {
        let mut camera = OrbitCamera::default();
        let intent = CameraIntent::new()
            .with_target(Vec3::new(10.0, 0.0, 0.0))
            .with_position(Vec3::new(6.0, 0.0, 0.0));
        camera.apply(&intent);
        assert_eq!(camera.target, Vec3::new(10.0, 0.0, 0.0));
        assert!(approx(camera.position(), Vec3::new(6.0, 0.0, 0.0)));
        assert!(CameraIntent::new().is_empty());
    }

    #[test]
    fn test_fly_through_interpolates_legs() {
        let path = FlyThrough::new(vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 10.0)], 2.0);
        assert_eq!(path.duration(), 4.0);
        assert!(approx(path.point_at(0.0).unwrap(), Vec3::ZERO));
        assert!(approx(path.point_at(1.0).unwrap(), Vec3::new(5.0, 0.0, 0.0)));
        assert!(approx(path.point_at(3.0).unwrap(), Vec3::new(10.0, 0.0, 5.0)));
        assert!(approx(path.point_at(99.0).unwrap(), Vec3::new(10.0, 0.0, 10.0)));
    }

    #[test]
    fn test_fly_through_drives_camera() {
        let mut script = FlyThrough::new(vec![Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)], 2.0);
        let mut camera = OrbitCamera::default();

        let intent = script.update(&camera.update_context(1.0));
        camera.apply(&intent);
        assert!(approx(camera.position(), Vec3::new(10.0, 1.5, 0.0)));
        assert!(!script.is_finished());

        let intent = script.update(&camera.update_context(2.5));
        camera.apply(&intent);
        assert!(approx(camera.position(), Vec3::new(20.0, 1.5, 0.0)));
        assert!(script.is_finished());
    }

    #[test]
    fn test_fly_through_is_idle_once_parked() {
        let mut script = FlyThrough::new(vec![Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)], 2.0);
        let mut camera = OrbitCamera::default();

        let intent = script.update(&camera.update_context(5.0));
        assert!(!intent.is_empty());
        camera.apply(&intent);

        let intent = script.update(&camera.update_context(6.0));
        assert!(intent.is_empty());
        assert!(script.is_finished());
    }

    #[test]
    fn test_empty_fly_through_finishes_immediately() {
        let mut script = FlyThrough::new(Vec::new(), 1.0);
        let intent = script.update(&OrbitCamera::default().update_context(0.0));
        assert!(intent.is_empty());
        assert!(script.is_finished());
    }
}
