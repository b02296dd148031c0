use glam::{DVec3, Mat4, Vec3};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

const FOV_Y_DEG: f32 = 45.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 10_000.0;
const MIN_RADIUS: f64 = 0.5;
const MAX_RADIUS: f64 = 5_000.0;

/// Orbit camera around a target in Y-up world space.
#[derive(Debug, Clone)]
pub struct Camera {
    // --- Orbital Parameters (Primary State) ---
    /// Point the camera orbits and looks at.
    pub target: DVec3,
    /// Distance from the camera to the target.
    pub radius: f64,
    /// Rotation about the world Y axis (radians).
    pub azimuth_rad: f64,
    /// Angle above the XZ plane (radians).
    pub elevation_rad: f64,

    // --- Derived (Updated by `update()`) ---
    eye: DVec3,

    /// Viewport width / height.
    pub aspect: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self {
            target: DVec3::ZERO,
            radius: 30.0,
            azimuth_rad: 45f64.to_radians(),
            elevation_rad: 20f64.to_radians(),
            eye: DVec3::ZERO,
            aspect,
        };
        camera.update();
        camera
    }

    /// Recomputes the eye position. Call after changing orbital parameters.
    pub fn update(&mut self) {
        let (sin_az, cos_az) = self.azimuth_rad.sin_cos();
        let (sin_el, cos_el) = self.elevation_rad.sin_cos();
        self.eye = self.target
            + self.radius * DVec3::new(cos_el * sin_az, sin_el, cos_el * cos_az);
    }

    pub fn set_target_and_radius(&mut self, target: DVec3, radius: f64) {
        self.target = target;
        self.radius = radius.clamp(MIN_RADIUS, MAX_RADIUS);
        self.update();
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    #[inline]
    pub fn eye(&self) -> Vec3 {
        self.eye.as_vec3()
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target.as_vec3(), Vec3::Y)
    }

    /// glam's right-handed perspective already maps depth to [0, 1].
    pub fn proj(&self) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEG.to_radians(), self.aspect, NEAR, FAR)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.proj() * self.view()
    }

    /// Projects a world point to viewport pixels (origin top-left).
    /// Points behind the camera or outside the depth range give `None`.
    pub fn project(&self, world: DVec3, viewport: [f32; 2]) -> Option<[f32; 2]> {
        let clip = self.view_proj() * world.as_vec3().extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some([
            (ndc.x * 0.5 + 0.5) * viewport[0],
            (0.5 - ndc.y * 0.5) * viewport[1],
        ])
    }
}

#[derive(Default)]
pub struct CameraController {
    mouse_down: bool,
    last_mouse: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Left-drag orbits, the wheel zooms.
    pub fn handle_event(&mut self, event: &WindowEvent, camera: &mut Camera) {
        match event {
            WindowEvent::MouseInput { button, state, .. } => {
                if *button == MouseButton::Left {
                    self.mouse_down = *state == ElementState::Pressed;
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.handle_cursor_orbit((position.x, position.y), camera);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.handle_scroll(scroll, camera);
            }
            _ => {}
        }
    }

    fn handle_scroll(&mut self, delta: f32, camera: &mut Camera) {
        // Scroll up zooms in.
        let zoom = 1.1_f64.powf(-delta as f64);
        camera.radius = (camera.radius * zoom).clamp(MIN_RADIUS, MAX_RADIUS);
        camera.update();
    }

    fn handle_cursor_orbit(&mut self, xy: (f64, f64), camera: &mut Camera) {
        if let (Some(last), true) = (self.last_mouse, self.mouse_down) {
            camera.azimuth_rad -= (xy.0 - last.0) * 0.005;
            camera.elevation_rad = (camera.elevation_rad + (xy.1 - last.1) * 0.005)
                .clamp(-89f64.to_radians(), 89f64.to_radians());
            camera.update();
        }
        self.last_mouse = Some(xy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level_camera() -> Camera {
        let mut cam = Camera::new(2.0);
        cam.azimuth_rad = 0.0;
        cam.elevation_rad = 0.0;
        cam.set_target_and_radius(DVec3::new(1.0, -2.0, 3.0), 10.0);
        cam
    }

    #[test]
    fn eye_orbits_target_at_radius() {
        let cam = level_camera();
        let eye = cam.eye();
        assert!((eye - Vec3::new(1.0, -2.0, 13.0)).length() < 1e-5);
    }

    #[test]
    fn target_projects_to_viewport_centre() {
        let cam = level_camera();
        let p = cam.project(cam.target, [800.0, 400.0]).unwrap();
        assert!((p[0] - 400.0).abs() < 1e-3);
        assert!((p[1] - 200.0).abs() < 1e-3);
    }

    #[test]
    fn up_is_up_on_screen() {
        let cam = level_camera();
        let above = cam.project(cam.target + DVec3::Y, [800.0, 400.0]).unwrap();
        assert!(above[1] < 200.0);
    }

    #[test]
    fn points_behind_the_eye_are_hidden() {
        let cam = level_camera();
        let behind = DVec3::new(1.0, -2.0, 20.0);
        assert!(cam.project(behind, [800.0, 400.0]).is_none());
    }

    #[test]
    fn zoom_is_clamped() {
        let mut cam = level_camera();
        let mut ctl = CameraController::new();
        for _ in 0..500 {
            ctl.handle_scroll(1.0, &mut cam);
        }
        assert_eq!(cam.radius, MIN_RADIUS);
    }
}
