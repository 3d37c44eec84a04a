//! CPU point-sprite rasterizer: projects the live particle buffers through a
//! perspective camera and splats them additively into an RGBA pixel buffer.

use crate::morph::Rotation;
use glam::{EulerRot, Mat4, Vec3, Vec4};

const SPRITE_SIZE: f32 = 0.4;
const SPRITE_OPACITY: f32 = 0.9;
const FOG_DENSITY: f32 = 0.002;

pub const DEFAULT_BRIGHTNESS: f32 = 0.35;

/// Perspective camera on the +z axis looking at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_y_deg: f32,
    pub distance: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            fov_y_deg: 75.0,
            distance: 45.0,
            near: 0.1,
            far: 1000.0,
            aspect: 1.0,
        }
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn set_viewport(&mut self, w: usize, h: usize) {
        self.aspect = w.max(1) as f32 / h.max(1) as f32;
    }

    pub fn view_projection(&self) -> Mat4 {
        let proj = Mat4::perspective_rh(self.fov_y_deg.to_radians(), self.aspect, self.near, self.far);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y);
        proj * view
    }

    /// Pixel height of one world unit at view depth `depth`.
    fn pixels_per_unit(&self, h: usize, depth: f32) -> f32 {
        let half = (self.fov_y_deg.to_radians() * 0.5).tan();
        h as f32 / (2.0 * half * depth.max(self.near))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Rasterizer {
    w: usize,
    h: usize,
    camera: Camera,
    brightness: f32,
    accum: Vec<f32>,
    rgba: Vec<u8>,
}

impl Rasterizer {
    pub fn new(w: usize, h: usize, brightness: f32) -> Self {
        let mut r = Self {
            w: 0,
            h: 0,
            camera: Camera::new(),
            brightness: clamp_brightness(brightness),
            accum: Vec::new(),
            rgba: Vec::new(),
        };
        r.resize(w, h);
        r
    }

    /// Recomputes the camera aspect and reallocates the output surface.
    pub fn resize(&mut self, w: usize, h: usize) {
        if w == self.w && h == self.h {
            return;
        }
        self.w = w;
        self.h = h;
        self.camera.set_viewport(w, h);
        self.accum = vec![0.0; w * h * 3];
        self.rgba = vec![0; w * h * 4];
        log::debug!("raster surface resized to {w}x{h} (aspect {:.3})", self.camera.aspect());
    }

    pub fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn draw(&mut self, positions: &[f32], colors: &[f32], rotation: Rotation) -> &[u8] {
        self.accum.fill(0.0);
        if self.w == 0 || self.h == 0 {
            return &self.rgba;
        }

        let model = Mat4::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
        let mvp = self.camera.view_projection() * model;
        let gain = SPRITE_OPACITY * self.brightness;
        let (wf, hf) = (self.w as f32, self.h as f32);

        for (p, c) in positions.chunks_exact(3).zip(colors.chunks_exact(3)) {
            let clip: Vec4 = mvp * Vec4::new(p[0], p[1], p[2], 1.0);
            if clip.w <= self.camera.near {
                continue;
            }
            let ndc = clip.truncate() / clip.w;
            if ndc.x.abs() > 1.0 || ndc.y.abs() > 1.0 || ndc.z > 1.0 {
                continue;
            }

            let depth = clip.w;
            let fog = (-(FOG_DENSITY * depth).powi(2)).exp();
            let weight = gain * fog;
            let color = Vec3::new(c[0], c[1], c[2]).max(Vec3::ZERO) * weight;

            let px = (ndc.x * 0.5 + 0.5) * wf;
            let py = (0.5 - ndc.y * 0.5) * hf;
            let radius = 0.5 * SPRITE_SIZE * self.camera.pixels_per_unit(self.h, depth);
            self.splat(px, py, radius, color);
        }

        for (dst, src) in self.rgba.chunks_exact_mut(4).zip(self.accum.chunks_exact(3)) {
            dst[0] = (src[0].clamp(0.0, 1.0) * 255.0) as u8;
            dst[1] = (src[1].clamp(0.0, 1.0) * 255.0) as u8;
            dst[2] = (src[2].clamp(0.0, 1.0) * 255.0) as u8;
            dst[3] = 255;
        }
        &self.rgba
    }

    fn splat(&mut self, px: f32, py: f32, radius: f32, color: Vec3) {
        let w = self.w as isize;
        let h = self.h as isize;

        // Sub-pixel sprites land in a single pixel.
        if radius < 1.0 {
            let x = px.floor() as isize;
            let y = py.floor() as isize;
            if x >= 0 && y >= 0 && x < w && y < h {
                self.add(x as usize, y as usize, color);
            }
            return;
        }

        let r = radius.ceil() as isize;
        let cx = px.floor() as isize;
        let cy = py.floor() as isize;
        let norm = 1.0 / (radius * radius);
        for y in (cy - r).max(0)..=(cy + r).min(h - 1) {
            for x in (cx - r).max(0)..=(cx + r).min(w - 1) {
                let dx = x as f32 + 0.5 - px;
                let dy = y as f32 + 0.5 - py;
                let falloff = 1.0 - (dx * dx + dy * dy) * norm;
                if falloff > 0.0 {
                    self.add(x as usize, y as usize, color * falloff);
                }
            }
        }
    }

    #[inline]
    fn add(&mut self, x: usize, y: usize, color: Vec3) {
        let i = (y * self.w + x) * 3;
        self.accum[i] += color.x;
        self.accum[i + 1] += color.y;
        self.accum[i + 2] += color.z;
    }
}

fn clamp_brightness(brightness: f32) -> f32 {
    if !brightness.is_finite() {
        log::warn!("brightness {brightness} is not finite; using {DEFAULT_BRIGHTNESS}");
        return DEFAULT_BRIGHTNESS;
    }
    brightness.clamp(0.01, 4.0)
}
