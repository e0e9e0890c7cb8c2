//! Light sources and their uniform-buffer layout.
//!
//! A [`Lighting`] holds one directional light plus up to [`MAX_POINT_LIGHTS`]
//! point lights and [`MAX_SPOT_LIGHTS`] spot lights. [`Lighting::to_uniform`]
//! packs it into the fixed-size block read by the bundled lit shader.

use crate::{
    camera::Camera,
    math::{self, Vec3},
};

pub const MAX_POINT_LIGHTS: usize = 8;
pub const MAX_SPOT_LIGHTS: usize = 8;

/// Spacing along +X between point lights cloned by `add_point_light`.
const CLONE_SPACING: f32 = 2.0;

/// Constant, linear and quadratic falloff terms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    /// Roughly a 50 unit range.
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(-0.2, -1.0, -0.3),
            ambient: Vec3::new(0.2, 0.2, 0.2),
            diffuse: Vec3::new(0.7, 0.7, 0.7),
            specular: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::new(3.0, 5.0, 3.0),
            ambient: Vec3::new(0.1, 0.1, 0.1),
            diffuse: Vec3::new(0.8, 0.8, 0.8),
            specular: Vec3::new(1.0, 1.0, 1.0),
            attenuation: Attenuation::default(),
        }
    }
}

/// A cone light. Cutoffs are cosines of the half-angles, so `inner_cutoff`
/// is the larger of the two.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub inner_cutoff: f32,
    pub outer_cutoff: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
}

impl SpotLight {
    /// Set the cone from half-angles in degrees.
    pub fn set_cone_degrees(&mut self, inner: f32, outer: f32) {
        let outer = outer.max(inner);
        self.inner_cutoff = inner.to_radians().cos();
        self.outer_cutoff = outer.to_radians().cos();
    }

    pub fn cone_degrees(&self) -> (f32, f32) {
        (
            self.inner_cutoff.clamp(-1.0, 1.0).acos().to_degrees(),
            self.outer_cutoff.clamp(-1.0, 1.0).acos().to_degrees(),
        )
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        let mut light = Self {
            position: Vec3::new(0.0, 0.0, 0.0),
            direction: -Vec3::unit_z(),
            inner_cutoff: 1.0,
            outer_cutoff: 1.0,
            ambient: Vec3::new(0.0, 0.0, 0.0),
            diffuse: Vec3::new(1.0, 1.0, 1.0),
            specular: Vec3::new(1.0, 1.0, 1.0),
            attenuation: Attenuation::default(),
        };
        light.set_cone_degrees(12.5, 17.5);
        light
    }
}

/// Cel-shading parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ToonShading {
    pub enabled: bool,
    /// Number of diffuse bands.
    pub levels: u32,
    /// Specular intensity above which the highlight is drawn at full strength.
    pub specular_size: f32,
    /// Facing ratio under which fragments are drawn as outline.
    pub edge_threshold: f32,
}

impl Default for ToonShading {
    fn default() -> Self {
        Self {
            enabled: false,
            levels: 4,
            specular_size: 0.1,
            edge_threshold: 0.2,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Lighting {
    pub directional: DirectionalLight,
    point_lights: Vec<PointLight>,
    spot_lights: Vec<SpotLight>,
    pub toon: ToonShading,
    /// Phong exponent shared by all materials.
    pub shininess: f32,
}

impl Default for Lighting {
    /// One directional light, one point light and one spot light.
    fn default() -> Self {
        Self {
            directional: DirectionalLight::default(),
            point_lights: vec![PointLight::default()],
            spot_lights: vec![SpotLight::default()],
            toon: ToonShading::default(),
            shininess: 32.0,
        }
    }
}

impl Lighting {
    /// No point or spot lights.
    pub fn directional_only(directional: DirectionalLight) -> Self {
        Self {
            directional,
            point_lights: Vec::new(),
            spot_lights: Vec::new(),
            ..Default::default()
        }
    }

    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    pub fn point_lights_mut(&mut self) -> &mut [PointLight] {
        &mut self.point_lights
    }

    pub fn spot_lights(&self) -> &[SpotLight] {
        &self.spot_lights
    }

    pub fn spot_lights_mut(&mut self) -> &mut [SpotLight] {
        &mut self.spot_lights
    }

    /// Append `light`. Returns `false` when all slots are taken.
    pub fn push_point_light(&mut self, light: PointLight) -> bool {
        if self.point_lights.len() >= MAX_POINT_LIGHTS {
            return false;
        }
        self.point_lights.push(light);
        true
    }

    pub fn push_spot_light(&mut self, light: SpotLight) -> bool {
        if self.spot_lights.len() >= MAX_SPOT_LIGHTS {
            return false;
        }
        self.spot_lights.push(light);
        true
    }

    /// Clone the first point light (or a default one) shifted along +X.
    pub fn add_point_light(&mut self) -> bool {
        let count = self.point_lights.len();
        let mut light = self.point_lights.first().copied().unwrap_or_default();
        light.position.x += CLONE_SPACING * count as f32;
        self.push_point_light(light)
    }

    /// Clone the first spot light (or a default one) in place.
    pub fn add_spot_light(&mut self) -> bool {
        let light = self.spot_lights.first().copied().unwrap_or_default();
        self.push_spot_light(light)
    }

    /// Returns the removed light, or `None` if `index` is out of range.
    pub fn remove_point_light(&mut self, index: usize) -> Option<PointLight> {
        (index < self.point_lights.len()).then(|| self.point_lights.remove(index))
    }

    pub fn remove_spot_light(&mut self, index: usize) -> Option<SpotLight> {
        (index < self.spot_lights.len()).then(|| self.spot_lights.remove(index))
    }

    /// Flashlight: spot light 0 sits at the camera and points where it looks.
    pub fn attach_spot_to_camera(&mut self, camera: &Camera) {
        if let Some(spot) = self.spot_lights.first_mut() {
            spot.position = camera.position;
            spot.direction = camera.front();
        }
    }

    /// Returns the new state.
    pub fn toggle_toon(&mut self) -> bool {
        self.toon.enabled = !self.toon.enabled;
        log::info!("toon shading {}", if self.toon.enabled { "on" } else { "off" });
        self.toon.enabled
    }

    pub fn to_uniform(&self) -> LightingUniform {
        let mut uniform = LightingUniform {
            directional: DirectionalLightRaw {
                direction: vec4(math::normalize_or_zero(self.directional.direction), 0.0),
                ambient: vec4(self.directional.ambient, 0.0),
                diffuse: vec4(self.directional.diffuse, 0.0),
                specular: vec4(self.directional.specular, 0.0),
            },
            point_lights: [PointLightRaw::default(); MAX_POINT_LIGHTS],
            spot_lights: [SpotLightRaw::default(); MAX_SPOT_LIGHTS],
            counts: [
                self.point_lights.len() as u32,
                self.spot_lights.len() as u32,
                self.toon.enabled as u32,
                self.toon.levels.max(1),
            ],
            params: [
                self.shininess,
                self.toon.specular_size,
                self.toon.edge_threshold,
                0.0,
            ],
        };
        for (raw, light) in uniform.point_lights.iter_mut().zip(&self.point_lights) {
            *raw = PointLightRaw {
                position: vec4(light.position, 1.0),
                ambient: vec4(light.ambient, 0.0),
                diffuse: vec4(light.diffuse, 0.0),
                specular: vec4(light.specular, 0.0),
                attenuation: attenuation(&light.attenuation),
            };
        }
        for (raw, light) in uniform.spot_lights.iter_mut().zip(&self.spot_lights) {
            *raw = SpotLightRaw {
                position: vec4(light.position, 1.0),
                direction: vec4(math::normalize_or_zero(light.direction), 0.0),
                ambient: vec4(light.ambient, 0.0),
                diffuse: vec4(light.diffuse, 0.0),
                specular: vec4(light.specular, 0.0),
                attenuation: attenuation(&light.attenuation),
                cutoff: [light.inner_cutoff, light.outer_cutoff, 0.0, 0.0],
            };
        }
        uniform
    }
}

fn vec4(v: Vec3, w: f32) -> [f32; 4] {
    [v.x, v.y, v.z, w]
}

fn attenuation(a: &Attenuation) -> [f32; 4] {
    [a.constant, a.linear, a.quadratic, 0.0]
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightRaw {
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PointLightRaw {
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpotLightRaw {
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
    /// x = inner, y = outer.
    pub cutoff: [f32; 4],
}

/// Uniform block matching `Lighting` in the bundled lit shader.
///
/// `counts` = (point lights, spot lights, toon enabled, toon levels),
/// `params` = (shininess, toon specular size, toon edge threshold, unused).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightingUniform {
    pub directional: DirectionalLightRaw,
    pub point_lights: [PointLightRaw; MAX_POINT_LIGHTS],
    pub spot_lights: [SpotLightRaw; MAX_SPOT_LIGHTS],
    pub counts: [u32; 4],
    pub params: [f32; 4],
}
