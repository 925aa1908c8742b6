//! Declarative shaded-relief scene and the routine that builds it.
//!
//! The scene is one subdivided plane carrying a displacement-mapped matte
//! material, an orthographic camera looking straight down on it, and a sun
//! lamp. [`build_scene`] drives any [`SceneHost`] through the same sequence
//! of calls, so the in-memory [`crate::SceneDocument`] and the generated
//! Blender script ([`crate::BlenderScript`]) describe identical scenes.

use crate::config::RenderConfig;
use crate::error::Result;
use demrelief_dem::validate::{check_input_path, check_output_path, IMAGE_EXTENSIONS, RENDER_EXTENSIONS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Energy of the sun lamp, in W/m².
pub const SUN_ENERGY: f32 = 5.0;
/// Height of the camera above the plane.
pub const CAMERA_HEIGHT: f32 = 10.0;
/// Side length of the plane primitive before scaling.
pub const PLANE_SIZE: f32 = 2.0;
/// Adaptive subdivision dicing rate, in pixels per micropolygon.
pub const DICING_RATE: f32 = 1.0;
/// Subdivision levels used when adaptive subdivision is unavailable.
pub const SUBDIVISION_LEVELS: u32 = 6;

/// A 3-component vector (location, rotation in radians, or scale).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Wrap a host-specific id.
            pub fn new(id: u32) -> Self {
                Self(id)
            }

            /// Host-specific id.
            pub fn id(&self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// A plane object created by a host.
    PlaneHandle
);
handle!(
    /// A camera object created by a host.
    CameraHandle
);
handle!(
    /// A light object created by a host.
    LightHandle
);
handle!(
    /// A material created by a host.
    MaterialHandle
);

/// Render engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Engine {
    /// Path tracer (required for true displacement).
    Cycles,
}

/// Cycles feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureSet {
    Supported,
    /// Needed for adaptive subdivision.
    Experimental,
}

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Png,
}

/// Renderer and output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderSettings {
    pub engine: Engine,
    pub feature_set: FeatureSet,
    /// Base resolution (the DEM image size).
    pub resolution: (u32, u32),
    /// Percentage of the base resolution actually rendered.
    pub resolution_percentage: u32,
    /// Samples per pixel.
    pub samples: u32,
    pub format: OutputFormat,
}

/// Subdivision modifier on the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subdivision {
    /// Dice according to on-screen size rather than a fixed level.
    pub adaptive: bool,
    pub dicing_rate: f32,
    pub levels: u32,
}

/// The displaced terrain plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    pub name: String,
    /// Side length of the primitive before scaling.
    pub size: f32,
    pub scale: Vec3,
    pub subdivision: Subdivision,
}

impl PlaneSpec {
    /// Plane scaled to the aspect ratio of a `width` x `height` image.
    ///
    /// The longer side keeps scale 1.
    pub fn for_image(width: u32, height: u32) -> Self {
        let longest = width.max(height).max(1) as f32;
        PlaneSpec {
            name: "DEM Plane".to_string(),
            size: PLANE_SIZE,
            scale: Vec3::new(width as f32 / longest, height as f32 / longest, 1.0),
            subdivision: Subdivision {
                adaptive: true,
                dicing_rate: DICING_RATE,
                levels: SUBDIVISION_LEVELS,
            },
        }
    }
}

/// Camera projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Orthographic {
        /// Width of the view along its larger side, in scene units.
        scale: f32,
    },
}

/// A camera object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    pub name: String,
    pub location: Vec3,
    /// Euler rotation in radians.
    pub rotation: Vec3,
    pub projection: Projection,
}

impl CameraSpec {
    /// Orthographic camera above the plane's centre, looking straight down.
    ///
    /// The orthographic scale is twice the plane's larger scale factor, which
    /// is the full extent of its longer side.
    pub fn top_down(plane: &PlaneSpec) -> Self {
        let larger = plane.scale.x.max(plane.scale.y);
        CameraSpec {
            name: "Camera".to_string(),
            location: Vec3::new(0.0, 0.0, CAMERA_HEIGHT),
            rotation: Vec3::ZERO,
            projection: Projection::Orthographic {
                scale: 2.0 * larger,
            },
        }
    }
}

/// A directional (sun) light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunSpec {
    pub name: String,
    pub energy: f32,
    /// Angular diameter in radians; larger means softer shadows.
    pub angle: f32,
    /// Euler rotation in radians.
    pub rotation: Vec3,
}

impl SunSpec {
    /// Sun with its elevation, bearing and softness taken from `config`.
    ///
    /// A sun with zero rotation points straight down (-Z). Tilting it about X
    /// by `90° - sun_angle` puts it `sun_angle` degrees above the southern
    /// horizon; turning that about Z by `180° - sun_azimuth` swings it round
    /// to the configured bearing (+Y is north, +X east).
    pub fn from_config(config: &RenderConfig) -> Self {
        let yaw = (180.0 - config.sun_azimuth).rem_euclid(360.0);
        SunSpec {
            name: "Sun".to_string(),
            energy: SUN_ENERGY,
            angle: config.shadow_softness.to_radians(),
            rotation: Vec3::new(
                (90.0 - config.sun_angle).to_radians(),
                0.0,
                yaw.to_radians(),
            ),
        }
    }

    /// Unit vector the light travels along: -Z turned by the XYZ Euler rotation.
    pub fn direction(&self) -> Vec3 {
        let (sa, ca) = self.rotation.x.sin_cos();
        let (sb, cb) = self.rotation.y.sin_cos();
        let (sc, cc) = self.rotation.z.sin_cos();
        Vec3::new(
            -ca * sb * cc - sa * sc,
            -ca * sb * sc + sa * cc,
            -ca * cb,
        )
    }
}

/// Sampling of the texture outside the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureExtension {
    Repeat,
    /// Repeat edge pixels; no wrap-around at the plane border.
    Extend,
}

/// How the material's displacement output is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplacementMethod {
    Bump,
    /// Move the actual geometry.
    Displacement,
}

/// Matte material whose height comes from the DEM image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSpec {
    pub name: String,
    /// Linear RGBA surface colour.
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub specular: f32,
    /// Image sampled by the texture node.
    pub texture: PathBuf,
    pub extension: TextureExtension,
    /// Displacement node scale.
    pub displacement_scale: f32,
    /// Height value that maps to no displacement.
    pub midlevel: f32,
    pub method: DisplacementMethod,
}

impl MaterialSpec {
    /// Non-reflective material displacing by `exaggeration`.
    pub fn matte_relief(texture: &Path, exaggeration: f32) -> Self {
        MaterialSpec {
            name: "DEM Material".to_string(),
            base_color: [0.6, 0.6, 0.6, 1.0],
            roughness: 1.0,
            specular: 0.0,
            texture: texture.to_path_buf(),
            extension: TextureExtension::Extend,
            displacement_scale: exaggeration,
            midlevel: 0.0,
            method: DisplacementMethod::Displacement,
        }
    }
}

/// Objects a host document is expected to start with.
///
/// [`build_scene`] deletes each one before adding its own objects; a listed
/// object that is not present is a precondition failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneTemplate {
    pub placeholders: Vec<String>,
}

impl SceneTemplate {
    /// Blender's factory startup scene.
    pub fn default_startup() -> Self {
        SceneTemplate {
            placeholders: vec!["Cube".to_string(), "Camera".to_string(), "Light".to_string()],
        }
    }

    /// A document with nothing in it.
    pub fn empty() -> Self {
        SceneTemplate {
            placeholders: Vec::new(),
        }
    }
}

impl Default for SceneTemplate {
    fn default() -> Self {
        Self::default_startup()
    }
}

/// Something that can hold and render a scene.
///
/// Create calls return typed handles; later calls only accept handles the
/// same host returned.
pub trait SceneHost {
    /// Set engine, resolution and sampling.
    fn configure_render(&mut self, settings: &RenderSettings) -> Result<()>;
    /// Delete a pre-existing object by name.
    fn remove_object(&mut self, name: &str) -> Result<()>;
    fn create_plane(&mut self, plane: &PlaneSpec) -> Result<PlaneHandle>;
    fn create_camera(&mut self, camera: &CameraSpec) -> Result<CameraHandle>;
    fn create_light(&mut self, light: &SunSpec) -> Result<LightHandle>;
    fn create_material(&mut self, material: &MaterialSpec) -> Result<MaterialHandle>;
    fn assign_material(&mut self, plane: PlaneHandle, material: MaterialHandle) -> Result<()>;
    fn set_active_camera(&mut self, camera: CameraHandle) -> Result<()>;
    /// Render a still image to `output`.
    fn render_still(&mut self, output: &Path) -> Result<()>;
}

/// Everything needed to render one DEM.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    /// DEM image used as the displacement texture.
    pub dem_path: PathBuf,
    /// Rendered PNG.
    pub output_path: PathBuf,
    /// Pixel size of the DEM image.
    pub image_size: (u32, u32),
    pub config: RenderConfig,
}

impl RenderJob {
    /// Validate inputs and read the DEM image size.
    ///
    /// Both paths are made absolute so a renderer started in another working
    /// directory resolves them the same way.
    pub fn prepare<P, Q>(dem_path: P, output_path: Q, config: RenderConfig) -> Result<Self>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let (dem_path, output_path) = (dem_path.as_ref(), output_path.as_ref());
        config.validate()?;
        check_input_path(dem_path, IMAGE_EXTENSIONS)?;
        check_output_path(output_path, RENDER_EXTENSIONS)?;

        let image_size = demrelief_dem::read_dimensions(dem_path)?;
        Ok(RenderJob {
            dem_path: std::path::absolute(dem_path)?,
            output_path: std::path::absolute(output_path)?,
            image_size,
            config,
        })
    }

    /// Renderer settings for this job.
    pub fn render_settings(&self) -> RenderSettings {
        RenderSettings {
            engine: Engine::Cycles,
            feature_set: FeatureSet::Experimental,
            resolution: self.image_size,
            resolution_percentage: self.config.resolution_scale,
            samples: self.config.samples,
            format: OutputFormat::Png,
        }
    }
}

/// Handles of everything [`build_scene`] created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneHandles {
    pub plane: PlaneHandle,
    pub camera: CameraHandle,
    pub light: LightHandle,
    pub material: MaterialHandle,
}

/// Build the shaded-relief scene on `host` and render it.
///
/// Given the same template state and job, the host receives exactly the same
/// sequence of calls.
pub fn build_scene<H: SceneHost + ?Sized>(
    host: &mut H,
    template: &SceneTemplate,
    job: &RenderJob,
) -> Result<SceneHandles> {
    host.configure_render(&job.render_settings())?;

    for name in &template.placeholders {
        host.remove_object(name)?;
    }

    let (width, height) = job.image_size;
    let plane_spec = PlaneSpec::for_image(width, height);
    let plane = host.create_plane(&plane_spec)?;

    let camera = host.create_camera(&CameraSpec::top_down(&plane_spec))?;
    host.set_active_camera(camera)?;

    let light = host.create_light(&SunSpec::from_config(&job.config))?;

    let material =
        host.create_material(&MaterialSpec::matte_relief(&job.dem_path, job.config.exaggeration))?;
    host.assign_material(plane, material)?;

    debug!(width, height, output = %job.output_path.display(), "scene built");
    host.render_still(&job.output_path)?;

    Ok(SceneHandles {
        plane,
        camera,
        light,
        material,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_plane_aspect_ratio() {
        let wide = PlaneSpec::for_image(400, 200);
        assert_eq!(wide.scale, Vec3::new(1.0, 0.5, 1.0));
        let tall = PlaneSpec::for_image(100, 300);
        assert_relative_eq!(tall.scale.x, 1.0 / 3.0);
        assert_eq!(tall.scale.y, 1.0);
        assert!(tall.subdivision.adaptive);
    }

    #[test]
    fn test_camera_fills_frame() {
        let camera = CameraSpec::top_down(&PlaneSpec::for_image(400, 200));
        assert_eq!(camera.location, Vec3::new(0.0, 0.0, CAMERA_HEIGHT));
        assert_eq!(camera.rotation, Vec3::ZERO);
        assert_eq!(camera.projection, Projection::Orthographic { scale: 2.0 });

        // Square images: both sides give the same scale.
        let square = CameraSpec::top_down(&PlaneSpec::for_image(64, 64));
        assert_eq!(square.projection, Projection::Orthographic { scale: 2.0 });
    }

    #[test]
    fn test_sun_from_config() {
        let sun = SunSpec::from_config(&RenderConfig {
            sun_angle: 30.0,
            shadow_softness: 10.0,
            ..Default::default()
        });
        assert_eq!(sun.energy, SUN_ENERGY);
        assert_relative_eq!(sun.rotation.x, 60f32.to_radians());
        assert_relative_eq!(sun.rotation.z, 225f32.to_radians());
        assert_relative_eq!(sun.angle, 10f32.to_radians());

        let overhead = SunSpec::from_config(&RenderConfig {
            sun_angle: 90.0,
            ..Default::default()
        });
        assert_relative_eq!(overhead.rotation.x, 0.0);
    }

    #[test]
    fn test_default_sun_shines_from_north_west() {
        let sun = SunSpec::from_config(&RenderConfig::default());
        let d = sun.direction();
        // Light travels south-east and down.
        assert!(d.x > 0.0 && d.y < 0.0 && d.z < 0.0, "{d:?}");
        assert_relative_eq!(d.x, -d.y, epsilon = 1e-6);
        assert_relative_eq!(d.z, -(45f32.to_radians().sin()), epsilon = 1e-6);

        // Same beam as a sun rotated (0, 45°, 135°) in Blender.
        let reference = SunSpec {
            rotation: Vec3::new(0.0, 0.785398, 2.35619),
            ..sun.clone()
        };
        let r = reference.direction();
        assert_relative_eq!(d.x, r.x, epsilon = 1e-5);
        assert_relative_eq!(d.y, r.y, epsilon = 1e-5);
        assert_relative_eq!(d.z, r.z, epsilon = 1e-5);
    }

    #[test]
    fn test_sun_bearings() {
        let towards = |azimuth: f32| {
            SunSpec::from_config(&RenderConfig {
                sun_azimuth: azimuth,
                sun_angle: 30.0,
                ..Default::default()
            })
            .direction()
        };
        // From the north: travels south.
        let d = towards(0.0);
        assert_relative_eq!(d.x, 0.0, epsilon = 1e-6);
        assert!(d.y < 0.0);
        // From the east: travels west.
        let d = towards(90.0);
        assert!(d.x < 0.0);
        assert_relative_eq!(d.y, 0.0, epsilon = 1e-6);
        // From the south: travels north.
        let d = towards(180.0);
        assert!(d.y > 0.0);
        assert_relative_eq!(d.z, -(30f32.to_radians().sin()), epsilon = 1e-6);
    }

    #[test]
    fn test_matte_material() {
        let material = MaterialSpec::matte_relief(Path::new("/data/dem.png"), 0.8);
        assert_eq!(material.base_color, [0.6, 0.6, 0.6, 1.0]);
        assert_eq!(material.roughness, 1.0);
        assert_eq!(material.specular, 0.0);
        assert_eq!(material.extension, TextureExtension::Extend);
        assert_eq!(material.displacement_scale, 0.8);
        assert_eq!(material.method, DisplacementMethod::Displacement);
    }
}
