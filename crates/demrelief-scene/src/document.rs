//! In-memory scene document.

use crate::error::{Result, SceneError};
use crate::scene::{
    CameraHandle, CameraSpec, LightHandle, MaterialHandle, MaterialSpec, PlaneHandle, PlaneSpec,
    RenderSettings, SceneHost, SceneTemplate, SunSpec,
};
use std::path::{Path, PathBuf};

/// An object held by a [`SceneDocument`].
#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    /// Something the template started with.
    Placeholder(String),
    Plane {
        spec: PlaneSpec,
        material: Option<MaterialHandle>,
    },
    Camera(CameraSpec),
    Light(SunSpec),
}

impl SceneObject {
    /// Object name.
    pub fn name(&self) -> &str {
        match self {
            SceneObject::Placeholder(name) => name,
            SceneObject::Plane { spec, .. } => &spec.name,
            SceneObject::Camera(spec) => &spec.name,
            SceneObject::Light(spec) => &spec.name,
        }
    }
}

/// A scene held in process, for inspection and tests.
///
/// Rendering records the requested output path instead of producing pixels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneDocument {
    /// Object slots; removed objects leave `None` so handles stay stable.
    objects: Vec<Option<SceneObject>>,
    materials: Vec<MaterialSpec>,
    render: Option<RenderSettings>,
    active_camera: Option<CameraHandle>,
    renders: Vec<PathBuf>,
}

impl SceneDocument {
    /// A document holding the template's placeholder objects.
    pub fn from_template(template: &SceneTemplate) -> Self {
        SceneDocument {
            objects: template
                .placeholders
                .iter()
                .map(|name| Some(SceneObject::Placeholder(name.clone())))
                .collect(),
            ..Default::default()
        }
    }

    /// Live objects in creation order.
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter().flatten()
    }

    /// Render settings, once configured.
    pub fn render_settings(&self) -> Option<&RenderSettings> {
        self.render.as_ref()
    }

    /// Output paths of every render requested so far.
    pub fn renders(&self) -> &[PathBuf] {
        &self.renders
    }

    /// Plane behind a handle.
    pub fn plane(&self, handle: PlaneHandle) -> Option<(&PlaneSpec, Option<MaterialHandle>)> {
        match self.objects.get(handle.id() as usize)? {
            Some(SceneObject::Plane { spec, material }) => Some((spec, *material)),
            _ => None,
        }
    }

    /// Camera behind a handle.
    pub fn camera(&self, handle: CameraHandle) -> Option<&CameraSpec> {
        match self.objects.get(handle.id() as usize)? {
            Some(SceneObject::Camera(spec)) => Some(spec),
            _ => None,
        }
    }

    /// Light behind a handle.
    pub fn light(&self, handle: LightHandle) -> Option<&SunSpec> {
        match self.objects.get(handle.id() as usize)? {
            Some(SceneObject::Light(spec)) => Some(spec),
            _ => None,
        }
    }

    /// Material behind a handle.
    pub fn material(&self, handle: MaterialHandle) -> Option<&MaterialSpec> {
        self.materials.get(handle.id() as usize)
    }

    /// Camera used for rendering.
    pub fn active_camera(&self) -> Option<CameraHandle> {
        self.active_camera
    }

    fn push(&mut self, object: SceneObject) -> u32 {
        self.objects.push(Some(object));
        (self.objects.len() - 1) as u32
    }
}

impl SceneHost for SceneDocument {
    fn configure_render(&mut self, settings: &RenderSettings) -> Result<()> {
        self.render = Some(settings.clone());
        Ok(())
    }

    fn remove_object(&mut self, name: &str) -> Result<()> {
        let slot = self
            .objects
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|o| o.name() == name))
            .ok_or_else(|| SceneError::MissingObject(name.to_string()))?;
        *slot = None;
        Ok(())
    }

    fn create_plane(&mut self, plane: &PlaneSpec) -> Result<PlaneHandle> {
        let id = self.push(SceneObject::Plane {
            spec: plane.clone(),
            material: None,
        });
        Ok(PlaneHandle::new(id))
    }

    fn create_camera(&mut self, camera: &CameraSpec) -> Result<CameraHandle> {
        Ok(CameraHandle::new(self.push(SceneObject::Camera(camera.clone()))))
    }

    fn create_light(&mut self, light: &SunSpec) -> Result<LightHandle> {
        Ok(LightHandle::new(self.push(SceneObject::Light(light.clone()))))
    }

    fn create_material(&mut self, material: &MaterialSpec) -> Result<MaterialHandle> {
        self.materials.push(material.clone());
        Ok(MaterialHandle::new((self.materials.len() - 1) as u32))
    }

    fn assign_material(&mut self, plane: PlaneHandle, material: MaterialHandle) -> Result<()> {
        if self.material(material).is_none() {
            return Err(SceneError::UnknownHandle {
                kind: "material",
                id: material.id(),
            });
        }
        match self.objects.get_mut(plane.id() as usize) {
            Some(Some(SceneObject::Plane { material: slot, .. })) => {
                *slot = Some(material);
                Ok(())
            }
            _ => Err(SceneError::UnknownHandle {
                kind: "plane",
                id: plane.id(),
            }),
        }
    }

    fn set_active_camera(&mut self, camera: CameraHandle) -> Result<()> {
        if self.camera(camera).is_none() {
            return Err(SceneError::UnknownHandle {
                kind: "camera",
                id: camera.id(),
            });
        }
        self.active_camera = Some(camera);
        Ok(())
    }

    fn render_still(&mut self, output: &Path) -> Result<()> {
        self.renders.push(output.to_path_buf());
        Ok(())
    }
}
