//! Blender Python script generation.
//!
//! [`BlenderScript`] implements [`SceneHost`] by emitting one or more lines of
//! `bpy` code per call. The resulting program can be run headless with
//! `blender --background --python-expr` or pasted into Blender's Python console.

use crate::error::{Result, SceneError};
use crate::scene::{
    CameraHandle, CameraSpec, DisplacementMethod, Engine, FeatureSet, LightHandle, MaterialHandle,
    MaterialSpec, OutputFormat, PlaneHandle, PlaneSpec, Projection, RenderSettings, SceneHost,
    SunSpec, TextureExtension, Vec3,
};
use std::fmt::Write as _;
use std::path::Path;

/// Quote a string as a Python literal.
pub fn py_str(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Format a float as a Python literal (always with a decimal point).
fn py_f32(value: f32) -> String {
    format!("{value:?}")
}

fn py_vec3(v: Vec3) -> String {
    format!("({}, {}, {})", py_f32(v.x), py_f32(v.y), py_f32(v.z))
}

fn py_rgba(c: [f32; 4]) -> String {
    format!(
        "({}, {}, {}, {})",
        py_f32(c[0]),
        py_f32(c[1]),
        py_f32(c[2]),
        py_f32(c[3])
    )
}

fn py_path(path: &Path) -> String {
    py_str(&path.to_string_lossy())
}

/// Scene host that records Blender Python statements.
#[derive(Debug, Clone)]
pub struct BlenderScript {
    lines: Vec<String>,
    planes: u32,
    cameras: u32,
    lights: u32,
    materials: u32,
}

impl Default for BlenderScript {
    fn default() -> Self {
        Self::new()
    }
}

impl BlenderScript {
    /// Start a script with the imports and scene binding every call relies on.
    pub fn new() -> Self {
        BlenderScript {
            lines: vec!["import bpy".to_string(), "scene = bpy.context.scene".to_string()],
            planes: 0,
            cameras: 0,
            lights: 0,
            materials: 0,
        }
    }

    /// Statements emitted so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The complete program.
    pub fn into_script(self) -> String {
        let mut script = self.lines.join("\n");
        script.push('\n');
        script
    }

    fn emit(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn check(kind: &'static str, id: u32, issued: u32) -> Result<()> {
        if id < issued {
            Ok(())
        } else {
            Err(SceneError::UnknownHandle { kind, id })
        }
    }
}

impl SceneHost for BlenderScript {
    fn configure_render(&mut self, settings: &RenderSettings) -> Result<()> {
        let engine = match settings.engine {
            Engine::Cycles => "CYCLES",
        };
        let feature_set = match settings.feature_set {
            FeatureSet::Supported => "SUPPORTED",
            FeatureSet::Experimental => "EXPERIMENTAL",
        };
        let format = match settings.format {
            OutputFormat::Png => "PNG",
        };
        self.emit(format!("scene.render.engine = {}", py_str(engine)));
        self.emit(format!("scene.cycles.feature_set = {}", py_str(feature_set)));
        self.emit(format!("scene.cycles.samples = {}", settings.samples));
        self.emit(format!("scene.render.resolution_x = {}", settings.resolution.0));
        self.emit(format!("scene.render.resolution_y = {}", settings.resolution.1));
        self.emit(format!(
            "scene.render.resolution_percentage = {}",
            settings.resolution_percentage
        ));
        self.emit(format!(
            "scene.render.image_settings.file_format = {}",
            py_str(format)
        ));
        Ok(())
    }

    fn remove_object(&mut self, name: &str) -> Result<()> {
        // Indexing raises KeyError when the object is missing, aborting the script.
        self.emit(format!(
            "bpy.data.objects.remove(bpy.data.objects[{}], do_unlink=True)",
            py_str(name)
        ));
        Ok(())
    }

    fn create_plane(&mut self, plane: &PlaneSpec) -> Result<PlaneHandle> {
        let var = format!("plane_{}", self.planes);
        self.emit(format!(
            "bpy.ops.mesh.primitive_plane_add(size={}, location=(0.0, 0.0, 0.0))",
            py_f32(plane.size)
        ));
        self.emit(format!("{var} = bpy.context.active_object"));
        self.emit(format!("{var}.name = {}", py_str(&plane.name)));
        self.emit(format!("{var}.scale = {}", py_vec3(plane.scale)));
        self.emit(format!(
            "{var}_subsurf = {var}.modifiers.new(name='Subdivision', type='SUBSURF')"
        ));
        self.emit(format!("{var}_subsurf.subdivision_type = 'SIMPLE'"));
        self.emit(format!("{var}_subsurf.levels = {}", plane.subdivision.levels));
        self.emit(format!(
            "{var}_subsurf.render_levels = {}",
            plane.subdivision.levels
        ));
        let adaptive = if plane.subdivision.adaptive { "True" } else { "False" };
        self.emit(format!("{var}.cycles.use_adaptive_subdivision = {adaptive}"));
        self.emit(format!(
            "{var}.cycles.dicing_rate = {}",
            py_f32(plane.subdivision.dicing_rate)
        ));
        self.planes += 1;
        Ok(PlaneHandle::new(self.planes - 1))
    }

    fn create_camera(&mut self, camera: &CameraSpec) -> Result<CameraHandle> {
        let var = format!("camera_{}", self.cameras);
        self.emit(format!(
            "{var}_data = bpy.data.cameras.new({})",
            py_str(&camera.name)
        ));
        match camera.projection {
            Projection::Orthographic { scale } => {
                self.emit(format!("{var}_data.type = 'ORTHO'"));
                self.emit(format!("{var}_data.ortho_scale = {}", py_f32(scale)));
            }
        }
        self.emit(format!(
            "{var} = bpy.data.objects.new({}, {var}_data)",
            py_str(&camera.name)
        ));
        self.emit(format!("scene.collection.objects.link({var})"));
        self.emit(format!("{var}.location = {}", py_vec3(camera.location)));
        self.emit(format!("{var}.rotation_euler = {}", py_vec3(camera.rotation)));
        self.cameras += 1;
        Ok(CameraHandle::new(self.cameras - 1))
    }

    fn create_light(&mut self, light: &SunSpec) -> Result<LightHandle> {
        let var = format!("light_{}", self.lights);
        self.emit(format!(
            "{var}_data = bpy.data.lights.new({}, type='SUN')",
            py_str(&light.name)
        ));
        self.emit(format!("{var}_data.energy = {}", py_f32(light.energy)));
        self.emit(format!("{var}_data.angle = {}", py_f32(light.angle)));
        self.emit(format!(
            "{var} = bpy.data.objects.new({}, {var}_data)",
            py_str(&light.name)
        ));
        self.emit(format!("scene.collection.objects.link({var})"));
        self.emit(format!("{var}.rotation_euler = {}", py_vec3(light.rotation)));
        self.lights += 1;
        Ok(LightHandle::new(self.lights - 1))
    }

    fn create_material(&mut self, material: &MaterialSpec) -> Result<MaterialHandle> {
        let var = format!("material_{}", self.materials);
        let method = match material.method {
            DisplacementMethod::Bump => "BUMP",
            DisplacementMethod::Displacement => "DISPLACEMENT",
        };
        let extension = match material.extension {
            TextureExtension::Repeat => "REPEAT",
            TextureExtension::Extend => "EXTEND",
        };

        self.emit(format!(
            "{var} = bpy.data.materials.new({})",
            py_str(&material.name)
        ));
        self.emit(format!("{var}.use_nodes = True"));
        // Blender 4.1 moved displacement_method from the Cycles settings onto the material.
        self.emit(format!(
            "({var} if hasattr({var}, 'displacement_method') else {var}.cycles).displacement_method = {}",
            py_str(method)
        ));
        self.emit(format!("{var}_nodes = {var}.node_tree.nodes"));
        self.emit(format!("{var}_links = {var}.node_tree.links"));
        self.emit(format!("{var}_nodes.clear()"));
        self.emit(format!(
            "{var}_output = {var}_nodes.new('ShaderNodeOutputMaterial')"
        ));
        self.emit(format!(
            "{var}_bsdf = {var}_nodes.new('ShaderNodeBsdfPrincipled')"
        ));
        self.emit(format!(
            "{var}_bsdf.inputs['Base Color'].default_value = {}",
            py_rgba(material.base_color)
        ));
        self.emit(format!(
            "{var}_bsdf.inputs['Roughness'].default_value = {}",
            py_f32(material.roughness)
        ));
        // 'Specular' was renamed 'Specular IOR Level' in Blender 4.0.
        self.emit(format!(
            "{var}_bsdf.inputs['Specular IOR Level' if 'Specular IOR Level' in {var}_bsdf.inputs else 'Specular'].default_value = {}",
            py_f32(material.specular)
        ));
        self.emit(format!("{var}_tex = {var}_nodes.new('ShaderNodeTexImage')"));
        self.emit(format!(
            "{var}_tex.image = bpy.data.images.load({})",
            py_path(&material.texture)
        ));
        self.emit(format!(
            "{var}_tex.image.colorspace_settings.name = 'Non-Color'"
        ));
        self.emit(format!("{var}_tex.extension = {}", py_str(extension)));
        self.emit(format!(
            "{var}_disp = {var}_nodes.new('ShaderNodeDisplacement')"
        ));
        self.emit(format!(
            "{var}_disp.inputs['Scale'].default_value = {}",
            py_f32(material.displacement_scale)
        ));
        self.emit(format!(
            "{var}_disp.inputs['Midlevel'].default_value = {}",
            py_f32(material.midlevel)
        ));
        self.emit(format!(
            "{var}_links.new({var}_bsdf.outputs['BSDF'], {var}_output.inputs['Surface'])"
        ));
        self.emit(format!(
            "{var}_links.new({var}_tex.outputs['Color'], {var}_disp.inputs['Height'])"
        ));
        self.emit(format!(
            "{var}_links.new({var}_disp.outputs['Displacement'], {var}_output.inputs['Displacement'])"
        ));
        self.materials += 1;
        Ok(MaterialHandle::new(self.materials - 1))
    }

    fn assign_material(&mut self, plane: PlaneHandle, material: MaterialHandle) -> Result<()> {
        Self::check("plane", plane.id(), self.planes)?;
        Self::check("material", material.id(), self.materials)?;
        self.emit(format!(
            "plane_{}.data.materials.append(material_{})",
            plane.id(),
            material.id()
        ));
        Ok(())
    }

    fn set_active_camera(&mut self, camera: CameraHandle) -> Result<()> {
        Self::check("camera", camera.id(), self.cameras)?;
        self.emit(format!("scene.camera = camera_{}", camera.id()));
        Ok(())
    }

    fn render_still(&mut self, output: &Path) -> Result<()> {
        self.emit(format!("scene.render.filepath = {}", py_path(output)));
        self.emit("bpy.ops.render.render(write_still=True)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_py_str_escaping() {
        assert_eq!(py_str("plain"), "'plain'");
        assert_eq!(py_str("C:\\dem\\it's.png"), "'C:\\\\dem\\\\it\\'s.png'");
        assert_eq!(py_str("a\nb"), "'a\\nb'");
        assert_eq!(py_str("\u{1}"), "'\\u0001'");
    }

    #[test]
    fn test_py_f32_has_decimal_point() {
        assert_eq!(py_f32(1.0), "1.0");
        assert_eq!(py_f32(0.5), "0.5");
        assert_eq!(py_f32(-2.0), "-2.0");
    }

    #[test]
    fn test_remove_object_indexes_by_name() {
        let mut script = BlenderScript::new();
        script.remove_object("Cube").unwrap();
        assert_eq!(
            script.lines().last().unwrap(),
            "bpy.data.objects.remove(bpy.data.objects['Cube'], do_unlink=True)"
        );
    }

    #[test]
    fn test_unknown_handles() {
        let mut script = BlenderScript::new();
        assert!(matches!(
            script.set_active_camera(CameraHandle::new(0)),
            Err(SceneError::UnknownHandle { kind: "camera", id: 0 })
        ));
        let plane = script.create_plane(&PlaneSpec::for_image(2, 2)).unwrap();
        assert!(matches!(
            script.assign_material(plane, MaterialHandle::new(3)),
            Err(SceneError::UnknownHandle { kind: "material", id: 3 })
        ));
    }
}
