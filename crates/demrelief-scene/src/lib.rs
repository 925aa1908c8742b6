//! # demrelief-scene
//!
//! Shaded-relief rendering of DEM images with Blender.
//!
//! [`build_scene`] describes the scene (a displaced plane, an orthographic
//! camera and a sun) as a fixed sequence of [`SceneHost`] calls. Two hosts
//! are provided:
//!
//! - [`SceneDocument`] keeps the scene in memory for inspection.
//! - [`BlenderScript`] turns the calls into a Blender Python program, which
//!   [`BlenderRunner`] executes headless or [`write_render_script`] saves for
//!   an interactive session.
//!
//! ```no_run
//! use demrelief_scene::{BlenderRunner, RenderConfig, RenderJob};
//!
//! let job = RenderJob::prepare("dem.png", "relief.png", RenderConfig::default())?;
//! BlenderRunner::default().render(&job)?;
//! # Ok::<(), demrelief_scene::SceneError>(())
//! ```

mod blender;
mod config;
mod document;
mod error;
pub mod scene;
pub mod script;

pub use blender::{render_script, write_render_script, BlenderRunner, DEFAULT_EXECUTABLE};
pub use config::RenderConfig;
pub use document::{SceneDocument, SceneObject};
pub use error::{Result, SceneError};
pub use scene::{build_scene, RenderJob, SceneHandles, SceneHost, SceneTemplate};
pub use script::BlenderScript;
