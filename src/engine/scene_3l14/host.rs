use crate::{SceneAddress, SceneId, SceneInitializer, SceneLoadError, LoadSceneMode};
use std::fmt::{Display, Formatter};

/// The engine-side scene loader that this crate binds initializers against.
///
/// Loads are asynchronous: `load_scene` only starts materializing a scene. The host must then call
/// [`SceneManager::on_scene_materialized`](crate::SceneManager::on_scene_materialized) exactly once per
/// completed load, in materialization order (including the scene loaded at startup)
pub trait SceneHost: Send + Sync
{
    type LoadHandle;

    fn load_scene(&self, scene: SceneId, mode: LoadSceneMode) -> Self::LoadHandle;

    // index, path, and reference forms of one scene must all resolve to the same id
    fn resolve_scene(&self, address: SceneAddress<'_>) -> Result<SceneId, SceneLoadError>;

    // human readable, for diagnostics only
    fn scene_name(&self, scene: SceneId) -> String;
}

// Identifies a root object inside a loaded scene, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);
impl Display for ObjectId
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { Display::fmt(&self.0, f) }
}

/// Something attached to a root object of a scene
pub trait Component: Send
{
    // query for the initializer capability
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { None }
}

pub type RootComponents<'s> = Box<dyn Iterator<Item = (ObjectId, &'s mut (dyn Component + 'static))> + 's>;

/// A scene whose content has finished loading and can be queried
pub trait LoadedScene
{
    fn id(&self) -> SceneId;
    fn name(&self) -> &str;

    /// All components on the scene's root objects, in the host's root object order
    fn root_components(&mut self) -> RootComponents<'_>;
}
