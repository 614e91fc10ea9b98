use crate::{initialize_startup_scene, BindResult, InitializeWith, LoadSceneMode, LoadedScene, PendingBinds, SceneAddress, SceneHost, SceneId, SceneLoadError, TypedSceneReference};
use parking_lot::ReentrantMutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Loads scenes through the host and delivers a payload to the initializer inside each scene once it
/// has materialized. Create one per process, and route every host materialization notification to
/// [`SceneManager::on_scene_materialized`]
pub struct SceneManager<H: SceneHost>
{
    host: Arc<H>,
    pending: PendingBinds,
    // held across queueing a bind and starting its load, so the host sees loads in queue order.
    // reentrant: initializers may load scenes, and hosts may materialize inside load_scene
    load_lock: ReentrantMutex<()>,
    startup_initialized: AtomicBool,
}
impl<H: SceneHost> SceneManager<H>
{
    #[must_use]
    pub fn new(host: Arc<H>) -> Self
    {
        Self
        {
            host,
            pending: PendingBinds::new(),
            load_lock: ReentrantMutex::new(()),
            startup_initialized: AtomicBool::new(false),
        }
    }

    #[inline] #[must_use]
    pub fn host(&self) -> &Arc<H> { &self.host }
    #[inline] #[must_use]
    pub fn pending(&self) -> &PendingBinds { &self.pending }

    /// Bind a payload to the next materialization of a scene. Only for scenes loaded through the host
    /// directly; call at most once per outstanding load of the scene (extra calls cannot be detected)
    pub fn enqueue_typed_load<'a, T: Any + Send>(&self, address: impl Into<SceneAddress<'a>>, payload: T) -> Result<SceneId, SceneLoadError>
    {
        let scene = self.resolve(address.into())?;
        self.pending.enqueue_typed(scene, self.host.scene_name(scene), payload);
        Ok(scene)
    }

    /// Like [`Self::enqueue_typed_load`], for a load that should initialize without a payload
    pub fn enqueue_empty_load<'a>(&self, address: impl Into<SceneAddress<'a>>) -> Result<SceneId, SceneLoadError>
    {
        let scene = self.resolve(address.into())?;
        self.pending.enqueue_empty(scene, self.host.scene_name(scene));
        Ok(scene)
    }

    fn resolve(&self, address: SceneAddress<'_>) -> Result<SceneId, SceneLoadError>
    {
        self.host.resolve_scene(address).inspect_err(|err|
        {
            log::error!("Cannot load {address}: {err}");
        })
    }

    // binds are queued before the host starts loading, in case it materializes synchronously

    pub fn load_with<'a, T: Any + Send>(&self, address: impl Into<SceneAddress<'a>>, mode: LoadSceneMode, payload: T) -> Result<H::LoadHandle, SceneLoadError>
    {
        let _load_lock = self.load_lock.lock();
        let scene = self.enqueue_typed_load(address, payload)?;
        Ok(self.host.load_scene(scene, mode))
    }

    pub fn load<'a>(&self, address: impl Into<SceneAddress<'a>>, mode: LoadSceneMode) -> Result<H::LoadHandle, SceneLoadError>
    {
        let _load_lock = self.load_lock.lock();
        let scene = self.enqueue_empty_load(address)?;
        Ok(self.host.load_scene(scene, mode))
    }

    #[inline]
    pub fn load_single<'a>(&self, address: impl Into<SceneAddress<'a>>) -> Result<H::LoadHandle, SceneLoadError>
    {
        self.load(address, LoadSceneMode::Single)
    }
    #[inline]
    pub fn load_single_with<'a, T: Any + Send>(&self, address: impl Into<SceneAddress<'a>>, payload: T) -> Result<H::LoadHandle, SceneLoadError>
    {
        self.load_with(address, LoadSceneMode::Single, payload)
    }
    #[inline]
    pub fn load_additive<'a>(&self, address: impl Into<SceneAddress<'a>>) -> Result<H::LoadHandle, SceneLoadError>
    {
        self.load(address, LoadSceneMode::Additive)
    }
    #[inline]
    pub fn load_additive_with<'a, T: Any + Send>(&self, address: impl Into<SceneAddress<'a>>, payload: T) -> Result<H::LoadHandle, SceneLoadError>
    {
        self.load_with(address, LoadSceneMode::Additive, payload)
    }

    // the reference's initializer type is checked against the payload at compile time
    pub fn load_reference_with<I: InitializeWith<T>, T: Any + Send>(
        &self,
        reference: &TypedSceneReference<I>,
        mode: LoadSceneMode,
        payload: T) -> Result<H::LoadHandle, SceneLoadError>
    {
        self.load_with(reference, mode, payload)
    }

    /// Call once per completed materialization, in materialization order
    pub fn on_scene_materialized(&self, scene: &mut dyn LoadedScene) -> BindResult
    {
        self.pending.on_scene_materialized(scene)
    }

    /// Initialize the scene the process started with. Only the first call does anything, later calls
    /// log a warning and return `None`
    pub fn initialize_startup_scene(&self, scene: &mut dyn LoadedScene) -> Option<BindResult>
    {
        if self.startup_initialized.swap(true, Ordering::AcqRel)
        {
            log::warn!("Start up scene was already initialized, ignoring \"{}\" ({})", scene.name(), scene.id());
            return None;
        }
        Some(initialize_startup_scene(scene))
    }
}
