//! An in-memory [`SceneHost`]. Scene content comes from registered factories, which run on a loader
//! worker thread; finished scenes are handed back over a channel and delivered by [`MemoryHost::pump`]
//! on the caller's thread, in materialization order

use crate::{Component, LoadSceneMode, LoadedScene, ObjectId, RootComponents, SceneAddress, SceneCatalog, SceneHost, SceneId, SceneLoadError};
use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use nab_3l14::app::contain_panics;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{Builder, JoinHandle};
use std::time::{Duration, Instant};

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

pub struct SceneObject
{
    id: ObjectId,
    name: String,
    components: Vec<Box<dyn Component>>,
}
impl SceneObject
{
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self
    {
        Self
        {
            id: ObjectId(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            components: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_component(mut self, component: impl Component + 'static) -> Self
    {
        self.components.push(Box::new(component));
        self
    }

    #[inline] #[must_use]
    pub fn id(&self) -> ObjectId { self.id }
    #[inline] #[must_use]
    pub fn name(&self) -> &str { &self.name }
}
impl Debug for SceneObject
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_fmt(format_args!("{} (ObjectID {}, {} components)", self.name, self.id, self.components.len()))
    }
}

#[derive(Debug)]
pub struct MemoryScene
{
    id: SceneId,
    name: String,
    roots: Vec<SceneObject>,
}
impl MemoryScene
{
    #[must_use]
    pub fn new(id: SceneId, name: impl Into<String>, roots: Vec<SceneObject>) -> Self
    {
        Self { id, name: name.into(), roots }
    }

    #[inline] #[must_use]
    pub fn roots(&self) -> &[SceneObject] { &self.roots }
}
impl LoadedScene for MemoryScene
{
    fn id(&self) -> SceneId { self.id }
    fn name(&self) -> &str { &self.name }

    fn root_components(&mut self) -> RootComponents<'_>
    {
        Box::new(self.roots.iter_mut().flat_map(|object|
        {
            let id = object.id;
            object.components.iter_mut().map(move |component| (id, component.as_mut()))
        }))
    }
}

pub type SceneFactory = Box<dyn Fn(SceneId) -> Vec<SceneObject> + Send + Sync>;

// Builds the root objects of each scene, scenes without a factory materialize empty
#[derive(Default)]
pub struct SceneFactories
{
    factories: HashMap<SceneId, SceneFactory>,
}
impl SceneFactories
{
    #[must_use]
    pub fn add(mut self, scene: SceneId, factory: impl Fn(SceneId) -> Vec<SceneObject> + Send + Sync + 'static) -> Self
    {
        if self.factories.insert(scene, Box::new(factory)).is_some()
        {
            log::warn!("Replaced the factory for scene {scene}");
        }
        self
    }
}

/// Tracks one load request
#[derive(Debug, Clone)]
pub struct SceneLoadHandle
{
    scene: SceneId,
    mode: LoadSceneMode,
    materialized: Arc<AtomicBool>,
}
impl SceneLoadHandle
{
    #[inline] #[must_use]
    pub fn scene(&self) -> SceneId { self.scene }
    #[inline] #[must_use]
    pub fn mode(&self) -> LoadSceneMode { self.mode }
    // true once the scene was delivered by a pump
    #[inline] #[must_use]
    pub fn is_materialized(&self) -> bool { self.materialized.load(Ordering::Acquire) }
}

enum HostRequest
{
    Stop,
    Load(SceneLoadHandle),
}

struct Materialized
{
    scene: MemoryScene,
    handle: SceneLoadHandle,
}

pub struct MemoryHost
{
    catalog: Arc<SceneCatalog>,
    request_send: Sender<HostRequest>,
    materialized_recv: Receiver<Materialized>,
    active: Mutex<Vec<MemoryScene>>,
    worker_thread: Option<JoinHandle<()>>,
}
impl MemoryHost
{
    #[must_use]
    pub fn new(catalog: SceneCatalog, factories: SceneFactories) -> Self
    {
        let catalog = Arc::new(catalog);
        let (request_send, request_recv) = unbounded::<HostRequest>();
        let (materialized_send, materialized_recv) = unbounded::<Materialized>();

        let worker_thread = Builder::new()
            .name("Scene loader thread".to_string())
            .spawn(Self::loader_worker_fn(catalog.clone(), factories, request_recv, materialized_send))
            .expect("Failed to create scene loader thread");

        Self
        {
            catalog,
            request_send,
            materialized_recv,
            active: Mutex::new(Vec::new()),
            worker_thread: Some(worker_thread),
        }
    }

    fn loader_worker_fn(
        catalog: Arc<SceneCatalog>,
        factories: SceneFactories,
        request_recv: Receiver<HostRequest>,
        materialized_send: Sender<Materialized>) -> impl FnOnce()
    {
        move ||
        {
            log::debug!("Starting scene loader thread");
            'worker: loop
            {
                match request_recv.recv()
                {
                    Ok(HostRequest::Stop) =>
                    {
                        log::debug!("Shutting down scene loader thread");
                        break 'worker;
                    }
                    Ok(HostRequest::Load(handle)) =>
                    {
                        puffin::profile_scope!("Materialize scene");

                        let scene = handle.scene;
                        let name = catalog.name(scene).unwrap_or("(unknown)").to_string();
                        let roots = match factories.factories.get(&scene)
                        {
                            None =>
                            {
                                log::debug!("No factory for scene \"{name}\" ({scene}), materializing it empty");
                                Vec::new()
                            }
                            Some(factory) => match contain_panics(|| factory(scene))
                            {
                                Ok(roots) => roots,
                                Err(_) =>
                                {
                                    log::error!("Factory for scene \"{name}\" ({scene}) panicked, materializing it empty");
                                    Vec::new()
                                }
                            },
                        };

                        let materialized = Materialized { scene: MemoryScene::new(scene, name, roots), handle };
                        if materialized_send.send(materialized).is_err()
                        {
                            log::error!("Terminating scene loader thread, the host is gone");
                            break 'worker;
                        }
                    }
                    Err(err) =>
                    {
                        log::error!("Terminating scene loader thread due to {err}");
                        break 'worker;
                    }
                }
            }
        }
    }

    #[inline] #[must_use]
    pub fn catalog(&self) -> &SceneCatalog { &self.catalog }

    /// Request the scene the process starts with. It is delivered by `pump` like any other load
    pub fn boot(&self, scene: SceneId) -> SceneLoadHandle
    {
        log::info!("Booting into scene \"{}\" ({scene})", self.scene_name(scene));
        self.load_scene(scene, LoadSceneMode::Single)
    }

    fn complete(&self, materialized: Materialized, on_materialized: &mut impl FnMut(&mut dyn LoadedScene))
    {
        let Materialized { mut scene, handle } = materialized;

        if handle.mode == LoadSceneMode::Single
        {
            // tear down the previous scenes (and their initializers) first
            let previous = std::mem::take(&mut *self.active.lock());
            drop(previous);
        }

        on_materialized(&mut scene);
        handle.materialized.store(true, Ordering::Release);
        self.active.lock().push(scene);
    }

    /// Deliver every scene that has finished materializing, without waiting. Returns the number delivered
    pub fn pump(&self, mut on_materialized: impl FnMut(&mut dyn LoadedScene)) -> usize
    {
        let mut delivered = 0;
        while let Ok(materialized) = self.materialized_recv.try_recv()
        {
            self.complete(materialized, &mut on_materialized);
            delivered += 1;
        }
        delivered
    }

    /// Deliver up to `count` scenes, waiting at most `timeout` overall. Returns the number delivered
    pub fn pump_wait(&self, count: usize, timeout: Duration, mut on_materialized: impl FnMut(&mut dyn LoadedScene)) -> usize
    {
        let deadline = Instant::now() + timeout;
        let mut delivered = 0;
        while delivered < count
        {
            match self.materialized_recv.recv_deadline(deadline)
            {
                Ok(materialized) =>
                {
                    self.complete(materialized, &mut on_materialized);
                    delivered += 1;
                }
                Err(RecvTimeoutError::Timeout) =>
                {
                    log::warn!("Timed out waiting for scenes, {delivered} of {count} materialized");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) =>
                {
                    log::error!("Scene loader thread has stopped");
                    break;
                }
            }
        }
        delivered
    }

    /// Run `f` on the most recently materialized active instance of a scene.
    /// `f` must not call back into this host's unload
    pub fn with_active_scene<R>(&self, scene: SceneId, f: impl FnOnce(&mut dyn LoadedScene) -> R) -> Option<R>
    {
        let mut active = self.active.lock();
        active.iter_mut().rev().find(|s| s.id == scene).map(|s| f(s))
    }

    #[must_use]
    pub fn active_scenes(&self) -> Vec<SceneId>
    {
        self.active.lock().iter().map(|s| s.id).collect()
    }

    /// Drop every active instance of a scene, returns false if it was not loaded
    pub fn unload(&self, scene: SceneId) -> bool
    {
        let mut active = self.active.lock();
        let before = active.len();
        active.retain(|s| s.id != scene);
        before != active.len()
    }

    // stop accepting loads, anything already requested is never delivered
    pub fn shutdown(&self)
    {
        let _ = self.request_send.send(HostRequest::Stop); // will error if already stopped
    }
}
impl SceneHost for MemoryHost
{
    type LoadHandle = SceneLoadHandle;

    fn load_scene(&self, scene: SceneId, mode: LoadSceneMode) -> SceneLoadHandle
    {
        let handle = SceneLoadHandle { scene, mode, materialized: Arc::new(AtomicBool::new(false)) };
        if self.request_send.send(HostRequest::Load(handle.clone())).is_err()
        {
            log::error!("Cannot load scene {scene}, the scene loader has shut down");
        }
        handle
    }

    fn resolve_scene(&self, address: SceneAddress<'_>) -> Result<SceneId, SceneLoadError>
    {
        self.catalog.resolve(address)
    }

    fn scene_name(&self, scene: SceneId) -> String
    {
        self.catalog.name(scene).unwrap_or("(unknown)").to_string()
    }
}
impl Drop for MemoryHost
{
    fn drop(&mut self)
    {
        self.shutdown();
        if let Some(thread) = self.worker_thread.take()
        {
            if thread.join().is_err()
            {
                log::error!("Scene loader thread panicked");
            }
        }
    }
}
