use clap::Parser;
use nab_3l14::app;
use nab_3l14::app::{AppRun, ExitReason};
use scene_3l14::memory_host::{MemoryHost, SceneFactories, SceneObject};
use scene_3l14::{accepts_payloads, BindResult, Component, DefaultInitializer, DefaultInitializerWith, InitializeWith, LoadSceneMode, LoadedScene, SceneCatalog, SceneId, SceneInitializer, SceneManager, TomlRead, TypedSceneReference};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

const LOAD_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Parser)]
struct CliArgs
{
    /// A scene catalog TOML file, the built-in catalog is used if not specified
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[cfg(debug_assertions)]
    #[arg(long, default_value_t = false)]
    keep_alive_on_panic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct MenuArgs
{
    title: String,
}

#[derive(Debug, Clone)]
struct LevelArgs
{
    level: u32,
    difficulty: f32,
}

// the boot scene takes no payload
#[derive(Default)]
struct BootInitializer
{
    default_initializer: Option<Arc<dyn DefaultInitializer>>,
}
impl SceneInitializer for BootInitializer
{
    accepts_payloads!();

    fn initialize(&mut self) { log::info!("Boot scene ready"); }
    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { self.default_initializer.as_ref() }
    fn set_default_initializer(&mut self, default_initializer: Option<Arc<dyn DefaultInitializer>>) { self.default_initializer = default_initializer; }
}
impl Component for BootInitializer
{
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { Some(self) }
}

#[derive(Default)]
struct MenuInitializer
{
    default_initializer: Option<Arc<dyn DefaultInitializer>>,
}
impl InitializeWith<MenuArgs> for MenuInitializer
{
    fn initialize_with(&mut self, payload: MenuArgs)
    {
        log::info!("Showing menu \"{}\"", payload.title);
    }
}
impl SceneInitializer for MenuInitializer
{
    accepts_payloads!(MenuArgs);

    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { self.default_initializer.as_ref() }
    fn set_default_initializer(&mut self, default_initializer: Option<Arc<dyn DefaultInitializer>>) { self.default_initializer = default_initializer; }
}
impl Component for MenuInitializer
{
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { Some(self) }
}

#[derive(Default)]
struct LevelInitializer
{
    default_initializer: Option<Arc<dyn DefaultInitializer>>,
}
impl InitializeWith<LevelArgs> for LevelInitializer
{
    fn initialize_with(&mut self, payload: LevelArgs)
    {
        log::info!("Starting level {} at difficulty {:.1}", payload.level, payload.difficulty);
    }
}
impl InitializeWith<u32> for LevelInitializer
{
    fn initialize_with(&mut self, payload: u32)
    {
        log::info!("Starting level {payload} at the default difficulty");
    }
}
impl SceneInitializer for LevelInitializer
{
    accepts_payloads!(LevelArgs, u32);

    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { self.default_initializer.as_ref() }
    fn set_default_initializer(&mut self, default_initializer: Option<Arc<dyn DefaultInitializer>>) { self.default_initializer = default_initializer; }
}
impl Component for LevelInitializer
{
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { Some(self) }
}

#[derive(Default)]
struct HudInitializer
{
    default_initializer: Option<Arc<dyn DefaultInitializer>>,
}
impl SceneInitializer for HudInitializer
{
    accepts_payloads!();

    fn initialize(&mut self) { log::info!("HUD ready"); }
    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { self.default_initializer.as_ref() }
    fn set_default_initializer(&mut self, default_initializer: Option<Arc<dyn DefaultInitializer>>) { self.default_initializer = default_initializer; }
}
impl Component for HudInitializer
{
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { Some(self) }
}

struct Camera;
impl Component for Camera { }

fn builtin_catalog() -> SceneCatalog
{
    SceneCatalog::new([
        "Scenes/Boot.scene",
        "Scenes/MainMenu.scene",
        "Scenes/Level.scene",
        "Scenes/Hud.scene",
    ])
}

// scene content is chosen by scene name so that any catalog ordering works
fn demo_factories(catalog: &SceneCatalog) -> SceneFactories
{
    let mut factories = SceneFactories::default();
    for scene in catalog.ids()
    {
        factories = match catalog.name(scene)
        {
            Some("Boot") => factories.add(scene, |_| vec![
                SceneObject::new("Boot").with_component(BootInitializer::default()),
            ]),
            Some("MainMenu") => factories.add(scene, |_|
            {
                let mut menu = MenuInitializer::default();
                DefaultInitializerWith::new(MenuArgs { title: "3L14".to_string() }).attach(&mut menu);
                vec![
                    SceneObject::new("Camera").with_component(Camera),
                    SceneObject::new("Menu").with_component(menu),
                ]
            }),
            Some("Level") => factories.add(scene, |_| vec![
                SceneObject::new("Camera").with_component(Camera),
                SceneObject::new("Level").with_component(LevelInitializer::default()),
            ]),
            Some("Hud") => factories.add(scene, |_| vec![
                SceneObject::new("Hud").with_component(HudInitializer::default()),
            ]),
            _ => factories,
        };
    }
    factories
}

fn main() -> ExitReason
{
    let app_run = AppRun::<CliArgs>::startup("3L14 Scene Demo", env!("CARGO_PKG_VERSION"));
    {
        #[cfg(debug_assertions)]
        let keep_alive = app_run.args.keep_alive_on_panic;
        #[cfg(not(debug_assertions))]
        let keep_alive = false;

        app::set_panic_hook(keep_alive);
    }

    #[cfg(feature = "frame_profiler")]
    puffin::set_scopes_on(true);

    let catalog = match &app_run.args.catalog
    {
        Some(path) => match SceneCatalog::load_file(path)
        {
            Ok(catalog) => catalog,
            Err(err) =>
            {
                log::error!("Failed to load scene catalog {path:?}: {err}");
                app_run.set_exit_reason(ExitReason::Failure);
                return app_run.get_exit_reason();
            }
        },
        None => builtin_catalog(),
    };
    log::debug!("Scene catalog has {} scenes", catalog.len());

    let factories = demo_factories(&catalog);
    let host = Arc::new(MemoryHost::new(catalog, factories));
    let scenes = SceneManager::new(host.clone());

    host.boot(SceneId(0));
    if host.pump_wait(1, LOAD_TIMEOUT, |scene| { scenes.initialize_startup_scene(scene); }) != 1
    {
        app_run.set_exit_reason(ExitReason::Failure);
        return app_run.get_exit_reason();
    }

    let level = TypedSceneReference::<LevelInitializer>::new("Scenes/Level.scene");
    let requests =
    [
        scenes.load_single("Scenes/MainMenu.scene").is_ok(),
        scenes.load_reference_with(&level, LoadSceneMode::Single, LevelArgs { level: 1, difficulty: 0.5 }).is_ok(),
        scenes.load_additive_with("Scenes/Hud.scene", 3u32).is_ok(), // the HUD takes no payload, this bind fails
        scenes.load_additive_with(&level, 2u32).is_ok(),
    ];
    let requested = requests.iter().filter(|ok| **ok).count();

    let mut results = Vec::with_capacity(requested);
    let delivered = host.pump_wait(requested, LOAD_TIMEOUT, |scene: &mut dyn LoadedScene|
    {
        results.push(scenes.on_scene_materialized(scene));
    });

    let initialized = results.iter().filter(|r| r.is_initialized()).count();
    log::info!("Materialized {delivered} of {requested} scenes, {initialized} initialized, active: {:?}", host.active_scenes());
    for err in results.iter().filter_map(BindResult::error)
    {
        log::debug!("Failed bind: {err}");
    }

    if delivered != requested || requests.contains(&false)
    {
        app_run.set_exit_reason(ExitReason::Failure);
    }
    app_run.get_exit_reason()
}
