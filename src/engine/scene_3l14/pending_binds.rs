use crate::{find_initializer, initialize_default, AnyPayload, BindError, BindResult, InitializeKind, LoadedScene, PayloadType, SceneId};
use nab_3l14::app::{contain_panics, panic_message};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::fmt::{Debug, Formatter};

enum BindPayload
{
    Empty,
    Typed
    {
        payload_type: PayloadType,
        value: AnyPayload,
    },
}

// Deferred, single-shot pairing of a future materialization with a payload (or none)
struct BindAction
{
    scene_name: String,
    payload: BindPayload,
}
impl BindAction
{
    fn label(&self) -> &'static str
    {
        match &self.payload
        {
            BindPayload::Empty => "(empty)",
            BindPayload::Typed { payload_type, .. } => payload_type.name(),
        }
    }

    fn run(self, scene: &mut dyn LoadedScene) -> Result<InitializeKind, BindError>
    {
        let scene_id = scene.id();
        let Some(found) = find_initializer(scene) else
        {
            let err = BindError::NoInitializerFound { scene: scene_id, scene_name: self.scene_name };
            log::warn!("{err}, initialization will be skipped");
            return Err(err);
        };

        match self.payload
        {
            BindPayload::Empty =>
            {
                log::info!("Initializer found in scene \"{}\" with ObjectID {}", self.scene_name, found.object_id);
                initialize_default(found.object_id, found.initializer)
            }
            BindPayload::Typed { payload_type, value } =>
            {
                let mismatch = |initializer: &'static str, accepted: Vec<PayloadType>|
                {
                    let err = BindError::PayloadTypeMismatch
                    {
                        scene: scene_id,
                        scene_name: self.scene_name.clone(),
                        initializer,
                        payload: payload_type,
                        accepted,
                    };
                    log::error!("{err}, initialization will be skipped");
                    err
                };

                let initializer = found.initializer;
                if !initializer.accepts_payload(payload_type.id())
                {
                    return Err(mismatch(initializer.initializer_type_name(), initializer.payload_types()));
                }

                log::info!("Initializer found in scene \"{}\" with ObjectID {}, invoking {}::initialize_with({payload_type})",
                    self.scene_name, found.object_id, initializer.initializer_type_name());
                match initializer.initialize_with_any(value)
                {
                    Ok(()) => Ok(InitializeKind::Payload(payload_type)),
                    // accepts_payload() disagreed with the dispatch table
                    Err(_) => Err(mismatch(initializer.initializer_type_name(), initializer.payload_types())),
                }
            }
        }
    }
}
impl Debug for BindAction
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.write_fmt(format_args!("BindAction({} <- {})", self.scene_name, self.label()))
    }
}

/// The load/bind registry: per scene, a FIFO queue of bind actions waiting on a materialization.
///
/// The Nth bind enqueued for a scene is consumed by the Nth materialization of that scene.
/// All queue access is serialized by one lock; bind actions run after the lock is released,
/// so initializers are free to request further loads
#[derive(Default)]
pub struct PendingBinds
{
    queues: Mutex<HashMap<SceneId, VecDeque<BindAction>>>,
}
impl PendingBinds
{
    #[must_use]
    pub fn new() -> Self { Self::default() }

    fn push(&self, scene: SceneId, action: BindAction)
    {
        let mut queues = self.queues.lock();
        queues.entry(scene).or_default().push_back(action);
    }

    pub fn enqueue_typed<T: Any + Send>(&self, scene: SceneId, scene_name: String, payload: T)
    {
        let payload_type = PayloadType::of::<T>();
        log::info!("Loading \"{scene_name}\" ({scene}) with payload {payload_type}");
        self.push(scene, BindAction
        {
            scene_name,
            payload: BindPayload::Typed { payload_type, value: Box::new(payload) },
        });
    }

    pub fn enqueue_empty(&self, scene: SceneId, scene_name: String)
    {
        log::info!("Loading \"{scene_name}\" ({scene}) with an empty payload");
        self.push(scene, BindAction { scene_name, payload: BindPayload::Empty });
    }

    // pop the head action for this scene, dropping the queue once it empties
    fn pop(&self, scene: SceneId) -> Option<BindAction>
    {
        let mut queues = self.queues.lock();
        let queue = queues.get_mut(&scene)?;
        let action = queue.pop_front();
        if queue.is_empty()
        {
            queues.remove(&scene);
        }
        action
    }

    /// Bind the next pending action for a scene that just finished materializing.
    /// Never panics: all failures are logged and reported in the result
    pub fn on_scene_materialized(&self, scene: &mut dyn LoadedScene) -> BindResult
    {
        puffin::profile_function!();

        let scene_id = scene.id();
        let Some(action) = self.pop(scene_id) else
        {
            log::info!("No payload was pending for scene \"{}\" ({scene_id}), it was loaded externally", scene.name());
            return BindResult::Orphaned;
        };

        log::debug!("Binding {action:?}");
        let scene_name = action.scene_name.clone();
        match contain_panics(|| action.run(scene))
        {
            Ok(result) => result.into(),
            Err(panic) =>
            {
                let err = BindError::InitializerPanicked { scene: scene_id, scene_name, message: panic_message(panic.as_ref()) };
                log::error!("{err}");
                BindResult::Failed(err)
            }
        }
    }

    #[must_use]
    pub fn pending_count(&self, scene: SceneId) -> usize
    {
        self.queues.lock().get(&scene).map_or(0, VecDeque::len)
    }

    // scenes with at least one bind waiting, sorted
    #[must_use]
    pub fn pending_scenes(&self) -> Vec<SceneId>
    {
        let mut scenes: Vec<_> = self.queues.lock().keys().copied().collect();
        scenes.sort();
        scenes
    }
}
impl Debug for PendingBinds
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        let queues = self.queues.lock();
        f.debug_map().entries(queues.iter()).finish()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::memory_host::{MemoryScene, SceneObject};
    use crate::test_support::{CallLog, InertComponent, InitCall, PanickingInitializer, PlainInitializer, RecordingInitializer};
    use crate::{DefaultInitializerWith, SceneInitializer};

    fn recording_scene(id: u32, calls: &CallLog) -> MemoryScene
    {
        MemoryScene::new(SceneId(id), "Recording", vec![
            SceneObject::new("Init").with_component(RecordingInitializer::new(calls.clone())),
        ])
    }

    #[test]
    fn typed_payload()
    {
        let binds = PendingBinds::new();
        let calls = CallLog::default();

        binds.enqueue_typed(SceneId(7), "Seven".to_string(), 42i32);
        assert_eq!(1, binds.pending_count(SceneId(7)));

        let result = binds.on_scene_materialized(&mut recording_scene(7, &calls));
        assert_eq!(BindResult::Initialized(InitializeKind::Payload(PayloadType::of::<i32>())), result);
        assert_eq!(vec![InitCall::Int(42)], calls.take());
        assert_eq!(0, binds.pending_count(SceneId(7)));
        assert!(binds.pending_scenes().is_empty());
    }

    #[test]
    fn fifo_per_scene()
    {
        let binds = PendingBinds::new();
        let calls = CallLog::default();

        binds.enqueue_typed(SceneId(3), "Three".to_string(), "a".to_string());
        binds.enqueue_empty(SceneId(3), "Three".to_string());
        binds.enqueue_typed(SceneId(3), "Three".to_string(), 5i32);
        binds.enqueue_typed(SceneId(4), "Four".to_string(), 6i32);
        assert_eq!(vec![SceneId(3), SceneId(4)], binds.pending_scenes());

        for _ in 0..3
        {
            assert!(binds.on_scene_materialized(&mut recording_scene(3, &calls)).is_initialized());
        }
        assert_eq!(vec![InitCall::Text("a".to_string()), InitCall::Empty, InitCall::Int(5)], calls.take());

        // other scenes are untouched
        assert_eq!(vec![SceneId(4)], binds.pending_scenes());
        assert_eq!(1, binds.pending_count(SceneId(4)));
    }

    #[test]
    fn orphaned_materialization()
    {
        let binds = PendingBinds::new();
        let calls = CallLog::default();

        assert_eq!(BindResult::Orphaned, binds.on_scene_materialized(&mut recording_scene(1, &calls)));
        assert!(calls.take().is_empty());

        // a drained queue is also orphaned
        binds.enqueue_empty(SceneId(1), "One".to_string());
        assert!(binds.on_scene_materialized(&mut recording_scene(1, &calls)).is_initialized());
        assert_eq!(BindResult::Orphaned, binds.on_scene_materialized(&mut recording_scene(1, &calls)));
        assert_eq!(vec![InitCall::Empty], calls.take());
    }

    #[test]
    fn no_initializer_drops_action()
    {
        let binds = PendingBinds::new();
        binds.enqueue_typed(SceneId(2), "Two".to_string(), 1i32);

        let mut scene = MemoryScene::new(SceneId(2), "Two", vec![SceneObject::new("Inert").with_component(InertComponent)]);
        assert_eq!(BindResult::Failed(BindError::NoInitializerFound { scene: SceneId(2), scene_name: "Two".to_string() }),
            binds.on_scene_materialized(&mut scene));
        assert_eq!(0, binds.pending_count(SceneId(2)));
    }

    #[test]
    fn payload_type_mismatch()
    {
        let binds = PendingBinds::new();
        let calls = CallLog::default();
        binds.enqueue_typed(SceneId(5), "Five".to_string(), 1.5f32);

        let result = binds.on_scene_materialized(&mut recording_scene(5, &calls));
        match result
        {
            BindResult::Failed(BindError::PayloadTypeMismatch { initializer, payload, accepted, .. }) =>
            {
                assert_eq!("RecordingInitializer", initializer);
                assert_eq!(PayloadType::of::<f32>(), payload);
                assert_eq!(vec![PayloadType::of::<i32>(), PayloadType::of::<String>()], accepted);
            }
            other => panic!("Expected a payload mismatch: {other:?}"),
        }
        assert!(calls.take().is_empty());
    }

    #[test]
    fn empty_payload_uses_default_initializer()
    {
        let binds = PendingBinds::new();
        let calls = CallLog::default();

        let mut init = RecordingInitializer::new(calls.clone());
        DefaultInitializerWith::new(99i32).attach(&mut init);
        let mut scene = MemoryScene::new(SceneId(6), "Six", vec![SceneObject::new("Init").with_component(init)]);

        binds.enqueue_empty(SceneId(6), "Six".to_string());
        assert_eq!(BindResult::Initialized(InitializeKind::Default(PayloadType::of::<i32>())), binds.on_scene_materialized(&mut scene));
        assert_eq!(vec![InitCall::Int(99)], calls.take());
    }

    #[test]
    fn mismatched_default_initializer()
    {
        let binds = PendingBinds::new();
        let calls = CallLog::default();

        let mut init = PlainInitializer::new(calls.clone());
        init.set_default_initializer(Some(std::sync::Arc::new(DefaultInitializerWith::new("text".to_string()))));
        let mut scene = MemoryScene::new(SceneId(6), "Six", vec![SceneObject::new("Init").with_component(init)]);

        binds.enqueue_empty(SceneId(6), "Six".to_string());
        let result = binds.on_scene_materialized(&mut scene);
        assert!(matches!(result.error(), Some(BindError::DefaultInitializerMismatch { .. })));
        assert!(calls.take().is_empty());
    }

    #[test]
    fn panics_are_contained()
    {
        let binds = PendingBinds::new();
        let mut scene = MemoryScene::new(SceneId(8), "Eight", vec![SceneObject::new("Init").with_component(PanickingInitializer)]);

        binds.enqueue_empty(SceneId(8), "Eight".to_string());
        binds.enqueue_empty(SceneId(8), "Eight".to_string());

        match binds.on_scene_materialized(&mut scene)
        {
            BindResult::Failed(BindError::InitializerPanicked { message, .. }) => assert_eq!("initializer exploded", message),
            other => panic!("Expected a contained panic: {other:?}"),
        }
        // the failed action is consumed, the next one is still queued
        assert_eq!(1, binds.pending_count(SceneId(8)));
    }

    #[test]
    fn concurrent_enqueue()
    {
        let binds = std::sync::Arc::new(PendingBinds::new());
        let threads: Vec<_> = (0..4).map(|t|
        {
            let binds = binds.clone();
            std::thread::spawn(move ||
            {
                for i in 0..25
                {
                    binds.enqueue_typed(SceneId(1), "One".to_string(), t * 100 + i);
                }
            })
        }).collect();
        for thread in threads { thread.join().unwrap(); }
        assert_eq!(100, binds.pending_count(SceneId(1)));

        let calls = CallLog::default();
        for _ in 0..100
        {
            assert!(binds.on_scene_materialized(&mut recording_scene(1, &calls)).is_initialized());
        }

        // every payload bound once, each producer's payloads in its own order
        let ints: Vec<i32> = calls.take().into_iter().map(|c| match c { InitCall::Int(i) => i, other => panic!("{other:?}") }).collect();
        assert_eq!(100, ints.len());
        for t in 0..4
        {
            let from_thread: Vec<i32> = ints.iter().copied().filter(|i| i / 100 == t).collect();
            assert_eq!((0..25).map(|i| t * 100 + i).collect::<Vec<_>>(), from_thread);
        }
    }
}
