use crate::{AnyPayload, LoadedScene, ObjectId, PayloadType, SceneInitializer};
use std::any::Any;
use std::marker::PhantomData;

pub struct FoundInitializer<'s>
{
    pub object_id: ObjectId,
    pub initializer: &'s mut dyn SceneInitializer,
}

/// Find the scene's initializer: the first root component, in the scene's root object order,
/// that has the initializer capability. Additional initializers in the same scene are ignored
pub fn find_initializer<'s>(scene: &'s mut dyn LoadedScene) -> Option<FoundInitializer<'s>>
{
    scene.root_components().find_map(|(object_id, component)|
    {
        component.as_scene_initializer().map(|initializer| FoundInitializer { object_id, initializer })
    })
}

pub enum InitializerMatch<'s, T>
{
    Found(TypedInitializer<'s, T>),
    NotFound,
    /// the scene has an initializer, but it does not accept `T`
    WrongType
    {
        object_id: ObjectId,
        initializer: &'static str,
        accepted: Vec<PayloadType>,
    },
}
impl<'s, T> InitializerMatch<'s, T>
{
    #[inline] #[must_use]
    pub fn found(self) -> Option<TypedInitializer<'s, T>>
    {
        match self
        {
            InitializerMatch::Found(typed) => Some(typed),
            _ => None,
        }
    }
}

// An initializer that has been checked to accept `T`
pub struct TypedInitializer<'s, T>
{
    object_id: ObjectId,
    initializer: &'s mut dyn SceneInitializer,
    payload: PhantomData<fn(T)>,
}
impl<'s, T: Any + Send> TypedInitializer<'s, T>
{
    #[inline] #[must_use]
    pub fn object_id(&self) -> ObjectId { self.object_id }

    #[inline] #[must_use]
    pub fn initializer_type_name(&self) -> &'static str { self.initializer.initializer_type_name() }

    pub fn initialize(self, payload: T) -> Result<(), AnyPayload>
    {
        self.initializer.initialize_with_any(Box::new(payload))
    }
}

/// Find the scene's initializer and check that it accepts payloads of type `T`
pub fn find_initializer_for<'s, T: Any + Send>(scene: &'s mut dyn LoadedScene) -> InitializerMatch<'s, T>
{
    let Some(found) = find_initializer(scene) else { return InitializerMatch::NotFound; };

    match found.initializer.accepts_payload(PayloadType::of::<T>().id())
    {
        true => InitializerMatch::Found(TypedInitializer
        {
            object_id: found.object_id,
            initializer: found.initializer,
            payload: PhantomData,
        }),
        false => InitializerMatch::WrongType
        {
            object_id: found.object_id,
            initializer: found.initializer.initializer_type_name(),
            accepted: found.initializer.payload_types(),
        },
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::memory_host::{MemoryScene, SceneObject};
    use crate::test_support::{CallLog, InitCall, InertComponent, PlainInitializer, RecordingInitializer};
    use crate::SceneId;

    #[test]
    fn no_initializer()
    {
        let mut scene = MemoryScene::new(SceneId(0), "Empty", vec![
            SceneObject::new("Camera").with_component(InertComponent),
            SceneObject::new("Light"),
        ]);
        assert!(find_initializer(&mut scene).is_none());
        assert!(matches!(find_initializer_for::<i32>(&mut scene), InitializerMatch::NotFound));
    }

    #[test]
    fn first_found_wins()
    {
        let first_calls = CallLog::default();
        let second_calls = CallLog::default();
        let first = SceneObject::new("First")
            .with_component(InertComponent)
            .with_component(PlainInitializer::new(first_calls.clone()));
        let first_id = first.id();
        let mut scene = MemoryScene::new(SceneId(0), "Two", vec![
            SceneObject::new("Inert").with_component(InertComponent),
            first,
            SceneObject::new("Second").with_component(RecordingInitializer::new(second_calls.clone())),
        ]);

        let found = find_initializer(&mut scene).unwrap();
        assert_eq!(first_id, found.object_id);
        assert_eq!("PlainInitializer", found.initializer.initializer_type_name());
        found.initializer.initialize();

        assert_eq!(vec![InitCall::Empty], first_calls.take());
        assert!(second_calls.take().is_empty());
    }

    #[test]
    fn typed_match()
    {
        let calls = CallLog::default();
        let mut scene = MemoryScene::new(SceneId(0), "Level", vec![
            SceneObject::new("Init").with_component(RecordingInitializer::new(calls.clone())),
        ]);

        match find_initializer_for::<u64>(&mut scene)
        {
            InitializerMatch::WrongType { initializer, accepted, .. } =>
            {
                assert_eq!("RecordingInitializer", initializer);
                assert_eq!(vec![PayloadType::of::<i32>(), PayloadType::of::<String>()], accepted);
            }
            _ => panic!("Expected a wrong type match"),
        }

        let typed = find_initializer_for::<i32>(&mut scene).found().unwrap();
        assert!(typed.initialize(42).is_ok());
        assert_eq!(vec![InitCall::Int(42)], calls.take());
    }
}
