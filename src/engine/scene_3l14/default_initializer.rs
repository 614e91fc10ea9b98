use crate::{BindError, InitializeKind, InitializeWith, ObjectId, PayloadType, SceneInitializer};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;

/// An authored fallback that initializes a scene with a pre-bound payload when the scene is
/// loaded without one (e.g. opened directly rather than through a load call)
pub trait DefaultInitializer: Send + Sync
{
    fn payload_type(&self) -> PayloadType;

    /// Re-dispatch into the initializer's typed capability with the stored payload
    fn initialize(&self, initializer: &mut dyn SceneInitializer) -> Result<(), BindError>;
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultInitializerWith<T>
{
    pub args: T,
}
impl<T: Clone + Send + Sync + 'static> DefaultInitializerWith<T>
{
    #[inline] #[must_use]
    pub fn new(args: T) -> Self { Self { args } }

    // type checked attach, the initializer must accept T
    pub fn attach<H: SceneInitializer + InitializeWith<T>>(self, initializer: &mut H)
    {
        initializer.set_default_initializer(Some(Arc::new(self)));
    }
}
impl<T: Clone + Send + Sync + 'static> DefaultInitializer for DefaultInitializerWith<T>
{
    fn payload_type(&self) -> PayloadType { PayloadType::of::<T>() }

    fn initialize(&self, initializer: &mut dyn SceneInitializer) -> Result<(), BindError>
    {
        let mismatch = |initializer: &dyn SceneInitializer|
        {
            let err = BindError::DefaultInitializerMismatch
            {
                initializer: initializer.initializer_type_name(),
                payload: PayloadType::of::<T>(),
            };
            // this can only come from authoring data that no longer matches the initializer
            log::error!("Assertion failed: {err}");
            err
        };

        if !initializer.accepts_payload(PayloadType::of::<T>().id())
        {
            return Err(mismatch(initializer));
        }

        let payload: Box<dyn Any + Send> = Box::new(self.args.clone());
        match initializer.initialize_with_any(payload)
        {
            Ok(()) => Ok(()),
            Err(_) => Err(mismatch(initializer)),
        }
    }
}

/// Initialize without a runtime payload: through the default initializer if one is attached,
/// otherwise with the no-argument `initialize()`
pub fn initialize_default(object_id: ObjectId, initializer: &mut dyn SceneInitializer) -> Result<InitializeKind, BindError>
{
    match initializer.default_initializer().cloned()
    {
        Some(default_initializer) =>
        {
            let payload_type = default_initializer.payload_type();
            log::info!("Invoking default initializer on ObjectID {object_id} as {}::initialize_with({payload_type})",
                initializer.initializer_type_name());
            default_initializer.initialize(initializer)?;
            Ok(InitializeKind::Default(payload_type))
        }
        None =>
        {
            log::info!("Invoking initializer on ObjectID {object_id} as {}::initialize()",
                initializer.initializer_type_name());
            initializer.initialize();
            Ok(InitializeKind::Empty)
        }
    }
}
