use crate::DefaultInitializer;
use nab_3l14::utils::short_type_name;
use std::any::{Any, TypeId};
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// A payload with its type erased, as stored between the load request and materialization
pub type AnyPayload = Box<dyn Any + Send>;

// A payload's runtime type tag, and its name for diagnostics
#[derive(Clone, Copy)]
pub struct PayloadType
{
    id: TypeId,
    name: &'static str,
}
impl PayloadType
{
    #[inline] #[must_use]
    pub fn of<T: Any>() -> Self
    {
        Self { id: TypeId::of::<T>(), name: short_type_name::<T>() }
    }

    #[inline] #[must_use]
    pub fn id(&self) -> TypeId { self.id }
    #[inline] #[must_use]
    pub fn name(&self) -> &'static str { self.name }
}
impl PartialEq for PayloadType
{
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}
impl Eq for PayloadType { }
impl Debug for PayloadType
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.name) }
}
impl Display for PayloadType
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_str(self.name) }
}

/// Accepts a payload of type `T` when the owning scene is initialized
pub trait InitializeWith<T>
{
    fn initialize_with(&mut self, payload: T);
}

/// The component inside a scene that receives the scene's initialization payload.
///
/// Implementors also implement [`InitializeWith<T>`] for every payload type they accept, and list those
/// types with [`accepts_payloads!`](crate::accepts_payloads) which generates the runtime dispatch:
///
/// ```ignore
/// impl SceneInitializer for LevelInitializer
/// {
///     accepts_payloads!(LevelArgs, u32);
///     fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { self.default_initializer.as_ref() }
///     fn set_default_initializer(&mut self, init: Option<Arc<dyn DefaultInitializer>>) { self.default_initializer = init; }
/// }
/// ```
pub trait SceneInitializer
{
    // called when the scene was loaded without a payload and there is no default initializer
    fn initialize(&mut self) { }

    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>>;
    fn set_default_initializer(&mut self, default_initializer: Option<Arc<dyn DefaultInitializer>>);

    fn accepts_payload(&self, payload_type: TypeId) -> bool;
    fn payload_types(&self) -> Vec<PayloadType>;

    /// Initialize with a type-erased payload, returning it untouched if its type is not accepted
    fn initialize_with_any(&mut self, payload: AnyPayload) -> Result<(), AnyPayload>;

    fn initializer_type_name(&self) -> &'static str { short_type_name::<Self>() }
}

/// Implements the payload capability methods of [`SceneInitializer`] for a list of payload types.
/// Use inside the `impl SceneInitializer` block. The implementing type must implement
/// [`InitializeWith`] for each listed type
#[macro_export]
macro_rules! accepts_payloads
{
    ($($payload:ty),* $(,)?) =>
    {
        #[allow(unused_variables)]
        fn accepts_payload(&self, payload_type: ::std::any::TypeId) -> bool
        {
            false $(|| payload_type == ::std::any::TypeId::of::<$payload>())*
        }

        fn payload_types(&self) -> ::std::vec::Vec<$crate::PayloadType>
        {
            ::std::vec![$($crate::PayloadType::of::<$payload>()),*]
        }

        #[allow(unused_mut)]
        fn initialize_with_any(&mut self, mut payload: $crate::AnyPayload) -> ::std::result::Result<(), $crate::AnyPayload>
        {
            $(
                payload = match payload.downcast::<$payload>()
                {
                    Ok(typed) =>
                    {
                        <Self as $crate::InitializeWith<$payload>>::initialize_with(self, *typed);
                        return Ok(());
                    }
                    Err(untyped) => untyped,
                };
            )*
            Err(payload)
        }
    };
}
