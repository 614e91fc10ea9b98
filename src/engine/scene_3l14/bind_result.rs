use crate::{PayloadType, SceneId};
use std::error::Error;
use std::fmt::{Display, Formatter};

// Which initialize path a bind ended up calling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeKind
{
    /// `initialize_with(payload)` with the payload given at load time
    Payload(PayloadType),
    /// `initialize_with(args)` through the initializer's default initializer
    Default(PayloadType),
    /// the no-argument `initialize()`
    Empty,
}

/// Failures discovered when a scene finishes materializing. These are logged where they are detected
/// and never propagated to the code that requested the load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError
{
    /// No root component of the scene implements [`SceneInitializer`](crate::SceneInitializer)
    NoInitializerFound
    {
        scene: SceneId,
        scene_name: String,
    },
    /// An initializer was found but does not accept the payload's type
    PayloadTypeMismatch
    {
        scene: SceneId,
        scene_name: String,
        initializer: &'static str,
        payload: PayloadType,
        accepted: Vec<PayloadType>,
    },
    /// The initializer's default initializer stores a payload type the initializer does not accept
    DefaultInitializerMismatch
    {
        initializer: &'static str,
        payload: PayloadType,
    },
    /// The initializer panicked while being initialized
    InitializerPanicked
    {
        scene: SceneId,
        scene_name: String,
        message: String,
    },
}
impl Display for BindError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            BindError::NoInitializerFound { scene, scene_name } =>
                f.write_fmt(format_args!("Could not find an initializer in scene \"{scene_name}\" ({scene})")),
            BindError::PayloadTypeMismatch { scene, scene_name, initializer, payload, accepted } =>
                f.write_fmt(format_args!("Initializer {initializer} in scene \"{scene_name}\" ({scene}) does not accept payload {payload} (accepts {accepted:?})")),
            BindError::DefaultInitializerMismatch { initializer, payload } =>
                f.write_fmt(format_args!("Default initializer with payload {payload} is attached to {initializer}, which does not accept it")),
            BindError::InitializerPanicked { scene, scene_name, message } =>
                f.write_fmt(format_args!("Initializer in scene \"{scene_name}\" ({scene}) panicked: {message}")),
        }
    }
}
impl Error for BindError { }

/// The outcome of handling one materialization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindResult
{
    Initialized(InitializeKind),
    /// Nothing was waiting on this scene, it was loaded outside of this crate's load calls
    Orphaned,
    Failed(BindError),
}
impl BindResult
{
    #[inline] #[must_use]
    pub fn is_initialized(&self) -> bool { matches!(self, BindResult::Initialized(_)) }

    #[inline] #[must_use]
    pub fn error(&self) -> Option<&BindError>
    {
        match self
        {
            BindResult::Failed(err) => Some(err),
            _ => None,
        }
    }
}
impl From<Result<InitializeKind, BindError>> for BindResult
{
    fn from(result: Result<InitializeKind, BindError>) -> Self
    {
        match result
        {
            Ok(kind) => BindResult::Initialized(kind),
            Err(err) => BindResult::Failed(err),
        }
    }
}
