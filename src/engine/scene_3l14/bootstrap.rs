use crate::{find_initializer, initialize_default, BindError, BindResult, LoadedScene};
use nab_3l14::app::{contain_panics, panic_message};

/// Initialize the scene the process started with, which was materialized by the host's startup path
/// rather than through a load call. Runs the initializer's default initializer if one is attached,
/// otherwise its no-argument `initialize()`. Never touches the pending binds
pub fn initialize_startup_scene(scene: &mut dyn LoadedScene) -> BindResult
{
    let scene_id = scene.id();
    let scene_name = scene.name().to_string();

    let outcome = contain_panics(||
    {
        let Some(found) = find_initializer(scene) else
        {
            let err = BindError::NoInitializerFound { scene: scene_id, scene_name: scene_name.clone() };
            log::warn!("No initializer found for start up scene \"{scene_name}\" ({scene_id})");
            return Err(err);
        };

        log::info!("Initializing start up scene \"{scene_name}\" ({scene_id})");
        initialize_default(found.object_id, found.initializer)
    });

    match outcome
    {
        Ok(result) => result.into(),
        Err(panic) =>
        {
            let err = BindError::InitializerPanicked
            {
                scene: scene_id,
                scene_name,
                message: panic_message(panic.as_ref()),
            };
            log::error!("{err}");
            BindResult::Failed(err)
        }
    }
}
