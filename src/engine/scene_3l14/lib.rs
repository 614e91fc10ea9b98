mod scene_id;
pub use scene_id::*;

mod scene_catalog;
pub use scene_catalog::*;

mod host;
pub use host::*;

mod initializer;
pub use initializer::*;

mod default_initializer;
pub use default_initializer::*;

mod locator;
pub use locator::*;

mod bind_result;
pub use bind_result::*;

mod pending_binds;
pub use pending_binds::*;

mod bootstrap;
pub use bootstrap::*;

mod scene_manager;
pub use scene_manager::*;

pub mod memory_host;

#[cfg(test)]
mod test_support;
