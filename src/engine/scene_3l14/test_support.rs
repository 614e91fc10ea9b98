// Shared components for the unit tests
use crate::{Component, DefaultInitializer, InitializeWith, SceneInitializer};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitCall
{
    Empty,
    Int(i32),
    Text(String),
}

#[derive(Debug, Default, Clone)]
pub struct CallLog(Arc<Mutex<Vec<InitCall>>>);
impl CallLog
{
    pub fn push(&self, call: InitCall) { self.0.lock().push(call); }
    pub fn take(&self) -> Vec<InitCall> { std::mem::take(&mut *self.0.lock()) }
}

pub struct InertComponent;
impl Component for InertComponent { }

// accepts i32 and String
pub struct RecordingInitializer
{
    calls: CallLog,
    default_initializer: Option<Arc<dyn DefaultInitializer>>,
}
impl RecordingInitializer
{
    pub fn new(calls: CallLog) -> Self { Self { calls, default_initializer: None } }
}
impl InitializeWith<i32> for RecordingInitializer
{
    fn initialize_with(&mut self, payload: i32) { self.calls.push(InitCall::Int(payload)); }
}
impl InitializeWith<String> for RecordingInitializer
{
    fn initialize_with(&mut self, payload: String) { self.calls.push(InitCall::Text(payload)); }
}
impl SceneInitializer for RecordingInitializer
{
    crate::accepts_payloads!(i32, String);

    fn initialize(&mut self) { self.calls.push(InitCall::Empty); }
    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { self.default_initializer.as_ref() }
    fn set_default_initializer(&mut self, default_initializer: Option<Arc<dyn DefaultInitializer>>) { self.default_initializer = default_initializer; }
}
impl Component for RecordingInitializer
{
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { Some(self) }
}

// accepts no payloads
pub struct PlainInitializer
{
    calls: CallLog,
    default_initializer: Option<Arc<dyn DefaultInitializer>>,
}
impl PlainInitializer
{
    pub fn new(calls: CallLog) -> Self { Self { calls, default_initializer: None } }
}
impl SceneInitializer for PlainInitializer
{
    crate::accepts_payloads!();

    fn initialize(&mut self) { self.calls.push(InitCall::Empty); }
    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { self.default_initializer.as_ref() }
    fn set_default_initializer(&mut self, default_initializer: Option<Arc<dyn DefaultInitializer>>) { self.default_initializer = default_initializer; }
}
impl Component for PlainInitializer
{
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { Some(self) }
}

pub struct PanickingInitializer;
impl SceneInitializer for PanickingInitializer
{
    crate::accepts_payloads!();

    fn initialize(&mut self) { panic!("initializer exploded"); }
    fn default_initializer(&self) -> Option<&Arc<dyn DefaultInitializer>> { None }
    fn set_default_initializer(&mut self, _default_initializer: Option<Arc<dyn DefaultInitializer>>) { }
}
impl Component for PanickingInitializer
{
    fn as_scene_initializer(&mut self) -> Option<&mut dyn SceneInitializer> { Some(self) }
}
