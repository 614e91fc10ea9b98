use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::marker::PhantomData;

// A scene's normalized key: its position in the catalog (build list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SceneId(pub u32);
impl Display for SceneId
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { f.write_fmt(format_args!("#{}", self.0)) }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadSceneMode
{
    /// Tear down all loaded scenes before the new one is materialized
    #[default]
    Single,
    /// Materialize alongside the already loaded scenes
    Additive,
}

/// A persisted pointer at a scene, by path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneReference
{
    pub path: String,
}
impl SceneReference
{
    #[inline] #[must_use]
    pub fn new(path: impl Into<String>) -> Self { Self { path: path.into() } }
    #[inline] #[must_use]
    pub fn path(&self) -> &str { &self.path }
}

/// A scene reference that also names the initializer expected inside the scene.
/// Loading through one of these checks at compile time that the initializer accepts the payload
pub struct TypedSceneReference<H>
{
    reference: SceneReference,
    handler: PhantomData<fn() -> H>,
}
impl<H> TypedSceneReference<H>
{
    #[inline] #[must_use]
    pub fn new(path: impl Into<String>) -> Self
    {
        Self { reference: SceneReference::new(path), handler: PhantomData }
    }
    #[inline] #[must_use]
    pub fn untyped(&self) -> &SceneReference { &self.reference }
    #[inline] #[must_use]
    pub fn path(&self) -> &str { self.reference.path() }
}
impl<H> Clone for TypedSceneReference<H>
{
    fn clone(&self) -> Self { Self { reference: self.reference.clone(), handler: PhantomData } }
}
impl<H> Debug for TypedSceneReference<H>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.debug_tuple("TypedSceneReference")
            .field(&self.reference.path)
            .field(&nab_3l14::utils::short_type_name::<H>())
            .finish()
    }
}
// serialized the same as the untyped reference
impl<H> Serialize for TypedSceneReference<H>
{
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error>
    {
        self.reference.serialize(serializer)
    }
}
impl<'de, H> Deserialize<'de> for TypedSceneReference<H>
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error>
    {
        let reference = SceneReference::deserialize(deserializer)?;
        Ok(Self { reference, handler: PhantomData })
    }
}

/// Any of the surface forms a scene can be named by.
/// All of them are normalized to a single [`SceneId`] before use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneAddress<'a>
{
    Index(u32),
    Path(&'a str),
    Reference(&'a SceneReference),
}
impl Display for SceneAddress<'_>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            SceneAddress::Index(index) => f.write_fmt(format_args!("index {index}")),
            SceneAddress::Path(path) => f.write_fmt(format_args!("\"{path}\"")),
            SceneAddress::Reference(reference) => f.write_fmt(format_args!("reference \"{}\"", reference.path)),
        }
    }
}
impl From<SceneId> for SceneAddress<'_>
{
    fn from(id: SceneId) -> Self { Self::Index(id.0) }
}
impl From<u32> for SceneAddress<'_>
{
    fn from(index: u32) -> Self { Self::Index(index) }
}
impl<'a> From<&'a str> for SceneAddress<'a>
{
    fn from(path: &'a str) -> Self { Self::Path(path) }
}
impl<'a> From<&'a String> for SceneAddress<'a>
{
    fn from(path: &'a String) -> Self { Self::Path(path.as_str()) }
}
impl<'a> From<&'a SceneReference> for SceneAddress<'a>
{
    fn from(reference: &'a SceneReference) -> Self { Self::Reference(reference) }
}
impl<'a, H> From<&'a TypedSceneReference<H>> for SceneAddress<'a>
{
    fn from(reference: &'a TypedSceneReference<H>) -> Self { Self::Reference(reference.untyped()) }
}

/// Failures that are known at the time a load is requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneLoadError
{
    UnknownIndex(u32),
    UnknownPath(String),
}
impl Display for SceneLoadError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            SceneLoadError::UnknownIndex(index) => f.write_fmt(format_args!("No scene at index {index}")),
            SceneLoadError::UnknownPath(path) => f.write_fmt(format_args!("No scene with the path \"{path}\"")),
        }
    }
}
impl Error for SceneLoadError { }
