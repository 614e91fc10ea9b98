use crate::{SceneAddress, SceneId, SceneLoadError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::Path;
use unicase::UniCase;

pub trait TomlRead: DeserializeOwned
{
    fn load(reader: &mut impl Read) -> Result<Self, Box<dyn std::error::Error>>
    {
        let mut buf = String::new();
        reader.read_to_string(&mut buf)?;
        Ok(toml::from_str(&buf)?)
    }

    fn load_file(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>>
    {
        let mut file = std::fs::File::open(path)?;
        Self::load(&mut file)
    }
}
pub trait TomlWrite: Serialize
{
    fn save(&self, prettify: bool, writer: &mut impl Write) -> Result<(), Box<dyn std::error::Error>>
    {
        let toml = match prettify
        {
            true => toml::ser::to_string_pretty(self)?,
            false => toml::ser::to_string(self)?,
        };
        writer.write_all(toml.as_bytes())?;
        Ok(())
    }
}

// on-disk form, the lookup table is rebuilt on load
#[derive(Serialize, Deserialize)]
struct SceneCatalogToml
{
    scenes: Vec<String>,
}

// path keys ignore case, separator style, and a leading "./"
fn path_key(path: &str) -> UniCase<String>
{
    let path = path.trim();
    let path = path.strip_prefix("./").or_else(|| path.strip_prefix(".\\")).unwrap_or(path);
    UniCase::new(path.replace('\\', "/"))
}

/// The ordered list of loadable scenes (the build list).
/// A scene's index in the list is its [`SceneId`]
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "SceneCatalogToml", into = "SceneCatalogToml")]
pub struct SceneCatalog
{
    scenes: Vec<String>,
    by_path: HashMap<UniCase<String>, SceneId>,
}
impl SceneCatalog
{
    #[must_use]
    pub fn new<S: Into<String>>(scene_paths: impl IntoIterator<Item = S>) -> Self
    {
        let mut catalog = Self::default();
        for path in scene_paths
        {
            catalog.push(path.into());
        }
        catalog
    }

    pub fn push(&mut self, path: String) -> SceneId
    {
        let id = SceneId(self.scenes.len() as u32);
        // first entry wins, later duplicates are only reachable by index
        let key = path_key(&path);
        if self.by_path.contains_key(&key)
        {
            log::warn!("Scene path \"{path}\" is listed more than once in the catalog, {id} will only be reachable by index");
        }
        else
        {
            self.by_path.insert(key, id);
        }
        self.scenes.push(path);
        id
    }

    #[inline] #[must_use]
    pub fn len(&self) -> usize { self.scenes.len() }
    #[inline] #[must_use]
    pub fn is_empty(&self) -> bool { self.scenes.is_empty() }

    pub fn ids(&self) -> impl Iterator<Item = SceneId> + '_
    {
        (0..self.scenes.len() as u32).map(SceneId)
    }

    #[must_use]
    pub fn path(&self, scene: SceneId) -> Option<&str>
    {
        self.scenes.get(scene.0 as usize).map(String::as_str)
    }

    // the file name of the scene, without its extension
    #[must_use]
    pub fn name(&self, scene: SceneId) -> Option<&str>
    {
        let path = self.path(scene)?;
        let normalized = path.rsplit(['/', '\\']).next().unwrap_or(path);
        Some(Path::new(normalized).file_stem().and_then(|s| s.to_str()).unwrap_or(normalized))
    }

    #[must_use]
    pub fn id_by_path(&self, path: &str) -> Option<SceneId>
    {
        self.by_path.get(&path_key(path)).copied()
    }

    /// Normalize any scene address to its id
    pub fn resolve(&self, address: SceneAddress<'_>) -> Result<SceneId, SceneLoadError>
    {
        match address
        {
            SceneAddress::Index(index) =>
            {
                match (index as usize) < self.scenes.len()
                {
                    true => Ok(SceneId(index)),
                    false => Err(SceneLoadError::UnknownIndex(index)),
                }
            }
            SceneAddress::Path(path) =>
                self.id_by_path(path).ok_or_else(|| SceneLoadError::UnknownPath(path.to_string())),
            SceneAddress::Reference(reference) =>
                self.id_by_path(&reference.path).ok_or_else(|| SceneLoadError::UnknownPath(reference.path.clone())),
        }
    }
}
impl From<SceneCatalogToml> for SceneCatalog
{
    fn from(toml: SceneCatalogToml) -> Self { Self::new(toml.scenes) }
}
impl From<SceneCatalog> for SceneCatalogToml
{
    fn from(catalog: SceneCatalog) -> Self { Self { scenes: catalog.scenes } }
}
impl TomlRead for SceneCatalog { }
impl TomlWrite for SceneCatalog { }

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::SceneReference;
    use std::io::Cursor;

    fn test_catalog() -> SceneCatalog
    {
        SceneCatalog::new(["Assets/Scenes/Boot.scene", "Assets/Scenes/Menu.scene", "Assets/Scenes/Level 1.scene"])
    }

    #[test]
    fn surface_forms_normalize_to_one_id()
    {
        let catalog = test_catalog();
        let reference = SceneReference::new("Assets/Scenes/Menu.scene");

        assert_eq!(Ok(SceneId(1)), catalog.resolve(SceneAddress::Index(1)));
        assert_eq!(Ok(SceneId(1)), catalog.resolve(SceneAddress::Path("Assets/Scenes/Menu.scene")));
        assert_eq!(Ok(SceneId(1)), catalog.resolve(SceneAddress::Reference(&reference)));
    }

    #[test]
    fn path_spellings()
    {
        let catalog = test_catalog();
        assert_eq!(Some(SceneId(1)), catalog.id_by_path("assets/scenes/MENU.scene"));
        assert_eq!(Some(SceneId(1)), catalog.id_by_path("Assets\\Scenes\\Menu.scene"));
        assert_eq!(Some(SceneId(1)), catalog.id_by_path("./Assets/Scenes/Menu.scene"));
        assert_eq!(None, catalog.id_by_path("Assets/Scenes/Menu"));
    }

    #[test]
    fn unknown_addresses()
    {
        let catalog = test_catalog();
        assert_eq!(Err(SceneLoadError::UnknownIndex(3)), catalog.resolve(SceneAddress::Index(3)));
        assert_eq!(Err(SceneLoadError::UnknownPath("Nope.scene".to_string())), catalog.resolve(SceneAddress::Path("Nope.scene")));
    }

    #[test]
    fn names()
    {
        let catalog = test_catalog();
        assert_eq!(Some("Boot"), catalog.name(SceneId(0)));
        assert_eq!(Some("Level 1"), catalog.name(SceneId(2)));
        assert_eq!(None, catalog.name(SceneId(3)));

        let windows = SceneCatalog::new(["Assets\\Scenes\\Hud.scene"]);
        assert_eq!(Some("Hud"), windows.name(SceneId(0)));
    }

    #[test]
    fn duplicates_resolve_to_first()
    {
        let catalog = SceneCatalog::new(["A.scene", "B.scene", "a.scene"]);
        assert_eq!(3, catalog.len());
        assert_eq!(Some(SceneId(0)), catalog.id_by_path("A.scene"));
        assert_eq!(Some("a.scene"), catalog.path(SceneId(2)));
    }

    #[test]
    fn load_from_toml()
    {
        let mut input = Cursor::new("scenes = [\"Boot.scene\", \"Menu.scene\"]\n");
        let catalog = SceneCatalog::load(&mut input).unwrap();
        assert_eq!(2, catalog.len());
        assert_eq!(Some(SceneId(1)), catalog.id_by_path("menu.scene"));

        let mut out = Vec::new();
        catalog.save(true, &mut out).unwrap();
        let reloaded = SceneCatalog::load(&mut Cursor::new(out)).unwrap();
        assert_eq!(Some("Menu.scene"), reloaded.path(SceneId(1)));
    }
}
