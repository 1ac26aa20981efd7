//! RON content loader

use crate::error::{Error, Result};
use crate::schema::ContentFile;
use hexrealm_core::{
    Catalog, DefId, EngineConfig, EnemyBand, EnemyDef, ItemTemplate, RarityBand, RarityTier,
    TerrainDef,
};
use indexmap::IndexMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Content tables accumulated across files
#[derive(Debug, Default)]
pub struct ContentDefs {
    pub terrain: IndexMap<DefId, TerrainDef>,
    pub enemies: IndexMap<DefId, EnemyDef>,
    pub items: IndexMap<DefId, ItemTemplate>,
    pub rarities: IndexMap<DefId, RarityTier>,
    pub enemy_bands: Vec<EnemyBand>,
    pub rarity_bands: Vec<RarityBand>,
}

fn insert_unique<T>(
    table: &mut IndexMap<DefId, T>,
    defs: Vec<T>,
    id_of: impl Fn(&T) -> &DefId,
    kind: &str,
) -> Result<()> {
    for def in defs {
        let id = id_of(&def).clone();
        if table.contains_key(&id) {
            return Err(Error::DuplicateDefinition(format!("{} {}", kind, id)));
        }
        table.insert(id, def);
    }
    Ok(())
}

/// Loader for RON content files
pub struct Loader {
    defs: ContentDefs,
}

impl Loader {
    /// Create a new loader
    pub fn new() -> Self {
        Self {
            defs: ContentDefs::default(),
        }
    }

    /// Load a single RON file
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        self.load_str(&content).map_err(|e| match e {
            Error::InvalidSchema(msg) => {
                Error::InvalidSchema(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded content file");
        Ok(())
    }

    /// Load content tables from a RON string
    pub fn load_str(&mut self, content: &str) -> Result<()> {
        let file: ContentFile = ron::from_str(content)?;
        if file.is_empty() {
            return Err(Error::InvalidSchema("file defines no content tables".to_string()));
        }
        insert_unique(&mut self.defs.terrain, file.terrain, |t| &t.id, "terrain")?;
        insert_unique(&mut self.defs.enemies, file.enemies, |e| &e.id, "enemy")?;
        insert_unique(&mut self.defs.items, file.items, |i| &i.id, "item")?;
        insert_unique(&mut self.defs.rarities, file.rarities, |r| &r.id, "rarity")?;

        for band in file.enemy_bands {
            if self.defs.enemy_bands.iter().any(|b| b.min_strength == band.min_strength) {
                return Err(Error::DuplicateDefinition(format!(
                    "enemy band {}",
                    band.min_strength
                )));
            }
            self.defs.enemy_bands.push(band);
        }
        for band in file.rarity_bands {
            if self.defs.rarity_bands.iter().any(|b| b.min_strength == band.min_strength) {
                return Err(Error::DuplicateDefinition(format!(
                    "rarity band {}",
                    band.min_strength
                )));
            }
            self.defs.rarity_bands.push(band);
        }
        Ok(())
    }

    /// Load all RON files from a directory, in path order
    pub fn load_directory(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Not a directory: {:?}", path),
            )));
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        entries.sort();

        for file_path in entries {
            if file_path.extension().map(|e| e == "ron").unwrap_or(false) {
                self.load_file(&file_path)?;
            } else if file_path.is_dir() {
                self.load_directory(&file_path)?;
            }
        }

        Ok(())
    }

    /// Get the current definitions (for inspection during loading)
    pub fn defs(&self) -> &ContentDefs {
        &self.defs
    }

    /// Finish loading and validate the result into a catalog
    pub fn finish(self) -> Result<Catalog> {
        let defs = self.defs;
        let catalog = Catalog::new(
            defs.terrain.into_values().collect(),
            defs.enemies.into_values().collect(),
            defs.items.into_values().collect(),
            defs.rarities.into_values().collect(),
            defs.enemy_bands,
            defs.rarity_bands,
        )?;
        tracing::info!(
            terrain = catalog.terrain_table().len(),
            enemies = catalog.enemies().count(),
            items = catalog.items().count(),
            "catalog ready"
        );
        Ok(catalog)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

const BUILTIN: [&str; 3] = [
    include_str!("../content/terrain.ron"),
    include_str!("../content/enemies.ron"),
    include_str!("../content/items.ron"),
];

/// The catalog shipped with the crate
pub fn builtin_catalog() -> Result<Catalog> {
    let mut loader = Loader::new();
    for content in BUILTIN {
        loader.load_str(content)?;
    }
    loader.finish()
}

/// Parse and validate an engine config; omitted fields take their defaults
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let config: EngineConfig = ron::from_str(content)?;
    config
        .validate()
        .map_err(|e| Error::InvalidSchema(e.to_string()))?;
    Ok(config)
}

/// Read an engine config from a RON file
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
    parse_config(&fs::read_to_string(path)?)
}
