use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CatalogConfig;
use crate::errors::DomainError;

/// Identifier the reasoning engine binds `Game` to, e.g. `callofdutymw3`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GameId(pub String);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub title: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("catalog file `{0}` defines no games")]
    Empty(PathBuf),
}

const BUILTIN_GAMES: [(&str, &str); 4] = [
    ("sekiro", "Sekiro: Shadows Die Twice"),
    ("callofdutymw3", "Call of Duty: Modern Warfare 3"),
    ("leagueoflegends", "League of Legends"),
    ("eldenring", "Elden Ring"),
];

/// Read-only identifier to display-title table, loaded once per process.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    games: Vec<Game>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    games: BTreeMap<String, String>,
}

impl Catalog {
    pub fn new(games: Vec<Game>) -> Self {
        Self { games }
    }

    pub fn builtin() -> Self {
        Self::new(
            BUILTIN_GAMES
                .iter()
                .map(|(id, title)| Game { id: GameId(id.to_string()), title: title.to_string() })
                .collect(),
        )
    }

    /// Loads a `[games]` table of `identifier = "Title"` entries.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw, path)
    }

    /// Parses catalog text; `origin` is only used in error messages.
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, CatalogError> {
        let file = toml::from_str::<CatalogFile>(raw)
            .map_err(|source| CatalogError::ParseFile { path: origin.to_path_buf(), source })?;
        if file.games.is_empty() {
            return Err(CatalogError::Empty(origin.to_path_buf()));
        }

        Ok(Self::new(
            file.games.into_iter().map(|(id, title)| Game { id: GameId(id), title }).collect(),
        ))
    }

    /// The configured catalog file, or the built-in table when none is set.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        match &config.path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn find(&self, id: &GameId) -> Option<&Game> {
        self.games.iter().find(|game| &game.id == id)
    }

    /// Lookup for an identifier produced by the reasoning engine. A miss means the rule
    /// base and the catalog drifted apart.
    pub fn lookup(&self, id: &GameId) -> Result<&Game, DomainError> {
        self.find(id).ok_or_else(|| DomainError::UnknownGame { identifier: id.0.clone() })
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Rule-base identifiers (declared through `game(<id>).` facts) with no catalog entry.
    pub fn missing_from(&self, rules: &str) -> Vec<GameId> {
        rule_base_identifiers(rules).into_iter().filter(|id| self.find(id).is_none()).collect()
    }
}

pub fn rule_base_identifiers(rules: &str) -> Vec<GameId> {
    let mut identifiers: Vec<GameId> = Vec::new();
    for line in rules.lines() {
        let Some(inner) =
            line.trim().strip_prefix("game(").and_then(|rest| rest.strip_suffix(")."))
        else {
            continue;
        };
        let id = GameId(inner.trim().to_string());
        if !identifiers.contains(&id) {
            identifiers.push(id);
        }
    }
    identifiers
}
