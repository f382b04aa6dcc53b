//! Project registry persisted alongside the project workspaces.
//!
//! The registry maps a project name to its workspace directory and the
//! `.sb3` archive it tracks. It is an explicitly constructed object that is
//! passed down to whoever needs it — never a process-wide global — and it
//! only touches disk in [`ProjectRegistry::load`] and
//! [`ProjectRegistry::save`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One tracked project.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// Workspace directory the archive is extracted into.
    pub base: PathBuf,
    /// The `.sb3` archive being tracked.
    pub project_file: PathBuf,
}

/// Registry of tracked projects, persisted as JSON.
#[derive(Debug)]
pub struct ProjectRegistry {
    path: PathBuf,
    projects: HashMap<String, ProjectEntry>,
}

impl ProjectRegistry {
    /// Load the registry from `path`, starting empty when the file does not
    /// exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let projects = if path.exists() {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read registry at {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid registry file at {}", path.display()))?
        } else {
            HashMap::new()
        };
        Ok(Self { path, projects })
    }

    /// Persist the registry to its backing file.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(&self.projects)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write registry at {}", self.path.display()))
    }

    /// Look up a project by name.
    pub fn get(&self, name: &str) -> Option<&ProjectEntry> {
        self.projects.get(name)
    }

    /// Register a new project and return its (possibly disambiguated) name
    /// together with the created entry.
    ///
    /// A name collision gets a `~N` suffix, counting up from zero.
    pub fn register(
        &mut self,
        name: &str,
        workspaces_root: &Path,
        project_file: PathBuf,
    ) -> (String, ProjectEntry) {
        let mut unique = name.to_string();
        let mut i = 0;
        while self.projects.contains_key(&unique) {
            unique = format!("{}~{}", name, i);
            i += 1;
        }

        let entry = ProjectEntry {
            base: workspaces_root.join(&unique),
            project_file,
        };
        self.projects.insert(unique.clone(), entry.clone());
        (unique, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ProjectRegistry::load(dir.path().join("project_config.json")).unwrap();
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn test_register_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project_config.json");

        let mut registry = ProjectRegistry::load(&path).unwrap();
        let (name, entry) =
            registry.register("game", dir.path(), dir.path().join("game.sb3"));
        assert_eq!(name, "game");
        assert_eq!(entry.base, dir.path().join("game"));
        registry.save().unwrap();

        let reloaded = ProjectRegistry::load(&path).unwrap();
        let entry = reloaded.get("game").unwrap();
        assert_eq!(entry.project_file, dir.path().join("game.sb3"));
    }

    #[test]
    fn test_register_collision_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = ProjectRegistry::load(dir.path().join("config.json")).unwrap();

        let (first, _) = registry.register("game", dir.path(), dir.path().join("a.sb3"));
        let (second, _) = registry.register("game", dir.path(), dir.path().join("b.sb3"));
        let (third, _) = registry.register("game", dir.path(), dir.path().join("c.sb3"));

        assert_eq!(first, "game");
        assert_eq!(second, "game~0");
        assert_eq!(third, "game~1");
    }
}
