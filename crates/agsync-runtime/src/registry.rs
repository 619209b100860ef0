use agsync_types::{ALIAS_SIGIL, Source, encode_project_path};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// One `(source, pattern)` pair of an alias.
///
/// The pattern is kept verbatim and matched again on every use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasMember {
    pub source: Source,
    pub pattern: String,
}

impl AliasMember {
    pub fn new(source: Source, pattern: impl Into<String>) -> Self {
        Self {
            source,
            pattern: pattern.into(),
        }
    }

    /// Whether `reference` names this member: the pattern itself, its
    /// path-encoded form, or `host:pattern` for remote members.
    pub fn is_referenced_by(&self, reference: &str) -> bool {
        if self.pattern == reference || encode_project_path(&self.pattern) == reference {
            return true;
        }
        match &self.source {
            Source::Remote { host } => reference
                .strip_prefix(host.as_str())
                .and_then(|rest| rest.strip_prefix(':'))
                .is_some_and(|path| path == self.pattern),
            _ => false,
        }
    }
}

impl std::fmt::Display for AliasMember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.source, self.pattern)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias {
    pub name: String,
    #[serde(default)]
    pub members: Vec<AliasMember>,
}

/// Serialized form of the whole registry (`aliases.json`, `alias export`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDocument {
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<AliasMember>>,
}

/// Named groups of `(source, pattern)` members.
///
/// Loaded once and written back after every mutation. Names are
/// case-sensitive and never carry the `@` sigil.
#[derive(Debug, Default)]
pub struct AliasRegistry {
    path: Option<PathBuf>,
    aliases: BTreeMap<String, Alias>,
}

impl AliasRegistry {
    pub fn load(path: &Path) -> Result<Self> {
        let mut registry = Self {
            path: Some(path.to_path_buf()),
            aliases: BTreeMap::new(),
        };

        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let document: AliasDocument =
                serde_json::from_str(&content).map_err(|source| Error::Json {
                    path: path.to_path_buf(),
                    source,
                })?;
            registry.replace_from(document);
        }

        Ok(registry)
    }

    /// Registry that is never persisted.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str) -> Result<&Alias> {
        validate_name(name)?;
        if self.aliases.contains_key(name) {
            return Err(Error::already_exists("Alias", name));
        }

        self.aliases.insert(
            name.to_string(),
            Alias {
                name: name.to_string(),
                members: Vec::new(),
            },
        );
        self.save()?;
        tracing::debug!(alias = name, "created alias");
        self.get(name).ok_or_else(|| Error::not_found("Alias", name))
    }

    pub fn delete(&mut self, name: &str) -> Result<Alias> {
        let removed = self
            .aliases
            .remove(name)
            .ok_or_else(|| Error::not_found("Alias", name))?;
        self.save()?;
        Ok(removed)
    }

    /// Append members; members already present are ignored.
    ///
    /// Returns the members actually added. Sources are not contacted, so an
    /// offline host can be added.
    pub fn add_members(
        &mut self,
        name: &str,
        source: &Source,
        patterns: &[String],
    ) -> Result<Vec<AliasMember>> {
        let alias = self
            .aliases
            .get_mut(name)
            .ok_or_else(|| Error::not_found("Alias", name))?;

        let mut added = Vec::new();
        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            let member = AliasMember::new(source.clone(), pattern);
            if !alias.members.contains(&member) {
                alias.members.push(member.clone());
                added.push(member);
            }
        }

        if !added.is_empty() {
            self.save()?;
        }
        Ok(added)
    }

    /// Remove every member `reference` names.
    pub fn remove_member(&mut self, name: &str, reference: &str) -> Result<Vec<AliasMember>> {
        let alias = self
            .aliases
            .get_mut(name)
            .ok_or_else(|| Error::not_found("Alias", name))?;

        let (removed, kept): (Vec<_>, Vec<_>) = alias
            .members
            .drain(..)
            .partition(|m| m.is_referenced_by(reference));
        alias.members = kept;

        if removed.is_empty() {
            return Err(Error::not_found("Member", format!("{} in alias {}", reference, name)));
        }
        self.save()?;
        Ok(removed)
    }

    /// Members of `name`; accepts the name with or without the `@` sigil.
    pub fn resolve(&self, name: &str) -> Result<&[AliasMember]> {
        let name = name.strip_prefix(ALIAS_SIGIL).unwrap_or(name);
        self.get(name)
            .map(|alias| alias.members.as_slice())
            .ok_or_else(|| Error::not_found("Alias", name))
    }

    pub fn get(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Aliases in name order.
    pub fn list(&self) -> impl Iterator<Item = &Alias> {
        self.aliases.values()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// First alias with a local member whose pattern matches `path`.
    pub fn alias_for_workspace(&self, path: &str) -> Option<&Alias> {
        let haystack = path.to_lowercase();
        self.aliases.values().find(|alias| {
            alias.members.iter().any(|m| {
                m.source.is_local() && haystack.contains(&m.pattern.to_lowercase())
            })
        })
    }

    pub fn export(&self) -> AliasDocument {
        AliasDocument {
            aliases: self
                .aliases
                .iter()
                .map(|(name, alias)| (name.clone(), alias.members.clone()))
                .collect(),
        }
    }

    /// Merge `document` into the registry.
    ///
    /// Without `force`, any name that already exists fails the whole import
    /// with `Conflict` and nothing is written.
    pub fn import(&mut self, document: AliasDocument, force: bool) -> Result<Vec<String>> {
        for name in document.aliases.keys() {
            validate_name(name)?;
        }

        if !force {
            let conflicts: Vec<String> = document
                .aliases
                .keys()
                .filter(|name| self.aliases.contains_key(*name))
                .cloned()
                .collect();
            if !conflicts.is_empty() {
                return Err(Error::Conflict(conflicts));
            }
        }

        let mut imported = Vec::new();
        for (name, members) in document.aliases {
            imported.push(name.clone());
            self.aliases.insert(name.clone(), Alias { name, members });
        }
        self.save()?;
        tracing::info!(count = imported.len(), "imported aliases");
        Ok(imported)
    }

    fn replace_from(&mut self, document: AliasDocument) {
        self.aliases = document
            .aliases
            .into_iter()
            .map(|(name, members)| (name.clone(), Alias { name, members }))
            .collect();
    }

    fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&self.export()).map_err(|source| Error::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::Config("alias name must not be empty".to_string()));
    }
    if name.starts_with(ALIAS_SIGIL) {
        return Err(Error::Config(format!(
            "alias name '{}' must not start with '{}'",
            name, ALIAS_SIGIL
        )));
    }
    Ok(())
}
