//! JSON assembly manifests.
//!
//! A manifest describes metadata that has already been read out of an assembly:
//! its modules, their type definitions, and each type's declared base type. The
//! loader turns manifests into shared [`AssemblyDefinition`]s, handing out a
//! fresh [`AssemblyId`] per load.

use crate::{
    AssemblyDefinition, AssemblyId, AssemblyRef, ManifestError, ModuleDefinition, TypeDefinition,
    TypeId, TypeKind, TypeReference,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// First row of the TypeDef table.
const FIRST_TYPEDEF_TOKEN: u32 = 0x0200_0001;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyManifest {
    pub name: String,
    #[serde(default)]
    pub modules: Vec<ModuleManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleManifest {
    pub name: String,
    #[serde(default)]
    pub types: Vec<TypeManifest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeManifest {
    /// Explicit TypeDef token; rows without one are numbered in order.
    #[serde(default)]
    pub token: Option<u32>,
    #[serde(default)]
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub base_type: Option<TypeReference>,
}

#[derive(Debug, Default)]
pub struct ManifestLoader {
    next_id: u32,
}

impl ManifestLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<AssemblyRef, ManifestError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: AssemblyManifest =
            serde_json::from_str(&text).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!("Loaded manifest {} from {}", manifest.name, path.display());
        self.load(manifest)
    }

    pub fn load(&mut self, manifest: AssemblyManifest) -> Result<AssemblyRef, ManifestError> {
        let id = AssemblyId(self.next_id);
        self.next_id += 1;

        let mut next_token = FIRST_TYPEDEF_TOKEN;
        let mut seen = HashSet::new();
        let mut modules = Vec::with_capacity(manifest.modules.len());

        for module in manifest.modules {
            let mut types = Vec::with_capacity(module.types.len());
            for row in module.types {
                let token = row.token.unwrap_or(next_token);
                next_token = next_token.max(token).saturating_add(1);
                if !seen.insert(token) {
                    return Err(ManifestError::DuplicateToken {
                        assembly: manifest.name,
                        token,
                    });
                }
                types.push(TypeDefinition {
                    id: TypeId::new(id, token),
                    namespace: row.namespace,
                    name: row.name,
                    kind: row.kind,
                    base_type: row.base_type,
                });
            }
            modules.push(ModuleDefinition {
                name: module.name,
                types,
            });
        }

        Ok(Arc::new(AssemblyDefinition {
            id,
            name: manifest.name,
            modules,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BaseTypeResolver;
    use std::fs;
    use tempfile::tempdir;

    const SHAPES: &str = r#"{
        "name": "Shapes",
        "modules": [{
            "name": "Shapes.dll",
            "types": [
                {
                    "namespace": "Shapes",
                    "name": "Shape",
                    "base_type": { "full_name": "System.Object", "assembly": "mscorlib" }
                },
                {
                    "namespace": "Shapes",
                    "name": "Circle",
                    "base_type": { "full_name": "Shapes.Shape" }
                },
                { "namespace": "Shapes", "name": "IDrawable", "kind": "Interface" }
            ]
        }]
    }"#;

    #[test]
    fn test_load_numbers_tokens_and_ids() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("shapes.json");
        fs::write(&path, SHAPES)?;

        let mut loader = ManifestLoader::new();
        let first = loader.load_path(&path)?;
        let second = loader.load_path(&path)?;

        assert_ne!(first.id, second.id);
        let tokens: Vec<u32> = first.types().map(|t| t.id.token).collect();
        assert_eq!(tokens, vec![0x0200_0001, 0x0200_0002, 0x0200_0003]);

        let circle = first.types().nth(1).unwrap();
        assert_eq!(circle.full_name(), "Shapes.Circle");
        assert_eq!(circle.base_type, Some(TypeReference::new("Shapes.Shape")));
        assert_eq!(first.types().nth(2).unwrap().kind, TypeKind::Interface);
        Ok(())
    }

    #[test]
    fn test_second_load_links_to_its_own_types() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("shapes.json");
        fs::write(&path, SHAPES)?;

        let mut loader = ManifestLoader::new();
        let first = loader.load_path(&path)?;
        let second = loader.load_path(&path)?;
        let types = crate::flatten_types([&first, &second]);
        let resolver = crate::LoadedTypesResolver::new(&types);

        let shape = |assembly: &AssemblyRef| assembly.types().next().unwrap().id;
        let circle_base = |assembly: &AssemblyRef| {
            let circle = assembly.types().nth(1).unwrap();
            resolver.resolve(circle.base_type.as_ref().unwrap(), assembly.id)
        };
        assert_eq!(circle_base(&first), Some(shape(&first)));
        assert_eq!(circle_base(&second), Some(shape(&second)));
        Ok(())
    }

    #[test]
    fn test_duplicate_token_is_rejected() {
        let manifest: AssemblyManifest = serde_json::from_str(
            r#"{ "name": "Dup", "modules": [{ "name": "Dup.dll", "types": [
                { "token": 33554434, "name": "A" },
                { "token": 33554434, "name": "B" }
            ]}]}"#,
        )
        .unwrap();

        let err = ManifestLoader::new().load(manifest).unwrap_err();
        assert!(matches!(err, ManifestError::DuplicateToken { token: 0x0200_0002, .. }));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = ManifestLoader::new()
            .load_path("/definitely/not/here.json")
            .unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
