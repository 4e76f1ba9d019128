use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub mod error;
pub mod manifest;

pub use error::ManifestError;
pub use manifest::{AssemblyManifest, ManifestLoader, ModuleManifest, TypeManifest};

/// Identity of one loaded assembly handle.
///
/// Issued by the metadata source once per load, so loading the same file twice
/// yields two distinct identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssemblyId(pub u32);

impl fmt::Display for AssemblyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of one type definition: the owning assembly plus its TypeDef token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeId {
    pub assembly: AssemblyId,
    pub token: u32,
}

impl TypeId {
    pub fn new(assembly: AssemblyId, token: u32) -> Self {
        Self { assembly, token }
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#010x}", self.assembly, self.token)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TypeKind {
    #[default]
    Class,
    Interface,
    Struct,
    Enum,
    Delegate,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Struct => "struct",
            TypeKind::Enum => "enum",
            TypeKind::Delegate => "delegate",
        };
        f.write_str(label)
    }
}

/// An unresolved reference to a base type, as it appears in metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeReference {
    /// Namespace-qualified name, e.g. "System.Collections.Generic.List`1"
    pub full_name: String,
    /// Name of the assembly the reference points into; `None` for the
    /// referencing assembly itself.
    #[serde(default)]
    pub assembly: Option<String>,
}

impl TypeReference {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            assembly: None,
        }
    }

    pub fn in_assembly(full_name: impl Into<String>, assembly: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            assembly: Some(assembly.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub id: TypeId,
    pub namespace: String,
    pub name: String,
    pub kind: TypeKind,
    pub base_type: Option<TypeReference>,
}

impl TypeDefinition {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDefinition {
    pub name: String,
    pub types: Vec<TypeDefinition>,
}

/// One loaded assembly's metadata, shared behind an `Arc` by everything that
/// holds on to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyDefinition {
    pub id: AssemblyId,
    pub name: String,
    pub modules: Vec<ModuleDefinition>,
}

impl AssemblyDefinition {
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.modules.iter().flat_map(|m| m.types.iter())
    }
}

pub type AssemblyRef = Arc<AssemblyDefinition>;

/// A type definition paired with the name of the assembly that declares it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedType {
    pub assembly_name: String,
    pub definition: TypeDefinition,
}

/// Flattens assemblies → modules → types, preserving declaration order.
pub fn flatten_types<'a>(assemblies: impl IntoIterator<Item = &'a AssemblyRef>) -> Vec<LoadedType> {
    assemblies
        .into_iter()
        .flat_map(|assembly| {
            assembly.types().map(move |t| LoadedType {
                assembly_name: assembly.name.clone(),
                definition: t.clone(),
            })
        })
        .collect()
}

/// Resolves a base-type reference to a loaded type definition.
pub trait BaseTypeResolver {
    /// `from` is the assembly that declares the referencing type.
    fn resolve(&self, reference: &TypeReference, from: AssemblyId) -> Option<TypeId>;
}

/// Resolves references against the currently loaded type set only. Anything
/// defined outside it (e.g. `System.Object` when mscorlib is not loaded) stays
/// unresolved.
///
/// Among candidates with the right name, one from the referencing assembly
/// wins; otherwise the first loaded one does.
#[derive(Debug, Default)]
pub struct LoadedTypesResolver {
    by_name: HashMap<String, Vec<(String, TypeId)>>,
}

impl LoadedTypesResolver {
    pub fn new(types: &[LoadedType]) -> Self {
        let mut by_name: HashMap<String, Vec<(String, TypeId)>> = HashMap::new();
        for loaded in types {
            by_name
                .entry(loaded.definition.full_name())
                .or_default()
                .push((loaded.assembly_name.clone(), loaded.definition.id));
        }
        Self { by_name }
    }
}

impl BaseTypeResolver for LoadedTypesResolver {
    fn resolve(&self, reference: &TypeReference, from: AssemblyId) -> Option<TypeId> {
        let candidates = self.by_name.get(&reference.full_name)?;
        let mut fallback = None;
        for (name, id) in candidates {
            if let Some(assembly) = &reference.assembly
                && assembly != name
            {
                continue;
            }
            if id.assembly == from {
                return Some(*id);
            }
            fallback.get_or_insert(*id);
        }
        fallback
    }
}
