//! Docstring catalog feeding `@docs` and `@autodocs` blocks.
//!
//! ```toml
//! [[docstring]]
//! binding = "Qaintensor.MPO"
//! kind = "method"
//! signature = "Tuple{Qaintessent.AbstractCircuitGate}"
//! call = "MPO(cg::AbstractCircuitGate)"
//! text = "MPO(cg::CircuitGate)\n\nTransform an operator ..."
//! ```

use crate::{Category, Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// A single API docstring.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Docstring {
    /// Fully qualified name, e.g. `Qaintensor.contract`.
    pub binding: String,
    /// `type` or `method`.
    pub kind: Category,
    /// Signature suffix used in the anchor, e.g. `Tuple{TensorNetwork}`.
    #[serde(default)]
    pub signature: Option<String>,
    /// Call form a `@docs` line uses to select this docstring, when the text
    /// does not start with it.
    #[serde(default)]
    pub call: Option<String>,
    /// Docstring body as it appears in the index.
    pub text: String,
}

impl Docstring {
    /// Module part of the binding (`Qaintensor` for `Qaintensor.MPO`).
    pub fn module(&self) -> Option<&str> {
        self.binding.rsplit_once('.').map(|(module, _)| module)
    }

    fn matches_call(&self, call: &str) -> bool {
        let wanted = squash(call);
        match &self.call {
            Some(own) => squash(own) == wanted,
            None => squash(self.text.trim_start()).starts_with(&wanted),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    #[serde(default)]
    docstring: Vec<Docstring>,
}

/// All docstrings available to a build, in catalog order.
#[derive(Debug, Clone, Default)]
pub struct DocstringCatalog {
    entries: Vec<Docstring>,
}

impl DocstringCatalog {
    /// Build a catalog, rejecting entries with an empty binding.
    pub fn new(entries: Vec<Docstring>) -> Result<Self> {
        for entry in &entries {
            if !entry.kind.is_docstring() {
                return Err(Error::Config(format!(
                    "docstring '{}' has kind '{}', expected 'type' or 'method'",
                    entry.binding, entry.kind
                )));
            }
            if entry.binding.trim().is_empty() {
                return Err(Error::Config("docstring with empty binding".into()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse docstring catalog: {e}")))?;
        Self::new(file.docstring)
    }

    /// Load a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(format!(
                "docstring catalog {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[Docstring] {
        &self.entries
    }

    /// Entry at `idx`.
    pub fn get(&self, idx: usize) -> Option<&Docstring> {
        self.entries.get(idx)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Indices of the docstrings a `@docs` line refers to.
    ///
    /// A bare name selects the binding's signature-less docstrings, or all of
    /// them when it has none. A call such as `MPO(m::AbstractMatrix)` selects
    /// the docstrings whose declared call or text starts with it. Unqualified
    /// names are looked up in `current_module` first.
    pub fn resolve(&self, reference: &str, current_module: Option<&str>) -> Vec<usize> {
        let reference = reference.trim();
        let (name, call) = match reference.find(['(', '{']) {
            Some(pos) => (reference[..pos].trim(), Some(reference)),
            None => (reference, None),
        };
        if name.is_empty() {
            return Vec::new();
        }

        let mut bindings = Vec::with_capacity(2);
        if let Some(module) = current_module {
            bindings.push(format!("{module}.{name}"));
        }
        bindings.push(name.to_string());

        for binding in &bindings {
            let candidates: Vec<usize> = self
                .entries
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.binding == *binding)
                .map(|(idx, _)| idx)
                .collect();
            if candidates.is_empty() {
                continue;
            }

            return match call {
                Some(call) => candidates
                    .into_iter()
                    .filter(|&idx| self.entries[idx].matches_call(call))
                    .collect(),
                None => {
                    let unsigned: Vec<usize> = candidates
                        .iter()
                        .copied()
                        .filter(|&idx| self.entries[idx].signature.is_none())
                        .collect();
                    if unsigned.is_empty() { candidates } else { unsigned }
                },
            };
        }

        Vec::new()
    }

    /// Indices of every docstring whose binding lives in one of `modules`.
    pub fn in_modules(&self, modules: &[String]) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| {
                entry
                    .module()
                    .is_some_and(|module| modules.iter().any(|m| m == module))
            })
            .map(|(idx, _)| idx)
            .collect()
    }
}

fn squash(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[docstring]]
binding = "Qaintensor.MPO"
kind = "type"
text = "MPO(tensors::AbstractVector{Tensor}, contractions, openidx)\n\nMatrix product operator."

[[docstring]]
binding = "Qaintensor.MPO"
kind = "method"
signature = "Tuple{AbstractArray{T,2} where T}"
text = "MPO(m::AbstractMatrix)\n\nTransform an operator represented by matrix m."

[[docstring]]
binding = "Qaintensor.MPO"
kind = "method"
signature = "Tuple{Qaintessent.CircuitGate}"
text = "MPO(cg::CircuitGate)\n\nTransform a gate."

[[docstring]]
binding = "Qaintensor.MPO"
kind = "method"
signature = "Tuple{Qaintessent.AbstractCircuitGate}"
call = "MPO(cg::AbstractCircuitGate)"
text = "MPO(cg::CircuitGate)\n\nTransform a gate."

[[docstring]]
binding = "Qaintensor.contract"
kind = "method"
signature = "Tuple{TensorNetwork}"
text = "contract(net::TensorNetwork; optimize=false)\n\nFully contract."

[[docstring]]
binding = "Base.show"
kind = "method"
text = "show(io, x)"
"#;

    fn catalog() -> DocstringCatalog {
        DocstringCatalog::from_toml_str(CATALOG).unwrap()
    }

    #[test]
    fn test_bare_name_prefers_unsigned_docstring() {
        assert_eq!(catalog().resolve("MPO", Some("Qaintensor")), vec![0]);
    }

    #[test]
    fn test_bare_name_falls_back_to_all_methods() {
        assert_eq!(catalog().resolve("contract", Some("Qaintensor")), vec![4]);
    }

    #[test]
    fn test_call_matches_text_prefix() {
        let catalog = catalog();
        assert_eq!(
            catalog.resolve("MPO(m::AbstractMatrix)", Some("Qaintensor")),
            vec![1]
        );
        assert_eq!(
            catalog.resolve("MPO(cg::CircuitGate)", Some("Qaintensor")),
            vec![2]
        );
        assert_eq!(
            catalog.resolve("MPO(cg::AbstractCircuitGate)", Some("Qaintensor")),
            vec![3]
        );
    }

    #[test]
    fn test_call_ignores_whitespace() {
        assert_eq!(
            catalog().resolve("contract(net::TensorNetwork;  optimize = false)", Some("Qaintensor")),
            vec![4]
        );
    }

    #[test]
    fn test_call_with_where_clause() {
        let catalog = DocstringCatalog::from_toml_str(
            r##"
[[docstring]]
binding = "Qaintensor.apply_MPO"
kind = "method"
signature = 'Union{Tuple{M}, Tuple{TensorNetwork,MPO,Tuple{Vararg{var"#s1",M}} where var"#s1"<:Integer}} where M'
text = "apply_MPO(ψ::TensorNetwork, mpo::MPO, iwire::NTuple{M, <:Integer}) where {M}\n\nApply mpo.\n\n\n"
"##,
        )
        .unwrap();

        assert_eq!(
            catalog.resolve(
                "apply_MPO(ψ::TensorNetwork, mpo::MPO, iwire::NTuple{M, <:Integer}) where {M}",
                Some("Qaintensor")
            ),
            vec![0]
        );
        assert!(catalog.entries()[0].text.ends_with("\n\n\n"));
    }

    #[test]
    fn test_qualified_and_module_fallback() {
        let catalog = catalog();
        assert_eq!(catalog.resolve("Qaintensor.contract", None), vec![4]);
        assert_eq!(catalog.resolve("Base.show", Some("Qaintensor")), vec![5]);
    }

    #[test]
    fn test_unknown_reference_resolves_to_nothing() {
        let catalog = catalog();
        assert!(catalog.resolve("apply_MPO", Some("Qaintensor")).is_empty());
        assert!(catalog.resolve("MPO(x::Int)", Some("Qaintensor")).is_empty());
        assert!(catalog.resolve("  ", Some("Qaintensor")).is_empty());
    }

    #[test]
    fn test_in_modules() {
        let catalog = catalog();
        assert_eq!(catalog.in_modules(&["Qaintensor".to_string()]), vec![0, 1, 2, 3, 4]);
        assert_eq!(catalog.in_modules(&["Base".to_string()]), vec![5]);
        assert!(catalog.in_modules(&[]).is_empty());
    }

    #[test]
    fn test_rejects_non_docstring_kinds() {
        let result = DocstringCatalog::from_toml_str(
            "[[docstring]]\nbinding = \"A.b\"\nkind = \"section\"\ntext = \"\"\n",
        );
        assert!(matches!(result, Err(Error::Config(_))));

        let result = DocstringCatalog::from_toml_str(
            "[[docstring]]\nbinding = \"A.b\"\nkind = \"macro\"\ntext = \"\"\n",
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_module_of_binding() {
        let catalog = catalog();
        assert_eq!(catalog.entries()[0].module(), Some("Qaintensor"));
        assert_eq!(catalog.len(), 6);
        assert!(!catalog.is_empty());
    }
}
