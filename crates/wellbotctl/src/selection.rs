//! Selection state for the body model.
//!
//! `SelectionSet` is the set of selected mesh names; `ModelHighlighter` turns
//! membership into per-mesh materials against a snapshot taken at model load.

use std::collections::HashMap;
use wellbot_common::body_parts::display_name;

/// Material applied to selected meshes
pub const HIGHLIGHT_COLOR: u32 = 0x006400;
/// Material given to meshes that load without one
pub const DEFAULT_MESH_COLOR: u32 = 0xaaaaaa;

/// A mesh material, reduced to what highlighting needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Material {
    pub color: u32,
}

impl Material {
    pub const fn solid(color: u32) -> Self {
        Self { color }
    }

    pub const fn highlight() -> Self {
        Self::solid(HIGHLIGHT_COLOR)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::solid(DEFAULT_MESH_COLOR)
    }
}

/// Selected body-part names, in first-selection order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    parts: Vec<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the part if absent, remove it if present. Returns whether it is now selected.
    pub fn toggle(&mut self, part: &str) -> bool {
        if let Some(pos) = self.parts.iter().position(|p| p == part) {
            self.parts.remove(pos);
            false
        } else {
            self.parts.push(part.to_string());
            true
        }
    }

    pub fn contains(&self, part: &str) -> bool {
        self.parts.iter().any(|p| p == part)
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    /// Locations for the diagnosis payload
    pub fn to_locations(&self) -> Vec<String> {
        self.parts.clone()
    }

    /// Read-only form field: `left elbow, right knee`
    pub fn summary(&self) -> String {
        self.parts
            .iter()
            .map(|p| display_name(p))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Click on a mesh. Unnamed meshes are not selectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshClick {
    pub mesh_name: String,
}

impl MeshClick {
    pub fn part_name(&self) -> Option<&str> {
        let name = self.mesh_name.trim();
        (!name.is_empty()).then_some(name)
    }
}

/// Material snapshot captured once when the model loads
#[derive(Debug, Clone, Default)]
pub struct ModelHighlighter {
    originals: HashMap<String, Material>,
    order: Vec<String>,
}

impl ModelHighlighter {
    /// Snapshot each mesh's material; `None` gets the default material.
    pub fn capture<I, S>(meshes: I) -> Self
    where
        I: IntoIterator<Item = (S, Option<Material>)>,
        S: Into<String>,
    {
        let mut highlighter = Self::default();
        for (name, material) in meshes {
            let name = name.into();
            if highlighter.originals.contains_key(&name) {
                continue;
            }
            highlighter.order.push(name.clone());
            highlighter
                .originals
                .insert(name, material.unwrap_or_default());
        }
        highlighter
    }

    pub fn mesh_names(&self) -> &[String] {
        &self.order
    }

    pub fn original(&self, mesh: &str) -> Option<Material> {
        self.originals.get(mesh).copied()
    }

    /// Material each mesh should carry for the given selection.
    pub fn render(&self, selection: &SelectionSet) -> Vec<(String, Material)> {
        self.order
            .iter()
            .map(|name| {
                let material = if selection.contains(name) {
                    Material::highlight()
                } else {
                    self.originals[name]
                };
                (name.clone(), material)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut set = SelectionSet::new();
        assert!(set.toggle("left_elbow"));
        assert!(set.contains("left_elbow"));
        assert!(!set.toggle("left_elbow"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_order_follows_first_selection() {
        let mut set = SelectionSet::new();
        set.toggle("right_knee");
        set.toggle("left_elbow");
        set.toggle("upper_arm");
        set.toggle("left_elbow");
        assert_eq!(set.parts(), &["right_knee".to_string(), "upper_arm".to_string()]);
        assert_eq!(set.summary(), "right knee, upper arm");
    }

    #[test]
    fn test_blank_mesh_is_not_a_part() {
        let click = MeshClick {
            mesh_name: "  ".to_string(),
        };
        assert!(click.part_name().is_none());
    }

    #[test]
    fn test_missing_material_gets_default() {
        let hl = ModelHighlighter::capture([("upper_arm", None)]);
        assert_eq!(hl.original("upper_arm"), Some(Material::solid(DEFAULT_MESH_COLOR)));
    }
}
