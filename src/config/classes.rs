// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Static class lookup table (class id → name, type, UI colour)

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Colour used for classes the table does not know about
pub const UNKNOWN_CLASS_COLOR: &str = "#ffffff";

/// Type bucket used for classes the table does not know about
pub const OTHER_CLASS_TYPE: &str = "other";

/// Display information for a single model class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Human readable name (e.g. "Person")
    pub name: String,
    /// Summary bucket: person | vehicle | bicycle | other
    #[serde(rename = "type")]
    pub class_type: String,
    /// Hex colour for the UI canvas
    pub color: String,
}

impl ClassInfo {
    pub fn new(name: &str, class_type: &str, color: &str) -> Self {
        Self {
            name: name.to_string(),
            class_type: class_type.to_string(),
            color: color.to_string(),
        }
    }
}

/// Immutable class-id lookup table, built once at configuration time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassTable {
    classes: BTreeMap<u32, ClassInfo>,
}

impl ClassTable {
    pub fn new(classes: BTreeMap<u32, ClassInfo>) -> Self {
        Self { classes }
    }

    /// Parse a table from JSON of the form `{"0": {"name": .., "type": .., "color": ..}}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolve a class id, falling back to `class_<id>` / `other` / white
    pub fn resolve(&self, class_id: u32) -> Cow<'_, ClassInfo> {
        match self.classes.get(&class_id) {
            Some(info) => Cow::Borrowed(info),
            None => Cow::Owned(ClassInfo {
                name: format!("class_{}", class_id),
                class_type: OTHER_CLASS_TYPE.to_string(),
                color: UNKNOWN_CLASS_COLOR.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &ClassInfo)> {
        self.classes.iter()
    }

    /// Check every colour is a `#rrggbb` hex string
    pub fn validate(&self) -> Result<(), String> {
        for (id, info) in self.iter() {
            let hex = info.color.strip_prefix('#').unwrap_or("");
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(format!(
                    "Class {} has invalid colour '{}', expected #rrggbb",
                    id, info.color
                ));
            }
            if info.name.is_empty() || info.class_type.is_empty() {
                return Err(format!("Class {} must have a name and a type", id));
            }
        }
        Ok(())
    }
}

impl Default for ClassTable {
    /// Thermal intruder model classes
    fn default() -> Self {
        let mut classes = BTreeMap::new();
        classes.insert(0, ClassInfo::new("Person", "person", "#ff2d55"));
        classes.insert(1, ClassInfo::new("Vehicle", "vehicle", "#ffd60a"));
        classes.insert(2, ClassInfo::new("Bicycle", "bicycle", "#00e5ff"));
        Self { classes }
    }
}
