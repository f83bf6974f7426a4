// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Plugin manifests.
//!
//! A plugin directory carries a JSON manifest naming its backend
//! entrypoint as `module#Class`. Node implementations are compiled in;
//! the manifest only decides which user-visible kind name resolves to
//! which registered class.

use crate::error::PipelineError;
use crate::registry::NodeRegistry;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginManifest {
    /// `module#Class`; the class half selects the compiled-in factory.
    pub backend_entrypoint: String,
}

impl PluginManifest {
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| PipelineError::Manifest(format!("{}: {err}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|err| PipelineError::Manifest(format!("{}: {err}", path.display())))
    }

    /// The class half of `module#Class`.
    pub fn class_name(&self) -> Result<&str, PipelineError> {
        self.backend_entrypoint
            .split_once('#')
            .map(|(_, class)| class)
            .filter(|class| !class.is_empty())
            .ok_or_else(|| {
                PipelineError::Manifest(format!(
                    "malformed backend_entrypoint: {}",
                    self.backend_entrypoint
                ))
            })
    }
}

/// Resolve a name→directory plugin map onto the registry: each directory's
/// manifest selects a registered class, and the user-visible name becomes
/// an alias for it.
pub fn register_plugins(
    registry: &mut NodeRegistry,
    plugins: &[(String, PathBuf)],
) -> Result<(), PipelineError> {
    for (kind_name, dir) in plugins {
        let manifest = PluginManifest::load(&dir.join(MANIFEST_FILE))?;
        let class_name = manifest.class_name()?;
        registry.alias(kind_name, class_name)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
