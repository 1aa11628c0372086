//! Access policy configuration (TOML)
//!
//! ```toml
//! [reflect.permissions]
//! global = "ALL"
//! sealed = ["Secret"]
//!
//! [reflect.permissions.modules]
//! "app" = "FULL_ACCESS"
//! "plugins/*" = "PUBLIC_ONLY"
//!
//! [reflect.permissions.classes]
//! "Secret" = "READ_PUBLIC"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::policy::{self, AccessPermission, AccessPolicy};
use crate::reflect::ClassTable;

/// Engine configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Reflection settings
    #[serde(default)]
    pub reflect: ReflectSection,
}

/// `[reflect]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReflectSection {
    /// Access permissions
    #[serde(default)]
    pub permissions: PermissionsSection,
}

/// `[reflect.permissions]` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PermissionsSection {
    /// Global default (flag names joined with `|`, hex or decimal)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global: Option<String>,

    /// Module name or pattern -> permissions
    #[serde(default)]
    pub modules: BTreeMap<String, String>,

    /// Class name -> permissions
    #[serde(default)]
    pub classes: BTreeMap<String, String>,

    /// Classes whose rule cannot be changed after loading
    #[serde(default)]
    pub sealed: Vec<String>,
}

impl ModelConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(content: &str) -> ModelResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a configuration file
    pub fn load(path: &Path) -> ModelResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Build the access policy described by this configuration
    ///
    /// Class names are looked up in the global class table, so the classes
    /// must be registered first.
    pub fn to_policy(&self) -> ModelResult<AccessPolicy> {
        let permissions = &self.reflect.permissions;
        let mut policy = AccessPolicy::new();

        if let Some(global) = &permissions.global {
            policy.set_global(global.parse()?);
        }
        for (pattern, value) in &permissions.modules {
            policy.set_module(pattern, value.parse()?);
        }

        let table = ClassTable::global();
        let find = |name: &str| {
            table
                .find(name)
                .ok_or_else(|| ModelError::unknown_class(name))
        };
        for (name, value) in &permissions.classes {
            let value: AccessPermission = value.parse()?;
            policy.set_class(find(name)?, value)?;
        }
        for name in &permissions.sealed {
            policy.seal_class(find(name)?);
        }
        Ok(policy)
    }

    /// Install this configuration's policy process-wide
    pub fn apply(&self) -> ModelResult<()> {
        let policy = self.to_policy()?;
        debug!(
            modules = self.reflect.permissions.modules.len(),
            classes = self.reflect.permissions.classes.len(),
            "installing access policy"
        );
        policy::install(policy);
        Ok(())
    }
}
