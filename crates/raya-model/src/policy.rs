//! Access policy for privileged property access
//!
//! Models read and write members regardless of their declared visibility,
//! but only as far as the deployment allows. Every get, set and observe goes
//! through the process-wide [`AccessPolicy`], resolved most-specific first:
//!
//! 1. class rule
//! 2. module rule (exact name, then wildcard patterns in insertion order)
//! 3. global default
//!
//! Module patterns: `"app"` matches exactly, `"plugins/*"` matches anything
//! below `plugins/`, `"plugins/**"` also matches `plugins` itself, and `"**"`
//! matches every module.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use crate::error::{ModelError, ModelResult};
use crate::reflect::{ClassDecl, ClassId};

/// Access permission flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccessPermission(u8);

impl AccessPermission {
    /// Nothing allowed
    pub const NONE: Self = Self(0x00);
    /// Read public members
    pub const READ_PUBLIC: Self = Self(0x01);
    /// Read non-public members
    pub const READ_PRIVATE: Self = Self(0x02);
    /// Write public members
    pub const WRITE_PUBLIC: Self = Self(0x04);
    /// Write non-public members
    pub const WRITE_PRIVATE: Self = Self(0x08);
    /// Invoke public accessor methods
    pub const INVOKE_PUBLIC: Self = Self(0x10);
    /// Invoke non-public accessor methods
    pub const INVOKE_PRIVATE: Self = Self(0x20);

    // Common combinations
    /// READ_PUBLIC | READ_PRIVATE
    pub const READ_ALL: Self = Self(0x03);
    /// WRITE_PUBLIC | WRITE_PRIVATE
    pub const WRITE_ALL: Self = Self(0x0C);
    /// INVOKE_PUBLIC | INVOKE_PRIVATE
    pub const INVOKE_ALL: Self = Self(0x30);
    /// READ_PUBLIC | WRITE_PUBLIC | INVOKE_PUBLIC
    pub const PUBLIC_ONLY: Self = Self(0x15);
    /// Everything
    pub const FULL_ACCESS: Self = Self(0x3F);
    /// Alias of [`FULL_ACCESS`](Self::FULL_ACCESS)
    pub const ALL: Self = Self(0x3F);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x3F)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if permission contains a flag
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of permissions
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Intersection of permissions
    pub const fn intersection(&self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Difference (remove flags)
    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Parse a single flag name, hex (`0x15`) or decimal value
    pub fn parse_flag(s: &str) -> Option<Self> {
        let s = s.trim();
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "READ_PUBLIC" => Some(Self::READ_PUBLIC),
            "READ_PRIVATE" => Some(Self::READ_PRIVATE),
            "WRITE_PUBLIC" => Some(Self::WRITE_PUBLIC),
            "WRITE_PRIVATE" => Some(Self::WRITE_PRIVATE),
            "INVOKE_PUBLIC" => Some(Self::INVOKE_PUBLIC),
            "INVOKE_PRIVATE" => Some(Self::INVOKE_PRIVATE),
            "READ_ALL" => Some(Self::READ_ALL),
            "WRITE_ALL" => Some(Self::WRITE_ALL),
            "INVOKE_ALL" => Some(Self::INVOKE_ALL),
            "PUBLIC_ONLY" => Some(Self::PUBLIC_ONLY),
            "FULL_ACCESS" | "ALL" => Some(Self::FULL_ACCESS),
            _ => {
                if let Some(hex) = s.strip_prefix("0x") {
                    u8::from_str_radix(hex, 16).ok().map(Self::from_bits)
                } else {
                    s.parse::<u8>().ok().map(Self::from_bits)
                }
            }
        }
    }

    /// Parse pipe-separated flags (e.g., "READ_PUBLIC|WRITE_PUBLIC")
    pub fn parse_combined(s: &str) -> Option<Self> {
        s.split('|')
            .try_fold(Self::NONE, |acc, part| Some(acc.union(Self::parse_flag(part)?)))
    }
}

impl FromStr for AccessPermission {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_combined(s).ok_or_else(|| ModelError::Config {
            message: format!("invalid permission value: {}", s),
        })
    }
}

impl Default for AccessPermission {
    fn default() -> Self {
        Self::FULL_ACCESS
    }
}

impl fmt::Display for AccessPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::NONE => "NONE",
            Self::READ_PUBLIC => "READ_PUBLIC",
            Self::READ_PRIVATE => "READ_PRIVATE",
            Self::WRITE_PUBLIC => "WRITE_PUBLIC",
            Self::WRITE_PRIVATE => "WRITE_PRIVATE",
            Self::INVOKE_PUBLIC => "INVOKE_PUBLIC",
            Self::INVOKE_PRIVATE => "INVOKE_PRIVATE",
            Self::READ_ALL => "READ_ALL",
            Self::WRITE_ALL => "WRITE_ALL",
            Self::INVOKE_ALL => "INVOKE_ALL",
            Self::PUBLIC_ONLY => "PUBLIC_ONLY",
            Self::FULL_ACCESS => "FULL_ACCESS",
            _ => return write!(f, "0x{:02X}", self.0),
        };
        f.write_str(name)
    }
}

/// Module permission pattern (supports wildcards)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRule {
    /// Pattern (e.g., "app", "plugins/*", "**")
    pub pattern: String,
    /// Permissions for matching modules
    pub permissions: AccessPermission,
}

impl ModuleRule {
    /// Check if a module name matches this pattern
    pub fn matches(&self, module: &str) -> bool {
        if self.pattern == "**" || self.pattern == "*" {
            return true;
        }
        if let Some(prefix) = self.pattern.strip_suffix("/**") {
            module == prefix || below(module, prefix)
        } else if let Some(prefix) = self.pattern.strip_suffix("/*") {
            below(module, prefix)
        } else {
            self.pattern == module
        }
    }
}

fn below(module: &str, prefix: &str) -> bool {
    module
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'))
}

/// Resolved permission rules
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    /// Global default permissions
    global_default: AccessPermission,
    /// Class-level permissions
    classes: FxHashMap<ClassId, AccessPermission>,
    /// Exact module permissions
    modules: FxHashMap<String, AccessPermission>,
    /// Wildcard module rules, first match wins
    module_rules: Vec<ModuleRule>,
    /// Classes whose rule can no longer change
    sealed_classes: FxHashSet<ClassId>,
}

impl AccessPolicy {
    /// Policy allowing everything
    pub fn new() -> Self {
        Self {
            global_default: AccessPermission::FULL_ACCESS,
            classes: FxHashMap::default(),
            modules: FxHashMap::default(),
            module_rules: Vec::new(),
            sealed_classes: FxHashSet::default(),
        }
    }

    /// Check if any restriction is configured (fast path)
    pub fn has_any_restrictions(&self) -> bool {
        self.global_default != AccessPermission::FULL_ACCESS
            || !self.classes.is_empty()
            || !self.modules.is_empty()
            || !self.module_rules.is_empty()
    }

    // ===== Global =====

    /// Set global default permissions
    pub fn set_global(&mut self, permissions: AccessPermission) {
        self.global_default = permissions;
    }

    /// Get global default permissions
    pub fn global(&self) -> AccessPermission {
        self.global_default
    }

    // ===== Classes =====

    /// Set class-level permissions
    pub fn set_class(&mut self, class: ClassId, permissions: AccessPermission) -> ModelResult<()> {
        self.ensure_unsealed(class)?;
        self.classes.insert(class, permissions);
        Ok(())
    }

    /// Get class-level permissions (not resolved)
    pub fn class(&self, class: ClassId) -> Option<AccessPermission> {
        self.classes.get(&class).copied()
    }

    /// Clear class-level permissions
    pub fn clear_class(&mut self, class: ClassId) -> ModelResult<()> {
        self.ensure_unsealed(class)?;
        self.classes.remove(&class);
        Ok(())
    }

    /// Seal class permissions
    pub fn seal_class(&mut self, class: ClassId) {
        self.sealed_classes.insert(class);
    }

    /// Check if class permissions are sealed
    pub fn is_class_sealed(&self, class: ClassId) -> bool {
        self.sealed_classes.contains(&class)
    }

    fn ensure_unsealed(&self, class: ClassId) -> ModelResult<()> {
        if self.sealed_classes.contains(&class) {
            return Err(ModelError::PermissionDenied {
                message: "cannot modify sealed class permissions".to_string(),
            });
        }
        Ok(())
    }

    // ===== Modules =====

    /// Set module permissions; patterns containing `*` become wildcard rules
    pub fn set_module(&mut self, pattern: &str, permissions: AccessPermission) {
        if pattern.contains('*') {
            self.module_rules.push(ModuleRule {
                pattern: pattern.to_string(),
                permissions,
            });
        } else {
            self.modules.insert(pattern.to_string(), permissions);
        }
    }

    /// Get module permissions (exact match only)
    pub fn module(&self, module: &str) -> Option<AccessPermission> {
        self.modules.get(module).copied()
    }

    /// Get module permissions with pattern matching
    pub fn module_resolved(&self, module: &str) -> Option<AccessPermission> {
        self.modules.get(module).copied().or_else(|| {
            self.module_rules
                .iter()
                .find(|rule| rule.matches(module))
                .map(|rule| rule.permissions)
        })
    }

    /// Clear exact module permissions
    pub fn clear_module(&mut self, module: &str) {
        self.modules.remove(module);
    }

    /// Clear all wildcard rules
    pub fn clear_module_rules(&mut self) {
        self.module_rules.clear();
    }

    // ===== Resolution =====

    /// Resolve permissions for a class in a module
    pub fn resolve(&self, class: Option<ClassId>, module: Option<&str>) -> AccessPermission {
        if let Some(perms) = class.and_then(|c| self.class(c)) {
            return perms;
        }
        if let Some(perms) = module.and_then(|m| self.module_resolved(m)) {
            return perms;
        }
        self.global_default
    }

    /// Check if a specific permission is allowed
    pub fn check_permission(
        &self,
        class: Option<ClassId>,
        module: Option<&str>,
        required: AccessPermission,
    ) -> bool {
        self.resolve(class, module).contains(required)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new()
    }
}

static POLICY: Lazy<RwLock<AccessPolicy>> = Lazy::new(|| RwLock::new(AccessPolicy::new()));

/// Replace the process-wide policy
pub fn install(policy: AccessPolicy) {
    *POLICY.write() = policy;
}

/// Modify the process-wide policy in place
pub fn update<R>(f: impl FnOnce(&mut AccessPolicy) -> R) -> R {
    f(&mut POLICY.write())
}

/// Snapshot of the process-wide policy
pub fn current() -> AccessPolicy {
    POLICY.read().clone()
}

/// Member operation being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reading a field, component or element
    Read,
    /// Writing a field, component or element
    Write,
    /// Calling an accessor method
    Invoke,
}

impl Operation {
    fn required(self, public: bool) -> AccessPermission {
        match (self, public) {
            (Operation::Read, true) => AccessPermission::READ_PUBLIC,
            (Operation::Read, false) => AccessPermission::READ_PRIVATE,
            (Operation::Write, true) => AccessPermission::WRITE_PUBLIC,
            (Operation::Write, false) => AccessPermission::WRITE_PRIVATE,
            (Operation::Invoke, true) => AccessPermission::INVOKE_PUBLIC,
            (Operation::Invoke, false) => AccessPermission::INVOKE_PRIVATE,
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Invoke => "invoke",
        }
    }
}

/// Check a member operation against the process-wide policy
pub fn check(
    operation: Operation,
    class: &ClassDecl,
    member: &str,
    public: bool,
) -> ModelResult<()> {
    let policy = POLICY.read();
    if !policy.has_any_restrictions() {
        return Ok(());
    }
    let required = operation.required(public);
    if policy.check_permission(Some(class.id), Some(&*class.module), required) {
        return Ok(());
    }
    drop(policy);

    warn!(
        class = %class.name,
        module = %class.module,
        member,
        required = %required,
        "access denied by policy"
    );
    Err(ModelError::PermissionDenied {
        message: format!(
            "cannot {} {} member `{}.{}`",
            operation.verb(),
            if public { "public" } else { "non-public" },
            class.name,
            member
        ),
    })
}
