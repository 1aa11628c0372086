//! Raya Property Model Engine
//!
//! Uniform, named access to the properties of declared classes:
//! - **Reflect**: class declarations and the process-wide class table (`reflect` module)
//! - **Types**: generic type expressions and ancestor resolution (`types` module)
//! - **Values**: runtime values, instances, containers and holders (`value` module)
//! - **Models**: property discovery, caching and access (`model` module)
//! - **Policy**: deployment access rules and their TOML configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use raya_model::{ClassBuilder, ClassId, FieldDecl, Instance, Model, Value};
//!
//! let person = ClassBuilder::new("Person")
//!     .field(FieldDecl::public("name", ClassId::STRING))
//!     .field(FieldDecl::public("age", ClassId::INT))
//!     .register()?;
//!
//! let model = Model::of(person)?;
//! let value = Value::object(Instance::new(person)?);
//! let age = model.property("age").unwrap();
//! model.set(&value, Some(&age), Value::Int(42))?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Error types
pub mod error;

/// Class metadata and the global class table
pub mod reflect;

/// Generic types and the type resolver
pub mod types;

/// Runtime values
pub mod value;

/// Property models and the model registry
pub mod model;

/// Access policy
pub mod policy;

/// TOML configuration
pub mod config;

pub use config::ModelConfig;
pub use error::{ModelError, ModelResult};
pub use model::{AccessorKind, Model, ModelKind, ModelRegistry, Property};
pub use policy::{AccessPermission, AccessPolicy, Operation};
pub use reflect::{
    Annotation, ClassBuilder, ClassDecl, ClassId, ClassKind, ClassTable, ComponentDecl, FieldDecl,
    MethodDecl, Modifiers,
};
pub use types::{Type, TypeResolver};
pub use value::{Instance, Signal, Value, Variable};
