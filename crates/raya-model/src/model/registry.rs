//! Global registry of built models

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::{debug, trace};

use crate::error::ModelResult;
use crate::types::Type;

use super::{builder, Model};

static MODELS: Lazy<ModelRegistry> = Lazy::new(ModelRegistry::new);

/// Process-wide cache of models keyed by finalized type
///
/// Models are built outside of any map lock, so two threads may build the
/// same model concurrently. Only the first one published is kept; every
/// caller receives that instance. Failed builds are not cached.
pub struct ModelRegistry {
    /// Map of type to published model
    models: DashMap<Type, Arc<Model>>,
}

impl ModelRegistry {
    fn new() -> Self {
        Self {
            models: DashMap::new(),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static ModelRegistry {
        &MODELS
    }

    /// Published model of a type, if any
    pub fn get(&self, ty: &Type) -> Option<Arc<Model>> {
        self.models.get(ty).map(|entry| entry.clone())
    }

    /// Whether a model of the type has been published
    pub fn contains(&self, ty: &Type) -> bool {
        self.models.contains_key(ty)
    }

    /// Number of published models
    pub fn count(&self) -> usize {
        self.models.len()
    }

    /// Model of a finalized type, building and publishing it if absent
    pub(crate) fn get_or_build(&self, ty: &Type) -> ModelResult<Arc<Model>> {
        if let Some(model) = self.get(ty) {
            return Ok(model);
        }

        let built = Arc::new(builder::build(ty)?);
        match self.models.entry(ty.clone()) {
            Entry::Occupied(entry) => {
                trace!(ty = %ty, "discarding concurrently built model");
                Ok(entry.get().clone())
            }
            Entry::Vacant(entry) => {
                debug!(
                    ty = %ty,
                    properties = built.properties().len(),
                    "model published"
                );
                Ok(entry.insert(built).clone())
            }
        }
    }
}
