//! Model registry for selecting propagation models by name.
//!
//! The [`ModelRegistry`] maps configuration strings such as `"freespace"`
//! to factories. Terrain-based models (`"itm"`, `"hybrid"`) need external
//! terrain data and are not bundled; callers that have them register a
//! factory under the same name.

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{PropError, PropResult};
use crate::free_space::FreeSpaceModel;
use crate::model::{ModelConfig, PropagationModel};

/// Names recognised in configuration files.
pub const KNOWN_MODELS: &[&str] = &["freespace", "itm", "hybrid"];

/// Factory function type for models.
type ModelFactory = Box<dyn Fn(ModelConfig) -> PropResult<Box<dyn PropagationModel>> + Send + Sync>;

/// Central registry of propagation models.
pub struct ModelRegistry {
    factories: FxHashMap<String, ModelFactory>,
}

impl ModelRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: FxHashMap::default(),
        }
    }

    /// Create a registry with the bundled models.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_factory(FreeSpaceModel::NAME, |config| {
            Ok(Box::new(FreeSpaceModel::from_config(&config)?))
        });
        registry
    }

    /// Register a model factory.
    pub fn register_factory(
        &mut self,
        name: impl Into<String>,
        factory: impl Fn(ModelConfig) -> PropResult<Box<dyn PropagationModel>> + Send + Sync + 'static,
    ) {
        let name = name.into();
        debug!("Registering propagation model: {}", name);
        self.factories.insert(name, Box::new(factory));
    }

    /// Create a model by name.
    pub fn create(&self, name: &str, config: ModelConfig) -> PropResult<Box<dyn PropagationModel>> {
        if let Some(factory) = self.factories.get(name) {
            return factory(config);
        }

        if KNOWN_MODELS.contains(&name) {
            Err(PropError::ModelUnavailable(format!(
                "'{name}' needs terrain data and no implementation is registered"
            )))
        } else {
            Err(PropError::UnknownModel(format!(
                "'{name}' (known: {})",
                KNOWN_MODELS.join(", ")
            )))
        }
    }

    /// List all registered model names.
    pub fn available_models(&self) -> Vec<String> {
        let mut names: Vec<_> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    /// Check if a model is registered.
    pub fn has_model(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::new();
        assert!(registry.available_models().is_empty());
        assert!(!registry.has_model("freespace"));
    }

    #[test]
    fn test_builtins() {
        let registry = ModelRegistry::with_builtins();
        assert!(registry.has_model("freespace"));
        let model = registry.create("freespace", ModelConfig::new("freespace")).unwrap();
        assert_eq!(model.name(), "freespace");
    }

    #[test]
    fn test_known_but_unregistered() {
        let registry = ModelRegistry::with_builtins();
        let err = registry.create("itm", ModelConfig::new("itm")).err().unwrap();
        assert!(matches!(err, PropError::ModelUnavailable(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn test_create_unknown_model() {
        let registry = ModelRegistry::with_builtins();
        let err = registry.create("okumura", ModelConfig::new("okumura")).err().unwrap();
        assert!(matches!(err, PropError::UnknownModel(_)));
    }

    #[test]
    fn test_register_factory_overrides_known_name() {
        let mut registry = ModelRegistry::with_builtins();
        registry.register_factory("hybrid", |config| {
            Ok(Box::new(FreeSpaceModel::from_config(&config)?))
        });
        assert!(registry.create("hybrid", ModelConfig::new("hybrid")).is_ok());
        assert_eq!(registry.available_models(), vec!["freespace", "hybrid"]);
    }
}
