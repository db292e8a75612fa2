//! Entity registry
//!
//! Maps entity-type names (case-insensitive) to their capability bundle:
//! translator, destination resource path and verb table. Built once at
//! startup and read-only afterwards, so it is shared without locking.

use std::collections::HashMap;
use std::sync::Arc;

use crate::event::Operation;
use crate::http::HttpMethod;
use crate::translator::{EntityTranslator, StudentTranslator, STUDENT_ENTITY};

/// HTTP verb per CRUD operation. Missing entries fall back to `GET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerbTable {
    pub create: Option<HttpMethod>,
    pub update: Option<HttpMethod>,
    pub delete: Option<HttpMethod>,
}

impl Default for VerbTable {
    fn default() -> Self {
        Self {
            create: Some(HttpMethod::Post),
            update: Some(HttpMethod::Put),
            delete: Some(HttpMethod::Delete),
        }
    }
}

impl VerbTable {
    pub fn verb_for(&self, operation: Operation) -> HttpMethod {
        let verb = match operation {
            Operation::Create => self.create,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        };
        verb.unwrap_or(HttpMethod::Get)
    }
}

/// Everything the router needs to know about one entity type.
#[derive(Debug, Clone)]
pub struct EntityBinding {
    /// Display name (as registered)
    pub name: String,
    /// Destination resource path, e.g. `/users`
    pub resource_path: String,
    pub verbs: VerbTable,
    /// `None` for entities that are recognized but not yet translatable
    pub translator: Option<Arc<dyn EntityTranslator>>,
}

impl EntityBinding {
    /// Binding with a translator.
    pub fn supported(
        resource_path: impl Into<String>,
        translator: Arc<dyn EntityTranslator>,
    ) -> Self {
        Self {
            name: translator.entity_type().to_string(),
            resource_path: normalize_path(resource_path.into()),
            verbs: VerbTable::default(),
            translator: Some(translator),
        }
    }

    /// Binding that resolves an address but has no translator.
    pub fn recognized(name: impl Into<String>, resource_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resource_path: normalize_path(resource_path.into()),
            verbs: VerbTable::default(),
            translator: None,
        }
    }

    /// Override the verb table (builder pattern).
    pub fn with_verbs(mut self, verbs: VerbTable) -> Self {
        self.verbs = verbs;
        self
    }

    pub fn is_supported(&self) -> bool {
        self.translator.is_some()
    }
}

/// Read-only registry of entity bindings.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    bindings: HashMap<String, EntityBinding>,
}

impl EntityRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in bindings: `Student` is translatable,
    /// `Professor`, `Course` and `Book` are recognized only.
    pub fn with_defaults() -> Self {
        Self::new()
            .register(EntityBinding::supported(
                "/users",
                Arc::new(StudentTranslator::new()),
            ))
            .register(EntityBinding::recognized("Professor", "/professors"))
            .register(EntityBinding::recognized("Course", "/courses"))
            .register(EntityBinding::recognized("Book", "/books"))
    }

    /// Add or replace a binding (builder pattern).
    pub fn register(mut self, binding: EntityBinding) -> Self {
        self.bindings.insert(binding.name.to_lowercase(), binding);
        self
    }

    /// Replace the resource path of a registered entity, or register it as
    /// recognized-only when unknown.
    pub fn with_resource_path(mut self, entity: &str, path: impl Into<String>) -> Self {
        let path = normalize_path(path.into());
        if let Some(binding) = self.bindings.get_mut(&entity.trim().to_lowercase()) {
            binding.resource_path = path;
            return self;
        }
        self.register(EntityBinding::recognized(entity.trim(), path))
    }

    /// Case-insensitive lookup.
    pub fn get(&self, entity: &str) -> Option<&EntityBinding> {
        self.bindings.get(&entity.trim().to_lowercase())
    }

    /// Destination resource path. Unregistered entities get `/<entity>s`.
    pub fn resource_path(&self, entity: &str) -> String {
        match self.get(entity) {
            Some(binding) => binding.resource_path.clone(),
            None => format!("/{}s", entity.trim().to_lowercase()),
        }
    }

    pub fn student_binding(&self) -> Option<&EntityBinding> {
        self.get(STUDENT_ENTITY)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered names, sorted
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.values().map(|b| b.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}

fn normalize_path(path: String) -> String {
    let trimmed = path.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_verbs() {
        let verbs = VerbTable::default();
        assert_eq!(verbs.verb_for(Operation::Create), HttpMethod::Post);
        assert_eq!(verbs.verb_for(Operation::Update), HttpMethod::Put);
        assert_eq!(verbs.verb_for(Operation::Delete), HttpMethod::Delete);
    }

    #[test]
    fn test_missing_verb_falls_back_to_get() {
        let verbs = VerbTable {
            create: Some(HttpMethod::Post),
            update: None,
            delete: None,
        };
        assert_eq!(verbs.verb_for(Operation::Update), HttpMethod::Get);
        assert_eq!(verbs.verb_for(Operation::Delete), HttpMethod::Get);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry = EntityRegistry::with_defaults();
        assert!(registry.get("student").is_some());
        assert!(registry.get("STUDENT").is_some());
        assert!(registry.get(" Student ").is_some());
        assert!(registry.get("Janitor").is_none());
    }

    #[test]
    fn test_default_bindings() {
        let registry = EntityRegistry::with_defaults();
        assert_eq!(registry.len(), 4);
        assert!(registry.student_binding().unwrap().is_supported());
        assert!(!registry.get("Professor").unwrap().is_supported());
        assert_eq!(
            registry.entity_names(),
            vec!["Book", "Course", "Professor", "Student"]
        );
    }

    #[test]
    fn test_resource_paths() {
        let registry = EntityRegistry::with_defaults();
        assert_eq!(registry.resource_path("Student"), "/users");
        assert_eq!(registry.resource_path("course"), "/courses");
        assert_eq!(registry.resource_path("Classroom"), "/classrooms");
    }

    #[test]
    fn test_with_resource_path_overrides_and_registers() {
        let registry = EntityRegistry::with_defaults()
            .with_resource_path("student", "members")
            .with_resource_path("Room", "/rooms-v2");

        assert_eq!(registry.resource_path("Student"), "/members");
        assert!(registry.get("student").unwrap().is_supported());
        assert_eq!(registry.resource_path("room"), "/rooms-v2");
        assert!(!registry.get("room").unwrap().is_supported());
    }
}
