//! # Module Registry
//!
//! Maps module names to their registration. Filled once at startup and
//! handed to the navigator by value.
//!
//! A main module only needs containers for itself and the modules it can
//! reach through `dependencies`. `resolve_submodules` computes that closure.

use std::collections::BTreeMap;

use log::warn;

use crate::core::error::NavError;
use crate::core::module::Module;

pub struct Registration {
    /// Modules this one can open records of.
    pub dependencies: Vec<String>,
    /// Id of the container this module draws into.
    pub grid: String,
    pub icon: String,
    /// Display name.
    pub label: String,
    module: Box<dyn Module>,
}

impl Registration {
    pub fn new(grid: impl Into<String>, module: impl Module + 'static) -> Self {
        let grid = grid.into();
        Self {
            dependencies: Vec::new(),
            label: grid.clone(),
            grid,
            icon: String::new(),
            module: Box::new(module),
        }
    }

    pub fn depends_on<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = modules.into_iter().map(Into::into).collect();
        self
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn module(&self) -> &dyn Module {
        self.module.as_ref()
    }

    pub fn module_mut(&mut self) -> &mut dyn Module {
        self.module.as_mut()
    }
}

#[derive(Default)]
pub struct Registry {
    modules: BTreeMap<String, Registration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, registration: Registration) -> Result<(), NavError> {
        let name = name.into();
        if self.modules.contains_key(&name) {
            return Err(NavError::DuplicateModule(name));
        }
        self.modules.insert(name, registration);
        Ok(())
    }

    /// Builder form of `register`.
    pub fn with(mut self, name: impl Into<String>, registration: Registration) -> Result<Self, NavError> {
        self.register(name, registration)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Registration, NavError> {
        self.modules
            .get(name)
            .ok_or_else(|| NavError::UnknownModule(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Registration, NavError> {
        self.modules
            .get_mut(name)
            .ok_or_else(|| NavError::UnknownModule(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Registration)> {
        self.modules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Depth-first closure of `root` over `dependencies`, root first,
    /// without duplicates. Cycles terminate because an included name is
    /// never expanded twice. Unregistered dependencies are skipped.
    pub fn resolve_submodules(&self, root: &str) -> Vec<String> {
        let mut resolved = Vec::new();
        self.collect(root, &mut resolved);
        resolved
    }

    fn collect(&self, name: &str, resolved: &mut Vec<String>) {
        if resolved.iter().any(|n| n == name) {
            return;
        }
        let Some(registration) = self.modules.get(name) else {
            warn!("registry: '{name}' is not registered, skipping");
            return;
        };
        resolved.push(name.to_string());
        for dependency in &registration.dependencies {
            if dependency != name {
                self.collect(dependency, resolved);
            }
        }
    }
}
