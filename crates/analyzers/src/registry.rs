// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build-time plugin registry, resolved by model name.

use crate::builtin::{BirdnetCustom, BirdnetDefault};
use crate::plugin::AnalyzerPlugin;

pub struct PluginRegistry {
    plugins: Vec<Box<dyn AnalyzerPlugin>>,
}

impl PluginRegistry {
    /// Registry with the built-in analyzers.
    pub fn builtin() -> Self {
        Self {
            plugins: vec![Box::new(BirdnetDefault), Box::new(BirdnetCustom)],
        }
    }

    /// Empty registry; callers register plugins themselves.
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Register a plugin. A later registration shadows an earlier one
    /// with the same name.
    pub fn register(&mut self, plugin: Box<dyn AnalyzerPlugin>) {
        self.plugins.push(plugin);
    }

    pub fn get(&self, name: &str) -> Option<&dyn AnalyzerPlugin> {
        self.plugins
            .iter()
            .rev()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
