// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::plugin::fake::FakePlugin;

#[test]
fn builtin_registry_has_both_birdnet_plugins() {
    let registry = PluginRegistry::builtin();
    assert!(registry.get("birdnet_default").is_some());
    assert!(registry.get("birdnet_custom").is_some());
    assert!(registry.get("no_such_model").is_none());
}

#[test]
fn later_registration_shadows_earlier() {
    let mut registry = PluginRegistry::empty();
    registry.register(Box::new(FakePlugin {
        name: "fake_model",
        confidence: 0.1,
        with_species_model: false,
    }));
    registry.register(Box::new(FakePlugin {
        name: "fake_model",
        confidence: 0.9,
        with_species_model: true,
    }));
    let plugin = registry.get("fake_model").unwrap();
    // The shadowing plugin carries the species model
    assert!(plugin
        .load_species_predictor(std::path::Path::new("/nonexistent"), &Default::default())
        .is_ok());
}

#[test]
fn names_lists_registered_plugins() {
    let registry = PluginRegistry::builtin();
    let names = registry.names();
    assert_eq!(names, ["birdnet_default", "birdnet_custom"]);
}
