// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Model bundle fixtures for tests across the workspace.

use std::path::{Path, PathBuf};

/// Default label set used by bundle fixtures.
pub const BUNDLE_LABELS: &str = "\
Turdus merula_Common Blackbird
Erithacus rubecula_European Robin
Apus apus_Common Swift
";

/// Presence table matching [`BUNDLE_LABELS`]; the swift scores below
/// the default presence threshold.
pub const BUNDLE_PRESENCE: &str = "\
0.9 Turdus merula_Common Blackbird
0.4 Erithacus rubecula_European Robin
0.01 Apus apus_Common Swift
";

/// Write a complete model bundle under `model_dir/name` and return its path.
///
/// The bundle carries `preprocessor.cfg`, `model.cfg`, `labels.txt`,
/// and, when `with_species_model` is set, `species_presence_model`.
pub fn write_model_bundle(model_dir: &Path, name: &str, with_species_model: bool) -> PathBuf {
    let bundle = model_dir.join(name);
    std::fs::create_dir_all(&bundle).unwrap_or_else(|e| panic_with(&bundle, &e.to_string()));
    write(&bundle, "preprocessor.cfg", "sample_rate: 4\nsig_length: 1.0\noverlap: 0.0\n");
    write(&bundle, "model.cfg", "sensitivity: 1.0\ndefault_threshold: 0.1\n");
    write(&bundle, "labels.txt", BUNDLE_LABELS);
    if with_species_model {
        write(&bundle, "species_presence_model", BUNDLE_PRESENCE);
    }
    bundle
}

/// Write a loud 16-bit PCM recording of `samples` samples.
pub fn write_recording(path: &Path, samples: usize) -> PathBuf {
    let bytes: Vec<u8> = std::iter::repeat(24_000i16.to_le_bytes())
        .take(samples)
        .flatten()
        .collect();
    std::fs::write(path, bytes).unwrap_or_else(|e| panic_with(path, &e.to_string()));
    path.to_path_buf()
}

fn write(bundle: &Path, file: &str, contents: &str) {
    let path = bundle.join(file);
    std::fs::write(&path, contents).unwrap_or_else(|e| panic_with(&path, &e.to_string()));
}

#[allow(clippy::panic)]
fn panic_with(path: &Path, err: &str) -> ! {
    panic!("fixture write failed at {}: {err}", path.display())
}
