use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct OfflineCacheManifest {
    schema_version: u32,
    generation: String,
    assets: Vec<String>,
}

fn main() {
    let crate_root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir"));
    let path = crate_root.join("offline_cache.toml");
    println!("cargo:rerun-if-changed={}", path.display());

    let raw = fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
    let manifest: OfflineCacheManifest = toml::from_str(&raw)
        .unwrap_or_else(|err| panic!("failed to parse {}: {err}", path.display()));

    if manifest.schema_version != 1 {
        panic!(
            "manifest schema mismatch in {}: expected 1 found {}",
            path.display(),
            manifest.schema_version
        );
    }
    if manifest.generation.trim().is_empty() {
        panic!("empty cache generation in {}", path.display());
    }
    let mut seen = HashSet::new();
    for asset in &manifest.assets {
        if asset.trim().is_empty() {
            panic!("empty asset identifier in {}", path.display());
        }
        if !seen.insert(asset.as_str()) {
            panic!("duplicate asset `{asset}` in {}", path.display());
        }
    }

    let assets = manifest
        .assets
        .iter()
        .map(|asset| format!("    {asset:?},\n"))
        .collect::<String>();
    let generated = format!(
        "/// Build-time generated name of the current cache generation.\n\
pub const CACHE_GENERATION: &str = {:?};\n\n\
/// Build-time generated asset manifest, in pre-cache order.\n\
pub const ASSET_MANIFEST: &[&str] = &[\n{}];\n",
        manifest.generation, assets
    );

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR"));
    let out_file = out_dir.join("offline_cache_generated.rs");
    fs::write(&out_file, generated)
        .unwrap_or_else(|err| panic!("failed to write {}: {err}", out_file.display()));
}
