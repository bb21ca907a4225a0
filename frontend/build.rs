use std::{env, fs, io::Write, path::Path, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=LEAFLET_VERSION");

    let version = env::var("LEAFLET_VERSION").unwrap_or_else(|_| "1.9.4".to_string());

    // frontend/static/vendor/leaflet, where `asset!` picks the files up
    let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") else {
        eprintln!("CARGO_MANIFEST_DIR not set; skipping Leaflet download");
        return;
    };
    let leaflet_dir = PathBuf::from(manifest_dir)
        .join("static")
        .join("vendor")
        .join("leaflet");

    if let Err(e) = fs::create_dir_all(&leaflet_dir) {
        eprintln!("Failed to create Leaflet vendor dir {leaflet_dir:?}: {e}");
        return;
    }

    for kind in ["css", "js"] {
        if let Err(e) = download_leaflet_file(&leaflet_dir, &version, kind) {
            eprintln!("Failed to download Leaflet {kind}: {e}");
        }
    }
}

fn download_leaflet_file(
    leaflet_dir: &Path,
    version: &str,
    kind: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let out_path = leaflet_dir.join(format!("leaflet.{kind}"));

    // Already vendored
    if out_path.exists() {
        return Ok(());
    }

    let url = format!("https://unpkg.com/leaflet@{version}/dist/leaflet.{kind}");
    println!("Downloading {url} -> {}", out_path.display());

    let resp = reqwest::blocking::get(&url)?;
    if !resp.status().is_success() {
        return Err(format!("HTTP error: {}", resp.status()).into());
    }

    let bytes = resp.bytes()?;
    let mut file = fs::File::create(&out_path)?;
    file.write_all(&bytes)?;
    file.flush()?;

    Ok(())
}
