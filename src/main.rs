use std::collections::HashMap;
use std::error::Error;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use staticd::config::Config;
use staticd::handler::AppState;
use staticd::logger;
use staticd::manifest::{
    build_manifest, emit_manifest_source, ClientFileWalk, Manifest,
};
use staticd::serve::StaticEngine;
use staticd::server;

fn main() -> Result<(), Box<dyn Error>> {
    let cfg = Config::load()?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    // Mode is the first process argument; anything beyond that is config.
    let mode = std::env::args().nth(1).unwrap_or_else(|| "serve".to_string());
    match mode.as_str() {
        "build" => runtime.block_on(run_build(&cfg)),
        "serve" => runtime.block_on(run_serve(cfg)),
        other => Err(format!("unknown mode '{other}' (expected build or serve)").into()),
    }
}

/// Scan the output tree and write the manifest artifacts.
async fn run_build(cfg: &Config) -> Result<(), Box<dyn Error>> {
    let base_dir = Path::new(&cfg.assets.base_dir);
    let client_files = ClientFileWalk::new(&base_dir.join("client"))?;
    let prerendered = load_prerendered(base_dir)?;
    let ignores = cfg.assets.compiled_ignores()?;

    let manifest = build_manifest(
        base_dir,
        client_files,
        &prerendered,
        &cfg.assets.immutable_prefix,
        &ignores,
    )
    .await?;

    std::fs::write(
        &cfg.assets.manifest_file,
        serde_json::to_string_pretty(&manifest)?,
    )?;
    logger::log_build_summary(manifest.len(), &cfg.assets.manifest_file);

    if let Some(path) = &cfg.assets.generated_source {
        let mut writer = BufWriter::new(std::fs::File::create(path)?);
        emit_manifest_source(&manifest, &mut writer)?;
        writer.flush()?;
        logger::log_generated_source(path);
    }
    Ok(())
}

/// Load the manifest and serve it until stopped.
async fn run_serve(cfg: Config) -> Result<(), Box<dyn Error>> {
    let json = std::fs::read_to_string(&cfg.assets.manifest_file)?;
    let manifest: Manifest = serde_json::from_str(&json)?;
    logger::log_manifest_loaded(manifest.len(), &cfg.assets.manifest_file);

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr)?;
    logger::log_server_start(&addr, &cfg);

    let engine = StaticEngine::new(manifest, &cfg.assets.base_dir);
    let state = Arc::new(AppState {
        config: cfg,
        engine,
    });
    server::run(listener, state).await
}

/// Optional `prerendered.json` written by the upstream renderer: a mapping
/// from route pathname to the rendered file under `<base>/prerendered/`.
fn load_prerendered(base_dir: &Path) -> Result<HashMap<String, String>, Box<dyn Error>> {
    let path = base_dir.join("prerendered.json");
    if !path.exists() {
        return Ok(HashMap::new());
    }
    Ok(serde_json::from_str(&std::fs::read_to_string(path)?)?)
}
