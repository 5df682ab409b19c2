//! Render command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::assets::DirectoryRepository;
use crate::composer::{CardEngine, RenderOptions};
use crate::config::loader::load_config;
use crate::output::{generate_output_path, save_artifact};

use super::{read_request, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the render command
pub fn run_render(
    input: &Path,
    assets: &Path,
    output: Option<&Path>,
    config_path: Option<&Path>,
    correlation_id: &str,
) -> ExitCode {
    let request = match read_request(input) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };
    let engine = match CardEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: Cannot start runtime: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let repo = DirectoryRepository::new(assets);
    let options = RenderOptions::new(correlation_id);
    let result = runtime.block_on(async {
        engine.load(&repo).await.map_err(|e| e.to_string())?;
        engine
            .render(&request.snapshot, &request.profile, &repo, &options)
            .await
            .map_err(|e| e.to_string())
    });

    let artifact = match result {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let path = generate_output_path(input, output, artifact.format);
    if let Err(e) = save_artifact(&artifact, &path) {
        eprintln!("Error: Failed to save '{}': {}", path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    println!(
        "Saved: {} ({}x{}, {} bytes)",
        path.display(),
        artifact.width,
        artifact.height,
        artifact.len()
    );
    ExitCode::from(EXIT_SUCCESS)
}
