//! Plan command: print the canvas geometry without fetching anything

use std::path::Path;
use std::process::ExitCode;

use crate::plan::CanvasPlanner;

use super::{read_request, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the plan command
pub fn run_plan(input: &Path) -> ExitCode {
    let request = match read_request(input) {
        Ok(r) => r,
        Err(code) => return code,
    };

    let snapshot = &request.snapshot;
    let plan = match CanvasPlanner::new(snapshot.mode.profile()).plan(snapshot) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match serde_json::to_string_pretty(&plan) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
