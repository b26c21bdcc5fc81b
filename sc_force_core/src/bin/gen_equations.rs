//! Generate EQUATIONS.md from the equation registry.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin gen-equations
//! ```
//!
//! Run from the workspace root; the file is written to
//! `sc_force_core/src/equations/EQUATIONS.md`.

use std::fs;
use std::path::Path;

use sc_force_core::equations::{generate_equations_markdown, ALL_EQUATIONS};

fn main() {
    let markdown = generate_equations_markdown();
    let output_path = Path::new("sc_force_core/src/equations/EQUATIONS.md");

    match fs::write(output_path, &markdown) {
        Ok(()) => {
            println!(
                "Wrote {} equations ({} bytes) to {}",
                ALL_EQUATIONS.len(),
                markdown.len(),
                output_path.display()
            );
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", output_path.display(), e);
            std::process::exit(1);
        }
    }
}
