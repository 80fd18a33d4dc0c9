// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use anyhow::{Context, Result};
use tessera_io::{scan_project, AssetDatabase, DatabaseConfig, ImportError, ScanReport};

use crate::helpers::*;

/// Registers every asset below the project's source directories.
pub fn scan(project: &Path) -> Result<()> {
    print_task_start("Scanning Assets", MAGNIFIER, CYAN);
    let (_, report) = open(project)?;
    print_report(&report);
    if report.is_clean() {
        print_success(&format!("{} assets registered", report.registered.len()));
    }
    Ok(())
}

/// Imports every registered asset and fails if any import fails.
pub fn check(project: &Path) -> Result<()> {
    print_task_start("Checking Assets", TEST_TUBE, GREEN);
    let (db, report) = open(project)?;
    print_report(&report);

    let mut imported = 0;
    let mut failures = Vec::new();
    for path in &report.registered {
        let importer = db.importer_at_path(path)?;
        if importer.strategy_name().is_none() {
            log::debug!("Skipping '{}': no importer for this kind of file", path);
            continue;
        }
        match importer.import(&db) {
            Ok(()) => imported += 1,
            Err(err) => {
                print_error(&err.to_string());
                failures.push(path.clone());
            }
        }
    }

    if failures.is_empty() {
        print_success(&format!("{} assets imported cleanly", imported));
        Ok(())
    } else {
        anyhow::bail!(
            "{} of {} assets failed to import",
            failures.len(),
            imported + failures.len()
        );
    }
}

/// Writes every writable asset back in canonical form.
pub fn resave(project: &Path) -> Result<()> {
    print_task_start("Resaving Assets", BRUSH, MAGENTA);
    let (db, report) = open(project)?;
    print_report(&report);

    let mut saved = 0;
    for path in &report.registered {
        match db.save_and_reimport(path) {
            Ok(()) => saved += 1,
            Err(tessera_io::AssetError::Import(
                ImportError::ReadOnly(_) | ImportError::Unsupported(_),
            )) => log::debug!("Skipping read-only '{}'", path),
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to resave '{}'", path));
            }
        }
    }

    print_success(&format!("Resaved {} assets", saved));
    Ok(())
}

fn open(project: &Path) -> Result<(AssetDatabase, ScanReport)> {
    let config = DatabaseConfig::load_from_project(project).with_context(|| {
        format!(
            "Failed to load project configuration from '{}'",
            project.display()
        )
    })?;
    print_info(&format!(
        "Project root '{}', sources {:?}",
        config.project_root.display(),
        config.source_directories
    ));
    let db = AssetDatabase::new(config);
    let report = scan_project(&db);
    Ok((db, report))
}

fn print_report(report: &ScanReport) {
    println!(
        "{}🔎 Found:{} {} registered assets.",
        BOLD,
        RESET,
        report.registered.len()
    );
    for path in &report.missing_meta {
        print_warning(&format!("{}: no .meta sidecar", path));
    }
    for (path, err) in &report.invalid_meta {
        print_error(&format!("{}: {}", path, err));
    }
    if !report.is_clean() {
        println!(
            "{}{}{} paths left unregistered.{}",
            BOLD,
            BLUE,
            report.missing_meta.len() + report.invalid_meta.len(),
            RESET
        );
    }
}
