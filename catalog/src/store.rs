//! Catalog handle: loading, reloading, and navigation.
//!
//! The handle replaces the original design's module-level cached catalog: it
//! is owned by the composition root and passed to callers by reference, with
//! an explicit [`Catalog::reload`] instead of an ambient mutable singleton.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::content::BUILTIN_CATALOG;
use crate::exercise::{Exercise, Module, apply_defaults};

/// Supported catalog file format version.
const CATALOG_VERSION: u32 = 1;

/// On-disk catalog file shape.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    version: u32,
    modules: Vec<Module>,
}

/// Position of an exercise within the curriculum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position<'a> {
    pub module_id: &'a str,
    pub lesson_id: &'a str,
    pub exercise: &'a Exercise,
}

/// Loaded catalog plus the optional file it came from.
#[derive(Debug, Clone)]
pub struct Catalog {
    path: Option<PathBuf>,
    modules: Vec<Module>,
}

impl Catalog {
    /// Catalog with the embedded builtin content.
    pub fn builtin() -> Self {
        let modules =
            parse_catalog(BUILTIN_CATALOG).expect("builtin catalog is valid by construction");
        Catalog {
            path: None,
            modules,
        }
    }

    /// Open a catalog file, falling back to builtin content on any failure.
    ///
    /// The path is remembered so [`Catalog::reload`] can re-read it later.
    pub fn open(path: &Path) -> Self {
        let modules = match load_file(path) {
            Ok(modules) => {
                info!(path = %path.display(), "catalog loaded");
                modules
            }
            Err(err) => {
                warn!(path = %path.display(), err = %err, "catalog unusable, using builtin content");
                Catalog::builtin().modules
            }
        };
        Catalog {
            path: Some(path.to_path_buf()),
            modules,
        }
    }

    /// Re-read the backing file. Keeps current content and returns `false`
    /// when there is no backing file or it fails to load.
    pub fn reload(&mut self) -> bool {
        let Some(path) = self.path.clone() else {
            debug!("reload requested on builtin catalog, nothing to do");
            return false;
        };
        match load_file(&path) {
            Ok(modules) => {
                info!(path = %path.display(), "catalog reloaded");
                self.modules = modules;
                true
            }
            Err(err) => {
                warn!(path = %path.display(), err = %err, "catalog reload failed, keeping current content");
                false
            }
        }
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|module| module.id == module_id)
    }

    /// Locate an exercise by its full position.
    pub fn find(
        &self,
        module_id: &str,
        lesson_id: &str,
        exercise_id: &str,
    ) -> Option<Position<'_>> {
        let module = self.module(module_id)?;
        let lesson = module.lessons.iter().find(|lesson| lesson.id == lesson_id)?;
        let exercise = lesson
            .exercises
            .iter()
            .find(|exercise| exercise.id == exercise_id)?;
        Some(Position {
            module_id: &module.id,
            lesson_id: &lesson.id,
            exercise,
        })
    }

    /// First exercise of a module, if the module exists.
    pub fn first_of_module(&self, module_id: &str) -> Option<Position<'_>> {
        let module = self.module(module_id)?;
        let lesson = module.lessons.first()?;
        let exercise = lesson.exercises.first()?;
        Some(Position {
            module_id: &module.id,
            lesson_id: &lesson.id,
            exercise,
        })
    }

    /// All exercises in curriculum order with their positions.
    pub fn all_exercises(&self) -> Vec<Position<'_>> {
        let mut items = Vec::new();
        for module in &self.modules {
            for lesson in &module.lessons {
                for exercise in &lesson.exercises {
                    items.push(Position {
                        module_id: &module.id,
                        lesson_id: &lesson.id,
                        exercise,
                    });
                }
            }
        }
        items
    }

    /// Position after the given one: next exercise, then the first exercise
    /// of the next lesson, then of the next module. `None` at the end of the
    /// curriculum or when the position does not exist.
    pub fn next_position(
        &self,
        module_id: &str,
        lesson_id: &str,
        exercise_id: &str,
    ) -> Option<(String, String, String)> {
        let mi = self
            .modules
            .iter()
            .position(|module| module.id == module_id)?;
        let module = &self.modules[mi];
        let li = module
            .lessons
            .iter()
            .position(|lesson| lesson.id == lesson_id)?;
        let lesson = &module.lessons[li];
        let ei = lesson
            .exercises
            .iter()
            .position(|exercise| exercise.id == exercise_id)?;

        if let Some(next) = lesson.exercises.get(ei + 1) {
            return Some((module.id.clone(), lesson.id.clone(), next.id.clone()));
        }
        if let Some(next_lesson) = module.lessons.get(li + 1) {
            let next = next_lesson.exercises.first()?;
            return Some((module.id.clone(), next_lesson.id.clone(), next.id.clone()));
        }
        if let Some(next_module) = self.modules.get(mi + 1) {
            let next_lesson = next_module.lessons.first()?;
            let next = next_lesson.exercises.first()?;
            return Some((
                next_module.id.clone(),
                next_lesson.id.clone(),
                next.id.clone(),
            ));
        }
        None
    }
}

fn load_file(path: &Path) -> Result<Vec<Module>> {
    if !path.exists() {
        bail!("catalog not found at {}", path.display());
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read catalog {}", path.display()))?;
    parse_catalog(&contents).with_context(|| format!("parse catalog {}", path.display()))
}

fn parse_catalog(contents: &str) -> Result<Vec<Module>> {
    let file: CatalogFile = serde_json::from_str(contents).context("parse catalog JSON")?;
    if file.version != CATALOG_VERSION {
        bail!(
            "unsupported catalog version {} (expected {})",
            file.version,
            CATALOG_VERSION
        );
    }
    if file.modules.is_empty() {
        bail!("catalog has no modules");
    }
    let mut modules = file.modules;
    for module in &modules {
        module.validate()?;
    }
    apply_defaults(&mut modules);
    Ok(modules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert!(!catalog.modules().is_empty());
        let all = catalog.all_exercises();
        assert!(all.len() >= 6);
        for position in all {
            assert!(!position.exercise.checks.is_empty());
            assert!(position.exercise.hints.len() >= 2);
        }
    }

    #[test]
    fn positions_compare_by_content() {
        let catalog = Catalog::builtin();
        let found = catalog
            .find("module1", "m1_l1", "m1_l1_e1")
            .expect("position exists");
        let first = catalog.all_exercises()[0];
        assert_eq!(found, first);
        let other = catalog
            .find("module1", "m1_l1", "m1_l1_e2")
            .expect("position exists");
        assert_ne!(found, other);
    }

    #[test]
    fn find_locates_exercise() {
        let catalog = Catalog::builtin();
        let position = catalog
            .find("module1", "m1_l1", "m1_l1_e2")
            .expect("position exists");
        assert_eq!(position.exercise.title, "Simple sum");
        assert!(catalog.find("module1", "m1_l1", "missing").is_none());
    }

    #[test]
    fn next_position_walks_boundaries() {
        let catalog = Catalog::builtin();
        // Within a lesson.
        assert_eq!(
            catalog.next_position("module1", "m1_l1", "m1_l1_e1"),
            Some((
                "module1".to_string(),
                "m1_l1".to_string(),
                "m1_l1_e2".to_string()
            ))
        );
        // Across a lesson boundary.
        assert_eq!(
            catalog.next_position("module1", "m1_l1", "m1_l1_e2"),
            Some((
                "module1".to_string(),
                "m1_l2".to_string(),
                "m1_l2_e1".to_string()
            ))
        );
        // Across a module boundary.
        assert_eq!(
            catalog.next_position("module1", "m1_l4", "m1_l4_e1"),
            Some((
                "module2".to_string(),
                "m2_l1".to_string(),
                "m2_l1_e1".to_string()
            ))
        );
        // End of curriculum.
        assert_eq!(catalog.next_position("module2", "m2_l1", "m2_l1_e1"), None);
    }

    #[test]
    fn open_falls_back_on_broken_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("catalog.json");
        fs::write(&path, "{not json").expect("write");
        let catalog = Catalog::open(&path);
        // Builtin content is served instead.
        assert!(catalog.find("module1", "m1_l1", "m1_l1_e1").is_some());
    }

    #[test]
    fn open_rejects_wrong_version() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("catalog.json");
        fs::write(&path, r#"{"version": 2, "modules": []}"#).expect("write");
        let catalog = Catalog::open(&path);
        assert!(!catalog.modules().is_empty(), "falls back to builtin");
    }

    #[test]
    fn reload_picks_up_new_content() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("catalog.json");
        let one_module = r#"{
            "version": 1,
            "modules": [{
                "id": "custom",
                "title": "Custom",
                "lessons": [{
                    "id": "c_l1",
                    "title": "Lesson",
                    "exercises": [{
                        "id": "c_e1",
                        "title": "Ex",
                        "statement": "Do the thing.",
                        "starter_code": "",
                        "checks": [{"type": "output_contains", "expected": "ok"}]
                    }]
                }]
            }]
        }"#;
        fs::write(&path, one_module).expect("write");

        let mut catalog = Catalog::open(&path);
        assert!(catalog.module("custom").is_some());

        fs::write(&path, "{broken").expect("write");
        assert!(!catalog.reload());
        // Previous content is kept on failed reload.
        assert!(catalog.module("custom").is_some());

        fs::write(&path, one_module).expect("write");
        assert!(catalog.reload());
    }

    #[test]
    fn reload_on_builtin_is_a_no_op() {
        let mut catalog = Catalog::builtin();
        assert!(!catalog.reload());
    }
}
