//! Check loader for a directory of definition documents
//!
//! - One document per check
//! - Files are visited in file-name order so load results are reproducible
//! - A document that fails to read, parse or compile is rejected on its own;
//!   the rest of the directory still loads

use std::fs;
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};
use crate::planner::{compile, CompiledCheck};

use super::errors::{CompileError, CompileResult};
use super::parser::parse_check;

/// Default extension of definition documents
pub const DEFAULT_EXTENSION: &str = "xml";

/// A document that failed to load
#[derive(Debug, Clone)]
pub struct RejectedCheck {
    /// Where the document came from
    pub origin: String,
    pub error: CompileError,
}

/// Loads and compiles check definitions, keeping the ones that compile.
pub struct CheckLoader {
    /// Directory containing definition documents
    checks_dir: PathBuf,
    /// Extension of definition documents, without the dot
    extension: String,
    /// Compiled checks in load order
    checks: Vec<CompiledCheck>,
    /// Origin of each entry in `checks`
    origins: Vec<String>,
    /// Documents that failed, in load order
    rejected: Vec<RejectedCheck>,
}

impl CheckLoader {
    /// Creates a loader for `checks_dir`
    pub fn new(checks_dir: &Path) -> Self {
        Self {
            checks_dir: checks_dir.to_path_buf(),
            extension: DEFAULT_EXTENSION.to_string(),
            checks: Vec::new(),
            origins: Vec::new(),
            rejected: Vec::new(),
        }
    }

    /// Sets the extension of definition documents
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Returns the checks directory
    pub fn checks_dir(&self) -> &Path {
        &self.checks_dir
    }

    /// Loads every definition document in the checks directory.
    ///
    /// Only a directory that cannot be listed is an error; individual
    /// documents end up in [`CheckLoader::rejected`]. Each call starts from
    /// an empty loader, so a rescan sees the directory as it is now.
    pub fn load_all(&mut self) -> CompileResult<()> {
        self.checks.clear();
        self.origins.clear();
        self.rejected.clear();

        log_event_with_fields(
            Event::ChecksLoadBegin,
            &[("dir", &self.checks_dir.display().to_string())],
        );

        let entries = fs::read_dir(&self.checks_dir).map_err(|e| {
            CompileError::malformed_document(format!(
                "Failed to read checks directory {}: {}",
                self.checks_dir.display(),
                e
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                CompileError::malformed_document(format!(
                    "Failed to read directory entry: {}",
                    e
                ))
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == self.extension.as_str())
            {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            // Rejections are recorded by load_file
            let _ = self.load_file(&path);
        }

        log_event_with_fields(
            Event::ChecksLoadComplete,
            &[
                ("loaded", &self.checks.len().to_string()),
                ("rejected", &self.rejected.len().to_string()),
            ],
        );
        Ok(())
    }

    /// Loads a single definition file
    pub fn load_file(&mut self, path: &Path) -> CompileResult<&CompiledCheck> {
        let origin = path.display().to_string();
        match fs::read_to_string(path) {
            Ok(text) => self.load_str(&origin, &text),
            Err(e) => {
                let err =
                    CompileError::malformed_document(format!("Failed to read file: {}", e));
                Err(self.reject(origin, err))
            }
        }
    }

    /// Parses and compiles one document. `origin` names it in logs and reports.
    pub fn load_str(&mut self, origin: &str, text: &str) -> CompileResult<&CompiledCheck> {
        let compiled = match Self::compile_document(text) {
            Ok(compiled) => compiled,
            Err(e) => return Err(self.reject(origin.to_string(), e)),
        };

        if self.get(compiled.id()).is_some() {
            let err = CompileError::duplicate_check(compiled.id());
            return Err(self.reject(origin.to_string(), err));
        }

        log_event_with_fields(
            Event::CheckCompiled,
            &[
                ("check", compiled.id()),
                ("stages", &compiled.plan.len().to_string()),
                ("statements", &compiled.statements.len().to_string()),
            ],
        );
        log_event_with_fields(
            Event::CheckLoaded,
            &[("check", compiled.id()), ("origin", origin)],
        );

        self.checks.push(compiled);
        self.origins.push(origin.to_string());
        let idx = self.checks.len() - 1;
        Ok(&self.checks[idx])
    }

    /// Compiles one document without recording or logging it.
    ///
    /// A document this loader already saw yields its recorded outcome. Any
    /// other document is a duplicate only if a loaded check holds its class id.
    pub fn inspect_file(&self, path: &Path) -> CompileResult<CompiledCheck> {
        if let Some(idx) = self.origins.iter().position(|o| same_file(o, path)) {
            return Ok(self.checks[idx].clone());
        }
        if let Some(rejected) = self.rejected.iter().find(|r| same_file(&r.origin, path)) {
            return Err(rejected.error.clone());
        }

        let text = fs::read_to_string(path).map_err(|e| {
            CompileError::malformed_document(format!("Failed to read file: {}", e))
        })?;
        let compiled = Self::compile_document(&text)?;
        if self.get(compiled.id()).is_some() {
            return Err(CompileError::duplicate_check(compiled.id()));
        }
        Ok(compiled)
    }

    fn compile_document(text: &str) -> CompileResult<CompiledCheck> {
        let definition = parse_check(text)?;
        compile(&definition)
    }

    fn reject(&mut self, origin: String, error: CompileError) -> CompileError {
        let mut fields = vec![
            ("origin", origin.as_str()),
            ("code", error.code().code()),
            ("reason", error.message()),
        ];
        if let Some(stage) = error.stage() {
            fields.push(("stage", stage));
        }
        log_event_with_fields(Event::CheckRejected, &fields);

        self.rejected.push(RejectedCheck {
            origin,
            error: error.clone(),
        });
        error
    }

    /// Gets a loaded check by class id
    pub fn get(&self, check_id: &str) -> Option<&CompiledCheck> {
        self.checks.iter().find(|c| c.id() == check_id)
    }

    /// Returns all loaded checks, in load order
    pub fn checks(&self) -> &[CompiledCheck] {
        &self.checks
    }

    /// Returns all rejected documents, in load order
    pub fn rejected(&self) -> &[RejectedCheck] {
        &self.rejected
    }

    /// Returns the rejection for a document origin, if it was rejected
    pub fn rejection(&self, origin: &str) -> Option<&RejectedCheck> {
        self.rejected.iter().find(|r| r.origin == origin)
    }

    /// Origin of a loaded check
    pub fn origin(&self, check_id: &str) -> Option<&str> {
        self.checks
            .iter()
            .position(|c| c.id() == check_id)
            .map(|idx| self.origins[idx].as_str())
    }

    /// Returns the number of loaded checks
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }
}

fn same_file(origin: &str, path: &Path) -> bool {
    match (fs::canonicalize(origin), fs::canonicalize(path)) {
        (Ok(a), Ok(b)) => a == b,
        _ => Path::new(origin) == path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::CompileErrorCode;
    use tempfile::TempDir;

    fn document(id: &str, sink_from: &str) -> String {
        format!(
            "<analyser>
               <class><id>{}</id><item>9000</item><level>2</level><title>t</title></class>
               <requests>
                 <request>
                   <name>named</name><obj>node</obj><geom>point</geom><from>{}</from>
                   <filter><has_tag>name</has_tag></filter>
                 </request>
               </requests>
             </analyser>",
            id, sink_from
        )
    }

    #[test]
    fn test_load_str_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = CheckLoader::new(temp_dir.path());

        loader.load_str("inline", &document("1", "nodes")).unwrap();

        assert_eq!(loader.check_count(), 1);
        assert!(loader.get("1").is_some());
        assert!(loader.get("2").is_none());
    }

    #[test]
    fn test_duplicate_check_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = CheckLoader::new(temp_dir.path());

        loader.load_str("a", &document("1", "nodes")).unwrap();
        let err = loader.load_str("b", &document("1", "nodes")).unwrap_err();

        assert_eq!(err.code(), CompileErrorCode::DuplicateCheck);
        assert_eq!(loader.check_count(), 1);
        assert_eq!(loader.rejected().len(), 1);
        assert_eq!(loader.rejected()[0].origin, "b");
    }

    #[test]
    fn test_load_all_skips_bad_documents() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.xml"), document("1", "nodes")).unwrap();
        fs::write(temp_dir.path().join("b.xml"), document("2", "nowhere")).unwrap();
        fs::write(temp_dir.path().join("c.xml"), document("3", "ways_bbox")).unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "not a check").unwrap();

        let mut loader = CheckLoader::new(temp_dir.path());
        loader.load_all().unwrap();

        let ids: Vec<&str> = loader.checks().iter().map(|c| c.id()).collect();
        assert_eq!(ids, ["1", "3"]);
        assert_eq!(loader.rejected().len(), 1);
        assert_eq!(
            loader.rejected()[0].error.code(),
            CompileErrorCode::UnknownStageReference
        );
        assert!(loader.rejected()[0].origin.ends_with("b.xml"));
    }

    #[test]
    fn test_custom_extension() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.xml"), document("1", "nodes")).unwrap();
        fs::write(temp_dir.path().join("b.check"), document("2", "nodes")).unwrap();

        let mut loader = CheckLoader::new(temp_dir.path()).with_extension("check");
        loader.load_all().unwrap();

        assert_eq!(loader.check_count(), 1);
        assert!(loader.get("2").is_some());
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut loader = CheckLoader::new(&temp_dir.path().join("absent"));
        assert!(loader.load_all().is_err());
    }

    #[test]
    fn test_load_all_twice_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("a.xml"), document("1", "nodes")).unwrap();
        fs::write(temp_dir.path().join("b.xml"), document("2", "nowhere")).unwrap();

        let mut loader = CheckLoader::new(temp_dir.path());
        loader.load_all().unwrap();
        loader.load_all().unwrap();

        assert_eq!(loader.check_count(), 1);
        assert_eq!(loader.rejected().len(), 1);
        assert_eq!(
            loader.rejected()[0].error.code(),
            CompileErrorCode::UnknownStageReference
        );
    }

    #[test]
    fn test_inspect_loaded_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.xml");
        fs::write(&path, document("1", "nodes")).unwrap();

        let mut loader = CheckLoader::new(temp_dir.path());
        loader.load_all().unwrap();

        let compiled = loader.inspect_file(&path).unwrap();
        assert_eq!(compiled.id(), "1");
        assert!(loader.rejected().is_empty());
        assert_eq!(loader.check_count(), 1);

        // Same file through a different spelling of the path
        let dotted = temp_dir.path().join(".").join("a.xml");
        assert_eq!(loader.inspect_file(&dotted).unwrap().id(), "1");
    }

    #[test]
    fn test_inspect_rejected_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.xml");
        fs::write(&path, document("1", "nowhere")).unwrap();

        let mut loader = CheckLoader::new(temp_dir.path());
        loader.load_all().unwrap();

        let err = loader.inspect_file(&path).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::UnknownStageReference);
        assert_eq!(loader.rejected().len(), 1);
    }

    #[test]
    fn test_inspect_outside_document() {
        let checks_dir = TempDir::new().unwrap();
        let other_dir = TempDir::new().unwrap();
        fs::write(checks_dir.path().join("a.xml"), document("1", "nodes")).unwrap();
        let taken = other_dir.path().join("taken.xml");
        let fresh = other_dir.path().join("fresh.xml");
        fs::write(&taken, document("1", "nodes")).unwrap();
        fs::write(&fresh, document("2", "nodes")).unwrap();

        let mut loader = CheckLoader::new(checks_dir.path());
        loader.load_all().unwrap();

        let err = loader.inspect_file(&taken).unwrap_err();
        assert_eq!(err.code(), CompileErrorCode::DuplicateCheck);
        assert_eq!(loader.inspect_file(&fresh).unwrap().id(), "2");
        assert_eq!(loader.check_count(), 1);
        assert!(loader.rejected().is_empty());
    }
}
