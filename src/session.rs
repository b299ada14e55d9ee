//! Session state: variables and the working directory.
//!
//! The live state belongs to the executor thread. Running stages only ever
//! see a [`SessionState::snapshot`]; mutations they request are applied by
//! the executor between stages.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Shell session variables and working directory.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    variables: HashMap<String, String>,
    working_dir: PathBuf,
}

/// A mutation requested by a running stage, applied after the stage joins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionUpdate {
    SetVariable(String, String),
    RemoveVariable(String),
    SetWorkingDir(PathBuf),
}

impl SessionState {
    /// New session rooted at the process working directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    /// New session rooted at `working_dir`.
    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            variables: HashMap::new(),
            working_dir: working_dir.into(),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name).map(String::as_str)
    }

    /// Variable expansion value: undefined variables expand to empty.
    #[must_use]
    pub fn expand(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) {
        self.variables.remove(name);
    }

    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn set_working_dir(&mut self, dir: impl Into<PathBuf>) {
        self.working_dir = dir.into();
    }

    /// Resolve a possibly-relative path against the working directory.
    #[must_use]
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let candidate = Path::new(path);
        if candidate.is_absolute() {
            candidate.to_path_buf()
        } else {
            self.working_dir.join(candidate)
        }
    }

    /// Immutable copy handed to pipeline stages at construction.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.clone()
    }

    /// Apply a stage-requested mutation.
    pub fn apply(&mut self, update: SessionUpdate) {
        match update {
            SessionUpdate::SetVariable(name, value) => self.set(name, value),
            SessionUpdate::RemoveVariable(name) => self.remove(&name),
            SessionUpdate::SetWorkingDir(dir) => self.set_working_dir(dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undefined_variables_expand_to_empty() {
        let session = SessionState::with_working_dir("/tmp");
        assert_eq!(session.expand("missing"), "");
    }

    #[test]
    fn set_get_remove() {
        let mut session = SessionState::with_working_dir("/tmp");
        session.set("greeting", "hello");
        assert_eq!(session.get("greeting"), Some("hello"));
        session.remove("greeting");
        assert_eq!(session.get("greeting"), None);
    }

    #[test]
    fn arabic_variable_names() {
        let mut session = SessionState::with_working_dir("/tmp");
        session.set("اسم", "سلام");
        assert_eq!(session.expand("اسم"), "سلام");
    }

    #[test]
    fn resolve_path_respects_absolute() {
        let session = SessionState::with_working_dir("/data");
        assert_eq!(session.resolve_path("x.txt"), PathBuf::from("/data/x.txt"));
        assert_eq!(session.resolve_path("/etc/y"), PathBuf::from("/etc/y"));
    }

    #[test]
    fn apply_updates() {
        let mut session = SessionState::with_working_dir("/tmp");
        session.apply(SessionUpdate::SetVariable("a".into(), "1".into()));
        assert_eq!(session.get("a"), Some("1"));
        session.apply(SessionUpdate::SetWorkingDir(PathBuf::from("/data")));
        assert_eq!(session.working_dir(), Path::new("/data"));
        session.apply(SessionUpdate::RemoveVariable("a".into()));
        assert_eq!(session.get("a"), None);
    }
}
