//! In-memory stand-in for the host's package manager and account database.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tci_core::install::HostOps;

#[derive(Default)]
pub struct RecordingHost {
    calls: Mutex<Vec<String>>,
    owners: Mutex<HashMap<PathBuf, String>>,
    groups: Mutex<HashMap<PathBuf, String>>,
}

impl RecordingHost {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl HostOps for RecordingHost {
    fn ensure_package(&self, package: &str, _binary: &str) -> Result<bool> {
        self.log(format!("package {package}"));
        Ok(false)
    }

    fn ensure_group(&self, group: &str) -> Result<bool> {
        self.log(format!("group {group}"));
        Ok(true)
    }

    fn ensure_user(&self, user: &str, group: &str) -> Result<bool> {
        self.log(format!("user {user} {group}"));
        Ok(true)
    }

    fn owner_of(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.owners.lock().unwrap().get(path).cloned())
    }

    fn group_of(&self, path: &Path) -> Result<Option<String>> {
        Ok(self.groups.lock().unwrap().get(path).cloned())
    }

    fn chown_recursive(&self, path: &Path, user: &str, group: &str) -> Result<()> {
        self.log(format!("chown -R {user}:{group} {}", path.display()));
        self.owners
            .lock()
            .unwrap()
            .insert(path.join("LICENSE"), user.to_string());
        self.groups
            .lock()
            .unwrap()
            .insert(path.join("LICENSE"), group.to_string());
        Ok(())
    }

    fn chown(&self, path: &Path, user: &str, group: &str) -> Result<()> {
        self.log(format!("chown {user}:{group} {}", path.display()));
        self.owners
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), user.to_string());
        self.groups
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), group.to_string());
        Ok(())
    }
}
