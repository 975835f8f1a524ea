//! Host registry - hostname to topology lookup

use crate::core::config::HostTable;
use crate::core::host::{
    CopyRule, HostConfig, KvmAttachment, LaunchPlatform, NetworkAddress, WorkerSpec,
    DEFAULT_WORKER_INDEX,
};
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

/// Immutable mapping from hostname to host configuration.
///
/// Built once by one of the constructors and shared read-only afterwards.
/// [`HostRegistry::resolve`] is total: hosts missing from the table get a
/// synthesized configuration describing the local machine.
#[derive(Debug, Clone)]
pub struct HostRegistry {
    hosts: BTreeMap<String, HostConfig>,

    /// Automation root used for synthesized hosts
    local_root: Vec<String>,

    /// Launch flavour used for synthesized hosts
    local_platform: LaunchPlatform,
}

impl HostRegistry {
    /// Registry over the built-in host table, with defaults for this machine
    pub fn builtin() -> Result<Self> {
        Ok(Self::from_table(HostTable::builtin()?))
    }

    /// Registry over a host table file, with defaults for this machine
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_table(HostTable::from_file(path)?))
    }

    /// Registry over an already validated table.
    ///
    /// Unknown hosts report the current directory as their automation root.
    pub fn from_table(table: HostTable) -> Self {
        let root = std::env::current_dir().unwrap_or_else(|e| {
            warn!("Failed to determine current directory, using '.': {}", e);
            PathBuf::from(".")
        });
        Self {
            hosts: table.to_host_configs(),
            local_root: path_segments(&root),
            local_platform: LaunchPlatform::current(),
        }
    }

    /// Set the automation root reported for unknown hosts
    pub fn with_local_root(mut self, root: &Path) -> Self {
        self.local_root = path_segments(root);
        self
    }

    /// Set the launch flavour reported for unknown hosts
    pub fn with_local_platform(mut self, platform: LaunchPlatform) -> Self {
        self.local_platform = platform;
        self
    }

    /// Resolve a hostname, synthesizing a configuration when it is unknown
    pub fn resolve(&self, hostname: &str) -> HostConfig {
        match self.hosts.get(hostname) {
            Some(host) => host.clone(),
            None => {
                debug!("Host {} not in registry, using default configuration", hostname);
                self.default_host_config(hostname)
            }
        }
    }

    /// Configuration for a host that is not in the table
    pub fn default_host_config(&self, hostname: &str) -> HostConfig {
        HostConfig {
            hostname: hostname.to_string(),
            workers: vec![WorkerSpec::new(hostname, DEFAULT_WORKER_INDEX, true)],
            copies: Some(CopyRule::standard_set()),
            network: NetworkAddress::Unknown,
            kvm: KvmAttachment::Unknown,
            automation_root: Some(self.local_root.clone()),
            launch_script: self.local_platform.launch_script(),
        }
    }

    pub fn get(&self, hostname: &str) -> Option<&HostConfig> {
        self.hosts.get(hostname)
    }

    pub fn is_known(&self, hostname: &str) -> bool {
        self.hosts.contains_key(hostname)
    }

    /// Known hostnames in sorted order
    pub fn hostnames(&self) -> impl Iterator<Item = &str> {
        self.hosts.keys().map(String::as_str)
    }

    /// All known hosts in hostname order
    pub fn hosts(&self) -> impl Iterator<Item = &HostConfig> {
        self.hosts.values()
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Find which known host carries the named worker
    pub fn find_worker(&self, worker_name: &str) -> Option<(&HostConfig, &WorkerSpec)> {
        self.hosts
            .values()
            .find_map(|host| host.worker(worker_name).map(|worker| (host, worker)))
    }

    /// Dump the known hosts as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.hosts)?)
    }

    /// Dump the known hosts as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.hosts)?)
    }
}

fn path_segments(path: &Path) -> Vec<String> {
    path.components()
        .map(|component| match component {
            Component::RootDir => String::new(),
            other => other.as_os_str().to_string_lossy().into_owned(),
        })
        .collect()
}
