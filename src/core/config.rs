//! Host table configuration from YAML

use crate::core::host::{CopyRule, HostConfig, KvmAttachment, LaunchPlatform, NetworkAddress, WorkerSpec};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Host table compiled into the binary
pub const BUILTIN_HOST_TABLE: &str = include_str!("hosts.yaml");

/// Top-level host table document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostTable {
    /// Host entries keyed by hostname
    #[serde(default)]
    pub hosts: BTreeMap<String, HostEntry>,
}

/// One host as written in the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostEntry {
    /// Workers as `[name, index, elevated_install]` triples
    #[serde(default)]
    pub workers: Vec<WorkerEntry>,

    /// Provisioning rules; omitted means the standard set, `null` means none apply
    #[serde(default = "default_copies")]
    pub copies: Option<CopiesEntry>,

    /// Static IP address, omitted when the host has none
    #[serde(default)]
    pub ip: Option<String>,

    /// KVM switch attachment, omitted when the host is not on one
    #[serde(default)]
    pub kvm: Option<KvmEntry>,

    /// Path segments of the automation checkout, `null` when there is none
    #[serde(default)]
    pub automation_root: Option<Vec<String>>,

    /// Launch script flavour
    #[serde(default = "default_launch")]
    pub launch: LaunchPlatform,
}

/// Worker triple: name, index, elevated install
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerEntry(pub String, pub String, pub bool);

/// Copy rules, either a named preset or an explicit list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CopiesEntry {
    Preset(CopiesPreset),
    Rules(Vec<CopyRule>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopiesPreset {
    Standard,
}

/// KVM switch position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvmEntry {
    pub switch: String,
    pub port: String,
}

fn default_copies() -> Option<CopiesEntry> {
    Some(CopiesEntry::Preset(CopiesPreset::Standard))
}

fn default_launch() -> LaunchPlatform {
    LaunchPlatform::Unix
}

impl CopiesEntry {
    fn rules(&self) -> Vec<CopyRule> {
        match self {
            CopiesEntry::Preset(CopiesPreset::Standard) => CopyRule::standard_set(),
            CopiesEntry::Rules(rules) => rules.clone(),
        }
    }
}

impl HostEntry {
    /// Build the domain value for this entry
    pub fn to_host_config(&self, hostname: &str) -> HostConfig {
        HostConfig {
            hostname: hostname.to_string(),
            workers: self
                .workers
                .iter()
                .map(|WorkerEntry(name, index, elevated)| WorkerSpec::new(name, index, *elevated))
                .collect(),
            copies: self.copies.as_ref().map(CopiesEntry::rules),
            network: match &self.ip {
                Some(ip) => NetworkAddress::Static(ip.clone()),
                None => NetworkAddress::NoStatic,
            },
            kvm: match &self.kvm {
                Some(kvm) => KvmAttachment::Attached {
                    switch: kvm.switch.clone(),
                    port: kvm.port.clone(),
                },
                None => KvmAttachment::NotAttached,
            },
            automation_root: self.automation_root.clone(),
            launch_script: self.launch.launch_script(),
        }
    }
}

impl HostTable {
    /// Load a host table from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read host table {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid host table {}", path.display()))
    }

    /// Parse a host table from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let table: HostTable = serde_yaml::from_str(yaml)?;
        table.validate()?;
        Ok(table)
    }

    /// The table shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_HOST_TABLE).context("Built-in host table is invalid")
    }

    /// Validate the host table
    pub fn validate(&self) -> Result<()> {
        for (hostname, entry) in &self.hosts {
            if hostname.trim().is_empty() {
                anyhow::bail!("Host table contains an empty hostname");
            }

            // Worker indices are opaque, only uniqueness is checked
            let mut seen_indices = HashSet::new();
            for WorkerEntry(name, index, _) in &entry.workers {
                if name.trim().is_empty() {
                    anyhow::bail!("Host '{}' declares a worker with an empty name", hostname);
                }
                if !seen_indices.insert(index) {
                    anyhow::bail!(
                        "Host '{}' declares worker index '{}' more than once",
                        hostname,
                        index
                    );
                }
            }

            if let Some(CopiesEntry::Rules(rules)) = &entry.copies {
                for rule in rules {
                    if rule.source.is_empty() || rule.destination.is_empty() {
                        anyhow::bail!(
                            "Host '{}' has a copy rule with an empty source or destination",
                            hostname
                        );
                    }
                }
            }
        }

        Ok(())
    }

    /// Convert every entry to its domain value
    pub fn to_host_configs(&self) -> BTreeMap<String, HostConfig> {
        self.hosts
            .iter()
            .map(|(hostname, entry)| (hostname.clone(), entry.to_host_config(hostname)))
            .collect()
    }
}
