//! Environment-derived configuration, rendered for debugging.
//!
//! Each preset lists the variables one subsystem reads, with the default it
//! falls back to. Values are read at snapshot time so the endpoint always
//! reflects the live process environment.

use std::collections::BTreeMap;
use serde_json::Value;

use crate::snapshot::SnapshotProvider;

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// How a variable is parsed, with its fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvSetting {
    /// "true"/"false", case-insensitive.
    Bool(bool),
    Int(i64),
    Text(&'static str),
    /// Comma separated, blanks dropped. Defaults to empty.
    List,
}

impl EnvSetting {
    fn resolve(&self, raw: Option<String>) -> Value {
        let raw = raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        match (self, raw) {
            (EnvSetting::Bool(default), raw) => {
                let parsed = raw.and_then(|v| match v.to_ascii_lowercase().as_str() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                });
                Value::Bool(parsed.unwrap_or(*default))
            }
            (EnvSetting::Int(default), raw) => {
                Value::from(raw.and_then(|v| v.parse::<i64>().ok()).unwrap_or(*default))
            }
            (EnvSetting::Text(default), raw) => {
                Value::String(raw.unwrap_or_else(|| default.to_string()))
            }
            (EnvSetting::List, raw) => Value::Array(
                raw.unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|item| !item.is_empty())
                    .map(|item| Value::String(item.to_string()))
                    .collect(),
            ),
        }
    }
}

/// A fixed set of environment variables read on every snapshot.
pub struct EnvSettings {
    settings: Vec<(&'static str, EnvSetting)>,
    lookup: Lookup,
}

impl EnvSettings {
    /// Settings read from the process environment.
    pub fn new(settings: Vec<(&'static str, EnvSetting)>) -> Self {
        Self {
            settings,
            lookup: Box::new(|name: &str| std::env::var(name).ok()),
        }
    }

    /// Replace the variable source, e.g. with a fixed map in tests.
    pub fn with_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.lookup = Box::new(lookup);
        self
    }

    /// Variables consumed by the host networking setup (SNAT, MTU, veth).
    pub fn networkutils() -> Self {
        Self::new(vec![
            ("AWS_VPC_K8S_CNI_EXTERNALSNAT", EnvSetting::Bool(false)),
            ("AWS_VPC_K8S_CNI_EXCLUDE_SNAT_CIDRS", EnvSetting::List),
            ("AWS_VPC_K8S_CNI_RANDOMIZESNAT", EnvSetting::Text("prng")),
            ("AWS_VPC_K8S_CNI_CONNMARK", EnvSetting::Int(0x80)),
            ("AWS_VPC_K8S_CNI_VETHPREFIX", EnvSetting::Text("eni")),
            ("AWS_VPC_ENI_MTU", EnvSetting::Int(9001)),
            ("AWS_VPC_CNI_NODE_PORT_SUPPORT", EnvSetting::Bool(true)),
        ])
    }

    /// Variables consumed by the address manager's pool sizing.
    pub fn ipamd() -> Self {
        Self::new(vec![
            ("WARM_ENI_TARGET", EnvSetting::Int(1)),
            ("WARM_IP_TARGET", EnvSetting::Int(0)),
            ("MINIMUM_IP_TARGET", EnvSetting::Int(0)),
            ("MAX_ENI", EnvSetting::Int(-1)),
            ("AWS_VPC_K8S_CNI_CUSTOM_NETWORK_CFG", EnvSetting::Bool(false)),
            ("ENI_CONFIG_LABEL_DEF", EnvSetting::Text("k8s.amazonaws.com/eniConfig")),
        ])
    }

    /// Variable names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.settings.iter().map(|(name, _)| *name)
    }
}

impl SnapshotProvider for EnvSettings {
    type Snapshot = BTreeMap<&'static str, Value>;

    fn snapshot(&self) -> Self::Snapshot {
        self.settings
            .iter()
            .map(|(name, setting)| (*name, setting.resolve((self.lookup)(*name))))
            .collect()
    }
}
