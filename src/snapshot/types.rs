//! State published by the address manager and exposed read-only.
//!
//! Field names follow the wire format existing tooling already parses
//! (`TotalIPs`, `ENIs`, ...), hence the explicit renames.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// A secondary address on an ENI and whether a pod holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AddressInfo {
    pub address: String,
    pub assigned: bool,
}

/// One elastic network interface attached to the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Eni {
    #[serde(rename = "ID")]
    pub id: String,
    pub is_primary: bool,
    pub device_number: u32,
    #[serde(rename = "AssignedIPv4Addresses")]
    pub assigned_ipv4_addresses: usize,
    #[serde(rename = "IPv4Addresses")]
    pub ipv4_addresses: BTreeMap<String, AddressInfo>,
}

impl Eni {
    /// Build an ENI from its addresses, deriving the assigned count.
    pub fn new(
        id: impl Into<String>,
        device_number: u32,
        is_primary: bool,
        addresses: impl IntoIterator<Item = AddressInfo>,
    ) -> Self {
        let ipv4_addresses: BTreeMap<String, AddressInfo> = addresses
            .into_iter()
            .map(|info| (info.address.clone(), info))
            .collect();
        let assigned_ipv4_addresses = ipv4_addresses.values().filter(|a| a.assigned).count();
        Self {
            id: id.into(),
            is_primary,
            device_number,
            assigned_ipv4_addresses,
            ipv4_addresses,
        }
    }
}

/// Every ENI on the node with aggregate address counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EniInventory {
    #[serde(rename = "TotalIPs")]
    pub total_ips: usize,
    #[serde(rename = "AssignedIPs")]
    pub assigned_ips: usize,
    #[serde(rename = "ENIs")]
    pub enis: BTreeMap<String, Eni>,
}

impl EniInventory {
    pub fn new(enis: impl IntoIterator<Item = Eni>) -> Self {
        let enis: BTreeMap<String, Eni> = enis.into_iter().map(|eni| (eni.id.clone(), eni)).collect();
        Self {
            total_ips: enis.values().map(|eni| eni.ipv4_addresses.len()).sum(),
            assigned_ips: enis.values().map(|eni| eni.assigned_ipv4_addresses).sum(),
            enis,
        }
    }
}

/// Address held by a pod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodAddress {
    #[serde(rename = "IP")]
    pub ip: String,
    pub device_number: u32,
}

/// Pod key (`namespace/name/container`) to its address.
pub type PodInventory = BTreeMap<String, PodAddress>;

/// Network settings an ENIConfig resource applies to matching nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EniConfigSpec {
    pub security_groups: Vec<String>,
    pub subnet: String,
}

/// ENIConfig spec by node label value.
pub type EniConfigs = BTreeMap<String, EniConfigSpec>;
