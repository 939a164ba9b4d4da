// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Configured guest address leases.

use ahash::RandomState;
use net::eth::mac::Mac;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;

/// One configured binding of a guest IPv4 address to its mac.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub ip: Ipv4Addr,
    pub mac: Mac,
}

/// The configured lease table, consulted when the neighbor cache misses.
///
/// On the wire and in config files the table is a flat list of [`Lease`]
/// entries. Duplicate addresses keep the last entry listed.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(from = "Vec<Lease>", into = "Vec<Lease>")]
pub struct LeaseTable {
    by_ip: HashMap<Ipv4Addr, Mac, RandomState>,
}

impl LeaseTable {
    #[must_use]
    pub fn new() -> LeaseTable {
        LeaseTable::default()
    }

    /// Adds or replaces the lease for `lease.ip`, returning the mac it
    /// displaced if any.
    pub fn insert(&mut self, lease: Lease) -> Option<Mac> {
        self.by_ip.insert(lease.ip, lease.mac)
    }

    #[must_use]
    pub fn lookup(&self, ip: Ipv4Addr) -> Option<Mac> {
        self.by_ip.get(&ip).copied()
    }

    pub fn remove(&mut self, ip: Ipv4Addr) -> Option<Mac> {
        self.by_ip.remove(&ip)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_ip.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_ip.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Lease> + '_ {
        self.by_ip.iter().map(|(ip, mac)| Lease { ip: *ip, mac: *mac })
    }
}

impl From<Vec<Lease>> for LeaseTable {
    fn from(leases: Vec<Lease>) -> LeaseTable {
        let mut table = LeaseTable::new();
        for lease in leases {
            table.insert(lease);
        }
        table
    }
}

impl From<LeaseTable> for Vec<Lease> {
    fn from(table: LeaseTable) -> Vec<Lease> {
        let mut leases: Vec<Lease> = table.iter().collect();
        // stable output for config dumps
        leases.sort_by_key(|lease| lease.ip);
        leases
    }
}

impl FromIterator<Lease> for LeaseTable {
    fn from_iter<I: IntoIterator<Item = Lease>>(iter: I) -> LeaseTable {
        let mut table = LeaseTable::new();
        for lease in iter {
            table.insert(lease);
        }
        table
    }
}

#[cfg(test)]
mod test {
    #![allow(clippy::unwrap_used)]

    use super::{Lease, LeaseTable};
    use net::eth::mac::Mac;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    const GUEST_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 2, 15);
    const OTHER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 2, 16);
    const MAC_A: Mac = Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x0a]);
    const MAC_B: Mac = Mac([0x52, 0x54, 0x00, 0x12, 0x34, 0x0b]);

    #[test]
    fn deserializes_from_a_yaml_list() {
        let yaml = r"
- ip: 10.0.2.15
  mac: [82, 84, 0, 18, 52, 10]
- ip: 10.0.2.16
  mac: [82, 84, 0, 18, 52, 11]
";
        let table: LeaseTable = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup(GUEST_IP), Some(MAC_A));
        assert_eq!(table.lookup(OTHER_IP), Some(MAC_B));
    }

    #[test]
    fn duplicate_address_keeps_the_last_entry() {
        let yaml = r"
- ip: 10.0.2.15
  mac: [82, 84, 0, 18, 52, 10]
- ip: 10.0.2.15
  mac: [82, 84, 0, 18, 52, 11]
";
        let table: LeaseTable = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(GUEST_IP), Some(MAC_B));
    }

    #[test]
    fn serializes_sorted_by_address() {
        let table: LeaseTable = [
            Lease {
                ip: OTHER_IP,
                mac: MAC_B,
            },
            Lease {
                ip: GUEST_IP,
                mac: MAC_A,
            },
        ]
        .into_iter()
        .collect();
        let listed: Vec<Lease> = table.into();
        assert_eq!(
            listed,
            [
                Lease {
                    ip: GUEST_IP,
                    mac: MAC_A,
                },
                Lease {
                    ip: OTHER_IP,
                    mac: MAC_B,
                },
            ]
        );
    }

    #[test]
    fn insert_reports_the_displaced_mac() {
        let mut table = LeaseTable::new();
        assert_eq!(
            table.insert(Lease {
                ip: GUEST_IP,
                mac: MAC_A,
            }),
            None
        );
        assert_eq!(
            table.insert(Lease {
                ip: GUEST_IP,
                mac: MAC_B,
            }),
            Some(MAC_A)
        );
        assert_eq!(table.remove(GUEST_IP), Some(MAC_B));
        assert!(table.is_empty());
    }
}
