//! CIDR notation and address range algebra.
//!
//! Provides [`Cidr`] for representing IPv4 and IPv6 ranges as a base address
//! plus prefix length, with containment and overlap checks.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;

/// Maximum prefix length for an IPv4 range (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 range (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// Returned when text is not a valid `address/prefix` pair.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid CIDR address: {0}")]
pub struct CidrParseError(pub String);

/// Width in bits of the address family of `addr`.
pub fn max_length(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => MAX_LENGTH_V4,
        IpAddr::V6(_) => MAX_LENGTH_V6,
    }
}

/// Convert a prefix length to a network mask `width` bits wide.
///
/// # Examples
/// ```
/// use azure_outbound_network::models::get_cidr_mask;
/// assert_eq!(get_cidr_mask(24, 32), 0xFFFFFF00);
/// ```
pub fn get_cidr_mask(len: u8, width: u8) -> u128 {
    let all_bits = if width >= MAX_LENGTH_V6 {
        u128::MAX
    } else {
        (1u128 << width) - 1
    };
    if len >= width {
        all_bits
    } else {
        all_bits & !(all_bits >> len)
    }
}

fn addr_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(v4) as u128,
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn bits_to_addr(bits: u128, family: IpAddr) -> IpAddr {
    match family {
        IpAddr::V4(_) => IpAddr::from((bits as u32).to_be_bytes()),
        IpAddr::V6(_) => IpAddr::from(bits.to_be_bytes()),
    }
}

/// Get the network address for a given IP and prefix length.
pub fn cut_addr(addr: IpAddr, len: u8) -> IpAddr {
    let mask = get_cidr_mask(len, max_length(addr));
    bits_to_addr(addr_bits(addr) & mask, addr)
}

/// An address range in CIDR notation.
///
/// `label` records the configuration field the range came from and is only
/// used for diagnostics; it takes no part in comparisons.
#[derive(Debug, Clone, Eq)]
pub struct Cidr {
    /// Base address as written, not necessarily masked.
    pub addr: IpAddr,
    /// Prefix length (0-32 for IPv4, 0-128 for IPv6).
    pub prefix: u8,
    /// Field path the range was read from.
    pub label: Option<String>,
}

impl Cidr {
    /// Create a new [`Cidr`] from text such as "10.0.0.0/24".
    pub fn new(addr_cidr: &str) -> Result<Cidr, CidrParseError> {
        let err = || CidrParseError(addr_cidr.to_string());
        let (addr, prefix) = addr_cidr.split_once('/').ok_or_else(err)?;
        let addr: IpAddr = addr.parse().map_err(|_| err())?;
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let prefix: u8 = prefix.parse().map_err(|_| err())?;
        if prefix > max_length(addr) {
            return Err(err());
        }
        Ok(Cidr {
            addr,
            prefix,
            label: None,
        })
    }

    /// Attach the configuration field path this range came from.
    pub fn with_label(mut self, label: impl Into<String>) -> Cidr {
        self.label = Some(label.into());
        self
    }

    pub fn is_ipv4(&self) -> bool {
        self.addr.is_ipv4()
    }

    /// True when no bits beyond the prefix length are set in the base address.
    pub fn is_canonical(&self) -> bool {
        self.lo() == self.addr
    }

    /// The canonical form of this range (base address masked to the prefix).
    pub fn network(&self) -> Cidr {
        Cidr {
            addr: self.lo(),
            prefix: self.prefix,
            label: self.label.clone(),
        }
    }

    /// True when every address of `inner` is also an address of `self`.
    ///
    /// Ranges of different address families never contain one another.
    pub fn contains(&self, inner: &Cidr) -> bool {
        if self.is_ipv4() != inner.is_ipv4() || self.prefix > inner.prefix {
            return false;
        }
        cut_addr(inner.addr, self.prefix) == self.lo()
    }

    /// True when the two ranges share at least one address.
    pub fn overlaps(&self, other: &Cidr) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// Lowest (network) address in the range.
    pub fn lo(&self) -> IpAddr {
        cut_addr(self.addr, self.prefix)
    }
}

impl FromStr for Cidr {
    type Err = CidrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cidr::new(s)
    }
}

impl fmt::Display for Cidr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

impl PartialEq for Cidr {
    fn eq(&self, other: &Cidr) -> bool {
        self.addr == other.addr && self.prefix == other.prefix
    }
}

impl std::hash::Hash for Cidr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.addr.hash(state);
        self.prefix.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    fn cidr(s: &str) -> Cidr {
        Cidr::new(s).unwrap()
    }

    #[test]
    fn test_get_cidr_mask() {
        assert_eq!(get_cidr_mask(0, 32), 0x00000000);
        assert_eq!(get_cidr_mask(8, 32), 0xFF000000);
        assert_eq!(get_cidr_mask(16, 32), 0xFFFF0000);
        assert_eq!(get_cidr_mask(24, 32), 0xFFFFFF00);
        assert_eq!(get_cidr_mask(32, 32), 0xFFFFFFFF);
        assert_eq!(get_cidr_mask(0, 128), 0);
        assert_eq!(get_cidr_mask(128, 128), u128::MAX);
        assert_eq!(get_cidr_mask(64, 128), u128::MAX << 64);
    }

    #[test]
    fn test_cut_addr() {
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 42));
        assert_eq!(cut_addr(ip, 24), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(cut_addr(ip, 16), Ipv4Addr::new(192, 168, 0, 0));
        assert_eq!(cut_addr(ip, 8), Ipv4Addr::new(192, 0, 0, 0));
        assert_eq!(cut_addr(ip, 32), Ipv4Addr::new(192, 168, 1, 42));
    }

    #[test]
    fn test_parse() {
        let c = cidr("10.250.3.0/24");
        assert_eq!(c.addr, Ipv4Addr::new(10, 250, 3, 0));
        assert_eq!(c.prefix, 24);
        assert_eq!(c.to_string(), "10.250.3.0/24");

        let v6 = cidr("fd00::/8");
        assert_eq!(v6.addr, "fd00::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(v6.prefix, 8);

        let bad_inputs = [
            "invalid-cidr",
            "10.0.0.0",
            "10.0.0.0/33",
            "10.0.0.0/",
            "/8",
            "fd00::/129",
            "10.0.0.0/+8",
            "",
        ];
        for bad in bad_inputs {
            assert_eq!(
                Cidr::new(bad).unwrap_err().to_string(),
                format!("invalid CIDR address: {bad}")
            );
        }
    }

    #[test]
    fn test_is_canonical() {
        assert!(cidr("10.0.0.0/8").is_canonical());
        assert!(!cidr("10.0.0.3/8").is_canonical());
        assert!(cidr("0.0.0.0/0").is_canonical());
        assert!(cidr("10.0.0.3/32").is_canonical());
        assert!(!cidr("fd00::1/64").is_canonical());
    }

    #[test]
    fn test_canonical_iff_network_round_trips() {
        let inputs = [
            "10.0.0.0/8",
            "10.0.0.3/8",
            "10.250.3.8/24",
            "100.64.0.0/13",
            "fd00::1/64",
            "::/0",
        ];
        for s in inputs {
            let c = cidr(s);
            let round_trip = cidr(&c.network().to_string());
            assert_eq!(c.is_canonical(), round_trip == c, "{s}");
        }
    }

    #[test]
    fn test_contains() {
        let vnet = cidr("10.0.0.0/8");
        let nodes = cidr("10.250.0.0/16");
        let workers = cidr("10.250.3.0/24");

        assert!(vnet.contains(&nodes));
        assert!(vnet.contains(&workers));
        assert!(nodes.contains(&workers));
        assert!(!workers.contains(&nodes));
        assert!(vnet.contains(&vnet));
        assert!(!vnet.contains(&cidr("1.1.1.1/32")));
        // base address bits beyond the prefix do not matter
        assert!(cidr("10.0.0.3/8").contains(&cidr("10.250.0.3/16")));
    }

    #[test]
    fn test_mixed_families_never_relate() {
        let v4 = cidr("0.0.0.0/0");
        let v6 = cidr("::/0");
        assert!(!v4.contains(&v6));
        assert!(!v6.contains(&v4));
        assert!(!v4.overlaps(&v6));
        assert_ne!(v4, v6);
    }

    #[test]
    fn test_mutual_containment_means_equal() {
        let samples = ["10.0.0.0/8", "10.0.0.0/16", "10.1.0.0/16", "100.96.0.0/11", "fd00::/8"];
        for a in samples {
            for b in samples {
                let (a, b) = (cidr(a), cidr(b));
                if a.contains(&b) && b.contains(&a) {
                    assert_eq!(a, b);
                }
            }
        }
    }

    #[test]
    fn test_overlaps() {
        let vnet = cidr("10.0.0.0/8");
        assert!(vnet.overlaps(&cidr("10.0.0.1/32")));
        assert!(cidr("10.0.0.1/32").overlaps(&vnet));
        assert!(!vnet.overlaps(&cidr("100.96.0.0/11")));
        assert!(!cidr("100.96.0.0/11").overlaps(&cidr("100.64.0.0/13")));
    }

    #[test]
    fn test_label_ignored_in_eq() {
        let a = cidr("10.0.0.0/8").with_label("networks.vnet.cidr");
        let b = cidr("10.0.0.0/8");
        assert_eq!(a, b);
        assert_eq!(a.network().label.as_deref(), Some("networks.vnet.cidr"));
    }
}
