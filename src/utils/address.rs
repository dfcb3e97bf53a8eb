use ipnet::{Ipv4AddrRange, Ipv4Net};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::sync::OnceLock;

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Serialize, Deserialize)]
enum AddressType {
    Ip,
    Range,
    Mask,
    Unknown,
}

// Octets carry no leading zeros, so equal text means equal address.
const IP_REGEX: &str =
    "(25[0-5]|2[0-4]\\d|1\\d\\d|[1-9]?\\d)(\\.(25[0-5]|2[0-4]\\d|1\\d\\d|[1-9]?\\d)){3}";
const IP_PIECE_REGEX: &str =
    "(25[0-5]|2[0-4]\\d|1\\d\\d|[1-9]?\\d)(\\.(25[0-5]|2[0-4]\\d|1\\d\\d|[1-9]?\\d)){0,3}";

struct AddressRegex {
    ip: regex::Regex,
    range: regex::Regex,
    mask: regex::Regex,
}

fn address_regex() -> &'static AddressRegex {
    static REGEX: OnceLock<AddressRegex> = OnceLock::new();
    REGEX.get_or_init(|| AddressRegex {
        ip: regex::Regex::new(&format!("^{}$", IP_REGEX)).unwrap(),
        range: regex::Regex::new(&format!("^{}-{}$", IP_REGEX, IP_PIECE_REGEX)).unwrap(),
        mask: regex::Regex::new(&format!("^{}/\\d{{1,2}}$", IP_REGEX)).unwrap(),
    })
}

fn get_address_type(address: &str) -> AddressType {
    let regex = address_regex();
    return if regex.ip.is_match(address) {
        AddressType::Ip
    } else if regex.range.is_match(address) {
        AddressType::Range
    } else if regex.mask.is_match(address) {
        AddressType::Mask
    } else {
        AddressType::Unknown
    };
}

fn parse_octets(piece: &str) -> Option<Vec<u8>> {
    piece
        .split('.')
        .map(|octet| octet.parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()
}

fn parse_ip(address: &str) -> Option<Ipv4Addr> {
    let octets = parse_octets(address)?;
    match octets[..] {
        [a, b, c, d] => Some(Ipv4Addr::new(a, b, c, d)),
        _ => None,
    }
}

/// An inclusive span of IPv4 addresses. Endpoints may be given in any order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl AddressRange {
    pub fn new(start: Ipv4Addr, end: Ipv4Addr) -> Self {
        Self { start, end }
    }

    /// Parses `head-tail`. Leading octets missing from the tail are copied
    /// from the head, so `10.0.0.1-5` ends at `10.0.0.5`.
    pub fn from_token(token: &str) -> Option<Self> {
        if get_address_type(token) != AddressType::Range {
            return None;
        }
        let (head, tail) = token.split_once('-')?;
        let head = parse_octets(head)?;
        let tail = parse_octets(tail)?;
        let mut end = head[..4 - tail.len()].to_vec();
        end.extend(tail);
        Some(Self::new(
            Ipv4Addr::new(head[0], head[1], head[2], head[3]),
            Ipv4Addr::new(end[0], end[1], end[2], end[3]),
        ))
    }

    /// Every address from the numerically smaller endpoint to the larger one, inclusive.
    pub fn expand(&self) -> Vec<Ipv4Addr> {
        let (head, tail) = if u32::from(self.end) < u32::from(self.start) {
            (self.end, self.start)
        } else {
            (self.start, self.end)
        };
        Ipv4AddrRange::new(head, tail).collect()
    }
}

fn resolve_range_from_mask_address(address: &str) -> Option<AddressRange> {
    let net = address.parse::<Ipv4Net>().ok()?;
    Some(AddressRange::new(net.network(), net.broadcast()))
}

/// One entry of a command line or config file.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    Single(Ipv4Addr),
    Range(AddressRange),
}

impl Target {
    /// Classifies `token` as a single address, a range or a CIDR block.
    /// Returns `None` for anything else.
    pub fn parse(token: &str) -> Option<Self> {
        return match get_address_type(token) {
            AddressType::Ip => parse_ip(token).map(Target::Single),
            AddressType::Range => AddressRange::from_token(token).map(Target::Range),
            AddressType::Mask => resolve_range_from_mask_address(token).map(Target::Range),
            AddressType::Unknown => None,
        };
    }

    pub fn addresses(&self) -> Vec<Ipv4Addr> {
        match self {
            Target::Single(ip) => vec![*ip],
            Target::Range(range) => range.expand(),
        }
    }
}

#[cfg(test)]
pub mod address_test {
    use crate::utils::address::{get_address_type, AddressRange, AddressType, Target};
    use std::net::Ipv4Addr;

    fn ips(list: &[&str]) -> Vec<Ipv4Addr> {
        list.iter().map(|ip| ip.parse().unwrap()).collect()
    }

    #[test]
    fn check_address_type_test() {
        assert_eq!(get_address_type("127.0.0.1"), AddressType::Ip);
        assert_eq!(get_address_type("127.0.0.1-127.0.0.10"), AddressType::Range);
        assert_eq!(get_address_type("127.0.0.1-10"), AddressType::Range);
        assert_eq!(get_address_type("127.0.0.1/24"), AddressType::Mask);
        assert_eq!(get_address_type("300.0.0.0"), AddressType::Unknown);
        assert_eq!(get_address_type("127.0.0.1-300"), AddressType::Unknown);
        assert_eq!(get_address_type("-a"), AddressType::Unknown);
    }

    #[test]
    fn expand_is_order_independent_test() {
        let a: Ipv4Addr = "10.0.0.254".parse().unwrap();
        let b: Ipv4Addr = "10.0.1.2".parse().unwrap();
        let forward = AddressRange::new(a, b).expand();
        let backward = AddressRange::new(b, a).expand();
        assert_eq!(forward, backward);
        assert_eq!(
            forward,
            ips(&["10.0.0.254", "10.0.0.255", "10.0.1.0", "10.0.1.1", "10.0.1.2"])
        );
    }

    #[test]
    fn expand_single_address_test() {
        let a: Ipv4Addr = "192.168.1.7".parse().unwrap();
        assert_eq!(AddressRange::new(a, a).expand(), vec![a]);
    }

    #[test]
    fn tail_shorthand_test() {
        let range = AddressRange::from_token("10.0.0.1-5").unwrap();
        assert_eq!(range.end, "10.0.0.5".parse::<Ipv4Addr>().unwrap());
        assert_eq!(
            range.expand(),
            ips(&["10.0.0.1", "10.0.0.2", "10.0.0.3", "10.0.0.4", "10.0.0.5"])
        );
        let range = AddressRange::from_token("10.0.0.250-1.3").unwrap();
        assert_eq!(range.end, "10.0.1.3".parse::<Ipv4Addr>().unwrap());
        assert_eq!(range.expand().len(), 10);
    }

    #[test]
    fn large_block_bounds_test() {
        let everything = Target::parse("0.0.0.0/0").unwrap();
        assert_eq!(
            everything,
            Target::Range(AddressRange::new(
                Ipv4Addr::new(0, 0, 0, 0),
                Ipv4Addr::new(255, 255, 255, 255)
            ))
        );
        let block = Target::parse("10.1.2.3/8").unwrap();
        assert_eq!(
            block,
            Target::Range(AddressRange::new(
                Ipv4Addr::new(10, 0, 0, 0),
                Ipv4Addr::new(10, 255, 255, 255)
            ))
        );
    }

    #[test]
    fn parse_target_test() {
        assert_eq!(
            Target::parse("10.0.0.1"),
            Some(Target::Single("10.0.0.1".parse().unwrap()))
        );
        assert_eq!(Target::parse("010.0.0.1"), None);
        assert_eq!(Target::parse("10.0.0.01"), None);
        assert_eq!(Target::parse("10.0.0.1-05"), None);
        assert_eq!(
            Target::parse("10.0.0.0"),
            Some(Target::Single(Ipv4Addr::new(10, 0, 0, 0)))
        );
        assert_eq!(
            Target::parse("10.0.0.0/30").unwrap().addresses(),
            ips(&["10.0.0.0", "10.0.0.1", "10.0.0.2", "10.0.0.3"])
        );
        assert_eq!(
            Target::parse("10.0.0.5/30").unwrap().addresses(),
            ips(&["10.0.0.4", "10.0.0.5", "10.0.0.6", "10.0.0.7"])
        );
        assert_eq!(Target::parse("10.0.0.0/33"), None);
        assert_eq!(Target::parse("10.0.0"), None);
        assert_eq!(Target::parse("host.example"), None);
        assert_eq!(Target::parse("10.0.0.1-10.0.0.2-10.0.0.3"), None);
    }
}
