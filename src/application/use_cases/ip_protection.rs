//! Ingress-protection (IP) class ranking.
//!
//! The catalog stores IP ratings as text (`IP44`, `IP65`, sometimes combined
//! like `IP65/IP44`). "At least IPxx" filtering works on a fixed total order
//! over the seven classes the catalog uses.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// The known IP classes, ordered from least to most protective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IpClass {
    Ip20,
    Ip23,
    Ip44,
    Ip54,
    Ip65,
    Ip67,
    Ip68,
}

impl IpClass {
    /// All classes in ascending protection order.
    pub const ALL: [IpClass; 7] = [
        IpClass::Ip20,
        IpClass::Ip23,
        IpClass::Ip44,
        IpClass::Ip54,
        IpClass::Ip65,
        IpClass::Ip67,
        IpClass::Ip68,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IpClass::Ip20 => "IP20",
            IpClass::Ip23 => "IP23",
            IpClass::Ip44 => "IP44",
            IpClass::Ip54 => "IP54",
            IpClass::Ip65 => "IP65",
            IpClass::Ip67 => "IP67",
            IpClass::Ip68 => "IP68",
        }
    }

    /// Ordinal within the total order, 1 (IP20) through 7 (IP68).
    pub fn level(self) -> u8 {
        match self {
            IpClass::Ip20 => 1,
            IpClass::Ip23 => 2,
            IpClass::Ip44 => 3,
            IpClass::Ip54 => 4,
            IpClass::Ip65 => 5,
            IpClass::Ip67 => 6,
            IpClass::Ip68 => 7,
        }
    }

    pub fn parse(code: &str) -> Option<IpClass> {
        match code.trim().to_ascii_uppercase().as_str() {
            "IP20" => Some(IpClass::Ip20),
            "IP23" => Some(IpClass::Ip23),
            "IP44" => Some(IpClass::Ip44),
            "IP54" => Some(IpClass::Ip54),
            "IP65" => Some(IpClass::Ip65),
            "IP67" => Some(IpClass::Ip67),
            "IP68" => Some(IpClass::Ip68),
            _ => None,
        }
    }
}

impl fmt::Display for IpClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal for an arbitrary code string. Codes outside the known vocabulary
/// rank as IP44, the single documented default for every caller.
pub fn rank_of_code(code: &str) -> u8 {
    IpClass::parse(code)
        .map(|class| class.level())
        .unwrap_or_else(|| IpClass::Ip44.level())
}

/// Every class rated at least `min`, ascending and inclusive of `min`.
pub fn acceptable_classes(min: IpClass) -> Vec<IpClass> {
    IpClass::ALL
        .iter()
        .copied()
        .filter(|class| class.level() >= min.level())
        .collect()
}

static IP_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)IP\d{2}").unwrap());

/// Extract every `IPxx` token from a rating string, uppercased.
/// Combined ratings like `IP65/IP44` yield both components.
pub fn extract_ip_codes(rating: &str) -> Vec<String> {
    IP_CODE_RE
        .find_iter(rating)
        .map(|m| m.as_str().to_ascii_uppercase())
        .collect()
}

/// Whether a product's rating string satisfies a minimum class.
/// A combined rating is sufficient when any of its components is.
pub fn is_class_sufficient(product_rating: &str, min: IpClass) -> bool {
    extract_ip_codes(product_rating)
        .iter()
        .any(|code| rank_of_code(code) >= min.level())
}
