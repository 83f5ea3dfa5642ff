//! Static pin tables: what each physical pin is called and what it can do.

use log::warn;
use std::collections::HashSet;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Set of electrical functions a pin may be configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// General-purpose digital I/O.
    pub const NORMAL: Capabilities = Capabilities(1 << 0);
    pub const I2C: Capabilities = Capabilities(1 << 1);
    pub const UART: Capabilities = Capabilities(1 << 2);
    pub const SPI: Capabilities = Capabilities(1 << 3);
    /// General-purpose memory controller.
    pub const GPMC: Capabilities = Capabilities(1 << 4);
    pub const LCD: Capabilities = Capabilities(1 << 5);
    pub const PWM: Capabilities = Capabilities(1 << 6);

    /// No capabilities at all.
    pub const fn empty() -> Self {
        Capabilities(0)
    }

    /// Raw bitmask.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when every flag in `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: Capabilities) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Capabilities {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Capabilities(self.0 | rhs.0)
    }
}

impl BitOrAssign for Capabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Identity and capabilities of one physical pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinDescriptor {
    number: u32,
    aliases: Vec<String>,
    caps: Capabilities,
}

impl PinDescriptor {
    pub fn new<S: Into<String>>(
        number: u32,
        aliases: impl IntoIterator<Item = S>,
        caps: Capabilities,
    ) -> Self {
        Self {
            number,
            aliases: aliases.into_iter().map(Into::into).collect(),
            caps,
        }
    }

    #[inline]
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    #[inline]
    pub fn caps(&self) -> Capabilities {
        self.caps
    }

    fn matches(&self, key: &PinKey) -> bool {
        match key {
            PinKey::Number(n) => self.number == *n,
            PinKey::Alias(alias) => self.aliases.iter().any(|a| a == alias),
        }
    }
}

/// How a caller names a pin: by physical number or by one of its aliases.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PinKey {
    Number(u32),
    Alias(String),
}

impl From<u32> for PinKey {
    fn from(n: u32) -> Self {
        PinKey::Number(n)
    }
}

impl From<&str> for PinKey {
    fn from(alias: &str) -> Self {
        PinKey::Alias(alias.to_string())
    }
}

impl From<String> for PinKey {
    fn from(alias: String) -> Self {
        PinKey::Alias(alias)
    }
}

impl fmt::Display for PinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinKey::Number(n) => write!(f, "{}", n),
            PinKey::Alias(a) => write!(f, "{}", a),
        }
    }
}

/// Ordered pin table. Lookups scan in order and the first match wins.
#[derive(Debug, Clone, Default)]
pub struct PinRegistry {
    pins: Vec<PinDescriptor>,
}

impl PinRegistry {
    /// Builds a registry. Duplicate numbers or aliases are accepted but
    /// logged, since later entries become unreachable by that key.
    pub fn new(pins: Vec<PinDescriptor>) -> Self {
        let mut numbers = HashSet::new();
        let mut aliases = HashSet::new();
        for pin in &pins {
            if !numbers.insert(pin.number) {
                warn!(
                    "Pin number {} appears more than once; lookups resolve to the first entry",
                    pin.number
                );
            }
            for alias in &pin.aliases {
                if !aliases.insert(alias.as_str()) {
                    warn!(
                        "Pin alias '{}' appears more than once; lookups resolve to the first entry",
                        alias
                    );
                }
            }
        }
        Self { pins }
    }

    pub fn lookup(&self, key: &PinKey) -> Option<&PinDescriptor> {
        self.pins.iter().find(|pin| pin.matches(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &PinDescriptor> {
        self.pins.iter()
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl FromIterator<PinDescriptor> for PinRegistry {
    fn from_iter<I: IntoIterator<Item = PinDescriptor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PinRegistry {
        PinRegistry::new(vec![
            PinDescriptor::new(10, ["P9_12", "GPIO_60"], Capabilities::NORMAL),
            PinDescriptor::new(
                11,
                ["P9_14", "GPIO_50"],
                Capabilities::NORMAL | Capabilities::PWM,
            ),
            PinDescriptor::new(12, ["P9_19"], Capabilities::I2C),
        ])
    }

    #[test]
    fn test_lookup_by_number_and_alias() {
        let reg = registry();
        assert_eq!(reg.lookup(&PinKey::from(11)).map(|p| p.number()), Some(11));
        assert_eq!(reg.lookup(&PinKey::from("GPIO_60")).map(|p| p.number()), Some(10));
        assert_eq!(reg.lookup(&PinKey::from("P9_19")).map(|p| p.number()), Some(12));
    }

    #[test]
    fn test_lookup_absent_is_none() {
        let reg = registry();
        assert!(reg.lookup(&PinKey::from(99)).is_none());
        assert!(reg.lookup(&PinKey::from("P8_01")).is_none());
        // Numbers are not matched against aliases
        assert!(reg.lookup(&PinKey::from("10")).is_none());
    }

    #[test]
    fn test_duplicate_alias_resolves_to_first() {
        let reg = PinRegistry::new(vec![
            PinDescriptor::new(1, ["LED"], Capabilities::NORMAL),
            PinDescriptor::new(2, ["LED"], Capabilities::PWM),
        ]);
        assert_eq!(reg.lookup(&PinKey::from("LED")).map(|p| p.number()), Some(1));
        assert_eq!(reg.lookup(&PinKey::from(2)).map(|p| p.number()), Some(2));
    }

    #[test]
    fn test_capabilities_contains() {
        let caps = Capabilities::NORMAL | Capabilities::UART;
        assert!(caps.contains(Capabilities::NORMAL));
        assert!(caps.contains(Capabilities::UART));
        assert!(!caps.contains(Capabilities::PWM));
        assert!(caps.contains(Capabilities::empty()));
        assert_eq!(caps.bits(), 0b0000_0101);
    }
}
