use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::sync::Mutex;
use bit_set::BitSet;

/// Error type. This is used to indicate misuse of the command/history/solver
/// APIs or malformed puzzle input. Constraint violations and exhaustion of the
/// search space are not errors.
#[derive(Debug, Clone, PartialEq)]
pub struct Error(Cow<'static, str>);

impl Error {
    pub const fn new_const(s: &'static str) -> Self {
        Error(Cow::Borrowed(s))
    }

    pub fn new<S: Into<String>>(s: S) -> Self {
        Error(Cow::Owned(s.into()))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for Error {}

/// Grid position as [row, col]. The Sujiko grid is a fixed 3x3, so both
/// coordinates range over 0..3.
pub type Index = [usize; 2];

/// A Sujiko digit, always in 1..=9. Cell emptiness is represented as
/// `Option<Digit>` rather than a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Digit(u8);

impl Digit {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 9;

    pub fn new(value: u8) -> Self {
        assert!(
            value >= Self::MIN && value <= Self::MAX,
            "Digit out of bounds: {}", value,
        );
        Digit(value)
    }

    pub fn val(self) -> u8 {
        self.0
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let value = s.parse::<u8>()
            .map_err(|_| Error::new(format!("Invalid digit: {:?}", s)))?;
        if value < Self::MIN || value > Self::MAX {
            return Err(Error::new(format!(
                "Digit out of bounds: {} ({}-{})", value, Self::MIN, Self::MAX,
            )));
        }
        Ok(Digit(value))
    }

    /// All digits, ascending. The solver relies on this ordering to try
    /// candidates 1 through 9.
    pub fn possibilities() -> Vec<Self> {
        (Self::MIN..=Self::MAX).map(Digit).collect()
    }

    /// Zero-based position in 1..=9, used as a bit index by `DigitSet`.
    pub fn ordinal(self) -> usize {
        (self.0 - Self::MIN) as usize
    }

    pub fn from_ordinal(ord: usize) -> Self {
        Self::new(ord as u8 + Self::MIN)
    }
}

impl Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A set of digits (e.g., the digits already placed somewhere in the grid),
/// backed by a bitset over the nine possible values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigitSet {
    s: BitSet,
}

impl DigitSet {
    pub fn empty() -> Self {
        DigitSet { s: BitSet::with_capacity(Digit::MAX as usize) }
    }

    pub fn full() -> Self {
        let mut set = Self::empty();
        for d in Digit::possibilities() {
            set.insert(d);
        }
        set
    }

    pub fn insert(&mut self, d: Digit) {
        self.s.insert(d.ordinal());
    }

    pub fn remove(&mut self, d: Digit) {
        self.s.remove(d.ordinal());
    }

    pub fn contains(&self, d: Digit) -> bool {
        self.s.contains(d.ordinal())
    }

    pub fn len(&self) -> usize {
        self.s.len()
    }

    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Iterates the member digits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = Digit> + '_ {
        self.s.iter().map(Digit::from_ordinal)
    }

    /// The digits in 1..=9 that are not in this set, ascending.
    pub fn missing(&self) -> DigitSet {
        let mut result = Self::empty();
        for d in Digit::possibilities() {
            if !self.contains(d) {
                result.insert(d);
            }
        }
        result
    }
}

struct AttributionRegistry {
    mapping: HashMap<&'static str, usize>,
    next_id: usize,
}

impl AttributionRegistry {
    fn new() -> Self {
        Self { mapping: HashMap::new(), next_id: 0 }
    }

    fn register(&mut self, name: &'static str) -> usize {
        if let Some(id) = self.mapping.get(name) {
            *id
        } else {
            let id = self.next_id;
            self.mapping.insert(name, id);
            self.next_id += 1;
            id
        }
    }
}

lazy_static::lazy_static! {
    static ref ATTRIBUTION_REGISTRY: Mutex<AttributionRegistry> = {
        Mutex::new(AttributionRegistry::new())
    };
}

/// An interned diagnostic label attributing an outcome (e.g., a reasoner
/// contradiction) to whatever detected it. Interning keeps comparisons cheap
/// and guarantees that equal names get equal ids across the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution {
    id: usize,
    name: &'static str,
}

impl Attribution {
    pub fn new(name: &'static str) -> Self {
        let id = ATTRIBUTION_REGISTRY.lock().unwrap().register(name);
        Attribution { id, name }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

impl Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_digit_parse() {
        assert_eq!(Digit::parse("7"), Ok(Digit::new(7)));
        assert!(Digit::parse("0").is_err());
        assert!(Digit::parse("10").is_err());
        assert!(Digit::parse("x").is_err());
    }

    #[test]
    fn test_digit_possibilities_ascending() {
        let all = Digit::possibilities();
        assert_eq!(all.len(), 9);
        assert_eq!(all[0].val(), 1);
        assert_eq!(all[8].val(), 9);
        for w in all.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn test_digit_set_missing() {
        let mut used = DigitSet::empty();
        used.insert(Digit::new(2));
        used.insert(Digit::new(9));
        let missing: Vec<u8> = used.missing().iter().map(Digit::val).collect();
        assert_eq!(missing, vec![1, 3, 4, 5, 6, 7, 8]);
        assert_eq!(DigitSet::full().missing().len(), 0);
    }

    #[test]
    fn test_digit_set_iter_ascending() {
        let mut s = DigitSet::empty();
        s.insert(Digit::new(8));
        s.insert(Digit::new(1));
        s.insert(Digit::new(4));
        let vals: Vec<u8> = s.iter().map(Digit::val).collect();
        assert_eq!(vals, vec![1, 4, 8]);
    }

    #[test]
    fn test_attribution_interned() {
        let a = Attribution::new("SOME_LABEL");
        let b = Attribution::new("SOME_LABEL");
        let c = Attribution::new("OTHER_LABEL");
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(c.name(), "OTHER_LABEL");
    }
}
