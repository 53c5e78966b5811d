//! Identifier management using string interning.
//!
//! Schema element ids are compared and hashed constantly while resolving
//! relationships and keying visible items, so they are interned once and
//! handled as `Copy` symbols afterwards. This module provides [`Id`] for schema
//! elements and [`PanelId`] for display panels.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use serde::{Serialize, Serializer};
use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner shared by every [`Id`].
///
/// # Thread Safety
///
/// Access goes through a `Mutex`, so ids may be created from any thread even
/// though the schema core itself is single-threaded.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Interned identifier of a schema element (class, enum, slot or variable).
///
/// # Examples
///
/// ```
/// use schemascope_core::identifier::Id;
///
/// let specimen = Id::new("Specimen");
/// assert_eq!(specimen, "Specimen");
///
/// let instance = Id::new("observations").suffixed(Id::new("MeasurementObservationSet"));
/// assert_eq!(instance, "observations-MeasurementObservationSet");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from a string slice, interning it on first use.
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates the id of a class-specific instance of this id, joined with `-`.
    ///
    /// Slot override instances are named `{slot}-{Class}`.
    pub fn suffixed(&self, suffix: Id) -> Self {
        let mut interner = interner();
        let base = interner
            .resolve(self.0)
            .expect("Base ID should exist in interner")
            .to_owned();
        let tail = interner
            .resolve(suffix.0)
            .expect("Suffix ID should exist in interner");
        let joined = format!("{base}-{tail}");
        Self(interner.get_or_intern(joined))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = interner();
        let value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        f.write_str(value)
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "Specimen"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner.resolve(self.0) == Some(other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Identifier of a display panel.
///
/// Panels are named by the external UI layer (`"left"`, `"right"`,
/// `"variables"`, ...). The same schema element can be visible in several
/// panels at once, so visible items are always keyed by `(Id, PanelId)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PanelId(Id);

impl PanelId {
    /// Creates a panel id from its name.
    pub fn new(name: &str) -> Self {
        Self(Id::new(name))
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PanelId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
