//! Lattice catalog for classification qualifiers
//!
//! A catalog registers every classification kind in a single total order,
//! bottom first:
//! - Plain levels (Public, Confidential, ...) carry no payload
//! - Tag-bearing variants carry a [`TagSet`] and sit just below the plain
//!   level of the same hierarchy position
//! - Two placeholder kinds, `Poly` and `PolyUse`, resolved per use site
//!
//! The kind-level bound tables are derived from that order and may be
//! overridden, but [`CatalogBuilder::build`] rejects any table entry that is
//! not one of its two operands.

use crate::error::{BoundOp, ClassificationError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Alias spellings accepted for the standard levels
pub const STANDARD_ALIASES: &[(&str, &str)] = &[
    ("AnyConfidentiality", "Critical"),
    ("NonCritical", "Restricted"),
    ("NonRestricted", "HighlyConfidential"),
    ("NonHighlyConfidential", "Confidential"),
    ("NonConfidential", "Public"),
];

/// Plain levels of the standard catalog, bottom to top
pub const STANDARD_LEVELS: &[&str] = &["Public", "Confidential", "HighlyConfidential", "Restricted", "Critical"];

/// Index of a kind inside its [`Catalog`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(u16);

impl KindId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Placeholder role of a kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Placeholder {
    #[default]
    None,
    Poly,
    PolyUse,
}

/// Registration record for one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSpec {
    pub name: String,
    /// Position in the base total order, 0 is bottom
    pub rank: u32,
    pub tag_bearing: bool,
    pub placeholder: Placeholder,
    pub polymorphic: Option<KindId>,
}

/// Set of usage tags carried by a tag-bearing qualifier
///
/// Order of insertion is irrelevant and duplicates collapse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<String>);

impl TagSet {
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Parse a comma-separated tag list, e.g. `"billing, audit"`
    pub fn parse(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    pub fn is_superset(&self, other: &TagSet) -> bool {
        self.0.is_superset(&other.0)
    }

    pub fn union(&self, other: &TagSet) -> TagSet {
        Self(self.0.union(&other.0).cloned().collect())
    }

    pub fn intersection(&self, other: &TagSet) -> TagSet {
        Self(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for TagSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for TagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<&str> = self.iter().collect();
        write!(f, "{}", tags.join(", "))
    }
}

/// A qualifier instance: a kind plus, for tag-bearing kinds, its tags
///
/// Plain kinds always carry an empty tag set, so two plain qualifiers are
/// equal exactly when their kinds are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qualifier {
    kind: KindId,
    tags: TagSet,
}

impl Qualifier {
    pub(crate) fn from_parts(kind: KindId, tags: TagSet) -> Self {
        Self { kind, tags }
    }

    pub fn kind(&self) -> KindId {
        self.kind
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }
}

/// Registered classification kinds and their ordering
#[derive(Debug, Clone)]
pub struct Catalog {
    kinds: Vec<KindSpec>,
    plain_by_name: IndexMap<String, KindId>,
    tagged_by_name: IndexMap<String, KindId>,
    aliases: BTreeMap<String, String>,
    lub_table: Vec<KindId>,
    glb_table: Vec<KindId>,
    poly: KindId,
    poly_use: KindId,
}

impl Catalog {
    /// The five-level confidentiality catalog with tag-bearing variants for
    /// every level above Public and the standard alias table
    pub fn standard() -> Self {
        let mut builder = CatalogBuilder::new();
        let mut concrete = Vec::new();
        concrete.push(builder.level(STANDARD_LEVELS[0]));
        builder.placeholder("PolyUse", Placeholder::PolyUse);
        let poly = builder.placeholder("Poly", Placeholder::Poly);
        for name in &STANDARD_LEVELS[1..] {
            concrete.push(builder.tagged_level(name));
            concrete.push(builder.level(name));
        }
        for kind in concrete {
            builder.polymorphic_counterpart(kind, poly);
        }
        for (alias, canonical) in STANDARD_ALIASES {
            builder.alias(alias, canonical);
        }
        match builder.build() {
            Ok(catalog) => catalog,
            // The standard table is fixed; a failure here is a bug in this file.
            Err(e) => unreachable!("standard catalog is inconsistent: {e}"),
        }
    }

    /// Merge extra alias spellings over the existing table
    pub fn with_aliases<'a, I>(mut self, aliases: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        for (alias, canonical) in aliases {
            if self.plain_by_name.contains_key(alias) || self.tagged_by_name.contains_key(alias) {
                return Err(ClassificationError::DuplicateAlias { alias: alias.clone() });
            }
            if !self.plain_by_name.contains_key(canonical) && !self.tagged_by_name.contains_key(canonical) {
                return Err(ClassificationError::UnknownKind {
                    name: canonical.clone(),
                });
            }
            self.aliases.insert(alias.clone(), canonical.clone());
        }
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = (KindId, &KindSpec)> {
        self.kinds.iter().enumerate().map(|(i, spec)| (KindId(i as u16), spec))
    }

    /// Registration data of `kind`
    ///
    /// # Panics
    ///
    /// Panics if `kind` was not issued by this catalog. Every `KindId` comes
    /// from a catalog lookup, so ids are only valid against that catalog.
    pub fn spec(&self, kind: KindId) -> &KindSpec {
        &self.kinds[kind.index()]
    }

    pub fn name(&self, kind: KindId) -> &str {
        &self.spec(kind).name
    }

    /// Rank of `kind` in the base total order
    pub fn base_order(&self, kind: KindId) -> u32 {
        self.spec(kind).rank
    }

    pub fn is_tag_bearing(&self, kind: KindId) -> bool {
        self.spec(kind).tag_bearing
    }

    pub fn is_placeholder(&self, kind: KindId) -> Placeholder {
        self.spec(kind).placeholder
    }

    pub fn polymorphic_counterpart(&self, kind: KindId) -> Option<KindId> {
        self.spec(kind).polymorphic
    }

    pub fn poly(&self) -> KindId {
        self.poly
    }

    pub fn poly_use(&self) -> KindId {
        self.poly_use
    }

    pub fn bottom(&self) -> KindId {
        KindId(0)
    }

    pub fn top(&self) -> KindId {
        KindId((self.kinds.len() - 1) as u16)
    }

    /// Kind-level least upper bound
    pub fn lub_kind(&self, a: KindId, b: KindId) -> KindId {
        self.lub_table[a.index() * self.kinds.len() + b.index()]
    }

    /// Kind-level greatest lower bound
    pub fn glb_kind(&self, a: KindId, b: KindId) -> KindId {
        self.glb_table[a.index() * self.kinds.len() + b.index()]
    }

    /// The elementless qualifier standing for `kind`, if it has one
    ///
    /// Tag-bearing kinds have no single representative.
    pub fn representative(&self, kind: KindId) -> Option<Qualifier> {
        let spec = self.kinds.get(kind.index())?;
        (!spec.tag_bearing).then(|| Qualifier::from_parts(kind, TagSet::new()))
    }

    /// Look up a plain kind (or placeholder) by name or alias
    pub fn kind_named(&self, name: &str) -> Result<KindId> {
        let canonical = self.canonical_name(name);
        self.plain_by_name
            .get(canonical)
            .or_else(|| self.tagged_by_name.get(canonical))
            .copied()
            .ok_or_else(|| ClassificationError::UnknownKind { name: name.to_string() })
    }

    /// Look up the tag-bearing variant registered under `name` or an alias
    pub fn tagged_kind_named(&self, name: &str) -> Result<KindId> {
        let canonical = self.canonical_name(name);
        self.tagged_by_name
            .get(canonical)
            .copied()
            .ok_or_else(|| ClassificationError::UnknownKind {
                name: format!("{name}[..]"),
            })
    }

    fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    /// Qualifier for a plain kind
    pub fn qualifier(&self, kind: KindId) -> Result<Qualifier> {
        if self.is_tag_bearing(kind) {
            return Err(ClassificationError::TagsRequired {
                kind: self.name(kind).to_string(),
            });
        }
        Ok(Qualifier::from_parts(kind, TagSet::new()))
    }

    /// Qualifier for a tag-bearing kind
    pub fn tagged(&self, kind: KindId, tags: TagSet) -> Result<Qualifier> {
        if !self.is_tag_bearing(kind) {
            return Err(ClassificationError::NotTagBearing {
                kind: self.name(kind).to_string(),
            });
        }
        Ok(Qualifier::from_parts(kind, tags))
    }

    /// Parse `Name` or `Name[tag, tag]`, accepting alias spellings
    pub fn parse_qualifier(&self, text: &str) -> Result<Qualifier> {
        let text = text.trim();
        match text.split_once('[') {
            Some((name, rest)) => {
                let tags = rest.strip_suffix(']').ok_or_else(|| ClassificationError::UnknownKind {
                    name: text.to_string(),
                })?;
                let kind = self.tagged_kind_named(name.trim())?;
                self.tagged(kind, TagSet::parse(tags))
            }
            None => self.qualifier(self.kind_named(text)?),
        }
    }

    /// Human-readable rendering of a qualifier
    pub fn describe(&self, qualifier: &Qualifier) -> String {
        let name = self.name(qualifier.kind);
        if self.is_tag_bearing(qualifier.kind) {
            format!("{name}[{}]", qualifier.tags)
        } else {
            name.to_string()
        }
    }

    pub(crate) fn describe_kind(&self, kind: KindId) -> String {
        let spec = self.spec(kind);
        if spec.tag_bearing {
            format!("{}[..]", spec.name)
        } else {
            spec.name.clone()
        }
    }
}

#[cfg(test)]
impl Catalog {
    /// Bypass builder validation to exercise the runtime consistency checks
    pub(crate) fn force_bound(&mut self, a: KindId, b: KindId, result: KindId, is_lub: bool) {
        let n = self.kinds.len();
        let table = if is_lub { &mut self.lub_table } else { &mut self.glb_table };
        table[a.index() * n + b.index()] = result;
        table[b.index() * n + a.index()] = result;
    }

    pub(crate) fn force_counterpart(&mut self, kind: KindId, counterpart: KindId) {
        self.kinds[kind.index()].polymorphic = Some(counterpart);
    }
}

/// Incremental construction of a [`Catalog`]
///
/// Kinds are ranked in registration order, so register the bottom first.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    kinds: Vec<KindSpec>,
    aliases: Vec<(String, String)>,
    bound_overrides: Vec<(KindId, KindId, KindId, bool)>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, name: &str, tag_bearing: bool, placeholder: Placeholder) -> KindId {
        let id = KindId(self.kinds.len() as u16);
        self.kinds.push(KindSpec {
            name: name.to_string(),
            rank: self.kinds.len() as u32,
            tag_bearing,
            placeholder,
            polymorphic: None,
        });
        id
    }

    /// Register a plain level above everything registered so far
    pub fn level(&mut self, name: &str) -> KindId {
        self.push(name, false, Placeholder::None)
    }

    /// Register a tag-bearing level above everything registered so far
    pub fn tagged_level(&mut self, name: &str) -> KindId {
        self.push(name, true, Placeholder::None)
    }

    pub fn placeholder(&mut self, name: &str, role: Placeholder) -> KindId {
        self.push(name, false, role)
    }

    pub fn polymorphic_counterpart(&mut self, kind: KindId, counterpart: KindId) -> &mut Self {
        if let Some(spec) = self.kinds.get_mut(kind.index()) {
            spec.polymorphic = Some(counterpart);
        }
        self
    }

    pub fn alias(&mut self, alias: &str, canonical: &str) -> &mut Self {
        self.aliases.push((alias.to_string(), canonical.to_string()));
        self
    }

    /// Override the kind-level lub of `a` and `b` (both orders)
    pub fn lub_override(&mut self, a: KindId, b: KindId, result: KindId) -> &mut Self {
        self.bound_overrides.push((a, b, result, true));
        self
    }

    /// Override the kind-level glb of `a` and `b` (both orders)
    pub fn glb_override(&mut self, a: KindId, b: KindId, result: KindId) -> &mut Self {
        self.bound_overrides.push((a, b, result, false));
        self
    }

    pub fn build(self) -> Result<Catalog> {
        let n = self.kinds.len();
        if n == 0 {
            return Err(invalid("no kinds registered"));
        }

        let mut plain_by_name = IndexMap::new();
        let mut tagged_by_name = IndexMap::new();
        for (i, spec) in self.kinds.iter().enumerate() {
            let map = if spec.tag_bearing {
                &mut tagged_by_name
            } else {
                &mut plain_by_name
            };
            if map.insert(spec.name.clone(), KindId(i as u16)).is_some() {
                return Err(ClassificationError::DuplicateKind { name: spec.name.clone() });
            }
        }

        let poly = single_placeholder(&self.kinds, Placeholder::Poly)?;
        let poly_use = single_placeholder(&self.kinds, Placeholder::PolyUse)?;

        for spec in &self.kinds {
            if let Some(counterpart) = spec.polymorphic {
                let representable = self.kinds.get(counterpart.index()).is_some_and(|c| !c.tag_bearing);
                if !representable {
                    return Err(ClassificationError::MissingPolymorphicQualifier {
                        kind: spec.name.clone(),
                        counterpart: self
                            .kinds
                            .get(counterpart.index())
                            .map(|c| c.name.clone())
                            .unwrap_or_else(|| format!("#{}", counterpart.index())),
                    });
                }
            }
        }

        let mut lub_table = Vec::with_capacity(n * n);
        let mut glb_table = Vec::with_capacity(n * n);
        for a in 0..n {
            for b in 0..n {
                let (lo, hi) = if self.kinds[a].rank <= self.kinds[b].rank { (a, b) } else { (b, a) };
                lub_table.push(KindId(hi as u16));
                glb_table.push(KindId(lo as u16));
            }
        }
        for &(a, b, result, is_lub) in &self.bound_overrides {
            if a.index() >= n || b.index() >= n || result.index() >= n {
                return Err(invalid("bound override names an unregistered kind"));
            }
            if result != a && result != b {
                return Err(ClassificationError::InconsistentBound {
                    op: if is_lub { BoundOp::Lub } else { BoundOp::Glb },
                    left: self.kinds[a.index()].name.clone(),
                    right: self.kinds[b.index()].name.clone(),
                    result: self.kinds[result.index()].name.clone(),
                });
            }
            let table = if is_lub { &mut lub_table } else { &mut glb_table };
            table[a.index() * n + b.index()] = result;
            table[b.index() * n + a.index()] = result;
        }

        let mut catalog = Catalog {
            kinds: self.kinds,
            plain_by_name,
            tagged_by_name,
            aliases: BTreeMap::new(),
            lub_table,
            glb_table,
            poly,
            poly_use,
        };
        let aliases: Vec<(String, String)> = self.aliases;
        catalog = catalog.with_aliases(aliases.iter().map(|(a, c)| (a, c)))?;
        Ok(catalog)
    }
}

fn single_placeholder(kinds: &[KindSpec], role: Placeholder) -> Result<KindId> {
    let mut found = kinds
        .iter()
        .enumerate()
        .filter(|(_, spec)| spec.placeholder == role)
        .map(|(i, _)| KindId(i as u16));
    match (found.next(), found.next()) {
        (Some(id), None) => Ok(id),
        (None, _) => Err(invalid(&format!("no {role:?} placeholder registered"))),
        (Some(_), Some(_)) => Err(invalid(&format!("more than one {role:?} placeholder registered"))),
    }
}

fn invalid(reason: &str) -> ClassificationError {
    ClassificationError::InvalidCatalog {
        reason: reason.to_string(),
    }
}
