//! Aggregate classification inference for declarations
//!
//! A declaration's effective qualifier is the least upper bound of the
//! qualifier written on it (Public when absent) and the qualifiers of its
//! non-static fields and method return types. A container exposing a
//! Restricted field is itself Restricted.
//!
//! Declarations can reference each other cyclically through member types.
//! Before a declaration's members are visited, its as-declared qualifier is
//! written to the cache and pinned in an in-progress map; a reentrant lookup
//! of the same declaration returns that value instead of recursing. Pinned
//! entries are never evicted, so a cache smaller than the cycle still
//! terminates.

use crate::cache::LruCache;
use crate::catalog::Qualifier;
use crate::config::AnalysisConfig;
use crate::error::{ClassificationError, Result};
use crate::hierarchy::QualifierHierarchy;
use crate::model::{AnnotatedType, DeclId, Declaration, DeclarationGraph, MemberKind, TypeShape};
use indexmap::IndexMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedQualifier {
    qualifier: Qualifier,
    /// False for the pre-aggregation write
    complete: bool,
}

/// Counters for one inference run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered by a completed cache entry
    pub hits: usize,
    /// Lookups answered by a declaration still being aggregated
    pub reentrant_hits: usize,
    /// Declarations aggregated
    pub misses: usize,
    pub evictions: usize,
}

/// Memoizing inference engine scoped to one analysis run over one graph
#[derive(Debug)]
pub struct EntityInference<'h> {
    hierarchy: &'h QualifierHierarchy,
    cache: LruCache<DeclId, CachedQualifier>,
    in_progress: IndexMap<DeclId, Qualifier>,
    stats: CacheStats,
}

impl<'h> EntityInference<'h> {
    pub fn new(hierarchy: &'h QualifierHierarchy, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let cache = LruCache::new(config.cache_capacity);
        debug!(capacity = cache.capacity(), "inference cache ready");
        Ok(Self {
            hierarchy,
            cache,
            in_progress: IndexMap::new(),
            stats: CacheStats::default(),
        })
    }

    pub fn with_capacity(hierarchy: &'h QualifierHierarchy, capacity: usize) -> Result<Self> {
        Self::new(hierarchy, &AnalysisConfig::default().with_cache_capacity(capacity))
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Effective qualifier of the declaration `id`
    pub fn resolve_entity_qualifier(&mut self, graph: &DeclarationGraph, id: DeclId) -> Result<Qualifier> {
        if let Some(pending) = self.in_progress.get(&id) {
            self.stats.reentrant_hits += 1;
            debug!(decl = id.index(), "reentrant lookup served from pre-aggregation value");
            return Ok(pending.clone());
        }
        if let Some(entry) = self.cache.get(&id) {
            if entry.complete {
                self.stats.hits += 1;
                debug!(decl = id.index(), "inference cache hit");
                return Ok(entry.qualifier.clone());
            }
        }

        let decl = graph.get(id).ok_or_else(|| ClassificationError::UnknownDeclaration {
            name: format!("#{}", id.index()),
        })?;
        self.stats.misses += 1;

        let as_declared = decl.qualifier.clone().unwrap_or_else(|| self.hierarchy.bottom());
        debug!(
            decl = %decl.name,
            as_declared = %self.hierarchy.catalog().describe(&as_declared),
            "pre-aggregation write"
        );
        self.in_progress.insert(id, as_declared.clone());
        self.store(id, as_declared.clone(), false);

        let aggregated = self.aggregate(graph, decl, as_declared);
        self.in_progress.shift_remove(&id);
        let aggregated = match aggregated {
            Ok(qualifier) => qualifier,
            Err(err) => {
                self.cache.remove(&id);
                return Err(err);
            }
        };

        debug!(
            decl = %decl.name,
            inferred = %self.hierarchy.catalog().describe(&aggregated),
            "aggregation complete"
        );
        self.store(id, aggregated.clone(), true);
        Ok(aggregated)
    }

    /// Effective qualifier of the declaration called `name`
    pub fn resolve_named(&mut self, graph: &DeclarationGraph, name: &str) -> Result<Qualifier> {
        let id = graph.require(name)?;
        self.resolve_entity_qualifier(graph, id)
    }

    /// Effective qualifiers of every declaration, in graph order
    pub fn infer_all(&mut self, graph: &DeclarationGraph) -> Result<IndexMap<String, Qualifier>> {
        let mut inferred = IndexMap::with_capacity(graph.len());
        for (id, decl) in graph.iter() {
            let qualifier = self.resolve_entity_qualifier(graph, id)?;
            inferred.insert(decl.name.clone(), qualifier);
        }
        Ok(inferred)
    }

    fn aggregate(
        &mut self,
        graph: &DeclarationGraph,
        decl: &Declaration,
        as_declared: Qualifier,
    ) -> Result<Qualifier> {
        let mut acc = as_declared;
        for member in decl.members.iter().filter(|member| !member.is_static) {
            let Some(ty) = &member.ty else {
                continue;
            };
            let Some(member_lub) = self.type_lub(graph, ty)? else {
                continue;
            };
            if member.kind == MemberKind::Method && member_lub == self.hierarchy.poly() {
                debug!(decl = %decl.name, method = %member.name, "skipping unresolved polymorphic return");
                continue;
            }
            acc = self.hierarchy.least_upper_bound(&acc, &member_lub)?;
        }
        Ok(acc)
    }

    /// Least upper bound of `ty` and all of its component types
    ///
    /// A declared type without a written qualifier takes the effective
    /// qualifier of the declaration it names, when the graph has one.
    pub fn type_lub(&mut self, graph: &DeclarationGraph, ty: &AnnotatedType) -> Result<Option<Qualifier>> {
        match &ty.shape {
            TypeShape::Leaf => Ok(ty.qualifier.clone()),
            TypeShape::Array(element) => {
                let element_lub = self.type_lub(graph, element)?;
                self.join(ty.qualifier.clone(), element_lub)
            }
            TypeShape::Declared { name, args } => {
                let mut result = match &ty.qualifier {
                    Some(qualifier) => Some(qualifier.clone()),
                    None => match graph.id_of(name) {
                        Some(id) => Some(self.resolve_entity_qualifier(graph, id)?),
                        None => None,
                    },
                };
                for arg in args {
                    let arg_lub = self.type_lub(graph, arg)?;
                    result = self.join(result, arg_lub)?;
                }
                Ok(result)
            }
        }
    }

    fn join(&self, a: Option<Qualifier>, b: Option<Qualifier>) -> Result<Option<Qualifier>> {
        match (a, b) {
            (Some(a), Some(b)) => self.hierarchy.least_upper_bound(&a, &b).map(Some),
            (a, None) => Ok(a),
            (None, b) => Ok(b),
        }
    }

    fn store(&mut self, id: DeclId, qualifier: Qualifier, complete: bool) {
        if let Some((evicted, _)) = self.cache.insert(id, CachedQualifier { qualifier, complete }) {
            self.stats.evictions += 1;
            debug!(decl = evicted.index(), "evicted from inference cache");
        }
    }
}
