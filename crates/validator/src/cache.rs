//! Plan cache
//!
//! Plans live in an immutable map published through [`ArcSwap`]: lookups are
//! a lock-free snapshot load, and a walk keeps the snapshot it started with
//! even if the cache is invalidated midway. Compilation is serialized by a
//! mutex and publishes a new map holding the requested type together with
//! every record type reachable from it, so a snapshot that holds a type also
//! holds all of its nested plans.

use std::any::TypeId;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::error::Result;
use crate::plan::{CompiledPlan, Compiler};
use crate::record::RecordType;

pub(crate) type PlanMap = HashMap<TypeId, Arc<CompiledPlan>>;

/// A published plan map plus the plan that was asked for.
pub(crate) struct Snapshot {
    pub(crate) plans: Arc<PlanMap>,
    pub(crate) root: Arc<CompiledPlan>,
}

pub(crate) struct PlanCache {
    plans: ArcSwap<PlanMap>,
    compiling: Mutex<()>,
}

impl PlanCache {
    pub(crate) fn new() -> Self {
        Self {
            plans: ArcSwap::from_pointee(PlanMap::new()),
            compiling: Mutex::new(()),
        }
    }

    /// Returns a snapshot holding `root` and everything it reaches,
    /// compiling what is missing.
    ///
    /// A compile error leaves the cache as it was.
    pub(crate) fn ensure(&self, root: RecordType, compiler: &Compiler<'_>) -> Result<Snapshot> {
        let plans = self.plans.load_full();
        if let Some(plan) = plans.get(&root.id()) {
            tracing::trace!(record = root.name(), "plan cache hit");
            return Ok(Snapshot {
                root: Arc::clone(plan),
                plans,
            });
        }

        let _guard = self.compiling.lock();

        // Another thread may have published it while we waited.
        let current = self.plans.load_full();
        if let Some(plan) = current.get(&root.id()) {
            return Ok(Snapshot {
                root: Arc::clone(plan),
                plans: current,
            });
        }

        let mut next = (*current).clone();
        let root_plan = compile_closure(root, &mut next, compiler)?;
        let next = Arc::new(next);
        self.plans.store(Arc::clone(&next));

        Ok(Snapshot {
            plans: next,
            root: root_plan,
        })
    }

    /// Drops every plan; running walks keep their snapshot.
    pub(crate) fn clear(&self) {
        let _guard = self.compiling.lock();
        let dropped = self.plans.swap(Arc::new(PlanMap::new())).len();
        if dropped > 0 {
            tracing::debug!(plans = dropped, "plan cache invalidated");
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.plans.load().len()
    }
}

impl fmt::Debug for PlanCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlanCache")
            .field("plans", &self.len())
            .finish()
    }
}

/// Compiles `root` and every record type reachable from it that `plans` does
/// not hold yet, inserting them into `plans`.
///
/// A type is marked as queued before it is compiled, so cyclic type graphs
/// compile each type exactly once.
fn compile_closure(
    root: RecordType,
    plans: &mut PlanMap,
    compiler: &Compiler<'_>,
) -> Result<Arc<CompiledPlan>> {
    let mut queued = HashSet::from([root.id()]);
    let mut pending = VecDeque::from([root]);
    let mut compiled = Vec::new();

    while let Some(record) = pending.pop_front() {
        let plan = compiler.compile(record)?;
        for nested in plan.nested() {
            if !plans.contains_key(&nested.id()) && queued.insert(nested.id()) {
                pending.push_back(nested);
            }
        }
        compiled.push(Arc::new(plan));
    }

    let root_plan = Arc::clone(&compiled[0]);
    plans.extend(
        compiled
            .into_iter()
            .map(|plan| (plan.record().id(), plan)),
    );
    Ok(root_plan)
}
