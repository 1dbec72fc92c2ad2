//! Static checks and dry runs over the declared dependency graph.
//!
//! Nothing here constructs a value. [`GraphValidator`] walks every
//! registration looking for cycles and captive dependencies;
//! [`PlanBuilder`] walks from one root and records the order the resolver
//! would construct things in.
//!
//! Parameters whose type is not registered are extra arguments, not
//! missing dependencies, so neither walk treats them as errors.

use std::collections::HashSet;
use std::fmt;

use gic_support::rendering::{PlanLine, render_plan};
use tracing::{debug, instrument, warn};

use crate::descriptor::TypeDescriptor;
use crate::error::{CyclicDependencyError, GicError, Result};
use crate::key::TypeKey;
use crate::registry::{RegistrationEntry, Registry};
use crate::scope::Scope;

/// A singleton that holds on to a transient dependency.
///
/// Allowed, but the transient is only ever built once for that singleton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptiveDependency {
    pub consumer: TypeKey,
    pub dependency: TypeKey,
}

/// Outcome of [`Registry::validate`].
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Number of distinct registered types visited.
    pub types_checked: usize,
    pub captive_dependencies: Vec<CaptiveDependency>,
}

/// Depth-first walk over the registry.
pub(crate) struct GraphValidator<'r> {
    registry: &'r Registry,
    visiting: HashSet<TypeKey>,
    validated: HashSet<TypeKey>,
    path: Vec<TypeKey>,
    captive: Vec<CaptiveDependency>,
}

impl<'r> GraphValidator<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
            captive: Vec::new(),
        }
    }

    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(mut self) -> Result<ValidationReport> {
        debug!(registered = self.registry.len(), "Validating dependency graph");

        let registry = self.registry;
        for entry in registry.entries() {
            self.visit(entry.key())?;
        }

        debug!(types = self.validated.len(), "Dependency graph is acyclic");
        Ok(ValidationReport {
            types_checked: self.validated.len(),
            captive_dependencies: self.captive,
        })
    }

    fn visit(&mut self, key: TypeKey) -> Result<()> {
        if self.validated.contains(&key) {
            return Ok(());
        }

        if self.visiting.contains(&key) {
            let start = self.path.iter().position(|k| *k == key).unwrap_or(0);
            let mut chain = self.path[start..].to_vec();
            chain.push(key);
            warn!(cycle = ?chain, "Cyclic dependency detected");
            return Err(GicError::CyclicDependency(CyclicDependencyError { chain }));
        }

        let registry = self.registry;
        let Some(entry) = registry.lookup(&key) else {
            return Ok(());
        };

        self.visiting.insert(key);
        self.path.push(key);

        for parameter in entry.descriptor().parameters() {
            if let Some(dependency) = registry.lookup(parameter) {
                self.check_captive(entry, dependency);
            }
            self.visit(*parameter)?;
        }

        self.path.pop();
        self.visiting.remove(&key);
        self.validated.insert(key);
        Ok(())
    }

    fn check_captive(&mut self, consumer: &RegistrationEntry, dependency: &RegistrationEntry) {
        if consumer.scope() > dependency.scope() {
            warn!(
                consumer = %consumer.key(),
                dependency = %dependency.key(),
                "Singleton captures a transient dependency"
            );
            self.captive.push(CaptiveDependency {
                consumer: consumer.key(),
                dependency: dependency.key(),
            });
        }
    }
}

/// How one step of a plan is satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Built from a registration with this scope.
    Construct(Scope),
    /// The unregistered root, built from its own descriptor.
    ConstructRoot,
    /// A singleton that already exists, either cached or built earlier in
    /// the same plan.
    Reuse,
    /// Filled by the n-th extra argument (1-based).
    Extra(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanStep {
    pub key: TypeKey,
    pub kind: StepKind,
}

/// The bottom-up order in which a resolve call would produce values.
#[derive(Debug, Clone, Default)]
pub struct ResolutionPlan {
    steps: Vec<PlanStep>,
}

impl ResolutionPlan {
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Types that would actually be constructed, in order.
    pub fn construction_order(&self) -> Vec<TypeKey> {
        self.steps
            .iter()
            .filter(|s| matches!(s.kind, StepKind::Construct(_) | StepKind::ConstructRoot))
            .map(|s| s.key)
            .collect()
    }

    /// How many extra arguments the call would consume.
    pub fn extras_needed(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.kind, StepKind::Extra(_)))
            .count()
    }
}

impl fmt::Display for ResolutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lines: Vec<PlanLine> = self
            .steps
            .iter()
            .map(|step| {
                let name = step.key.short_name();
                match step.kind {
                    StepKind::Construct(scope) => PlanLine::new(scope.to_string(), name),
                    StepKind::ConstructRoot => PlanLine::new("Root", name),
                    StepKind::Reuse => PlanLine::new("Singleton", name).with_note("reused"),
                    StepKind::Extra(n) => {
                        PlanLine::new("Extra", name).with_note(format!("extra argument #{n}"))
                    }
                }
            })
            .collect();
        f.write_str(&render_plan(&lines))
    }
}

/// Mirrors the resolver's walk without building anything.
pub(crate) struct PlanBuilder<'a> {
    registry: &'a Registry,
    is_cached: &'a dyn Fn(&TypeKey) -> bool,
    path: Vec<TypeKey>,
    planned_singletons: HashSet<TypeKey>,
    extras: usize,
    steps: Vec<PlanStep>,
}

impl<'a> PlanBuilder<'a> {
    pub fn new(registry: &'a Registry, is_cached: &'a dyn Fn(&TypeKey) -> bool) -> Self {
        Self {
            registry,
            is_cached,
            path: Vec::new(),
            planned_singletons: HashSet::new(),
            extras: 0,
            steps: Vec::new(),
        }
    }

    pub fn plan_root(mut self, root: &TypeDescriptor) -> Result<ResolutionPlan> {
        let registry = self.registry;
        match registry.lookup(&root.key()) {
            Some(entry) => self.visit_entry(entry)?,
            None => {
                self.visit_descriptor(root)?;
                self.steps.push(PlanStep {
                    key: root.key(),
                    kind: StepKind::ConstructRoot,
                });
            }
        }
        Ok(ResolutionPlan { steps: self.steps })
    }

    fn visit_entry(&mut self, entry: &RegistrationEntry) -> Result<()> {
        let key = entry.key();
        let shared = entry.scope().is_cached()
            && (self.planned_singletons.contains(&key) || (self.is_cached)(&key));

        if shared {
            self.steps.push(PlanStep {
                key,
                kind: StepKind::Reuse,
            });
            return Ok(());
        }

        self.visit_descriptor(entry.descriptor())?;
        if entry.scope().is_cached() {
            self.planned_singletons.insert(key);
        }
        self.steps.push(PlanStep {
            key,
            kind: StepKind::Construct(entry.scope()),
        });
        Ok(())
    }

    fn visit_descriptor(&mut self, descriptor: &TypeDescriptor) -> Result<()> {
        let key = descriptor.key();
        if let Some(start) = self.path.iter().position(|k| *k == key) {
            let mut chain = self.path[start..].to_vec();
            chain.push(key);
            return Err(GicError::CyclicDependency(CyclicDependencyError { chain }));
        }

        let registry = self.registry;
        self.path.push(key);
        for parameter in descriptor.parameters() {
            match registry.lookup(parameter) {
                Some(entry) => self.visit_entry(entry)?,
                None => {
                    self.extras += 1;
                    self.steps.push(PlanStep {
                        key: *parameter,
                        kind: StepKind::Extra(self.extras),
                    });
                }
            }
        }
        self.path.pop();
        Ok(())
    }
}
