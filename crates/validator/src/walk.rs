//! Traversal of values against compiled plans

use crate::cache::PlanMap;
use crate::engine::Mode;
use crate::plan::{CompiledPlan, follow};
use crate::record::{Record, Validatable};
use crate::value::{Descent, Sequence, Value};
use crate::violation::{Errors, Violation};

/// Walks one value, accumulating violations by path.
pub(crate) struct Walker<'p> {
    plans: &'p PlanMap,
    mode: Mode,
    errors: Errors,
    halted: bool,
}

impl<'p> Walker<'p> {
    pub(crate) fn new(plans: &'p PlanMap, mode: Mode) -> Self {
        Self {
            plans,
            mode,
            errors: Errors::new(),
            halted: false,
        }
    }

    pub(crate) fn finish(self) -> Errors {
        self.errors
    }

    fn report(&mut self, path: impl Into<String>, violation: Violation) {
        self.errors.add(path, violation);
        if self.mode == Mode::FailFast {
            self.halted = true;
        }
    }

    /// Walks a record whose plan is already known.
    pub(crate) fn record_with(&mut self, plan: &CompiledPlan, record: &dyn Record, prefix: &str) {
        for field in plan.fields() {
            if self.halted {
                return;
            }

            let path = format!("{prefix}{}", field.name());
            let value = field.read(record);

            for validator in field.validators() {
                if let Err(violation) = validator.check(&value) {
                    self.report(path.clone(), violation);
                    if self.halted {
                        return;
                    }
                    if self.mode == Mode::FirstPerField {
                        break;
                    }
                }
            }

            match (field.descent(), value.resolve()) {
                (Descent::Record(_), Value::Record(inner)) => {
                    self.record(inner, &format!("{path}."));
                }
                (Descent::SequenceOfRecords(_), Value::Sequence(items)) => {
                    self.sequence(items, &format!("{path}."));
                }
                _ => {}
            }
        }

        if self.halted {
            return;
        }
        if let Some(hook) = record.validatable() {
            self.hook(hook, prefix);
            return;
        }

        // Without its own hook a record inherits those of its embedded
        // records; an embedded hook shadows the ones nested below it.
        let mut claimed: Vec<&[usize]> = Vec::new();
        for path in plan.embedded() {
            if self.halted {
                return;
            }
            if claimed.iter().any(|owner| path.starts_with(owner)) {
                continue;
            }
            if let Some(hook) = follow(record, path).and_then(|owner| owner.validatable()) {
                claimed.push(path);
                self.hook(hook, prefix);
            }
        }
    }

    fn hook(&mut self, hook: &dyn Validatable, prefix: &str) {
        if let Err(errors) = hook.validate()
            && !errors.is_empty()
        {
            self.errors.merge_prefixed(prefix, errors);
            if self.mode == Mode::FailFast {
                self.halted = true;
            }
        }
    }

    /// Walks a record, looking its plan up by concrete type.
    pub(crate) fn record(&mut self, record: &dyn Record, prefix: &str) {
        let plans = self.plans;
        match plans.get(&record.record_type_id()) {
            Some(plan) => self.record_with(plan, record, prefix),
            None => self.report(
                prefix.trim_end_matches('.'),
                Violation::unsupported("record"),
            ),
        }
    }

    /// Walks each present record element under `prefix` + index.
    pub(crate) fn sequence(&mut self, items: &dyn Sequence, prefix: &str) {
        for index in 0..items.len() {
            if self.halted {
                return;
            }
            if let Value::Record(element) = items.get(index).resolve() {
                self.record(element, &format!("{prefix}{index}."));
            }
        }
    }
}
