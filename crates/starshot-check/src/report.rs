use std::thread;

use serde::Serialize;
use starshot_ir::Program;
use tracing::{debug, info};

use crate::{check_contracts, check_effects, check_names, check_types};

/// Diagnostics from every checking pass, grouped by pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub names: Vec<String>,
    pub types: Vec<String>,
    pub effects: Vec<String>,
    pub contracts: Vec<String>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.names.len() + self.types.len() + self.effects.len() + self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_clean()
    }

    /// All diagnostics, each paired with the pass that produced it.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        tagged("names", &self.names)
            .chain(tagged("types", &self.types))
            .chain(tagged("effects", &self.effects))
            .chain(tagged("contracts", &self.contracts))
    }
}

fn tagged<'r>(pass: &'static str, messages: &'r [String]) -> impl Iterator<Item = (&'static str, &'r str)> {
    messages.iter().map(move |m| (pass, m.as_str()))
}

/// Run every checking pass over `program`.
///
/// The type, effect and contract passes only read the program, so they run
/// on their own scoped threads.
pub fn check_program(program: &Program) -> Report {
    let names = check_names(program);
    let (types, effects, contracts) = thread::scope(|scope| {
        let types = scope.spawn(|| check_types(program));
        let effects = scope.spawn(|| check_effects(program));
        let contracts = scope.spawn(|| check_contracts(program));
        (join(types), join(effects), join(contracts))
    });

    let report = Report {
        names,
        types,
        effects,
        contracts,
    };
    for (pass, message) in report.iter() {
        debug!(pass, "{message}");
    }
    info!(diagnostics = report.len(), "checked program");
    report
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    match handle.join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
