//! PID Formula Registry

use crate::pid::{Pid, PidFormula};
use std::collections::HashMap;
use std::sync::Arc;

/// Formulas keyed by PID byte
#[derive(Clone, Default)]
pub struct PidRegistry {
    formulas: HashMap<u8, Arc<dyn PidFormula>>,
}

impl PidRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every standard Mode 01 PID
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for pid in Pid::ALL {
            registry.register(pid);
        }
        registry
    }

    /// Add a formula, replacing any previous one for the same PID
    pub fn register<F: PidFormula + 'static>(&mut self, formula: F) -> Option<Arc<dyn PidFormula>> {
        self.formulas.insert(formula.pid(), Arc::new(formula))
    }

    pub fn get(&self, pid: u8) -> Option<Arc<dyn PidFormula>> {
        self.formulas.get(&pid).cloned()
    }

    pub fn contains(&self, pid: u8) -> bool {
        self.formulas.contains_key(&pid)
    }

    pub fn len(&self) -> usize {
        self.formulas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formulas.is_empty()
    }

    /// Registered PIDs in ascending order
    pub fn pids(&self) -> Vec<u8> {
        let mut pids: Vec<u8> = self.formulas.keys().copied().collect();
        pids.sort_unstable();
        pids
    }
}

impl std::fmt::Debug for PidRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PidRegistry")
            .field("pids", &self.pids())
            .finish()
    }
}
