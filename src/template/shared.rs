//! Copy-on-write holder for the active compiled template.
//!
//! Readers take a snapshot and validate against it without locking. A
//! configuration reload compiles the new template first and only then swaps
//! the pointer, so a reader sees either the old artifact or the new one in
//! full.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwap;

use super::TemplateError;
use super::compiler::{CompiledTemplate, Template};
use super::validator::ValidationResult;

pub struct SharedTemplate {
    current: ArcSwap<CompiledTemplate>,
    /// Bumped on every successful publish.
    generation: AtomicU64,
}

impl SharedTemplate {
    pub fn new(compiled: CompiledTemplate) -> Self {
        Self {
            current: ArcSwap::from_pointee(compiled),
            generation: AtomicU64::new(0),
        }
    }

    pub fn compile(template: &Template) -> Result<Self, TemplateError> {
        Ok(Self::new(template.compile()?))
    }

    /// Snapshot of the current compiled template.
    pub fn load(&self) -> Arc<CompiledTemplate> {
        self.current.load_full()
    }

    /// Compile `template` and publish it. On error the previous artifact
    /// stays active.
    pub fn replace(&self, template: &Template) -> Result<u64, TemplateError> {
        let compiled = template.compile()?;
        Ok(self.publish(compiled))
    }

    /// Publish an already compiled template and return the new generation.
    pub fn publish(&self, compiled: CompiledTemplate) -> u64 {
        self.current.store(Arc::new(compiled));
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    pub fn validate_filename(&self, filename: &str) -> ValidationResult {
        self.current.load().validate_filename(filename)
    }
}

impl std::fmt::Debug for SharedTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedTemplate")
            .field("composite", &self.current.load().composite_pattern())
            .field("generation", &self.generation())
            .finish()
    }
}
