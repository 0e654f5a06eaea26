//! Classification registry contract
//!
//! The reporting side owns the taxonomy. Checks only register their class
//! once and stamp every issue with the handle they get back.

use serde::Serialize;

/// Opaque classification handle minted by a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClassHandle(u32);

impl ClassHandle {
    /// For registry implementations
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

/// Reporting registry that checks register their classification with
pub trait ClassRegistry {
    /// Registers one class, returning the handle to stamp issues with
    fn register_class(&mut self, item: &str, level: &str, tags: &[String], title: &str)
        -> ClassHandle;
}

/// A class as recorded by [`MemoryClassRegistry`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisteredClass {
    pub item: String,
    pub level: String,
    pub tags: Vec<String>,
    pub title: String,
}

/// In-memory registry, handles are registration indexes
#[derive(Debug, Default)]
pub struct MemoryClassRegistry {
    classes: Vec<RegisteredClass>,
}

impl MemoryClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a registered class
    pub fn get(&self, handle: ClassHandle) -> Option<&RegisteredClass> {
        self.classes.get(handle.raw() as usize)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl ClassRegistry for MemoryClassRegistry {
    fn register_class(
        &mut self,
        item: &str,
        level: &str,
        tags: &[String],
        title: &str,
    ) -> ClassHandle {
        self.classes.push(RegisteredClass {
            item: item.to_string(),
            level: level.to_string(),
            tags: tags.to_vec(),
            title: title.to_string(),
        });
        ClassHandle::new((self.classes.len() - 1) as u32)
    }
}
