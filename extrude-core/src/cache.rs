use crate::{Reflect, Result, TypeDescriptor, TypeInfo};
use std::{
    any::TypeId,
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

/// Descriptors of the record types seen so far, built on first use.
///
/// Create one and share it (usually behind an `Arc`) between the callers
/// that need it. Lookup, construction and publication happen under a single
/// lock, so concurrent callers asking for the same type get the same
/// `Arc<TypeDescriptor>` and the type is built once. Failed constructions
/// leave no entry behind.
#[derive(Default, Debug)]
pub struct DescriptorCache {
    descriptors: Mutex<HashMap<TypeId, Arc<TypeDescriptor>>>,
}

impl DescriptorCache {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn describe<T: Reflect>(&self) -> Result<Arc<TypeDescriptor>> {
        self.describe_type(&T::type_info())
    }

    /// Descriptor of the record behind `instance`.
    pub fn describe_of(&self, instance: &dyn Reflect) -> Result<Arc<TypeDescriptor>> {
        self.describe_type(&instance.target().reflect_type())
    }

    pub fn describe_type(&self, info: &TypeInfo) -> Result<Arc<TypeDescriptor>> {
        let resolved = info.strip_pointers();
        let mut descriptors = self
            .descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = resolved.as_struct()
            && let Some(descriptor) = descriptors.get(&record.id)
        {
            log::trace!("Descriptor cache hit for {}", resolved.name);
            return Ok(descriptor.clone());
        }
        match TypeDescriptor::build(info) {
            Ok(descriptor) => {
                log::debug!(
                    "Built descriptor of {} for table {} with columns: {}",
                    descriptor.type_name(),
                    descriptor.table(),
                    descriptor.labels().join(", "),
                );
                let descriptor = Arc::new(descriptor);
                descriptors.insert(descriptor.type_id(), descriptor.clone());
                Ok(descriptor)
            }
            Err(e) => {
                log::debug!("Cannot describe {}: {:#}", info.name, e);
                Err(e)
            }
        }
    }

    pub fn contains<T: Reflect>(&self) -> bool {
        self.contains_type(&T::type_info())
    }

    pub fn contains_type(&self, info: &TypeInfo) -> bool {
        let Some(record) = info.strip_pointers().as_struct().copied() else {
            return false;
        };
        self.descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&record.id)
    }

    /// Number of published descriptors.
    pub fn len(&self) -> usize {
        self.descriptors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
