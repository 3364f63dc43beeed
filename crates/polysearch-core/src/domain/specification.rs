//! Specification pattern for in-process record matching
//!
//! Storage backends that evaluate filters in memory check records
//! against a specification instead of translating it into a query language.

/// Core specification trait for business rules
///
/// Specifications are predicate objects evaluated against a single entity.
pub trait Specification<T: ?Sized>: Send + Sync {
    /// Check if the entity satisfies this specification
    fn is_satisfied_by(&self, entity: &T) -> bool;

    /// Keep only the entities satisfying this specification
    fn select<'a, I>(&self, entities: I) -> Vec<&'a T>
    where
        I: IntoIterator<Item = &'a T>,
        T: 'a,
        Self: Sized,
    {
        entities
            .into_iter()
            .filter(|entity| self.is_satisfied_by(entity))
            .collect()
    }
}
