use crate::exception::Exception;
use std::any::{TypeId, type_name};
use std::collections::{HashMap, HashSet};
use std::error::Error;

/// Tests whether an exception's concrete type is exactly the probed type.
type Probe = fn(&Exception) -> bool;

fn probe<T: Error + Send + Sync + 'static>(exception: &Exception) -> bool {
    exception.is::<T>()
}

#[derive(Clone)]
struct TypeEntry {
    name: &'static str,
    parent: Option<TypeId>,
    probe: Probe,
}

/// Declared exception hierarchy.
///
/// Rust types carry no inheritance, so the "is-a" relation between exception
/// types is declared here: every type has at most one parent. Dispatch uses
/// the catalog to answer two questions, how deep a type sits in its chain
/// and whether a thrown value is an instance of a type or of one of its
/// descendants.
///
/// ```
/// use global_exception_handler::TypeCatalog;
/// # #[derive(Debug, thiserror::Error)]
/// # #[error("base")]
/// # struct Base;
/// # #[derive(Debug, thiserror::Error)]
/// # #[error("derived")]
/// # struct Derived;
/// let mut catalog = TypeCatalog::new();
/// catalog.extends::<Derived, Base>();
///
/// assert_eq!(catalog.depth_of(std::any::TypeId::of::<Derived>()), 1);
/// assert!(catalog.is_instance_of(&Derived, std::any::TypeId::of::<Base>()));
/// ```
#[derive(Clone, Default)]
pub struct TypeCatalog {
    entries: HashMap<TypeId, TypeEntry>,
    order: Vec<TypeId>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a type, keeping its parent if it was already declared.
    pub fn declare<T: Error + Send + Sync + 'static>(&mut self) -> &mut Self {
        let type_id = TypeId::of::<T>();
        if !self.entries.contains_key(&type_id) {
            self.entries.insert(
                type_id,
                TypeEntry {
                    name: type_name::<T>(),
                    parent: None,
                    probe: probe::<T>,
                },
            );
            self.order.push(type_id);
        }
        self
    }

    /// Declare `Child` as a direct descendant of `Parent`.
    ///
    /// Declaring another parent for the same child replaces the previous one.
    pub fn extends<Child, Parent>(&mut self) -> &mut Self
    where
        Child: Error + Send + Sync + 'static,
        Parent: Error + Send + Sync + 'static,
    {
        self.declare::<Parent>().declare::<Child>();
        if let Some(entry) = self.entries.get_mut(&TypeId::of::<Child>()) {
            entry.parent = Some(TypeId::of::<Parent>());
        }
        self
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.entries.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of a declared type
    pub fn name_of(&self, type_id: TypeId) -> Option<&'static str> {
        self.entries.get(&type_id).map(|entry| entry.name)
    }

    /// The type itself followed by its ancestors, nearest first.
    ///
    /// A parent cycle is cut at the first repeated type.
    pub fn ancestry(&self, type_id: TypeId) -> Vec<TypeId> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(type_id);

        while let Some(id) = current {
            if !seen.insert(id) {
                break;
            }
            chain.push(id);
            current = self.entries.get(&id).and_then(|entry| entry.parent);
        }

        chain
    }

    /// Number of ancestors above a type. Roots and undeclared types are depth 0.
    pub fn depth_of(&self, type_id: TypeId) -> usize {
        self.ancestry(type_id).len().saturating_sub(1)
    }

    /// The declared type matching the exception's concrete type.
    pub fn runtime_type_of(&self, exception: &Exception) -> Option<TypeId> {
        self.order.iter().copied().find(|id| {
            self.entries
                .get(id)
                .is_some_and(|entry| (entry.probe)(exception))
        })
    }

    /// Runtime type of the exception plus its ancestors; empty when undeclared.
    pub fn lineage_of(&self, exception: &Exception) -> Vec<TypeId> {
        self.runtime_type_of(exception)
            .map(|id| self.ancestry(id))
            .unwrap_or_default()
    }

    /// Whether the exception is of `type_id` or of one of its descendants.
    pub fn is_instance_of(&self, exception: &Exception, type_id: TypeId) -> bool {
        self.lineage_of(exception).contains(&type_id)
    }
}

impl std::fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.order.iter().filter_map(|id| self.name_of(*id)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("base")]
    struct BaseException;

    #[derive(Debug, thiserror::Error)]
    #[error("level 1 a")]
    struct Level1ExceptionA;

    #[derive(Debug, thiserror::Error)]
    #[error("level 1 b")]
    struct Level1ExceptionB;

    #[derive(Debug, thiserror::Error)]
    #[error("level 2 b")]
    struct Level2ExceptionB;

    #[derive(Debug, thiserror::Error)]
    #[error("unrelated")]
    struct Unrelated;

    fn hierarchy() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog
            .extends::<Level1ExceptionA, BaseException>()
            .extends::<Level1ExceptionB, BaseException>()
            .extends::<Level2ExceptionB, Level1ExceptionB>();
        catalog
    }

    #[test]
    fn test_depth_follows_parent_chain() {
        let catalog = hierarchy();
        assert_eq!(catalog.depth_of(TypeId::of::<BaseException>()), 0);
        assert_eq!(catalog.depth_of(TypeId::of::<Level1ExceptionA>()), 1);
        assert_eq!(catalog.depth_of(TypeId::of::<Level2ExceptionB>()), 2);
        assert_eq!(catalog.depth_of(TypeId::of::<Unrelated>()), 0);
    }

    #[test]
    fn test_instance_of_includes_ancestors() {
        let catalog = hierarchy();
        let thrown = Level2ExceptionB;

        assert!(catalog.is_instance_of(&thrown, TypeId::of::<Level2ExceptionB>()));
        assert!(catalog.is_instance_of(&thrown, TypeId::of::<Level1ExceptionB>()));
        assert!(catalog.is_instance_of(&thrown, TypeId::of::<BaseException>()));
        assert!(!catalog.is_instance_of(&thrown, TypeId::of::<Level1ExceptionA>()));
    }

    #[test]
    fn test_instance_of_is_not_reversed() {
        let catalog = hierarchy();
        assert!(!catalog.is_instance_of(&Level1ExceptionB, TypeId::of::<Level2ExceptionB>()));
    }

    #[test]
    fn test_undeclared_exception_has_no_lineage() {
        let catalog = hierarchy();
        assert!(catalog.runtime_type_of(&Unrelated).is_none());
        assert!(catalog.lineage_of(&Unrelated).is_empty());
    }

    #[test]
    fn test_redeclaring_parent_replaces_it() {
        let mut catalog = hierarchy();
        catalog.extends::<Level2ExceptionB, Level1ExceptionA>();

        assert!(catalog.is_instance_of(&Level2ExceptionB, TypeId::of::<Level1ExceptionA>()));
        assert!(!catalog.is_instance_of(&Level2ExceptionB, TypeId::of::<Level1ExceptionB>()));
    }

    #[test]
    fn test_parent_cycle_terminates() {
        let mut catalog = TypeCatalog::new();
        catalog
            .extends::<Level1ExceptionA, BaseException>()
            .extends::<BaseException, Level1ExceptionA>();

        assert_eq!(catalog.depth_of(TypeId::of::<BaseException>()), 1);
        assert_eq!(catalog.ancestry(TypeId::of::<Level1ExceptionA>()).len(), 2);
    }
}
