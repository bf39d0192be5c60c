//! Staged changes of one unit of work.

use std::mem;

use crate::Entity;

/// Buffer of inserts and deletes awaiting the next flush.
#[derive(Debug, Default)]
pub(crate) struct UnitOfWork {
    inserts: Vec<Entity>,
    deletes: Vec<Entity>,
    failed: bool,
}

impl UnitOfWork {
    pub(crate) fn stage_insert(&mut self, entity: Entity) {
        self.inserts.push(entity);
    }

    pub(crate) fn stage_delete(&mut self, entity: Entity) {
        self.deletes.push(entity);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.deletes.is_empty()
    }

    pub(crate) fn staged(&self) -> usize {
        self.inserts.len() + self.deletes.len()
    }

    /// Staged inserts, parents ahead of children. Ties keep staging order.
    pub(crate) fn take_inserts(&mut self) -> Vec<Entity> {
        let mut inserts = mem::take(&mut self.inserts);
        inserts.sort_by_key(Entity::dependency_rank);
        inserts
    }

    /// Staged deletes, children ahead of parents.
    pub(crate) fn take_deletes(&mut self) -> Vec<Entity> {
        let mut deletes = mem::take(&mut self.deletes);
        deletes.sort_by_key(|entity| std::cmp::Reverse(entity.dependency_rank()));
        deletes
    }

    pub(crate) const fn is_failed(&self) -> bool {
        self.failed
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }

    /// Drop staged work and the failure flag.
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
