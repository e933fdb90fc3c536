//! Undo/redo history.
//!
//! [`EditHistory`] manages a linear undo/redo stack of [`Operation`] trait
//! objects. Recording a new operation clears the redo stack.
//!
//! The history can be driven two ways:
//!
//! - **Synchronously** with [`execute`](EditHistory::execute),
//!   [`undo`](EditHistory::undo) and [`redo`](EditHistory::redo), when the
//!   caller owns the target.
//! - **Split**, when the target lives on another thread: the caller takes an
//!   operation off a stack ([`take_undo`](EditHistory::take_undo) /
//!   [`take_redo`](EditHistory::take_redo)), ships it to the owning thread,
//!   and puts it back with [`record`](EditHistory::record),
//!   [`push_undo`](EditHistory::push_undo) or
//!   [`push_redo`](EditHistory::push_redo) once the outcome is known. This is
//!   what [`ChangeConsumer`](crate::document::ChangeConsumer) does.

use std::collections::VecDeque;
use std::fmt;

use super::command::{Editable, Operation, OperationError, OperationResult};

/// Default maximum number of undo steps.
pub const DEFAULT_MAX_UNDO: usize = 100;

/// Outcome of [`EditHistory::record`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recorded {
    /// Pushed as a new undo entry.
    Pushed,
    /// Absorbed by the entry on top of the undo stack.
    Merged,
    /// The operation is transient and was dropped.
    Skipped,
}

/// Manages an undo/redo stack of operations.
///
/// The undo stack is a bounded [`VecDeque`]: when it exceeds `max_undo`,
/// the oldest operation is dropped from the front. The redo stack can never
/// grow larger than the undo stack was.
pub struct EditHistory<T: Editable> {
    undo_stack: VecDeque<Box<dyn Operation<T>>>,
    redo_stack: Vec<Box<dyn Operation<T>>>,
    max_undo: usize,
}

impl<T: Editable> EditHistory<T> {
    /// Creates an empty history with the given maximum undo depth.
    pub fn new(max_undo: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_undo: max_undo.max(1),
        }
    }

    /// Applies `op` to `target` and records it.
    ///
    /// If the operation fails it is not recorded and the redo stack is left
    /// untouched.
    pub fn execute(&mut self, mut op: Box<dyn Operation<T>>, target: &mut T) -> OperationResult {
        op.redo(target)?;
        self.record(op);
        Ok(())
    }

    /// Undoes the most recent operation.
    ///
    /// Returns an error if the undo stack is empty or the undo failed. A
    /// failed operation stays on the undo stack.
    pub fn undo(&mut self, target: &mut T) -> OperationResult {
        let mut op = self
            .take_undo()
            .ok_or_else(|| OperationError::Custom("nothing to undo".into()))?;
        if let Err(e) = op.undo(target) {
            self.push_undo(op);
            return Err(e);
        }
        self.push_redo(op);
        Ok(())
    }

    /// Redoes the most recently undone operation.
    ///
    /// Returns an error if the redo stack is empty or the redo failed. A
    /// failed operation is discarded.
    pub fn redo(&mut self, target: &mut T) -> OperationResult {
        let mut op = self
            .take_redo()
            .ok_or_else(|| OperationError::Custom("nothing to redo".into()))?;
        op.redo(target)?;
        self.push_undo(op);
        Ok(())
    }

    /// Records an operation whose `redo` has already been applied.
    ///
    /// Recorded operations clear the redo stack and try to merge with the top
    /// of the undo stack. Transient operations are dropped.
    pub fn record(&mut self, mut op: Box<dyn Operation<T>>) -> Recorded {
        if !op.is_recorded() {
            return Recorded::Skipped;
        }

        self.redo_stack.clear();

        if let Some(last) = self.undo_stack.back_mut() {
            match last.merge(op) {
                None => return Recorded::Merged,
                Some(returned) => op = returned,
            }
        }

        self.push_undo(op);
        Recorded::Pushed
    }

    /// Pops the most recent undo entry.
    pub fn take_undo(&mut self) -> Option<Box<dyn Operation<T>>> {
        self.undo_stack.pop_back()
    }

    /// Pops the most recent redo entry.
    pub fn take_redo(&mut self) -> Option<Box<dyn Operation<T>>> {
        self.redo_stack.pop()
    }

    /// Pushes onto the undo stack without touching the redo stack.
    ///
    /// Used after a successful redo and to restore an operation whose undo
    /// failed.
    pub fn push_undo(&mut self, op: Box<dyn Operation<T>>) {
        self.undo_stack.push_back(op);
        if self.undo_stack.len() > self.max_undo
            && let Some(dropped) = self.undo_stack.pop_front()
        {
            log::trace!("History full, dropping '{}'", dropped.description());
        }
    }

    /// Pushes onto the redo stack after a successful undo.
    pub fn push_redo(&mut self, op: Box<dyn Operation<T>>) {
        self.redo_stack.push(op);
    }

    /// Returns `true` if there are operations that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns `true` if there are operations that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Undo descriptions, most recent first.
    pub fn undo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.undo_stack.iter().rev().map(|op| op.description())
    }

    /// Redo descriptions, most recent first.
    pub fn redo_descriptions(&self) -> impl Iterator<Item = &str> {
        self.redo_stack.iter().rev().map(|op| op.description())
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_undo(&self) -> usize {
        self.max_undo
    }

    /// Clears both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl<T: Editable> Default for EditHistory<T> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO)
    }
}

impl<T: Editable> fmt::Debug for EditHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditHistory")
            .field("undo_count", &self.undo_stack.len())
            .field("redo_count", &self.redo_stack.len())
            .field("max_undo", &self.max_undo)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: i32,
    }

    impl Editable for Counter {}

    #[derive(Debug)]
    struct Add {
        amount: i32,
    }

    impl Operation<Counter> for Add {
        fn redo(&mut self, target: &mut Counter) -> OperationResult {
            target.value += self.amount;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> OperationResult {
            target.value -= self.amount;
            Ok(())
        }

        fn description(&self) -> &str {
            "Add"
        }
    }

    /// Simulates a drag: consecutive sets merge, keeping the first old value.
    #[derive(Debug)]
    struct SetValue {
        old_value: i32,
        new_value: i32,
    }

    impl Operation<Counter> for SetValue {
        fn redo(&mut self, target: &mut Counter) -> OperationResult {
            target.value = self.new_value;
            Ok(())
        }

        fn undo(&mut self, target: &mut Counter) -> OperationResult {
            target.value = self.old_value;
            Ok(())
        }

        fn description(&self) -> &str {
            "Set value"
        }

        fn merge(
            &mut self,
            other: Box<dyn Operation<Counter>>,
        ) -> Option<Box<dyn Operation<Counter>>> {
            if let Some(other) = (*other).as_any().downcast_ref::<SetValue>() {
                self.new_value = other.new_value;
                return None;
            }
            Some(other)
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Operation<Counter> for Failing {
        fn redo(&mut self, _target: &mut Counter) -> OperationResult {
            Err(OperationError::Custom("always fails".into()))
        }

        fn undo(&mut self, _target: &mut Counter) -> OperationResult {
            Err(OperationError::Custom("always fails".into()))
        }

        fn description(&self) -> &str {
            "Failing"
        }
    }

    /// Redo succeeds once, undo always fails.
    #[derive(Debug)]
    struct Irreversible;

    impl Operation<Counter> for Irreversible {
        fn redo(&mut self, target: &mut Counter) -> OperationResult {
            target.value += 1;
            Ok(())
        }

        fn undo(&mut self, _target: &mut Counter) -> OperationResult {
            Err(OperationError::InvalidState("locked".into()))
        }

        fn description(&self) -> &str {
            "Irreversible"
        }
    }

    #[derive(Debug)]
    struct Select;

    impl Operation<Counter> for Select {
        fn redo(&mut self, _target: &mut Counter) -> OperationResult {
            Ok(())
        }

        fn undo(&mut self, _target: &mut Counter) -> OperationResult {
            unreachable!("transient operations are never undone");
        }

        fn description(&self) -> &str {
            "Select"
        }

        fn is_recorded(&self) -> bool {
            false
        }
    }

    #[test]
    fn execute_applies_and_pushes() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(Box::new(Add { amount: 5 }), &mut counter)
            .unwrap();

        assert_eq!(counter.value, 5);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn undo_then_redo_round_trip() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(Box::new(Add { amount: 5 }), &mut counter)
            .unwrap();
        history.undo(&mut counter).unwrap();
        assert_eq!(counter.value, 0);
        assert_eq!(history.redo_count(), 1);

        history.redo(&mut counter).unwrap();
        assert_eq!(counter.value, 5);
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
    }

    #[test]
    fn execute_after_undo_clears_redo() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(Box::new(Add { amount: 1 }), &mut counter)
            .unwrap();
        history
            .execute(Box::new(Add { amount: 2 }), &mut counter)
            .unwrap();
        history.undo(&mut counter).unwrap();
        assert!(history.can_redo());

        history
            .execute(Box::new(Add { amount: 10 }), &mut counter)
            .unwrap();
        assert!(!history.can_redo());
        assert_eq!(counter.value, 11);
    }

    #[test]
    fn empty_stacks_report_errors() {
        let mut history = EditHistory::<Counter>::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };
        assert!(history.undo(&mut counter).is_err());
        assert!(history.redo(&mut counter).is_err());
    }

    #[test]
    fn failed_execute_is_not_recorded() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(Box::new(Add { amount: 1 }), &mut counter)
            .unwrap();
        history.undo(&mut counter).unwrap();

        assert!(history.execute(Box::new(Failing), &mut counter).is_err());
        assert_eq!(history.undo_count(), 0);
        // A failed edit did not happen, so the redo branch survives.
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn failed_undo_stays_on_undo_stack() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history.execute(Box::new(Irreversible), &mut counter).unwrap();
        assert!(history.undo(&mut counter).is_err());
        assert_eq!(history.undo_count(), 1);
        assert_eq!(history.redo_count(), 0);
        assert_eq!(counter.value, 1);
    }

    #[test]
    fn bounded_history_drops_oldest() {
        let mut history = EditHistory::new(3);
        let mut counter = Counter { value: 0 };

        for amount in 1..=5 {
            history
                .execute(Box::new(Add { amount }), &mut counter)
                .unwrap();
        }
        assert_eq!(history.undo_count(), 3);

        for _ in 0..3 {
            history.undo(&mut counter).unwrap();
        }
        // 1 + 2 were dropped and can no longer be undone.
        assert_eq!(counter.value, 3);
        assert!(!history.can_undo());
    }

    #[test]
    fn merge_coalesces_drag() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        for (old_value, new_value) in [(0, 1), (1, 2), (2, 3)] {
            history
                .execute(Box::new(SetValue { old_value, new_value }), &mut counter)
                .unwrap();
        }
        assert_eq!(counter.value, 3);
        assert_eq!(history.undo_count(), 1);

        history.undo(&mut counter).unwrap();
        assert_eq!(counter.value, 0);
    }

    #[test]
    fn different_types_do_not_merge() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(
                Box::new(SetValue {
                    old_value: 0,
                    new_value: 4,
                }),
                &mut counter,
            )
            .unwrap();
        history
            .execute(Box::new(Add { amount: 1 }), &mut counter)
            .unwrap();
        assert_eq!(history.undo_count(), 2);
    }

    #[test]
    fn transient_operation_is_skipped() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(Box::new(Add { amount: 1 }), &mut counter)
            .unwrap();
        history.undo(&mut counter).unwrap();

        assert_eq!(history.record(Box::new(Select)), Recorded::Skipped);
        assert_eq!(history.undo_count(), 0);
        // Transient edits leave the redo branch alone.
        assert_eq!(history.redo_count(), 1);
    }

    #[test]
    fn record_reports_merge() {
        let mut history = EditHistory::<Counter>::new(DEFAULT_MAX_UNDO);
        assert_eq!(
            history.record(Box::new(SetValue {
                old_value: 0,
                new_value: 1
            })),
            Recorded::Pushed
        );
        assert_eq!(
            history.record(Box::new(SetValue {
                old_value: 1,
                new_value: 2
            })),
            Recorded::Merged
        );
    }

    #[test]
    fn descriptions_most_recent_first() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(Box::new(Add { amount: 1 }), &mut counter)
            .unwrap();
        history.execute(Box::new(Irreversible), &mut counter).unwrap();

        let undos: Vec<&str> = history.undo_descriptions().collect();
        assert_eq!(undos, vec!["Irreversible", "Add"]);
        assert_eq!(history.redo_descriptions().count(), 0);
    }

    #[test]
    fn clear_empties_both_stacks() {
        let mut history = EditHistory::new(DEFAULT_MAX_UNDO);
        let mut counter = Counter { value: 0 };

        history
            .execute(Box::new(Add { amount: 1 }), &mut counter)
            .unwrap();
        history
            .execute(Box::new(Add { amount: 2 }), &mut counter)
            .unwrap();
        history.undo(&mut counter).unwrap();
        history.clear();

        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn debug_impl() {
        let history = EditHistory::<Counter>::default();
        let s = format!("{history:?}");
        assert!(s.contains("EditHistory"));
        assert!(s.contains("max_undo: 100"));
    }
}
