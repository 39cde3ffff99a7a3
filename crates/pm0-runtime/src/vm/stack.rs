//! Stack store
//!
//! A zero-based array of words with two cursors:
//! - `sp`: number of occupied slots, i.e. the next free index
//! - `bp`: base of the current activation record
//!
//! Both cursors are machine words because programs observe and load them
//! (PSP pushes `sp`, RTN reloads `bp` from a stack slot).
//!
//! ## Overrun
//!
//! Pushing onto a full stack, or growing it to its capacity, is reported
//! through [`Capacity::Overflowed`] and otherwise proceeds: the store keeps a
//! headroom of another `capacity` slots past the end so those writes land
//! somewhere. Writes beyond the headroom fail with
//! [`RuntimeError::StackExhausted`]. With strict bounds enabled every overrun
//! fails immediately instead.

use crate::bytecode::Word;
use crate::error::RuntimeError;

/// Whether an operation pushed the stack to or past its capacity
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    Within,
    Overflowed,
}

/// Operand and activation stack
#[derive(Debug, Clone)]
pub struct Stack {
    /// Backing store, `capacity` slots plus whatever headroom has been touched
    slots: Vec<Word>,
    capacity: usize,
    sp: Word,
    bp: Word,
    strict: bool,
}

impl Stack {
    /// Create an empty stack with `capacity` zeroed slots
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0; capacity],
            capacity,
            sp: 0,
            bp: 0,
            strict: false,
        }
    }

    /// Create an empty stack that rejects every overrun
    pub fn strict(capacity: usize) -> Self {
        Self {
            strict: true,
            ..Self::new(capacity)
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn sp(&self) -> Word {
        self.sp
    }

    pub fn bp(&self) -> Word {
        self.bp
    }

    /// `sp - 1`: index of the top slot, `-1` when empty
    pub fn size(&self) -> Word {
        self.sp - 1
    }

    pub fn is_empty(&self) -> bool {
        self.sp == 0
    }

    pub fn is_full(&self) -> bool {
        self.sp == self.capacity_word()
    }

    /// Write `value` at `sp` and advance `sp`
    pub fn push(&mut self, value: Word) -> Result<Capacity, RuntimeError> {
        let full = self.is_full();
        if full && self.strict {
            return Err(self.exhausted(self.sp));
        }

        self.write(self.sp, value)?;
        self.sp += 1;

        Ok(if full {
            Capacity::Overflowed
        } else {
            Capacity::Within
        })
    }

    /// Retreat `sp` and return the slot it now points at
    pub fn pop(&mut self) -> Result<Word, RuntimeError> {
        if self.sp <= 0 {
            return Err(RuntimeError::StackUnderflow);
        }
        self.sp -= 1;
        self.slot(self.sp)
    }

    /// Value at `sp - 1`
    pub fn peek(&self) -> Result<Word, RuntimeError> {
        if self.sp <= 0 {
            return Err(RuntimeError::StackUnderflow);
        }
        self.slot(self.sp - 1)
    }

    /// Overwrite the value at `sp - 1`
    pub fn replace_top(&mut self, value: Word) -> Result<(), RuntimeError> {
        if self.sp <= 0 {
            return Err(RuntimeError::StackUnderflow);
        }
        self.write(self.sp - 1, value)
    }

    /// Negate the value at `sp - 1` in place
    pub fn negate(&mut self) -> Result<(), RuntimeError> {
        let top = self.peek()?;
        self.replace_top(top.wrapping_neg())
    }

    /// Move `sp` by `count` slots (negative counts release slots)
    pub fn grow(&mut self, count: Word) -> Result<Capacity, RuntimeError> {
        let new_sp = self.sp.wrapping_add(count);
        if new_sp < 0 {
            return Err(RuntimeError::StackUnderflow);
        }

        let overflowed = new_sp >= self.capacity_word();
        if overflowed && self.strict {
            return Err(self.exhausted(new_sp));
        }

        self.sp = new_sp;
        Ok(if overflowed {
            Capacity::Overflowed
        } else {
            Capacity::Within
        })
    }

    /// Value at absolute index `addr`
    ///
    /// Addresses above the capacity read as `-1`. Slots that were never
    /// written, and negative addresses, read as `0`; a strict stack rejects
    /// negative addresses instead.
    pub fn read_at(&self, addr: Word) -> Result<Word, RuntimeError> {
        if addr > self.capacity_word() {
            return Ok(-1);
        }
        self.slot(addr)
    }

    /// Live slots `0..sp`, as rendered by the tracer
    pub fn live(&self) -> impl Iterator<Item = (Word, Word)> + '_ {
        (0..=self.size()).map(move |index| (index, self.read_at(index).unwrap_or(-1)))
    }

    pub(super) fn set_bp(&mut self, bp: Word) {
        self.bp = bp;
    }

    pub(super) fn set_sp(&mut self, sp: Word) {
        self.sp = sp;
    }

    pub(super) fn slot(&self, addr: Word) -> Result<Word, RuntimeError> {
        let Some(index) = self.index(addr)? else {
            return Ok(0);
        };
        Ok(self.slots.get(index).copied().unwrap_or(0))
    }

    /// Store `value` at `addr`; a non-strict stack drops writes below zero
    pub(super) fn write(&mut self, addr: Word, value: Word) -> Result<(), RuntimeError> {
        let Some(index) = self.index(addr)? else {
            return Ok(());
        };

        if index >= self.slots.len() {
            let limit = if self.strict {
                self.capacity
            } else {
                self.capacity.saturating_mul(2)
            };
            if index >= limit {
                return Err(self.exhausted(addr));
            }
            self.slots.resize(index + 1, 0);
        }

        self.slots[index] = value;
        Ok(())
    }

    /// Slot index for `addr`, or `None` for a negative address outside strict mode
    fn index(&self, addr: Word) -> Result<Option<usize>, RuntimeError> {
        match usize::try_from(addr) {
            Ok(index) => Ok(Some(index)),
            Err(_) if self.strict => Err(RuntimeError::InvalidAddress { addr }),
            Err(_) => Ok(None),
        }
    }

    fn capacity_word(&self) -> Word {
        Word::try_from(self.capacity).unwrap_or(Word::MAX)
    }

    fn exhausted(&self, index: Word) -> RuntimeError {
        RuntimeError::StackExhausted {
            index,
            capacity: self.capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_peek() {
        let mut stack = Stack::new(8);
        assert!(stack.is_empty());
        assert_eq!(stack.push(4).unwrap(), Capacity::Within);
        assert_eq!(stack.push(9).unwrap(), Capacity::Within);
        assert_eq!(stack.peek().unwrap(), 9);
        assert_eq!(stack.size(), 1);
        assert_eq!(stack.pop().unwrap(), 9);
        assert_eq!(stack.pop().unwrap(), 4);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_empty_is_underflow() {
        let mut stack = Stack::new(8);
        assert!(matches!(stack.pop(), Err(RuntimeError::StackUnderflow)));
        assert!(matches!(stack.peek(), Err(RuntimeError::StackUnderflow)));
    }

    #[test]
    fn test_negate_keeps_sp() {
        let mut stack = Stack::new(8);
        let _ = stack.push(12).unwrap();
        stack.negate().unwrap();
        assert_eq!(stack.peek().unwrap(), -12);
        assert_eq!(stack.sp(), 1);
    }

    #[test]
    fn test_push_onto_full_stack_overflows_but_proceeds() {
        let mut stack = Stack::new(2);
        assert_eq!(stack.push(1).unwrap(), Capacity::Within);
        assert_eq!(stack.push(2).unwrap(), Capacity::Within);
        assert!(stack.is_full());
        assert_eq!(stack.push(3).unwrap(), Capacity::Overflowed);
        assert_eq!(stack.sp(), 3);
        assert_eq!(stack.pop().unwrap(), 3);
    }

    #[test]
    fn test_strict_push_onto_full_stack_fails() {
        let mut stack = Stack::strict(1);
        let _ = stack.push(1).unwrap();
        assert!(matches!(
            stack.push(2),
            Err(RuntimeError::StackExhausted { index: 1, capacity: 1 })
        ));
        assert_eq!(stack.sp(), 1);
    }

    #[test]
    fn test_overrun_past_headroom_fails() {
        let mut stack = Stack::new(2);
        let _ = stack.grow(4).unwrap();
        assert!(matches!(
            stack.push(0),
            Err(RuntimeError::StackExhausted { index: 4, .. })
        ));
    }

    #[test]
    fn test_grow_reports_reaching_capacity() {
        let mut stack = Stack::new(4);
        assert_eq!(stack.grow(3).unwrap(), Capacity::Within);
        assert_eq!(stack.grow(1).unwrap(), Capacity::Overflowed);
        assert_eq!(stack.sp(), 4);
        assert_eq!(stack.grow(-4).unwrap(), Capacity::Within);
        assert!(matches!(stack.grow(-1), Err(RuntimeError::StackUnderflow)));
    }

    #[test]
    fn test_strict_grow_to_capacity_fails() {
        let mut stack = Stack::strict(4);
        assert!(stack.grow(4).is_err());
        assert_eq!(stack.sp(), 0);
    }

    #[test]
    fn test_read_at_sentinel_and_negative() {
        let mut stack = Stack::new(4);
        let _ = stack.push(7).unwrap();
        assert_eq!(stack.read_at(0).unwrap(), 7);
        assert_eq!(stack.read_at(4).unwrap(), 0);
        assert_eq!(stack.read_at(5).unwrap(), -1);
        assert_eq!(stack.read_at(-1).unwrap(), 0);
    }

    #[test]
    fn test_strict_rejects_negative_address() {
        let mut stack = Stack::strict(4);
        let _ = stack.push(7).unwrap();
        assert!(matches!(
            stack.read_at(-1),
            Err(RuntimeError::InvalidAddress { addr: -1 })
        ));
        assert!(matches!(
            stack.write(-2, 1),
            Err(RuntimeError::InvalidAddress { addr: -2 })
        ));
    }

    #[test]
    fn test_negative_write_is_dropped() {
        let mut stack = Stack::new(4);
        let _ = stack.push(7).unwrap();
        stack.write(-1, 99).unwrap();
        assert_eq!(stack.read_at(0).unwrap(), 7);
        assert_eq!(stack.read_at(-1).unwrap(), 0);
    }

    #[test]
    fn test_live_slots() {
        let mut stack = Stack::new(4);
        assert_eq!(stack.live().count(), 0);
        let _ = stack.push(5).unwrap();
        let _ = stack.push(6).unwrap();
        assert_eq!(stack.live().collect::<Vec<_>>(), vec![(0, 5), (1, 6)]);
    }
}
