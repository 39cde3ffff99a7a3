//! Call frame protocol
//!
//! Each call lays down a two-slot activation record on the stack:
//!
//! ```text
//! ... caller values | [saved bp][return pc] | callee values ...
//!                     ^
//!                     new bp
//! ```
//!
//! The engine moves `pc` itself: CAL jumps after [`Stack::call`], RTN reads
//! the return address off the top of the stack before [`Stack::return_frame`].

use super::stack::Stack;
use crate::bytecode::Word;
use crate::error::RuntimeError;

/// Slots in an activation record
pub const FRAME_SIZE: Word = 2;

impl Stack {
    /// Open a frame whose return address is `return_pc`
    pub fn call(&mut self, return_pc: Word) -> Result<(), RuntimeError> {
        let base = self.sp();
        self.write(base, self.bp())?;
        self.write(base + 1, return_pc)?;
        self.set_bp(base);
        self.set_sp(base + FRAME_SIZE);
        Ok(())
    }

    /// Restore the caller's `bp` from `sp - 2` and drop two slots
    pub fn return_frame(&mut self) -> Result<(), RuntimeError> {
        if self.sp() < FRAME_SIZE {
            return Err(RuntimeError::StackUnderflow);
        }
        let saved_bp = self.slot(self.sp() - 2)?;
        self.set_bp(saved_bp);
        self.set_sp(self.sp() - FRAME_SIZE);
        Ok(())
    }

    /// Store `stack[sp - 2]` at `stack[sp - 1] + offset`, then drop both slots
    pub fn store_indexed(&mut self, offset: Word) -> Result<(), RuntimeError> {
        if self.sp() < 2 {
            return Err(RuntimeError::StackUnderflow);
        }
        let base = self.slot(self.sp() - 1)?;
        let value = self.slot(self.sp() - 2)?;
        self.write(base.wrapping_add(offset), value)?;
        self.set_sp(self.sp() - 2);
        Ok(())
    }
}
