//! Shader constant register files.

use glam::Vec4;

use crate::error::GraphicsError;

/// Fixed-size array of 4-component float registers for one shader stage.
///
/// Writes are addressed by base register and block length and never grow
/// the file.
#[derive(Clone, PartialEq)]
pub struct RegisterFile {
    registers: Box<[Vec4]>,
}

impl RegisterFile {
    /// Create a zeroed register file.
    pub fn new(capacity: usize) -> Self {
        Self {
            registers: vec![Vec4::ZERO; capacity].into_boxed_slice(),
        }
    }

    /// Number of registers.
    pub fn capacity(&self) -> usize {
        self.registers.len()
    }

    /// Read one register.
    pub fn get(&self, register: usize) -> Option<Vec4> {
        self.registers.get(register).copied()
    }

    /// Write `values` to consecutive registers starting at `base`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::RegisterOutOfRange`] if the block does not
    /// fit; nothing is written in that case.
    pub fn write(&mut self, base: usize, values: &[Vec4]) -> Result<(), GraphicsError> {
        let capacity = self.capacity();
        let target = base
            .checked_add(values.len())
            .and_then(|end| self.registers.get_mut(base..end))
            .ok_or(GraphicsError::RegisterOutOfRange {
                base,
                count: values.len(),
                capacity,
            })?;
        target.copy_from_slice(values);
        Ok(())
    }

    /// Zero every register.
    pub fn clear(&mut self) {
        self.registers.fill(Vec4::ZERO);
    }
}

impl std::fmt::Debug for RegisterFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterFile")
            .field("capacity", &self.capacity())
            .finish()
    }
}
