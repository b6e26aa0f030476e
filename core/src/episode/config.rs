//! Bridge configuration

use nle_shared::constants::BUFSIZ;

use crate::error::BridgeError;

/// Smallest private stack accepted for the program thread.
pub const MIN_STACK_SIZE: usize = 64 * 1024;

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Private stack size of the program thread in bytes
    pub stack_size: usize,
    /// Name given to the program thread
    pub thread_name: String,
    /// Output bytes buffered before they reach the terminal mirror
    pub output_buffer_size: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            stack_size: 8 * 1024 * 1024,
            thread_name: "nle-program".to_string(),
            output_buffer_size: BUFSIZ,
        }
    }
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), BridgeError> {
        if self.stack_size < MIN_STACK_SIZE {
            return Err(BridgeError::StackTooSmall {
                requested: self.stack_size,
                minimum: MIN_STACK_SIZE,
            });
        }
        Ok(())
    }
}
