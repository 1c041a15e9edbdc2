//! Button input and one-shot hardware initialisation.

pub mod buttons;
pub mod hw_init;
