//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the vehicle simulation.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
