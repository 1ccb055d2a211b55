//! Domain logic and core data structures
//!
//! This module contains pure region and rectangle logic that is independent
//! of any concrete boolean-region engine or platform API.

pub mod core;
pub mod region;
pub mod region_data;
