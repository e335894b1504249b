//! egui rendering: filter panel, map and tables.

pub mod map;
pub mod panels;
pub mod table;
