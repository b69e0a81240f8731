//! Pure helper functions

pub mod linkup_time;
