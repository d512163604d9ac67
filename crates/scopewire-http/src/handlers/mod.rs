//! Inspector route handlers

pub mod explain;
