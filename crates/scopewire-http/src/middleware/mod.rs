//! Inspector middleware

pub mod logging;
