//! Comicdex library exports for testing

pub mod catalog;
pub mod core;
pub mod paging;
pub mod shell;

#[cfg(test)]
pub mod test_support;
