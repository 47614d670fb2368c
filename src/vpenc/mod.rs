//! Common parts of VP-family entropy coding: bool encoder, probability bookkeeping and tree coding.
pub mod coder;
pub mod models;
pub mod tree;

#[cfg(test)]
pub(crate) mod testdec;
