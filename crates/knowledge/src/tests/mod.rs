//! Shared test helpers and end-to-end pipeline tests.

pub(crate) mod support;
