// src/tests/mod.rs

mod scenarios;
mod support;
