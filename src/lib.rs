//! Library for Scanforge, a SAT-based ATPG/DTPG tool for gate-level netlists.

#![warn(missing_docs)]
#![allow(clippy::too_many_arguments)]

//! Scanforge reads a gate-level design (currently `.bench`/ISCAS-89 format),
//! builds an FFR/MFFC-decomposed netlist view over it, and generates test
//! patterns detecting every stuck-at or transition-delay fault with a SAT
//! solver, falling back to structural backtrace where that is enough on its
//! own. [`reduce`] then drops faults proven redundant by dominance so the
//! reported fault list reflects only what a tester actually needs to apply.

pub mod analyzer;
pub mod assign;
pub mod dtpg;
pub mod encoders;
pub mod engine;
pub mod error;
pub mod fault;
pub mod faultinfo;
pub mod io;
pub mod justify;
pub mod network;
pub mod reduce;
pub mod sat;
pub mod sim;
pub mod testvector;
