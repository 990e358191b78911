// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify
//! the algebraic laws the sequence operators must obey for all inputs.

mod operator_laws;
