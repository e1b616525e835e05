// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod aggregate_versioning;
mod aggregation_laws;
mod widget_bounds;
