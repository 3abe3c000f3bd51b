// ABOUTME: Helper modules for the vitacrew CLI
// ABOUTME: Profile input loading, terminal output and Ctrl-C handling
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 VitaCrew Contributors

pub mod display;
pub mod input;
pub mod signal;
