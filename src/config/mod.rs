// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Service configuration
//!
//! Settings are read from environment variables (a `.env` file is loaded by
//! the binaries before this runs) and validated once at startup.

pub mod classes;
pub mod settings;

pub use classes::{ClassInfo, ClassTable};
pub use settings::Settings;
