// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Command-line interface of lunarcal.

mod cli;
mod cmd_generate_completion;
mod cmd_preview;
mod cmd_publish;
mod config;
mod preview_formatter;
mod table;
mod util;

pub use crate::cli::{Cli, Commands, run};
pub use crate::config::parse_config;
