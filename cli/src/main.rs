// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! lunarcal - lunar anniversaries on your Google Calendar

use std::process::ExitCode;

use lunarcal_cli::run;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}
