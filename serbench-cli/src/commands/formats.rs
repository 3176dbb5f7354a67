// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `serbench formats` command - List available codec formats.

use serbench_core::CodecRegistry;

pub fn execute() -> anyhow::Result<()> {
    let registry = CodecRegistry::builtin();
    let formats = registry.formats();

    println!("╔════════════════╦═══════════════╗");
    println!("║ Format         ║ Extension     ║");
    println!("╠════════════════╬═══════════════╣");
    for (format, extension) in &formats {
        println!("║ {:<14} ║ .{:<12} ║", format.as_str(), extension);
    }
    println!("╚════════════════╩═══════════════╝");
    println!();
    println!("Total: {} format(s)", formats.len());

    Ok(())
}
