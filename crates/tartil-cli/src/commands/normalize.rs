//! The `tartil normalize` command.

use anyhow::Result;

pub fn execute(text: String) -> Result<()> {
    println!("{}", tartil_core::normalize(&text));
    Ok(())
}
