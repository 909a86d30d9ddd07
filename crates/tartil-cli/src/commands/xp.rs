//! The `tartil xp` command.

use anyhow::Result;

use tartil_core::model::RewardInput;

pub fn execute(accuracy: f64, duration_secs: u64) -> Result<()> {
    anyhow::ensure!(!accuracy.is_nan(), "accuracy must be a number");

    let input = RewardInput {
        accuracy,
        duration_secs,
    };
    println!("{}", input.xp());
    Ok(())
}
