//! Base reward
//! Pure, monotonic mapping from (compiles, passed, failed) to a score.

/// Reward for code that does not compile; short-circuits every other rule.
pub const COMPILE_FAILURE_REWARD: i64 = -3;
/// Awarded for compiling at all.
pub const COMPILE_REWARD: i64 = 1;
/// Awarded per passing test.
pub const PASS_REWARD: i64 = 3;
/// Deducted per failing test.
pub const FAIL_PENALTY: i64 = 1;
/// Extra reward when at least one test ran and none failed.
pub const CLEAN_PASS_BONUS: i64 = 2;

pub fn reward(compiles: bool, passed: u32, failed: u32) -> i64 {
    if !compiles {
        return COMPILE_FAILURE_REWARD;
    }

    let mut reward =
        COMPILE_REWARD + PASS_REWARD * i64::from(passed) - FAIL_PENALTY * i64::from(failed);
    if passed > 0 && failed == 0 {
        reward += CLEAN_PASS_BONUS;
    }
    reward
}
