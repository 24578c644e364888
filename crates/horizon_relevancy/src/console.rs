//! Administrative console commands.
//!
//! | Command                        | Effect                                   |
//! |--------------------------------|------------------------------------------|
//! | `Relevancy.PrintRouting`       | Prints the type → policy routing table   |
//! | `Relevancy.FrequencyBuckets n` | Sets the frequency bucket count (n ≥ 1)  |
//!
//! Command names are matched case-insensitively. `FrequencyBuckets` without
//! an argument resets the count to 1.

use crate::error::RelevancyError;

pub const PRINT_ROUTING: &str = "Relevancy.PrintRouting";
pub const FREQUENCY_BUCKETS: &str = "Relevancy.FrequencyBuckets";

/// A parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    PrintRouting,
    FrequencyBuckets(usize),
}

impl ConsoleCommand {
    /// Parses one console line.
    pub fn parse(line: &str) -> Result<Self, RelevancyError> {
        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| RelevancyError::UnknownCommand(String::new()))?;

        if name.eq_ignore_ascii_case(PRINT_ROUTING) {
            return Ok(ConsoleCommand::PrintRouting);
        }

        if name.eq_ignore_ascii_case(FREQUENCY_BUCKETS) {
            let buckets = match parts.next() {
                None => 1,
                Some(value) => match value.parse::<usize>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(RelevancyError::InvalidArgument {
                            command: FREQUENCY_BUCKETS.to_string(),
                            value: value.to_string(),
                        })
                    }
                },
            };
            return Ok(ConsoleCommand::FrequencyBuckets(buckets));
        }

        Err(RelevancyError::UnknownCommand(name.to_string()))
    }
}
