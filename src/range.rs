//! Numeric index ranges and input list naming

use crate::config::NamingConfig;
use crate::HarvestError;

/// Closed range of input list indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u32,
    pub end: u32,
}

impl IndexRange {
    /// Creates a range, rejecting `start > end`
    pub fn new(start: u32, end: u32) -> Result<Self, HarvestError> {
        if start > end {
            return Err(HarvestError::InvalidRange(format!(
                "start {} is greater than end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Number of indices covered
    pub fn count(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

/// Parses one index typed by an operator
///
/// # Examples
///
/// ```
/// use wave_harvest::range::parse_index;
///
/// assert_eq!(parse_index(" 12\n").unwrap(), 12);
/// assert!(parse_index("twelve").is_err());
/// ```
pub fn parse_index(input: &str) -> Result<u32, HarvestError> {
    let trimmed = input.trim();
    trimmed.parse::<u32>().map_err(|e| {
        HarvestError::InvalidRange(format!("'{}' is not a valid index: {}", trimmed, e))
    })
}

/// Maps an index to its input list stem, e.g. `train-00001-of-03550`
pub fn list_stem(naming: &NamingConfig, index: u32) -> String {
    format!(
        "{}{:0width$}{}",
        naming.prefix,
        index,
        naming.suffix,
        width = naming.width
    )
}
