//! Input list parsing
//!
//! Each line of an input list is `<resource> <destination>`, split at the
//! first whitespace run. Lines without both fields are dropped.

use crate::HarvestError;
use std::path::Path;

/// One resource to fetch and where its payload should land
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// Remote resource URL
    pub resource: String,

    /// Raw destination hint, trimmed but not yet sanitized
    pub destination: String,
}

impl WorkItem {
    /// Parses one input line
    ///
    /// Returns `None` for lines that do not carry both a resource and a
    /// destination.
    ///
    /// # Examples
    ///
    /// ```
    /// use wave_harvest::WorkItem;
    ///
    /// let item = WorkItem::parse_line("https://cdn.example.com/a.jpg  set/a.jpg ").unwrap();
    /// assert_eq!(item.resource, "https://cdn.example.com/a.jpg");
    /// assert_eq!(item.destination, "set/a.jpg");
    ///
    /// assert!(WorkItem::parse_line("https://cdn.example.com/a.jpg").is_none());
    /// ```
    pub fn parse_line(line: &str) -> Option<Self> {
        let (resource, rest) = line.trim_start().split_once(char::is_whitespace)?;
        let destination = rest.trim();

        if destination.is_empty() {
            return None;
        }

        Some(Self {
            resource: resource.to_string(),
            destination: destination.to_string(),
        })
    }
}

/// A fully read input list
#[derive(Debug, Default)]
pub struct InputList {
    pub items: Vec<WorkItem>,

    /// Total number of lines read, including malformed ones
    pub lines: usize,
}

impl InputList {
    /// Parses list content, skipping malformed lines
    pub fn parse(content: &str) -> Self {
        let mut list = Self::default();
        for line in content.lines() {
            list.lines += 1;
            if let Some(item) = WorkItem::parse_line(line) {
                list.items.push(item);
            }
        }
        list
    }

    /// Number of lines that produced no work item
    pub fn skipped(&self) -> usize {
        self.lines - self.items.len()
    }
}

/// Reads and parses a whole input list into memory
///
/// Invalid UTF-8 is replaced rather than rejected so one bad line cannot
/// void the rest of the list.
///
/// # Errors
///
/// Returns [`HarvestError::InputUnreadable`] if the file cannot be read.
pub async fn read_input_list(path: &Path) -> Result<InputList, HarvestError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| HarvestError::InputUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(InputList::parse(&String::from_utf8_lossy(&bytes)))
}
