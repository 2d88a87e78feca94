//! Label encoding for the fruit column

use serde::{Deserialize, Serialize};

/// Fixed mapping from fruit label to integer code; the code is the label's
/// position in `classes`, exactly as it was during training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.classes.iter().position(|c| c == label)
    }

    /// First label that appears more than once, if any
    pub fn duplicate(&self) -> Option<&str> {
        self.classes
            .iter()
            .enumerate()
            .find(|(i, c)| self.classes[..*i].contains(c))
            .map(|(_, c)| c.as_str())
    }
}
