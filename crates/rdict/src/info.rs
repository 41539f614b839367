use rootio_rbytes as rbytes;
use serde::{Deserialize, Serialize};

use crate::StreamerElement;

/// On-disk layout of one version of a class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamerInfo {
    pub name: String,
    #[serde(default)]
    pub title: String,
    pub class_version: i32,
    #[serde(default)]
    pub checksum: u32,
    #[serde(default)]
    pub elements: Vec<StreamerElement>,
}

impl StreamerInfo {
    pub fn new(name: impl Into<String>, class_version: i32, checksum: u32) -> Self {
        Self {
            name: name.into(),
            class_version,
            checksum,
            ..Self::default()
        }
    }

    pub fn with_element(mut self, elem: StreamerElement) -> Self {
        self.elements.push(elem);
        self
    }

    /// Finds a member by name.
    pub fn element(&self, name: &str) -> Option<&StreamerElement> {
        self.elements.iter().find(|e| e.name == name)
    }
}

impl rbytes::StreamerInfo for StreamerInfo {
    fn name(&self) -> &str {
        &self.name
    }

    fn class_version(&self) -> i32 {
        self.class_version
    }

    fn checksum(&self) -> u32 {
        self.checksum
    }

    fn elements(&self) -> Vec<&dyn rbytes::StreamerElement> {
        self.elements
            .iter()
            .map(|e| e as &dyn rbytes::StreamerElement)
            .collect()
    }
}
