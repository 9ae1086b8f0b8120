// ── Container references ──
//
// Every configuration object lives in exactly one container: a folder, a
// snippet, or a device. Requests carry the container as a query parameter
// (list/fetch) or as a body field (create).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which kind of container an object lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Folder,
    Snippet,
    Device,
}

impl ContainerKind {
    /// Query-parameter / JSON field name.
    pub fn field(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Snippet => "snippet",
            Self::Device => "device",
        }
    }
}

/// A validated container reference: exactly one of folder / snippet / device.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container {
    Folder(String),
    Snippet(String),
    Device(String),
}

impl Container {
    pub fn folder(name: impl Into<String>) -> Self {
        Self::Folder(name.into())
    }

    pub fn snippet(name: impl Into<String>) -> Self {
        Self::Snippet(name.into())
    }

    pub fn device(name: impl Into<String>) -> Self {
        Self::Device(name.into())
    }

    /// Build from the three optional fields, requiring exactly one non-empty value.
    pub fn from_parts(
        folder: Option<&str>,
        snippet: Option<&str>,
        device: Option<&str>,
    ) -> Result<Self, CoreError> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.filter(|s| !s.is_empty())
        }

        let candidates = [
            present(folder).map(|s| Self::Folder(s.to_owned())),
            present(snippet).map(|s| Self::Snippet(s.to_owned())),
            present(device).map(|s| Self::Device(s.to_owned())),
        ];

        let provided = candidates.iter().flatten().count();
        if provided != 1 {
            return Err(CoreError::InvalidContainer { provided });
        }
        candidates
            .into_iter()
            .flatten()
            .next()
            .ok_or(CoreError::InvalidContainer { provided })
    }

    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Folder(_) => ContainerKind::Folder,
            Self::Snippet(_) => ContainerKind::Snippet,
            Self::Device(_) => ContainerKind::Device,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Folder(s) | Self::Snippet(s) | Self::Device(s) => s,
        }
    }

    /// `(field, value)` query parameter for list and fetch requests.
    pub fn query_param(&self) -> (&'static str, String) {
        (self.kind().field(), self.name().to_owned())
    }

    /// Reject an empty container name (possible through the direct constructors).
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.name().is_empty() {
            Err(CoreError::InvalidContainer { provided: 0 })
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind().field(), self.name())
    }
}

/// The container fields as they appear on the wire.
///
/// Flattened into every resource model. On responses the server fills in the
/// container the object actually lives in, which may be an ancestor of the
/// requested one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
}

impl ContainerFields {
    /// Validate and convert into a [`Container`].
    pub fn container(&self) -> Result<Container, CoreError> {
        Container::from_parts(
            self.folder.as_deref(),
            self.snippet.as_deref(),
            self.device.as_deref(),
        )
    }

    /// The value of one container field.
    pub fn get(&self, kind: ContainerKind) -> Option<&str> {
        match kind {
            ContainerKind::Folder => self.folder.as_deref(),
            ContainerKind::Snippet => self.snippet.as_deref(),
            ContainerKind::Device => self.device.as_deref(),
        }
    }

    /// Whether the object lives literally in `container`.
    pub fn is_in(&self, container: &Container) -> bool {
        self.get(container.kind()) == Some(container.name())
    }
}

impl From<Container> for ContainerFields {
    fn from(container: Container) -> Self {
        match container {
            Container::Folder(f) => Self {
                folder: Some(f),
                ..Self::default()
            },
            Container::Snippet(s) => Self {
                snippet: Some(s),
                ..Self::default()
            },
            Container::Device(d) => Self {
                device: Some(d),
                ..Self::default()
            },
        }
    }
}
