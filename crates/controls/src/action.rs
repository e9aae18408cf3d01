use serde::{Deserialize, Serialize};

/// A zero-argument operation a demo can expose as a panel button.
///
/// Actions mutate the scene graph synchronously when dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Append a randomly sized, coloured and placed cube.
    AddCube,
    /// Remove the most recently added mesh.
    RemoveCube,
    /// Log the scene graph's nodes.
    OutputObjects,
    /// Move a node along its local axes by the panel's translate values.
    Translate,
    /// Swap between perspective and orthographic cameras.
    SwitchCamera,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Self::AddCube,
        Self::RemoveCube,
        Self::OutputObjects,
        Self::Translate,
        Self::SwitchCamera,
    ];

    /// Button caption.
    pub fn label(self) -> &'static str {
        match self {
            Self::AddCube => "addCube",
            Self::RemoveCube => "removeCube",
            Self::OutputObjects => "outputObjects",
            Self::Translate => "translate",
            Self::SwitchCamera => "switchCamera",
        }
    }

    /// Inverse of `label`, for command-line hosts.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.label() == label)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
