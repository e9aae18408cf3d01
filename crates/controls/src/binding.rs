use crate::Action;

/// One row of a controls panel, borrowing the field it edits.
///
/// `folder` groups rows under a collapsible heading in hosts that support it.
#[derive(Debug)]
pub enum Binding<'a> {
    Slider {
        label: &'static str,
        value: &'a mut f32,
        min: f32,
        max: f32,
        folder: Option<&'static str>,
    },
    Toggle {
        label: &'static str,
        value: &'a mut bool,
        folder: Option<&'static str>,
    },
    /// Read-only value refreshed every frame.
    Readout { label: &'static str, text: String },
    Button {
        action: Action,
        folder: Option<&'static str>,
    },
}

impl<'a> Binding<'a> {
    pub fn slider(label: &'static str, value: &'a mut f32, min: f32, max: f32) -> Self {
        Self::Slider {
            label,
            value,
            min,
            max,
            folder: None,
        }
    }

    pub fn toggle(label: &'static str, value: &'a mut bool) -> Self {
        Self::Toggle {
            label,
            value,
            folder: None,
        }
    }

    pub fn readout(label: &'static str, text: impl Into<String>) -> Self {
        Self::Readout {
            label,
            text: text.into(),
        }
    }

    pub fn button(action: Action) -> Self {
        Self::Button {
            action,
            folder: None,
        }
    }

    /// Place the row under a folder heading. Readouts stay top-level.
    pub fn in_folder(mut self, name: &'static str) -> Self {
        match &mut self {
            Self::Slider { folder, .. } | Self::Toggle { folder, .. } | Self::Button { folder, .. } => {
                *folder = Some(name);
            }
            Self::Readout { .. } => {}
        }
        self
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Slider { label, .. } | Self::Toggle { label, .. } | Self::Readout { label, .. } => {
                *label
            }
            Self::Button { action, .. } => action.label(),
        }
    }

    pub fn folder(&self) -> Option<&'static str> {
        match self {
            Self::Slider { folder, .. } | Self::Toggle { folder, .. } | Self::Button { folder, .. } => {
                *folder
            }
            Self::Readout { .. } => None,
        }
    }

    /// Write a slider value, clamped to its range. Returns false for
    /// non-slider rows.
    pub fn set_clamped(&mut self, new: f32) -> bool {
        match self {
            Self::Slider {
                value, min, max, ..
            } => {
                **value = new.clamp(*min, *max);
                true
            }
            _ => false,
        }
    }

    /// Pull a slider's current value back into its range.
    pub fn clamp_to_range(&mut self) {
        if let Self::Slider {
            value, min, max, ..
        } = self
        {
            **value = (**value).clamp(*min, *max);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_clamps() {
        let mut speed = 0.02;
        let mut row = Binding::slider("rotationSpeed", &mut speed, 0.0, 0.5);
        assert!(row.set_clamped(3.0));
        drop(row);
        assert_eq!(speed, 0.5);

        let mut row = Binding::slider("rotationSpeed", &mut speed, 0.0, 0.5);
        row.set_clamped(-1.0);
        drop(row);
        assert_eq!(speed, 0.0);
    }

    #[test]
    fn clamp_to_range_pulls_stored_value_in() {
        let mut scale = 12.5;
        Binding::slider("scaleX", &mut scale, 0.0, 5.0).clamp_to_range();
        assert_eq!(scale, 5.0);

        let mut y = 3.0;
        Binding::slider("positionY", &mut y, -4.0, 20.0).clamp_to_range();
        assert_eq!(y, 3.0);

        let mut visible = false;
        Binding::toggle("visible", &mut visible).clamp_to_range();
        assert!(!visible);
    }

    #[test]
    fn set_clamped_ignores_other_rows() {
        let mut visible = true;
        let mut row = Binding::toggle("visible", &mut visible);
        assert!(!row.set_clamped(1.0));
        assert!(!Binding::readout("numberOfObjects", "3").set_clamped(1.0));
    }

    #[test]
    fn folders() {
        let mut x = 1.0;
        let row = Binding::slider("scaleX", &mut x, 0.0, 5.0).in_folder("scale");
        assert_eq!(row.folder(), Some("scale"));
        assert_eq!(row.label(), "scaleX");

        let row = Binding::readout("perspective", "Perspective").in_folder("ignored");
        assert_eq!(row.folder(), None);

        let row = Binding::button(Action::Translate).in_folder("translate");
        assert_eq!(row.label(), "translate");
        assert_eq!(row.folder(), Some("translate"));
    }
}
