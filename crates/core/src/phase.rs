use serde::{Deserialize, Serialize};

/// Externally observable state of one address's portrait.
///
/// ```text
/// NoPortrait --generate--> Preview --save--> Portrait
/// Portrait   --generate--> Preview --save--> Portrait (updated)
/// Preview    --cancel----> whichever state preceded it
/// ```
///
/// `Preview` is held by the client only; the server never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PortraitPhase {
    /// No committed portrait exists for the address.
    NoPortrait,
    /// A generated image is held locally but not committed.
    Preview {
        /// The committed image URL that was current before generating, if any.
        previous: Option<String>,
    },
    /// A committed portrait exists.
    Portrait {
        /// Reference path of the committed image.
        image_url: String,
    },
}

impl PortraitPhase {
    /// Phase for a committed image URL, or `NoPortrait` when there is none.
    pub fn committed(image_url: Option<String>) -> Self {
        match image_url {
            Some(image_url) => Self::Portrait { image_url },
            None => Self::NoPortrait,
        }
    }

    /// Transition taken after a successful generation.
    #[must_use]
    pub fn on_generate(self) -> Self {
        match self {
            Self::NoPortrait => Self::Preview { previous: None },
            Self::Portrait { image_url } => Self::Preview {
                previous: Some(image_url),
            },
            preview @ Self::Preview { .. } => preview,
        }
    }

    /// Transition taken after a successful save.
    #[must_use]
    #[allow(clippy::unused_self, clippy::needless_pass_by_value)]
    pub fn on_save(self, image_url: String) -> Self {
        Self::Portrait { image_url }
    }

    /// Transition taken when a preview is discarded.
    #[must_use]
    pub fn on_cancel(self) -> Self {
        match self {
            Self::Preview { previous } => Self::committed(previous),
            other => other,
        }
    }

    /// Whether a preview is currently held.
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_portrait_flow() {
        let phase = PortraitPhase::NoPortrait.on_generate();
        assert_eq!(phase, PortraitPhase::Preview { previous: None });
        let phase = phase.on_save("/api/image/portraits/0xa.webp".into());
        assert_eq!(
            phase,
            PortraitPhase::Portrait {
                image_url: "/api/image/portraits/0xa.webp".into()
            }
        );
    }

    #[test]
    fn cancel_restores_no_portrait() {
        let phase = PortraitPhase::NoPortrait.on_generate().on_cancel();
        assert_eq!(phase, PortraitPhase::NoPortrait);
    }

    #[test]
    fn cancel_restores_previous_portrait() {
        let phase = PortraitPhase::committed(Some("/old".into()))
            .on_generate()
            .on_cancel();
        assert_eq!(
            phase,
            PortraitPhase::Portrait {
                image_url: "/old".into()
            }
        );
    }

    #[test]
    fn regenerate_keeps_original_previous() {
        let phase = PortraitPhase::committed(Some("/old".into()))
            .on_generate()
            .on_generate();
        assert_eq!(
            phase,
            PortraitPhase::Preview {
                previous: Some("/old".into())
            }
        );
    }

    #[test]
    fn cancel_outside_preview_is_noop() {
        assert_eq!(
            PortraitPhase::NoPortrait.on_cancel(),
            PortraitPhase::NoPortrait
        );
    }
}
