//! The four fixed output scenes and their export naming convention.
//!
//! Scene order is part of the contract: batch results are always returned
//! index-aligned to [`Scene::ALL`].

use std::fmt;

use serde::Serialize;

use crate::data_uri::extension_for_mime;

/// Number of images produced per batch.
pub const SCENE_COUNT: usize = 4;

/// Brand prefix for exported result files.
pub const DOWNLOAD_PREFIX: &str = "4seasons";

/// Suffix appended to every exported result file name.
pub const DOWNLOAD_SUFFIX: &str = "high-resolution";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scene {
    FullBodyStudio,
    CloseUp,
    DomesticSetting,
    UrbanNaturalSetting,
}

impl Scene {
    /// All scenes in output order.
    pub const ALL: [Scene; SCENE_COUNT] = [
        Scene::FullBodyStudio,
        Scene::CloseUp,
        Scene::DomesticSetting,
        Scene::UrbanNaturalSetting,
    ];

    /// Stable label used in export file names.
    pub fn label(self) -> &'static str {
        match self {
            Scene::FullBodyStudio => "full-body-studio",
            Scene::CloseUp => "close-up",
            Scene::DomesticSetting => "domestic-setting",
            Scene::UrbanNaturalSetting => "urban-natural-setting",
        }
    }

    /// Human-readable caption for result grids.
    pub fn title(self) -> &'static str {
        match self {
            Scene::FullBodyStudio => "Full body (studio)",
            Scene::CloseUp => "Close-up",
            Scene::DomesticSetting => "Domestic setting",
            Scene::UrbanNaturalSetting => "Urban / natural setting",
        }
    }

    /// Framing and background directive appended to the shared instruction.
    pub fn directive(self) -> &'static str {
        match self {
            Scene::FullBodyStudio => {
                "Full-body photo. Background: a clean, white professional studio."
            }
            Scene::CloseUp => {
                "Close-up photo from the chest up, focused on the face and the top garment. \
                 Background: professional, slightly blurred. Facial consistency is the highest \
                 priority in this shot."
            }
            Scene::DomesticSetting => {
                "Full-body photo. Background: a realistic, elegant domestic setting such as a \
                 bright, modern living room."
            }
            Scene::UrbanNaturalSetting => {
                "Full-body photo. Background: a stylish urban setting such as a European street \
                 with interesting architecture and natural light."
            }
        }
    }

    /// Position of this scene in [`Scene::ALL`].
    pub fn index(self) -> usize {
        match self {
            Scene::FullBodyStudio => 0,
            Scene::CloseUp => 1,
            Scene::DomesticSetting => 2,
            Scene::UrbanNaturalSetting => 3,
        }
    }

    /// Export file name: `{prefix}_{label}_{suffix}.{ext}`.
    pub fn download_filename(self, mime_type: &str) -> String {
        format!(
            "{DOWNLOAD_PREFIX}_{}_{DOWNLOAD_SUFFIX}.{}",
            self.label(),
            extension_for_mime(mime_type)
        )
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_fixed() {
        let labels: Vec<_> = Scene::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(
            labels,
            [
                "full-body-studio",
                "close-up",
                "domestic-setting",
                "urban-natural-setting"
            ]
        );
    }

    #[test]
    fn index_matches_position() {
        for (i, scene) in Scene::ALL.into_iter().enumerate() {
            assert_eq!(scene.index(), i);
        }
    }

    #[test]
    fn download_names() {
        assert_eq!(
            Scene::FullBodyStudio.download_filename("image/png"),
            "4seasons_full-body-studio_high-resolution.png"
        );
        assert_eq!(
            Scene::UrbanNaturalSetting.download_filename("image/jpeg"),
            "4seasons_urban-natural-setting_high-resolution.jpg"
        );
    }

    #[test]
    fn directives_are_distinct() {
        let directives: std::collections::HashSet<_> =
            Scene::ALL.iter().map(|s| s.directive()).collect();
        assert_eq!(directives.len(), SCENE_COUNT);
    }
}
