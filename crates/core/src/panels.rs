//! The three top-level panels of the user-facing surface and the copy shown
//! on the landing panel.

use serde::Serialize;

/// Application display name.
pub const APP_NAME: &str = "MatriXpert";

/// A navigable panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Info,
    ImageAnalyzer,
    Assistant,
}

/// All panels in navigation order.
pub const PANELS: [Panel; 3] = [Panel::Info, Panel::ImageAnalyzer, Panel::Assistant];

/// Serializable panel descriptor for the navigation menu.
#[derive(Debug, Clone, Serialize)]
pub struct PanelDescriptor {
    pub id: Panel,
    pub title: &'static str,
    pub description: &'static str,
}

impl Panel {
    pub fn title(self) -> &'static str {
        match self {
            Self::Info => "Welcome to MatriXpert",
            Self::ImageAnalyzer => "Enhanced Image Upload and Query Processing",
            Self::Assistant => "Material Science Chatbot",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Info => "One stop platform for Material Science.",
            Self::ImageAnalyzer => {
                "Upload multiple images or provide a URL, optionally crop them, \
                 and ask a query related to the image."
            }
            Self::Assistant => {
                "Ask the chatbot any questions related to Material Science and get instant answers."
            }
        }
    }

    pub fn descriptor(self) -> PanelDescriptor {
        PanelDescriptor {
            id: self,
            title: self.title(),
            description: self.description(),
        }
    }
}

/// Landing panel content.
#[derive(Debug, Clone, Serialize)]
pub struct InfoContent {
    pub title: &'static str,
    pub welcome: &'static str,
    pub features: &'static [&'static str],
}

/// Feature list shown on the landing panel.
pub const FEATURES: &[&str] = &[
    "Upload and process images of material microstructures and any material related content.",
    "Crop and focus on areas of interest.",
    "Ask specific questions to get insights about your image.",
    "Query the assistant to answer your questions related to Material Science.",
];

pub fn info_content() -> InfoContent {
    InfoContent {
        title: Panel::Info.title(),
        welcome: "Upload images related to Material Science and ask questions about them.",
        features: FEATURES,
    }
}
