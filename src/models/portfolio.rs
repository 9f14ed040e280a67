use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub id: i64,
    pub title: String,
    pub image_path: String,
    pub description: String,
    pub nail_shape: Option<NailShape>,
    pub tags: String,
    pub featured: bool,
}

impl PortfolioItem {
    /// Tags are stored comma-separated, e.g. "floral, summer, french tip".
    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NailShape {
    Oval,
    Square,
    Coffin,
    Almond,
    Stiletto,
}

impl NailShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            NailShape::Oval => "oval",
            NailShape::Square => "square",
            NailShape::Coffin => "coffin",
            NailShape::Almond => "almond",
            NailShape::Stiletto => "stiletto",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "oval" => Some(NailShape::Oval),
            "square" => Some(NailShape::Square),
            "coffin" => Some(NailShape::Coffin),
            "almond" => Some(NailShape::Almond),
            "stiletto" => Some(NailShape::Stiletto),
            _ => None,
        }
    }
}
