use crate::error::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type BeaconId = u32;
pub type UserId = u32;

/// A `#rrggbb` display color. Always stored as six lower-case hex digits.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn black() -> Self {
        Color("#000000".into())
    }

    pub fn white() -> Self {
        Color("#ffffff".into())
    }

    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Color(format!("#{r:02x}{g:02x}{b:02x}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Color {
    type Err = BoardError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || BoardError::InvalidColor(input.to_string());
        let digits = input.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let expanded: String = match digits.len() {
            3 => digits.chars().flat_map(|c| [c, c]).collect(),
            6 => digits.to_string(),
            _ => return Err(invalid()),
        };
        Ok(Color(format!("#{}", expanded.to_ascii_lowercase())))
    }
}

impl TryFrom<String> for Color {
    type Error = BoardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A beacon on the board. A beacon without a title is unpaired.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beacon {
    pub id: BeaconId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_color: Option<Color>,
}

impl Beacon {
    pub fn is_paired(&self) -> bool {
        self.title.is_some()
    }
}

/// Partial beacon record. A `None` field means "not observed", never "clear it".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeaconUpdate {
    pub id: BeaconId,
    #[serde(default)]
    pub owner: Option<UserId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    #[serde(default)]
    pub base_color: Option<Color>,
}

impl BeaconUpdate {
    pub fn bare(id: BeaconId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn into_beacon(self) -> Beacon {
        Beacon {
            id: self.id,
            owner: self.owner,
            title: self.title,
            desc: self.desc,
            base_color: self.base_color,
        }
    }

    pub fn merge_into(self, beacon: &mut Beacon) {
        if let Some(owner) = self.owner {
            beacon.owner = Some(owner);
        }
        if let Some(title) = self.title {
            beacon.title = Some(title);
        }
        if let Some(desc) = self.desc {
            beacon.desc = Some(desc);
        }
        if let Some(color) = self.base_color {
            beacon.base_color = Some(color);
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: BeaconId,
    pub user: UserId,
    pub title: String,
    pub desc: String,
    pub color: Color,
    pub date: i64,
}

/// Parameters of the one active pulse animation. `frequency` is the pulse
/// period in seconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchSession {
    pub beacon_id: BeaconId,
    pub color: Color,
    pub frequency: f64,
    pub start_time: f64,
}

impl SearchSession {
    pub fn opacity_at(&self, now: f64) -> f64 {
        if self.frequency <= 0.0 {
            return 1.0;
        }
        let t = (now - self.start_time) / self.frequency;
        (std::f64::consts::PI * t.rem_euclid(1.0)).sin().abs()
    }
}
