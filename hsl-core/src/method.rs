use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hydraulic computation method used to build a law.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Method {
    /// Bradley pier head-loss method, 1978 abacus edition.
    Bradley78,
    /// Bradley pier head-loss method, 1972 abacus edition.
    Bradley72,
    /// Borda abrupt-contraction head loss with a weir fallback.
    Borda,
    /// Orifice and weir laws summed over every opening.
    Orifice,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::Bradley78,
        Method::Bradley72,
        Method::Borda,
        Method::Orifice,
    ];

    /// Name under which laws are stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Bradley78 => "Bradley 78",
            Method::Bradley72 => "Bradley 72",
            Method::Borda => "Borda",
            Method::Orifice => "Orifice",
        }
    }

    /// Abacus groups the method reads, in lookup order.
    pub fn abacus_groups(&self) -> &'static [&'static str] {
        match self {
            Method::Bradley78 => &["bradley", "bradley78"],
            Method::Bradley72 => &["bradley", "bradley72"],
            Method::Borda | Method::Orifice => &[],
        }
    }

    pub fn is_bradley(&self) -> bool {
        matches!(self, Method::Bradley78 | Method::Bradley72)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "bradley78" | "bradley" => Ok(Method::Bradley78),
            "bradley72" => Ok(Method::Bradley72),
            "borda" => Ok(Method::Borda),
            "orifice" | "loidorifice" => Ok(Method::Orifice),
            _ => Err(format!(
                "unknown method '{}' (expected one of: bradley78, bradley72, borda, orifice)",
                s
            )),
        }
    }
}
