//! Sample decks bundled with the library.

use crate::deck::DeckSpec;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    pub name: &'static str,
    pub description: &'static str,
    pub yaml: &'static str,
}

impl Sample {
    pub fn spec(&self) -> Result<DeckSpec> {
        DeckSpec::from_yaml_str(self.yaml)
    }
}

pub const SAMPLES: [Sample; 3] = [
    Sample {
        name: "case-competition",
        description: "Ten-slide consulting deck: agenda, charts, matrix, recommendations",
        yaml: include_str!("../decks/case_competition.yaml"),
    },
    Sample {
        name: "medichain",
        description: "Startup pitch with KPI cards, doughnut chart and a free-form diagram",
        yaml: include_str!("../decks/medichain.yaml"),
    },
    Sample {
        name: "strategy-frameworks",
        description: "SWOT, growth-share matrix, process flow and timeline on a 4:3 page",
        yaml: include_str!("../decks/strategy_frameworks.yaml"),
    },
];

pub fn find(name: &str) -> Option<&'static Sample> {
    let wanted = name.replace('_', "-").to_ascii_lowercase();
    SAMPLES.iter().find(|s| s.name == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_accept_underscores() {
        assert_eq!(find("Strategy_Frameworks").map(|s| s.name), Some("strategy-frameworks"));
        assert!(find("unknown").is_none());
    }
}
