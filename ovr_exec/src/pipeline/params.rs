//! Parameters structure for the override pipeline

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use crate::{launch_ctrl, obst_ctrl, stuck_ctrl};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the whole pipeline, one optional table per stage.
///
/// A stage is only built if its table is present.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Params {
    #[serde(default)]
    pub launch: Option<launch_ctrl::Params>,

    #[serde(default)]
    pub obst: Option<obst_ctrl::Params>,

    #[serde(default)]
    pub stuck: Option<stuck_ctrl::Params>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    /// Every stage enabled with its default parameters.
    fn default() -> Self {
        Self {
            launch: Some(launch_ctrl::Params::default()),
            obst: Some(obst_ctrl::Params::default()),
            stuck: Some(stuck_ctrl::Params::default()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_missing_tables_disable() {
        let params: Params = util::params::parse(
            r#"
            [launch]
            boost_duration_s = 2.0

            [stuck]
            "#,
        )
        .unwrap();

        assert_eq!(params.launch.unwrap().boost_duration_s, 2.0);
        assert!(params.obst.is_none());
        assert_eq!(params.stuck.unwrap().recovery_duration_s, 2.2);
    }

    #[test]
    fn test_unknown_table_rejected() {
        assert!(util::params::parse::<Params>("[lane_keep]\ngain = 1.0").is_err());
    }
}
