//! Action plans: the decision engine's output, one ordered action list per
//! cluster. Plans are read from YAML (or JSON) files.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::action::Action;
use crate::error::{ClusterctlError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub clusters: Vec<ClusterPlan>,
}

impl Plan {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ClusterctlError::PlanNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self> {
        let plan: Plan = serde_yaml::from_str(data)?;
        plan.validate()?;
        Ok(plan)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for cluster in &self.clusters {
            if cluster.id.trim().is_empty() {
                return Err(ClusterctlError::InvalidPlan(format!(
                    "cluster '{}' has a blank id",
                    cluster.name
                )));
            }
            if !seen.insert(cluster.id.as_str()) {
                return Err(ClusterctlError::InvalidPlan(format!(
                    "cluster id '{}' appears more than once",
                    cluster.id
                )));
            }
        }
        Ok(())
    }

    /// Keep only clusters whose name matches `filter`.
    pub fn filter_clusters(mut self, filter: &Regex) -> Self {
        self.clusters.retain(|c| filter.is_match(&c.name));
        self
    }

    pub fn total_actions(&self) -> usize {
        self.clusters.iter().map(|c| c.actions.len()).sum()
    }
}
