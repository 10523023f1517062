//! Catalog of whole-system migration strategies.

use crate::core::SafetyLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationPhase {
    pub name: String,
    /// Days
    pub duration: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MigrationStrategy {
    pub key: String,
    pub name: String,
    pub description: String,
    pub phases: Vec<MigrationPhase>,
    pub prerequisites: Vec<String>,
    pub risks: Vec<String>,
    /// Days
    pub estimated_duration: u32,
    /// Head count per role
    pub resource_requirements: BTreeMap<String, u32>,
}

struct StrategyDef {
    key: &'static str,
    name: &'static str,
    description: &'static str,
    phases: &'static [(&'static str, u32)],
    prerequisites: &'static [&'static str],
    risks: &'static [&'static str],
    estimated_duration: u32,
    resources: &'static [(&'static str, u32)],
}

static STRATEGIES: &[StrategyDef] = &[
    StrategyDef {
        key: "strangler-fig",
        name: "Strangler Fig Pattern",
        description: "Gradually replace legacy system by routing traffic to new services",
        phases: &[
            ("Identify boundaries", 5),
            ("Create facade", 3),
            ("Implement new services", 20),
            ("Route traffic gradually", 10),
            ("Decommission legacy", 5),
        ],
        prerequisites: &["API gateway", "Feature flags", "Monitoring"],
        risks: &["Data synchronization", "Increased complexity during transition"],
        estimated_duration: 43,
        resources: &[("developers", 4), ("devops", 2)],
    },
    StrategyDef {
        key: "big-bang",
        name: "Big Bang Migration",
        description: "Replace entire system at once during maintenance window",
        phases: &[
            ("Complete development", 30),
            ("Extensive testing", 10),
            ("Data migration", 2),
            ("Cutover", 1),
        ],
        prerequisites: &["Complete test coverage", "Rollback plan", "Data migration tools"],
        risks: &["High risk of failure", "Extended downtime", "No gradual validation"],
        estimated_duration: 43,
        resources: &[("developers", 6), ("devops", 3), ("qa", 4)],
    },
    StrategyDef {
        key: "parallel-run",
        name: "Parallel Run Pattern",
        description: "Run old and new systems in parallel, comparing results",
        phases: &[
            ("Implement new system", 25),
            ("Setup parallel infrastructure", 5),
            ("Run in parallel", 15),
            ("Validate and switch", 5),
        ],
        prerequisites: &[
            "Double infrastructure",
            "Result comparison tools",
            "Traffic replication",
        ],
        risks: &["Increased costs", "Complex result reconciliation"],
        estimated_duration: 50,
        resources: &[("developers", 5), ("devops", 3), ("qa", 3)],
    },
];

impl StrategyDef {
    fn build(&self) -> MigrationStrategy {
        MigrationStrategy {
            key: self.key.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            phases: self
                .phases
                .iter()
                .map(|(name, duration)| MigrationPhase {
                    name: name.to_string(),
                    duration: *duration,
                })
                .collect(),
            prerequisites: self.prerequisites.iter().map(|s| s.to_string()).collect(),
            risks: self.risks.iter().map(|s| s.to_string()).collect(),
            estimated_duration: self.estimated_duration,
            resource_requirements: self
                .resources
                .iter()
                .map(|(role, count)| (role.to_string(), *count))
                .collect(),
        }
    }
}

pub fn catalog() -> Vec<MigrationStrategy> {
    STRATEGIES.iter().map(StrategyDef::build).collect()
}

pub fn find_strategy(key: &str) -> Option<MigrationStrategy> {
    STRATEGIES
        .iter()
        .find(|def| def.key == key)
        .map(StrategyDef::build)
}

/// Incremental strategies for cautious plans, a cutover for aggressive ones
pub fn recommend_strategy(safety: SafetyLevel) -> MigrationStrategy {
    let key = match safety {
        SafetyLevel::High => "strangler-fig",
        SafetyLevel::Medium => "parallel-run",
        SafetyLevel::Low => "big-bang",
    };
    let def = STRATEGIES
        .iter()
        .find(|def| def.key == key)
        .unwrap_or(&STRATEGIES[0]);
    def.build()
}
