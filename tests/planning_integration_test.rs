use pretty_assertions::assert_eq;
use proptest::prelude::*;
use servicemap::core::{CodeSmell, EndpointFact, ServiceProfile};
use servicemap::planning::order_by_dependencies;
use servicemap::{
    create_plan, ArchitectureAnalysis, RefactorStep, RefactorType, RiskLevel, SafetyLevel,
    Severity, SmellType, TargetArchitecture,
};
use std::collections::HashMap;

fn step(id: &str, dependencies: Vec<String>) -> RefactorStep {
    RefactorStep {
        id: id.to_string(),
        step_type: RefactorType::Restructure,
        description: format!("step {id}"),
        target_files: vec![],
        dependencies,
        estimated_effort: 1,
        risk_level: RiskLevel::Low,
        rollback_strategy: None,
        validation_steps: vec![],
        commit_message: None,
    }
}

const GROUP_SIZE: usize = 3;

fn step_id(i: usize) -> String {
    format!("g{}-s{i:02}", i / GROUP_SIZE)
}

/// Steps where each may depend on any lower-numbered step by id and on any
/// earlier group by a `g{n}-*` wildcard, presented in shuffled order.
fn acyclic_steps() -> impl Strategy<Value = Vec<RefactorStep>> {
    (1usize..12)
        .prop_flat_map(|n| {
            (0..n)
                .map(|i| {
                    (
                        proptest::collection::vec(any::<bool>(), i),
                        proptest::collection::vec(any::<bool>(), i / GROUP_SIZE),
                    )
                })
                .collect::<Vec<_>>()
        })
        .prop_map(|masks| {
            masks
                .iter()
                .enumerate()
                .map(|(i, (literal, wildcard))| {
                    let literal = literal
                        .iter()
                        .enumerate()
                        .filter(|(_, on)| **on)
                        .map(|(j, _)| step_id(j));
                    let wildcard = wildcard
                        .iter()
                        .enumerate()
                        .filter(|(_, on)| **on)
                        .map(|(group, _)| format!("g{group}-*"));
                    step(&step_id(i), literal.chain(wildcard).collect())
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

proptest! {
    #[test]
    fn prop_dependencies_precede_dependents(steps in acyclic_steps()) {
        let count = steps.len();
        let ordered = order_by_dependencies(steps);

        prop_assert!(!ordered.dependency_cycle);
        prop_assert_eq!(ordered.steps.len(), count);

        let position: HashMap<&str, usize> = ordered
            .steps
            .iter()
            .enumerate()
            .map(|(i, s)| (s.id.as_str(), i))
            .collect();
        prop_assert_eq!(position.len(), count);
        for s in &ordered.steps {
            for dep in &s.dependencies {
                match dep.strip_suffix('*') {
                    Some(prefix) => {
                        for other in ordered.steps.iter().filter(|o| o.id.starts_with(prefix)) {
                            prop_assert!(position[other.id.as_str()] < position[s.id.as_str()]);
                        }
                    }
                    None => {
                        prop_assert!(position[dep.as_str()] < position[s.id.as_str()]);
                    }
                }
            }
        }
    }

    #[test]
    fn prop_cycle_keeps_input_order(len in 2usize..8) {
        let steps: Vec<RefactorStep> = (0..len)
            .map(|i| step(&format!("s{i}"), vec![format!("s{}", (i + 1) % len)]))
            .collect();
        let ids: Vec<String> = steps.iter().map(|s| s.id.clone()).collect();

        let ordered = order_by_dependencies(steps);

        prop_assert!(ordered.dependency_cycle);
        let kept: Vec<String> = ordered.steps.iter().map(|s| s.id.clone()).collect();
        prop_assert_eq!(kept, ids);
    }
}

#[test]
fn test_empty_analysis_gives_empty_generic_plan() {
    let plan = create_plan(
        Some(&ArchitectureAnalysis::default()),
        TargetArchitecture::GenericSmellDriven,
        SafetyLevel::High,
        None,
    )
    .unwrap();

    assert!(plan.steps.is_empty());
    assert_eq!(plan.total_effort, 0);
    assert_eq!(plan.risk_assessment.total_risk_score, 0);
    assert!(!plan.dependency_cycle);
    assert!(plan.rollback_plan.is_some());
}

#[test]
fn test_missing_analysis_is_rejected() {
    let result = create_plan(
        None,
        TargetArchitecture::Microservices,
        SafetyLevel::Low,
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_generic_plan_for_god_service() {
    let mut analysis = ArchitectureAnalysis::default();
    let mut catalog = ServiceProfile::new("catalog", "services/catalog");
    catalog.endpoints = (0..25)
        .map(|i| EndpointFact {
            path: format!("/api/v1/catalog/{i}"),
            method: "GET".into(),
            framework: "flask".into(),
        })
        .collect();
    analysis.services.insert("catalog".into(), catalog);
    analysis.code_smells.push(CodeSmell {
        smell_type: SmellType::GodService,
        severity: Severity::High,
        location: "catalog".into(),
        description: "Service has 25 endpoints, consider splitting".into(),
        suggested_fix: Some("Split into smaller, focused services based on domain boundaries".into()),
        effort_estimate: Some(40),
    });

    let plan = create_plan(
        Some(&analysis),
        TargetArchitecture::GenericSmellDriven,
        SafetyLevel::High,
        None,
    )
    .unwrap();

    let ids: Vec<&str> = plan.steps.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["split-god-service-catalog"]);
    assert_eq!(plan.total_effort, 40);
    assert_eq!(plan.risk_assessment.high_risk_count, 1);
    assert_eq!(plan.risk_assessment.total_risk_score, 3);
}

#[test]
fn test_every_style_orders_dependencies_first() {
    let mut analysis = ArchitectureAnalysis::default();
    for name in ["billing", "orders", "users"] {
        analysis
            .services
            .insert(name.into(), ServiceProfile::new(name, format!("services/{name}")));
    }

    for target in [
        TargetArchitecture::DomainDriven,
        TargetArchitecture::EventDriven,
        TargetArchitecture::Microservices,
        TargetArchitecture::GenericSmellDriven,
    ] {
        for safety in [SafetyLevel::Low, SafetyLevel::Medium, SafetyLevel::High] {
            let plan = create_plan(Some(&analysis), target, safety, None).unwrap();
            assert!(!plan.dependency_cycle, "{target} plan is cyclic");
            assert_eq!(
                plan.total_effort,
                plan.steps.iter().map(|s| s.estimated_effort).sum::<u32>()
            );
            let seen: Vec<&str> = plan.steps.iter().map(|s| s.id.as_str()).collect();
            for (position, s) in plan.steps.iter().enumerate() {
                for dep in &s.dependencies {
                    let matches = |id: &&str| match dep.strip_suffix('*') {
                        Some(prefix) => id.starts_with(prefix) && *id != s.id,
                        None => *id == dep,
                    };
                    assert!(
                        seen[position..].iter().all(|id| !matches(id)),
                        "{target}: {} scheduled before its dependency {dep}",
                        s.id
                    );
                }
            }
        }
    }
}
