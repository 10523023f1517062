use indoc::indoc;
use proptest::prelude::*;
use servicemap::analysis::metrics::{
    coupling_score, COUPLING_SCORE, TOTAL_DEPENDENCIES, TOTAL_SERVICES,
};
use servicemap::io::InMemoryTree;
use servicemap::{analyze_architecture, discover_services, ArchitectureAnalyzer, SmellType};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn routes(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| {
            format!("@app.route('/api/v1/{prefix}/{i}')\ndef handler_{i}():\n    return {{}}\n\n")
        })
        .collect()
}

fn service_map(root: &Path, names: &[&str]) -> BTreeMap<String, PathBuf> {
    names
        .iter()
        .map(|name| (name.to_string(), root.join("services").join(name)))
        .collect()
}

#[test]
fn test_god_service_is_reported_once() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "services/catalog/app.py", &routes("catalog", 23));
    write(temp.path(), "services/search/app.py", &routes("search", 3));

    let analysis = analyze_architecture(&service_map(temp.path(), &["catalog", "search"]));

    let god: Vec<_> = analysis.smells_of(SmellType::GodService).collect();
    assert_eq!(god.len(), 1);
    assert_eq!(god[0].location, "catalog");
    assert_eq!(god[0].description, "Service has 23 endpoints, consider splitting");
    assert_eq!(analysis.services["catalog"].endpoint_count(), 23);
    assert_eq!(analysis.metric(TOTAL_SERVICES), 2.0);
}

#[test]
fn test_shared_tables_name_both_services() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "services/orders/repository.py",
        indoc! {r#"
            def load(order_id):
                return db.execute("SELECT * FROM customers WHERE id = %s", (order_id,))
        "#},
    );
    write(
        temp.path(),
        "services/billing/repository.py",
        indoc! {r#"
            def charge(customer):
                db.execute("UPDATE customers SET balance = 0 WHERE id = %s", (customer,))
                db.execute("INSERT INTO invoices (customer) VALUES (%s)", (customer,))
        "#},
    );

    let analysis = analyze_architecture(&service_map(temp.path(), &["orders", "billing"]));

    let shared: Vec<_> = analysis.smells_of(SmellType::SharedDatabase).collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].location, "billing and orders");
    assert_eq!(shared[0].description, "Services share database tables: customers");
}

#[test]
fn test_api_dependency_and_coupling() {
    let temp = TempDir::new().unwrap();
    write(
        temp.path(),
        "services/users/app.py",
        indoc! {r#"
            @app.route('/api/v1/users')
            def list_users():
                return []
        "#},
    );
    write(
        temp.path(),
        "services/orders/client.py",
        indoc! {r#"
            import requests

            def order_owner(order):
                return requests.get("http://users:8000/api/v1/users").json()
        "#},
    );
    write(temp.path(), "services/orders/broken.py", "def broken(:\n");

    let analysis = analyze_architecture(&service_map(temp.path(), &["orders", "users"]));

    assert_eq!(analysis.dependencies.len(), 1);
    let dependency = &analysis.dependencies[0];
    assert_eq!(dependency.source, "orders");
    assert_eq!(dependency.target, "users");
    assert_eq!(analysis.metric(TOTAL_DEPENDENCIES), 1.0);
    assert_eq!(analysis.metric(COUPLING_SCORE), 0.5);
    // the unparsable file is skipped, not fatal
    assert_eq!(analysis.services["orders"].file_count(), 1);
}

#[test]
fn test_services_declaring_the_same_path_are_independent() {
    let health = indoc! {r#"
        @app.route('/health')
        def health():
            return {"status": "ok"}
    "#};
    let tree = InMemoryTree::new()
        .with_file("orders/app.py", health)
        .with_file("users/app.py", health);
    let services: BTreeMap<String, PathBuf> = ["orders", "users"]
        .iter()
        .map(|name| (name.to_string(), PathBuf::from(name)))
        .collect();

    let analysis = ArchitectureAnalyzer::default().analyze_tree(&services, &tree);

    assert!(analysis.dependencies.is_empty());
    assert_eq!(analysis.metric(COUPLING_SCORE), 0.0);
    assert!(analysis.risk_areas.is_empty());
    assert!(!analysis
        .recommendations
        .iter()
        .any(|r| r.contains("circular dependency")));
}

#[test]
fn test_unreadable_service_root_yields_empty_profile() {
    let temp = TempDir::new().unwrap();
    let mut services = BTreeMap::new();
    services.insert("ghost".to_string(), temp.path().join("missing"));

    let analysis = analyze_architecture(&services);

    let ghost = &analysis.services["ghost"];
    assert_eq!(ghost.file_count(), 0);
    assert_eq!(ghost.total_complexity, 0);
    assert!(analysis.code_smells.is_empty());
}

#[test]
fn test_discovery_strips_service_suffixes() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "services/payments/app.py", "x = 1\n");
    write(temp.path(), "users-service/main.py", "x = 1\n");
    write(temp.path(), "gateway-api/main.py", "x = 1\n");
    write(temp.path(), "services/docs/README.md", "# docs\n");

    let patterns: Vec<String> = ["services/*", "*-service", "*-api"]
        .iter()
        .map(|p| p.to_string())
        .collect();
    let services = discover_services(temp.path(), &patterns).unwrap();

    let names: Vec<&str> = services.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["gateway", "payments", "users"]);
    assert_eq!(services["users"], temp.path().join("users-service"));
}

const TABLES: [&str; 4] = ["accounts", "invoices", "orders", "sessions"];

proptest! {
    #[test]
    fn prop_coupling_score_formula(n in 0usize..50, deps in 0usize..200) {
        let score = coupling_score(n, deps);
        if n > 1 {
            prop_assert_eq!(score, deps as f64 / (n * (n - 1)) as f64);
        } else {
            prop_assert_eq!(score, deps as f64);
        }
    }

    #[test]
    fn prop_shared_tables_give_one_smell_per_pair(
        table_sets in proptest::collection::vec(proptest::collection::btree_set(0usize..4, 0..3), 2..5)
    ) {
        let mut tree = InMemoryTree::new();
        let mut services = BTreeMap::new();
        for (i, tables) in table_sets.iter().enumerate() {
            let name = format!("svc{i}");
            let body: String = tables
                .iter()
                .map(|t| format!("db.execute(\"SELECT * FROM {}\")\n", TABLES[*t]))
                .collect();
            tree.insert(format!("{name}/repo.py"), format!("x = 1\n{body}"));
            services.insert(name.clone(), PathBuf::from(name));
        }

        let analysis = ArchitectureAnalyzer::default().analyze_tree(&services, &tree);

        let mut expected = BTreeSet::new();
        for i in 0..table_sets.len() {
            for j in i + 1..table_sets.len() {
                if !table_sets[i].is_disjoint(&table_sets[j]) {
                    expected.insert(format!("svc{i} and svc{j}"));
                }
            }
        }
        let found: Vec<String> = analysis
            .smells_of(SmellType::SharedDatabase)
            .map(|smell| smell.location.clone())
            .collect();
        prop_assert_eq!(found.len(), expected.len());
        prop_assert_eq!(found.into_iter().collect::<BTreeSet<_>>(), expected);
    }
}
