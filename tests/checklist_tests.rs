use deploy_complexity::checklist::{
    Checklist, ChecklistError, ChecklistRegistry, PathRule, RegistryBuilder, annotate, match_files,
};
use std::fs;
use tempfile::TempDir;

fn files(paths: &[&str]) -> Vec<String> {
    paths.iter().map(ToString::to_string).collect()
}

fn registry() -> ChecklistRegistry {
    ChecklistRegistry::builtin().expect("built-in registry is valid")
}

#[test]
fn test_migration_scenario() {
    let registry = registry();
    let result = match_files(&files(&["db/migrate/2024_add_x.rb"]), &registry);

    assert_eq!(result.names(), vec!["MigrationChecklist"]);
    assert_eq!(
        result.files_for("MigrationChecklist"),
        Some(&["db/migrate/2024_add_x.rb".to_string()][..])
    );

    let annotation = annotate("Adds a column.", result);
    assert_eq!(
        annotation
            .new_body
            .matches("checklist:MigrationChecklist")
            .count(),
        1
    );
    assert!(annotation.new_body.starts_with("Adds a column.\n\n<!-- checklist:MigrationChecklist -->\n**Migrations Checklist**\n\n"));
}

#[test]
fn test_dockerfile_and_resque_scenario() {
    let registry = registry();
    let result = match_files(&files(&["Dockerfile", "app/jobs/foo.rb"]), &registry);

    assert_eq!(
        result.files_for("DockerfileChecklist"),
        Some(&["Dockerfile".to_string()][..])
    );
    assert_eq!(
        result.files_for("ResqueChecklist"),
        Some(&["app/jobs/foo.rb".to_string()][..])
    );
    for absent in ["CapistranoChecklist", "RoutesChecklist", "NixChecklist"] {
        assert!(!result.contains(absent), "{absent} should not match");
    }
}

#[test]
fn test_already_present_is_a_no_op() {
    let registry = registry();
    let dockerfile = registry
        .get("DockerfileChecklist")
        .expect("built-in Dockerfile checklist");
    let body = format!("Container tweaks{}", dockerfile.for_pr_body());

    let first = annotate(&body, match_files(&files(&["Dockerfile"]), &registry));
    assert!(first.newly_added.is_empty());
    assert!(first.comment.is_none());
    assert_eq!(first.already_present.names(), vec!["DockerfileChecklist"]);

    let second = annotate(&first.new_body, match_files(&files(&["Dockerfile"]), &registry));
    assert!(second.newly_added.is_empty());
    assert_eq!(second.new_body, body);
}

#[test]
fn test_annotation_is_idempotent() {
    let registry = registry();
    let changed = files(&[
        "db/migrate/1_x.rb",
        "config/routes.rb",
        "spec/factories/users.rb",
    ]);

    let first = annotate("", match_files(&changed, &registry));
    assert_eq!(first.newly_added.len(), 3);
    let comment = first.comment.as_deref().expect("comment for new checklists");
    assert!(comment.starts_with("🤖 Beep boop! I added some checklists! Why?"));
    assert!(comment.contains("| Migrations | `db/migrate/1_x.rb`|\n"));

    let second = annotate(&first.new_body, match_files(&changed, &registry));
    assert!(second.newly_added.is_empty());
    assert!(second.comment.is_none());
    assert_eq!(second.already_present.len(), 3);
    assert_eq!(second.new_body, first.new_body);
}

#[test]
fn test_matching_is_pure_and_excludes_unrelated_rules() {
    let registry = registry();
    let changed = files(&["README.md", "app/models/user.rb"]);

    let first = match_files(&changed, &registry);
    let second = match_files(&changed, &registry);
    assert!(first.is_empty());
    assert_eq!(first.names(), second.names());
}

#[test]
fn test_matching_is_repeatable_across_several_rules() {
    let registry = registry();
    let changed = files(&[
        "Dockerfile",
        "db/migrate/3_z.rb",
        "app/jobs/mailer.rb",
        "config/routes.rb",
        "db/migrate/3_z.rb",
    ]);

    let first = match_files(&changed, &registry);
    let second = match_files(&changed, &registry);
    assert!(first.len() >= 4);
    assert_eq!(first.names(), second.names());
    for name in first.names() {
        assert_eq!(first.files_for(name), second.files_for(name), "{name}");
    }
    assert_eq!(
        first.files_for("MigrationChecklist").map(<[String]>::len),
        Some(2)
    );
}

#[test]
fn test_every_builtin_marker_is_found_after_insertion() {
    let registry = registry();
    for checklist in registry.iter() {
        let body = format!("text{}", checklist.for_pr_body());
        assert!(checklist.is_present_in(&body), "{}", checklist.name());
    }
}

#[test]
fn test_custom_checklists_from_file() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("checklists.toml");
    fs::write(
        &path,
        r#"
[[checklist]]
name = "GraphqlSchemaChecklist"
human_name = "GraphQL Schema"
body = "- [ ] Did you regenerate the schema?"
prefixes = ["app/graphql/"]
patterns = ['\.graphql$']
"#,
    )
    .expect("write checklist file");

    let registry = ChecklistRegistry::load(Some(&path)).expect("custom registry");
    let names: Vec<&str> = registry.iter().map(|c| c.name()).collect();
    assert_eq!(names.last(), Some(&"GraphqlSchemaChecklist"));

    let result = match_files(
        &files(&["schema/api.graphql", "app/graphql/types/user.rb", "db/migrate/2_y.rb"]),
        &registry,
    );
    assert_eq!(result.names(), vec!["MigrationChecklist", "GraphqlSchemaChecklist"]);
    assert_eq!(result.files_for("GraphqlSchemaChecklist").map(<[String]>::len), Some(2));
}

#[test]
fn test_custom_checklist_cannot_shadow_builtin() {
    let result = RegistryBuilder::with_builtins()
        .register(PathRule::new("NixChecklist", "Nix again", "- [ ] hi").prefix("x"))
        .build();
    assert!(matches!(result, Err(ChecklistError::DuplicateName(name)) if name == "NixChecklist"));
}

#[test]
fn test_missing_custom_file_is_an_error() {
    let dir = TempDir::new().expect("temp dir");
    let result = ChecklistRegistry::load(Some(&dir.path().join("missing.toml")));
    assert!(matches!(result, Err(ChecklistError::Io { .. })));
}
