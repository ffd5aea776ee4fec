//! CLI tests for `dnsbuilder build`, `map` and `check`.

mod common;

use common::{TestEnv, BROKEN_TESTBED, SMALL_TESTBED};

#[test]
fn build_writes_output_and_reports_services() {
    let env = TestEnv::new();
    env.write_project_file("lab.yml", SMALL_TESTBED);

    let result = env.run(&["build", "lab.yml", "-o", "out", "--serial", "7", "--no-dnssec"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("Built 'lab': 3 services"));
    assert!(result.stdout.contains("10.88.0.4"));
    assert!(env.project_path("out/docker-compose.yml").exists());
    assert!(env
        .read_project_file("out/tld/contents/zones/db.com")
        .contains(" 7 "));
}

#[test]
fn build_exports_graph() {
    let env = TestEnv::new();
    env.write_project_file("lab.yml", SMALL_TESTBED);

    let result = env.run(&["build", "lab.yml", "-o", "out", "--graph", "lab.dot"]);
    assert!(result.success, "{}", result.combined_output());
    let dot = env.read_project_file("lab.dot");
    assert!(dot.starts_with("digraph"));
    assert!(dot.contains("\"resolver\" -> \"root\""));
}

#[test]
fn build_failure_exits_non_zero_without_manifest() {
    let env = TestEnv::new();
    env.write_project_file("broken.yml", BROKEN_TESTBED);

    let result = env.run(&["build", "broken.yml", "-o", "out"]);
    assert!(!result.success);
    assert_ne!(result.exit_code, 0);
    assert!(result.stderr.contains("ghost"), "{}", result.stderr);
    assert!(!env.project_path("out/docker-compose.yml").exists());
}

#[test]
fn unknown_keys_are_reported_as_warnings() {
    let env = TestEnv::new();
    env.write_project_file(
        "lab.yml",
        &SMALL_TESTBED.replace("inet: 10.88.0.0/24", "inet: 10.88.0.0/24\nimagse: []"),
    );

    let result = env.run(&["check", "lab.yml"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stderr.contains("unknown key 'imagse'"));
    assert!(result.stderr.contains("did you mean 'images'?"));
}

#[test]
fn settings_layers_choose_the_output_directory() {
    let env = TestEnv::new();
    env.write_project_file("lab.yml", SMALL_TESTBED);
    env.write_user_settings("[build]\noutput = \"user-out\"\njobs = 1\n");

    let result = env.run(&["build", "lab.yml"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(env.project_path("user-out/docker-compose.yml").exists());

    env.write_project_file("dnsbuilder.toml", "[build]\noutput = \"project-out\"\n");
    let result = env.run(&["build", "lab.yml"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(env.project_path("project-out/docker-compose.yml").exists());

    let result = env.run_with_env(&["build", "lab.yml"], &[("DNSB_OUTPUT", "env-out")]);
    assert!(result.success, "{}", result.combined_output());
    assert!(env.project_path("env-out/docker-compose.yml").exists());

    let result = env.run_with_env(
        &["build", "lab.yml", "-o", "flag-out"],
        &[("DNSB_OUTPUT", "env-out-2")],
    );
    assert!(result.success, "{}", result.combined_output());
    assert!(env.project_path("flag-out/docker-compose.yml").exists());
    assert!(!env.project_path("env-out-2").exists());
}

#[test]
fn map_prints_edges_and_dot() {
    let env = TestEnv::new();
    env.write_project_file("lab.yml", SMALL_TESTBED);

    let result = env.run(&["map", "lab.yml"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("resolver -> root"));
    assert!(result.stdout.contains("root -> tld"));

    let result = env.run(&["map", "lab.yml", "--dot"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.starts_with("digraph dnsbuilder {"));
    assert!(!env.project_path("output").exists());
}

#[test]
fn check_reports_addresses_without_writing() {
    let env = TestEnv::new();
    env.write_project_file("lab.yml", SMALL_TESTBED);

    let result = env.run(&["check", "lab.yml"]);
    assert!(result.success, "{}", result.combined_output());
    assert!(result.stdout.contains("Testbed 'lab' on 10.88.0.0/24"));
    assert!(result.stdout.contains("10.88.0.2"));
    assert!(result.stdout.contains("OK: 3 services"));
    assert!(!env.project_path("output").exists());
}

#[test]
fn missing_config_file_fails() {
    let env = TestEnv::new();
    let result = env.run(&["check", "nope.yml"]);
    assert!(!result.success);
    assert!(result.stderr.contains("nope.yml"));
}

#[test]
fn version_flag_prints_version() {
    let env = TestEnv::new();
    let result = env.run(&["--version"]);
    assert!(result.success);
    assert!(result.stdout.contains(env!("CARGO_PKG_VERSION")));
}
