//! End-to-end pipeline tests against the real filesystem.
//!
//! These drive the library the way the binary does (project repository,
//! local storage, build use case) but inject a deterministic signer.

mod common;

use std::path::Path;
use std::sync::Arc;

use common::{FakeSigner, TestEnv, BROKEN_TESTBED, SIGNED_TESTBED, SMALL_TESTBED};
use dnsbuilder::application::Manifest;
use dnsbuilder::domain::ports::ProjectRepository;
use dnsbuilder::infrastructure::{LocalStorage, YamlProjectRepository};
use dnsbuilder::{BuildOptions, BuildUseCase, DnsbError, ProjectConfig};

fn load(env: &TestEnv, file: &str) -> ProjectConfig {
    YamlProjectRepository::new(Arc::new(LocalStorage::new()))
        .load(&env.project_path(file))
        .unwrap()
}

fn options(env: &TestEnv) -> BuildOptions {
    BuildOptions::new(env.project_path("out"))
        .with_base_dir(env.project_root.path())
        .with_serial(2024010101)
        .with_jobs(2)
}

#[test]
fn small_testbed_builds_every_artifact() {
    let env = TestEnv::new();
    env.write_project_file("lab.yml", SMALL_TESTBED);

    let result = BuildUseCase::new(Arc::new(LocalStorage::new()))
        .execute(load(&env, "lab.yml"), &options(&env))
        .unwrap();
    assert_eq!(result.services, vec!["root", "tld", "resolver"]);

    for service in ["root", "tld", "resolver"] {
        let dockerfile = env.read_project_file(&format!("out/{}/Dockerfile", service));
        assert!(dockerfile.starts_with("FROM ubuntu:22.04\n"), "{service}");
    }

    let root_zone = env.read_project_file("out/root/contents/zones/db.root");
    assert!(root_zone.contains("2024010101"));
    assert!(root_zone.contains("com."));
    let tld_zone = env.read_project_file("out/tld/contents/zones/db.com");
    assert!(tld_zone.contains("192.0.2.80"));

    let authoritative = env.read_project_file("out/tld/contents/authoritative.conf");
    assert!(authoritative.contains("include \"/usr/local/etc/zones/generated_zones.conf\";"));

    let resolver = env.read_project_file("out/resolver/contents/generated_zones.conf");
    assert!(resolver.contains("root-hints:"));

    let manifest: Manifest =
        serde_yaml_ng::from_str(&env.read_project_file("out/docker-compose.yml")).unwrap();
    assert_eq!(manifest.name, "lab");
    let resolver = &manifest.services["resolver"];
    assert_eq!(resolver["environment"][0].as_str(), Some("ROOT_IP=10.88.0.2"));
    assert_eq!(resolver["build"].as_str(), Some("./resolver"));
}

#[test]
fn signed_testbed_links_the_trust_chain() {
    let env = TestEnv::new();
    env.write_project_file("signed.yml", SIGNED_TESTBED);
    let signer = Arc::new(FakeSigner::new());

    let result = BuildUseCase::new(Arc::new(LocalStorage::new()))
        .with_signer(signer.clone())
        .execute(load(&env, "signed.yml"), &options(&env))
        .unwrap();

    let report = result.trust_chain.expect("trust chain ran");
    assert_eq!(report.zones.len(), 2);
    assert_eq!(signer.signs("."), 2);
    assert_eq!(signer.signs("com."), 1);

    let root_signed = env.read_project_file("out/root/contents/zones/db.root.signed");
    assert!(root_signed.contains("com. 3600 IN DS 1 13 2 0000"));

    let anchors = env.read_project_file("out/resolver/contents/all.ksk.key.bind");
    assert!(anchors.contains("\"com.\" 257 3 13 \"FAKEksk\";"));
    assert!(anchors.contains("\".\" 257 3 13 \"FAKEksk\";"));

    assert!(env.project_path("out/.dnsb/keys/root/root.ds").exists());
    assert!(env.project_path("out/.dnsb/keys/all.ds.pdns").exists());
}

#[test]
fn failed_build_leaves_no_manifest() {
    let env = TestEnv::new();
    env.write_project_file("broken.yml", BROKEN_TESTBED);

    let err = BuildUseCase::new(Arc::new(LocalStorage::new()))
        .execute(load(&env, "broken.yml"), &options(&env))
        .unwrap_err();
    assert!(matches!(err, DnsbError::Behavior { .. }));
    assert!(!env.project_path("out/docker-compose.yml").exists());
}

#[test]
fn relative_volumes_resolve_against_the_testbed_directory() {
    let env = TestEnv::new();
    env.write_project_file("conf/extra.conf", "# extra options\n");
    env.write_project_file(
        "lab.yml",
        r#"
name: lab
inet: 10.88.0.0/24
images:
  - {name: bind918, ref: "bind:9.18.18"}
builds:
  tld:
    image: bind918
    ref: std:authoritative
    volumes: ["conf/extra.conf:/usr/local/etc/extra.conf"]
    behavior: "com master www A 192.0.2.80"
"#,
    );

    BuildUseCase::new(Arc::new(LocalStorage::new()))
        .execute(load(&env, "lab.yml"), &options(&env))
        .unwrap();

    assert_eq!(
        env.read_project_file("out/tld/contents/extra.conf"),
        "# extra options\n"
    );
    let main = env.read_project_file("out/tld/contents/authoritative.conf");
    assert!(main.contains("/usr/local/etc/extra.conf"));
}

#[test]
fn rebuild_replaces_previous_output() {
    let env = TestEnv::new();
    env.write_project_file("lab.yml", SMALL_TESTBED);
    env.write_project_file("out/stale/leftover.txt", "old");

    BuildUseCase::new(Arc::new(LocalStorage::new()))
        .execute(load(&env, "lab.yml"), &options(&env))
        .unwrap();
    assert!(!Path::new(&env.project_path("out/stale")).exists());
    assert!(env.project_path("out/docker-compose.yml").exists());
}
