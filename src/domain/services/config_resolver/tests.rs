use super::*;

fn services(yaml: &str) -> ServiceMap {
    serde_yaml_ng::from_str(yaml).unwrap()
}

fn images() -> HashMap<String, Image> {
    let mut images = HashMap::new();
    images.insert(
        "bind918".to_string(),
        Image {
            name: "bind918".into(),
            software: Some("bind".into()),
            version: Some("9.18.18".into()),
            from: "ubuntu:22.04".into(),
            packages: vec![],
        },
    );
    images.insert(
        "coredns".to_string(),
        Image {
            name: "coredns".into(),
            software: None,
            version: None,
            from: "coredns/coredns:1.11".into(),
            packages: vec![],
        },
    );
    images
}

fn catalog() -> TemplateCatalog {
    TemplateCatalog::from_yaml(
        r#"
builds:
  bind:
    recursor:
      volumes: [resource:configs/bind/recursor.conf:/usr/local/etc/named.conf]
      cap_add: [NET_ADMIN]
mixins:
  dnssec:
    dnssec: true
  tools:
    cap_add: [NET_RAW]
"#,
    )
    .unwrap()
}

fn yaml(s: &str) -> Mapping {
    serde_yaml_ng::from_str(s).unwrap()
}

#[test]
fn child_keys_override_parent() {
    let raw = services(
        r#"
base: {image: bind918, volumes: [a:/a], behavior: "x"}
child: {ref: base, volumes: [b:/b], address: 10.0.0.9}
"#,
    );
    let images = images();
    let catalog = catalog();
    let resolved = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap();

    assert_eq!(
        resolved["child"],
        yaml("{image: bind918, volumes: [a:/a, b:/b], behavior: x, address: 10.0.0.9}")
    );
}

#[test]
fn resolved_configs_have_no_ref_or_mixins() {
    let raw = services(
        r#"
base: {image: bind918}
child: {ref: base, mixins: [dnssec]}
"#,
    );
    let images = images();
    let catalog = catalog();
    let resolved = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap();

    for conf in resolved.values() {
        assert!(!conf.contains_key("ref"));
        assert!(!conf.contains_key("mixins"));
    }
    assert_eq!(resolved["child"].get("dnssec"), Some(&Value::Bool(true)));
}

#[test]
fn std_reference_uses_image_software() {
    let raw = services("resolver: {ref: 'std:recursor', image: bind918}");
    let images = images();
    let catalog = catalog();
    let resolved = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap();

    let volumes = resolved["resolver"].get("volumes").unwrap();
    assert_eq!(
        volumes,
        &serde_yaml_ng::from_str::<Value>("[resource:configs/bind/recursor.conf:/usr/local/etc/named.conf]")
            .unwrap()
    );
}

#[test]
fn explicit_software_reference() {
    let raw = services("resolver: {ref: 'bind:recursor', image: coredns}");
    let images = images();
    let catalog = catalog();
    let resolved = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap();
    assert!(resolved["resolver"].contains_key("volumes"));
}

#[test]
fn std_reference_without_image_is_a_build_definition_error() {
    let raw = services("resolver: {ref: 'std:recursor'}");
    let images = images();
    let catalog = catalog();
    let err = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap_err();
    assert!(matches!(err, DnsbError::BuildDefinition(_)));
}

#[test]
fn unknown_template_is_reference_not_found() {
    let raw = services("resolver: {ref: 'std:oracle', image: bind918}");
    let images = images();
    let catalog = catalog();
    let err = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap_err();
    match err {
        DnsbError::ReferenceNotFound(msg) => assert!(msg.contains("bind:oracle")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn mutual_reference_is_circular() {
    let raw = services(
        r#"
svc-a: {ref: svc-b}
svc-b: {ref: svc-a}
"#,
    );
    let images = images();
    let catalog = catalog();
    let err = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap_err();
    let msg = err.to_string();
    assert!(matches!(err, DnsbError::CircularDependency { .. }));
    assert!(msg.contains("svc-a"));
    assert!(msg.contains("svc-b"));
}

#[test]
fn self_reference_is_circular() {
    let raw = services("loop: {ref: loop}");
    let images = images();
    let catalog = catalog();
    let err = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap_err();
    assert!(matches!(err, DnsbError::CircularDependency { .. }));
}

#[test]
fn missing_reference_is_reference_not_found() {
    let raw = services("child: {ref: ghost}");
    let images = images();
    let catalog = catalog();
    let err = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap_err();
    assert!(matches!(err, DnsbError::ReferenceNotFound(_)));
}

#[test]
fn service_without_image_ref_or_hooks_is_rejected() {
    let raw = services("lonely: {address: 10.0.0.5}");
    let images = images();
    let catalog = catalog();
    let err = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap_err();
    assert!(matches!(err, DnsbError::BuildDefinition(_)));
}

#[test]
fn service_with_setup_hook_only_is_accepted() {
    let raw = services("generated: {auto: {setup: ./make-service.sh}}");
    let images = images();
    let catalog = catalog();
    assert!(ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .is_ok());
}

#[test]
fn later_mixins_and_own_keys_win() {
    let raw = services(
        r#"
svc:
  image: bind918
  mixins: [tools, dnssec]
  dnssec: false
"#,
    );
    let images = images();
    let catalog = catalog();
    let resolved = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap();
    assert_eq!(resolved["svc"].get("dnssec"), Some(&Value::Bool(false)));
    assert_eq!(
        resolved["svc"].get("cap_add"),
        Some(&serde_yaml_ng::from_str::<Value>("[NET_RAW]").unwrap())
    );
}

#[test]
fn unknown_mixin_is_reference_not_found() {
    let raw = services("svc: {image: bind918, mixins: [nope]}");
    let images = images();
    let catalog = catalog();
    let err = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap_err();
    assert!(matches!(err, DnsbError::ReferenceNotFound(_)));
}

#[test]
fn diamond_is_resolved_once_and_cached() {
    let raw = services(
        r#"
root: {image: bind918, cap_add: [NET_ADMIN]}
left: {ref: root}
right: {ref: root}
leaf: {ref: left}
"#,
    );
    let images = images();
    let catalog = catalog();
    let mut resolver = ConfigResolver::new(&raw, &images, &catalog);

    let first = resolver.resolve("leaf").unwrap();
    assert_eq!(resolver.resolved_count(), 3);
    let second = resolver.resolve("leaf").unwrap();
    assert_eq!(first, second);

    resolver.resolve("right").unwrap();
    assert_eq!(resolver.resolved_count(), 4);
}

#[test]
fn resolution_is_pure() {
    let raw = services(
        r#"
base: {image: bind918, volumes: [a:/a]}
child: {ref: base, mixins: [tools]}
"#,
    );
    let images = images();
    let catalog = catalog();
    let once = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap();
    let twice = ConfigResolver::new(&raw, &images, &catalog)
        .resolve_all()
        .unwrap();
    assert_eq!(once, twice);
}
