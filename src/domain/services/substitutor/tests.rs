use super::*;
use crate::domain::entities::AutoHooks;

struct Fixture {
    project: ProjectConfig,
    services: ServiceMap,
    addresses: IndexMap<String, Ipv4Addr>,
    images: HashMap<String, Image>,
}

impl Fixture {
    fn new() -> Self {
        let services: ServiceMap = serde_yaml_ng::from_str(
            r#"
ns1:
  image: bind918
  environment: {ZONE: example}
  behavior: "com master @ NS ${name}"
template:
  build: false
  cap_add: [NET_ADMIN]
"#,
        )
        .unwrap();
        let mut addresses = IndexMap::new();
        addresses.insert("ns1".to_string(), Ipv4Addr::new(10, 88, 0, 2));
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
        Self {
            project: ProjectConfig {
                name: "lab".into(),
                inet: "10.88.0.0/24".into(),
                images: vec![],
                builds: services.clone(),
                include: None,
                auto: AutoHooks {
                    restrict: Some("check ${project.name}".into()),
                    ..AutoHooks::default()
                },
            },
            services,
            addresses,
            images,
        }
    }

    fn substitutor(&self) -> VariableSubstitutor<'_> {
        VariableSubstitutor::new(&self.project, &self.services, &self.addresses, &self.images)
            .with_env(|name| match name {
                "LAB_DOMAIN" => Some("example.test".to_string()),
                _ => None,
            })
    }

    fn ns1_scope(&self) -> Scope<'_> {
        Scope::Service {
            name: "ns1",
            config: &self.services["ns1"],
        }
    }
}

#[test]
fn name_and_project_name() {
    let fx = Fixture::new();
    let out = fx
        .substitutor()
        .substitute_str("${name}-${project.name}", fx.ns1_scope())
        .unwrap();
    assert_eq!(out, "ns1-lab");
}

#[test]
fn ip_image_and_project_inet() {
    let fx = Fixture::new();
    let out = fx
        .substitutor()
        .substitute_str(
            "${ip} ${address} ${image.software}/${image.version} ${project.inet}",
            fx.ns1_scope(),
        )
        .unwrap();
    assert_eq!(out, "10.88.0.2 10.88.0.2 bind/9.18.18 10.88.0.0/24");
}

#[test]
fn env_with_and_without_default() {
    let fx = Fixture::new();
    let sub = fx.substitutor();
    assert_eq!(
        sub.substitute_str("${env.LAB_DOMAIN}", fx.ns1_scope()).unwrap(),
        "example.test"
    );
    assert_eq!(
        sub.substitute_str("${env.MISSING:fallback}", fx.ns1_scope())
            .unwrap(),
        "fallback"
    );
    let err = sub
        .substitute_str("${env.MISSING}", fx.ns1_scope())
        .unwrap_err();
    assert!(matches!(err, DnsbError::Build(_)));
}

#[test]
fn service_ip_lookup_errors_are_distinguishable() {
    let fx = Fixture::new();
    let sub = fx.substitutor();
    assert_eq!(
        sub.substitute_str("${services.ns1.ip}", Scope::Project)
            .unwrap(),
        "10.88.0.2"
    );

    let ghost = sub
        .substitute_str("${services.ghost.ip}", Scope::Project)
        .unwrap_err();
    let template = sub
        .substitute_str("${services.template.ip}", Scope::Project)
        .unwrap_err();
    assert!(matches!(ghost, DnsbError::ReferenceNotFound(_)));
    assert!(matches!(template, DnsbError::ReferenceNotFound(_)));
    assert!(ghost.to_string().contains("not found"));
    assert!(template.to_string().contains("not buildable"));
    assert_ne!(ghost.to_string(), template.to_string());
}

#[test]
fn nested_placeholders_resolve_innermost_first() {
    let fx = Fixture::new();
    let out = fx
        .substitutor()
        .substitute_str("${services.${name}.ip}", fx.ns1_scope())
        .unwrap();
    assert_eq!(out, "10.88.0.2");
}

#[test]
fn config_paths_and_fallbacks() {
    let fx = Fixture::new();
    let sub = fx.substitutor();
    assert_eq!(
        sub.substitute_str("${environment.ZONE}", fx.ns1_scope())
            .unwrap(),
        "example"
    );
    assert_eq!(
        sub.substitute_str("${services.ns1.image.name}", Scope::Project)
            .unwrap(),
        "bind918"
    );
    assert_eq!(
        sub.substitute_str("${nothing.here:default-value}", fx.ns1_scope())
            .unwrap(),
        "default-value"
    );
}

#[test]
fn unknown_placeholder_is_left_verbatim() {
    let fx = Fixture::new();
    let out = fx
        .substitutor()
        .substitute_str("zone ${future.key} for ${name}", fx.ns1_scope())
        .unwrap();
    assert_eq!(out, "zone ${future.key} for ns1");
}

#[test]
fn self_referencing_value_stops_after_pass_limit() {
    let services: ServiceMap =
        serde_yaml_ng::from_str("loop: {image: bind918, grow: 'x${grow}'}").unwrap();
    let fx = Fixture::new();
    let sub = VariableSubstitutor::new(&fx.project, &services, &fx.addresses, &fx.images);
    let scope = Scope::Service {
        name: "loop",
        config: &services["loop"],
    };
    let out = sub.substitute_str("${grow}", scope).unwrap();
    assert_eq!(out, "xxxxx${grow}");
}

#[test]
fn services_are_substituted_recursively() {
    let fx = Fixture::new();
    let out = fx.substitutor().substitute_services().unwrap();
    assert_eq!(
        out["ns1"].get("behavior").and_then(Value::as_str),
        Some("com master @ NS ns1")
    );
}

#[test]
fn project_top_level_uses_project_scope() {
    let fx = Fixture::new();
    let project = fx.substitutor().substitute_project(&fx.project).unwrap();
    assert_eq!(project.auto.restrict.as_deref(), Some("check lab"));
    assert_eq!(
        project.builds["ns1"].get("behavior").and_then(Value::as_str),
        Some("com master @ NS ns1")
    );
}
