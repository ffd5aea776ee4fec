//! Reusable testbed declarations.

/// Root, TLD and a recursive resolver with root hints
pub const SMALL_TESTBED: &str = r#"
name: lab
inet: 10.88.0.0/24
images:
  - {name: bind918, ref: "bind:9.18.18", util: [dnsutils]}
  - {name: unbound119, ref: "unbound:1.19.0"}
builds:
  root:
    image: bind918
    ref: std:root
    behavior: |
      # delegations
      . master com NS tld
  tld:
    image: bind918
    ref: std:authoritative
    behavior: |
      com master @ NS tld
      com master www A 192.0.2.80
  resolver:
    image: unbound119
    ref: std:recursor
    behavior: ". hint root"
    environment: ["ROOT_IP=${services.root.ip}"]
"#;

/// Signed root and TLD; the resolver mounts the aggregated trust anchor
pub const SIGNED_TESTBED: &str = r#"
name: signed
inet: 10.90.0.0/24
images:
  - {name: bind918, ref: "bind:9.18.18"}
builds:
  root:
    image: bind918
    ref: std:root
    mixins: [dnssec]
    behavior: ". master com NS tld"
  tld:
    image: bind918
    ref: std:authoritative
    mixins: [dnssec]
    behavior: "com master www A 192.0.2.80"
  resolver:
    image: bind918
    ref: std:recursor
    volumes: ["key:all.ksk.key.bind:/usr/local/etc/bind.keys"]
    behavior: ". hint root"
"#;

/// Declaration whose resolver points at a service that does not exist
pub const BROKEN_TESTBED: &str = r#"
name: broken
inet: 10.91.0.0/24
images:
  - {name: bind918, ref: "bind:9.18.18"}
builds:
  resolver:
    image: bind918
    ref: std:recursor
    behavior: ". hint ghost"
"#;
