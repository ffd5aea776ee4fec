//! Property tests for subnet address planning.

use std::collections::HashSet;
use std::net::Ipv4Addr;

use proptest::prelude::*;

use dnsbuilder::domain::entities::ServiceMap;
use dnsbuilder::domain::services::NetworkPlanner;
use dnsbuilder::domain::value_objects::Subnet;

fn services(count: usize, templates: &[usize]) -> ServiceMap {
    let mut yaml = String::new();
    for i in 0..count {
        if templates.contains(&i) {
            yaml.push_str(&format!("svc{}: {{image: bind, build: false}}\n", i));
        } else {
            yaml.push_str(&format!("svc{}: {{image: bind}}\n", i));
        }
    }
    if yaml.is_empty() {
        return ServiceMap::new();
    }
    serde_yaml_ng::from_str(&yaml).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: Planned addresses are unique, inside the subnet and follow declaration order.
    #[test]
    fn property_addresses_unique_and_contained(
        octet in 1u8..250,
        count in 0usize..40,
        templates in proptest::collection::vec(0usize..40, 0..5),
    ) {
        let subnet: Subnet = format!("10.{}.0.0/24", octet).parse().unwrap();
        let services = services(count, &templates);
        let plan = NetworkPlanner::new(subnet).plan(&services).unwrap();

        let buildable: Vec<&String> = services
            .iter()
            .filter(|(_, conf)| conf.get("build").and_then(|b| b.as_bool()) != Some(false))
            .map(|(name, _)| name)
            .collect();
        prop_assert_eq!(plan.keys().collect::<Vec<_>>(), buildable);

        let unique: HashSet<Ipv4Addr> = plan.values().copied().collect();
        prop_assert_eq!(unique.len(), plan.len());
        for addr in plan.values() {
            prop_assert!(subnet.contains(*addr));
            prop_assert!(*addr != subnet.network());
            prop_assert!(addr.octets()[3] >= 2);
        }
        if let Some(first) = plan.values().next() {
            prop_assert_eq!(*first, Ipv4Addr::new(10, octet, 0, 2));
        }
    }

    /// PROPERTY: Planning fails exactly when the subnet runs out of addresses.
    #[test]
    fn property_exhaustion_is_a_build_error(prefix in 28u8..=30, count in 0usize..20) {
        let subnet: Subnet = format!("10.0.0.0/{}", prefix).parse().unwrap();
        let capacity = subnet.allocatable().count();
        let result = NetworkPlanner::new(subnet).plan(&services(count, &[]));
        prop_assert_eq!(result.is_ok(), count <= capacity);
    }
}
