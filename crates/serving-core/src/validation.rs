//! Validation rules for Route traffic splits
//!
//! Each level returns the first failure it finds, with paths relative to the
//! value it was handed. Callers one level up re-prefix those paths.

use std::collections::{hash_map::Entry, HashMap};

use crate::{quote, FieldError, Route, RouteSpec, TrafficTarget, CURRENT_FIELD};

const REVISION_NAME_FIELD: &str = "revisionName";
const CONFIGURATION_NAME_FIELD: &str = "configurationName";
const PERCENT_FIELD: &str = "percent";
const TRAFFIC_FIELD: &str = "traffic";
const SPEC_FIELD: &str = "spec";

const FULL_TRAFFIC_PERCENT: i64 = 100;

/// Validate a single traffic target
pub fn validate_traffic_target(target: &TrafficTarget) -> Option<FieldError> {
    let one_of = [REVISION_NAME_FIELD, CONFIGURATION_NAME_FIELD];
    match (
        target.revision_name.is_empty(),
        target.configuration_name.is_empty(),
    ) {
        (false, false) => return Some(FieldError::one_of_both(&one_of)),
        (true, true) => return Some(FieldError::one_of_neither(&one_of)),
        _ => {}
    }

    if !(0..=100).contains(&target.percent) {
        return Some(FieldError::invalid_value(target.percent, PERCENT_FIELD));
    }

    None
}

/// Validate a route's traffic list as a whole
pub fn validate_route_spec(spec: &RouteSpec) -> Option<FieldError> {
    if spec.traffic.is_empty() {
        return Some(FieldError::missing_field(CURRENT_FIELD));
    }

    for (index, target) in spec.traffic.iter().enumerate() {
        if let Some(err) = validate_traffic_target(target) {
            return Some(err.via_index(TRAFFIC_FIELD, index));
        }
    }

    if let Some(err) = check_name_collisions(&spec.traffic) {
        return Some(err);
    }

    let total: i64 = spec
        .traffic
        .iter()
        .map(|target| i64::from(target.percent))
        .sum();
    if total != FULL_TRAFFIC_PERCENT {
        return Some(FieldError::new(
            format!("Traffic targets sum to {total}, want {FULL_TRAFFIC_PERCENT}"),
            vec![TRAFFIC_FIELD.to_string()],
        ));
    }

    None
}

/// Validate a route, reporting paths relative to the resource
pub fn validate_route(route: &Route) -> Option<FieldError> {
    validate_route_spec(&route.spec).map(|err| err.with_prefix(SPEC_FIELD))
}

// A repeated name is only a re-declaration when both entries pin the same
// revision. Configuration targets never match, even on the same
// configuration.
fn check_name_collisions(traffic: &[TrafficTarget]) -> Option<FieldError> {
    let mut first_seen: HashMap<&str, (usize, &TrafficTarget)> = HashMap::new();

    for (index, target) in traffic.iter().enumerate() {
        if target.name.is_empty() {
            continue;
        }

        match first_seen.entry(target.name.as_str()) {
            Entry::Vacant(entry) => {
                entry.insert((index, target));
            }
            Entry::Occupied(entry) => {
                let (first_index, first) = *entry.get();
                let same_revision = first.pinned_revision().is_some()
                    && first.pinned_revision() == target.pinned_revision();
                if !same_revision {
                    return Some(FieldError::new(
                        format!("Multiple definitions for {}", quote(&target.name)),
                        vec![
                            format!("{TRAFFIC_FIELD}[{first_index}].name"),
                            format!("{TRAFFIC_FIELD}[{index}].name"),
                        ],
                    ));
                }
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(paths: &[&str]) -> Vec<String> {
        paths.iter().map(|path| path.to_string()).collect()
    }

    #[test]
    fn test_route_valid() {
        let route = Route::new(RouteSpec::new(vec![TrafficTarget::revision("foo", 100)]));
        assert_eq!(validate_route(&route), None);
    }

    #[test]
    fn test_route_valid_split() {
        let route = Route::new(RouteSpec::new(vec![
            TrafficTarget::revision("foo", 90).named("prod"),
            TrafficTarget::configuration("bar", 10).named("experiment"),
        ]));
        assert_eq!(route.validate(), None);
    }

    #[test]
    fn test_route_invalid_traffic_entry() {
        let route = Route::new(RouteSpec::new(vec![TrafficTarget {
            name: "foo".into(),
            percent: 100,
            ..Default::default()
        }]));
        assert_eq!(
            validate_route(&route),
            Some(FieldError::new(
                "Expected exactly one, got neither",
                paths(&[
                    "spec.traffic[0].revisionName",
                    "spec.traffic[0].configurationName",
                ]),
            ))
        );
    }

    #[test]
    fn test_route_empty_spec() {
        let err = validate_route(&Route::default()).unwrap();
        assert_eq!(err, FieldError::missing_field("spec"));
    }

    #[test]
    fn test_route_prefixes_sum_error() {
        let route = Route::new(RouteSpec::new(vec![TrafficTarget::revision("foo", 50)]));
        assert_eq!(
            validate_route(&route),
            Some(FieldError::new(
                "Traffic targets sum to 50, want 100",
                paths(&["spec.traffic"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_valid() {
        let spec = RouteSpec::new(vec![TrafficTarget::revision("foo", 100)]);
        assert_eq!(validate_route_spec(&spec), None);
    }

    #[test]
    fn test_route_spec_valid_split() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("foo", 90).named("prod"),
            TrafficTarget::configuration("bar", 10).named("experiment"),
        ]);
        assert_eq!(validate_route_spec(&spec), None);
    }

    #[test]
    fn test_route_spec_valid_many_targets() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("a", 25),
            TrafficTarget::revision("b", 25),
            TrafficTarget::configuration("c", 25),
            TrafficTarget::revision("d", 0),
            TrafficTarget::configuration("e", 25),
        ]);
        assert_eq!(validate_route_spec(&spec), None);
    }

    #[test]
    fn test_route_spec_empty() {
        assert_eq!(
            validate_route_spec(&RouteSpec::default()),
            Some(FieldError::missing_field(CURRENT_FIELD))
        );
    }

    #[test]
    fn test_route_spec_invalid_traffic_entry() {
        let spec = RouteSpec::new(vec![TrafficTarget {
            name: "foo".into(),
            percent: 100,
            ..Default::default()
        }]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::new(
                "Expected exactly one, got neither",
                paths(&["traffic[0].revisionName", "traffic[0].configurationName"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_reports_first_invalid_entry_only() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("foo", 50),
            TrafficTarget::revision("bar", 101),
            TrafficTarget::default(),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::invalid_value(101, "traffic[1].percent"))
        );
    }

    #[test]
    fn test_route_spec_invalid_name_conflict() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 50).named("foo"),
            TrafficTarget::revision("baz", 50).named("foo"),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::new(
                r#"Multiple definitions for "foo""#,
                paths(&["traffic[0].name", "traffic[1].name"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_valid_name_collision_same_revision() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 50).named("foo"),
            TrafficTarget::revision("bar", 50).named("foo"),
        ]);
        assert_eq!(validate_route_spec(&spec), None);
    }

    #[test]
    fn test_route_spec_name_collision_same_configuration() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::configuration("bar", 50).named("foo"),
            TrafficTarget::configuration("bar", 50).named("foo"),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::new(
                r#"Multiple definitions for "foo""#,
                paths(&["traffic[0].name", "traffic[1].name"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_name_collision_revision_and_configuration() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 40).named("foo"),
            TrafficTarget::revision("other", 20),
            TrafficTarget::configuration("bar", 40).named("foo"),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::new(
                r#"Multiple definitions for "foo""#,
                paths(&["traffic[0].name", "traffic[2].name"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_name_collision_configuration_then_revision() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::configuration("bar", 40).named("foo"),
            TrafficTarget::revision("other", 20),
            TrafficTarget::revision("bar", 40).named("foo"),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::new(
                r#"Multiple definitions for "foo""#,
                paths(&["traffic[0].name", "traffic[2].name"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_name_collision_message_keeps_non_ascii() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 50).named("x\u{a0}y"),
            TrafficTarget::revision("baz", 50).named("x\u{a0}y"),
        ]);
        let err = validate_route_spec(&spec).unwrap();
        assert_eq!(err.message, "Multiple definitions for \"x\u{a0}y\"");
    }

    #[test]
    fn test_route_spec_name_collision_cites_first_occurrence() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 30).named("foo"),
            TrafficTarget::revision("bar", 30).named("foo"),
            TrafficTarget::revision("baz", 40).named("foo"),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::new(
                r#"Multiple definitions for "foo""#,
                paths(&["traffic[0].name", "traffic[2].name"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_entry_errors_win_over_name_conflicts() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 50).named("foo"),
            TrafficTarget::revision("baz", 50).named("foo"),
            TrafficTarget::revision("qux", -1),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::invalid_value(-1, "traffic[2].percent"))
        );
    }

    #[test]
    fn test_route_spec_name_conflicts_win_over_sum() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 10).named("foo"),
            TrafficTarget::revision("baz", 10).named("foo"),
        ]);
        let err = validate_route_spec(&spec).unwrap();
        assert_eq!(err.message, r#"Multiple definitions for "foo""#);
    }

    #[test]
    fn test_route_spec_invalid_total_percentage() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 99),
            TrafficTarget::revision("baz", 99),
        ]);
        assert_eq!(
            validate_route_spec(&spec),
            Some(FieldError::new(
                "Traffic targets sum to 198, want 100",
                paths(&["traffic"]),
            ))
        );
    }

    #[test]
    fn test_route_spec_all_zero_percent() {
        let spec = RouteSpec::new(vec![TrafficTarget::configuration("bar", 0)]);
        assert_eq!(
            validate_route_spec(&spec).map(|err| err.message),
            Some("Traffic targets sum to 0, want 100".to_string())
        );
    }

    #[test]
    fn test_route_spec_validation_is_idempotent() {
        let spec = RouteSpec::new(vec![
            TrafficTarget::revision("bar", 50).named("foo"),
            TrafficTarget::revision("baz", 50).named("foo"),
        ]);
        assert_eq!(spec.validate(), spec.validate());
    }

    #[test]
    fn test_traffic_target_valid_with_name_and_revision() {
        let target = TrafficTarget::revision("bar", 12).named("foo");
        assert_eq!(validate_traffic_target(&target), None);
    }

    #[test]
    fn test_traffic_target_valid_with_name_and_configuration() {
        let target = TrafficTarget::configuration("blah", 37).named("baz");
        assert_eq!(validate_traffic_target(&target), None);
    }

    #[test]
    fn test_traffic_target_valid_with_no_percent() {
        let target = TrafficTarget::configuration("booga", 0).named("ooga");
        assert_eq!(validate_traffic_target(&target), None);
    }

    #[test]
    fn test_traffic_target_valid_with_no_name() {
        let target = TrafficTarget::configuration("booga", 100);
        assert_eq!(target.validate(), None);
    }

    #[test]
    fn test_traffic_target_invalid_with_both() {
        let target = TrafficTarget {
            revision_name: "foo".into(),
            configuration_name: "bar".into(),
            ..Default::default()
        };
        assert_eq!(
            validate_traffic_target(&target),
            Some(FieldError::new(
                "Expected exactly one, got both",
                paths(&["revisionName", "configurationName"]),
            ))
        );
    }

    #[test]
    fn test_traffic_target_both_set_checked_before_percent() {
        let target = TrafficTarget {
            revision_name: "foo".into(),
            configuration_name: "bar".into(),
            percent: 500,
            ..Default::default()
        };
        let err = validate_traffic_target(&target).unwrap();
        assert_eq!(err.message, "Expected exactly one, got both");
    }

    #[test]
    fn test_traffic_target_invalid_with_neither() {
        let target = TrafficTarget {
            name: "foo".into(),
            percent: 100,
            ..Default::default()
        };
        assert_eq!(
            validate_traffic_target(&target),
            Some(FieldError::new(
                "Expected exactly one, got neither",
                paths(&["revisionName", "configurationName"]),
            ))
        );
    }

    #[test]
    fn test_traffic_target_invalid_percent_too_low() {
        let target = TrafficTarget::revision("foo", -5);
        assert_eq!(
            validate_traffic_target(&target),
            Some(FieldError::invalid_value("-5", "percent"))
        );
    }

    #[test]
    fn test_traffic_target_invalid_percent_too_high() {
        let target = TrafficTarget::revision("foo", 101);
        assert_eq!(
            validate_traffic_target(&target),
            Some(FieldError::invalid_value("101", "percent"))
        );
    }

    #[test]
    fn test_traffic_target_percent_bounds_inclusive() {
        assert_eq!(validate_traffic_target(&TrafficTarget::revision("foo", 0)), None);
        assert_eq!(validate_traffic_target(&TrafficTarget::revision("foo", 100)), None);
    }
}
