//! Route resource types

use serde::{Deserialize, Serialize};

use crate::{validate_route, validate_route_spec, validate_traffic_target, FieldError};

/// One weighted entry of a Route's traffic split.
///
/// Exactly one of `revision_name` or `configuration_name` should be set; an
/// empty string means unset, matching the resource's wire form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficTarget {
    /// Optional tag exposing this target as a named rollout
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Immutable revision this target pins
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub revision_name: String,
    /// Configuration whose latest ready revision receives the traffic
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub configuration_name: String,
    /// Share of traffic, 0 to 100
    #[serde(default)]
    pub percent: i32,
}

impl TrafficTarget {
    pub fn revision(revision_name: impl Into<String>, percent: i32) -> Self {
        Self {
            revision_name: revision_name.into(),
            percent,
            ..Default::default()
        }
    }

    pub fn configuration(configuration_name: impl Into<String>, percent: i32) -> Self {
        Self {
            configuration_name: configuration_name.into(),
            percent,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The revision this target is pinned to, if it references one directly.
    pub fn pinned_revision(&self) -> Option<&str> {
        if self.revision_name.is_empty() {
            None
        } else {
            Some(self.revision_name.as_str())
        }
    }

    pub fn validate(&self) -> Option<FieldError> {
        validate_traffic_target(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteSpec {
    #[serde(default)]
    pub traffic: Vec<TrafficTarget>,
}

impl RouteSpec {
    pub fn new(traffic: Vec<TrafficTarget>) -> Self {
        Self { traffic }
    }

    pub fn validate(&self) -> Option<FieldError> {
        validate_route_spec(self)
    }
}

/// Identifying metadata; never consulted by validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: RouteSpec,
}

impl Route {
    pub fn new(spec: RouteSpec) -> Self {
        Self {
            metadata: ObjectMeta::default(),
            spec,
        }
    }

    /// `namespace/name`, or just the name when no namespace is set
    pub fn display_name(&self) -> String {
        if self.metadata.namespace.is_empty() {
            self.metadata.name.clone()
        } else {
            format!("{}/{}", self.metadata.namespace, self.metadata.name)
        }
    }

    pub fn validate(&self) -> Option<FieldError> {
        validate_route(self)
    }
}
