// Copyright (c) 2025 - Cowboy AI, Inc.
//! Opaque identifiers
//!
//! Every aggregate and owned entity is addressed by a string-backed newtype.
//! Fresh identifiers are UUID v7 (time ordered); identifiers arriving from
//! outside (HTTP paths, stored rows) are accepted verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a new time-ordered identifier
            pub fn new() -> Self {
                Self(Uuid::now_v7().to_string())
            }

            /// Borrow the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the identifier carries no characters
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identity of a [`Dashboard`](super::Dashboard)
    DashboardId
);
string_id!(
    /// Identity of a [`Report`](super::Report)
    ReportId
);
string_id!(
    /// Identity of a [`Metric`](super::Metric)
    MetricId
);
string_id!(
    /// Identity of a widget, unique within its dashboard
    WidgetId
);
string_id!(
    /// Reference to a user owning dashboards and reports
    UserId
);
