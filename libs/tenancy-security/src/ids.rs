//! String identifiers for principals, organizations and establishments.
//!
//! Identifiers are opaque: organization and establishment ids are derived
//! from display names at provisioning time (`org-acme-corp`), principal ids are
//! the identity provider's subject claim.

use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

string_id!(
    /// External subject id of an authenticated principal.
    PrincipalId
);

string_id!(
    /// Stable id of a tenant root.
    OrganizationId
);

string_id!(
    /// Stable id of a sub-unit of an organization.
    EstablishmentId
);

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = OrganizationId::new("org-acme-corp");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"org-acme-corp\"");

        let back: OrganizationId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ids_compare_with_str() {
        let id = PrincipalId::from("u1");
        assert_eq!(id, "u1");
        assert_eq!(id.to_string(), "u1");
    }
}
