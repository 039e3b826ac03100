#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::entity::membership;
    use chrono::Utc;
    use tenancy_security::Role;
    use tenant_access_sdk::Membership;

    fn row(role: &str) -> membership::Model {
        membership::Model {
            id: 1,
            principal_id: "u1".to_owned(),
            organization_id: "org-a".to_owned(),
            role: role.to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_membership_role_is_parsed() {
        let membership = Membership::try_from(row("MANAGER")).unwrap();
        assert_eq!(membership.role, Role::Manager);
        assert_eq!(membership.organization_id, "org-a");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let err = Membership::try_from(row("OWNER")).unwrap_err();
        assert_eq!(err.0, "OWNER");
    }
}
