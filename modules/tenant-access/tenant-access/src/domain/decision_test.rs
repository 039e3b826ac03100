#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::super::*;
    use async_trait::async_trait;
    use repo::{MembershipRepository, TenantRepository};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tenancy_security::{
        AccessDecision, DenyReason, EstablishmentId, OrganizationId, PrincipalId, Role, Scope,
    };
    use tenant_access_sdk::{Establishment, Membership, Organization, ProvisionedTenant};

    // Memberships kept in a Vec; `broken_roles` simulates unreadable role values.
    #[derive(Default)]
    struct MockMemberships {
        rows: Mutex<Vec<Membership>>,
        broken_roles: Vec<OrganizationId>,
        reads: AtomicUsize,
    }

    impl MockMemberships {
        fn with(rows: Vec<Membership>) -> Self {
            Self {
                rows: Mutex::new(rows),
                ..Self::default()
            }
        }

        fn find(
            &self,
            principal: &PrincipalId,
            organization: &OrganizationId,
        ) -> Option<Membership> {
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|m| &m.principal_id == principal && &m.organization_id == organization)
                .cloned()
        }
    }

    #[async_trait]
    impl MembershipRepository for MockMemberships {
        async fn memberships_of(
            &self,
            principal: &PrincipalId,
        ) -> Result<Vec<Membership>, DomainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| &m.principal_id == principal)
                .cloned()
                .collect())
        }

        async fn organizations_of(
            &self,
            principal: &PrincipalId,
        ) -> Result<Vec<OrganizationId>, DomainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .rows
                .lock()
                .unwrap()
                .iter()
                .filter(|m| &m.principal_id == principal)
                .map(|m| m.organization_id.clone())
                .collect())
        }

        async fn role_of(
            &self,
            principal: &PrincipalId,
            organization: &OrganizationId,
        ) -> Result<Option<Role>, DomainError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.broken_roles.contains(organization) {
                return Ok(None);
            }
            Ok(self.find(principal, organization).map(|m| m.role))
        }

        async fn link(
            &self,
            principal: &PrincipalId,
            organization: &OrganizationId,
            role: Role,
        ) -> Result<Membership, DomainError> {
            if let Some(existing) = self.find(principal, organization) {
                return Ok(existing);
            }
            let membership = Membership {
                principal_id: principal.clone(),
                organization_id: organization.clone(),
                role,
            };
            self.rows.lock().unwrap().push(membership.clone());
            Ok(membership)
        }

        async fn unlink(
            &self,
            principal: &PrincipalId,
            organization: &OrganizationId,
        ) -> Result<bool, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|m| !(&m.principal_id == principal && &m.organization_id == organization));
            Ok(rows.len() < before)
        }

        async fn set_role(
            &self,
            principal: &PrincipalId,
            organization: &OrganizationId,
            role: Role,
        ) -> Result<Option<Membership>, DomainError> {
            let mut rows = self.rows.lock().unwrap();
            Ok(rows
                .iter_mut()
                .find(|m| &m.principal_id == principal && &m.organization_id == organization)
                .map(|m| {
                    m.role = role;
                    m.clone()
                }))
        }
    }

    // Read-only tenants that only know which organization owns which establishment.
    struct FixedEstablishments {
        owners: Vec<(EstablishmentId, OrganizationId)>,
    }

    #[async_trait]
    impl TenantRepository for FixedEstablishments {
        async fn organizations(
            &self,
            _ids: &[OrganizationId],
        ) -> Result<Vec<Organization>, DomainError> {
            Ok(vec![])
        }

        async fn establishments_of(
            &self,
            _organization: &OrganizationId,
        ) -> Result<Vec<Establishment>, DomainError> {
            Ok(vec![])
        }

        async fn establishment_owner(
            &self,
            establishment: &EstablishmentId,
        ) -> Result<Option<OrganizationId>, DomainError> {
            Ok(self
                .owners
                .iter()
                .find(|(etb, _)| etb == establishment)
                .map(|(_, org)| org.clone()))
        }

        async fn provision(
            &self,
            _blueprint: TenantBlueprint,
        ) -> Result<ProvisionedTenant, DomainError> {
            Err(DomainError::Database("read-only".to_owned()))
        }
    }

    fn membership(principal: &str, organization: &str, role: Role) -> Membership {
        Membership {
            principal_id: PrincipalId::new(principal),
            organization_id: OrganizationId::new(organization),
            role,
        }
    }

    fn engine(memberships: Arc<MockMemberships>) -> (AccessDecisionEngine, Arc<MembershipIndex>) {
        let tenants = FixedEstablishments {
            owners: vec![
                (EstablishmentId::new("etb-a"), OrganizationId::new("org-a")),
                (EstablishmentId::new("etb-b"), OrganizationId::new("org-b")),
            ],
        };
        let index = Arc::new(MembershipIndex::new(memberships, Arc::new(tenants)));
        (AccessDecisionEngine::new(Arc::clone(&index)), index)
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_denied_without_reading_memberships() {
        let memberships = Arc::new(MockMemberships::default());
        let (engine, _) = engine(memberships.clone());

        let decision = engine
            .decide(None, &Scope::organization("org-a"))
            .await
            .unwrap();

        assert_eq!(decision, AccessDecision::Denied(DenyReason::NotAuthenticated));
        assert_eq!(memberships.reads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_member_is_allowed_with_stored_role() {
        let memberships = Arc::new(MockMemberships::with(vec![
            membership("u1", "org-a", Role::Manager),
            membership("u1", "org-b", Role::User),
        ]));
        let (engine, _) = engine(memberships);
        let u1 = PrincipalId::new("u1");

        let decision = engine
            .decide(Some(&u1), &Scope::establishment("org-b", "etb-b"))
            .await
            .unwrap();

        assert_eq!(decision.role(), Some(Role::User));
        let AccessDecision::Allowed(granted) = decision else {
            panic!("expected an allowed decision");
        };
        assert_eq!(granted.organization_id(), &OrganizationId::new("org-b"));
        assert_eq!(granted.establishment_id().unwrap(), "etb-b");
    }

    #[tokio::test]
    async fn test_establishment_must_belong_to_requested_organization() {
        let memberships = Arc::new(MockMemberships::with(vec![
            membership("u1", "org-a", Role::SuperAdmin),
            membership("u1", "org-b", Role::User),
        ]));
        let (engine, _) = engine(memberships);
        let u1 = PrincipalId::new("u1");

        for scope in [
            Scope::establishment("org-a", "etb-b"),
            Scope::establishment("org-a", "etb-unknown"),
        ] {
            let decision = engine.decide(Some(&u1), &scope).await.unwrap();
            assert_eq!(
                decision,
                AccessDecision::Denied(DenyReason::NoOrganizationAccess),
                "{scope:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_foreign_organization_is_denied() {
        let memberships = Arc::new(MockMemberships::with(vec![membership(
            "u1",
            "org-a",
            Role::SuperAdmin,
        )]));
        let (engine, _) = engine(memberships);
        let u1 = PrincipalId::new("u1");

        let decision = engine
            .decide(Some(&u1), &Scope::organization("org-x"))
            .await
            .unwrap();

        assert_eq!(
            decision,
            AccessDecision::Denied(DenyReason::NoOrganizationAccess)
        );
    }

    #[tokio::test]
    async fn test_unreadable_role_is_denied() {
        let memberships = Arc::new(MockMemberships {
            rows: Mutex::new(vec![membership("u1", "org-a", Role::User)]),
            broken_roles: vec![OrganizationId::new("org-a")],
            reads: AtomicUsize::new(0),
        });
        let (engine, _) = engine(memberships);
        let u1 = PrincipalId::new("u1");

        let decision = engine
            .decide(Some(&u1), &Scope::organization("org-a"))
            .await
            .unwrap();

        assert_eq!(decision, AccessDecision::Denied(DenyReason::NoRole));
    }

    #[tokio::test]
    async fn test_decisions_follow_membership_changes() {
        let memberships = Arc::new(MockMemberships::default());
        let (engine, index) = engine(memberships);
        let u1 = PrincipalId::new("u1");
        let org = OrganizationId::new("org-a");
        let scope = Scope::organization(org.clone());

        assert!(!engine.decide(Some(&u1), &scope).await.unwrap().is_allowed());

        index.link(&u1, &org, Role::User).await.unwrap();
        assert!(engine.decide(Some(&u1), &scope).await.unwrap().is_allowed());

        assert!(index.unlink(&u1, &org).await.unwrap());
        assert!(!engine.decide(Some(&u1), &scope).await.unwrap().is_allowed());
    }

    #[tokio::test]
    async fn test_link_keeps_first_role() {
        let memberships = Arc::new(MockMemberships::default());
        let (_, index) = engine(memberships.clone());
        let u1 = PrincipalId::new("u1");
        let org = OrganizationId::new("org-a");

        index.link(&u1, &org, Role::User).await.unwrap();
        let second = index.link(&u1, &org, Role::SuperAdmin).await.unwrap();

        assert_eq!(second.role, Role::User);
        assert_eq!(memberships.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_role_on_missing_membership_is_not_found() {
        let (_, index) = engine(Arc::new(MockMemberships::default()));

        let err = index
            .set_role(
                &PrincipalId::new("u1"),
                &OrganizationId::new("org-a"),
                Role::Manager,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
