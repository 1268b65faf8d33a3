//! Catalog Integration Tests
//!
//! Access rules and lifecycle invariants exercised through the public
//! services over the in-memory store.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use sc_catalog::repository::{CatalogStore, MemoryStore};
use sc_catalog::service::{InstanceRegistry, ServiceCatalog};
use sc_catalog::{ErrorKind, Identity, Manifest, Service, ServiceStatus, Team, User};

struct Catalog {
    store: Arc<MemoryStore>,
    services: ServiceCatalog,
    instances: InstanceRegistry,
}

impl Catalog {
    fn new() -> Self {
        let store = MemoryStore::new_shared();
        Self {
            services: ServiceCatalog::new(store.clone()),
            instances: InstanceRegistry::new(store.clone()),
            store,
        }
    }

    async fn member_of(&self, email: &str, teams: &[&str]) -> Identity {
        let user = User::new(email, "hash");
        self.store.insert_user(&user).await.unwrap();
        for name in teams {
            let mut team = self
                .store
                .find_team(name)
                .await
                .unwrap()
                .unwrap_or_else(|| Team::new(*name));
            team.add_user(email);
            self.store.update_team(&team).await.unwrap();
        }
        let teams = self.store.find_teams_of_user(email).await.unwrap();
        Identity::new(user, teams)
    }

    async fn stored(&self, name: &str) -> Service {
        self.store.find_service(name).await.unwrap().unwrap()
    }
}

fn manifest(id: &str) -> Manifest {
    Manifest::parse(&format!(
        "id: {id}\nendpoint:\n  production: {id}.com\n  test: test.{id}.com\n"
    ))
    .unwrap()
}

mod lifecycle_tests {
    use super::*;

    #[tokio::test]
    async fn test_some_service_end_to_end() {
        let catalog = Catalog::new();
        let user = catalog.member_of("whydidifall@thewho.com", &["tsuruteam"]).await;

        catalog.services.create(&manifest("some_service"), &user).await.unwrap();
        let stored = catalog.stored("some_service").await;
        assert_eq!(stored.name, "some_service");
        assert_eq!(stored.owner_teams().iter().collect::<Vec<_>>(), vec!["tsuruteam"]);
        assert_eq!(stored.production_endpoint(), Some("some_service.com"));

        let err = catalog
            .services
            .create(&manifest("some_service"), &user)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.to_string(), "Service with name some_service already exists.");
    }

    #[tokio::test]
    async fn test_non_members_leave_records_unchanged() {
        let catalog = Catalog::new();
        let owner = catalog.member_of("owner@catalog.test", &["owners"]).await;
        let outsider = catalog.member_of("outsider@catalog.test", &["outsiders"]).await;
        catalog.member_of("other@catalog.test", &["others"]).await;

        catalog.services.create(&manifest("mysql"), &owner).await.unwrap();
        catalog.instances.create("db", "mysql", &owner).await.unwrap();
        let before = catalog.stored("mysql").await;

        let attempts = [
            catalog.services.update(&manifest("mysql"), &outsider).await.map(|_| ()),
            catalog.services.delete("mysql", &outsider).await,
            catalog.services.set_doc("mysql", "doc", &outsider).await,
            catalog.services.grant_access("mysql", "others", &outsider).await,
            catalog.services.revoke_access("mysql", "owners", &outsider).await,
            catalog.instances.create("db2", "mysql", &outsider).await.map(|_| ()),
            catalog.instances.delete("db", &outsider).await,
        ];
        for result in attempts {
            assert_eq!(result.unwrap_err().kind(), ErrorKind::PermissionDenied);
        }

        assert_eq!(catalog.stored("mysql").await, before);
        assert!(catalog.store.find_instance("db").await.unwrap().is_some());
        assert!(catalog.store.find_instance("db2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_deleted_service_behaves_as_absent() {
        let catalog = Catalog::new();
        let user = catalog.member_of("a@catalog.test", &["tsuruteam"]).await;
        catalog.services.create(&manifest("mysql"), &user).await.unwrap();
        catalog.services.delete("mysql", &user).await.unwrap();
        assert_eq!(catalog.stored("mysql").await.status, ServiceStatus::Deleted);

        for _ in 0..3 {
            let err = catalog.services.delete("mysql", &user).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
        assert_eq!(
            catalog.services.get_doc("mysql", &user).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            catalog.services.grant_access("mysql", "tsuruteam", &user).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert!(catalog.services.list_for_user(&user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_waits_for_every_instance() {
        let catalog = Catalog::new();
        let owner = catalog.member_of("owner@catalog.test", &["owners"]).await;
        let guest = catalog.member_of("guest@catalog.test", &["guests"]).await;
        catalog.services.create(&manifest("redis"), &owner).await.unwrap();
        catalog.services.grant_access("redis", "guests", &owner).await.unwrap();

        catalog.instances.create("cache", "redis", &guest).await.unwrap();
        let err = catalog.services.delete("redis", &owner).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);

        // Instances created by other teams still count, and still show up
        // in the owner's listing.
        let listing = catalog.services.list_for_user(&owner).await.unwrap();
        assert_eq!(listing[0].instances, vec!["cache"]);

        catalog.instances.delete("cache", &guest).await.unwrap();
        catalog.services.delete("redis", &owner).await.unwrap();
    }

    #[tokio::test]
    async fn test_granted_team_is_not_owner() {
        let catalog = Catalog::new();
        let owner = catalog.member_of("owner@catalog.test", &["owners"]).await;
        let guest = catalog.member_of("guest@catalog.test", &["guests"]).await;
        catalog.services.create(&manifest("redis"), &owner).await.unwrap();
        catalog.services.grant_access("redis", "guests", &owner).await.unwrap();

        assert!(catalog.services.get_doc("redis", &guest).await.is_ok());
        assert!(catalog.services.list_for_user(&guest).await.unwrap().is_empty());
        let err = catalog.services.delete("redis", &guest).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[tokio::test]
    async fn test_revoke_keeps_owners_within_access() {
        let catalog = Catalog::new();
        let user = catalog.member_of("a@catalog.test", &["alpha", "beta"]).await;
        let mut service = Service::new("mysql", BTreeMap::new(), "alpha")
            .with_endpoint("production", "mysql.com");
        service.add_owner("beta");
        catalog.store.insert_service(&service).await.unwrap();

        catalog.services.revoke_access("mysql", "alpha", &user).await.unwrap();
        let stored = catalog.stored("mysql").await;
        assert!(!stored.is_owner("alpha"));
        assert!(stored.owner_teams().is_subset(stored.teams()));
    }

    #[tokio::test]
    async fn test_revoking_last_owner_leaves_service_unmanaged() {
        let catalog = Catalog::new();
        let owner = catalog.member_of("owner@catalog.test", &["owners"]).await;
        let guest = catalog.member_of("guest@catalog.test", &["guests"]).await;
        catalog.services.create(&manifest("svc"), &owner).await.unwrap();
        catalog.services.grant_access("svc", "guests", &owner).await.unwrap();

        catalog.services.revoke_access("svc", "owners", &guest).await.unwrap();
        let stored = catalog.stored("svc").await;
        assert!(stored.owner_teams().is_empty());
        assert_eq!(stored.teams().iter().collect::<Vec<_>>(), vec!["guests"]);

        // Access alone never allows administration.
        for user in [&owner, &guest] {
            let err = catalog.services.delete("svc", user).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        }
        assert!(catalog.services.get_doc("svc", &guest).await.is_ok());
    }
}

mod orphan_tests {
    use super::*;

    const TEAMS: [&str; 5] = ["t0", "t1", "t2", "t3", "t4"];

    /// Applies every revoke in order and returns the access set after each.
    async fn revoke_all(team_count: usize, revokes: &[usize]) -> Vec<(usize, Option<ErrorKind>)> {
        let catalog = Catalog::new();
        let teams = &TEAMS[..team_count];
        let user = catalog.member_of("u@catalog.test", teams).await;

        let mut service = Service::new("svc", BTreeMap::new(), teams[0])
            .with_endpoint("production", "svc.com");
        for team in &teams[1..] {
            service.grant_access(*team);
        }
        catalog.store.insert_service(&service).await.unwrap();

        let mut observed = Vec::new();
        for &i in revokes {
            let result = catalog
                .services
                .revoke_access("svc", TEAMS[i % team_count], &user)
                .await;
            let remaining = catalog.stored("svc").await.teams().len();
            observed.push((remaining, result.err().map(|e| e.kind())));
        }
        observed
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_revoke_never_orphans(
            team_count in 1usize..=5,
            revokes in proptest::collection::vec(0usize..5, 0..12),
        ) {
            let observed = tokio_test::block_on(revoke_all(team_count, &revokes));

            let mut before = team_count;
            for (remaining, error) in observed {
                prop_assert!(remaining >= 1);
                if before == 1 {
                    prop_assert_eq!(error, Some(ErrorKind::PermissionDenied));
                    prop_assert_eq!(remaining, 1);
                }
                before = remaining;
            }
        }
    }

    #[tokio::test]
    async fn test_sole_team_cannot_be_revoked() {
        let observed = revoke_all(1, &[0]).await;
        assert_eq!(observed, vec![(1, Some(ErrorKind::PermissionDenied))]);
    }
}
