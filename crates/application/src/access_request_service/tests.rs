use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use rollcall_core::{AppError, AppResult, OrgId};
use rollcall_domain::{
    AccessRequest, AccessRequestStatus, CapabilitySet, Edipi, Org, RequestId, Role, RoleDraft,
    RoleId, User, UserRole, base_roster_columns,
};

use crate::access_ports::{
    AccessRequestRecord, AccessRequestRepository, AccessRequestTransaction, OrgRepository,
    RequesterSummary,
};

use super::AccessRequestService;

#[derive(Default, Clone)]
struct Store {
    orgs: Vec<Org>,
    users: Vec<User>,
    roles: Vec<Role>,
    requests: Vec<AccessRequest>,
}

impl Store {
    fn user(&self, edipi: &Edipi) -> Option<User> {
        self.users.iter().find(|user| &user.edipi == edipi).cloned()
    }
}

struct FakeAccessRepository {
    store: Arc<Mutex<Store>>,
    membership_insert_conflicts: bool,
}

struct FakeTransaction {
    shared: Arc<Mutex<Store>>,
    local: Store,
    membership_insert_conflicts: bool,
}

#[async_trait]
impl OrgRepository for FakeAccessRepository {
    async fn find_org(&self, org_id: OrgId) -> AppResult<Option<Org>> {
        Ok(self
            .store
            .lock()
            .await
            .orgs
            .iter()
            .find(|org| org.id == org_id)
            .cloned())
    }
}

#[async_trait]
impl AccessRequestRepository for FakeAccessRepository {
    async fn list_pending(&self, org_id: OrgId) -> AppResult<Vec<AccessRequestRecord>> {
        let store = self.store.lock().await;
        let org = store
            .orgs
            .iter()
            .find(|org| org.id == org_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("organization was not found".to_owned()))?;

        Ok(store
            .requests
            .iter()
            .filter(|request| {
                request.org_id == org_id && request.status == AccessRequestStatus::Pending
            })
            .map(|request| {
                let user = store.user(&request.edipi).unwrap();
                AccessRequestRecord {
                    request: request.clone(),
                    requester: RequesterSummary {
                        edipi: user.edipi,
                        first_name: user.first_name,
                        last_name: user.last_name,
                    },
                    org: org.clone(),
                }
            })
            .collect())
    }

    async fn find_for_user(
        &self,
        org_id: OrgId,
        edipi: &Edipi,
    ) -> AppResult<Option<AccessRequest>> {
        Ok(self
            .store
            .lock()
            .await
            .requests
            .iter()
            .find(|request| request.org_id == org_id && &request.edipi == edipi)
            .cloned())
    }

    async fn find_by_id(
        &self,
        org_id: OrgId,
        request_id: RequestId,
    ) -> AppResult<Option<AccessRequest>> {
        Ok(self
            .store
            .lock()
            .await
            .requests
            .iter()
            .find(|request| request.org_id == org_id && request.id == request_id)
            .cloned())
    }

    async fn delete(&self, request_id: RequestId) -> AppResult<()> {
        self.store
            .lock()
            .await
            .requests
            .retain(|request| request.id != request_id);
        Ok(())
    }

    async fn set_status(&self, request_id: RequestId, status: AccessRequestStatus) -> AppResult<()> {
        let mut store = self.store.lock().await;
        let request = store
            .requests
            .iter_mut()
            .find(|request| request.id == request_id)
            .ok_or_else(|| AppError::NotFound("access request was not found".to_owned()))?;
        request.status = status;
        Ok(())
    }

    async fn begin(&self) -> AppResult<Box<dyn AccessRequestTransaction>> {
        let local = self.store.lock().await.clone();
        Ok(Box::new(FakeTransaction {
            shared: Arc::clone(&self.store),
            local,
            membership_insert_conflicts: self.membership_insert_conflicts,
        }))
    }
}

#[async_trait]
impl AccessRequestTransaction for FakeTransaction {
    async fn find_request(
        &mut self,
        org_id: OrgId,
        request_id: RequestId,
    ) -> AppResult<Option<AccessRequest>> {
        Ok(self
            .local
            .requests
            .iter()
            .find(|request| request.org_id == org_id && request.id == request_id)
            .cloned())
    }

    async fn find_request_for_user(
        &mut self,
        org_id: OrgId,
        edipi: &Edipi,
    ) -> AppResult<Option<AccessRequest>> {
        Ok(self
            .local
            .requests
            .iter()
            .find(|request| request.org_id == org_id && &request.edipi == edipi)
            .cloned())
    }

    async fn find_role(&mut self, org_id: OrgId, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self
            .local
            .roles
            .iter()
            .find(|role| role.org_id == org_id && role.id == role_id)
            .cloned())
    }

    async fn find_user_with_roles(&mut self, edipi: &Edipi) -> AppResult<Option<User>> {
        Ok(self.local.user(edipi))
    }

    async fn insert_request(&mut self, request: &AccessRequest) -> AppResult<()> {
        self.local.requests.push(request.clone());
        Ok(())
    }

    async fn delete_request(&mut self, request_id: RequestId) -> AppResult<()> {
        self.local.requests.retain(|request| request.id != request_id);
        Ok(())
    }

    async fn insert_user_role(
        &mut self,
        edipi: &Edipi,
        org_id: OrgId,
        role_id: RoleId,
    ) -> AppResult<()> {
        // Stands in for the user_role unique index rejecting a membership
        // committed by a concurrent approval after this snapshot was taken.
        if self.membership_insert_conflicts {
            return Err(AppError::Conflict(
                "user already holds a role in the organization".to_owned(),
            ));
        }

        let role = self
            .local
            .roles
            .iter()
            .find(|role| role.org_id == org_id && role.id == role_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("role was not found".to_owned()))?;

        let user = self
            .local
            .users
            .iter_mut()
            .find(|user| &user.edipi == edipi)
            .ok_or_else(|| AppError::NotFound("user was not found".to_owned()))?;

        if user.role_in(org_id).is_some() {
            return Err(AppError::Conflict(
                "user already holds a role in the organization".to_owned(),
            ));
        }

        user.roles.push(UserRole { org_id, role });
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        *self.shared.lock().await = self.local;
        Ok(())
    }
}

struct Fixture {
    service: AccessRequestService,
    store: Arc<Mutex<Store>>,
    org_id: OrgId,
}

fn make_role(org_id: OrgId, name: &str, capabilities: CapabilitySet) -> Role {
    Role::from_draft(
        RoleId::new(),
        org_id,
        RoleDraft {
            name: name.to_owned(),
            capabilities,
            ..RoleDraft::default()
        },
        base_roster_columns(),
    )
}

fn make_user(edipi: &str, registered: bool) -> User {
    User {
        edipi: Edipi::new(edipi).unwrap(),
        first_name: "Test".to_owned(),
        last_name: "User".to_owned(),
        registered,
        roles: Vec::new(),
    }
}

fn fixture() -> Fixture {
    fixture_with_contention(false)
}

fn fixture_with_contention(membership_insert_conflicts: bool) -> Fixture {
    let org_id = OrgId::new();
    let store = Arc::new(Mutex::new(Store {
        orgs: vec![Org {
            id: org_id,
            name: "1st Battalion".to_owned(),
            description: String::new(),
            contact: None,
        }],
        ..Store::default()
    }));

    let repository = Arc::new(FakeAccessRepository {
        store: Arc::clone(&store),
        membership_insert_conflicts,
    });
    let service = AccessRequestService::new(repository.clone(), repository);

    Fixture {
        service,
        store,
        org_id,
    }
}

async fn seed_admin(fixture: &Fixture, edipi: &str) -> User {
    let role = make_role(
        fixture.org_id,
        "admin",
        CapabilitySet {
            manage_group: true,
            view_muster: true,
            view_pii: true,
            view_phi: true,
            ..CapabilitySet::default()
        },
    );

    let mut admin = make_user(edipi, true);
    admin.roles.push(UserRole {
        org_id: fixture.org_id,
        role: role.clone(),
    });

    let mut store = fixture.store.lock().await;
    store.roles.push(role);
    store.users.push(admin.clone());
    admin
}

async fn seed_user(fixture: &Fixture, edipi: &str) -> User {
    let user = make_user(edipi, true);
    fixture.store.lock().await.users.push(user.clone());
    user
}

async fn seed_role(fixture: &Fixture, name: &str, capabilities: CapabilitySet) -> Role {
    let role = make_role(fixture.org_id, name, capabilities);
    fixture.store.lock().await.roles.push(role.clone());
    role
}

#[tokio::test]
async fn issue_creates_exactly_one_pending_row() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;

    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    assert_eq!(request.status, AccessRequestStatus::Pending);
    let store = fixture.store.lock().await;
    assert_eq!(store.requests.len(), 1);
    assert_eq!(store.requests[0].id, request.id);
}

#[tokio::test]
async fn issue_fails_while_request_is_pending() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;

    fixture.service.issue(&user, fixture.org_id).await.unwrap();
    let error = fixture
        .service
        .issue(&user, fixture.org_id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Validation(_)));
    assert_eq!(fixture.store.lock().await.requests.len(), 1);
}

#[tokio::test]
async fn issue_after_denial_replaces_the_row() {
    let fixture = fixture();
    let admin = seed_admin(&fixture, "9000000001").await;
    let user = seed_user(&fixture, "1000000001").await;

    let first = fixture.service.issue(&user, fixture.org_id).await.unwrap();
    fixture
        .service
        .deny(&admin, fixture.org_id, first.id)
        .await
        .unwrap();

    let second = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    assert_ne!(first.id, second.id);
    let store = fixture.store.lock().await;
    assert_eq!(store.requests.len(), 1);
    assert_eq!(store.requests[0].id, second.id);
    assert_eq!(store.requests[0].status, AccessRequestStatus::Pending);
}

#[tokio::test]
async fn issue_rejects_unregistered_users() {
    let fixture = fixture();
    let user = make_user("1000000001", false);

    let error = fixture
        .service
        .issue(&user, fixture.org_id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Validation(_)));
    assert!(fixture.store.lock().await.requests.is_empty());
}

#[tokio::test]
async fn issue_against_unknown_org_is_not_found() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;

    let error = fixture.service.issue(&user, OrgId::new()).await.unwrap_err();

    assert!(matches!(error, AppError::NotFound(_)));
}

#[tokio::test]
async fn cancel_deletes_own_request() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;
    fixture.service.issue(&user, fixture.org_id).await.unwrap();

    fixture.service.cancel(&user, fixture.org_id).await.unwrap();

    assert!(fixture.store.lock().await.requests.is_empty());
}

#[tokio::test]
async fn cancel_without_request_is_not_found() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;

    let error = fixture
        .service
        .cancel(&user, fixture.org_id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::NotFound(_)));
}

#[tokio::test]
async fn deny_preserves_the_row_with_denied_status() {
    let fixture = fixture();
    let admin = seed_admin(&fixture, "9000000001").await;
    let user = seed_user(&fixture, "1000000001").await;
    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let denied = fixture
        .service
        .deny(&admin, fixture.org_id, request.id)
        .await
        .unwrap();

    assert_eq!(denied.status, AccessRequestStatus::Denied);
    let store = fixture.store.lock().await;
    assert_eq!(store.requests.len(), 1);
    assert_eq!(store.requests[0].status, AccessRequestStatus::Denied);
}

#[tokio::test]
async fn deny_requires_manage_group() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;
    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let error = fixture
        .service
        .deny(&user, fixture.org_id, request.id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Forbidden(_)));
}

#[tokio::test]
async fn list_pending_requires_manage_group() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;

    let error = fixture
        .service
        .list_pending(&user, fixture.org_id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Forbidden(_)));
}

#[tokio::test]
async fn list_pending_embeds_user_and_org() {
    let fixture = fixture();
    let admin = seed_admin(&fixture, "9000000001").await;
    let user = seed_user(&fixture, "1000000001").await;
    fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let records = fixture
        .service
        .list_pending(&admin, fixture.org_id)
        .await
        .unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].requester.edipi, user.edipi);
    assert_eq!(records[0].org.id, fixture.org_id);
}

#[tokio::test]
async fn approve_grants_role_and_consumes_request() {
    let fixture = fixture();
    let admin = seed_admin(&fixture, "9000000001").await;
    let user = seed_user(&fixture, "1000000001").await;
    let role = seed_role(
        &fixture,
        "member",
        CapabilitySet {
            view_roster: true,
            ..CapabilitySet::default()
        },
    )
    .await;
    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let approved = fixture
        .service
        .approve(&admin, fixture.org_id, request.id, role.id)
        .await
        .unwrap();

    assert_eq!(approved.request.id, request.id);
    assert_eq!(approved.role.id, role.id);

    let store = fixture.store.lock().await;
    assert!(store.requests.is_empty());
    let granted = store.user(&user.edipi).unwrap();
    assert_eq!(granted.role_in(fixture.org_id).unwrap().id, role.id);
}

#[tokio::test]
async fn approve_without_superset_is_unauthorized_and_leaves_request() {
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;

    // The approver manages the group but lacks view-muster, which the
    // target role carries.
    let weak_admin_role = seed_role(
        &fixture,
        "limited-admin",
        CapabilitySet {
            manage_group: true,
            ..CapabilitySet::default()
        },
    )
    .await;
    let mut admin = make_user("9000000001", true);
    admin.roles.push(UserRole {
        org_id: fixture.org_id,
        role: weak_admin_role,
    });
    fixture.store.lock().await.users.push(admin.clone());

    let target = seed_role(
        &fixture,
        "muster-viewer",
        CapabilitySet {
            view_muster: true,
            ..CapabilitySet::default()
        },
    )
    .await;
    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let error = fixture
        .service
        .approve(&admin, fixture.org_id, request.id, target.id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Unauthorized(_)));
    let store = fixture.store.lock().await;
    assert_eq!(store.requests.len(), 1);
    assert_eq!(store.requests[0].status, AccessRequestStatus::Pending);
    assert!(store.user(&user.edipi).unwrap().roles.is_empty());
}

#[tokio::test]
async fn approve_conflict_deletes_stale_request_and_fails() {
    let fixture = fixture();
    let admin = seed_admin(&fixture, "9000000001").await;
    let user = seed_user(&fixture, "1000000001").await;
    let role = seed_role(
        &fixture,
        "member",
        CapabilitySet {
            view_roster: true,
            ..CapabilitySet::default()
        },
    )
    .await;
    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    // The user gains a role through another path while the request is open.
    {
        let mut store = fixture.store.lock().await;
        let role = role.clone();
        let stored = store
            .users
            .iter_mut()
            .find(|stored| stored.edipi == user.edipi)
            .unwrap();
        stored.roles.push(UserRole {
            org_id: fixture.org_id,
            role,
        });
    }

    let error = fixture
        .service
        .approve(&admin, fixture.org_id, request.id, role.id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Validation(_)));
    // The cleanup deletion is committed despite the failure.
    let store = fixture.store.lock().await;
    assert!(store.requests.is_empty());
    assert_eq!(store.user(&user.edipi).unwrap().roles.len(), 1);
}

#[tokio::test]
async fn approve_surfaces_conflict_when_membership_lands_concurrently() {
    let fixture = fixture_with_contention(true);
    let admin = seed_admin(&fixture, "9000000001").await;
    let user = seed_user(&fixture, "1000000001").await;
    let role = seed_role(
        &fixture,
        "member",
        CapabilitySet {
            view_roster: true,
            ..CapabilitySet::default()
        },
    )
    .await;
    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let error = fixture
        .service
        .approve(&admin, fixture.org_id, request.id, role.id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::Conflict(_)));
    // The failed transaction rolls back; the request deletion must not stick.
    let store = fixture.store.lock().await;
    assert_eq!(store.requests.len(), 1);
    assert_eq!(store.requests[0].status, AccessRequestStatus::Pending);
    assert!(store.user(&user.edipi).unwrap().roles.is_empty());
}

#[tokio::test]
async fn approve_unknown_request_is_not_found() {
    let fixture = fixture();
    let admin = seed_admin(&fixture, "9000000001").await;
    let role = seed_role(&fixture, "member", CapabilitySet::default()).await;

    let error = fixture
        .service
        .approve(&admin, fixture.org_id, RequestId::new(), role.id)
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::NotFound(_)));
}

#[tokio::test]
async fn approve_unknown_role_is_not_found_and_rolls_back() {
    let fixture = fixture();
    let admin = seed_admin(&fixture, "9000000001").await;
    let user = seed_user(&fixture, "1000000001").await;
    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let error = fixture
        .service
        .approve(&admin, fixture.org_id, request.id, RoleId::new())
        .await
        .unwrap_err();

    assert!(matches!(error, AppError::NotFound(_)));
    assert_eq!(fixture.store.lock().await.requests.len(), 1);
}

#[tokio::test]
async fn denied_request_can_be_reissued_after_failed_approval() {
    // Full workflow: issue, failed approval on a role the admin does not
    // dominate, deny, re-issue with a fresh id.
    let fixture = fixture();
    let user = seed_user(&fixture, "1000000001").await;

    let viewer_admin_role = seed_role(
        &fixture,
        "roster-admin",
        CapabilitySet {
            manage_group: true,
            ..CapabilitySet::default()
        },
    )
    .await;
    let mut admin = make_user("9000000001", true);
    admin.roles.push(UserRole {
        org_id: fixture.org_id,
        role: viewer_admin_role,
    });
    fixture.store.lock().await.users.push(admin.clone());

    let phi_role = seed_role(
        &fixture,
        "medical",
        CapabilitySet {
            view_roster: true,
            view_phi: true,
            ..CapabilitySet::default()
        },
    )
    .await;

    let request = fixture.service.issue(&user, fixture.org_id).await.unwrap();

    let error = fixture
        .service
        .approve(&admin, fixture.org_id, request.id, phi_role.id)
        .await
        .unwrap_err();
    assert!(matches!(error, AppError::Unauthorized(_)));

    let denied = fixture
        .service
        .deny(&admin, fixture.org_id, request.id)
        .await
        .unwrap();
    assert_eq!(denied.status, AccessRequestStatus::Denied);

    let reissued = fixture.service.issue(&user, fixture.org_id).await.unwrap();
    assert_ne!(reissued.id, request.id);
    assert_eq!(reissued.status, AccessRequestStatus::Pending);
    assert_eq!(fixture.store.lock().await.requests.len(), 1);
}
