//! Tests for the mapped-user view service.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    MachineIdentifierError, MockAuditSink, MockMachineIdentifierProvider, MockMappingRepository,
    NoOpAuditSink, StaticMachineIdentifier,
};
use crate::domain::{
    MachineMappingKey, MappingStatus, RegistrationUserRole, RoleCode, UserId, UserMachineMapping,
};

const MACHINE_ID: &str = "A4-5E-60-E2-3F-91";

#[fixture]
fn machine_id() -> MachineId {
    MachineId::new(MACHINE_ID).expect("machine id")
}

fn registration_user(id: &str, machine_id: &MachineId, status: MappingStatus) -> RegistrationUserDetail {
    let user_id = UserId::new(id).expect("user id");
    let created_at = Utc
        .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
        .single()
        .expect("valid fixture timestamp");
    let mapping = UserMachineMapping::new(
        MachineMappingKey::new(user_id.clone(), machine_id.clone()),
        status,
        user_id.clone(),
        created_at,
    );
    RegistrationUserDetail {
        id: user_id.clone(),
        name: "Registration".to_owned(),
        center_id: CenterId::new("CenterID123").expect("center id"),
        machine_mappings: vec![mapping],
        roles: vec![RegistrationUserRole {
            user_id,
            role_code: RoleCode::new("101").expect("role code"),
        }],
    }
}

fn registered_repository(users: Vec<RegistrationUserDetail>) -> MockMappingRepository {
    let mut repo = MockMappingRepository::new();
    repo.expect_get_station_id()
        .times(1)
        .return_once(|_| Ok(Some(StationId::new("StationID").expect("station id"))));
    repo.expect_get_center_id()
        .times(1)
        .return_once(|_| Ok(Some(CenterId::new("CenterID107").expect("center id"))));
    repo.expect_get_users()
        .withf(|machine: &MachineId| machine.as_str() == MACHINE_ID)
        .times(1)
        .return_once(move |_| Ok(users));
    repo
}

fn make_service<R: MappingRepository, A: AuditSink>(
    machine_id: MachineId,
    repo: R,
    audit: A,
) -> MachineMappingQueryService<StaticMachineIdentifier, R, A> {
    MachineMappingQueryService::new(
        Arc::new(StaticMachineIdentifier::new(machine_id)),
        Arc::new(repo),
        Arc::new(audit),
    )
}

#[rstest]
#[tokio::test]
async fn view_lists_users_mapped_to_this_machine(machine_id: MachineId) {
    let users = vec![registration_user("ID123456", &machine_id, MappingStatus::Active)];
    let service = make_service(machine_id, registered_repository(users), NoOpAuditSink);

    let envelope = service.view().await;

    let success = envelope.success_response().expect("view succeeds");
    assert_eq!(success.message(), "User Data Fetched Successfully");
    assert_eq!(success.code(), ResponseCode::UsersFetched);
    assert_eq!(success.users().len(), 1);
    let row = &success.users()[0];
    assert_eq!(row.user_id.as_str(), "ID123456");
    assert_eq!(row.user_name, "Registration");
    assert_eq!(row.center_id.as_str(), "CenterID107");
    assert_eq!(row.station_id.as_str(), "StationID");
    assert_eq!(row.machine_id.as_str(), MACHINE_ID);
    assert_eq!(row.role_codes, vec![RoleCode::new("101").expect("role code")]);
    assert_eq!(row.status, MappingStatus::Active);
    assert!(envelope.error_responses().is_empty());
}

#[rstest]
#[tokio::test]
async fn view_reports_inactive_mappings(machine_id: MachineId) {
    let users = vec![
        registration_user("ID123456", &machine_id, MappingStatus::Active),
        registration_user("ID654321", &machine_id, MappingStatus::Inactive),
    ];
    let service = make_service(machine_id, registered_repository(users), NoOpAuditSink);

    let envelope = service.view().await;

    let statuses: Vec<_> = envelope
        .success_response()
        .expect("view succeeds")
        .users()
        .iter()
        .map(|row| row.status)
        .collect();
    assert_eq!(statuses, [MappingStatus::Active, MappingStatus::Inactive]);
}

#[rstest]
#[tokio::test]
async fn view_skips_users_without_a_mapping_for_this_machine(machine_id: MachineId) {
    let other_machine = MachineId::new("00-1B-44-11-3A-B7").expect("machine id");
    let users = vec![
        registration_user("ID123456", &machine_id, MappingStatus::Active),
        registration_user("ID777777", &other_machine, MappingStatus::Active),
    ];
    let service = make_service(machine_id, registered_repository(users), NoOpAuditSink);

    let envelope = service.view().await;

    let users = envelope.success_response().expect("view succeeds").users();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].user_id.as_str(), "ID123456");
}

#[rstest]
#[tokio::test]
async fn view_without_station_reports_no_records(machine_id: MachineId) {
    let mut repo = MockMappingRepository::new();
    repo.expect_get_station_id().times(1).return_once(|_| Ok(None));
    repo.expect_get_center_id().times(0);
    repo.expect_get_users().times(0);
    let mut audit = MockAuditSink::new();
    audit.expect_record().times(0);

    let envelope = make_service(machine_id, repo, audit).view().await;

    assert!(envelope.success_response().is_none());
    let first = envelope.first_error().expect("one error payload");
    assert_eq!(first.message(), "No Records Found");
    assert_eq!(first.code(), ResponseCode::NoRecordsFound);
}

#[rstest]
#[tokio::test]
async fn view_without_center_reports_no_records(machine_id: MachineId) {
    let mut repo = MockMappingRepository::new();
    repo.expect_get_station_id()
        .times(1)
        .return_once(|_| Ok(Some(StationId::new("StationID").expect("station id"))));
    repo.expect_get_center_id().times(1).return_once(|_| Ok(None));
    repo.expect_get_users().times(0);

    let envelope = make_service(machine_id, repo, NoOpAuditSink).view().await;

    assert_eq!(envelope.message(), "No Records Found");
}

#[rstest]
#[tokio::test]
async fn recoverable_lookup_failure_carries_its_message(machine_id: MachineId) {
    let mut repo = MockMappingRepository::new();
    repo.expect_get_station_id()
        .times(1)
        .return_once(|_| Ok(Some(StationId::new("StationID").expect("station id"))));
    repo.expect_get_center_id()
        .times(1)
        .return_once(|_| Ok(Some(CenterId::new("CenterID107").expect("center id"))));
    repo.expect_get_users()
        .times(1)
        .return_once(|_| Err(MappingRepositoryError::query("user table locked")));
    let mut audit = MockAuditSink::new();
    audit.expect_record().times(0);

    let envelope = make_service(machine_id, repo, audit).view().await;

    let first = envelope.first_error().expect("one error payload");
    assert_eq!(
        first.message(),
        "mapping repository query failed: user table locked"
    );
    assert_eq!(first.code(), ResponseCode::LookupFailed);
}

#[rstest]
#[tokio::test]
async fn fatal_lookup_failure_hides_infrastructure_detail(machine_id: MachineId) {
    let mut repo = MockMappingRepository::new();
    repo.expect_get_station_id()
        .times(1)
        .return_once(|_| Err(MappingRepositoryError::connection("tcp reset by 10.0.0.4")));

    let envelope = make_service(machine_id, repo, NoOpAuditSink).view().await;

    assert_eq!(envelope.message(), "Unable to fetch user data");
    assert_eq!(envelope.error_responses().len(), 1);
}

#[rstest]
#[tokio::test]
async fn identifier_failure_is_reported() {
    let mut provider = MockMachineIdentifierProvider::new();
    provider
        .expect_current()
        .times(1)
        .return_once(|| Err(MachineIdentifierError::unavailable("no network interfaces")));
    let mut repo = MockMappingRepository::new();
    repo.expect_get_station_id().times(0);
    let service =
        MachineMappingQueryService::new(Arc::new(provider), Arc::new(repo), Arc::new(NoOpAuditSink));

    let envelope = service.view().await;

    assert_eq!(
        envelope.message(),
        "machine identifier unavailable: no network interfaces"
    );
}

#[rstest]
#[tokio::test]
async fn successful_view_is_audited(machine_id: MachineId) {
    let users = vec![registration_user("ID123456", &machine_id, MappingStatus::Active)];
    let mut audit = MockAuditSink::new();
    audit
        .expect_record()
        .withf(|event: &AuditEvent| {
            event.kind == AuditEventKind::MachineMappingViewed
                && event.actor == MACHINE_ID
                && event.message == "listed 1 mapped users"
        })
        .times(1)
        .return_once(|_| Ok(()));
    let service = make_service(machine_id, registered_repository(users), audit);

    let envelope = service.view().await;

    assert!(envelope.is_success());
}
