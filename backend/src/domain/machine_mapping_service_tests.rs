//! Tests for the save-or-update mapping service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{
    AuditSinkError, MockAuditSink, MockMappingRepository, NoOpAuditSink,
};
use crate::domain::{InfoType, MachineId, MachineMappingKey, MappingStatus, UserId};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

fn fixture_clock() -> Arc<dyn Clock> {
    Arc::new(FixtureClock {
        utc_now: fixture_timestamp(),
    })
}

fn request_with_status(status: &str) -> MachineMappingRequest {
    MachineMappingRequest {
        user_id: "ID123".to_owned(),
        user_name: "Nm123".to_owned(),
        role: "ADmin".to_owned(),
        status: status.to_owned(),
        center_id: "CNTR123".to_owned(),
        station_id: "STN123".to_owned(),
        machine_id: "MCHN123".to_owned(),
    }
}

#[fixture]
fn active_request() -> MachineMappingRequest {
    request_with_status("ACTIVE")
}

#[fixture]
fn inactive_request() -> MachineMappingRequest {
    request_with_status("IN-ACTIVE")
}

fn expected_key() -> MachineMappingKey {
    MachineMappingKey::new(
        UserId::new("ID123").expect("user id"),
        MachineId::new("MCHN123").expect("machine id"),
    )
}

fn existing_mapping(status: MappingStatus) -> UserMachineMapping {
    let created_at = fixture_timestamp() - chrono::Duration::days(30);
    UserMachineMapping::new(
        expected_key(),
        status,
        UserId::new("ADMIN01").expect("creator id"),
        created_at,
    )
}

fn make_service<A: AuditSink>(
    repo: MockMappingRepository,
    audit: A,
) -> MachineMappingCommandService<MockMappingRepository, A> {
    MachineMappingCommandService::new(Arc::new(repo), Arc::new(audit), fixture_clock())
}

fn assert_mapped_successfully(envelope: &ResponseEnvelope) {
    let success = envelope
        .success_response()
        .expect("save-or-update should succeed");
    assert_eq!(success.message(), "Machine Mapped Successfully");
    assert_eq!(success.code(), ResponseCode::MachineMapped);
    assert_eq!(success.info_type(), InfoType::AlertInformation);
    assert!(envelope.error_responses().is_empty());
}

#[rstest]
#[tokio::test]
async fn saves_when_no_mapping_exists(inactive_request: MachineMappingRequest) {
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id()
        .withf(|key: &MachineMappingKey| *key == expected_key())
        .times(1)
        .return_once(|_| Ok(None));
    repo.expect_save()
        .withf(|mapping: &UserMachineMapping| {
            mapping.key() == &expected_key()
                && !mapping.is_active()
                && mapping.created_at() == fixture_timestamp()
                && mapping.created_by().as_str() == "ID123"
        })
        .times(1)
        .return_once(|_| Ok(()));
    repo.expect_update().times(0);

    let envelope = make_service(repo, NoOpAuditSink)
        .save_or_update(inactive_request)
        .await;

    assert_mapped_successfully(&envelope);
}

#[rstest]
#[tokio::test]
async fn updates_when_mapping_exists(active_request: MachineMappingRequest) {
    let existing = existing_mapping(MappingStatus::Inactive);
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_save().times(0);
    repo.expect_update()
        .withf(|mapping: &UserMachineMapping| {
            mapping.is_active()
                && mapping.created_by().as_str() == "ADMIN01"
                && mapping.updated_by().map(UserId::as_str) == Some("ID123")
                && mapping.updated_at() == Some(fixture_timestamp())
        })
        .times(1)
        .return_once(|_| Ok(()));

    let envelope = make_service(repo, NoOpAuditSink)
        .save_or_update(active_request)
        .await;

    assert_mapped_successfully(&envelope);
}

#[rstest]
#[tokio::test]
async fn deactivation_uses_the_update_path(inactive_request: MachineMappingRequest) {
    let existing = existing_mapping(MappingStatus::Active);
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Ok(Some(existing)));
    repo.expect_save().times(0);
    repo.expect_update()
        .withf(|mapping: &UserMachineMapping| !mapping.is_active())
        .times(1)
        .return_once(|_| Ok(()));

    let envelope = make_service(repo, NoOpAuditSink)
        .save_or_update(inactive_request)
        .await;

    assert_mapped_successfully(&envelope);
}

#[rstest]
#[case(MappingRepositoryError::connection("database unreachable"))]
#[case(MappingRepositoryError::query("malformed lookup"))]
#[tokio::test]
async fn lookup_failure_reports_unable_to_map_user(
    inactive_request: MachineMappingRequest,
    #[case] failure: MappingRepositoryError,
) {
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(move |_| Err(failure));
    repo.expect_save().times(0);
    repo.expect_update().times(0);
    let mut audit = MockAuditSink::new();
    audit.expect_record().times(0);

    let envelope = make_service(repo, audit)
        .save_or_update(inactive_request)
        .await;

    assert!(envelope.success_response().is_none());
    let first = envelope.first_error().expect("one error payload");
    assert_eq!(first.message(), "Unable to map user");
    assert_eq!(first.code(), ResponseCode::MappingFailed);
    assert_eq!(envelope.error_responses().len(), 1);
}

#[rstest]
#[tokio::test]
async fn write_failure_reports_unable_to_map_user(active_request: MachineMappingRequest) {
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));
    repo.expect_save()
        .times(1)
        .return_once(|_| Err(MappingRepositoryError::duplicate("ID123@MCHN123")));
    let mut audit = MockAuditSink::new();
    audit.expect_record().times(0);

    let envelope = make_service(repo, audit)
        .save_or_update(active_request)
        .await;

    assert_eq!(envelope.message(), "Unable to map user");
}

#[rstest]
#[tokio::test]
async fn invalid_request_skips_the_repository(mut active_request: MachineMappingRequest) {
    active_request.status = "SUSPENDED".to_owned();
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id().times(0);
    repo.expect_save().times(0);
    repo.expect_update().times(0);

    let envelope = make_service(repo, NoOpAuditSink)
        .save_or_update(active_request)
        .await;

    let first = envelope.first_error().expect("validation error");
    assert_eq!(first.code(), ResponseCode::InvalidRequest);
    assert!(first.message().contains("SUSPENDED"));
}

#[rstest]
#[tokio::test]
async fn success_emits_one_change_event(active_request: MachineMappingRequest) {
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));
    repo.expect_save().times(1).return_once(|_| Ok(()));
    let mut audit = MockAuditSink::new();
    audit
        .expect_record()
        .withf(|event: &AuditEvent| {
            event.kind == AuditEventKind::MachineMappingChanged
                && event.actor == "ID123"
                && event.context == "ID123@MCHN123"
                && event.message.starts_with("mapping created as ACTIVE")
        })
        .times(1)
        .return_once(|_| Ok(()));

    let envelope = make_service(repo, audit)
        .save_or_update(active_request)
        .await;

    assert!(envelope.is_success());
}

#[rstest]
#[tokio::test]
async fn audit_failure_does_not_change_the_response(active_request: MachineMappingRequest) {
    let mut repo = MockMappingRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));
    repo.expect_save().times(1).return_once(|_| Ok(()));
    let mut audit = MockAuditSink::new();
    audit
        .expect_record()
        .times(1)
        .return_once(|_| Err(AuditSinkError::write("audit log full")));

    let envelope = make_service(repo, audit)
        .save_or_update(active_request)
        .await;

    assert_mapped_successfully(&envelope);
}
