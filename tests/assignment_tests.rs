mod common;

use fleet_logistics::dto::equipment_dto::UpdateEquipmentRequest;
use fleet_logistics::repositories::Visibility;
use fleet_logistics::utils::errors::ErrorKind;
use fleet_logistics::utils::patch::Patch;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn test_driver_cannot_drive_two_transports() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;

    let assigned = s.assignments.assign_driver(t1.id, d1.id).await.unwrap();
    assert_eq!(assigned.current_driver_id, Some(d1.id));

    let t2 = transport(&s, "T2-002").await;
    let err = s.assignments.assign_driver(t2.id, d1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("driver already assigned"));

    let t2_after = s.fleet.get_transport(t2.id, Visibility::ActiveOnly).await.unwrap();
    assert_eq!(t2_after.current_driver_id, None);
}

#[tokio::test]
async fn test_reassigning_same_driver_is_a_no_op() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;

    let first = s.assignments.assign_driver(t1.id, d1.id).await.unwrap();
    let second = s.assignments.assign_driver(t1.id, d1.id).await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_assigning_new_driver_replaces_current_one() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;
    let d2 = driver(&s, "LIC-002").await;

    s.assignments.assign_driver(t1.id, d1.id).await.unwrap();
    let updated = s.assignments.assign_driver(t1.id, d2.id).await.unwrap();
    assert_eq!(updated.current_driver_id, Some(d2.id));

    // d1 queda libre para otro transporte
    let t2 = transport(&s, "T2-002").await;
    assert!(s.assignments.assign_driver(t2.id, d1.id).await.is_ok());
}

#[tokio::test]
async fn test_missing_or_deleted_entities_are_not_found() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;

    let err = s.assignments.assign_driver(Uuid::new_v4(), d1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    s.lifecycle.delete_driver(d1.id).await.unwrap();
    let err = s.assignments.assign_driver(t1.id, d1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn test_unassign_driver_requires_a_driver() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let d1 = driver(&s, "LIC-001").await;

    let err = s.assignments.unassign_driver(t1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    s.assignments.assign_driver(t1.id, d1.id).await.unwrap();
    let cleared = s.assignments.unassign_driver(t1.id).await.unwrap();
    assert_eq!(cleared.current_driver_id, None);
}

#[tokio::test]
async fn test_equipment_in_warehouse_is_not_available_until_cleared() {
    let s = services();
    let w1 = warehouse(&s, "North").await;
    let e1 = equipment_in_warehouse(&s, w1.id).await;
    let t1 = transport(&s, "T1-001").await;

    let err = s.assignments.assign_equipment(t1.id, e1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("not available for assignment"));

    s.equipment
        .update_equipment(
            e1.id,
            UpdateEquipmentRequest {
                warehouse_id: Patch::Clear,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let t1_after = s.assignments.assign_equipment(t1.id, e1.id).await.unwrap();
    assert_eq!(t1_after.current_equipment_id, Some(e1.id));

    let e1_after = s.equipment.get_equipment(e1.id, Visibility::ActiveOnly).await.unwrap();
    assert_eq!(e1_after.transport_id, Some(t1.id));
    assert_eq!(e1_after.warehouse_id, None);
    assert_eq!(e1_after.client_object_id, None);
}

#[tokio::test]
async fn test_mounted_equipment_cannot_go_to_a_second_transport() {
    let s = services();
    let e1 = loose_equipment(&s).await;
    let t1 = transport(&s, "T1-001").await;
    let t2 = transport(&s, "T2-002").await;

    s.assignments.assign_equipment(t1.id, e1.id).await.unwrap();
    let err = s.assignments.assign_equipment(t2.id, e1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let t2_after = s.fleet.get_transport(t2.id, Visibility::ActiveOnly).await.unwrap();
    assert_eq!(t2_after.current_equipment_id, None);
}

#[tokio::test]
async fn test_transport_carries_one_equipment_unit() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let e1 = loose_equipment(&s).await;
    let e2 = loose_equipment(&s).await;

    s.assignments.assign_equipment(t1.id, e1.id).await.unwrap();
    let err = s.assignments.assign_equipment(t1.id, e2.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let e2_after = s.equipment.get_equipment(e2.id, Visibility::ActiveOnly).await.unwrap();
    assert!(e2_after.is_available());
}

#[tokio::test]
async fn test_unassign_equipment_clears_both_sides() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let e1 = loose_equipment(&s).await;
    s.assignments.assign_equipment(t1.id, e1.id).await.unwrap();

    let t1_after = s.assignments.unassign_equipment(t1.id).await.unwrap();
    assert_eq!(t1_after.current_equipment_id, None);
    let e1_after = s.equipment.get_equipment(e1.id, Visibility::ActiveOnly).await.unwrap();
    assert!(e1_after.is_available());

    let err = s.assignments.unassign_equipment(t1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[tokio::test]
async fn test_mounted_equipment_placement_is_frozen() {
    let s = services();
    let t1 = transport(&s, "T1-001").await;
    let w1 = warehouse(&s, "North").await;
    let e1 = loose_equipment(&s).await;
    s.assignments.assign_equipment(t1.id, e1.id).await.unwrap();

    let err = s
        .equipment
        .update_equipment(
            e1.id,
            UpdateEquipmentRequest {
                warehouse_id: Patch::Set(w1.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Los campos que no son de ubicación sí se pueden cambiar
    let updated = s
        .equipment
        .update_equipment(
            e1.id,
            UpdateEquipmentRequest {
                condition: Some("worn".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.condition, "worn");
    assert_eq!(updated.transport_id, Some(t1.id));
}

#[tokio::test]
async fn test_equipment_never_has_two_locations() {
    let s = services();
    let c1 = client(&s, "Acme").await;
    let o1 = client_object(&s, c1.id, "Site A").await;
    let w1 = warehouse(&s, "North").await;

    let err = s
        .equipment
        .create_equipment(fleet_logistics::dto::equipment_dto::CreateEquipmentRequest {
            client_object_id: Some(o1.id),
            warehouse_id: Some(w1.id),
            ..equipment_request()
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let e1 = equipment_in_warehouse(&s, w1.id).await;
    let moved = s
        .equipment
        .update_equipment(
            e1.id,
            UpdateEquipmentRequest {
                client_object_id: Patch::Set(o1.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.client_object_id, Some(o1.id));
    assert_eq!(moved.warehouse_id, None);

    for eq in s.equipment.list_equipment(Visibility::IncludeDeleted).await.unwrap() {
        let set = [eq.client_object_id, eq.warehouse_id, eq.transport_id]
            .iter()
            .filter(|id| id.is_some())
            .count();
        assert!(set <= 1);
    }
}
