//! Fixtures compartidos por los tests de integración
#![allow(dead_code)]

use rust_decimal::Decimal;
use uuid::Uuid;

use fleet_logistics::dto::client_dto::{
    CreateClientObjectRequest, CreateClientRequest, CreateWarehouseRequest,
};
use fleet_logistics::dto::equipment_dto::CreateEquipmentRequest;
use fleet_logistics::dto::fleet_dto::{CreateDriverRequest, CreateTransportRequest};
use fleet_logistics::dto::order_dto::CreateOrderRequest;
use fleet_logistics::models::{
    Client, ClientObject, Driver, Equipment, Order, Transport, TransportStatus, Warehouse,
};
use fleet_logistics::services::FleetServices;

pub fn services() -> FleetServices {
    FleetServices::in_memory()
}

pub async fn transport(s: &FleetServices, plate: &str) -> Transport {
    transport_with_status(s, plate, TransportStatus::InWork).await
}

pub async fn transport_with_status(s: &FleetServices, plate: &str, status: TransportStatus) -> Transport {
    s.fleet
        .create_transport(CreateTransportRequest {
            plate_number: plate.to_string(),
            brand: Some("Volvo".to_string()),
            model: Some("FH16".to_string()),
            capacity: Decimal::new(18000, 0),
            status: Some(status),
        })
        .await
        .unwrap()
}

pub async fn driver(s: &FleetServices, license: &str) -> Driver {
    s.fleet
        .create_driver(CreateDriverRequest {
            full_name: format!("Driver {}", license),
            license_number: license.to_string(),
            license_classes: vec!["C".to_string(), "CE".to_string()],
            phone: None,
            email: None,
        })
        .await
        .unwrap()
}

pub async fn client(s: &FleetServices, name: &str) -> Client {
    s.clients
        .create_client(CreateClientRequest {
            name: name.to_string(),
            phone: None,
            email: None,
        })
        .await
        .unwrap()
}

pub async fn client_object(s: &FleetServices, client_id: Uuid, name: &str) -> ClientObject {
    s.clients
        .create_client_object(CreateClientObjectRequest {
            client_id,
            name: name.to_string(),
            address: Some("1 Quay Street".to_string()),
        })
        .await
        .unwrap()
}

pub async fn warehouse(s: &FleetServices, name: &str) -> Warehouse {
    s.clients
        .create_warehouse(CreateWarehouseRequest {
            name: name.to_string(),
            address: None,
        })
        .await
        .unwrap()
}

pub fn equipment_request() -> CreateEquipmentRequest {
    CreateEquipmentRequest {
        kind: "container".to_string(),
        condition: "good".to_string(),
        volume: Decimal::new(20, 0),
        number: None,
        client_object_id: None,
        warehouse_id: None,
    }
}

pub async fn loose_equipment(s: &FleetServices) -> Equipment {
    s.equipment.create_equipment(equipment_request()).await.unwrap()
}

pub async fn equipment_in_warehouse(s: &FleetServices, warehouse_id: Uuid) -> Equipment {
    s.equipment
        .create_equipment(CreateEquipmentRequest {
            warehouse_id: Some(warehouse_id),
            ..equipment_request()
        })
        .await
        .unwrap()
}

pub fn order_request(client_id: Uuid, object_id: Uuid) -> CreateOrderRequest {
    CreateOrderRequest {
        client_id,
        object_id,
        transport_id: None,
        driver_id: None,
        priority: 1,
        comment: None,
        planned_at: None,
    }
}

/// Cliente con un objeto y un pedido en DRAFT sobre ese objeto
pub async fn draft_order(s: &FleetServices) -> (Client, ClientObject, Order) {
    let client = client(s, &format!("Client {}", Uuid::new_v4())).await;
    let object = client_object(s, client.id, "Main depot").await;
    let order = s
        .orders
        .create_order(Uuid::new_v4(), order_request(client.id, object.id))
        .await
        .unwrap();
    (client, object, order)
}
