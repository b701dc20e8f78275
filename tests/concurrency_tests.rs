//! Carreras de asignación: de dos llamadas concurrentes sobre el mismo
//! conductor o equipo, exactamente una gana.

mod common;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use fleet_logistics::models::Client;
use fleet_logistics::repositories::{ClientStore, StoreResult, Visibility};
use fleet_logistics::services::{FleetServices, Stores};
use fleet_logistics::utils::errors::ErrorKind;

use common::*;

const ROUNDS: usize = 25;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_driver_assignment_has_one_winner() {
    for round in 0..ROUNDS {
        let s = services();
        let t1 = transport(&s, &format!("A-{}", round)).await;
        let t2 = transport(&s, &format!("B-{}", round)).await;
        let d1 = driver(&s, &format!("LIC-{}", round)).await;

        let first = tokio::spawn({
            let assignments = s.assignments.clone();
            async move { assignments.assign_driver(t1.id, d1.id).await }
        });
        let second = tokio::spawn({
            let assignments = s.assignments.clone();
            async move { assignments.assign_driver(t2.id, d1.id).await }
        });
        let results = [first.await.unwrap(), second.await.unwrap()];

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "round {}: {:?}", round, results);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind(), ErrorKind::Conflict);

        let holders = s
            .fleet
            .list_transports(Visibility::ActiveOnly)
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.current_driver_id == Some(d1.id))
            .count();
        assert_eq!(holders, 1);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_equipment_assignment_has_one_winner() {
    for round in 0..ROUNDS {
        let s = services();
        let t1 = transport(&s, &format!("A-{}", round)).await;
        let t2 = transport(&s, &format!("B-{}", round)).await;
        let e1 = loose_equipment(&s).await;

        let first = tokio::spawn({
            let assignments = s.assignments.clone();
            async move { assignments.assign_equipment(t1.id, e1.id).await }
        });
        let second = tokio::spawn({
            let assignments = s.assignments.clone();
            async move { assignments.assign_equipment(t2.id, e1.id).await }
        });
        let results = [first.await.unwrap(), second.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1, "round {}", round);
        let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
        assert_eq!(loser.kind(), ErrorKind::Conflict);

        let mounted = s.equipment.get_equipment(e1.id, Visibility::ActiveOnly).await.unwrap();
        let winner = mounted.transport_id.unwrap();
        let carrier = s.fleet.get_transport(winner, Visibility::ActiveOnly).await.unwrap();
        assert_eq!(carrier.current_equipment_id, Some(e1.id));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_delete_racing_assignment_leaves_consistent_state() {
    for round in 0..ROUNDS {
        let s = services();
        let t1 = transport(&s, &format!("A-{}", round)).await;
        let d1 = driver(&s, &format!("LIC-{}", round)).await;

        let assign = tokio::spawn({
            let assignments = s.assignments.clone();
            async move { assignments.assign_driver(t1.id, d1.id).await }
        });
        let delete = tokio::spawn({
            let lifecycle = s.lifecycle.clone();
            async move { lifecycle.delete_driver(d1.id).await }
        });
        let assigned = assign.await.unwrap();
        let deleted = delete.await.unwrap();

        // Nunca un transporte activo apuntando a un conductor borrado
        let transport = s.fleet.get_transport(t1.id, Visibility::ActiveOnly).await.unwrap();
        let driver_row = s.fleet.get_driver(d1.id, Visibility::IncludeDeleted).await.unwrap();
        if transport.current_driver_id == Some(d1.id) {
            assert!(driver_row.deleted_at.is_none(), "round {}", round);
            assert!(assigned.is_ok());
        }
        assert!(assigned.is_ok() || deleted.is_ok());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_restore_racing_parent_delete_leaves_consistent_state() {
    for round in 0..ROUNDS {
        let s = services();
        let c1 = client(&s, &format!("Client {}", round)).await;
        let o1 = client_object(&s, c1.id, "Site A").await;
        s.lifecycle.delete_client_object(o1.id).await.unwrap();

        let restore = tokio::spawn({
            let lifecycle = s.lifecycle.clone();
            async move { lifecycle.restore_client_object(o1.id).await }
        });
        let delete = tokio::spawn({
            let lifecycle = s.lifecycle.clone();
            async move { lifecycle.delete_client(c1.id).await }
        });
        let restored = restore.await.unwrap();
        let deleted = delete.await.unwrap();

        // Nunca un objeto activo colgando de un cliente borrado
        assert!(!(restored.is_ok() && deleted.is_ok()), "round {}", round);
        let object = s.clients.get_client_object(o1.id, Visibility::IncludeDeleted).await.unwrap();
        let parent = s.clients.get_client(c1.id, Visibility::IncludeDeleted).await.unwrap();
        if object.deleted_at.is_none() {
            assert!(parent.deleted_at.is_none(), "round {}", round);
        }
    }
}

/// Almacén de clientes que borra el cliente justo después de servir su lectura
struct DeleteAfterRead {
    inner: Arc<dyn ClientStore>,
    armed: AtomicBool,
}

#[async_trait]
impl ClientStore for DeleteAfterRead {
    async fn insert_client(&self, client: &Client) -> StoreResult<Client> {
        self.inner.insert_client(client).await
    }

    async fn get_client(&self, id: Uuid, visibility: Visibility) -> StoreResult<Option<Client>> {
        let found = self.inner.get_client(id, visibility).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.inner.soft_delete_client(id).await?;
        }
        Ok(found)
    }

    async fn list_clients(&self, visibility: Visibility) -> StoreResult<Vec<Client>> {
        self.inner.list_clients(visibility).await
    }

    async fn update_client(&self, client: &Client) -> StoreResult<Option<Client>> {
        self.inner.update_client(client).await
    }

    async fn soft_delete_client(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.soft_delete_client(id).await
    }

    async fn restore_client(&self, id: Uuid) -> StoreResult<bool> {
        self.inner.restore_client(id).await
    }

    async fn client_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        self.inner.client_name_taken(name, exclude).await
    }
}

#[tokio::test]
async fn test_restore_fails_when_parent_is_deleted_after_check() {
    let stores = Stores::in_memory();
    let s = FleetServices::new(stores.clone());
    let c1 = client(&s, "Acme").await;
    let o1 = client_object(&s, c1.id, "Site A").await;
    s.lifecycle.delete_client_object(o1.id).await.unwrap();

    let racing = FleetServices::new(Stores {
        clients: Arc::new(DeleteAfterRead {
            inner: stores.clients.clone(),
            armed: AtomicBool::new(true),
        }),
        ..stores.clone()
    });
    let err = racing.lifecycle.restore_client_object(o1.id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let parent = s.clients.get_client(c1.id, Visibility::IncludeDeleted).await.unwrap();
    assert!(parent.deleted_at.is_some());
    let object = s.clients.get_client_object(o1.id, Visibility::IncludeDeleted).await.unwrap();
    assert!(object.deleted_at.is_some());
}
