//! REST client against a local backend stand-in.

mod common;

use barber_link::booking::parse_date_input;
use barber_link::{
    AppointmentStatus, BarberLinkClient, BarberLinkError, BookingWizard, ImageUpload,
    MemoryTokenStore, NewUser, ProfilePatch, Role, ScreenScope, ServiceDraft, Slot, TokenStore,
};
use common::{FakeServer, RecordedRequest};
use serde_json::{json, Value};
use std::sync::Arc;

fn client_for(server: &FakeServer) -> BarberLinkClient {
    BarberLinkClient::builder()
        .base_url(server.api_url())
        .build()
        .unwrap()
}

fn appointment_json() -> Value {
    json!({
        "_id": "ag-1",
        "cliente": "client-1",
        "usuario": { "_id": "barber-1", "name": "João Barbeiro" },
        "servicos": [
            {
                "servico": { "_id": "svc-1", "name": "Corte", "price": "35", "duracao": "30" },
                "quantidade": 1
            }
        ],
        "dataAgendamento": "2025-12-25T18:00:00.000Z",
        "status": "pendente"
    })
}

fn backend(req: &RecordedRequest) -> (u16, Value) {
    match (req.method.as_str(), req.path_only()) {
        ("GET", "/api/servicos") => (
            200,
            json!({
                "data": [
                    { "_id": "svc-1", "name": "Corte", "price": "35.5", "duracao": 30, "isActive": true },
                    { "_id": "svc-2", "name": "Barba", "price": 20, "duracao": "20", "isActive": false },
                    { "_id": "svc-3", "name": "Sobrancelha", "price": 10, "duracao": 10 }
                ]
            }),
        ),
        ("POST", "/api/servicos") => (
            201,
            json!({ "_id": "svc-9", "name": "Pigmentação", "price": 50, "duracao": 45 }),
        ),
        ("GET", "/api/usuarios") => (
            200,
            json!([
                { "_id": "barber-1", "name": "João Barbeiro", "email": "joao@teste.com", "role": "barbeiro" }
            ]),
        ),
        ("POST", "/api/usuarios") => {
            let body = req.json();
            (
                201,
                json!({
                    "_id": "u-new",
                    "name": body["name"],
                    "email": body["email"],
                    "role": body["role"],
                }),
            )
        },
        ("PUT", "/api/usuarios/u-1") | ("POST", "/api/usuarios/u-1/avatar") => (
            200,
            json!({
                "_id": "u-1",
                "name": "Claudio Arruda",
                "email": "claudio@teste.com",
                "role": "cliente",
                "telefone": "(11) 90000-0000",
                "avatar": "https://cdn.test/u-1.jpg"
            }),
        ),
        ("POST", "/api/usuarios/u-1/reset-senha") => (200, json!({ "message": "ok" })),
        ("GET", "/api/agendamentos/disponibilidade") => {
            (200, json!({ "horarios": ["15:00", "09:00", "15:00", "10:30"] }))
        },
        ("POST", "/api/agendamentos") => (201, appointment_json()),
        ("GET", "/api/agendamentos/filtrados") => (200, json!([appointment_json()])),
        ("PUT", "/api/agendamentos/ag-1") => (200, json!({ "message": "Status atualizado" })),
        ("GET", "/api/relatorios/mensal") => (
            200,
            json!({
                "mes": 12,
                "ano": 2025,
                "totalAgendamentos": 40,
                "faturamento": 1800.5,
                "servicosMaisVendidos": [{ "nome": "Corte", "quantidade": 25 }]
            }),
        ),
        ("DELETE", "/api/servicos/svc-2") => (204, Value::Null),
        ("GET", "/api/agendamentos") => (500, json!({ "error": "Erro interno" })),
        _ => (404, json!({ "message": "Usuário não encontrado" })),
    }
}

#[tokio::test]
async fn test_list_services_filters_inactive() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let services = client.list_services(false).await.unwrap();
    let ids: Vec<&str> = services.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["svc-1", "svc-3"]);
    assert_eq!(services[0].price, 35.5);
    assert_eq!(services[0].duration_minutes, 30);

    let all = client.list_services(true).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_create_service_sends_multipart() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let draft = ServiceDraft::new("Pigmentação", 50.0, 45)
        .with_image(ImageUpload::jpeg("pig.jpg", vec![0xFF, 0xD8, 0xFF]));
    let created = client.create_service(draft).await.unwrap();
    assert_eq!(created.id, "svc-9");

    let request = server.last_request();
    assert!(request
        .content_type
        .as_deref()
        .is_some_and(|ct| ct.starts_with("multipart/form-data")));
    assert!(request.body.contains("name=\"name\""));
    assert!(request.body.contains("Pigmentação"));
    assert!(request.body.contains("name=\"duracao\""));
    assert!(request.body.contains("filename=\"pig.jpg\""));
}

#[tokio::test]
async fn test_invalid_service_draft_is_not_sent() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let err = client
        .create_service(ServiceDraft::new("Corte", 30.0, 0))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Duração inválida.");
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_booking_flow_end_to_end() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let mut wizard = BookingWizard::with_default_offset("client-1");
    wizard.toggle_service("svc-1");
    wizard.toggle_service("svc-3");
    wizard.select_professional("barber-1");
    wizard
        .select_date(parse_date_input("2025-12-25").unwrap())
        .unwrap();
    assert!(wizard.can_query_slots());

    let slots = client
        .available_slots(
            wizard.professional().unwrap(),
            wizard.date().unwrap(),
            wizard.selected_services(),
        )
        .await
        .unwrap();
    let shown: Vec<String> = slots.iter().map(Slot::to_string).collect();
    assert_eq!(shown, vec!["09:00", "10:30", "15:00"]);
    assert_eq!(
        server.last_request().path,
        "/api/agendamentos/disponibilidade?barbeiroId=barber-1&data=2025-12-25&servicos=svc-1%2Csvc-3"
    );

    wizard.select_slot(slots[2]).unwrap();
    let appointment = client
        .create_appointment(&wizard.assemble().unwrap())
        .await
        .unwrap();
    assert_eq!(appointment.id, "ag-1");
    assert_eq!(appointment.status, AppointmentStatus::Pending);

    assert_eq!(
        server.last_request().json(),
        json!({
            "cliente": "client-1",
            "usuario": "barber-1",
            "dataAgendamento": "2025-12-25T18:00:00.000Z",
            "servicos": [
                { "servico": "svc-1", "quantidade": 1 },
                { "servico": "svc-3", "quantidade": 1 }
            ]
        })
    );
}

#[tokio::test]
async fn test_client_history_and_cancel() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let history = client.client_appointments("client-1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].professional.name(), Some("João Barbeiro"));
    assert_eq!(
        server.last_request().path,
        "/api/agendamentos/filtrados?clienteId=client-1&dataInicio=2000-01-01&dataFim=2100-01-01"
    );

    client.cancel_appointment("ag-1").await.unwrap();
    let request = server.last_request();
    assert_eq!(request.method, "PUT");
    assert_eq!(request.json(), json!({ "status": "cancelado" }));
}

#[tokio::test]
async fn test_user_management() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let barbers = client.list_professionals().await.unwrap();
    assert_eq!(barbers[0].role, Role::Staff);
    assert_eq!(server.last_request().path, "/api/usuarios?role=barbeiro");

    let created = client
        .create_user(&NewUser::staff("Pedro", "pedro@teste.com", None))
        .await
        .unwrap();
    assert_eq!(created.role, Role::Staff);
    let body = server.last_request().json();
    assert_eq!(body["senha"], "mudar123");
    assert_eq!(body["firebase_uid"], "");

    let updated = client
        .update_user("u-1", &ProfilePatch::new().with_phone("(11) 90000-0000"))
        .await
        .unwrap();
    assert_eq!(updated.phone.as_deref(), Some("(11) 90000-0000"));
    assert_eq!(
        server.last_request().json(),
        json!({ "telefone": "(11) 90000-0000" })
    );

    let err = client.update_user("u-1", &ProfilePatch::new()).await.unwrap_err();
    assert!(matches!(err, BarberLinkError::ValidationError(_)));

    client.reset_client_password("u-1").await.unwrap();
    assert_eq!(server.last_request().path, "/api/usuarios/u-1/reset-senha");

    let with_avatar = client
        .upload_avatar("u-1", ImageUpload::jpeg("me.jpg", vec![1, 2, 3]))
        .await
        .unwrap();
    assert_eq!(with_avatar.avatar_url.as_deref(), Some("https://cdn.test/u-1.jpg"));
    assert!(server.last_request().body.contains("name=\"image\""));
}

#[tokio::test]
async fn test_monthly_report() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let report = client.monthly_report(12, 2025).await.unwrap();
    assert_eq!(report.total_appointments, 40);
    assert_eq!(report.top_services[0].name, "Corte");
    assert_eq!(server.last_request().path, "/api/relatorios/mensal?mes=12&ano=2025");

    let err = client.monthly_report(13, 2025).await.unwrap_err();
    assert_eq!(err.user_message(), "Mês inválido.");
}

#[tokio::test]
async fn test_error_statuses() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let err = client.fetch_profile("uid-unknown").await.unwrap_err();
    assert!(matches!(err, BarberLinkError::NotFound(_)));
    assert_eq!(err.user_message(), "Usuário não encontrado");

    let err = client.list_appointments().await.unwrap_err();
    match &err {
        BarberLinkError::ServerError {
            status_code,
            message,
        } => {
            assert_eq!(*status_code, 500);
            assert_eq!(message, "Erro interno");
        },
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(err.is_transient());

    client.delete_service("svc-2").await.unwrap();
}

#[tokio::test]
async fn test_path_ids_are_percent_encoded() {
    let server = FakeServer::start(backend).await;
    let client = client_for(&server);

    let err = client.fetch_profile("a/b c").await.unwrap_err();
    assert!(matches!(err, BarberLinkError::NotFound(_)));
    assert_eq!(server.last_request().path, "/api/usuarios/firebase/a%2Fb%20c");

    let _ = client.delete_service("ção").await;
    assert_eq!(server.last_request().path, "/api/servicos/%C3%A7%C3%A3o");

    client.delete_service("svc-2").await.unwrap();
    assert_eq!(server.last_request().path, "/api/servicos/svc-2");
}

#[tokio::test]
async fn test_bearer_token_from_store() {
    let server = FakeServer::start(backend).await;
    let store = Arc::new(MemoryTokenStore::new());
    let client = BarberLinkClient::builder()
        .base_url(server.api_url())
        .token_store(store.clone())
        .build()
        .unwrap();

    client.list_services(true).await.unwrap();
    assert_eq!(server.last_request().authorization, None);

    store.set_token("tok-abc").unwrap();
    client.list_services(true).await.unwrap();
    assert_eq!(
        server.last_request().authorization.as_deref(),
        Some("Bearer tok-abc")
    );
}

#[tokio::test]
async fn test_screen_scope_discards_superseded_fetch() {
    let server = FakeServer::start(backend).await;
    let client = Arc::new(client_for(&server));
    let scope = ScreenScope::new();

    let first = scope.spawn({
        let client = client.clone();
        async move { client.list_services(false).await }
    });
    scope.restart();
    assert!(first.join().await.is_none());

    let second = scope.spawn({
        let client = client.clone();
        async move { client.list_services(false).await }
    });
    let services = second.join().await.unwrap().unwrap();
    assert_eq!(services.len(), 2);

    scope.teardown();
    let late = scope.spawn(async move { client.list_services(false).await });
    assert!(late.join().await.is_none());
}
