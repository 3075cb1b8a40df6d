//! Client self-registration through the session controller.

mod common;

use std::sync::Arc;

use barber_link::{
    BarberLinkClient, BarberLinkError, RegistrationForm, Role, SessionController,
};
use common::{profile, FakeIdentity, FakeProfiles, FakeServer, TEST_TIMEOUT};
use serde_json::json;
use tokio::time::timeout;

fn form() -> RegistrationForm {
    RegistrationForm {
        name: "Maria Souza".into(),
        email: "maria@teste.com".into(),
        cpf: "123.456.789-00".into(),
        birth_date: "15-03-1992".into(),
        address: "Rua das Flores, 10".into(),
        password: "senha123".into(),
    }
}

fn controller_for(server: &FakeServer, identity: Arc<FakeIdentity>) -> SessionController {
    let client = Arc::new(
        BarberLinkClient::builder()
            .base_url(server.api_url())
            .build()
            .unwrap(),
    );
    let profiles = FakeProfiles::new().with_profile(profile(
        "uid-maria",
        "Maria Souza",
        "maria@teste.com",
        Role::Client,
    ));
    SessionController::builder()
        .identity(identity)
        .profiles(profiles)
        .registrar(client)
        .start()
        .unwrap()
}

#[tokio::test]
async fn test_sign_up_posts_client_and_signs_in() {
    let server = FakeServer::start(|_| (201, json!({ "message": "Cliente criado" }))).await;
    // The backend creates the identity account alongside the client record
    let identity = FakeIdentity::new().with_account("maria@teste.com", "senha123", "uid-maria");
    let controller = controller_for(&server, identity.clone());

    controller.sign_up(&form()).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/api/clientes");
    assert_eq!(
        request.json(),
        json!({
            "name": "Maria Souza",
            "email": "maria@teste.com",
            "senha": "senha123",
            "CPF": "123.456.789-00",
            "dataNascimento": "15-03-1992",
            "endereco": "Rua das Flores, 10",
            "role": "cliente",
        })
    );

    assert_eq!(
        identity.sign_in_calls(),
        vec![("maria@teste.com".to_string(), "senha123".to_string())]
    );
    let session = timeout(TEST_TIMEOUT, controller.session().wait_until(|s| s.is_authenticated()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.user().unwrap().role, Role::Client);
}

#[tokio::test]
async fn test_sign_up_trims_fields() {
    let server = FakeServer::start(|_| (201, json!({}))).await;
    let identity = FakeIdentity::new().with_account("maria@teste.com", "senha123", "uid-maria");
    let controller = controller_for(&server, identity);

    let mut padded = form();
    padded.email = "  maria@teste.com ".into();
    padded.name = " Maria Souza".into();
    controller.sign_up(&padded).await.unwrap();

    let body = server.last_request().json();
    assert_eq!(body["email"], "maria@teste.com");
    assert_eq!(body["name"], "Maria Souza");
}

#[tokio::test]
async fn test_missing_fields_never_reach_backend() {
    let server = FakeServer::start(|_| (201, json!({}))).await;
    let identity = FakeIdentity::new();
    let controller = controller_for(&server, identity.clone());

    let mut incomplete = form();
    incomplete.cpf = "   ".into();
    incomplete.address.clear();
    let err = controller.sign_up(&incomplete).await.unwrap_err();

    assert!(matches!(err, BarberLinkError::ValidationError(_)));
    let message = err.user_message();
    assert!(message.contains("CPF"));
    assert!(message.contains("endereço"));
    assert!(server.requests().is_empty());
    assert!(identity.sign_in_calls().is_empty());
}

#[tokio::test]
async fn test_backend_rejection_skips_sign_in() {
    let server =
        FakeServer::start(|_| (400, json!({ "message": "E-mail já cadastrado" }))).await;
    let identity = FakeIdentity::new();
    let controller = controller_for(&server, identity.clone());

    let err = controller.sign_up(&form()).await.unwrap_err();

    match err {
        BarberLinkError::ServerError {
            status_code,
            message,
        } => {
            assert_eq!(status_code, 400);
            assert_eq!(message, "E-mail já cadastrado");
        },
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(identity.sign_in_calls().is_empty());
}
