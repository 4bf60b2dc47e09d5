//! Shared fixtures: an in-memory SQLite database with every migration
//! applied, services wired onto it and a mocked blob store.

#![allow(dead_code)]

use std::sync::Arc;

use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database as SeaDatabase, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use realty_api::config::Config;
use realty_api::domain::{
    Actor, AgentDraft, AreaDraft, PropertyDetail, PropertyDraft, PropertyStatus, PropertyType,
    RegisterUser, Role,
};
use realty_api::infra::{Migrator, MockBlobStore, Persistence, UnitOfWork, Upload};
use realty_api::services::{ServiceContainer, Services};

pub const PASSWORD: &str = "Secret123!";
pub const JWT_SECRET: &str = "test-secret-key-with-at-least-32-chars";

/// One connection: every pool checkout sees the same in-memory database.
pub async fn connect() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = SeaDatabase::connect(options).await.expect("sqlite connects");
    Migrator::up(&db, None).await.expect("migrations apply");
    db
}

pub fn test_config() -> Config {
    Config::with_secret("sqlite::memory:", JWT_SECRET)
}

/// Blob store that accepts everything and returns a media URL
pub fn accepting_blobs() -> MockBlobStore {
    let mut blobs = MockBlobStore::new();
    blobs
        .expect_store()
        .returning(|upload, destination| Ok(format!("/media/{}/{}", destination, upload.file_name)));
    blobs
}

pub fn upload(name: &str) -> Upload {
    Upload::new(name, vec![0xFF, 0xD8, 0xFF])
}

pub struct TestApp {
    pub db: DatabaseConnection,
    pub uow: Persistence,
    pub services: Services,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_blobs(accepting_blobs()).await
    }

    pub async fn with_blobs(blobs: MockBlobStore) -> Self {
        let db = connect().await;
        let services = Services::with_blob_store(db.clone(), test_config(), Arc::new(blobs));
        Self {
            uow: Persistence::new(db.clone()),
            db,
            services,
        }
    }

    /// Register an account, grant it `roles` on top of `user` and sign it in.
    pub async fn user(&self, email: &str, roles: &[Role]) -> Actor {
        let user = self
            .services
            .auth()
            .register(registration(email))
            .await
            .expect("account registers");

        for role in roles.iter().copied() {
            let user_id = user.id;
            self.uow
                .transaction(move |tx| {
                    Box::pin(async move { tx.accounts().grant_role(user_id, role).await })
                })
                .await
                .expect("role granted");
        }

        self.sign_in(email).await
    }

    pub async fn admin(&self) -> Actor {
        self.user("admin@example.com", &[Role::Admin]).await
    }

    /// Resolve the account the way a request would: login, then token lookup.
    pub async fn sign_in(&self, email: &str) -> Actor {
        let auth = self.services.auth();
        let token = auth
            .login(email.to_string(), PASSWORD.to_string())
            .await
            .expect("login succeeds");
        let principal = auth
            .authenticate(&token.access_token)
            .await
            .expect("token resolves");
        Actor::User(principal)
    }

    /// An account with an agent profile, created by `admin`.
    pub async fn agent(&self, email: &str, admin: &Actor) -> Actor {
        let actor = self.user(email, &[]).await;
        let draft = AgentDraft {
            user_id: actor.user_id().expect("signed in"),
            bio: "Waterfront specialist".to_string(),
            specialties: "Penthouses".to_string(),
            years_of_experience: 4,
        };
        self.services
            .agents()
            .create(admin, draft)
            .await
            .expect("agent profile created");
        self.sign_in(email).await
    }

    pub async fn area(&self, admin: &Actor, name: &str) -> Uuid {
        self.services
            .areas()
            .create(admin, area_draft(name), Vec::new(), None)
            .await
            .expect("area created")
            .id
    }

    pub async fn property(&self, actor: &Actor, draft: PropertyDraft) -> PropertyDetail {
        self.services
            .properties()
            .create(actor, draft, Vec::new())
            .await
            .expect("property created")
    }
}

pub fn registration(email: &str) -> RegisterUser {
    RegisterUser {
        email: email.to_string(),
        password: PASSWORD.to_string(),
        password2: PASSWORD.to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        phone_number: None,
    }
}

pub fn area_draft(name: &str) -> AreaDraft {
    AreaDraft {
        name: name.to_string(),
        description: format!("{} description", name),
        featured: false,
        latitude: None,
        longitude: None,
        perks: Vec::new(),
        guide_data: None,
    }
}

pub fn property_draft(title: &str, price: &str, area_id: Option<Uuid>) -> PropertyDraft {
    PropertyDraft {
        title: title.to_string(),
        description: "Bright unit close to the water".to_string(),
        property_type: PropertyType::Apartment,
        status: PropertyStatus::ForSale,
        price: price.parse::<Decimal>().expect("valid price"),
        bedrooms: 2,
        bathrooms: 2,
        area_sqm: 120,
        agent_id: None,
        area_id,
        address: "1 Marina Walk".to_string(),
        latitude: None,
        longitude: None,
        is_featured: false,
        features: Vec::new(),
    }
}

pub fn money(value: &str) -> Decimal {
    value.parse().expect("valid decimal")
}
