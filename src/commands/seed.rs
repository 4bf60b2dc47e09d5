//! Seed command - Initial accounts and reference data.
//!
//! Every step is idempotent: existing accounts, features and areas are
//! left as they are, so the command can be re-run safely.

use uuid::Uuid;

use crate::cli::args::SeedArgs;
use crate::config::{Config, SEED_AREAS, SEED_FEATURES};
use crate::domain::{
    normalize_email, Actor, AgentDraft, AreaDraft, Principal, RegisterUser, Role,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{Database, Persistence, UnitOfWork};
use crate::services::{ServiceContainer, Services};

const DEMO_AGENT_EMAIL: &str = "agent@example.com";

/// Execute the seed command
pub async fn execute(args: SeedArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config).await?;
    let uow = Persistence::new(db.get_connection());
    let services = Services::from_connection(db.get_connection(), config);

    let admin_id = ensure_account(
        &services,
        &uow,
        &args.admin_email,
        &args.admin_password,
        ("Admin", "User"),
    )
    .await?;
    uow.transaction(move |tx| {
        Box::pin(async move { tx.accounts().grant_role(admin_id, Role::Superadmin).await })
    })
    .await?;
    tracing::info!(user_id = %admin_id, "Superadmin ready");

    let features = uow
        .transaction(|tx| {
            Box::pin(async move {
                let properties = tx.properties();
                for name in SEED_FEATURES {
                    properties.get_or_create_feature(name).await?;
                }
                Ok(SEED_FEATURES.len())
            })
        })
        .await?;
    tracing::info!(count = features, "Common property features ready");

    if args.no_demo {
        return Ok(());
    }

    let admin = Actor::User(Principal {
        user_id: admin_id,
        roles: [Role::User, Role::Superadmin].into_iter().collect(),
        agent_id: None,
    });

    let agent_user = ensure_account(
        &services,
        &uow,
        DEMO_AGENT_EMAIL,
        &args.admin_password,
        ("Agent", "User"),
    )
    .await?;
    if uow.reader().accounts().agent_for_user(agent_user).await?.is_none() {
        let draft = AgentDraft {
            user_id: agent_user,
            bio: "Experienced real estate agent specializing in luxury properties.".to_string(),
            specialties: "Luxury Villas, Penthouses".to_string(),
            years_of_experience: 5,
        };
        services.agents().create(&admin, draft).await?;
    }

    let mut created = 0;
    for (name, description) in SEED_AREAS {
        if uow.reader().areas().find_by_name(name).await?.is_some() {
            continue;
        }
        let draft = AreaDraft {
            name: name.to_string(),
            description: description.to_string(),
            featured: true,
            latitude: None,
            longitude: None,
            perks: Vec::new(),
            guide_data: None,
        };
        services.areas().create(&admin, draft, Vec::new(), None).await?;
        created += 1;
    }
    tracing::info!(created, "Featured areas ready");

    Ok(())
}

/// Register the account unless the email is taken; returns its id either way.
async fn ensure_account(
    services: &Services,
    uow: &Persistence,
    email: &str,
    password: &str,
    (first_name, last_name): (&str, &str),
) -> AppResult<Uuid> {
    let request = RegisterUser {
        email: email.to_string(),
        password: password.to_string(),
        password2: password.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        phone_number: None,
    };

    match services.auth().register(request).await {
        Ok(user) => {
            println!("Created {}", user.email);
            Ok(user.id)
        }
        Err(AppError::Conflict(_)) => {
            let user = uow
                .users()
                .find_by_email(&normalize_email(email))
                .await?
                .ok_or_not_found()?;
            Ok(user.id)
        }
        Err(e) => Err(e),
    }
}
