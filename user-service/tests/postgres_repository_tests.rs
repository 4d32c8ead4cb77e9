//! Run with `DATABASE_URL=postgresql://... cargo test -- --ignored`.

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use user_service::domain::user::models::EmailAddress;
use user_service::domain::user::models::User;
use user_service::domain::user::models::UserId;
use user_service::domain::user::ports::UserRepository;
use user_service::outbound::repositories::PostgresUserRepository;
use user_service::user::errors::UserError;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

fn user(email: &EmailAddress) -> User {
    User {
        id: UserId::new(),
        email: email.clone(),
        password_hash: "$argon2id$test_hash".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        created_at: Utc::now(),
    }
}

fn unique_email() -> EmailAddress {
    EmailAddress::new(format!("{}@test.example", uuid::Uuid::new_v4().simple())).unwrap()
}

#[tokio::test]
#[ignore]
async fn test_insert_then_find_by_email() {
    let repository = PostgresUserRepository::new(pool().await);
    let email = unique_email();

    assert!(!repository.exists(&email).await.unwrap());

    let created = repository.insert(user(&email)).await.unwrap();
    let found = repository.find_by_email(&email).await.unwrap().unwrap();

    assert!(repository.exists(&email).await.unwrap());
    assert_eq!(found.id, created.id);
    assert_eq!(found.email, email);
    assert_eq!(found.password_hash, created.password_hash);
}

#[tokio::test]
#[ignore]
async fn test_unique_constraint_maps_to_already_exists() {
    let repository = PostgresUserRepository::new(pool().await);
    let email = unique_email();

    repository.insert(user(&email)).await.unwrap();
    let result = repository.insert(user(&email)).await;

    assert!(matches!(result, Err(UserError::EmailAlreadyExists(_))));
}
