//! Shared test helpers for integration tests.
//!
//! Tests run against the PostgreSQL named by `VOLUNHUB_TEST_DATABASE_URL`
//! (or `DATABASE_URL`). Without one, [`TestApp::new`] returns `None` and
//! the test returns early. Every test creates its own users with unique
//! emails, so tests never depend on each other's rows.

#![allow(dead_code)]

use sqlx::PgPool;
use uuid::Uuid;

use volunhub_core::config::DatabaseConfig;
use volunhub_database::DataStore;
use volunhub_database::migration::run_migrations;
use volunhub_entity::opportunity::{NewOpportunity, Opportunity};
use volunhub_entity::user::{NewUser, User, UserRole};

/// Test application context
pub struct TestApp {
    /// Every repository over one pool
    pub store: DataStore,
}

impl TestApp {
    /// Connect and migrate, or `None` when no test database is configured.
    pub async fn new() -> Option<Self> {
        let url = database_url()?;

        let mut config = DatabaseConfig::with_url(url);
        config.max_connections = 5;
        config.min_connections = 0;

        let store = DataStore::open(&config)
            .await
            .expect("Failed to connect to test database");
        run_migrations(&store.db)
            .await
            .expect("Failed to run migrations");

        Some(Self { store })
    }

    /// Direct pool access for assertions on raw rows.
    pub fn pool(&self) -> &PgPool {
        self.store.db.pool()
    }

    /// Create a user with a unique email.
    pub async fn create_user(&self, name: &str, role: UserRole) -> User {
        self.store
            .users
            .create_user(new_user(name, role))
            .await
            .expect("Failed to create test user")
    }

    /// Create a volunteer with a unique email.
    pub async fn create_volunteer(&self, name: &str) -> User {
        self.create_user(name, UserRole::Volunteer).await
    }

    /// Create an organization with a unique email.
    pub async fn create_organization(&self, name: &str) -> User {
        self.create_user(name, UserRole::Organization).await
    }

    /// Post an opportunity for `organization_id`.
    pub async fn create_opportunity(&self, organization_id: Uuid, title: &str, points: i32) -> Opportunity {
        self.store
            .opportunities
            .create_opportunity(new_opportunity(organization_id, title, points))
            .await
            .expect("Failed to create test opportunity")
    }

    /// Make every notification insert for `user_id` raise, simulating a
    /// failed write in the middle of a transaction.
    pub async fn fail_notifications_for(&self, user_id: Uuid) -> FailureInjection {
        let name = format!("fail_notify_{}", user_id.simple());

        sqlx::query(&format!(
            "CREATE FUNCTION {name}() RETURNS trigger LANGUAGE plpgsql AS $$ \
             BEGIN RAISE EXCEPTION 'injected notification failure'; END; $$"
        ))
        .execute(self.pool())
        .await
        .expect("Failed to create failure function");

        sqlx::query(&format!(
            "CREATE TRIGGER {name} BEFORE INSERT ON notifications FOR EACH ROW \
             WHEN (NEW.user_id = '{user_id}'::uuid) EXECUTE FUNCTION {name}()"
        ))
        .execute(self.pool())
        .await
        .expect("Failed to create failure trigger");

        FailureInjection { name }
    }

    /// Remove a trigger installed by [`TestApp::fail_notifications_for`].
    pub async fn clear_failure(&self, injection: FailureInjection) {
        sqlx::query(&format!("DROP TRIGGER IF EXISTS {} ON notifications", injection.name))
            .execute(self.pool())
            .await
            .expect("Failed to drop failure trigger");
        sqlx::query(&format!("DROP FUNCTION IF EXISTS {}()", injection.name))
            .execute(self.pool())
            .await
            .expect("Failed to drop failure function");
    }
}

/// Handle to an installed notification failure trigger.
pub struct FailureInjection {
    name: String,
}

/// URL of the test database, or `None` when none is configured.
pub fn database_url() -> Option<String> {
    let url = std::env::var("VOLUNHUB_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok();
    if url.is_none() {
        eprintln!("skipping: VOLUNHUB_TEST_DATABASE_URL is not set");
    }
    url
}

/// An email nobody else uses.
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.test", Uuid::new_v4().simple())
}

/// A marker string unique to one test, for keyword filters.
pub fn unique_marker() -> String {
    format!("mk{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Input for a user with a unique email and no attributes.
pub fn new_user(name: &str, role: UserRole) -> NewUser {
    NewUser {
        email: unique_email(&name.to_lowercase().replace(' ', ".")),
        name: name.to_string(),
        role,
        password_hash: "$argon2id$v=19$m=19456,t=2,p=1$test$hash".to_string(),
        profile_picture_url: None,
        bio: None,
        skills: vec![],
        causes: vec![],
        badges: vec![],
    }
}

/// Input for an opportunity with placeholder text fields.
pub fn new_opportunity(organization_id: Uuid, title: &str, points: i32) -> NewOpportunity {
    NewOpportunity {
        organization_id,
        title: title.to_string(),
        description: format!("Help out with {title}."),
        location: "Lisbon".to_string(),
        commitment: "One-time".to_string(),
        category: "Community".to_string(),
        points_awarded: points,
        image_url: None,
        required_skills: vec![],
        application_deadline: None,
        event_start_date: None,
        event_end_date: None,
    }
}
