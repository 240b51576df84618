use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use uuid::Uuid;

use menu_api::auth::{generate_jwt, Claims};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/menu-api");
        cmd.env("MENU_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server sees DATABASE_URL and JWT_SECRET
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self {
            port,
            base_url,
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Consider server ready on any liveness response
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// DB-backed cases only run when a database is configured; everything else
/// exercises the server without one.
pub fn db_configured() -> bool {
    std::env::var("DATABASE_URL").is_ok()
}

/// Mint a token for a synthetic principal holding the given role names.
/// Test process and spawned server share the same JWT secret via env.
pub fn bearer_token(roles: &[&str]) -> String {
    let claims = Claims::new(
        Uuid::new_v4(),
        "integration-test".to_string(),
        roles.iter().map(|r| r.to_string()).collect(),
    );
    generate_jwt(claims).expect("failed to sign test JWT")
}

/// Seed a role directly and return its id; role administration is outside
/// this service's HTTP surface. Uses a short-lived connection so each test
/// runtime owns its own IO.
pub async fn seed_role(name: &str) -> Result<i32> {
    use sqlx::Connection;

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let mut conn = sqlx::PgConnection::connect(&url).await?;
    let (id,): (i32,) = sqlx::query_as(
        "INSERT INTO roles (name) VALUES ($1)
         ON CONFLICT (name) DO UPDATE SET updated_at = now()
         RETURNING id",
    )
    .bind(name)
    .fetch_one(&mut conn)
    .await?;
    Ok(id)
}
