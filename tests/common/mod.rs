#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_storeflex-api"));
        cmd.env("STOREFLEX_API_PORT", port.to_string())
            .env("DATABASE_RUN_MIGRATIONS", "true")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        let url = format!("{}/health", self.base_url);
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Shared server for the whole test binary, or None when no database is configured
pub async fn ensure_server() -> Result<Option<&'static TestServer>> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return Ok(None);
    }

    let server = SERVER.get_or_init(|| match TestServer::spawn() {
        Ok(server) => server,
        Err(e) => panic!("failed to spawn server binary: {:#}", e),
    });
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(Some(server))
}

/// A freshly registered store with a logged-in merchant
pub struct Merchant {
    pub tenant_id: String,
    pub slug: String,
    pub email: String,
    pub token: String,
}

pub async fn register_merchant(server: &TestServer, client: &reqwest::Client) -> Result<Merchant> {
    let suffix = Uuid::new_v4().simple().to_string()[..10].to_string();
    let store_name = format!("Shop {}", suffix);
    let email = format!("owner-{}@shop.test", suffix);
    let password = "correct-horse-battery";

    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({"storeName": store_name, "email": email, "password": password}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
    let body: Value = res.json().await?;
    let tenant_id = body["data"]["tenantId"].as_str().context("tenantId missing")?.to_string();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;
    let token = body["data"]["token"].as_str().context("token missing")?.to_string();

    Ok(Merchant {
        tenant_id,
        slug: format!("shop-{}", suffix),
        email,
        token,
    })
}
