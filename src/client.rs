use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use crate::schema::{LoginResponse, Profile, Tenant};

#[derive(Debug, Clone)]
pub struct ResponseData {
    pub status: u16,
    pub body: String,
    pub json: Option<Value>,
}

impl ResponseData {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).context("parsing response body")
    }

    /// Detailed diagnostic print for failed calls.
    pub fn dump(&self) {
        println!("RESPONSE: HTTP {}", self.status);
        match &self.json {
            Some(json) => println!(
                "{}",
                serde_json::to_string_pretty(json).unwrap_or_else(|_| self.body.clone())
            ),
            None => println!("{}", self.body),
        }
    }
}

/// Authenticated session against the controller. Holds the auth token and the
/// tenant identity resolved at login time.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: Url,
    http: Client,
    token: Option<String>,
    pub tenant_id: Option<String>,
    pub tenant_name: Option<String>,
}

impl ApiClient {
    pub fn new(controller: &str) -> Result<Self> {
        let parsed = Url::parse(controller).context("parsing controller URL")?;
        let http = Client::builder()
            .user_agent(HeaderValue::from_static("pcmctl/0.1"))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            base_url: parsed,
            http,
            token: None,
            tenant_id: None,
            tenant_name: None,
        })
    }

    pub fn controller(&self) -> &str {
        self.base_url.as_str()
    }

    /// Bearer-token login. A token that does not resolve to a tenant is a
    /// hard failure.
    pub fn login_token(&mut self, token: &str) -> Result<()> {
        self.token = Some(token.to_string());
        if !self.fetch_tenant()? {
            bail!("AUTH_TOKEN login failure, please check token");
        }
        Ok(())
    }

    /// Credential login. `Ok(false)` means the controller rejected the
    /// credentials; transport problems are `Err`.
    pub fn login_password(&mut self, email: &str, password: &str) -> Result<bool> {
        let body = serde_json::json!({ "email": email, "password": password });
        let resp = self.post_json("v2.0/api/login", &body)?;
        if !resp.ok() {
            return Ok(false);
        }
        let login: LoginResponse = resp.parse()?;
        let Some(token) = login.x_auth_token else {
            return Ok(false);
        };
        self.token = Some(token);
        self.fetch_tenant()
    }

    /// Best-effort session teardown.
    pub fn logout(&self) {
        if let Err(e) = self.get("v2.0/api/logout") {
            println!("WARN: logout failed ({e})");
        }
    }

    fn fetch_tenant(&mut self) -> Result<bool> {
        let resp = self.get("v2.0/api/profile")?;
        if !resp.ok() {
            return Ok(false);
        }
        let profile: Profile = resp.parse()?;
        let Some(tenant_id) = profile.tenant_id else {
            return Ok(false);
        };

        let resp = self.get(&format!("v2.0/api/tenants/{tenant_id}"))?;
        if resp.ok() {
            let tenant: Tenant = resp.parse()?;
            self.tenant_name = Some(tenant.name);
        }
        self.tenant_id = Some(tenant_id);
        Ok(true)
    }

    pub fn get(&self, path: &str) -> Result<ResponseData> {
        self.request(Method::GET, path, Option::<&Value>::None)
    }

    pub fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ResponseData> {
        self.request(Method::POST, path, Some(body))
    }

    fn request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> Result<ResponseData> {
        let normalized = path.trim_start_matches('/');
        let url = self
            .base_url
            .join(normalized)
            .with_context(|| format!("joining path `{}` to controller URL", path))?;

        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(USER_AGENT, HeaderValue::from_static("pcmctl/0.1"));

        if let Some(token) = &self.token {
            request = request.header("x-auth-token", token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().context("sending request")?;
        let status = response.status().as_u16();
        let text = response.text().context("reading response body")?;
        let json = serde_json::from_str(&text).ok();

        Ok(ResponseData {
            status,
            body: text,
            json,
        })
    }
}
