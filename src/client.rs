//! CTFd HTTP client.
//!
//! Talks to a CTFd instance the way a browser does: a session cookie from
//! the landing page, the CSRF nonce scraped out of the `window.init` blob,
//! then JSON under `/api/v1`. All calls are fail-fast — a bad status or a
//! missing session cookie is a definitive failure, never retried.

use crate::config::SavedData;
use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Outcome of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted, session cookie stored
    Success,
    /// The instance rejected the credentials
    BadCredentials,
    /// No session cookie or CSRF nonce could be gathered
    SessionUnavailable,
}

/// Event and account details scraped from the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct CtfdInfo {
    /// Instance name from `<title>`
    pub name: String,
    /// Account details; `id == 0` means not logged in
    pub user: CtfdUser,
    /// Event start, unix seconds
    pub start: i64,
    /// Event end, unix seconds
    pub end: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CtfdUser {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// One challenge as served by `/api/v1/challenges/{id}`.
///
/// Serializes to the same shape `challenge.json` carries in a preserved
/// archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeInfo {
    pub id: u64,
    pub name: String,
    /// Points for a solve
    pub value: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attribution: Option<String>,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Server-relative attachment paths
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub solves: i64,
    #[serde(rename(deserialize = "solved_by_me"), default)]
    pub solved: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: T,
}

#[derive(Debug, Deserialize)]
struct ChallengeId {
    id: u64,
}

/// Blocking CTFd client bound to one instance URL.
pub struct CtfdClient {
    /// Follows redirects; used for page fetches and downloads
    http: reqwest::blocking::Client,
    /// Never follows redirects; login and auth checks read raw 302s
    http_no_redirect: reqwest::blocking::Client,
    url: String,
    cookies: Option<String>,
}

impl CtfdClient {
    /// Create a client for `url`, optionally resuming a saved cookie.
    pub fn new(url: &str, cookies: Option<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .build()
            .context("failed to build HTTP client")?;
        let http_no_redirect = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("failed to build HTTP client")?;

        Ok(CtfdClient {
            http,
            http_no_redirect,
            url: url.trim_end_matches('/').to_string(),
            cookies,
        })
    }

    /// Create a client from saved state; fails if no URL was ever saved.
    pub fn from_saved(saved: &SavedData) -> Result<Self> {
        let url = saved
            .url
            .as_deref()
            .ok_or_else(|| anyhow!("no saved instance; log in first"))?;
        Self::new(url, saved.cookies.clone())
    }

    /// The session cookie gathered so far, for persisting.
    pub fn cookies(&self) -> Option<&str> {
        self.cookies.as_deref()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn cookie_header(&self, req: reqwest::blocking::RequestBuilder) -> reqwest::blocking::RequestBuilder {
        match &self.cookies {
            Some(cookies) => req.header(reqwest::header::COOKIE, cookies.clone()),
            None => req,
        }
    }

    /// Fetch the landing page and keep its session cookie.
    ///
    /// Fails if the instance hands out no cookie containing `session`.
    pub fn gather_session(&mut self) -> Result<()> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .with_context(|| format!("failed to reach {}", self.url))?;

        let cookie = resp
            .headers()
            .get(reqwest::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        match cookie {
            Some(c) if c.contains("session") => {
                self.cookies = Some(c);
                Ok(())
            }
            _ => bail!("{} did not hand out a session cookie", self.url),
        }
    }

    /// Raw landing page HTML, with the session cookie attached if present.
    fn landing_page(&self) -> Result<String> {
        let resp = self
            .cookie_header(self.http.get(&self.url))
            .send()
            .with_context(|| format!("failed to reach {}", self.url))?;
        Ok(resp.text()?)
    }

    /// Event info scraped from the landing page.
    pub fn info(&self) -> Result<CtfdInfo> {
        parse_info(&self.landing_page()?)
    }

    /// The CSRF nonce the login form requires.
    pub fn csrf_nonce(&self) -> Result<String> {
        let init = parse_init(&self.landing_page()?)
            .ok_or_else(|| anyhow!("no window.init blob on the landing page"))?;
        init.get("csrfNonce")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow!("no csrfNonce on the landing page"))
    }

    /// Log in with a fresh session.
    pub fn login(&mut self, username: &str, password: &str) -> Result<LoginOutcome> {
        if self.gather_session().is_err() {
            return Ok(LoginOutcome::SessionUnavailable);
        }
        let nonce = match self.csrf_nonce() {
            Ok(nonce) => nonce,
            Err(_) => return Ok(LoginOutcome::SessionUnavailable),
        };

        let form = reqwest::blocking::multipart::Form::new()
            .text("name", username.to_string())
            .text("password", password.to_string())
            .text("nonce", nonce);

        let resp = self
            .cookie_header(self.http_no_redirect.post(format!("{}/login", self.url)))
            .multipart(form)
            .send()
            .context("login request failed")?;

        // CTFd answers a successful login with a redirect to /challenges
        if resp.status() == reqwest::StatusCode::FOUND {
            if let Some(cookie) = resp
                .headers()
                .get(reqwest::header::SET_COOKIE)
                .and_then(|v| v.to_str().ok())
            {
                self.cookies = Some(cookie.to_string());
            }
            Ok(LoginOutcome::Success)
        } else {
            Ok(LoginOutcome::BadCredentials)
        }
    }

    /// Whether the saved session is still accepted.
    pub fn is_logged_in(&self) -> Result<bool> {
        let resp = self
            .cookie_header(
                self.http_no_redirect
                    .get(format!("{}/api/v1/users/me", self.url)),
            )
            .send()
            .context("auth check failed")?;
        Ok(resp.status() == reqwest::StatusCode::OK)
    }

    /// Fetch the full challenge list, one API call per challenge.
    pub fn fetch_challenges(&self) -> Result<Vec<ChallengeInfo>> {
        if !self.is_logged_in()? {
            bail!("not authenticated; log in first");
        }

        let resp: ApiResponse<Vec<ChallengeId>> = self
            .cookie_header(self.http.get(format!("{}/api/v1/challenges", self.url)))
            .send()
            .context("challenge listing failed")?
            .json()
            .context("challenge listing was not valid JSON")?;

        if !resp.success {
            bail!("challenge listing was rejected by the instance");
        }

        resp.data
            .into_iter()
            .map(|c| self.fetch_challenge(c.id))
            .collect()
    }

    /// Fetch one challenge by id.
    pub fn fetch_challenge(&self, id: u64) -> Result<ChallengeInfo> {
        let resp: ApiResponse<ChallengeInfo> = self
            .cookie_header(
                self.http
                    .get(format!("{}/api/v1/challenges/{id}", self.url)),
            )
            .send()
            .with_context(|| format!("fetching challenge {id} failed"))?
            .json()
            .with_context(|| format!("challenge {id} was not valid JSON"))?;

        if !resp.success {
            bail!("challenge {id} was rejected by the instance");
        }
        Ok(resp.data)
    }

    /// Download one attachment by its server-relative path.
    pub fn download_attachment(&self, server_path: &str, out_path: &Path) -> Result<()> {
        let mut resp = self
            .cookie_header(self.http.get(format!("{}{}", self.url, server_path)))
            .send()
            .with_context(|| format!("downloading {server_path} failed"))?
            .error_for_status()
            .with_context(|| format!("downloading {server_path} failed"))?;

        let mut out = File::create(out_path)
            .with_context(|| format!("failed to create {}", out_path.display()))?;
        resp.copy_to(&mut out)
            .with_context(|| format!("writing {} failed", out_path.display()))?;
        Ok(())
    }
}

/// Bare attachment filename for a server path like
/// `/files/ab12/pwn.zip?token=...`.
pub fn attachment_filename(server_path: &str) -> &str {
    let path = server_path.split('?').next().unwrap_or(server_path);
    path.rsplit('/').next().unwrap_or(path)
}

/// Scrape `<title>` out of a landing page.
fn parse_title(html: &str) -> Option<String> {
    let re = Regex::new(r"(?s)<title>(.+?)</title>").expect("static regex");
    re.captures(html)
        .map(|c| c[1].trim().to_string())
}

/// Scrape the `window.init` blob and coerce it into JSON.
///
/// CTFd emits a quasi-JS object literal with single-quoted strings and an
/// `eventSounds` asset array; both are normalized away before parsing.
fn parse_init(html: &str) -> Option<serde_json::Value> {
    let re = Regex::new(r"(?s)window\.init\s*=\s*(\{.+?\})").expect("static regex");
    let blob = re.captures(html)?[1].replace('\'', "\"");

    let sounds = Regex::new(r#"(?s),\s*"eventSounds".*?\]"#).expect("static regex");
    let blob = sounds.replace_all(&blob, "");

    serde_json::from_str(&blob).ok()
}

/// Build a [`CtfdInfo`] from a landing page.
fn parse_info(html: &str) -> Result<CtfdInfo> {
    let title = parse_title(html).ok_or_else(|| anyhow!("landing page has no title"))?;
    let init = parse_init(html).ok_or_else(|| anyhow!("no window.init blob on the landing page"))?;

    let str_field = |key: &str| {
        init.get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };
    let int_field = |key: &str| init.get(key).and_then(|v| v.as_i64()).unwrap_or(0);

    Ok(CtfdInfo {
        name: title,
        user: CtfdUser {
            id: int_field("userId"),
            name: str_field("userName"),
            email: str_field("userEmail"),
        },
        start: int_field("start"),
        end: int_field("end"),
    })
}
