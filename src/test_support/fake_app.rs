use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::{Method, Url};

use crate::data::commodity_by_code;
use crate::error::TransportError;
use crate::http::{OutboundRequest, RawResponse, RequestBody, SessionFactory, Transport};

pub(crate) const APP_BASE: &str = "http://trade.test";
pub(crate) const STUB_BASE: &str = "http://stub.test";
const SUBMITTED_REFERENCE: &str = "CDP.2025.12.05.6";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Route {
    Login,
    Authorize,
    Home,
    Dashboard,
    OriginPage,
    OriginSubmit,
    CodeSearch,
    SpeciesSelect,
    QuantitiesSave,
    CodeChange,
    Purpose,
    Transport,
    Review,
    SaveDraft,
    Submit,
    Register,
    Expire,
}

impl Route {
    fn resolve(method: &Method, path: &str) -> Option<Self> {
        let get = *method == Method::GET;
        let post = *method == Method::POST;
        match path {
            "/auth/login" if get => Some(Route::Login),
            "/cdp-defra-id-stub/authorize" if get => Some(Route::Authorize),
            "/" if get => Some(Route::Home),
            "/dashboard" if get => Some(Route::Dashboard),
            "/import/consignment/origin" if get => Some(Route::OriginPage),
            "/import/consignment/origin" if post => Some(Route::OriginSubmit),
            "/import/commodity/codes/search" if get => Some(Route::CodeSearch),
            "/import/commodity/codes/select" if get => Some(Route::SpeciesSelect),
            "/import/commodity/codes/quantities/save" if get => Some(Route::QuantitiesSave),
            "/import/commodity/codes" if get => Some(Route::CodeChange),
            "/import/consignment/purpose" if post => Some(Route::Purpose),
            "/import/transport" if post => Some(Route::Transport),
            "/import/review" if get => Some(Route::Review),
            "/import/review" if post => Some(Route::Submit),
            "/import/save-as-draft" if post => Some(Route::SaveDraft),
            "/cdp-defra-id-stub/API/register" if post => Some(Route::Register),
            _ if post
                && path.starts_with("/cdp-defra-id-stub/API/register/")
                && path.ends_with("/expire") =>
            {
                Some(Route::Expire)
            }
            _ => None,
        }
    }

    const fn needs_login(self) -> bool {
        !matches!(
            self,
            Route::Login | Route::Authorize | Route::Register | Route::Expire
        )
    }
}

/// Replaces the next normal answer on a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    Status(u16),
    Disconnect,
    /// 200 at the requested URL with this body.
    Body(&'static str),
    /// 200 at this application path with a form page.
    Land(&'static str),
}

#[derive(Debug, Default)]
struct Shared {
    requests: Vec<(Option<Route>, OutboundRequest)>,
    faults: HashMap<Route, VecDeque<Fault>>,
    users: Vec<String>,
    expired: Vec<String>,
    sessions: u64,
}

/// Stateful stand-in for the trade frontend and the identity stub. Every
/// opened session gets its own login state, crumb sequence and draft.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeTradeApp {
    shared: Arc<Mutex<Shared>>,
}

impl FakeTradeApp {
    pub(crate) fn with_users<'email>(emails: impl IntoIterator<Item = &'email str>) -> Self {
        let app = Self::default();
        if let Ok(mut shared) = app.shared.lock() {
            shared.users = emails.into_iter().map(str::to_owned).collect();
        }
        app
    }

    pub(crate) fn inject(&self, route: Route, fault: Fault, times: usize) {
        if let Ok(mut shared) = self.shared.lock() {
            let queue = shared.faults.entry(route).or_default();
            queue.extend(std::iter::repeat_n(fault, times));
        }
    }

    pub(crate) fn requests(&self) -> Vec<(Option<Route>, OutboundRequest)> {
        self.shared
            .lock()
            .map(|shared| shared.requests.clone())
            .unwrap_or_default()
    }

    pub(crate) fn hits(&self, route: Route) -> usize {
        self.requests()
            .iter()
            .filter(|(hit, _)| *hit == Some(route))
            .count()
    }

    /// Requests sent to `route`, in order.
    pub(crate) fn requests_to(&self, route: Route) -> Vec<OutboundRequest> {
        self.requests()
            .into_iter()
            .filter(|(hit, _)| *hit == Some(route))
            .map(|(_, request)| request)
            .collect()
    }

    pub(crate) fn users(&self) -> Vec<String> {
        self.shared
            .lock()
            .map(|shared| shared.users.clone())
            .unwrap_or_default()
    }

    pub(crate) fn expired(&self) -> Vec<String> {
        self.shared
            .lock()
            .map(|shared| shared.expired.clone())
            .unwrap_or_default()
    }

    pub(crate) fn session(&self) -> FakeSession {
        let id = self
            .shared
            .lock()
            .map(|mut shared| {
                shared.sessions = shared.sessions.saturating_add(1);
                shared.sessions
            })
            .unwrap_or_default();
        FakeSession {
            shared: Arc::clone(&self.shared),
            state: Mutex::new(SessionState {
                id,
                ..SessionState::default()
            }),
        }
    }
}

impl SessionFactory for FakeTradeApp {
    fn open(&self) -> Result<Box<dyn Transport>, TransportError> {
        Ok(Box::new(self.session()))
    }
}

#[derive(Debug, Default)]
struct SessionState {
    id: u64,
    authenticated: bool,
    crumb_seq: u64,
    country: String,
    commodity_code: String,
    species_id: String,
    animals: String,
    packs: String,
    purpose: String,
    sub_purpose: String,
    bcp: String,
    drafts: u64,
}

impl SessionState {
    fn crumb(&self) -> String {
        format!("crumb-{}-{}", self.id, self.crumb_seq)
    }

    fn csrf_token(&self) -> String {
        format!("csrf-{}", self.id)
    }

    /// Accept the presented crumb only if it is the current one, then rotate.
    fn consume(&mut self, presented: Option<String>) -> bool {
        if presented.as_deref() != Some(self.crumb().as_str()) {
            return false;
        }
        self.crumb_seq = self.crumb_seq.saturating_add(1);
        true
    }
}

#[derive(Debug)]
pub(crate) struct FakeSession {
    shared: Arc<Mutex<Shared>>,
    state: Mutex<SessionState>,
}

#[async_trait]
impl Transport for FakeSession {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, TransportError> {
        let route = Route::resolve(&request.method, request.url.path());
        let fault = {
            let mut shared = self
                .shared
                .lock()
                .map_err(|_| TransportError::new("fake app lock poisoned"))?;
            shared.requests.push((route, request.clone()));
            route.and_then(|hit| shared.faults.get_mut(&hit).and_then(VecDeque::pop_front))
        };

        match fault {
            Some(Fault::Disconnect) => {
                return Err(TransportError::new("connection reset by peer"));
            }
            Some(Fault::Status(status)) => {
                return Ok(page(status, request.url.as_str(), "<h1>Something went wrong</h1>"));
            }
            Some(Fault::Body(body)) => return Ok(page(200, request.url.as_str(), body)),
            Some(Fault::Land(path)) => {
                return Ok(page(200, &app(path), &form_page("Redirected", "stale")));
            }
            None => {}
        }

        let Some(route) = route else {
            return Ok(page(404, request.url.as_str(), "<h1>Page not found</h1>"));
        };
        let mut state = self
            .state
            .lock()
            .map_err(|_| TransportError::new("session lock poisoned"))?;
        if route.needs_login() && !state.authenticated {
            return Ok(page(401, request.url.as_str(), "<h1>Sign in required</h1>"));
        }
        Ok(self.handle(route, &request, &mut state))
    }
}

impl FakeSession {
    fn handle(
        &self,
        route: Route,
        request: &OutboundRequest,
        state: &mut SessionState,
    ) -> RawResponse {
        let url = &request.url;
        match route {
            Route::Login => page(200, url.as_str(), &self.login_body()),
            Route::Authorize => {
                let known = query(url, "user").is_some_and(|user| self.is_user(&user));
                if !known || query(url, "state").as_deref() != Some("perf") {
                    return page(401, url.as_str(), "<h1>Unknown user</h1>");
                }
                state.authenticated = true;
                page(200, &app("/"), "<h1>Import notifications</h1>")
            }
            Route::Home => page(200, &app("/"), "<h1>Import notifications</h1>"),
            Route::Dashboard => page(200, &app("/dashboard"), "<h1>Dashboard</h1>"),
            Route::OriginPage => page(
                200,
                &app("/import/consignment/origin"),
                &form_page("Country of origin", &state.crumb()),
            ),
            Route::OriginSubmit => {
                if !state.consume(form(request, "crumb")) {
                    return forbidden(url);
                }
                state.country = form(request, "origin-country").unwrap_or_default();
                page(
                    200,
                    &app("/import/commodity/codes"),
                    &form_page("Commodity", &state.crumb()),
                )
            }
            Route::CodeSearch => {
                if !state.consume(query(url, "crumb")) {
                    return forbidden(url);
                }
                state.commodity_code = query(url, "commodity-code").unwrap_or_default();
                page(200, url.as_str(), &form_page("Species", &state.crumb()))
            }
            Route::SpeciesSelect => {
                if !state.consume(query(url, "crumb")) {
                    return forbidden(url);
                }
                state.species_id = query(url, "species").unwrap_or_default();
                page(
                    200,
                    &app("/import/commodity/codes/quantities"),
                    &form_page("Quantities", &state.crumb()),
                )
            }
            Route::QuantitiesSave => {
                if !state.consume(query(url, "crumb")) {
                    return forbidden(url);
                }
                let animals = query(url, &format!("{}-noOfAnimals", state.species_id));
                let packs = query(url, &format!("{}-noOfPacks", state.species_id));
                let (Some(animals), Some(packs)) = (animals, packs) else {
                    return page(400, url.as_str(), "<h1>Quantities missing</h1>");
                };
                state.animals = animals;
                state.packs = packs;
                page(
                    200,
                    &app("/import/consignment/purpose"),
                    &form_page("Purpose", &state.crumb()),
                )
            }
            Route::CodeChange => {
                if !state.consume(query(url, "crumb")) {
                    return forbidden(url);
                }
                page(
                    200,
                    &app("/import/commodity/codes/quantities"),
                    &form_page("Quantities", &state.crumb()),
                )
            }
            Route::Purpose => {
                if !state.consume(form(request, "crumb")) {
                    return forbidden(url);
                }
                state.purpose = form(request, "purpose").unwrap_or_default();
                state.sub_purpose = form(request, "internal-market-purpose").unwrap_or_default();
                page(
                    200,
                    &app("/import/transport"),
                    &form_page("Transport", &state.crumb()),
                )
            }
            Route::Transport => {
                if !state.consume(form(request, "crumb")) {
                    return forbidden(url);
                }
                state.bcp = form(request, "bcp").unwrap_or_default();
                page(200, &app("/import/review"), &review_body(state))
            }
            Route::Review => page(200, &app("/import/review"), &review_body(state)),
            Route::SaveDraft => {
                let token = request
                    .headers
                    .iter()
                    .find(|(name, _)| *name == "X-CSRF-Token")
                    .map(|(_, value)| value.as_str());
                if token != Some(state.csrf_token().as_str()) {
                    return page(403, url.as_str(), r#"{"success":false,"message":"Bad token"}"#);
                }
                state.drafts = state.drafts.saturating_add(1);
                page(
                    200,
                    url.as_str(),
                    &format!(
                        r#"{{"success":true,"message":"Draft saved successfully","notificationId":"DRAFT-{}-{}"}}"#,
                        state.id, state.drafts
                    ),
                )
            }
            Route::Submit => {
                if !state.consume(form(request, "crumb")) {
                    return forbidden(url);
                }
                if form(request, "confirmAccurate").as_deref() != Some("true") {
                    return page(400, url.as_str(), "<h1>Confirm the details</h1>");
                }
                page(
                    200,
                    &app("/import/confirmation"),
                    &format!(
                        "<h1>Import notification submitted</h1><p>Your reference is <strong>{}</strong></p>",
                        SUBMITTED_REFERENCE
                    ),
                )
            }
            Route::Register => self.register(request),
            Route::Expire => self.expire(url),
        }
    }

    fn login_body(&self) -> String {
        let links: String = self
            .shared
            .lock()
            .map(|shared| {
                shared
                    .users
                    .iter()
                    .map(|email| {
                        format!(
                            r#"<li><a href="/cdp-defra-id-stub/authorize?user={}&amp;state=perf">{}</a></li>"#,
                            email, email
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        format!("<h1>Choose a user</h1><ul>{}</ul>", links)
    }

    fn is_user(&self, email: &str) -> bool {
        self.shared
            .lock()
            .is_ok_and(|shared| shared.users.iter().any(|user| user == email))
    }

    fn register(&self, request: &OutboundRequest) -> RawResponse {
        let email = match &request.body {
            RequestBody::Json(value) => value
                .get("email")
                .and_then(serde_json::Value::as_str)
                .map(str::to_owned),
            RequestBody::Empty | RequestBody::Form(_) => None,
        };
        let Some(email) = email else {
            return page(400, request.url.as_str(), r#"{"error":"email required"}"#);
        };
        let Ok(mut shared) = self.shared.lock() else {
            return page(500, request.url.as_str(), "{}");
        };
        shared.users.push(email);
        page(
            200,
            request.url.as_str(),
            &format!(r#"{{"userId":"user-{}"}}"#, shared.users.len()),
        )
    }

    fn expire(&self, url: &Url) -> RawResponse {
        let user_id = url
            .path()
            .trim_start_matches("/cdp-defra-id-stub/API/register/")
            .trim_end_matches("/expire")
            .to_owned();
        if let Ok(mut shared) = self.shared.lock() {
            shared.expired.push(user_id);
        }
        page(200, url.as_str(), r#"{"success":true}"#)
    }
}

fn app(path: &str) -> String {
    format!("{}{}", APP_BASE, path)
}

fn page(status: u16, url: &str, body: &str) -> RawResponse {
    RawResponse {
        status,
        url: url.to_owned(),
        body: body.to_owned(),
    }
}

fn forbidden(url: &Url) -> RawResponse {
    page(403, url.as_str(), "<h1>Invalid crumb</h1>")
}

fn query(url: &Url, key: &str) -> Option<String> {
    url.query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

fn form(request: &OutboundRequest, key: &str) -> Option<String> {
    request.form_value(key).map(str::to_owned)
}

fn form_page(title: &str, crumb: &str) -> String {
    format!(
        r#"<html><body><h1>{}</h1><form method="post"><input type="hidden" name="crumb" value="{}"></form></body></html>"#,
        title, crumb
    )
}

fn review_body(state: &SessionState) -> String {
    let description = commodity_by_code(&state.commodity_code)
        .map_or("Unknown commodity", |commodity| commodity.description);
    format!(
        r#"<html><head><meta name="csrf-token" content="{}"></head><body>
<form method="post"><input type="hidden" name="crumb" value="{}">
<dl>
<dt>Country of origin</dt><dd>{}</dd>
<dt>Commodity</dt><dd>{}</dd><dd>{} animals, {} packages</dd>
<dt>Main reason for import</dt><dd>{}</dd>
<dt>Internal market purpose</dt><dd>{}</dd>
<dt>Border control post</dt><dd>{}</dd>
</dl></form></body></html>"#,
        state.csrf_token(),
        state.crumb(),
        state.country,
        description,
        state.animals,
        state.packs,
        state.purpose,
        state.sub_purpose,
        state.bcp
    )
}
