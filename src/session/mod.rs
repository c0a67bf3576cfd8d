// Session cookie manager: turns a provider session into the two bearer
// cookies and back. Pure apart from writing into the response jar.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::config::Environment;
use crate::provider::ProviderSession;

pub const ACCESS_TOKEN_COOKIE: &str = "accesstoken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshtoken";

/// Lifetime of each cookie for one response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieExpiry {
    pub access: Duration,
    pub refresh: Duration,
}

impl CookieExpiry {
    pub fn access_millis(&self) -> i64 {
        self.access.whole_milliseconds() as i64
    }

    pub fn refresh_millis(&self) -> i64 {
        self.refresh.whole_milliseconds() as i64
    }
}

/// remember=false: 15 minutes / 7 days. remember=true: 1 day / 30 days.
pub fn compute_expiry(remember: bool) -> CookieExpiry {
    if remember {
        CookieExpiry {
            access: Duration::days(1),
            refresh: Duration::days(30),
        }
    } else {
        CookieExpiry {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: Option<String>,
}

impl CookieOptions {
    /// The cookie domain is pinned only in production; dev cookies stay host-only
    pub fn for_environment(environment: &Environment, domain: Option<String>) -> Self {
        Self {
            domain: if environment.is_production() { domain } else { None },
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionCookies {
    options: CookieOptions,
}

impl SessionCookies {
    pub fn new(options: CookieOptions) -> Self {
        Self { options }
    }

    fn cookie(&self, name: &'static str, value: String, max_age: Duration) -> Cookie<'static> {
        let mut cookie = Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::None)
            .max_age(max_age)
            .build();

        if let Some(domain) = &self.options.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }

    /// Write both session cookies with the lifetimes selected by `remember`
    pub fn issue(&self, jar: CookieJar, session: &ProviderSession, remember: bool) -> CookieJar {
        let expiry = compute_expiry(remember);

        jar.add(self.cookie(ACCESS_TOKEN_COOKIE, session.access_token.clone(), expiry.access))
            .add(self.cookie(REFRESH_TOKEN_COOKIE, session.refresh_token.clone(), expiry.refresh))
    }

    /// Emit removal cookies for both names, whether or not the client sent them
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        let removal = |name: &'static str| {
            let mut cookie = self.cookie(name, String::new(), Duration::ZERO);
            cookie.make_removal();
            cookie
        };

        jar.add(removal(ACCESS_TOKEN_COOKIE))
            .add(removal(REFRESH_TOKEN_COOKIE))
    }

    pub fn access_token(&self, jar: &CookieJar) -> Option<String> {
        read_token(jar, ACCESS_TOKEN_COOKIE)
    }

    pub fn refresh_token(&self, jar: &CookieJar) -> Option<String> {
        read_token(jar, REFRESH_TOKEN_COOKIE)
    }
}

fn read_token(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
}
