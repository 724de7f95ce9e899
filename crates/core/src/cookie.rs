//! Named, expiring string values in a cookie jar
//!
//! [`CookieJar`] mirrors the `document.cookie` contract: reading yields the
//! `name=value; other=value` string of live cookies, writing takes a single
//! assignment with attributes. [`CookieStore`] layers get/set/erase on top.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

/// Raw cookie jar access
pub trait CookieJar {
    /// Current cookie string, entries separated by `;`
    fn read(&self) -> String;

    /// Apply one `name=value; attr=...` assignment
    fn write(&self, assignment: &str);
}

/// Best-effort cookie access; never fails
#[derive(Clone)]
pub struct CookieStore {
    jar: Rc<dyn CookieJar>,
}

impl CookieStore {
    pub fn new(jar: Rc<dyn CookieJar>) -> Self {
        Self { jar }
    }

    /// Write `name=value` on `/`, expiring `days` from now when given
    pub fn set_cookie(&self, name: &str, value: &str, days: Option<u32>) {
        self.jar
            .write(&cookie_assignment(name, value, days, Utc::now()));
    }

    /// First value stored under `name`
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.jar
            .read()
            .split(';')
            .map(|entry| entry.trim_start_matches(' '))
            .find_map(|entry| entry.strip_prefix(prefix.as_str()).map(str::to_string))
    }

    pub fn erase_cookie(&self, name: &str) {
        self.jar.write(&format!("{name}=; Max-Age=-99999999; path=/"));
    }
}

fn cookie_assignment(name: &str, value: &str, days: Option<u32>, now: DateTime<Utc>) -> String {
    let expires = match days {
        Some(days) if days > 0 => {
            let at = now + Duration::days(i64::from(days));
            format!("; expires={}", at.format("%a, %d %b %Y %H:%M:%S GMT"))
        }
        _ => String::new(),
    };
    format!("{name}={value}{expires}; path=/")
}

/// A cookie held by [`MemoryCookieJar`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

/// In-process jar following browser assignment rules
///
/// Used natively (the CLI persists its entries) and in tests.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RefCell<Vec<StoredCookie>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<StoredCookie>) -> Self {
        Self {
            cookies: RefCell::new(entries),
        }
    }

    /// Live cookies, expired entries dropped
    pub fn entries(&self) -> Vec<StoredCookie> {
        let now = Utc::now();
        let mut cookies = self.cookies.borrow_mut();
        cookies.retain(|cookie| cookie.expires.is_none_or(|at| at > now));
        cookies.clone()
    }

    fn apply(&self, assignment: &str, now: DateTime<Utc>) {
        let mut parts = assignment.split(';');
        let Some((name, value)) = parts.next().and_then(|pair| pair.trim().split_once('=')) else {
            return;
        };

        let mut expires = None;
        for attr in parts {
            let Some((key, val)) = attr.trim().split_once('=') else {
                continue;
            };
            match key.to_ascii_lowercase().as_str() {
                // Max-Age wins over expires regardless of order
                "max-age" => {
                    if let Ok(secs) = val.parse::<i64>() {
                        expires = Some(now + Duration::seconds(secs));
                        break;
                    }
                }
                "expires" => {
                    if let Ok(at) = DateTime::parse_from_rfc2822(val) {
                        expires = Some(at.with_timezone(&Utc));
                    }
                }
                _ => {}
            }
        }

        let mut cookies = self.cookies.borrow_mut();
        cookies.retain(|cookie| cookie.name != name);
        if expires.is_none_or(|at| at > now) {
            cookies.push(StoredCookie {
                name: name.to_string(),
                value: value.to_string(),
                expires,
            });
        }
    }
}

impl CookieJar for MemoryCookieJar {
    fn read(&self) -> String {
        self.entries()
            .iter()
            .map(|cookie| format!("{}={}", cookie.name, cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    fn write(&self, assignment: &str) {
        self.apply(assignment, Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> (Rc<MemoryCookieJar>, CookieStore) {
        let jar = Rc::new(MemoryCookieJar::new());
        (jar.clone(), CookieStore::new(jar))
    }

    #[test]
    fn assignment_carries_absolute_expiry_and_root_path() {
        let now = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            cookie_assignment("admin_phone", "MDEw", Some(365), now),
            "admin_phone=MDEw; expires=Mon, 01 Jan 2024 00:00:00 GMT; path=/"
        );
        assert_eq!(
            cookie_assignment("session", "x", None, now),
            "session=x; path=/"
        );
    }

    #[test]
    fn get_returns_first_matching_value() {
        let (jar, cookies) = store();
        jar.write("theme=dark; path=/");
        cookies.set_cookie("admin_phone", "MDEwLTEyMzQtNTY3OA==", Some(365));

        assert_eq!(
            cookies.get_cookie("admin_phone").as_deref(),
            Some("MDEwLTEyMzQtNTY3OA==")
        );
        assert_eq!(cookies.get_cookie("theme").as_deref(), Some("dark"));
        assert_eq!(cookies.get_cookie("admin"), None);
    }

    #[test]
    fn name_prefix_does_not_match_longer_names() {
        let (jar, cookies) = store();
        jar.write("admin_phone_old=1; path=/");
        assert_eq!(cookies.get_cookie("admin_phone"), None);
    }

    #[test]
    fn erase_removes_cookie() {
        let (_, cookies) = store();
        cookies.set_cookie("admin_phone", "abc", Some(1));
        cookies.erase_cookie("admin_phone");
        assert_eq!(cookies.get_cookie("admin_phone"), None);
    }

    #[test]
    fn past_expiry_is_not_stored() {
        let (jar, cookies) = store();
        jar.write("stale=1; expires=Thu, 01 Jan 1970 00:00:00 GMT; path=/");
        assert_eq!(cookies.get_cookie("stale"), None);
    }

    #[test]
    fn rewriting_replaces_value() {
        let (jar, cookies) = store();
        cookies.set_cookie("k", "1", None);
        cookies.set_cookie("k", "2", None);
        assert_eq!(cookies.get_cookie("k").as_deref(), Some("2"));
        assert_eq!(jar.entries().len(), 1);
    }
}
